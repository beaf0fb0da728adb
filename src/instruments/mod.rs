//! Voice builders: one signal chain per instrument.
//!
//! | Instrument | Voice                      | Chain                                         |
//! |------------|----------------------------|-----------------------------------------------|
//! | Ellipse    | kick (pitch < 350 Hz)      | sample → low-pass → (shaper) → gain           |
//! |            |                            | or sine sweep → decay gain when no sample     |
//! | Ellipse    | hat (pitch ≥ 350 Hz)       | noise → high-pass → decay gain → gain         |
//! | Squiggle   | acid bass                  | saw/2 → shaper → swept resonant low-pass → env|
//! | Line       | dub stab                   | saw → band-pass → env                         |
//! | Freehand   | square lead                | detuned square → quiet sustain env → gain     |
//!
//! Every ramp is anchored at the context's current time.

use std::fmt;

use tracing::debug;

use crate::buffers::BufferLibrary;
use crate::context::{AudioContext, VoiceId};
use crate::graph::voice::{VoiceGraph, VoiceKind};
use crate::mapping::MappedShape;
use crate::shape::{Instrument, ShapeId};

mod acid;
mod lead;
mod percussion;
mod stab;

pub use percussion::PERCUSSION_SPLIT_HZ;

/// Live handle to a started voice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    id: VoiceId,
    shape: ShapeId,
    kind: VoiceKind,
    started_at: f64,
}

impl Voice {
    pub fn id(&self) -> VoiceId {
        self.id
    }

    pub fn shape(&self) -> ShapeId {
        self.shape
    }

    pub fn kind(&self) -> VoiceKind {
        self.kind
    }

    /// Context time the voice was started at.
    pub fn started_at(&self) -> f64 {
        self.started_at
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} for shape {}", self.kind, self.id, self.shape)
    }
}

/// Build the signal graph for `shape` with ramps anchored at `now`.
///
/// Returns `None` only when a required shared buffer is missing (the noise
/// buffer before the library is initialized).
pub fn build_voice(shape: &MappedShape, buffers: &BufferLibrary, now: f64) -> Option<VoiceGraph> {
    match shape.instrument() {
        Instrument::Ellipse if shape.frequency() < PERCUSSION_SPLIT_HZ => {
            Some(percussion::kick(shape, buffers.percussion(), now))
        }
        Instrument::Ellipse => {
            let Some(noise) = buffers.noise() else {
                debug!(shape = %shape.id(), "noise buffer not ready, hat skipped");
                return None;
            };
            Some(percussion::hat(shape, noise, now))
        }
        Instrument::Squiggle => Some(acid::acid_bass(shape, now)),
        Instrument::Line => Some(stab::dub_stab(shape, now)),
        Instrument::Freehand => Some(lead::square_lead(shape, now)),
    }
}

/// Build a voice for `shape` and connect it to the context's master bus.
///
/// Returns `None` without touching the context when it is not running;
/// callers treat that as "nothing started this frame".
pub fn start_voice(
    context: &mut AudioContext,
    shape: &MappedShape,
    buffers: &BufferLibrary,
) -> Option<Voice> {
    if !context.is_running() {
        return None;
    }

    let now = context.current_time();
    let graph = build_voice(shape, buffers, now)?;
    let kind = graph.kind();
    let id = context.connect(graph)?;

    let voice = Voice {
        id,
        shape: shape.id(),
        kind,
        started_at: now,
    };
    debug!(%voice, at = now, "voice started");
    Some(voice)
}


#[cfg(test)]
mod tests {
    use super::test_support::{mapped, HIGH_Y, LOW_Y};
    use super::*;
    use crate::dsp::buffer::AudioBuffer;
    use crate::shape::Rgb;

    fn library() -> BufferLibrary {
        let mut library = BufferLibrary::new();
        library.initialize(48_000.0, None);
        library
    }

    #[test]
    fn dispatches_by_instrument() {
        let buffers = library();
        let cases = [
            (Instrument::Ellipse, LOW_Y, VoiceKind::SynthKick),
            (Instrument::Ellipse, HIGH_Y, VoiceKind::NoiseHat),
            (Instrument::Squiggle, LOW_Y, VoiceKind::AcidBass),
            (Instrument::Line, LOW_Y, VoiceKind::DubStab),
            (Instrument::Freehand, LOW_Y, VoiceKind::SquareLead),
        ];
        for (instrument, y, expected) in cases {
            let shape = mapped(instrument, y, Rgb::DEFAULT_BRUSH);
            let voice = build_voice(&shape, &buffers, 0.0).expect("voice");
            assert_eq!(voice.kind(), expected, "{instrument:?} at y={y}");
        }
    }

    #[test]
    fn loaded_sample_replaces_synth_kick() {
        let buffers = library().with_percussion(AudioBuffer::new(48_000.0, vec![0.5; 4_800]));
        let shape = mapped(Instrument::Ellipse, LOW_Y, Rgb::DEFAULT_BRUSH);
        let voice = build_voice(&shape, &buffers, 0.0).expect("voice");
        assert_eq!(voice.kind(), VoiceKind::SampledKick);
    }

    #[test]
    fn hat_needs_noise_buffer() {
        let shape = mapped(Instrument::Ellipse, HIGH_Y, Rgb::DEFAULT_BRUSH);
        assert!(build_voice(&shape, &BufferLibrary::new(), 0.0).is_none());
    }

    #[test]
    fn start_voice_connects_to_running_context() {
        let buffers = library();
        let mut context = AudioContext::new(48_000.0, 0.8);
        context.render_frames(480);

        let shape = mapped(Instrument::Line, LOW_Y, Rgb::DEFAULT_BRUSH);
        let voice = start_voice(&mut context, &shape, &buffers).expect("running context");

        assert_eq!(voice.shape(), shape.id());
        assert!((voice.started_at() - 0.01).abs() < 1e-9);
        assert!(context.contains(voice.id()));
    }

    #[test]
    fn start_voice_on_suspended_context_is_silent_noop() {
        let buffers = library();
        let mut context = AudioContext::new(48_000.0, 0.8);
        context.suspend().expect("suspend");

        let shape = mapped(Instrument::Squiggle, LOW_Y, Rgb::DEFAULT_BRUSH);
        assert!(start_voice(&mut context, &shape, &buffers).is_none());
        assert_eq!(context.live_voices(), 0);
    }
}
