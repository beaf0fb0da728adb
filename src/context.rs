//! The audio context: clock, lifecycle, master bus and the live voice graphs.
//!
//! One context exists per engine session. The output callback calls
//! [`AudioContext::render`], which is the only thing that advances the clock;
//! the frame loop reads the clock, connects new voices and schedules releases.
//! Both sides share the context through [`SharedContext`].

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace};

use crate::dsp::analyser::{
    spectrum_channel, Analyser, FrequencyData, SpectrumReader, SpectrumTap, FREQUENCY_BINS,
};
use crate::error::{EngineError, EngineResult};
use crate::graph::gain::GainNode;
use crate::graph::node::{GraphNode, RenderCtx};
use crate::graph::voice::{VoiceGraph, VoiceKind};
use crate::MAX_BLOCK_SIZE;

/// Lifecycle of a context. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Running,
    Suspended,
    Closed,
}

impl fmt::Display for ContextState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContextState::Running => "running",
            ContextState::Suspended => "suspended",
            ContextState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Identifies a voice graph connected to a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceId(u64);

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

pub struct AudioContext {
    sample_rate: f32,
    /// Frames rendered so far; the clock is `frames / sample_rate`
    frames: u64,
    state: ContextState,
    master: GainNode,
    voices: Vec<(VoiceId, VoiceGraph)>,
    next_voice: u64,
    mix_buffer: Vec<f32>,
    voice_buffer: Vec<f32>,
    analyser: Analyser,
    spectrum: FrequencyData,
    tap: Option<SpectrumTap>,
}

impl AudioContext {
    /// Create a running context whose master bus applies `master_gain`.
    pub fn new(sample_rate: f32, master_gain: f32) -> Self {
        Self {
            sample_rate,
            frames: 0,
            state: ContextState::Running,
            master: GainNode::new(master_gain),
            voices: Vec::new(),
            next_voice: 0,
            mix_buffer: vec![0.0; MAX_BLOCK_SIZE],
            voice_buffer: vec![0.0; MAX_BLOCK_SIZE],
            analyser: Analyser::new(),
            spectrum: [0; FREQUENCY_BINS],
            tap: None,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Seconds of audio rendered since the context was created.
    pub fn current_time(&self) -> f64 {
        self.frames as f64 / self.sample_rate as f64
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ContextState::Running
    }

    pub fn master_gain(&self) -> f32 {
        self.master.gain().value_at(self.current_time())
    }

    pub fn set_master_gain(&mut self, gain: f32) {
        self.master.gain_mut().set_value(gain);
    }

    /// Stop the clock. Voices keep their state and resume where they were.
    pub fn suspend(&mut self) -> EngineResult<()> {
        match self.state {
            ContextState::Closed => Err(EngineError::ContextClosed),
            _ => {
                self.state = ContextState::Suspended;
                Ok(())
            }
        }
    }

    pub fn resume(&mut self) -> EngineResult<()> {
        match self.state {
            ContextState::Closed => Err(EngineError::ContextClosed),
            _ => {
                self.state = ContextState::Running;
                Ok(())
            }
        }
    }

    /// Drop every voice and stop rendering for good. Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.state == ContextState::Closed {
            debug!("close on an already closed context");
            return;
        }
        debug!(voices = self.voices.len(), "closing audio context");
        self.voices.clear();
        self.tap = None;
        self.state = ContextState::Closed;
    }

    /// Attach a voice to the master bus.
    ///
    /// Returns `None` and drops the graph unless the context is running.
    pub fn connect(&mut self, voice: VoiceGraph) -> Option<VoiceId> {
        if !self.is_running() {
            debug!(state = %self.state, kind = %voice.kind(), "context not running, voice dropped");
            return None;
        }
        let id = VoiceId(self.next_voice);
        self.next_voice += 1;
        self.voices.push((id, voice));
        Some(id)
    }

    /// Fade voice `id` out over `fade` seconds from the current clock time.
    ///
    /// Returns `false` when the voice is no longer connected (already reaped
    /// or the context is closed); that is not an error.
    pub fn release(&mut self, id: VoiceId, fade: f64) -> bool {
        let now = self.current_time();
        match self.voice_mut(id) {
            Some(voice) => {
                voice.release(now, fade);
                true
            }
            None => {
                trace!(voice = %id, "release of a voice that already finished");
                false
            }
        }
    }

    pub fn contains(&self, id: VoiceId) -> bool {
        self.voices.iter().any(|(voice_id, _)| *voice_id == id)
    }

    /// Output level of voice `id` at the current clock time.
    pub fn voice_gain(&self, id: VoiceId) -> Option<f32> {
        let now = self.current_time();
        self.voice(id).map(|voice| voice.gain_at(now))
    }

    pub fn voice_kind(&self, id: VoiceId) -> Option<VoiceKind> {
        self.voice(id).map(VoiceGraph::kind)
    }

    /// Number of voice graphs still connected.
    pub fn live_voices(&self) -> usize {
        self.voices.len()
    }

    fn voice(&self, id: VoiceId) -> Option<&VoiceGraph> {
        self.voices
            .iter()
            .find(|(voice_id, _)| *voice_id == id)
            .map(|(_, voice)| voice)
    }

    fn voice_mut(&mut self, id: VoiceId) -> Option<&mut VoiceGraph> {
        self.voices
            .iter_mut()
            .find(|(voice_id, _)| *voice_id == id)
            .map(|(_, voice)| voice)
    }

    /// Open the spectrum channel. A second call replaces the previous reader.
    pub fn spectrum_reader(&mut self) -> SpectrumReader {
        let (tap, reader) = spectrum_channel();
        self.tap = Some(tap);
        reader
    }

    /// Render mono output and advance the clock by `out.len()` frames.
    ///
    /// A context that is not running writes silence and leaves the clock
    /// where it is.
    pub fn render(&mut self, out: &mut [f32]) {
        if !self.is_running() {
            out.fill(0.0);
            return;
        }

        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            let frames = chunk.len();
            let ctx = RenderCtx::new(self.sample_rate, self.current_time());

            let mix = &mut self.mix_buffer[..frames];
            mix.fill(0.0);

            for (_, voice) in self.voices.iter_mut() {
                let voice_out = &mut self.voice_buffer[..frames];
                voice_out.fill(0.0);
                voice.render_block(voice_out, &ctx);

                for (m, &s) in mix.iter_mut().zip(voice_out.iter()) {
                    *m += s;
                }
            }

            self.master.render_block(mix, &ctx);
            self.analyser.push(mix);
            chunk.copy_from_slice(mix);
            self.frames += frames as u64;
        }

        self.voices.retain(|(id, voice)| {
            let active = voice.is_active();
            if !active {
                trace!(voice = %id, kind = %voice.kind(), "voice finished");
            }
            active
        });

        if let Some(tap) = self.tap.as_mut() {
            self.analyser.frequency_data(&mut self.spectrum);
            tap.publish(&self.spectrum);
            if tap.is_abandoned() {
                self.tap = None;
            }
        }
    }

    /// Render `frames` samples into a fresh buffer (offline use and tests).
    pub fn render_frames(&mut self, frames: usize) -> Vec<f32> {
        let mut out = vec![0.0; frames];
        self.render(&mut out);
        out
    }
}

/// Context handle shared between the frame loop and the output callback.
pub type SharedContext = Arc<Mutex<AudioContext>>;

pub fn shared(context: AudioContext) -> SharedContext {
    Arc::new(Mutex::new(context))
}

/// Lock the context, recovering the guard if another thread panicked while
/// holding it. Context state stays consistent between calls, so a poisoned
/// lock is still usable.
pub fn lock_context(context: &SharedContext) -> MutexGuard<'_, AudioContext> {
    context.lock().unwrap_or_else(PoisonError::into_inner)
}
