use std::fmt;

use crate::dsp::automation::SILENCE_FLOOR;
use crate::graph::gain::GainNode;
use crate::graph::node::{GraphNode, RenderCtx, SourceNode};

/// Which signal chain a voice was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoiceKind {
    /// Percussive sample through a low-pass (and optional shaper)
    SampledKick,
    /// Sine sweep fallback when no sample is loaded
    SynthKick,
    /// Filtered white noise burst
    NoiseHat,
    /// Shaped sawtooth into a swept resonant low-pass
    AcidBass,
    /// Sawtooth into a band-pass
    DubStab,
    /// Detuned square with a quiet sustained envelope
    SquareLead,
}

impl fmt::Display for VoiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VoiceKind::SampledKick => "sampled kick",
            VoiceKind::SynthKick => "synth kick",
            VoiceKind::NoiseHat => "noise hat",
            VoiceKind::AcidBass => "acid bass",
            VoiceKind::DubStab => "dub stab",
            VoiceKind::SquareLead => "square lead",
        };
        f.write_str(name)
    }
}

/// A complete voice: source → optional processing chain → output gain.
///
/// The output gain is the handle the scheduler fades on release; the source
/// is the handle it stops.
pub struct VoiceGraph {
    kind: VoiceKind,
    source: Box<dyn SourceNode>,
    chain: Option<Box<dyn GraphNode>>,
    output: GainNode,
}

impl VoiceGraph {
    pub fn new<S: SourceNode + 'static>(kind: VoiceKind, source: S, output: GainNode) -> Self {
        Self {
            kind,
            source: Box::new(source),
            chain: None,
            output,
        }
    }

    /// Insert processing between the source and the output gain.
    pub fn with_chain<C: GraphNode + 'static>(mut self, chain: C) -> Self {
        self.chain = Some(Box::new(chain));
        self
    }

    pub fn kind(&self) -> VoiceKind {
        self.kind
    }

    pub fn output(&self) -> &GainNode {
        &self.output
    }

    /// Output level at clock time `t`.
    pub fn gain_at(&self, t: f64) -> f32 {
        self.output.gain().value_at(t)
    }

    /// Fade the output to silence over `fade` seconds and stop the source
    /// when the fade completes.
    ///
    /// The level at `now` is read before cancelling so the fade starts from
    /// what is actually sounding. Calling this again, or on a voice whose
    /// source has already ended, is harmless.
    pub fn release(&mut self, now: f64, fade: f64) {
        let gain = self.output.gain_mut();
        let current = gain.value_at(now);
        gain.cancel_scheduled_values(now);
        gain.set_value_at_time(current, now);
        gain.exponential_ramp_to_value_at_time(SILENCE_FLOOR, now + fade);
        self.source.stop(now + fade);
    }

    pub fn has_ended(&self) -> bool {
        self.source.has_ended()
    }
}

impl GraphNode for VoiceGraph {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.source.render_block(out, ctx);
        if let Some(chain) = self.chain.as_mut() {
            chain.render_block(out, ctx);
        }
        self.output.render_block(out, ctx);
    }

    fn is_active(&self) -> bool {
        self.source.is_active()
    }
}
