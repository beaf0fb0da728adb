use tracing::debug;

use crate::dsp::automation::SILENCE_FLOOR;
use crate::graph::{
    extensions::NodeExt,
    filter::FilterNode,
    gain::GainNode,
    node::SourceNode,
    oscillator::OscNode,
    shaper::ShaperNode,
    voice::{VoiceGraph, VoiceKind},
};
use crate::mapping::MappedShape;

/*
Acid bass (squiggles)
=====================

  saw @ f/2 ──→ shaper (k = 10 + distortion · 100) ──→ low-pass ──→ env

  cutoff   400 Hz ─exp→ 2 kHz @100 ms ─exp→ 100 Hz @400 ms
  Q        1 + timbre · 20
  env      0 ─lin→ 0.8 · volume @20 ms ─exp→ 0.001 @500 ms
*/

const ATTACK: f64 = 0.02;
const DECAY_END: f64 = 0.5;
const LEVEL: f32 = 0.8;

pub(super) fn acid_bass(shape: &MappedShape, now: f64) -> VoiceGraph {
    let mut osc = OscNode::sawtooth(shape.frequency() / 2.0);
    osc.start(now);

    let mut filter = FilterNode::lowpass(400.0).with_q(1.0 + shape.timbre() * 20.0);
    let cutoff = filter.frequency_mut();
    cutoff.set_value_at_time(400.0, now);
    cutoff.exponential_ramp_to_value_at_time(2_000.0, now + 0.1);
    cutoff.exponential_ramp_to_value_at_time(100.0, now + 0.4);

    let mut env = GainNode::new(0.0);
    let gain = env.gain_mut();
    gain.set_value_at_time(0.0, now);
    gain.linear_ramp_to_value_at_time(shape.volume() * LEVEL, now + ATTACK);
    gain.exponential_ramp_to_value_at_time(SILENCE_FLOOR, now + DECAY_END);

    let voice = VoiceGraph::new(VoiceKind::AcidBass, osc, env);
    match ShaperNode::with_amount(10.0 + shape.distortion() * 100.0) {
        Some(shaper) => voice.with_chain(shaper.through(filter)),
        None => {
            debug!(shape = %shape.id(), "distortion curve unavailable, bass left clean");
            voice.with_chain(filter)
        }
    }
}
