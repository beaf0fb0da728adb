use crate::dsp::automation::SILENCE_FLOOR;
use crate::graph::{
    filter::FilterNode,
    gain::GainNode,
    node::SourceNode,
    oscillator::OscNode,
    voice::{VoiceGraph, VoiceKind},
};
use crate::mapping::MappedShape;

/*
Dub stab (lines)
================

  saw @ f ──→ band-pass (800 Hz + distortion · 1 kHz, Q = 1 + timbre · 5) ──→ env

  env   0 ─lin→ volume @10 ms ─exp→ 0.001 @300 ms
*/

const ATTACK: f64 = 0.01;
const DECAY_END: f64 = 0.3;

pub(super) fn dub_stab(shape: &MappedShape, now: f64) -> VoiceGraph {
    let mut osc = OscNode::sawtooth(shape.frequency());
    osc.start(now);

    let filter = FilterNode::bandpass(800.0 + shape.distortion() * 1_000.0)
        .with_q(1.0 + shape.timbre() * 5.0);

    let mut env = GainNode::new(0.0);
    let gain = env.gain_mut();
    gain.set_value_at_time(0.0, now);
    gain.linear_ramp_to_value_at_time(shape.volume(), now + ATTACK);
    gain.exponential_ramp_to_value_at_time(SILENCE_FLOOR, now + DECAY_END);

    VoiceGraph::new(VoiceKind::DubStab, osc, env).with_chain(filter)
}
