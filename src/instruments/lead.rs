use crate::graph::{
    gain::GainNode,
    node::SourceNode,
    oscillator::OscNode,
    voice::{VoiceGraph, VoiceKind},
};
use crate::mapping::MappedShape;

/*
Square lead (freehand, and anything unrecognised)
=================================================

  square @ f, detune = distortion · 50 cents ──→ env ──→ gain (volume)

  env   0 ─lin→ 0.08 · volume @50 ms, held until 100..600 ms (more blue = longer)

The lead is deliberately quiet: freehand strokes tend to be long and many.
It has no release of its own and sustains until the scheduler fades it.
*/

const ATTACK: f64 = 0.05;
const CEILING: f32 = 0.08;
const DETUNE_RANGE_CENTS: f32 = 50.0;

pub(super) fn square_lead(shape: &MappedShape, now: f64) -> VoiceGraph {
    let mut osc =
        OscNode::square(shape.frequency()).with_detune(shape.distortion() * DETUNE_RANGE_CENTS);
    osc.start(now);

    let quiet = shape.volume() * CEILING;
    let sustain = 0.1 + shape.timbre() as f64 * 0.5;
    let mut env = GainNode::new(0.0);
    let gain = env.gain_mut();
    gain.set_value_at_time(0.0, now);
    gain.linear_ramp_to_value_at_time(quiet, now + ATTACK);
    gain.linear_ramp_to_value_at_time(quiet, now + sustain);

    VoiceGraph::new(VoiceKind::SquareLead, osc, GainNode::new(shape.volume())).with_chain(env)
}
