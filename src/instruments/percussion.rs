use std::sync::Arc;

use tracing::debug;

use crate::dsp::{automation::SILENCE_FLOOR, buffer::AudioBuffer};
use crate::graph::{
    extensions::NodeExt,
    filter::FilterNode,
    gain::GainNode,
    node::SourceNode,
    oscillator::OscNode,
    sampler::BufferSourceNode,
    shaper::ShaperNode,
    voice::{VoiceGraph, VoiceKind},
};
use crate::mapping::MappedShape;

/*
Drums (ellipses)
================

Low ellipses are kicks, high ellipses are hats:

  pitch < 350 Hz   kick   sample at 0.5 + f/350 speed → low-pass (200 Hz + timbre² · 15 kHz)
                          shaper (k = distortion · 400) only above 10% distortion
                          no sample → 150 Hz sine falling to 0.01 Hz over 0.5 s

  pitch ≥ 350 Hz   hat    2 s noise → high-pass (4 kHz + timbre · 6 kHz)
                          decay gain 1.0 → 0.01 over 20..150 ms (more red = shorter)
                          source stops after 200 ms
*/

/// Ellipses below this pitch are kicks, the rest hats.
pub const PERCUSSION_SPLIT_HZ: f32 = 350.0;

const KICK_LENGTH: f64 = 0.5;
const KICK_START_HZ: f32 = 150.0;
const KICK_END_HZ: f32 = 0.01;
const KICK_GAIN_BOOST: f32 = 1.2;
const KICK_SHAPER_THRESHOLD: f32 = 0.1;

const HAT_LENGTH: f64 = 0.2;
const HAT_MIN_DECAY: f64 = 0.02;
const HAT_MAX_DECAY: f64 = 0.15;
const HAT_DECAY_FLOOR: f32 = 0.01;

pub(super) fn kick(shape: &MappedShape, sample: Option<&Arc<AudioBuffer>>, now: f64) -> VoiceGraph {
    match sample {
        Some(sample) => sampled_kick(shape, sample, now),
        None => synth_kick(shape, now),
    }
}

fn sampled_kick(shape: &MappedShape, sample: &Arc<AudioBuffer>, now: f64) -> VoiceGraph {
    let mut source = BufferSourceNode::new(Arc::clone(sample))
        .with_playback_rate(0.5 + shape.frequency() / PERCUSSION_SPLIT_HZ);
    source.start(now);

    let filter = FilterNode::lowpass(200.0 + shape.timbre().powi(2) * 15_000.0);
    let voice = VoiceGraph::new(VoiceKind::SampledKick, source, GainNode::new(shape.volume()));

    let chain = if shape.distortion() <= KICK_SHAPER_THRESHOLD {
        filter.boxed()
    } else {
        match ShaperNode::with_amount(shape.distortion() * 400.0) {
            Some(shaper) => filter.through(shaper).boxed(),
            None => {
                debug!(shape = %shape.id(), "distortion curve unavailable, kick left clean");
                filter.boxed()
            }
        }
    };
    voice.with_chain(chain)
}

fn synth_kick(shape: &MappedShape, now: f64) -> VoiceGraph {
    let mut osc = OscNode::sine(KICK_START_HZ);
    osc.frequency_mut().set_value_at_time(KICK_START_HZ, now);
    osc.frequency_mut()
        .exponential_ramp_to_value_at_time(KICK_END_HZ, now + KICK_LENGTH);
    osc.start(now);
    osc.stop(now + KICK_LENGTH);

    let level = shape.volume() * KICK_GAIN_BOOST;
    let mut gain = GainNode::new(level);
    gain.gain_mut().set_value_at_time(level, now);
    gain.gain_mut()
        .exponential_ramp_to_value_at_time(SILENCE_FLOOR, now + KICK_LENGTH);

    VoiceGraph::new(VoiceKind::SynthKick, osc, gain)
}

pub(super) fn hat(shape: &MappedShape, noise: &Arc<AudioBuffer>, now: f64) -> VoiceGraph {
    let mut source = BufferSourceNode::new(Arc::clone(noise));
    source.start(now);
    source.stop(now + HAT_LENGTH);

    let filter = FilterNode::highpass(4_000.0 + shape.timbre() * 6_000.0);

    let mut decay = GainNode::new(1.0);
    decay.gain_mut().set_value_at_time(1.0, now);
    decay.gain_mut().exponential_ramp_to_value_at_time(
        HAT_DECAY_FLOOR,
        now + hat_decay_time(shape.distortion()),
    );

    VoiceGraph::new(VoiceKind::NoiseHat, source, GainNode::new(shape.volume()))
        .with_chain(filter.through(decay))
}

/// Seconds for the hat to fall to its floor; more distortion, shorter hat.
fn hat_decay_time(distortion: f32) -> f64 {
    (HAT_MAX_DECAY - distortion as f64 * 0.1).max(HAT_MIN_DECAY)
}
