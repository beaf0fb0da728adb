use crate::{
    dsp::{automation::Automation, filter::SVFilter},
    graph::node::{GraphNode, RenderCtx},
    MAX_BLOCK_SIZE,
};

/*
State-Variable Filter (SVF)
===========================

A filter removes or attenuates certain frequencies from a signal. Voices
start from a harmonically rich source (sawtooth, noise, a kick sample) and
filter away what they do not want. This is why it's called "subtractive"
synthesis.

Filter Types:
-------------

Lowpass (LP): Passes frequencies BELOW the cutoff, attenuates above.
  - Higher cutoff = brighter sound
  - Lower cutoff = darker, muffled sound
  - Use: kick body, the acid bass sweep

Highpass (HP): Passes frequencies ABOVE the cutoff, attenuates below.
  - Removes low-end rumble, leaves a thin, airy sound
  - Use: noise hats

Bandpass (BP): Passes frequencies AROUND the cutoff, attenuates both sides.
  - A focused, "telephone" quality
  - Use: the dub stab

Parameters:
-----------

Cutoff (Hz): an automation timeline. When it is constant the filter runs
with one coefficient for the whole block; when a sweep is scheduled the
coefficient is recomputed per sample:

  cutoff
   2000 ┤   ╱╲
        │  ╱  ╲___
    400 ┤─╱       ╲____
    100 ┼──────────────╲── time
        now +0.1s    +0.4s

Q: emphasis at the cutoff. 0.707 is flat; the acid bass pushes it up to 21
for the classic squelch.

Example usage:
  // Static lowpass
  let dark = OscNode::sawtooth(110.0).through(FilterNode::lowpass(800.0));

  // Swept lowpass
  let mut filter = FilterNode::lowpass(400.0).with_q(8.0);
  filter.frequency_mut().exponential_ramp_to_value_at_time(2000.0, now + 0.1);
*/

pub struct FilterNode {
    filter: SVFilter,
    frequency: Automation,
    cutoff_buffer: Vec<f32>,
}

impl FilterNode {
    fn new(filter: SVFilter) -> Self {
        Self {
            frequency: Automation::new(filter.cutoff_hz),
            filter,
            cutoff_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self::new(SVFilter::lowpass(cutoff_hz))
    }

    pub fn highpass(cutoff_hz: f32) -> Self {
        Self::new(SVFilter::highpass(cutoff_hz))
    }

    pub fn bandpass(cutoff_hz: f32) -> Self {
        Self::new(SVFilter::bandpass(cutoff_hz))
    }

    pub fn with_q(mut self, q: f32) -> Self {
        self.filter.set_q(q);
        self
    }

    pub fn q(&self) -> f32 {
        self.filter.q
    }

    pub fn filter_type(&self) -> crate::dsp::filter::FilterType {
        self.filter.filter_type()
    }

    pub fn frequency(&self) -> &Automation {
        &self.frequency
    }

    /// Schedule cutoff changes on the frequency timeline.
    pub fn frequency_mut(&mut self) -> &mut Automation {
        &mut self.frequency
    }
}

impl GraphNode for FilterNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        if !self.frequency.is_automated() {
            self.filter.set_cutoff(self.frequency.value_at(ctx.time));
            self.filter.render(out, ctx.sample_rate);
            return;
        }

        let mut offset = 0;
        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            let cutoffs = &mut self.cutoff_buffer[..chunk.len()];
            self.frequency
                .fill(cutoffs, ctx.sample_time(offset), ctx.sample_rate);
            self.filter.render_swept(chunk, cutoffs, ctx.sample_rate);
            offset += chunk.len();
        }
        self.frequency.prune(ctx.sample_time(out.len()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{extensions::NodeExt, node::SourceNode, oscillator::OscNode};

    const SAMPLE_RATE: f32 = 48_000.0;

    fn rms(buffer: &[f32]) -> f32 {
        (buffer.iter().map(|s| s * s).sum::<f32>() / buffer.len() as f32).sqrt()
    }

    #[test]
    fn static_lowpass_darkens_saw() {
        let mut dry = OscNode::sawtooth(2_000.0);
        dry.start(0.0);
        let mut dry_out = vec![0.0; 2048];
        dry.render_block(&mut dry_out, &RenderCtx::new(SAMPLE_RATE, 0.0));

        let mut osc = OscNode::sawtooth(2_000.0);
        osc.start(0.0);
        let mut wet = osc.through(FilterNode::lowpass(200.0));
        let mut wet_out = vec![0.0; 2048];
        wet.render_block(&mut wet_out, &RenderCtx::new(SAMPLE_RATE, 0.0));

        assert!(rms(&wet_out[512..]) < rms(&dry_out[512..]) * 0.3);
    }

    #[test]
    fn sweep_follows_schedule() {
        let mut filter = FilterNode::lowpass(400.0).with_q(5.0);
        filter.frequency_mut().set_value_at_time(400.0, 0.0);
        filter.frequency_mut().exponential_ramp_to_value_at_time(2_000.0, 0.1);
        filter.frequency_mut().exponential_ramp_to_value_at_time(100.0, 0.4);

        let mut buffer = vec![0.5; 4_800];
        filter.render_block(&mut buffer, &RenderCtx::new(SAMPLE_RATE, 0.0));

        assert!(buffer.iter().all(|s| s.is_finite()));
        assert!((filter.frequency().value_at(0.1) - 2_000.0).abs() < 1.0);
        assert!((filter.frequency().value_at(1.0) - 100.0).abs() < 1e-3);
    }

    #[test]
    fn blocks_larger_than_scratch_are_chunked() {
        let mut filter = FilterNode::highpass(4_000.0);
        filter.frequency_mut().set_value_at_time(4_000.0, 0.0);
        filter.frequency_mut().linear_ramp_to_value_at_time(8_000.0, 1.0);

        let mut buffer = vec![0.25; MAX_BLOCK_SIZE * 2 + 17];
        filter.render_block(&mut buffer, &RenderCtx::new(SAMPLE_RATE, 0.0));
        assert!(buffer.iter().all(|s| s.is_finite()));
    }
}
