use crate::dsp::automation::Automation;
use crate::graph::node::{GraphNode, RenderCtx};
use crate::MAX_BLOCK_SIZE;

/*
Gain Stage
==========

Multiplies the signal by an automated level. Every voice ends in one of
these, and its timeline is the voice's envelope:

  Dub stab:   0 ──lin──▶ volume @10ms ──exp──▶ 0.001 @300ms
  Acid bass:  0 ──lin──▶ 0.8·volume @20ms ──exp──▶ 0.001 @500ms

Releasing a voice rewrites the tail of this timeline (see `VoiceGraph`),
which is why the gain is automation and not a plain multiplier.
*/

pub struct GainNode {
    gain: Automation,
    gain_buffer: Vec<f32>,
}

impl GainNode {
    pub fn new(gain: f32) -> Self {
        Self {
            gain: Automation::new(gain),
            gain_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn gain(&self) -> &Automation {
        &self.gain
    }

    pub fn gain_mut(&mut self) -> &mut Automation {
        &mut self.gain
    }
}

impl GraphNode for GainNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        if !self.gain.is_automated() {
            let gain = self.gain.value_at(ctx.time);
            for sample in out.iter_mut() {
                *sample *= gain;
            }
            return;
        }

        let mut offset = 0;
        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            let gains = &mut self.gain_buffer[..chunk.len()];
            self.gain.fill(gains, ctx.sample_time(offset), ctx.sample_rate);
            for (sample, &gain) in chunk.iter_mut().zip(gains.iter()) {
                *sample *= gain;
            }
            offset += chunk.len();
        }
        self.gain.prune(ctx.sample_time(out.len()));
    }
}
