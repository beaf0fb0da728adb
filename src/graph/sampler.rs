use std::sync::Arc;

use crate::dsp::buffer::AudioBuffer;
use crate::graph::node::{GraphNode, Playback, RenderCtx, SourceNode};

/// One-shot playback of a shared sample buffer.
///
/// The read head advances `playback_rate · buffer_rate / context_rate` frames
/// per output sample, so a rate of 2.0 plays an octave up in half the time.
/// The node ends by itself when the read head runs off the end of the buffer.
pub struct BufferSourceNode {
    buffer: Arc<AudioBuffer>,
    playback_rate: f32,
    position: f64,
    playback: Playback,
}

impl BufferSourceNode {
    pub fn new(buffer: Arc<AudioBuffer>) -> Self {
        Self {
            buffer,
            playback_rate: 1.0,
            position: 0.0,
            playback: Playback::default(),
        }
    }

    pub fn with_playback_rate(mut self, rate: f32) -> Self {
        self.playback_rate = rate.max(0.0);
        self
    }

    pub fn playback_rate(&self) -> f32 {
        self.playback_rate
    }

    pub fn buffer(&self) -> &Arc<AudioBuffer> {
        &self.buffer
    }
}

impl GraphNode for BufferSourceNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let step = self.playback_rate as f64 * self.buffer.sample_rate() as f64
            / ctx.sample_rate as f64;
        let frames = self.buffer.len() as f64;

        for (i, sample) in out.iter_mut().enumerate() {
            if !self.playback.is_playing_at(ctx.sample_time(i)) {
                *sample = 0.0;
                continue;
            }
            if self.position >= frames {
                self.playback.end();
                *sample = 0.0;
                continue;
            }
            *sample = self.buffer.read_interpolated(self.position);
            self.position += step;
        }

        self.playback.finish_block(ctx.sample_time(out.len()));
    }

    fn is_active(&self) -> bool {
        !self.playback.has_ended()
    }
}

impl SourceNode for BufferSourceNode {
    fn start(&mut self, at: f64) {
        self.playback.start(at);
    }

    fn stop(&mut self, at: f64) {
        self.playback.stop(at);
    }

    fn has_ended(&self) -> bool {
        self.playback.has_ended()
    }
}
