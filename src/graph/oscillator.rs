use crate::dsp::automation::Automation;
use crate::dsp::oscillator::{OscillatorBlock, OscillatorWaveform};
use crate::graph::node::{GraphNode, Playback, RenderCtx, SourceNode};
use crate::MAX_BLOCK_SIZE;

/*
Audio Oscillator
================

An oscillator is the fundamental sound source of a voice. It generates a
repeating waveform at a specific frequency (pitch), producing the raw audio
material that gets shaped by filters, waveshapers and gain envelopes.

Waveform Types and Their Character:
-----------------------------------

Sine:     Pure tone, fundamental only. The synthesized kick sweeps a sine
          from 150 Hz down towards silence.
Sawtooth: Every harmonic at 1/n. Bright and buzzy; feeds the acid bass and
          the dub stab, where a filter carves it back down.
Square:   Odd harmonics only. Hollow and woody; the freehand lead.
Triangle: Odd harmonics falling at 1/n², soft and mellow.

Frequency is an automation timeline rather than a fixed number, so a voice
can schedule a pitch sweep once at start and let the renderer follow it:

    freq
    150 ┤╲
        │ ╲__
        │    ╲____
   0.01 ┼──────────╲──── time
        now        +0.5s

Detune is applied on top in cents (100 cents = 1 semitone):

    final = frequency · 2^(cents / 1200)

Playback window:
----------------
Nothing is produced before `start(at)` or at/after `stop(at)`. Once a block
has rendered past the stop time the node reports inactive, and the context
drops the voice it belongs to.

Example usage:
  let mut osc = OscNode::sawtooth(220.0);
  osc.start(ctx_time);

  // Acid bass: saw → shaper → swept low-pass
  let voice = OscNode::sawtooth(110.0)
      .through(ShaperNode::new(curve))
      .through(FilterNode::lowpass(400.0));
*/

pub struct OscNode {
    osc: OscillatorBlock,
    frequency: Automation,
    /// Detune in cents. 100 cents = 1 semitone.
    detune_cents: f32,
    playback: Playback,
    freq_buffer: Vec<f32>,
}

impl OscNode {
    pub fn new(waveform: OscillatorWaveform, frequency: f32) -> Self {
        Self {
            osc: OscillatorBlock::new(waveform),
            frequency: Automation::new(frequency),
            detune_cents: 0.0,
            playback: Playback::default(),
            freq_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn sine(frequency: f32) -> Self {
        Self::new(OscillatorWaveform::Sine, frequency)
    }

    pub fn sawtooth(frequency: f32) -> Self {
        Self::new(OscillatorWaveform::Sawtooth, frequency)
    }

    pub fn square(frequency: f32) -> Self {
        Self::new(OscillatorWaveform::Square, frequency)
    }

    pub fn triangle(frequency: f32) -> Self {
        Self::new(OscillatorWaveform::Triangle, frequency)
    }

    /// Set detune in cents (100 cents = 1 semitone).
    pub fn with_detune(mut self, cents: f32) -> Self {
        self.detune_cents = cents;
        self
    }

    pub fn frequency(&self) -> &Automation {
        &self.frequency
    }

    /// Schedule pitch changes on the frequency timeline.
    pub fn frequency_mut(&mut self) -> &mut Automation {
        &mut self.frequency
    }

    pub fn detune_cents(&self) -> f32 {
        self.detune_cents
    }

    pub fn waveform(&self) -> OscillatorWaveform {
        self.osc.waveform()
    }
}

impl GraphNode for OscNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let detune = if self.detune_cents != 0.0 {
            2.0_f32.powf(self.detune_cents / 1200.0)
        } else {
            1.0
        };

        let mut offset = 0;
        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            let chunk_ctx = ctx.offset(offset);
            let freqs = &mut self.freq_buffer[..chunk.len()];
            self.frequency.fill(freqs, chunk_ctx.time, ctx.sample_rate);

            for (i, (sample, &freq)) in chunk.iter_mut().zip(freqs.iter()).enumerate() {
                *sample = if self.playback.is_playing_at(chunk_ctx.sample_time(i)) {
                    self.osc.next_sample(freq * detune, ctx.sample_rate)
                } else {
                    0.0
                };
            }
            offset += chunk.len();
        }

        let block_end = ctx.sample_time(out.len());
        self.frequency.prune(block_end);
        self.playback.finish_block(block_end);
    }

    fn is_active(&self) -> bool {
        !self.playback.has_ended()
    }
}

impl SourceNode for OscNode {
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
