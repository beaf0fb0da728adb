use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OscillatorWaveform {
    Sine,
    Sawtooth,
    Square,
    Triangle,
}

/// Phase-accumulating oscillator.
///
/// Sawtooth and square are band-limited with PolyBLEP so the upper notes of
/// the scale do not alias into audible whistles.
pub struct OscillatorBlock {
    waveform: OscillatorWaveform,
    phase: f32, // 0.0 - 1.0
}

/// Polynomial band-limited step correction around a discontinuity.
#[inline]
fn poly_blep(phase: f32, increment: f32) -> f32 {
    if phase < increment {
        let t = phase / increment;
        2.0 * t - t * t - 1.0
    } else if phase > 1.0 - increment {
        let t = (phase - 1.0) / increment;
        t * t + 2.0 * t + 1.0
    } else {
        0.0
    }
}

impl OscillatorBlock {
    pub fn new(waveform: OscillatorWaveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
        }
    }

    pub fn waveform(&self) -> OscillatorWaveform {
        self.waveform
    }

    /// Produce one sample at `frequency` and advance the phase.
    #[inline]
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let increment = (frequency / sample_rate).clamp(0.0, 0.5);
        let phase = self.phase;

        let sample = match self.waveform {
            OscillatorWaveform::Sine => (TAU * phase).sin(),
            OscillatorWaveform::Sawtooth => {
                let naive = 2.0 * phase - 1.0;
                if increment > 0.0 {
                    naive - poly_blep(phase, increment)
                } else {
                    naive
                }
            }
            OscillatorWaveform::Square => {
                let naive = if phase < 0.5 { 1.0 } else { -1.0 };
                if increment > 0.0 {
                    naive + poly_blep(phase, increment) - poly_blep((phase + 0.5).fract(), increment)
                } else {
                    naive
                }
            }
            OscillatorWaveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
        };

        self.phase = (phase + increment).fract();
        sample
    }

    /// Render with one frequency value per output sample.
    pub fn render(&mut self, out: &mut [f32], frequencies: &[f32], sample_rate: f32) {
        for (sample, &frequency) in out.iter_mut().zip(frequencies) {
            *sample = self.next_sample(frequency, sample_rate);
        }
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    #[test]
    fn sine_matches_closed_form() {
        let mut osc = OscillatorBlock::new(OscillatorWaveform::Sine);
        let freqs = vec![440.0f32; 64];
        let mut out = vec![0.0f32; 64];
        osc.render(&mut out, &freqs, SAMPLE_RATE);

        let n = 12;
        let expected = (TAU * 440.0 * n as f32 / SAMPLE_RATE).sin();
        assert!((out[n] - expected).abs() < 1e-4, "expected {expected}, got {}", out[n]);
    }

    #[test]
    fn waveforms_stay_bounded() {
        for waveform in [
            OscillatorWaveform::Sine,
            OscillatorWaveform::Sawtooth,
            OscillatorWaveform::Square,
            OscillatorWaveform::Triangle,
        ] {
            let mut osc = OscillatorBlock::new(waveform);
            for _ in 0..4_800 {
                let s = osc.next_sample(523.25, SAMPLE_RATE);
                assert!(s.is_finite() && s.abs() <= 1.5, "{waveform:?} produced {s}");
            }
        }
    }

    #[test]
    fn square_has_no_dc_offset() {
        let mut osc = OscillatorBlock::new(OscillatorWaveform::Square);
        let sum: f32 = (0..48_000).map(|_| osc.next_sample(300.0, SAMPLE_RATE)).sum();
        assert!((sum / 48_000.0).abs() < 0.01, "mean {}", sum / 48_000.0);
    }

    #[test]
    fn zero_frequency_holds_phase() {
        let mut osc = OscillatorBlock::new(OscillatorWaveform::Sawtooth);
        let a = osc.next_sample(0.0, SAMPLE_RATE);
        let b = osc.next_sample(0.0, SAMPLE_RATE);
        assert_eq!(a, b);
    }
}
