use std::io::Read;
use std::path::Path;

use rand::Rng;

use crate::error::{EngineError, EngineResult};

/// Mono block of sampled audio shared between voices.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: f32,
    samples: Vec<f32>,
}

impl AudioBuffer {
    pub fn new(sample_rate: f32, samples: Vec<f32>) -> Self {
        Self {
            sample_rate,
            samples,
        }
    }

    /// White noise: every sample an independent uniform draw in [-1, 1].
    pub fn noise<R: Rng + ?Sized>(sample_rate: f32, seconds: f32, rng: &mut R) -> Self {
        let len = (sample_rate * seconds).round().max(1.0) as usize;
        let samples = (0..len).map(|_| rng.gen_range(-1.0f32..=1.0)).collect();
        Self::new(sample_rate, samples)
    }

    /// Decode a WAV file, mixing all channels down to mono.
    pub fn from_wav(path: &Path) -> EngineResult<Self> {
        let reader = hound::WavReader::open(path)?;
        Self::decode(reader)
    }

    /// Decode WAV data from any reader (in-memory bytes, network body).
    pub fn from_wav_reader<R: Read>(reader: R) -> EngineResult<Self> {
        let reader = hound::WavReader::new(reader)?;
        Self::decode(reader)
    }

    fn decode<R: Read>(mut reader: hound::WavReader<R>) -> EngineResult<Self> {
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<_, _>>()?,
            hound::SampleFormat::Int => {
                let max_val = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / max_val))
                    .collect::<Result<_, _>>()?
            }
        };

        if interleaved.len() < channels {
            return Err(EngineError::EmptySample);
        }

        let mono = interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();

        Ok(Self::new(spec.sample_rate as f32, mono))
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Read at a fractional frame position with linear interpolation.
    /// Positions past the end read silence.
    #[inline]
    pub fn read_interpolated(&self, position: f64) -> f32 {
        if position < 0.0 {
            return 0.0;
        }
        let index = position as usize;
        let Some(&current) = self.samples.get(index) else {
            return 0.0;
        };
        let frac = (position - index as f64) as f32;
        let next = self.samples.get(index + 1).copied().unwrap_or(0.0);
        current + (next - current) * frac
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::io::Cursor;

    fn wav_bytes(spec: hound::WavSpec, frames: &[i16]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("writer");
            for &s in frames {
                writer.write_sample(s).expect("write");
            }
            writer.finalize().expect("finalize");
        }
        cursor.into_inner()
    }

    #[test]
    fn noise_has_two_seconds_of_bounded_samples() {
        let mut rng = StdRng::seed_from_u64(7);
        let buffer = AudioBuffer::noise(48_000.0, 2.0, &mut rng);

        assert_eq!(buffer.len(), 96_000);
        assert!(buffer.samples().iter().all(|s| (-1.0..=1.0).contains(s)));
        let mean: f32 = buffer.samples().iter().sum::<f32>() / buffer.len() as f32;
        assert!(mean.abs() < 0.02, "noise should be centred, mean {mean}");
    }

    #[test]
    fn decodes_stereo_int_wav_to_mono() {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 44_100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let bytes = wav_bytes(spec, &[16_384, 0, -16_384, -16_384]);
        let buffer = AudioBuffer::from_wav_reader(Cursor::new(bytes)).expect("decode");

        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.sample_rate(), 44_100.0);
        assert!((buffer.samples()[0] - 0.25).abs() < 1e-4);
        assert!((buffer.samples()[1] + 0.5).abs() < 1e-4);
    }

    #[test]
    fn empty_wav_is_rejected() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 44_100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let bytes = wav_bytes(spec, &[]);
        let err = AudioBuffer::from_wav_reader(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, EngineError::EmptySample), "got {err:?}");
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = AudioBuffer::from_wav_reader(Cursor::new(b"not a wav".to_vec())).unwrap_err();
        assert!(matches!(err, EngineError::Decode(_) | EngineError::Io(_)), "got {err:?}");
    }

    #[test]
    fn interpolates_between_frames() {
        let buffer = AudioBuffer::new(10.0, vec![0.0, 1.0]);
        assert!((buffer.read_interpolated(0.5) - 0.5).abs() < 1e-6);
        assert_eq!(buffer.read_interpolated(2.0), 0.0);
        assert_eq!(buffer.read_interpolated(-1.0), 0.0);
    }
}
