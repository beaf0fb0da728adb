//! Frequency analyser for the master bus.
//!
//! The audio side keeps a sliding window of the most recent output samples
//! and, once per rendered callback, turns it into a byte spectrum. Snapshots
//! cross to the visualizer through a single-producer/single-consumer ring:
//! the renderer never waits on the reader and the reader never touches
//! renderer state.
//!
//! Byte mapping (per bin):
//!
//! ```text
//! magnitude = |FFT(window · x)| / N
//! smoothed  = τ · smoothed + (1 - τ) · magnitude       τ = 0.8
//! dB        = 20 · log10(smoothed)
//! byte      = 255 · (dB - MIN_DB) / (MAX_DB - MIN_DB)   clamped to 0..=255
//! ```

use std::f32::consts::TAU;
use std::sync::Arc;

use rtrb::{Consumer, Producer, RingBuffer};
use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Samples per analysis window.
pub const FFT_SIZE: usize = 512;
/// Bins published per snapshot (half the window).
pub const FREQUENCY_BINS: usize = FFT_SIZE / 2;

const MIN_DB: f32 = -100.0;
const MAX_DB: f32 = -30.0;
const SMOOTHING: f32 = 0.8;
const SNAPSHOT_QUEUE_SIZE: usize = 8;

/// One byte-per-bin spectrum, low bins first.
pub type FrequencyData = [u8; FREQUENCY_BINS];

pub struct Analyser {
    fft: Arc<dyn Fft<f32>>,
    /// Blackman window coefficients
    window: Vec<f32>,
    /// Circular history of the most recent output samples
    history: Vec<f32>,
    write_pos: usize,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

impl Analyser {
    pub fn new() -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);

        let window = (0..FFT_SIZE)
            .map(|i| {
                let phase = TAU * i as f32 / FFT_SIZE as f32;
                0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos()
            })
            .collect();

        Self {
            fft,
            window,
            history: vec![0.0; FFT_SIZE],
            write_pos: 0,
            scratch: vec![Complex::new(0.0, 0.0); FFT_SIZE],
            smoothed: vec![0.0; FREQUENCY_BINS],
        }
    }

    /// Append freshly rendered samples to the analysis window.
    pub fn push(&mut self, block: &[f32]) {
        for &sample in block {
            self.history[self.write_pos] = sample;
            self.write_pos = (self.write_pos + 1) % FFT_SIZE;
        }
    }

    /// Transform the current window and write the byte spectrum into `out`.
    pub fn frequency_data(&mut self, out: &mut FrequencyData) {
        // Oldest sample first so the window lines up with time
        for i in 0..FFT_SIZE {
            let sample = self.history[(self.write_pos + i) % FFT_SIZE];
            self.scratch[i] = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process(&mut self.scratch);

        let scale = 1.0 / FFT_SIZE as f32;
        for (bin, (smoothed, byte)) in self.smoothed.iter_mut().zip(out.iter_mut()).enumerate() {
            let magnitude = self.scratch[bin].norm() * scale;
            *smoothed = SMOOTHING * *smoothed + (1.0 - SMOOTHING) * magnitude;

            let db = 20.0 * smoothed.max(1e-12).log10();
            let normalized = (db - MIN_DB) / (MAX_DB - MIN_DB);
            *byte = (normalized * 255.0).clamp(0.0, 255.0) as u8;
        }
    }

    pub fn reset(&mut self) {
        self.history.fill(0.0);
        self.smoothed.fill(0.0);
        self.write_pos = 0;
    }
}

impl Default for Analyser {
    fn default() -> Self {
        Self::new()
    }
}

/// Renderer-side end of the spectrum channel.
pub struct SpectrumTap {
    tx: Producer<FrequencyData>,
}

impl SpectrumTap {
    /// Publish a snapshot; dropped silently when the reader lags behind.
    pub fn publish(&mut self, data: &FrequencyData) {
        let _ = self.tx.push(*data);
    }

    pub fn is_abandoned(&self) -> bool {
        self.tx.is_abandoned()
    }
}

/// Read-only view of the latest spectrum, sampled on the reader's cadence.
pub struct SpectrumReader {
    rx: Consumer<FrequencyData>,
    latest: FrequencyData,
}

impl SpectrumReader {
    /// Drain pending snapshots and return the most recent one.
    pub fn latest(&mut self) -> &FrequencyData {
        while let Ok(snapshot) = self.rx.pop() {
            self.latest = snapshot;
        }
        &self.latest
    }
}

/// Create a connected tap/reader pair.
pub fn spectrum_channel() -> (SpectrumTap, SpectrumReader) {
    let (tx, rx) = RingBuffer::<FrequencyData>::new(SNAPSHOT_QUEUE_SIZE);
    (
        SpectrumTap { tx },
        SpectrumReader {
            rx,
            latest: [0; FREQUENCY_BINS],
        },
    )
}
