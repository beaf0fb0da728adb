//! Low-level DSP primitives used by the higher level graph nodes.
//!
//! These components are allocation-free once constructed, making them safe to
//! embed directly inside voice graphs. They stay focused on the
//! signal-processing math so graph nodes can layer on scheduling and
//! playback windows.

/// FFT analyser and the snapshot channel that feeds the visualizer.
pub mod analyser;
/// Scheduled parameter timelines (set / linear / exponential ramps).
pub mod automation;
/// Mono sample buffers: generated noise and decoded WAV files.
pub mod buffer;
/// Waveshaping transfer curves.
pub mod distortion;
/// State-variable filter implementation with multiple responses.
pub mod filter;
/// Band-limited oscillator waveforms.
pub mod oscillator;

pub use analyser::{FrequencyData, SpectrumReader, FREQUENCY_BINS};
pub use automation::{Automation, SILENCE_FLOOR};
pub use buffer::AudioBuffer;
pub use distortion::DistortionCurve;
