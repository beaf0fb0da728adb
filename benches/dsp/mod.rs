//! Benchmarks for low-level DSP primitives.

mod analyser;
mod distortion;
mod filter;
mod oscillator;

pub use analyser::bench_analyser;
pub use distortion::bench_distortion;
pub use filter::bench_filter;
pub use oscillator::bench_oscillator;
