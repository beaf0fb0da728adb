//! Real-world scenario benchmarks.
//!
//! Complete instrument chains as the factory builds them, a context mixing a
//! crowded canvas, and the per-frame scheduler step.

mod frame;
mod voices;

pub use frame::bench_frame;
pub use voices::bench_voices;
