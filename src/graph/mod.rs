//! Composable building blocks for constructing voice graphs.
//!
//! Graph nodes wrap the low-level DSP primitives with what a voice needs:
//! a scheduled start/stop window, automation evaluated against the audio
//! clock, and block-based rendering. The `extensions` module adds fluent
//! helpers so chains read in signal order.

/// Fluent combinators (`.through()`, `.boxed()`).
pub mod extensions;
/// Topology-preserving filter node with an automatable cutoff.
pub mod filter;
/// Automated gain stage (voice envelopes, release fades).
pub mod gain;
/// Core traits shared by all graph nodes.
pub mod node;
/// Audio-band oscillator source.
pub mod oscillator;
/// One-shot sample buffer source.
pub mod sampler;
/// Waveshaping distortion node.
pub mod shaper;
/// Serial chaining of two nodes (source → effect).
pub mod through;
/// Complete per-shape voice graphs.
pub mod voice;

pub use extensions::NodeExt;
pub use node::{GraphNode, RenderCtx, SourceNode};
pub use voice::{VoiceGraph, VoiceKind};
