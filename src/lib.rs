pub mod buffers; // Shared noise and percussion buffers
pub mod config;
pub mod context; // Clock, master bus, live voice graphs
pub mod dsp;
pub mod engine;
pub mod error;
pub mod graph; // Composable audio graph nodes
pub mod instruments; // One signal chain per instrument
pub mod mapping; // Shape geometry and color to audio parameters
pub mod scheduler; // Per-frame loop driver
pub mod shape;

pub use config::{EngineConfig, LoopDuration, ReferenceCanvas};
pub use engine::{Engine, FrameTicker};
pub use error::{EngineError, EngineResult};
pub use shape::{Instrument, Point, Rgb, Shape, ShapeId};

pub const MAX_BLOCK_SIZE: usize = 2048;
