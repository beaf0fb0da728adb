use std::fmt;

/// Errors surfaced by the engine's fallible edges (loading, configuration,
/// device setup). Nothing on the per-frame path returns one of these.
#[derive(Debug)]
pub enum EngineError {
    /// Reading a file failed
    Io(std::io::Error),
    /// A sample file could not be decoded
    Decode(String),
    /// A decoded sample contained no frames
    EmptySample,
    /// Loop duration outside 2..=6 seconds or off the half-second grid
    InvalidLoopDuration(f64),
    /// The audio context has already been closed
    ContextClosed,
    /// Configuration could not be parsed
    Config(String),
    /// Output device could not be opened or driven
    AudioDevice(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Io(e) => write!(f, "IO error: {}", e),
            EngineError::Decode(msg) => write!(f, "Failed to decode sample: {}", msg),
            EngineError::EmptySample => write!(f, "Sample contains no audio frames"),
            EngineError::InvalidLoopDuration(secs) => {
                write!(f, "Loop duration {secs}s must be 2..=6 seconds in 0.5s steps")
            }
            EngineError::ContextClosed => write!(f, "Audio context is closed"),
            EngineError::Config(msg) => write!(f, "Configuration error: {}", msg),
            EngineError::AudioDevice(msg) => write!(f, "Audio device error: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::Io(e)
    }
}

impl From<hound::Error> for EngineError {
    fn from(e: hound::Error) -> Self {
        match e {
            hound::Error::IoError(io) => EngineError::Io(io),
            other => EngineError::Decode(other.to_string()),
        }
    }
}

#[cfg(feature = "serde")]
impl From<toml::de::Error> for EngineError {
    fn from(e: toml::de::Error) -> Self {
        EngineError::Config(e.to_string())
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
