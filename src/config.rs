use std::path::{Path, PathBuf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Fixed coordinate space shapes are measured against.
///
/// Timing and pitch are computed relative to this span rather than the
/// on-screen size, so resizing the drawing surface never moves a sound.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceCanvas {
    pub width: f32,
    pub height: f32,
}

impl ReferenceCanvas {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for ReferenceCanvas {
    fn default() -> Self {
        Self::new(800.0, 400.0)
    }
}

/// Length of the repeating loop window, 2..=6 seconds in half-second steps.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "f64", into = "f64"))]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct LoopDuration(f64);

impl LoopDuration {
    pub const MIN: f64 = 2.0;
    pub const MAX: f64 = 6.0;
    pub const STEP: f64 = 0.5;

    /// Accept only values the UI slider can produce.
    pub fn try_new(seconds: f64) -> EngineResult<Self> {
        let on_grid = ((seconds / Self::STEP).round() * Self::STEP - seconds).abs() < 1e-9;
        if seconds.is_finite() && (Self::MIN..=Self::MAX).contains(&seconds) && on_grid {
            Ok(Self(seconds))
        } else {
            Err(EngineError::InvalidLoopDuration(seconds))
        }
    }

    /// Clamp into range and round to the nearest half second.
    pub fn snapped(seconds: f64) -> Self {
        if !seconds.is_finite() {
            return Self::default();
        }
        let clamped = seconds.clamp(Self::MIN, Self::MAX);
        Self((clamped / Self::STEP).round() * Self::STEP)
    }

    pub fn seconds(self) -> f64 {
        self.0
    }
}

impl Default for LoopDuration {
    fn default() -> Self {
        Self(4.0)
    }
}

impl TryFrom<f64> for LoopDuration {
    type Error = EngineError;

    fn try_from(seconds: f64) -> EngineResult<Self> {
        Self::try_new(seconds)
    }
}

impl From<LoopDuration> for f64 {
    fn from(duration: LoopDuration) -> f64 {
        duration.0
    }
}

/// Engine-wide settings.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Sample rate used when no device dictates one (offline rendering)
    pub sample_rate: f32,
    pub loop_duration: LoopDuration,
    /// Gain of the shared bus every voice mixes into
    pub master_gain: f32,
    /// Display refresh rate the frame step is paced to
    pub frame_rate: f32,
    /// Percussive one-shot used by low ellipses; `None` always synthesizes
    pub percussion_sample: Option<PathBuf>,
    pub reference: ReferenceCanvas,
    /// `tracing` level name for the binary's subscriber
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            loop_duration: LoopDuration::default(),
            master_gain: 0.8,
            frame_rate: 60.0,
            percussion_sample: Some(PathBuf::from("assets/kick.wav")),
            reference: ReferenceCanvas::default(),
            log_level: "info".to_string(),
        }
    }
}

#[cfg(feature = "serde")]
impl EngineConfig {
    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> EngineResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validated()
    }

    pub fn load(path: &Path) -> EngineResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

impl EngineConfig {
    fn validated(self) -> EngineResult<Self> {
        if !(self.sample_rate.is_finite() && self.sample_rate >= 8_000.0) {
            return Err(EngineError::Config(format!(
                "sample_rate must be at least 8000 Hz, got {}",
                self.sample_rate
            )));
        }
        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            return Err(EngineError::Config(format!(
                "frame_rate must be positive, got {}",
                self.frame_rate
            )));
        }
        if self.reference.width <= 0.0 || self.reference.height <= 0.0 {
            return Err(EngineError::Config(
                "reference canvas must have a positive size".to_string(),
            ));
        }
        Ok(self)
    }

    /// Resolve the sample path against a base directory (the config file's).
    pub fn resolve_sample_path(&mut self, base: &Path) {
        if let Some(path) = self.percussion_sample.as_mut() {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_duration_accepts_slider_values() {
        for step in 0..=8 {
            let secs = 2.0 + step as f64 * 0.5;
            assert!(LoopDuration::try_new(secs).is_ok(), "{secs} should be accepted");
        }
    }

    #[test]
    fn loop_duration_rejects_off_grid_and_out_of_range() {
        assert!(LoopDuration::try_new(1.5).is_err());
        assert!(LoopDuration::try_new(6.5).is_err());
        assert!(LoopDuration::try_new(3.25).is_err());
        assert!(LoopDuration::try_new(f64::NAN).is_err());
    }

    #[test]
    fn snapping_clamps_and_rounds() {
        assert_eq!(LoopDuration::snapped(0.0).seconds(), 2.0);
        assert_eq!(LoopDuration::snapped(99.0).seconds(), 6.0);
        assert_eq!(LoopDuration::snapped(3.3).seconds(), 3.5);
        assert_eq!(LoopDuration::snapped(f64::INFINITY).seconds(), 4.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn toml_overrides_only_given_keys() {
        let config = EngineConfig::from_toml_str("loop_duration = 2.5\nmaster_gain = 0.5\n")
            .expect("valid config");
        assert_eq!(config.loop_duration.seconds(), 2.5);
        assert_eq!(config.master_gain, 0.5);
        assert_eq!(config.reference, ReferenceCanvas::default());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn toml_rejects_bad_loop_duration() {
        let err = EngineConfig::from_toml_str("loop_duration = 9.0\n").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)), "got {err:?}");
    }

    #[test]
    fn relative_sample_path_is_resolved() {
        let mut config = EngineConfig::default();
        config.resolve_sample_path(Path::new("/etc/synesthesia"));
        assert_eq!(
            config.percussion_sample.as_deref(),
            Some(Path::new("/etc/synesthesia/assets/kick.wav"))
        );
    }
}
