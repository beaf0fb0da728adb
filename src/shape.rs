//! Finished shapes handed over by the drawing surface.
//!
//! A [`Shape`] is immutable once built: editing a shape on the canvas is
//! modelled as deleting it and finishing a new one, so every id seen by the
//! engine refers to exactly one fixed geometry for its whole lifetime.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SHAPE_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a shape, used as the voice registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShapeId(pub u64);

impl ShapeId {
    /// Allocate the next process-wide id (monotonic, never reused).
    pub fn next() -> Self {
        ShapeId(NEXT_SHAPE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A point in reference-canvas coordinates (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Stroke color as 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Default brush color (pure blue).
    pub const DEFAULT_BRUSH: Rgb = Rgb::new(0x00, 0x00, 0xFF);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` (leading `#` optional).
    ///
    /// Malformed input yields [`Rgb::DEFAULT_BRUSH`] rather than an error; a
    /// bad color should never cost the user their shape.
    pub fn from_hex(hex: &str) -> Self {
        Self::try_from_hex(hex).unwrap_or(Self::DEFAULT_BRUSH)
    }

    fn try_from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
        Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::DEFAULT_BRUSH
    }
}

/// Geometric type of a shape, which doubles as its instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Instrument {
    /// Free-drawn stroke: quiet square-wave lead
    #[default]
    Freehand,
    /// Straight line: band-passed sawtooth stab
    Line,
    /// Ellipse: percussion (kick below 350 Hz, noise hat above)
    Ellipse,
    /// Squiggle: resonant acid bass
    Squiggle,
}

impl Instrument {
    pub const ALL: [Instrument; 4] = [
        Instrument::Freehand,
        Instrument::Line,
        Instrument::Ellipse,
        Instrument::Squiggle,
    ];

    /// Parse the UI's tool tag. Unknown tags play as [`Instrument::Freehand`].
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_uppercase().as_str() {
            "LINE" => Instrument::Line,
            "ELLIPSE" | "CIRCLE" => Instrument::Ellipse,
            "SQUIGGLE" => Instrument::Squiggle,
            _ => Instrument::Freehand,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Instrument::Freehand => "FREEHAND",
            Instrument::Line => "LINE",
            Instrument::Ellipse => "ELLIPSE",
            Instrument::Squiggle => "SQUIGGLE",
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A finished stroke as produced by the drawing surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    id: ShapeId,
    kind: Instrument,
    points: Vec<Point>,
    color: Rgb,
}

impl Shape {
    /// Finish a shape with a freshly allocated id.
    ///
    /// Returns `None` for strokes with fewer than two points (a click, not a
    /// shape).
    pub fn new(kind: Instrument, points: Vec<Point>, color: Rgb) -> Option<Self> {
        Self::with_id(ShapeId::next(), kind, points, color)
    }

    /// Finish a shape with a caller-chosen id.
    pub fn with_id(id: ShapeId, kind: Instrument, points: Vec<Point>, color: Rgb) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        Some(Self {
            id,
            kind,
            points,
            color,
        })
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn kind(&self) -> Instrument {
        self.kind
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn color(&self) -> Rgb {
        self.color
    }
}
