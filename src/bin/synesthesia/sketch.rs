//! Keyboard stand-in for the drawing surface.
//!
//! A cursor moves over the reference canvas and stamps a stroke of the
//! selected instrument at its position. Strokes are generated point lists,
//! the same shape a pointer drag would have produced.

use std::f32::consts::TAU;

use synesthesia::{Instrument, Point, ReferenceCanvas, Rgb, Shape};

/// Brush colors cycled with `k`, from the default blue towards red.
pub const PALETTE: [Rgb; 6] = [
    Rgb::DEFAULT_BRUSH,
    Rgb::new(0x00, 0xC8, 0xFF),
    Rgb::new(0x80, 0x40, 0xFF),
    Rgb::new(0xFF, 0x00, 0xFF),
    Rgb::new(0xFF, 0x80, 0x00),
    Rgb::new(0xFF, 0x00, 0x00),
];

const STEP: f32 = 10.0;
const MIN_SIZE: f32 = 10.0;
const MAX_SIZE: f32 = 400.0;
const STROKE_POINTS: usize = 32;

pub struct Sketch {
    reference: ReferenceCanvas,
    cursor: Point,
    size: f32,
    tool: Instrument,
    color: usize,
}

impl Sketch {
    pub fn new(reference: ReferenceCanvas) -> Self {
        Self {
            reference,
            cursor: Point::new(reference.width / 4.0, reference.height / 2.0),
            size: 100.0,
            tool: Instrument::Line,
            color: 0,
        }
    }

    pub fn cursor(&self) -> Point {
        self.cursor
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn tool(&self) -> Instrument {
        self.tool
    }

    pub fn color(&self) -> Rgb {
        PALETTE[self.color]
    }

    pub fn move_by(&mut self, dx: f32, dy: f32) {
        self.cursor = Point::new(
            (self.cursor.x + dx * STEP).clamp(0.0, self.reference.width),
            (self.cursor.y + dy * STEP).clamp(0.0, self.reference.height),
        );
    }

    pub fn resize(&mut self, steps: f32) {
        self.size = (self.size + steps * STEP).clamp(MIN_SIZE, MAX_SIZE);
    }

    pub fn select(&mut self, tool: Instrument) {
        self.tool = tool;
    }

    pub fn next_color(&mut self) {
        self.color = (self.color + 1) % PALETTE.len();
    }

    /// Stroke for the current tool, starting at the cursor and extending
    /// `size` units to the right.
    pub fn stroke(&self) -> Option<Shape> {
        let Point { x, y } = self.cursor;
        let size = self.size;
        let points: Vec<Point> = match self.tool {
            Instrument::Line => vec![Point::new(x, y), Point::new(x + size, y)],
            Instrument::Ellipse => {
                let radius = size / 2.0;
                (0..=STROKE_POINTS)
                    .map(|i| {
                        let angle = i as f32 / STROKE_POINTS as f32 * TAU;
                        Point::new(
                            x + radius + radius * angle.cos(),
                            y + radius * angle.sin(),
                        )
                    })
                    .collect()
            }
            Instrument::Squiggle => (0..=STROKE_POINTS)
                .map(|i| {
                    let offset = if i % 2 == 0 { -8.0 } else { 8.0 };
                    Point::new(x + size * i as f32 / STROKE_POINTS as f32, y + offset)
                })
                .collect(),
            Instrument::Freehand => (0..=STROKE_POINTS)
                .map(|i| {
                    let t = i as f32 / STROKE_POINTS as f32;
                    Point::new(x + size * t, y + 12.0 * (t * TAU * 1.5).sin())
                })
                .collect(),
        };
        Shape::new(self.tool, points, self.color())
    }
}
