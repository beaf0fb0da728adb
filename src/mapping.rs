//! Geometry and color to audio parameters.
//!
//! ```text
//!  x ──▶ when     minX / width            → relative start
//!                 (maxX - minX) / width   → relative length
//!  y ──▶ pitch    1 - avgY / height       → one of six scale degrees (top = high)
//!  size ─▶ volume ellipses only; others fixed
//!  red ──▶ distortion   r / 255
//!  blue ─▶ timbre       b / 255
//! ```
//!
//! Everything is measured against a fixed reference canvas rather than the
//! on-screen size, so resizing the drawing surface never moves a shape in
//! time or pitch.

use crate::config::ReferenceCanvas;
use crate::shape::{Instrument, Point, Rgb, Shape, ShapeId};

/// One octave, six degrees: C4 D4 E4 G4 A4 C5.
pub const SCALE: [f32; 6] = [261.63, 293.66, 329.63, 392.0, 440.0, 523.25];

/// Volume for every instrument except ellipses.
pub const DEFAULT_VOLUME: f32 = 0.8;
/// Ellipse volume before the size term.
pub const ELLIPSE_BASE_VOLUME: f32 = 0.5;
/// Ellipse volume gained by covering the full reference quadrant.
pub const ELLIPSE_VOLUME_RANGE: f32 = 2.5;
/// Upper bound on ellipse volume; very large ellipses would otherwise grow
/// without limit.
pub const VOLUME_CEILING: f32 = 3.0;

/// Axis-aligned bounds of a shape, in reference canvas units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl BoundingBox {
    pub fn of(points: &[Point]) -> Self {
        points.iter().fold(
            BoundingBox {
                min_x: f32::INFINITY,
                max_x: f32::NEG_INFINITY,
                min_y: f32::INFINITY,
                max_y: f32::NEG_INFINITY,
            },
            |b, p| BoundingBox {
                min_x: b.min_x.min(p.x),
                max_x: b.max_x.max(p.x),
                min_y: b.min_y.min(p.y),
                max_y: b.max_y.max(p.y),
            },
        )
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// True if `point` lies within the bounds grown by `padding` on every side.
    pub fn contains_padded(&self, point: Point, padding: f32) -> bool {
        point.x >= self.min_x - padding
            && point.x <= self.max_x + padding
            && point.y >= self.min_y - padding
            && point.y <= self.max_y + padding
    }
}

/// A finished shape annotated with everything the scheduler and the voice
/// builders need. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedShape {
    id: ShapeId,
    instrument: Instrument,
    color: Rgb,
    points: Vec<Point>,
    bounds: BoundingBox,
    relative_start: f32,
    relative_width: f32,
    pitch_index: usize,
    volume: f32,
    distortion: f32,
    timbre: f32,
}

impl MappedShape {
    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn instrument(&self) -> Instrument {
        self.instrument
    }

    /// The color active when the shape was mapped.
    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// Start of the shape as a fraction of the loop.
    pub fn relative_start(&self) -> f32 {
        self.relative_start
    }

    /// Length of the shape as a fraction of the loop. `start + width` may
    /// exceed 1.0.
    pub fn relative_width(&self) -> f32 {
        self.relative_width
    }

    /// Index into [`SCALE`], always in `0..SCALE.len()`.
    pub fn pitch_index(&self) -> usize {
        self.pitch_index
    }

    pub fn frequency(&self) -> f32 {
        SCALE[self.pitch_index]
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Red channel, 0.0..=1.0.
    pub fn distortion(&self) -> f32 {
        self.distortion
    }

    /// Blue channel, 0.0..=1.0.
    pub fn timbre(&self) -> f32 {
        self.timbre
    }
}

/// Maps shapes against a fixed reference canvas.
#[derive(Debug, Clone, Copy)]
pub struct ParameterMapper {
    reference: ReferenceCanvas,
}

impl ParameterMapper {
    pub fn new(reference: ReferenceCanvas) -> Self {
        Self { reference }
    }

    pub fn reference(&self) -> ReferenceCanvas {
        self.reference
    }

    /// Derive audio parameters from `shape`, reading distortion and timbre
    /// from `selected` (the color active when the shape was finished).
    pub fn map(&self, shape: &Shape, selected: Rgb) -> MappedShape {
        let bounds = BoundingBox::of(shape.points());
        let ReferenceCanvas { width, height } = self.reference;

        let relative_start = bounds.min_x / width;
        let relative_width = bounds.width() / width;

        MappedShape {
            id: shape.id(),
            instrument: shape.kind(),
            color: selected,
            points: shape.points().to_vec(),
            bounds,
            relative_start,
            relative_width,
            pitch_index: self.pitch_index(&bounds),
            volume: self.volume(shape.kind(), &bounds),
            distortion: selected.r as f32 / 255.0,
            timbre: selected.b as f32 / 255.0,
        }
    }

    fn pitch_index(&self, bounds: &BoundingBox) -> usize {
        let avg_y = (bounds.min_y + bounds.max_y) / 2.0;
        let normalized = 1.0 - avg_y / self.reference.height;
        let raw = (normalized * SCALE.len() as f32).floor();
        // NaN (non-finite points) lands on the lowest degree
        if raw.is_nan() {
            return 0;
        }
        raw.clamp(0.0, (SCALE.len() - 1) as f32) as usize
    }

    fn volume(&self, instrument: Instrument, bounds: &BoundingBox) -> f32 {
        match instrument {
            Instrument::Ellipse => {
                let max_area = self.reference.width * 0.5 * (self.reference.height * 0.5);
                let volume = ELLIPSE_BASE_VOLUME + (bounds.area() / max_area) * ELLIPSE_VOLUME_RANGE;
                volume.min(VOLUME_CEILING)
            }
            Instrument::Freehand | Instrument::Line | Instrument::Squiggle => DEFAULT_VOLUME,
        }
    }
}

impl Default for ParameterMapper {
    fn default() -> Self {
        Self::new(ReferenceCanvas::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(kind: Instrument, points: &[(f32, f32)]) -> Shape {
        let points = points.iter().map(|&(x, y)| Point::new(x, y)).collect();
        Shape::new(kind, points, Rgb::DEFAULT_BRUSH).expect("at least two points")
    }

    #[test]
    fn timing_is_relative_to_reference_width() {
        let mapper = ParameterMapper::default();
        let mapped = mapper.map(
            &shape(Instrument::Line, &[(200.0, 100.0), (400.0, 120.0)]),
            Rgb::DEFAULT_BRUSH,
        );
        assert_eq!(mapped.relative_start(), 0.25);
        assert_eq!(mapped.relative_width(), 0.25);
    }

    #[test]
    fn timing_is_resolution_independent() {
        let points = [(120.0, 40.0), (330.0, 90.0), (250.0, 60.0)];
        let small = ParameterMapper::new(ReferenceCanvas::new(800.0, 400.0))
            .map(&shape(Instrument::Freehand, &points), Rgb::DEFAULT_BRUSH);

        let doubled: Vec<(f32, f32)> = points.iter().map(|&(x, y)| (x * 2.0, y * 2.0)).collect();
        let large = ParameterMapper::new(ReferenceCanvas::new(1_600.0, 800.0))
            .map(&shape(Instrument::Freehand, &doubled), Rgb::DEFAULT_BRUSH);

        assert_eq!(small.relative_start(), large.relative_start());
        assert_eq!(small.relative_width(), large.relative_width());
        assert_eq!(small.pitch_index(), large.pitch_index());
    }

    #[test]
    fn top_of_canvas_is_highest_pitch() {
        let mapper = ParameterMapper::default();
        let top = mapper.map(&shape(Instrument::Line, &[(0.0, 0.0), (10.0, 10.0)]), Rgb::DEFAULT_BRUSH);
        let bottom =
            mapper.map(&shape(Instrument::Line, &[(0.0, 390.0), (10.0, 400.0)]), Rgb::DEFAULT_BRUSH);

        assert_eq!(top.pitch_index(), 5);
        assert_eq!(top.frequency(), 523.25);
        assert_eq!(bottom.pitch_index(), 0);
        assert_eq!(bottom.frequency(), 261.63);
    }

    #[test]
    fn pitch_clamps_instead_of_wrapping() {
        let mapper = ParameterMapper::default();
        for y in [-10_000.0, -401.0, -1.0, 0.0, 200.0, 400.0, 401.0, 10_000.0] {
            let mapped = mapper.map(
                &shape(Instrument::Squiggle, &[(0.0, y), (5.0, y)]),
                Rgb::DEFAULT_BRUSH,
            );
            assert!(mapped.pitch_index() <= 5, "y={y} gave {}", mapped.pitch_index());
            assert!(SCALE.contains(&mapped.frequency()));
        }

        let above = mapper.map(&shape(Instrument::Line, &[(0.0, -500.0), (1.0, -500.0)]), Rgb::DEFAULT_BRUSH);
        let below = mapper.map(&shape(Instrument::Line, &[(0.0, 900.0), (1.0, 900.0)]), Rgb::DEFAULT_BRUSH);
        assert_eq!(above.pitch_index(), 5);
        assert_eq!(below.pitch_index(), 0);
    }

    #[test]
    fn ellipse_volume_grows_with_area() {
        let mapper = ParameterMapper::default();
        // Quarter of the max area (400 x 100 out of 400 x 200)
        let quarter = mapper.map(
            &shape(Instrument::Ellipse, &[(0.0, 0.0), (200.0, 100.0)]),
            Rgb::DEFAULT_BRUSH,
        );
        assert!((quarter.volume() - (0.5 + 0.25 * 2.5)).abs() < 1e-6);

        let degenerate = mapper.map(
            &shape(Instrument::Ellipse, &[(10.0, 10.0), (10.0, 10.0)]),
            Rgb::DEFAULT_BRUSH,
        );
        assert_eq!(degenerate.volume(), 0.5);
        assert_eq!(degenerate.relative_width(), 0.0);
    }

    #[test]
    fn huge_ellipse_hits_ceiling() {
        let mapper = ParameterMapper::default();
        let mapped = mapper.map(
            &shape(Instrument::Ellipse, &[(0.0, 0.0), (800.0, 400.0)]),
            Rgb::DEFAULT_BRUSH,
        );
        assert_eq!(mapped.volume(), VOLUME_CEILING);
    }

    #[test]
    fn other_instruments_use_fixed_volume() {
        let mapper = ParameterMapper::default();
        for kind in [Instrument::Freehand, Instrument::Line, Instrument::Squiggle] {
            let mapped = mapper.map(&shape(kind, &[(0.0, 0.0), (800.0, 400.0)]), Rgb::DEFAULT_BRUSH);
            assert_eq!(mapped.volume(), DEFAULT_VOLUME);
        }
    }

    #[test]
    fn red_and_blue_drive_distortion_and_timbre() {
        let mapper = ParameterMapper::default();
        let mapped = mapper.map(
            &shape(Instrument::Line, &[(0.0, 0.0), (10.0, 0.0)]),
            Rgb::new(255, 17, 0),
        );
        assert_eq!(mapped.distortion(), 1.0);
        assert_eq!(mapped.timbre(), 0.0);
        assert_eq!(mapped.color(), Rgb::new(255, 17, 0));
    }

    #[test]
    fn keeps_identity_and_geometry() {
        let mapper = ParameterMapper::default();
        let source = shape(Instrument::Squiggle, &[(10.0, 20.0), (30.0, 5.0), (50.0, 40.0)]);
        let mapped = mapper.map(&source, Rgb::DEFAULT_BRUSH);

        assert_eq!(mapped.id(), source.id());
        assert_eq!(mapped.instrument(), Instrument::Squiggle);
        assert_eq!(mapped.points(), source.points());
        assert_eq!(
            mapped.bounds(),
            BoundingBox { min_x: 10.0, max_x: 50.0, min_y: 5.0, max_y: 40.0 }
        );
    }

    #[test]
    fn padded_hit_test() {
        let bounds = BoundingBox { min_x: 100.0, max_x: 200.0, min_y: 50.0, max_y: 60.0 };
        assert!(bounds.contains_padded(Point::new(85.0, 40.0), 20.0));
        assert!(!bounds.contains_padded(Point::new(79.0, 55.0), 20.0));
    }
}
