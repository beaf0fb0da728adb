//! Canvas widget - shapes on the loop timeline with playhead and cursor

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::Span,
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Rectangle},
        Block, Borders,
    },
    Frame,
};

use synesthesia::{mapping::MappedShape, Engine, Rgb};

use crate::sketch::Sketch;

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

/// Render the reference canvas. Reference y grows downwards, the terminal
/// canvas upwards, so y is flipped.
pub fn render_canvas(frame: &mut Frame, area: Rect, engine: &Engine, sketch: &Sketch) {
    let reference = engine.config().reference;
    let (width, height) = (reference.width as f64, reference.height as f64);
    let flip = |y: f32| height - y as f64;

    let block = Block::default()
        .title(format!(" Loop {:.1}s ", engine.loop_duration().seconds()))
        .borders(Borders::ALL);

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(|ctx| {
            for shape in engine.shapes() {
                draw_shape(ctx, shape, flip);
                if engine.is_sounding(shape.id()) {
                    let bounds = shape.bounds();
                    ctx.draw(&Rectangle {
                        x: bounds.min_x as f64,
                        y: flip(bounds.max_y),
                        width: bounds.width() as f64,
                        height: bounds.height() as f64,
                        color: Color::White,
                    });
                }
            }

            let playhead = engine.playhead() as f64;
            ctx.draw(&CanvasLine {
                x1: playhead,
                y1: 0.0,
                x2: playhead,
                y2: height,
                color: Color::Yellow,
            });

            let cursor = sketch.cursor();
            ctx.print(
                cursor.x as f64,
                flip(cursor.y),
                Span::styled("+", Style::default().fg(color(sketch.color()))),
            );
        });

    frame.render_widget(canvas, area);
}

fn draw_shape(
    ctx: &mut ratatui::widgets::canvas::Context<'_>,
    shape: &MappedShape,
    flip: impl Fn(f32) -> f64,
) {
    let stroke = color(shape.color());
    for pair in shape.points().windows(2) {
        ctx.draw(&CanvasLine {
            x1: pair[0].x as f64,
            y1: flip(pair[0].y),
            x2: pair[1].x as f64,
            y2: flip(pair[1].y),
            color: stroke,
        });
    }
}
