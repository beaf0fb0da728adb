//! Transport bar widget - play state, loop length, voices and the brush

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use synesthesia::Engine;

use crate::sketch::Sketch;

fn sample_status(engine: &Engine) -> &'static str {
    let buffers = engine.buffers();
    if buffers.percussion().is_some() {
        "kick: sample"
    } else if buffers.is_loading() {
        "kick: loading"
    } else {
        "kick: synth"
    }
}

/// Render the transport bar
pub fn render_transport(frame: &mut Frame, area: Rect, engine: &Engine, sketch: &Sketch) {
    let block = Block::default().title(" synesthesia ").borders(Borders::ALL);

    let playing = engine.is_playing();
    let play_symbol = if playing { "▶" } else { "⏸" };
    let play_state_str = if playing { "Playing" } else { "Paused" };
    let brush = sketch.color();

    let line = Line::from(vec![
        Span::styled(
            format!(" {} {}  ", play_symbol, play_state_str),
            Style::default().fg(if playing { Color::Green } else { Color::Yellow }),
        ),
        Span::styled(
            format!("Loop: {:.1}s  ", engine.loop_duration().seconds()),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("Shapes: {}  Voices: {}  ", engine.shapes().len(), engine.live_voices()),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("{} {:.0}  ", sketch.tool(), sketch.size()),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(
            format!("{}  ", brush.to_hex()),
            Style::default().fg(Color::Rgb(brush.r, brush.g, brush.b)),
        ),
        Span::styled(sample_status(engine), Style::default().fg(Color::DarkGray)),
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}
