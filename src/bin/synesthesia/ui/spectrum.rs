//! Spectrum widget - the analyser's byte bins as a bar graph

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Sparkline},
    Frame,
};

use synesthesia::dsp::FrequencyData;

/// Render the frequency bars, folding bins into the available columns by
/// taking each column's loudest bin.
pub fn render_spectrum(frame: &mut Frame, area: Rect, bins: &FrequencyData) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);
    let columns = block.inner(area).width.max(1) as usize;

    let per_column = bins.len().div_ceil(columns).max(1);
    let data: Vec<u64> = bins
        .chunks(per_column)
        .map(|chunk| chunk.iter().copied().max().unwrap_or(0) as u64)
        .collect();

    let sparkline = Sparkline::default()
        .block(block)
        .data(&data)
        .max(u8::MAX as u64)
        .style(Style::default().fg(Color::Green));

    frame.render_widget(sparkline, area);
}
