//! TUI for synesthesia
//!
//! Shows the shapes on the loop timeline, the playhead and the output
//! spectrum, and turns key presses into drawing-surface events.

mod canvas;
mod spectrum;
mod transport;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use tracing::debug;

use synesthesia::{
    dsp::{FrequencyData, SpectrumReader, FREQUENCY_BINS},
    Engine, FrameTicker, Instrument,
};

use super::sketch::Sketch;

use canvas::render_canvas;
use spectrum::render_spectrum;
use transport::render_transport;

const HELP: &str = " [←↑↓→] Move  [1-4] Tool  [[ ]] Size  [Enter] Draw  [E] Erase  [U] Undo  \
[C] Clear  [K] Color  [Space] Play/Pause  [+/-] Loop  [Q] Quit";

pub struct SketchApp {
    engine: Engine,
    spectrum: SpectrumReader,
    /// Latest analyser snapshot
    bins: FrequencyData,
    sketch: Sketch,
    ticker: FrameTicker,
    should_quit: bool,
}

impl SketchApp {
    pub fn new(engine: Engine, spectrum: SpectrumReader, sketch: Sketch, ticker: FrameTicker) -> Self {
        Self {
            engine,
            spectrum,
            bins: [0; FREQUENCY_BINS],
            sketch,
            ticker,
            should_quit: false,
        }
    }

    /// One engine frame, one redraw and any pending key press per tick.
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            if !self.engine.frame() {
                break;
            }
            self.bins = *self.spectrum.latest();

            terminal.draw(|frame| self.render(frame))?;

            if event::poll(self.ticker.wait())? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        self.engine.teardown();
        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Left => self.sketch.move_by(-1.0, 0.0),
            KeyCode::Right => self.sketch.move_by(1.0, 0.0),
            KeyCode::Up => self.sketch.move_by(0.0, -1.0),
            KeyCode::Down => self.sketch.move_by(0.0, 1.0),
            KeyCode::Char('[') => self.sketch.resize(-1.0),
            KeyCode::Char(']') => self.sketch.resize(1.0),
            KeyCode::Char('1') => self.sketch.select(Instrument::Freehand),
            KeyCode::Char('2') => self.sketch.select(Instrument::Line),
            KeyCode::Char('3') => self.sketch.select(Instrument::Ellipse),
            KeyCode::Char('4') => self.sketch.select(Instrument::Squiggle),
            KeyCode::Char('k') => self.sketch.next_color(),
            KeyCode::Enter => {
                if let Some(shape) = self.sketch.stroke() {
                    self.engine.on_shape_finished_with(self.sketch.color(), shape);
                }
            }
            KeyCode::Char('e') => match self.engine.shape_at(self.sketch.cursor()) {
                Some(id) => {
                    self.engine.on_shape_deleted(id);
                }
                None => debug!("eraser found nothing under the cursor"),
            },
            KeyCode::Char('u') => {
                self.engine.undo_last();
            }
            KeyCode::Char('c') => self.engine.on_clear_all(),
            KeyCode::Char(' ') => {
                let playing = self.engine.is_playing();
                self.engine.set_playing(!playing);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                let seconds = self.engine.loop_duration().seconds();
                self.engine.set_loop_duration(seconds + 0.5);
            }
            KeyCode::Char('-') => {
                let seconds = self.engine.loop_duration().seconds();
                self.engine.set_loop_duration(seconds - 0.5);
            }
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Transport bar
                Constraint::Min(10),   // Canvas
                Constraint::Length(8), // Spectrum
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        render_transport(frame, chunks[0], &self.engine, &self.sketch);
        render_canvas(frame, chunks[1], &self.engine, &self.sketch);
        render_spectrum(frame, chunks[2], &self.bins);

        let help = Paragraph::new(HELP).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}
