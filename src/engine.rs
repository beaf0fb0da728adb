//! The controller the drawing surface talks to.
//!
//! [`Engine`] owns the shared audio context, the buffer library, the mapped
//! shape list and the loop scheduler. The host calls [`Engine::frame`] once
//! per display refresh and forwards user edits through the `on_*` methods;
//! every method returns immediately.
//!
//! ```ignore
//! let mut engine = Engine::new(EngineConfig::default());
//! engine.set_playhead_sink(|x: f32| redraw_playhead(x));
//! engine.start();
//! let mut ticker = FrameTicker::new(engine.config().frame_rate);
//! loop {
//!     engine.frame();
//!     std::thread::sleep(ticker.wait());
//! }
//! ```

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::buffers::BufferLibrary;
use crate::config::{EngineConfig, LoopDuration};
use crate::context::{lock_context, shared, AudioContext, SharedContext};
use crate::dsp::analyser::SpectrumReader;
use crate::mapping::{MappedShape, ParameterMapper};
use crate::scheduler::{FrameOutcome, LoopScheduler, SchedulerState};
use crate::shape::{Point, Rgb, Shape, ShapeId};

/// Eraser hit-test padding around a shape's bounding box, in reference units.
pub const HIT_PADDING: f32 = 20.0;

/// Receives the playhead x position once per evaluated frame.
pub trait PlayheadSink: Send {
    fn playhead(&mut self, x: f32);
}

impl<F> PlayheadSink for F
where
    F: FnMut(f32) + Send,
{
    fn playhead(&mut self, x: f32) {
        self(x)
    }
}

/// Playhead updates pushed into a lock-free ring for another thread.
pub struct PlayheadRing(pub rtrb::Producer<f32>);

/// A full ring drops the update; the next frame brings a fresher one.
impl PlayheadSink for PlayheadRing {
    fn playhead(&mut self, x: f32) {
        let _ = self.0.push(x);
    }
}

/// Create a playhead ring; the consumer side drains to the newest position.
pub fn playhead_channel(capacity: usize) -> (PlayheadRing, rtrb::Consumer<f32>) {
    let (producer, consumer) = rtrb::RingBuffer::new(capacity.max(1));
    (PlayheadRing(producer), consumer)
}

pub struct Engine {
    config: EngineConfig,
    context: SharedContext,
    buffers: BufferLibrary,
    mapper: ParameterMapper,
    shapes: Vec<MappedShape>,
    scheduler: LoopScheduler,
    playhead_sink: Option<Box<dyn PlayheadSink>>,
    playhead: f32,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let context = AudioContext::new(config.sample_rate, config.master_gain);
        Self::with_context(config, context)
    }

    /// Use a context created elsewhere, e.g. at the output device's rate.
    pub fn with_context(config: EngineConfig, context: AudioContext) -> Self {
        let scheduler = LoopScheduler::new(config.loop_duration, config.reference.width);
        Self {
            mapper: ParameterMapper::new(config.reference),
            context: shared(context),
            buffers: BufferLibrary::new(),
            shapes: Vec::new(),
            scheduler,
            playhead_sink: None,
            playhead: 0.0,
            config,
        }
    }

    /// Swap in a pre-populated buffer library (tests, offline rendering).
    pub fn with_buffers(mut self, buffers: BufferLibrary) -> Self {
        self.buffers = buffers;
        self
    }

    pub fn set_playhead_sink<S: PlayheadSink + 'static>(&mut self, sink: S) {
        self.playhead_sink = Some(Box::new(sink));
    }

    /// Initialize shared buffers and start the loop. Idempotent.
    pub fn start(&mut self) {
        let mut context = lock_context(&self.context);
        self.buffers
            .initialize(context.sample_rate(), self.config.percussion_sample.as_deref());
        self.scheduler.start(&mut context);
    }

    /// Run one display frame. Returns `false` once the engine is torn down
    /// and the host should stop calling.
    pub fn frame(&mut self) -> bool {
        self.buffers.poll();

        let outcome = {
            let mut context = lock_context(&self.context);
            self.scheduler.step(&mut context, &self.shapes, &self.buffers)
        };

        match outcome {
            FrameOutcome::Advanced(report) => {
                self.playhead = report.playhead;
                if let Some(sink) = self.playhead_sink.as_mut() {
                    sink.playhead(report.playhead);
                }
                true
            }
            FrameOutcome::Skipped => true,
            FrameOutcome::Terminated => false,
        }
    }

    /// Map a finished stroke with the brush color and add it to the loop.
    pub fn on_shape_finished(&mut self, shape: Shape) -> ShapeId {
        self.on_shape_finished_with(shape.color(), shape)
    }

    /// Map a finished stroke against an explicitly selected color.
    pub fn on_shape_finished_with(&mut self, selected: Rgb, shape: Shape) -> ShapeId {
        let mapped = self.mapper.map(&shape, selected);
        let id = mapped.id();
        debug!(
            shape = %id,
            instrument = mapped.instrument().tag(),
            frequency = mapped.frequency(),
            "shape added"
        );
        self.shapes.push(mapped);
        id
    }

    /// Forget a shape. Its voice, if any, is faded out on the next frame.
    pub fn on_shape_deleted(&mut self, id: ShapeId) -> bool {
        let before = self.shapes.len();
        self.shapes.retain(|shape| shape.id() != id);
        let removed = self.shapes.len() != before;
        if removed {
            debug!(shape = %id, "shape deleted");
        }
        removed
    }

    pub fn on_clear_all(&mut self) {
        debug!(count = self.shapes.len(), "clearing shapes");
        self.shapes.clear();
    }

    /// Remove the most recently added shape.
    pub fn undo_last(&mut self) -> Option<ShapeId> {
        let shape = self.shapes.pop()?;
        debug!(shape = %shape.id(), "undo");
        Some(shape.id())
    }

    /// The topmost shape whose padded bounding box contains `point`.
    pub fn shape_at(&self, point: Point) -> Option<ShapeId> {
        self.shapes
            .iter()
            .rev()
            .find(|shape| shape.bounds().contains_padded(point, HIT_PADDING))
            .map(MappedShape::id)
    }

    /// Snap to the slider grid and apply from the next frame on.
    pub fn set_loop_duration(&mut self, seconds: f64) -> LoopDuration {
        let duration = LoopDuration::snapped(seconds);
        self.config.loop_duration = duration;
        self.scheduler.set_loop_duration(duration);
        duration
    }

    pub fn set_playing(&mut self, playing: bool) {
        let mut context = lock_context(&self.context);
        self.scheduler.set_playing(&mut context, playing);
    }

    pub fn is_playing(&self) -> bool {
        self.scheduler.state() == SchedulerState::Running
    }

    /// Stop every voice and close the context. Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.scheduler.state() == SchedulerState::Terminated {
            return;
        }
        let mut context = lock_context(&self.context);
        self.scheduler.teardown(&mut context);
        info!("engine torn down");
    }

    /// Whether the shape currently has a voice in the scheduler.
    pub fn is_sounding(&self, id: ShapeId) -> bool {
        self.scheduler.registry().contains(id)
    }

    pub fn spectrum_reader(&self) -> SpectrumReader {
        lock_context(&self.context).spectrum_reader()
    }

    /// Handle for the output callback.
    pub fn context(&self) -> SharedContext {
        self.context.clone()
    }

    pub fn shapes(&self) -> &[MappedShape] {
        &self.shapes
    }

    pub fn buffers(&self) -> &BufferLibrary {
        &self.buffers
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    pub fn loop_duration(&self) -> LoopDuration {
        self.scheduler.loop_duration()
    }

    /// Last published playhead position.
    pub fn playhead(&self) -> f32 {
        self.playhead
    }

    pub fn live_voices(&self) -> usize {
        self.scheduler.registry().len()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Fixed-tick pacing for hosts without a vsync callback.
pub struct FrameTicker {
    period: Duration,
    next: Instant,
}

impl FrameTicker {
    pub fn new(frame_rate: f32) -> Self {
        let period = Duration::from_secs_f32(1.0 / frame_rate.max(1.0));
        Self {
            period,
            next: Instant::now() + period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Time left until the next tick; advances the schedule. A late caller
    /// gets zero and the schedule restarts from now instead of bursting.
    pub fn wait(&mut self) -> Duration {
        self.wait_from(Instant::now())
    }

    fn wait_from(&mut self, now: Instant) -> Duration {
        let remaining = self.next.saturating_duration_since(now);
        if remaining.is_zero() {
            self.next = now + self.period;
        } else {
            self.next += self.period;
        }
        remaining
    }
}
