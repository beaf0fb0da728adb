//! The loop scheduler: once per display frame, decide which shapes should be
//! sounding and start or release their voices.
//!
//! ```text
//!            start                pause
//!   Idle ───────────▶ Running ◀───────────▶ Suspended
//!     │                  │        resume        │
//!     └──────────────────┴──────────┬───────────┘
//!                                   ▼ teardown
//!                              Terminated
//! ```
//!
//! Each shape owns a window `[start, end)` inside the loop, scaled from its
//! relative start and width. Windows do not wrap: a shape whose end lies past
//! the loop boundary only sounds from its start up to the boundary.

use std::fmt;

use tracing::{debug, info};

use crate::buffers::BufferLibrary;
use crate::config::LoopDuration;
use crate::context::{AudioContext, ContextState};
use crate::instruments::{start_voice, Voice};
use crate::mapping::MappedShape;
use crate::shape::ShapeId;

pub mod registry;

pub use registry::VoiceRegistry;

/// Fade applied when a voice leaves its window or loses its shape.
pub const RELEASE_FADE: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Not started yet
    Idle,
    /// Driving voices every frame
    Running,
    /// Clock stopped by the user; frames are skipped
    Suspended,
    /// Torn down; the frame driver should stop
    Terminated,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SchedulerState::Idle => "idle",
            SchedulerState::Running => "running",
            SchedulerState::Suspended => "suspended",
            SchedulerState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// A shape's sounding span within one loop cycle, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopWindow {
    pub start: f64,
    pub end: f64,
}

impl LoopWindow {
    pub fn for_shape(shape: &MappedShape, loop_duration: f64) -> Self {
        let start = shape.relative_start() as f64 * loop_duration;
        let end = start + shape.relative_width() as f64 * loop_duration;
        Self { start, end }
    }

    /// Half-open, non-wrapping membership test.
    #[inline]
    pub fn contains(&self, loop_time: f64) -> bool {
        loop_time >= self.start && loop_time < self.end
    }
}

/// What one frame step did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Context time the frame was evaluated at
    pub now: f64,
    /// Position within the loop, `now mod loop_duration`
    pub loop_time: f64,
    /// Playhead x in reference canvas units
    pub playhead: f32,
    pub started: Vec<ShapeId>,
    pub released: Vec<ShapeId>,
    pub collected: Vec<ShapeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    Advanced(FrameReport),
    /// Idle or suspended: nothing evaluated, keep the driver alive
    Skipped,
    /// Torn down: stop driving frames
    Terminated,
}

pub struct LoopScheduler {
    state: SchedulerState,
    loop_duration: LoopDuration,
    reference_width: f32,
    registry: VoiceRegistry,
}

impl LoopScheduler {
    pub fn new(loop_duration: LoopDuration, reference_width: f32) -> Self {
        Self {
            state: SchedulerState::Idle,
            loop_duration,
            reference_width,
            registry: VoiceRegistry::new(),
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn registry(&self) -> &VoiceRegistry {
        &self.registry
    }

    pub fn loop_duration(&self) -> LoopDuration {
        self.loop_duration
    }

    pub fn set_loop_duration(&mut self, duration: LoopDuration) {
        if duration != self.loop_duration {
            info!(seconds = duration.seconds(), "loop duration changed");
        }
        self.loop_duration = duration;
    }

    fn transition(&mut self, next: SchedulerState) {
        if self.state != next {
            info!(from = %self.state, to = %next, "scheduler state");
            self.state = next;
        }
    }

    /// Idle → Running. Ignored in any other state.
    pub fn start(&mut self, context: &mut AudioContext) {
        if self.state != SchedulerState::Idle {
            return;
        }
        if let Err(err) = context.resume() {
            debug!(error = %err, "cannot start on this context");
            return;
        }
        self.transition(SchedulerState::Running);
    }

    /// Running → Suspended: the clock stops, sounding voices keep their state.
    pub fn pause(&mut self, context: &mut AudioContext) {
        if self.state != SchedulerState::Running {
            return;
        }
        if let Err(err) = context.suspend() {
            debug!(error = %err, "suspend ignored");
            return;
        }
        self.transition(SchedulerState::Suspended);
    }

    /// Suspended → Running.
    pub fn resume(&mut self, context: &mut AudioContext) {
        if self.state != SchedulerState::Suspended {
            return;
        }
        if let Err(err) = context.resume() {
            debug!(error = %err, "resume ignored");
            return;
        }
        self.transition(SchedulerState::Running);
    }

    pub fn set_playing(&mut self, context: &mut AudioContext, playing: bool) {
        if playing {
            self.resume(context);
        } else {
            self.pause(context);
        }
    }

    /// Stop every voice and close the context. Safe to call repeatedly.
    pub fn teardown(&mut self, context: &mut AudioContext) {
        for voice in self.registry.drain() {
            debug!(%voice, "voice stopped by teardown");
        }
        context.close();
        self.transition(SchedulerState::Terminated);
    }

    /// Evaluate one display frame.
    pub fn step(
        &mut self,
        context: &mut AudioContext,
        shapes: &[MappedShape],
        buffers: &BufferLibrary,
    ) -> FrameOutcome {
        match self.state {
            SchedulerState::Terminated => return FrameOutcome::Terminated,
            SchedulerState::Idle | SchedulerState::Suspended => return FrameOutcome::Skipped,
            SchedulerState::Running => {}
        }
        match context.state() {
            ContextState::Closed => {
                self.registry.drain();
                self.transition(SchedulerState::Terminated);
                return FrameOutcome::Terminated;
            }
            ContextState::Suspended => return FrameOutcome::Skipped,
            ContextState::Running => {}
        }

        let duration = self.loop_duration.seconds();
        let now = context.current_time();
        let loop_time = now % duration;
        let mut report = FrameReport {
            now,
            loop_time,
            playhead: ((loop_time / duration) * self.reference_width as f64) as f32,
            ..FrameReport::default()
        };

        for shape in shapes {
            let inside = LoopWindow::for_shape(shape, duration).contains(loop_time);
            let registered = self.registry.contains(shape.id());

            if inside && !registered {
                if let Some(voice) = start_voice(context, shape, buffers) {
                    self.registry.register(voice);
                    report.started.push(shape.id());
                }
            } else if !inside && registered {
                if let Some(voice) = self.registry.remove(shape.id()) {
                    release(context, voice, "left its window");
                    report.released.push(shape.id());
                }
            }
        }

        let orphans = self
            .registry
            .orphans(|id| shapes.iter().any(|shape| shape.id() == id));
        for id in orphans {
            if let Some(voice) = self.registry.remove(id) {
                release(context, voice, "shape removed");
                report.collected.push(id);
            }
        }

        FrameOutcome::Advanced(report)
    }
}

fn release(context: &mut AudioContext, voice: Voice, reason: &str) {
    let fading = context.release(voice.id(), RELEASE_FADE);
    debug!(%voice, reason, fading, "voice released");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReferenceCanvas;
    use crate::mapping::ParameterMapper;
    use crate::shape::{Instrument, Point, Rgb, Shape};

    const SAMPLE_RATE: f32 = 48_000.0;
    const FRAME: usize = 800;

    fn shape_spanning(start_x: f32, end_x: f32) -> MappedShape {
        let points = vec![Point::new(start_x, 195.0), Point::new(end_x, 205.0)];
        let shape = Shape::new(Instrument::Line, points, Rgb::DEFAULT_BRUSH).expect("shape");
        ParameterMapper::new(ReferenceCanvas::default()).map(&shape, Rgb::DEFAULT_BRUSH)
    }

    fn running(duration: f64) -> (LoopScheduler, AudioContext, BufferLibrary) {
        let mut context = AudioContext::new(SAMPLE_RATE, 0.8);
        let mut scheduler = LoopScheduler::new(
            LoopDuration::try_new(duration).expect("valid duration"),
            ReferenceCanvas::default().width,
        );
        scheduler.start(&mut context);
        (scheduler, context, BufferLibrary::new())
    }

    fn advanced(outcome: FrameOutcome) -> FrameReport {
        match outcome {
            FrameOutcome::Advanced(report) => report,
            other => panic!("expected an evaluated frame, got {other:?}"),
        }
    }

    #[test]
    fn window_is_half_open_and_does_not_wrap() {
        let window = LoopWindow { start: 3.6, end: 4.8 };
        assert!(window.contains(3.6));
        assert!(window.contains(3.99));
        assert!(!window.contains(0.5), "no wrap into the next cycle");
        assert!(!window.contains(4.8));
    }

    #[test]
    fn idle_scheduler_skips_frames() {
        let mut context = AudioContext::new(SAMPLE_RATE, 0.8);
        let mut scheduler = LoopScheduler::new(LoopDuration::default(), 800.0);
        let outcome = scheduler.step(&mut context, &[], &BufferLibrary::new());
        assert_eq!(outcome, FrameOutcome::Skipped);
    }

    #[test]
    fn starts_once_and_releases_on_exit() {
        let (mut scheduler, mut context, buffers) = running(4.0);
        let shapes = vec![shape_spanning(0.0, 200.0)];

        let first = advanced(scheduler.step(&mut context, &shapes, &buffers));
        assert_eq!(first.started, vec![shapes[0].id()]);

        context.render_frames(FRAME);
        let second = advanced(scheduler.step(&mut context, &shapes, &buffers));
        assert!(second.started.is_empty(), "no retrigger while registered");
        assert_eq!(scheduler.registry().len(), 1);

        // Jump past the 1 s window end
        context.render_frames(48_000);
        let third = advanced(scheduler.step(&mut context, &shapes, &buffers));
        assert_eq!(third.released, vec![shapes[0].id()]);
        assert!(scheduler.registry().is_empty());
    }

    #[test]
    fn deleted_shape_is_collected() {
        let (mut scheduler, mut context, buffers) = running(4.0);
        let shapes = vec![shape_spanning(0.0, 400.0)];
        advanced(scheduler.step(&mut context, &shapes, &buffers));
        let voice = *scheduler.registry().get(shapes[0].id()).expect("registered");

        context.render_frames(FRAME);
        let report = advanced(scheduler.step(&mut context, &[], &buffers));
        assert_eq!(report.collected, vec![shapes[0].id()]);

        // Fading, not cut
        let gain = context.voice_gain(voice.id()).expect("still fading");
        assert!(gain > 0.0);
        context.render_frames(4_800);
        assert!(!context.contains(voice.id()));
    }

    #[test]
    fn playhead_tracks_loop_position() {
        let (mut scheduler, mut context, buffers) = running(4.0);
        context.render_frames(48_000);
        let report = advanced(scheduler.step(&mut context, &[], &buffers));
        assert!((report.loop_time - 1.0).abs() < 1e-9);
        assert!((report.playhead - 200.0).abs() < 1e-3);
    }

    #[test]
    fn paused_scheduler_keeps_voices() {
        let (mut scheduler, mut context, buffers) = running(4.0);
        let shapes = vec![shape_spanning(0.0, 200.0)];
        advanced(scheduler.step(&mut context, &shapes, &buffers));

        scheduler.pause(&mut context);
        assert_eq!(scheduler.state(), SchedulerState::Suspended);
        assert_eq!(context.state(), ContextState::Suspended);
        assert_eq!(scheduler.step(&mut context, &[], &buffers), FrameOutcome::Skipped);
        assert_eq!(scheduler.registry().len(), 1, "no garbage collection while paused");

        scheduler.resume(&mut context);
        assert_eq!(scheduler.state(), SchedulerState::Running);
    }

    #[test]
    fn teardown_is_terminal() {
        let (mut scheduler, mut context, buffers) = running(4.0);
        let shapes = vec![shape_spanning(0.0, 200.0)];
        advanced(scheduler.step(&mut context, &shapes, &buffers));

        scheduler.teardown(&mut context);
        scheduler.teardown(&mut context);
        assert_eq!(context.state(), ContextState::Closed);
        assert_eq!(context.live_voices(), 0);
        assert!(scheduler.registry().is_empty());
        assert_eq!(scheduler.step(&mut context, &shapes, &buffers), FrameOutcome::Terminated);

        scheduler.start(&mut context);
        assert_eq!(scheduler.state(), SchedulerState::Terminated);
    }
}
