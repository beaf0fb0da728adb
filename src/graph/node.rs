/// Context passed to graph nodes during rendering
///
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - time: audio-clock time of the first sample in the block, in seconds
///
/// Nodes evaluate their scheduled automation against `time`, so a block
/// rendered at the same clock position always produces the same output.
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx {
    pub sample_rate: f32,
    pub time: f64,
}

impl RenderCtx {
    pub fn new(sample_rate: f32, time: f64) -> Self {
        Self { sample_rate, time }
    }

    /// Clock time of sample `index` within the block.
    #[inline]
    pub fn sample_time(&self, index: usize) -> f64 {
        self.time + index as f64 / self.sample_rate as f64
    }

    /// Context for a sub-block starting `offset` samples into this one.
    #[inline]
    pub fn offset(&self, offset: usize) -> Self {
        Self {
            sample_rate: self.sample_rate,
            time: self.sample_time(offset),
        }
    }
}

/// Core trait for audio processing graph nodes
///
/// Nodes render in place: sources overwrite `out`, processors transform
/// whatever the upstream node left there.
pub trait GraphNode: Send {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);

    /// Check if this node is still producing sound
    ///
    /// Used by the context to know when a voice graph can be dropped.
    fn is_active(&self) -> bool {
        true
    }
}

/// A node that generates signal inside a scheduled start/stop window.
pub trait SourceNode: GraphNode {
    /// Begin producing sound at clock time `at`. Later calls are ignored.
    fn start(&mut self, at: f64);

    /// Stop producing sound at clock time `at`.
    ///
    /// Stopping twice keeps the earlier stop time; stopping a source that
    /// has already ended is a no-op.
    fn stop(&mut self, at: f64);

    fn has_ended(&self) -> bool;
}

/// Allow boxed graph nodes to be used as graph nodes (for dynamic dispatch)
impl<T: GraphNode + ?Sized> GraphNode for Box<T> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        (**self).render_block(out, ctx)
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }
}

impl<T: SourceNode + ?Sized> SourceNode for Box<T> {
    fn start(&mut self, at: f64) {
        (**self).start(at)
    }

    fn stop(&mut self, at: f64) {
        (**self).stop(at)
    }

    fn has_ended(&self) -> bool {
        (**self).has_ended()
    }
}

/// Start/stop bookkeeping shared by every source node.
#[derive(Debug, Clone, Copy, Default)]
pub struct Playback {
    start: Option<f64>,
    stop: Option<f64>,
    ended: bool,
}

impl Playback {
    pub fn start(&mut self, at: f64) {
        if self.start.is_none() && !self.ended {
            self.start = Some(at);
        }
    }

    pub fn stop(&mut self, at: f64) {
        if self.ended {
            return;
        }
        self.stop = Some(match self.stop {
            Some(previous) => previous.min(at),
            None => at,
        });
    }

    /// True when a sample at clock time `t` should be audible.
    #[inline]
    pub fn is_playing_at(&self, t: f64) -> bool {
        !self.ended
            && self.start.is_some_and(|start| t >= start)
            && self.stop.map_or(true, |stop| t < stop)
    }

    /// Mark the source ended once a block has rendered past its stop time.
    pub fn finish_block(&mut self, block_end: f64) {
        if self.stop.is_some_and(|stop| block_end >= stop) {
            self.ended = true;
        }
    }

    /// End immediately (e.g. a one-shot buffer ran out of samples).
    pub fn end(&mut self) {
        self.ended = true;
    }

    pub fn has_ended(&self) -> bool {
        self.ended
    }

    pub fn start_time(&self) -> Option<f64> {
        self.start
    }

    pub fn stop_time(&self) -> Option<f64> {
        self.stop
    }
}
