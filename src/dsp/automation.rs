/*
Parameter Automation
====================

A parameter (gain, cutoff, oscillator frequency) is not a single number but a
timeline of scheduled changes. Voices describe their whole envelope up front
("be silent now, reach full level in 20 ms, decay to near silence by 500 ms")
and the renderer evaluates that timeline per sample against the audio clock.

Event kinds
-----------

  SetValue         jump to `value` at `time`, hold until the next event
  LinearRamp       straight line from the previous event to `value` at `time`
  ExponentialRamp  constant-ratio curve from the previous event to `value`

A ramp always starts where the previous event left off (its time and value),
so a typical envelope is one SetValue followed by ramps:

    value
     0.8 ┤    ╱╲
         │   ╱  ╲__
         │  ╱      ╲___
   0.001 ┼─╱───────────────── time
         now +20ms      +500ms

Why exponential?
----------------
Loudness is perceived logarithmically, so a constant-ratio fade sounds even
where a linear one seems to "fall off a cliff" at the end. The catch: the
curve v0 * (v1/v0)^p is undefined when either end is zero, so targets and
starting points at or below SILENCE_FLOOR are pinned to the floor.

Cancelling
----------
`cancel_scheduled_values(t)` drops every event at or after `t`. A ramp that
is mid-flight at `t` ends at a later time, so it is dropped too and the value
falls back to the previous event. Callers that want a click-free release read
`value_at(t)` first and re-anchor with `set_value_at_time`.
*/

/// Smallest level exponential curves are allowed to reach.
pub const SILENCE_FLOOR: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutomationEvent {
    SetValue { time: f64, value: f32 },
    LinearRamp { time: f64, value: f32 },
    ExponentialRamp { time: f64, value: f32 },
}

impl AutomationEvent {
    pub fn time(&self) -> f64 {
        match *self {
            AutomationEvent::SetValue { time, .. }
            | AutomationEvent::LinearRamp { time, .. }
            | AutomationEvent::ExponentialRamp { time, .. } => time,
        }
    }

    pub fn value(&self) -> f32 {
        match *self {
            AutomationEvent::SetValue { value, .. }
            | AutomationEvent::LinearRamp { value, .. }
            | AutomationEvent::ExponentialRamp { value, .. } => value,
        }
    }
}

#[inline]
fn above_floor(value: f32) -> f32 {
    if value > SILENCE_FLOOR {
        value
    } else {
        SILENCE_FLOOR
    }
}

/// A scheduled parameter timeline evaluated against the audio clock.
#[derive(Debug, Clone)]
pub struct Automation {
    default_value: f32,
    events: Vec<AutomationEvent>,
}

impl Automation {
    pub fn new(value: f32) -> Self {
        Self {
            default_value: value,
            events: Vec::new(),
        }
    }

    /// Replace the whole timeline with a constant.
    pub fn set_value(&mut self, value: f32) {
        self.events.clear();
        self.default_value = value;
    }

    pub fn set_value_at_time(&mut self, value: f32, time: f64) {
        self.insert(AutomationEvent::SetValue { time, value });
    }

    pub fn linear_ramp_to_value_at_time(&mut self, value: f32, time: f64) {
        self.insert(AutomationEvent::LinearRamp { time, value });
    }

    /// Schedule a constant-ratio ramp. Targets at or below [`SILENCE_FLOOR`]
    /// are pinned to the floor.
    pub fn exponential_ramp_to_value_at_time(&mut self, value: f32, time: f64) {
        self.insert(AutomationEvent::ExponentialRamp {
            time,
            value: above_floor(value),
        });
    }

    /// Drop every event scheduled at or after `time`.
    pub fn cancel_scheduled_values(&mut self, time: f64) {
        self.events.retain(|event| event.time() < time);
    }

    /// Insert after any events sharing the same timestamp.
    fn insert(&mut self, event: AutomationEvent) {
        let index = self
            .events
            .iter()
            .position(|existing| existing.time() > event.time())
            .unwrap_or(self.events.len());
        self.events.insert(index, event);
    }

    /// Evaluate the timeline at `time` (seconds on the audio clock).
    pub fn value_at(&self, time: f64) -> f32 {
        let mut prev_time = 0.0;
        let mut prev_value = self.default_value;

        for event in &self.events {
            if event.time() <= time {
                prev_time = event.time();
                prev_value = event.value();
                continue;
            }

            return match *event {
                AutomationEvent::SetValue { .. } => prev_value,
                AutomationEvent::LinearRamp { time: end, value } => {
                    let span = end - prev_time;
                    if span <= 0.0 {
                        value
                    } else {
                        let progress = ((time - prev_time) / span) as f32;
                        prev_value + (value - prev_value) * progress
                    }
                }
                AutomationEvent::ExponentialRamp { time: end, value } => {
                    let span = end - prev_time;
                    if span <= 0.0 {
                        value
                    } else {
                        let start = above_floor(prev_value);
                        let progress = ((time - prev_time) / span) as f32;
                        start * (value / start).powf(progress)
                    }
                }
            };
        }

        prev_value
    }

    /// Fill `out` with one value per sample, starting at `start_time`.
    pub fn fill(&self, out: &mut [f32], start_time: f64, sample_rate: f32) {
        if self.events.is_empty() {
            out.fill(self.default_value);
            return;
        }

        let dt = 1.0 / sample_rate as f64;
        for (i, sample) in out.iter_mut().enumerate() {
            *sample = self.value_at(start_time + i as f64 * dt);
        }
    }

    /// Forget events that can no longer affect values at or after `time`.
    ///
    /// The last completed event is kept because a later ramp starts from it.
    pub fn prune(&mut self, time: f64) {
        let completed = self
            .events
            .iter()
            .take_while(|event| event.time() <= time)
            .count();
        if completed > 1 {
            self.events.drain(..completed - 1);
        }
        // A single finished event is just a constant.
        if let [only] = self.events.as_slice() {
            if only.time() <= time {
                self.default_value = only.value();
                self.events.clear();
            }
        }
    }

    /// True when the value changes over time.
    pub fn is_automated(&self) -> bool {
        !self.events.is_empty()
    }

    pub fn events(&self) -> &[AutomationEvent] {
        &self.events
    }
}
