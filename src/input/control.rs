//! Input Control State Machine
//!
//! Each control keeps exactly two generations of state (current, last)
//! and a per-tick accumulation buffer. A tick runs:
//!
//! 1. `pre_update`  - last := current, buffer and raw cache cleared
//! 2. `update_*`    - zero or more samples merge into the buffer
//! 3. `commit`      - buffer becomes current; `update_tick` advances
//!                    only if the committed state differs from last
//!
//! Signed stick axes additionally go through `process_analog` (dead zone
//! and smoothing) before commit; the owning device drives that step
//! because circular dead zones need the perpendicular axis.

use std::borrow::Cow;

use glam::Vec2;

use crate::config::InputConfig;
use crate::core::time::{approximately, inverse_lerp, move_towards, Tick};
use crate::input::state::InputState;
use crate::input::target::InputTarget;
use crate::input::InputError;

/// The sentinel returned for unpopulated slots. Reads as neutral,
/// rejects every update.
pub static NULL_CONTROL: InputControl = InputControl::null();

/// One control on a device.
#[derive(Clone, Debug)]
pub struct InputControl {
    handle: Cow<'static, str>,
    target: InputTarget,
    current: InputState,
    last: InputState,
    next: InputState,
    raw: Option<f32>,
    update_tick: Tick,
    /// Smoothing rate; 1.0 disables smoothing
    pub sensitivity: f32,
    /// Raw magnitude mapped to zero
    pub lower_dead_zone: f32,
    /// Raw magnitude mapped to one
    pub upper_dead_zone: f32,
    /// Magnitude above which an analog value reads as pressed
    pub state_threshold: f32,
    is_null: bool,
}

impl InputControl {
    /// Create a control bound to `target`.
    pub fn new(handle: impl Into<Cow<'static, str>>, target: InputTarget) -> Self {
        Self {
            handle: handle.into(),
            target,
            current: InputState::NEUTRAL,
            last: InputState::NEUTRAL,
            next: InputState::NEUTRAL,
            raw: None,
            update_tick: 0,
            sensitivity: 1.0,
            lower_dead_zone: 0.0,
            upper_dead_zone: 1.0,
            state_threshold: 0.0,
            is_null: false,
        }
    }

    /// The inert sentinel control.
    pub const fn null() -> Self {
        Self {
            handle: Cow::Borrowed("None"),
            target: InputTarget::Select,
            current: InputState::NEUTRAL,
            last: InputState::NEUTRAL,
            next: InputState::NEUTRAL,
            raw: None,
            update_tick: 0,
            sensitivity: 1.0,
            lower_dead_zone: 0.0,
            upper_dead_zone: 1.0,
            state_threshold: 0.0,
            is_null: true,
        }
    }

    /// Apply dead zones and sensitivity from configuration.
    ///
    /// Only stick axes are dead-zoned; buttons keep their defaults.
    pub fn configure(&mut self, config: &InputConfig) {
        self.state_threshold = config.state_threshold;
        if self.target.is_stick_axis() {
            self.lower_dead_zone = config.lower_dead_zone;
            self.upper_dead_zone = config.upper_dead_zone;
            self.sensitivity = config.sensitivity;
        }
    }

    /// Display handle.
    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// Slot this control is bound to.
    pub fn target(&self) -> InputTarget {
        self.target
    }

    /// True for the sentinel.
    pub fn is_null(&self) -> bool {
        self.is_null
    }

    /// True for digital controls.
    pub fn is_button(&self) -> bool {
        self.target.is_button()
    }

    /// Last tick at which the committed state changed.
    pub fn update_tick(&self) -> Tick {
        self.update_tick
    }

    /// Committed state this tick.
    pub fn current(&self) -> InputState {
        self.current
    }

    /// Committed state last tick.
    pub fn last(&self) -> InputState {
        self.last
    }

    /// Digital reading.
    #[inline]
    pub fn is_pressed(&self) -> bool {
        self.current.state
    }

    /// Analog reading.
    #[inline]
    pub fn value(&self) -> f32 {
        self.current.value
    }

    /// Pressed this tick, not last tick.
    #[inline]
    pub fn was_pressed(&self) -> bool {
        self.current.state && !self.last.state
    }

    /// Released this tick, pressed last tick.
    #[inline]
    pub fn was_released(&self) -> bool {
        !self.current.state && self.last.state
    }

    /// Committed state differs from last tick.
    #[inline]
    pub fn has_changed(&self) -> bool {
        self.current != self.last
    }

    /// Raw analog sample recorded this tick (stick axes only).
    pub fn raw_value(&self) -> Option<f32> {
        self.raw
    }

    /// Begin a tick.
    pub fn pre_update(&mut self) {
        if self.is_null {
            return;
        }
        self.last = self.current;
        self.next.reset();
        self.raw = None;
    }

    fn check_tick(&self, tick: Tick) -> Result<(), InputError> {
        if self.is_null {
            return Err(InputError::NullControl);
        }
        if tick < self.update_tick {
            return Err(InputError::OutOfOrderTick {
                control: self.handle.to_string(),
                tick,
                last_tick: self.update_tick,
            });
        }
        Ok(())
    }

    /// Feed a digital sample.
    pub fn update_state(&mut self, state: bool, tick: Tick) -> Result<(), InputError> {
        self.check_tick(tick)?;
        if self.target.is_stick_axis() {
            let value = if state { 1.0 } else { 0.0 };
            self.merge_raw(value);
        } else {
            self.next.accumulate_state(state);
        }
        Ok(())
    }

    /// Feed an analog sample.
    pub fn update_value(&mut self, value: f32, tick: Tick) -> Result<(), InputError> {
        self.check_tick(tick)?;
        if self.target.is_stick_axis() {
            self.merge_raw(value);
        } else {
            self.next.accumulate_value(value, self.state_threshold);
        }
        Ok(())
    }

    fn merge_raw(&mut self, value: f32) {
        match self.raw {
            Some(raw) if raw.abs() >= value.abs() => {}
            _ => self.raw = Some(value),
        }
    }

    /// Merge a value derived by the device during post-update
    /// (stick directions fed from committed axes).
    pub(crate) fn feed_derived(&mut self, value: f32) {
        if !self.is_null {
            self.next.accumulate_value(value, self.state_threshold);
        }
    }

    /// Dead-zone and smooth the raw sample into the buffer.
    ///
    /// `obverse_raw` is the perpendicular axis' raw sample this tick;
    /// when present the dead zone is circular, otherwise linear.
    pub fn process_analog(&mut self, obverse_raw: Option<f32>, delta_time: f32) {
        if self.is_null {
            return;
        }
        let raw = self.raw.unwrap_or(0.0);
        let dead = match (self.raw, obverse_raw) {
            (Some(_), Some(obverse)) => {
                circular_dead_zone(raw, obverse, self.lower_dead_zone, self.upper_dead_zone)
            }
            _ => linear_dead_zone(raw, self.lower_dead_zone, self.upper_dead_zone),
        };
        let smoothed = apply_smoothing(dead, self.last.value, delta_time, self.sensitivity);
        self.next.set_value(smoothed, self.state_threshold);
    }

    /// End a tick. Returns whether the committed state changed.
    pub fn commit(&mut self, tick: Tick) -> Result<bool, InputError> {
        self.check_tick(tick)?;
        self.current = self.next;
        let changed = self.current != self.last;
        if changed {
            self.update_tick = tick;
        }
        #[cfg(feature = "debug-tracing")]
        if changed {
            tracing::trace!(control = %self.handle, tick, value = self.current.value, "control changed");
        }
        Ok(changed)
    }
}

/// Per-axis dead zone: magnitude remapped from [lower, upper] to [0, 1].
pub fn linear_dead_zone(value: f32, lower: f32, upper: f32) -> f32 {
    let magnitude = inverse_lerp(lower, upper, value.abs());
    if value < 0.0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Circular dead zone over an axis pair; returns the first axis.
///
/// The pair's 2D magnitude is remapped from [lower, upper] to [0, 1]
/// and the original vector scaled by remapped / raw magnitude.
pub fn circular_dead_zone(axis: f32, obverse: f32, lower: f32, upper: f32) -> f32 {
    let magnitude = Vec2::new(axis, obverse).length();
    if magnitude <= 0.0 {
        return 0.0;
    }
    let remapped = inverse_lerp(lower, upper, magnitude);
    axis * (remapped / magnitude)
}

/// Move the last committed value toward the new one by at most
/// `delta_time * sensitivity * 100`. A sign flip snaps the last value
/// to zero first.
pub fn apply_smoothing(value: f32, last: f32, delta_time: f32, sensitivity: f32) -> f32 {
    if approximately(sensitivity, 1.0) {
        return value;
    }
    let max_delta = delta_time * sensitivity * 100.0;
    let from = if last.signum() != value.signum() { 0.0 } else { last };
    move_towards(from, value, max_delta)
}

/// Derived two-axis control (stick or d-pad).
#[derive(Clone, Copy, Debug, Default)]
pub struct TwoAxisControl {
    current: Vec2,
    last: Vec2,
    update_tick: Tick,
    normalize: bool,
}

impl TwoAxisControl {
    /// Stick composite: axes combined as-is.
    pub fn stick() -> Self {
        Self::default()
    }

    /// D-pad composite: combined vector normalized.
    pub fn dpad() -> Self {
        Self {
            normalize: true,
            ..Self::default()
        }
    }

    /// Recompute from the four directional controls.
    ///
    /// horizontal = left pressed ? -left : right, vertical likewise.
    pub fn update(
        &mut self,
        left: &InputControl,
        right: &InputControl,
        down: &InputControl,
        up: &InputControl,
        invert_y: bool,
        tick: Tick,
    ) {
        self.last = self.current;

        let x = if left.is_pressed() { -left.value() } else { right.value() };
        let mut y = if down.is_pressed() { -down.value() } else { up.value() };
        if invert_y {
            y = -y;
        }

        let combined = Vec2::new(x, y);
        self.current = if self.normalize {
            combined.normalize_or_zero()
        } else {
            combined
        };

        if self.has_changed() {
            self.update_tick = tick;
        }
    }

    /// Combined vector this tick.
    pub fn value(&self) -> Vec2 {
        self.current
    }

    /// Combined vector last tick.
    pub fn last_value(&self) -> Vec2 {
        self.last
    }

    /// Horizontal component.
    pub fn x(&self) -> f32 {
        self.current.x
    }

    /// Vertical component.
    pub fn y(&self) -> f32 {
        self.current.y
    }

    /// Last tick the vector changed.
    pub fn update_tick(&self) -> Tick {
        self.update_tick
    }

    /// Vector differs from last tick.
    pub fn has_changed(&self) -> bool {
        !approximately(self.current.x, self.last.x) || !approximately(self.current.y, self.last.y)
    }
}
