//! Frame timing and float comparison shared by input and match code.

use serde::{Serialize, Deserialize};

/// Simulation tick counter.
pub type Tick = u32;

/// Timing for one simulation step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameTime {
    /// Tick being simulated.
    pub tick: Tick,
    /// Delta scaled by the simulation time scale (seconds).
    pub delta: f32,
    /// Wall-clock delta, ignoring time scale (seconds).
    pub unscaled_delta: f32,
}

impl FrameTime {
    /// Build frame timing from an unscaled delta and a time scale.
    pub fn new(tick: Tick, unscaled_delta: f32, time_scale: f32) -> Self {
        Self {
            tick,
            delta: unscaled_delta * time_scale,
            unscaled_delta,
        }
    }
}

/// Approximate float equality, tolerant of accumulated rounding.
#[inline]
pub fn approximately(a: f32, b: f32) -> bool {
    let tolerance = (1e-6 * a.abs().max(b.abs())).max(f32::EPSILON * 8.0);
    (b - a).abs() < tolerance
}

/// Move `current` toward `target` by at most `max_delta`.
#[inline]
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

/// Position of `value` between `a` and `b`, clamped to [0, 1].
#[inline]
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if approximately(a, b) {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}
