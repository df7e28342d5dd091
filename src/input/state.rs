//! Per-control state pair.

use serde::{Serialize, Deserialize};

use crate::core::time::approximately;

/// Boolean + analog reading of a single control.
///
/// `state == (|value| > threshold)` is maintained by the setters below,
/// not by the type. Equality compares `value` approximately.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct InputState {
    /// Digital reading
    pub state: bool,
    /// Analog reading
    pub value: f32,
}

impl InputState {
    /// Neutral state: not pressed, zero value.
    pub const NEUTRAL: InputState = InputState {
        state: false,
        value: 0.0,
    };

    /// Reset to the neutral state.
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::NEUTRAL;
    }

    /// Overwrite with a digital reading (value 1.0 / 0.0).
    #[inline]
    pub fn set_state(&mut self, state: bool) {
        self.state = state;
        self.value = if state { 1.0 } else { 0.0 };
    }

    /// Overwrite with an analog reading.
    #[inline]
    pub fn set_value(&mut self, value: f32, threshold: f32) {
        self.value = value;
        self.state = value.abs() > threshold;
    }

    /// Merge a digital sample: any true sample during the tick wins.
    #[inline]
    pub fn accumulate_state(&mut self, state: bool) {
        if state {
            self.state = true;
            if self.value.abs() < 1.0 {
                self.value = 1.0;
            }
        }
    }

    /// Merge an analog sample: the largest magnitude seen wins.
    #[inline]
    pub fn accumulate_value(&mut self, value: f32, threshold: f32) {
        if value.abs() > self.value.abs() {
            self.value = value;
        }
        self.state |= value.abs() > threshold;
    }
}

impl PartialEq for InputState {
    fn eq(&self, other: &Self) -> bool {
        self.state == other.state && approximately(self.value, other.value)
    }
}
