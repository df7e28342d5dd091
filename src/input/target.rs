//! Control targets: the fixed set of slots every device exposes.

use serde::{Serialize, Deserialize};
use std::fmt;

/// Logical control slot on a device.
///
/// Devices index their control array by `InputTarget::index()`;
/// most devices populate only a subset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum InputTarget {
    /// Left stick horizontal axis (signed)
    LeftStickX = 0,
    /// Left stick vertical axis (signed)
    LeftStickY = 1,
    /// Right stick horizontal axis (signed)
    RightStickX = 2,
    /// Right stick vertical axis (signed)
    RightStickY = 3,
    /// Left stick pushed up
    LeftStickUp = 4,
    /// Left stick pushed down
    LeftStickDown = 5,
    /// Left stick pushed left
    LeftStickLeft = 6,
    /// Left stick pushed right
    LeftStickRight = 7,
    /// Right stick pushed up
    RightStickUp = 8,
    /// Right stick pushed down
    RightStickDown = 9,
    /// Right stick pushed left
    RightStickLeft = 10,
    /// Right stick pushed right
    RightStickRight = 11,
    /// D-pad up
    DPadUp = 12,
    /// D-pad down
    DPadDown = 13,
    /// D-pad left
    DPadLeft = 14,
    /// D-pad right
    DPadRight = 15,
    /// Primary face button
    Action1 = 16,
    /// Secondary face button
    Action2 = 17,
    /// Third face button
    Action3 = 18,
    /// Fourth face button
    Action4 = 19,
    /// Left shoulder button
    LeftBumper = 20,
    /// Right shoulder button
    RightBumper = 21,
    /// Left trigger
    LeftTrigger = 22,
    /// Right trigger
    RightTrigger = 23,
    /// Start / pause
    Start = 24,
    /// Select / back
    Select = 25,
}

impl InputTarget {
    /// Number of control slots on a device.
    pub const COUNT: usize = 26;

    /// Every target, in index order.
    pub const ALL: [InputTarget; Self::COUNT] = [
        InputTarget::LeftStickX,
        InputTarget::LeftStickY,
        InputTarget::RightStickX,
        InputTarget::RightStickY,
        InputTarget::LeftStickUp,
        InputTarget::LeftStickDown,
        InputTarget::LeftStickLeft,
        InputTarget::LeftStickRight,
        InputTarget::RightStickUp,
        InputTarget::RightStickDown,
        InputTarget::RightStickLeft,
        InputTarget::RightStickRight,
        InputTarget::DPadUp,
        InputTarget::DPadDown,
        InputTarget::DPadLeft,
        InputTarget::DPadRight,
        InputTarget::Action1,
        InputTarget::Action2,
        InputTarget::Action3,
        InputTarget::Action4,
        InputTarget::LeftBumper,
        InputTarget::RightBumper,
        InputTarget::LeftTrigger,
        InputTarget::RightTrigger,
        InputTarget::Start,
        InputTarget::Select,
    ];

    /// Slot index in a device's control array.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Perpendicular axis used for circular dead zones.
    ///
    /// Only the four signed stick axes have one.
    pub fn obverse(self) -> Option<InputTarget> {
        match self {
            InputTarget::LeftStickX => Some(InputTarget::LeftStickY),
            InputTarget::LeftStickY => Some(InputTarget::LeftStickX),
            InputTarget::RightStickX => Some(InputTarget::RightStickY),
            InputTarget::RightStickY => Some(InputTarget::RightStickX),
            _ => None,
        }
    }

    /// Signed analog stick axis that receives dead-zone/smoothing.
    #[inline]
    pub fn is_stick_axis(self) -> bool {
        self.obverse().is_some()
    }

    /// Digital controls (face buttons, bumpers, start/select, d-pad).
    pub fn is_button(self) -> bool {
        matches!(
            self,
            InputTarget::Action1
                | InputTarget::Action2
                | InputTarget::Action3
                | InputTarget::Action4
                | InputTarget::LeftBumper
                | InputTarget::RightBumper
                | InputTarget::Start
                | InputTarget::Select
                | InputTarget::DPadUp
                | InputTarget::DPadDown
                | InputTarget::DPadLeft
                | InputTarget::DPadRight
        )
    }

    /// Default handle for a control bound to this target.
    pub fn default_handle(self) -> &'static str {
        match self {
            InputTarget::LeftStickX => "Left Stick X",
            InputTarget::LeftStickY => "Left Stick Y",
            InputTarget::RightStickX => "Right Stick X",
            InputTarget::RightStickY => "Right Stick Y",
            InputTarget::LeftStickUp => "Left Stick Up",
            InputTarget::LeftStickDown => "Left Stick Down",
            InputTarget::LeftStickLeft => "Left Stick Left",
            InputTarget::LeftStickRight => "Left Stick Right",
            InputTarget::RightStickUp => "Right Stick Up",
            InputTarget::RightStickDown => "Right Stick Down",
            InputTarget::RightStickLeft => "Right Stick Left",
            InputTarget::RightStickRight => "Right Stick Right",
            InputTarget::DPadUp => "DPad Up",
            InputTarget::DPadDown => "DPad Down",
            InputTarget::DPadLeft => "DPad Left",
            InputTarget::DPadRight => "DPad Right",
            InputTarget::Action1 => "Action 1",
            InputTarget::Action2 => "Action 2",
            InputTarget::Action3 => "Action 3",
            InputTarget::Action4 => "Action 4",
            InputTarget::LeftBumper => "Left Bumper",
            InputTarget::RightBumper => "Right Bumper",
            InputTarget::LeftTrigger => "Left Trigger",
            InputTarget::RightTrigger => "Right Trigger",
            InputTarget::Start => "Start",
            InputTarget::Select => "Select",
        }
    }
}

impl fmt::Display for InputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_handle())
    }
}
