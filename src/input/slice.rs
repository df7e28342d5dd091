//! Quantized Input Codec
//!
//! `InputSlice` is the 3-byte per-tick wire record exchanged between peers:
//!
//! ```text
//! byte0  i8   movement X   round(clamp(x, -1, 1) * 127)
//! byte1  i8   movement Y
//! byte2  u8   bit0 Attack  bit1 Special  bit2 Jump  bit3 Shield
//!             bits4-5 smash X  bits6-7 smash Y
//! ```
//!
//! Smash codes: `01` positive, `10` negative, `00` and `11` both decode
//! to neutral. The quantization table is part of the replay format and
//! must not change.

use glam::Vec2;
use serde::{Serialize, Deserialize};

use crate::config::InputConfig;
use crate::input::device::InputDevice;
use crate::input::target::InputTarget;

/// Quantization scale for movement axes.
pub const AXIS_SCALE: f32 = 127.0;

/// Default magnitude a smash axis must exceed.
pub const DEFAULT_SMASH_THRESHOLD: f32 = 0.3;

/// Smash code: neutral.
pub const SMASH_NEUTRAL: u8 = 0b00;
/// Smash code: positive direction.
pub const SMASH_POSITIVE: u8 = 0b01;
/// Smash code: negative direction.
pub const SMASH_NEGATIVE: u8 = 0b10;

/// Quantize an axis value to a signed byte.
#[inline]
pub fn encode_axis(value: f32) -> i8 {
    (value.clamp(-1.0, 1.0) * AXIS_SCALE).round() as i8
}

/// Expand a quantized axis byte.
#[inline]
pub fn decode_axis(byte: i8) -> f32 {
    byte as f32 / AXIS_SCALE
}

/// Quantize a smash axis to its 2-bit code.
#[inline]
pub fn encode_smash(value: f32, threshold: f32) -> u8 {
    if value > threshold {
        SMASH_POSITIVE
    } else if value < -threshold {
        SMASH_NEGATIVE
    } else {
        SMASH_NEUTRAL
    }
}

/// Expand a 2-bit smash code. Only the low two bits are read.
#[inline]
pub fn decode_smash(code: u8) -> f32 {
    match code & 0b11 {
        SMASH_POSITIVE => 1.0,
        SMASH_NEGATIVE => -1.0,
        _ => 0.0,
    }
}

/// Read bit `index` of `byte`.
#[inline]
pub fn get_bit(byte: u8, index: u8) -> bool {
    byte & (1 << index) != 0
}

/// Return `byte` with bit `index` set to `value`; other bits untouched.
#[inline]
pub fn set_bit(byte: u8, index: u8, value: bool) -> u8 {
    if value {
        byte | (1 << index)
    } else {
        byte & !(1 << index)
    }
}

/// Face buttons carried in the flags byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Button {
    /// Bit 0
    Attack = 0,
    /// Bit 1
    Special = 1,
    /// Bit 2
    Jump = 2,
    /// Bit 3
    Shield = 3,
}

impl Button {
    /// All buttons in bit order.
    pub const ALL: [Button; 4] = [Button::Attack, Button::Special, Button::Jump, Button::Shield];
}

/// One player's quantized input for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(C)]
pub struct InputSlice {
    /// Quantized movement X
    pub movement_x: i8,
    /// Quantized movement Y
    pub movement_y: i8,
    /// Buttons and smash codes
    pub flags: u8,
}

impl InputSlice {
    /// Size in bytes on the wire.
    pub const SIZE: usize = 3;

    const SMASH_X_SHIFT: u8 = 4;
    const SMASH_Y_SHIFT: u8 = 6;

    /// Idle slice: no movement, no buttons, neutral smash.
    pub const fn new() -> Self {
        Self {
            movement_x: 0,
            movement_y: 0,
            flags: 0,
        }
    }

    /// Quantize a movement vector.
    pub fn with_movement(movement: Vec2) -> Self {
        let mut slice = Self::new();
        slice.set_movement(movement);
        slice
    }

    /// Decoded movement vector.
    pub fn movement(&self) -> Vec2 {
        Vec2::new(decode_axis(self.movement_x), decode_axis(self.movement_y))
    }

    /// Quantize and store movement.
    pub fn set_movement(&mut self, movement: Vec2) {
        self.movement_x = encode_axis(movement.x);
        self.movement_y = encode_axis(movement.y);
    }

    /// Read a button.
    #[inline]
    pub fn button(&self, button: Button) -> bool {
        get_bit(self.flags, button as u8)
    }

    /// Set a button without touching the other flag bits.
    #[inline]
    pub fn set_button(&mut self, button: Button, pressed: bool) {
        self.flags = set_bit(self.flags, button as u8, pressed);
    }

    /// Attack held.
    pub fn attack(&self) -> bool {
        self.button(Button::Attack)
    }

    /// Special held.
    pub fn special(&self) -> bool {
        self.button(Button::Special)
    }

    /// Jump held.
    pub fn jump(&self) -> bool {
        self.button(Button::Jump)
    }

    /// Shield held.
    pub fn shield(&self) -> bool {
        self.button(Button::Shield)
    }

    /// Raw 2-bit smash code for X.
    pub fn smash_x_code(&self) -> u8 {
        (self.flags >> Self::SMASH_X_SHIFT) & 0b11
    }

    /// Raw 2-bit smash code for Y.
    pub fn smash_y_code(&self) -> u8 {
        (self.flags >> Self::SMASH_Y_SHIFT) & 0b11
    }

    fn set_smash_code(&mut self, shift: u8, code: u8) {
        self.flags = (self.flags & !(0b11 << shift)) | ((code & 0b11) << shift);
    }

    /// Decoded smash direction, each axis in {-1, 0, 1}.
    pub fn smash(&self) -> Vec2 {
        Vec2::new(decode_smash(self.smash_x_code()), decode_smash(self.smash_y_code()))
    }

    /// Quantize and store a smash direction.
    pub fn set_smash(&mut self, smash: Vec2, threshold: f32) {
        self.set_smash_code(Self::SMASH_X_SHIFT, encode_smash(smash.x, threshold));
        self.set_smash_code(Self::SMASH_Y_SHIFT, encode_smash(smash.y, threshold));
    }

    /// Serialize in wire order: X, Y, flags.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        [self.movement_x as u8, self.movement_y as u8, self.flags]
    }

    /// Deserialize from wire order. Every 3-byte pattern is valid.
    pub fn from_bytes(bytes: [u8; Self::SIZE]) -> Self {
        Self {
            movement_x: bytes[0] as i8,
            movement_y: bytes[1] as i8,
            flags: bytes[2],
        }
    }

    /// True when nothing is held.
    pub fn is_idle(&self) -> bool {
        *self == Self::new()
    }

    /// Build a slice from a device's committed controls.
    ///
    /// Movement from the left stick, smash from the right stick,
    /// Attack/Special/Jump/Shield from Action1..Action4. Either bumper
    /// also shields.
    pub fn from_device(device: &InputDevice, config: &InputConfig) -> Self {
        let mut slice = Self::with_movement(device.left_stick().value());
        slice.set_smash(device.right_stick().value(), config.smash_threshold);

        slice.set_button(Button::Attack, device.control(InputTarget::Action1).is_pressed());
        slice.set_button(Button::Special, device.control(InputTarget::Action2).is_pressed());
        slice.set_button(Button::Jump, device.control(InputTarget::Action3).is_pressed());
        slice.set_button(
            Button::Shield,
            device.control(InputTarget::Action4).is_pressed()
                || device.control(InputTarget::LeftBumper).is_pressed()
                || device.control(InputTarget::RightBumper).is_pressed(),
        );
        slice
    }
}

impl From<[u8; InputSlice::SIZE]> for InputSlice {
    fn from(bytes: [u8; InputSlice::SIZE]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<InputSlice> for [u8; InputSlice::SIZE] {
    fn from(slice: InputSlice) -> Self {
        slice.to_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_axis_clamps_before_quantizing() {
        assert_eq!(encode_axis(5.0), 127);
        assert_eq!(encode_axis(1.0), 127);
        assert_eq!(encode_axis(-5.0), -127);
        assert_eq!(encode_axis(0.0), 0);
    }

    #[test]
    fn test_axis_rounding() {
        // 0.5 * 127 = 63.5 rounds away from zero
        assert_eq!(encode_axis(0.5), 64);
        assert_eq!(encode_axis(-0.5), -64);
        assert_eq!(decode_axis(127), 1.0);
        assert_eq!(decode_axis(-127), -1.0);
    }

    #[test]
    fn test_smash_codes() {
        assert_eq!(encode_smash(0.5, DEFAULT_SMASH_THRESHOLD), 0b01);
        assert_eq!(decode_smash(0b01), 1.0);
        assert_eq!(encode_smash(-0.5, DEFAULT_SMASH_THRESHOLD), 0b10);
        assert_eq!(decode_smash(0b10), -1.0);
        assert_eq!(encode_smash(0.1, DEFAULT_SMASH_THRESHOLD), 0b00);
        assert_eq!(decode_smash(0b00), 0.0);
        // Unused code also reads as neutral
        assert_eq!(decode_smash(0b11), 0.0);
        // Exactly at threshold is neutral
        assert_eq!(encode_smash(0.3, 0.3), 0b00);
    }

    #[test]
    fn test_bits_do_not_cross_talk() {
        let mut byte = set_bit(0, 0, true);
        byte = set_bit(byte, 3, true);
        byte = set_bit(byte, 2, true);
        assert!(get_bit(byte, 0));
        assert!(!get_bit(byte, 1));
        assert!(get_bit(byte, 2));
        assert!(get_bit(byte, 3));

        byte = set_bit(byte, 2, false);
        assert!(get_bit(byte, 0));
        assert!(!get_bit(byte, 2));
        assert!(get_bit(byte, 3));
    }

    #[test]
    fn test_smash_does_not_disturb_buttons() {
        let mut slice = InputSlice::new();
        slice.set_button(Button::Attack, true);
        slice.set_button(Button::Shield, true);
        slice.set_smash(Vec2::new(0.9, -0.9), DEFAULT_SMASH_THRESHOLD);

        assert!(slice.attack());
        assert!(!slice.special());
        assert!(!slice.jump());
        assert!(slice.shield());
        assert_eq!(slice.smash(), Vec2::new(1.0, -1.0));
        assert_eq!(slice.flags, 0b1001_1001);

        slice.set_smash(Vec2::ZERO, DEFAULT_SMASH_THRESHOLD);
        assert_eq!(slice.flags, 0b0000_1001);
    }

    #[test]
    fn test_wire_order() {
        let mut slice = InputSlice::with_movement(Vec2::new(-1.0, 0.5));
        slice.set_button(Button::Jump, true);
        assert_eq!(slice.to_bytes(), [0x81, 64, 0b0000_0100]);
        assert_eq!(InputSlice::from_bytes(slice.to_bytes()), slice);
    }

    #[test]
    fn test_from_device() {
        use crate::core::time::FrameTime;

        let config = InputConfig::default();
        let mut device = InputDevice::gamepad("Pad", "");
        device.configure(&config);
        let frame = FrameTime::new(1, 1.0 / 60.0, 1.0);

        device.pre_update().unwrap();
        device.update_value(InputTarget::LeftStickX, 1.0, 1).unwrap();
        device.update_value(InputTarget::RightStickY, -1.0, 1).unwrap();
        device.update_state(InputTarget::Action1, true, 1).unwrap();
        device.update_state(InputTarget::RightBumper, true, 1).unwrap();
        device.post_update(frame, false).unwrap();

        let slice = InputSlice::from_device(&device, &config);
        assert_eq!(slice.movement_x, 127);
        assert_eq!(slice.movement_y, 0);
        assert_eq!(slice.smash(), Vec2::new(0.0, -1.0));
        assert!(slice.attack());
        assert!(slice.shield());
        assert!(!slice.jump());
    }

    proptest! {
        #[test]
        fn prop_axis_quantization_bound(v in -1.0f32..=1.0) {
            let decoded = decode_axis(encode_axis(v));
            prop_assert!((decoded - v).abs() <= 1.0 / 127.0);
        }

        #[test]
        fn prop_axis_requantization_is_stable(v in -1.0f32..=1.0) {
            let q = encode_axis(v);
            prop_assert_eq!(encode_axis(decode_axis(q)), q);
        }

        #[test]
        fn prop_out_of_range_clamps(v in 1.0f32..1000.0) {
            prop_assert_eq!(encode_axis(v), 127);
            prop_assert_eq!(encode_axis(-v), -127);
        }

        #[test]
        fn prop_set_bit_round_trips(byte in any::<u8>(), index in 0u8..8, value in any::<bool>()) {
            let updated = set_bit(byte, index, value);
            prop_assert_eq!(get_bit(updated, index), value);
            for other in (0u8..8).filter(|i| *i != index) {
                prop_assert_eq!(get_bit(updated, other), get_bit(byte, other));
            }
        }

        #[test]
        fn prop_bytes_round_trip(bytes in any::<[u8; 3]>()) {
            prop_assert_eq!(InputSlice::from_bytes(bytes).to_bytes(), bytes);
        }
    }
}
