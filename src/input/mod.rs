//! Input Pipeline
//!
//! Raw per-frame device samples flow through the control state machine
//! (dead zone, smoothing, commit) and are quantized into `InputSlice`s
//! for the wire.
//!
//! ## Module Structure
//!
//! - `slice`: Quantized codec and the 3-byte `InputSlice`
//! - `state`: `InputState` pair
//! - `target`: Control slots
//! - `control`: Per-control tick protocol, dead zones, composites
//! - `device`: Devices and samplers
//! - `registry`: Attached devices and the active device
//! - `recorder`: Delta-compressed slice recordings

pub mod slice;
pub mod state;
pub mod target;
pub mod control;
pub mod device;
pub mod registry;
pub mod recorder;

use crate::core::time::Tick;

// Re-export key types
pub use slice::{InputSlice, Button, encode_axis, decode_axis, encode_smash, decode_smash};
pub use state::InputState;
pub use target::InputTarget;
pub use control::{InputControl, TwoAxisControl};
pub use device::{InputDevice, DeviceSampler, ChannelSampler, RawSample, SampleValue};
pub use registry::{DeviceRegistry, DeviceId, DeviceEvent, DeviceManager, DeviceChange};
pub use recorder::SliceRecorder;

/// Tick-protocol precondition violations.
///
/// These indicate a sequencing bug in the caller and are not retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    /// Sample or commit stamped earlier than the control's last change.
    #[error("Control '{control}' updated at tick {tick}, earlier than its last change at tick {last_tick}")]
    OutOfOrderTick {
        /// Control handle
        control: String,
        /// Offending tick
        tick: Tick,
        /// Control's update tick
        last_tick: Tick,
    },

    /// Mutation attempted on the null control.
    #[error("Cannot update the null control")]
    NullControl,

    /// Mutation attempted on the null device.
    #[error("Cannot update the null device")]
    NullDevice,

    /// Device id not attached.
    #[error("Unknown device {0:?}")]
    UnknownDevice(registry::DeviceId),

    /// Slot has no control.
    #[error("Device has no control for {0}")]
    ControlNotPresent(target::InputTarget),
}
