//! Input Devices
//!
//! A device owns one optional control per `InputTarget` plus three
//! derived composites (left stick, right stick, d-pad). Hardware access
//! lives behind `DeviceSampler`; the device only runs the tick protocol.

use std::borrow::Cow;

use tokio::sync::mpsc;

use crate::config::InputConfig;
use crate::core::time::{FrameTime, Tick};
use crate::input::control::{InputControl, TwoAxisControl, NULL_CONTROL};
use crate::input::target::InputTarget;
use crate::input::InputError;

/// Raw sampling from hardware/OS APIs, run once per tick between
/// `pre_update` and `post_update`.
pub trait DeviceSampler {
    /// Feed this tick's raw samples into the device's controls.
    fn sample(&mut self, device: &mut InputDevice, frame: FrameTime) -> Result<(), InputError>;
}

/// A single raw reading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SampleValue {
    /// Digital reading
    State(bool),
    /// Analog reading
    Value(f32),
}

/// A raw reading addressed to a control.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawSample {
    /// Control slot
    pub target: InputTarget,
    /// Reading
    pub value: SampleValue,
}

/// Sampler draining readings pushed from another context (an OS event
/// thread, a network peer). Everything queued before the tick's sample
/// step lands in that tick.
pub struct ChannelSampler {
    rx: mpsc::UnboundedReceiver<RawSample>,
}

impl ChannelSampler {
    /// Create a sampler and the sender that feeds it.
    pub fn new() -> (Self, mpsc::UnboundedSender<RawSample>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { rx }, tx)
    }
}

impl DeviceSampler for ChannelSampler {
    fn sample(&mut self, device: &mut InputDevice, frame: FrameTime) -> Result<(), InputError> {
        while let Ok(sample) = self.rx.try_recv() {
            match sample.value {
                SampleValue::State(state) => device.update_state(sample.target, state, frame.tick)?,
                SampleValue::Value(value) => device.update_value(sample.target, value, frame.tick)?,
            }
        }
        Ok(())
    }
}

/// An attached (or sentinel) input device.
pub struct InputDevice {
    name: String,
    meta: String,
    sort_order: Option<i32>,
    controls: Vec<Option<InputControl>>,
    left_stick: TwoAxisControl,
    right_stick: TwoAxisControl,
    dpad: TwoAxisControl,
    last_change_tick: Tick,
    sampler: Option<Box<dyn DeviceSampler>>,
    is_null: bool,
}

impl InputDevice {
    /// Create a device with no controls.
    pub fn new(name: impl Into<String>, meta: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meta: meta.into(),
            sort_order: None,
            controls: vec![None; InputTarget::COUNT],
            left_stick: TwoAxisControl::stick(),
            right_stick: TwoAxisControl::stick(),
            dpad: TwoAxisControl::dpad(),
            last_change_tick: 0,
            sampler: None,
            is_null: false,
        }
    }

    /// The "no device" sentinel: every control reads neutral and every
    /// mutation fails with `InputError::NullDevice`.
    pub fn null() -> Self {
        Self {
            is_null: true,
            ..Self::new("None", "")
        }
    }

    /// Create a device with the standard twin-stick gamepad layout.
    pub fn gamepad(name: impl Into<String>, meta: impl Into<String>) -> Self {
        let mut device = Self::new(name, meta);
        for target in InputTarget::ALL {
            device.add_control(target, target.default_handle());
        }
        device
    }

    /// Builder: set enumeration order.
    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = Some(sort_order);
        self
    }

    /// Builder: attach a sampler.
    pub fn with_sampler(mut self, sampler: impl DeviceSampler + 'static) -> Self {
        self.sampler = Some(Box::new(sampler));
        self
    }

    /// Register a control in `target`'s slot.
    pub fn add_control(
        &mut self,
        target: InputTarget,
        handle: impl Into<Cow<'static, str>>,
    ) -> &mut InputControl {
        self.controls[target.index()].insert(InputControl::new(handle, target))
    }

    /// Apply dead-zone and threshold settings to every control.
    pub fn configure(&mut self, config: &InputConfig) {
        for control in self.controls.iter_mut().flatten() {
            control.configure(config);
        }
    }

    /// Device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Platform metadata (e.g. driver / GUID string).
    pub fn meta(&self) -> &str {
        &self.meta
    }

    /// Enumeration order; `None` sorts last.
    pub fn sort_order(&self) -> Option<i32> {
        self.sort_order
    }

    /// True for the sentinel device.
    pub fn is_null(&self) -> bool {
        self.is_null
    }

    /// Last tick at which any control changed.
    pub fn last_change_tick(&self) -> Tick {
        self.last_change_tick
    }

    /// Control in `target`'s slot, or the null control.
    pub fn control(&self, target: InputTarget) -> &InputControl {
        self.controls[target.index()].as_ref().unwrap_or(&NULL_CONTROL)
    }

    /// Mutable control in `target`'s slot.
    pub fn control_mut(&mut self, target: InputTarget) -> Result<&mut InputControl, InputError> {
        if self.is_null {
            return Err(InputError::NullDevice);
        }
        self.controls[target.index()]
            .as_mut()
            .ok_or(InputError::ControlNotPresent(target))
    }

    /// Populated controls in target order.
    pub fn controls(&self) -> impl Iterator<Item = &InputControl> {
        self.controls.iter().flatten()
    }

    /// Left stick composite.
    pub fn left_stick(&self) -> &TwoAxisControl {
        &self.left_stick
    }

    /// Right stick composite.
    pub fn right_stick(&self) -> &TwoAxisControl {
        &self.right_stick
    }

    /// D-pad composite (normalized).
    pub fn dpad(&self) -> &TwoAxisControl {
        &self.dpad
    }

    /// True if any face button or bumper is held.
    pub fn any_button_pressed(&self) -> bool {
        self.controls().any(|c| c.is_button() && c.is_pressed())
    }

    /// Feed a digital sample to a control.
    ///
    /// Unpopulated slots behave as the null control.
    pub fn update_state(&mut self, target: InputTarget, state: bool, tick: Tick) -> Result<(), InputError> {
        if self.is_null {
            return Err(InputError::NullDevice);
        }
        match self.controls[target.index()].as_mut() {
            Some(control) => control.update_state(state, tick),
            None => Err(InputError::NullControl),
        }
    }

    /// Feed an analog sample to a control.
    pub fn update_value(&mut self, target: InputTarget, value: f32, tick: Tick) -> Result<(), InputError> {
        if self.is_null {
            return Err(InputError::NullDevice);
        }
        match self.controls[target.index()].as_mut() {
            Some(control) => control.update_value(value, tick),
            None => Err(InputError::NullControl),
        }
    }

    /// Begin a tick on every control.
    pub fn pre_update(&mut self) -> Result<(), InputError> {
        if self.is_null {
            return Err(InputError::NullDevice);
        }
        for control in self.controls.iter_mut().flatten() {
            control.pre_update();
        }
        Ok(())
    }

    /// Run the device's sampler, if any.
    pub fn update(&mut self, frame: FrameTime) -> Result<(), InputError> {
        if self.is_null {
            return Err(InputError::NullDevice);
        }
        if let Some(mut sampler) = self.sampler.take() {
            let result = sampler.sample(self, frame);
            self.sampler = Some(sampler);
            result?;
        }
        Ok(())
    }

    /// Commit every control and recompute the composites.
    ///
    /// Order: stick axes (dead zone + smoothing) are committed first,
    /// their values are fed into the directional controls, then the
    /// remaining controls commit and the composites are derived.
    pub fn post_update(&mut self, frame: FrameTime, invert_y: bool) -> Result<(), InputError> {
        if self.is_null {
            return Err(InputError::NullDevice);
        }
        let tick = frame.tick;
        let mut changed = false;

        let raws: Vec<Option<f32>> = self
            .controls
            .iter()
            .map(|c| c.as_ref().and_then(|c| c.raw_value()))
            .collect();

        for control in self.controls.iter_mut().flatten() {
            let target = control.target();
            if let Some(obverse) = target.obverse() {
                control.process_analog(raws[obverse.index()], frame.delta);
                changed |= control.commit(tick)?;
            }
        }

        self.feed_directions(
            InputTarget::LeftStickX,
            InputTarget::LeftStickY,
            [
                InputTarget::LeftStickLeft,
                InputTarget::LeftStickRight,
                InputTarget::LeftStickDown,
                InputTarget::LeftStickUp,
            ],
        );
        self.feed_directions(
            InputTarget::RightStickX,
            InputTarget::RightStickY,
            [
                InputTarget::RightStickLeft,
                InputTarget::RightStickRight,
                InputTarget::RightStickDown,
                InputTarget::RightStickUp,
            ],
        );

        for control in self.controls.iter_mut().flatten() {
            if !control.target().is_stick_axis() {
                changed |= control.commit(tick)?;
            }
        }

        let c = |t: InputTarget| self.controls[t.index()].as_ref().unwrap_or(&NULL_CONTROL);
        self.left_stick.update(
            c(InputTarget::LeftStickLeft),
            c(InputTarget::LeftStickRight),
            c(InputTarget::LeftStickDown),
            c(InputTarget::LeftStickUp),
            invert_y,
            tick,
        );
        self.right_stick.update(
            c(InputTarget::RightStickLeft),
            c(InputTarget::RightStickRight),
            c(InputTarget::RightStickDown),
            c(InputTarget::RightStickUp),
            invert_y,
            tick,
        );
        self.dpad.update(
            c(InputTarget::DPadLeft),
            c(InputTarget::DPadRight),
            c(InputTarget::DPadDown),
            c(InputTarget::DPadUp),
            invert_y,
            tick,
        );

        if changed {
            self.last_change_tick = tick;
        }
        Ok(())
    }

    /// Split committed signed axes into [left, right, down, up].
    fn feed_directions(&mut self, x: InputTarget, y: InputTarget, directions: [InputTarget; 4]) {
        let x_value = self.control(x).value();
        let y_value = self.control(y).value();
        let values = [
            (-x_value).max(0.0),
            x_value.max(0.0),
            (-y_value).max(0.0),
            y_value.max(0.0),
        ];
        for (target, value) in directions.into_iter().zip(values) {
            if let Some(control) = self.controls[target.index()].as_mut() {
                control.feed_derived(value);
            }
        }
    }
}

impl std::fmt::Debug for InputDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputDevice")
            .field("name", &self.name)
            .field("sort_order", &self.sort_order)
            .field("last_change_tick", &self.last_change_tick)
            .field("is_null", &self.is_null)
            .finish()
    }
}
