//! Device Registry
//!
//! Explicitly constructed context that owns the attached devices, the
//! device managers that detect hardware, and the active-device pointer.
//! One registry per simulation; nothing here is global.

use tracing::{debug, info};

use crate::config::InputConfig;
use crate::core::channel::{Subscribers, SubscriptionId};
use crate::core::time::FrameTime;
use crate::input::device::InputDevice;
use crate::input::InputError;

/// Registry-assigned device identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceId(pub u32);

/// Attach/detach request produced by a device manager.
pub enum DeviceChange {
    /// A device was detected
    Attach(InputDevice),
    /// A device went away
    Detach(DeviceId),
}

/// Platform-specific hardware detection, polled at the top of every tick.
pub trait DeviceManager {
    /// Report devices that appeared or disappeared since the last call.
    fn update(&mut self, frame: FrameTime, changes: &mut Vec<DeviceChange>);
}

/// Notifications published by the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceEvent {
    /// Device attached
    Attached(DeviceId),
    /// Device detached
    Detached(DeviceId),
    /// Active device identity changed (`None` = null device)
    ActiveChanged {
        /// Previously active
        previous: Option<DeviceId>,
        /// Newly active
        current: Option<DeviceId>,
    },
}

/// Ordered set of attached devices plus the active-device pointer.
pub struct DeviceRegistry {
    config: InputConfig,
    devices: Vec<(DeviceId, InputDevice)>,
    next_id: u32,
    active: Option<DeviceId>,
    null_device: InputDevice,
    managers: Vec<Box<dyn DeviceManager>>,
    events: Subscribers<DeviceEvent>,
}

impl DeviceRegistry {
    /// Create an empty registry.
    pub fn new(config: InputConfig) -> Self {
        Self {
            config,
            devices: Vec::new(),
            next_id: 0,
            active: None,
            null_device: InputDevice::null(),
            managers: Vec::new(),
            events: Subscribers::new(),
        }
    }

    /// Drop every device and manager and clear the active device.
    pub fn reset(&mut self) {
        self.devices.clear();
        self.managers.clear();
        self.active = None;
        info!("Input registry reset");
    }

    /// Input configuration applied to attached devices.
    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    /// Register a hardware manager.
    pub fn add_manager(&mut self, manager: impl DeviceManager + 'static) {
        self.managers.push(Box::new(manager));
    }

    /// Subscribe to attach/detach/active-change notifications.
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&DeviceEvent) + 'static,
    {
        self.events.subscribe(handler)
    }

    /// Remove a notification handler.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Attach a device and re-sort.
    pub fn attach_device(&mut self, mut device: InputDevice) -> Result<DeviceId, InputError> {
        if device.is_null() {
            return Err(InputError::NullDevice);
        }
        device.configure(&self.config);

        let id = DeviceId(self.next_id);
        self.next_id += 1;
        info!(device = %device.name(), id = id.0, "Device attached");

        self.devices.push((id, device));
        self.sort_devices();
        self.events.publish(&DeviceEvent::Attached(id));
        Ok(id)
    }

    /// Detach a device. Detaching the active device falls back to the
    /// null device until the next recomputation.
    pub fn detach_device(&mut self, id: DeviceId) -> Result<InputDevice, InputError> {
        let index = self
            .devices
            .iter()
            .position(|(d, _)| *d == id)
            .ok_or(InputError::UnknownDevice(id))?;
        let (_, device) = self.devices.remove(index);
        info!(device = %device.name(), id = id.0, "Device detached");

        self.events.publish(&DeviceEvent::Detached(id));
        if self.active == Some(id) {
            self.active = None;
            self.events.publish(&DeviceEvent::ActiveChanged {
                previous: Some(id),
                current: None,
            });
        }
        Ok(device)
    }

    /// Stable sort by sort order ascending; unordered devices last.
    fn sort_devices(&mut self) {
        self.devices.sort_by_key(|(_, device)| match device.sort_order() {
            Some(order) => (0u8, order),
            None => (1u8, 0),
        });
    }

    /// Attached devices in enumeration order.
    pub fn devices(&self) -> impl Iterator<Item = (DeviceId, &InputDevice)> {
        self.devices.iter().map(|(id, d)| (*id, d))
    }

    /// Number of attached devices.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// True when no device is attached.
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Look up a device; unknown ids read as the null device.
    pub fn device(&self, id: DeviceId) -> &InputDevice {
        self.devices
            .iter()
            .find(|(d, _)| *d == id)
            .map(|(_, device)| device)
            .unwrap_or(&self.null_device)
    }

    /// Mutable device lookup.
    pub fn device_mut(&mut self, id: DeviceId) -> Result<&mut InputDevice, InputError> {
        self.devices
            .iter_mut()
            .find(|(d, _)| *d == id)
            .map(|(_, device)| device)
            .ok_or(InputError::UnknownDevice(id))
    }

    /// Id of the active device, `None` while the null device is active.
    pub fn active_device_id(&self) -> Option<DeviceId> {
        self.active
    }

    /// The active device, or the null device.
    pub fn active_device(&self) -> &InputDevice {
        match self.active {
            Some(id) => self.device(id),
            None => &self.null_device,
        }
    }

    /// Run one input tick.
    ///
    /// (a) poll managers, (b) begin every device, (c) sample,
    /// (d) commit, (e) recompute the active device.
    pub fn update(&mut self, frame: FrameTime) -> Result<(), InputError> {
        let mut changes = Vec::new();
        for manager in self.managers.iter_mut() {
            manager.update(frame, &mut changes);
        }
        for change in changes {
            match change {
                DeviceChange::Attach(device) => {
                    self.attach_device(device)?;
                }
                DeviceChange::Detach(id) => {
                    self.detach_device(id)?;
                }
            }
        }

        for (_, device) in self.devices.iter_mut() {
            device.pre_update()?;
        }
        for (_, device) in self.devices.iter_mut() {
            device.update(frame)?;
        }
        let invert_y = self.config.invert_y_axis;
        for (_, device) in self.devices.iter_mut() {
            device.post_update(frame, invert_y)?;
        }

        self.update_active_device();
        Ok(())
    }

    /// Pick the device with the greatest change tick. Only a strictly
    /// greater tick displaces the current active device; among equal
    /// candidates the first in enumeration order wins.
    fn update_active_device(&mut self) {
        let previous = self.active;
        let mut best = previous;
        let mut best_tick = previous.map(|id| self.device(id).last_change_tick()).unwrap_or(0);

        for (id, device) in self.devices.iter() {
            if device.last_change_tick() > best_tick {
                best = Some(*id);
                best_tick = device.last_change_tick();
            }
        }

        if best != previous {
            self.active = best;
            debug!(?previous, current = ?best, tick = best_tick, "Active device changed");
            self.events.publish(&DeviceEvent::ActiveChanged {
                previous,
                current: best,
            });
        }
    }
}
