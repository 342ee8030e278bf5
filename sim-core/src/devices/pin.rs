//! Arduino GPIO pin, with sub-variants for the sensor types that can be
//! wired to a pin slot. Grounded on
//! `original_source/.../devices/arduino_devices.py`'s `BasePin`/`EmptyPin`/
//! `UltrasonicSensor`/`MicroSwitch`/`PressureSensor`/`ReflectanceSensor`/
//! pin-`Led`.

use sim_types::GpioPinMode;

use crate::physics_host::{DeviceHandle, PhysicsHost};

pub const ANALOG_MAX: u16 = 1023;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pin {
    /// Unwired digital/analog pin, fully software-backed.
    Empty { mode: GpioPinMode, digital: bool, analog: u16 },
    /// Echo pin of an ultrasonic rangefinder; distance is read in mm.
    UltrasonicEcho { mode: GpioPinMode, handle: DeviceHandle },
    MicroSwitch { mode: GpioPinMode, handle: DeviceHandle },
    PressureSensor { mode: GpioPinMode, handle: DeviceHandle },
    ReflectanceSensor { mode: GpioPinMode, handle: DeviceHandle },
    /// A pin wired to drive an LED rather than read a sensor.
    Led { mode: GpioPinMode, handle: DeviceHandle, on: bool },
}

impl Pin {
    pub fn empty() -> Self {
        Pin::Empty { mode: GpioPinMode::Input, digital: false, analog: 0 }
    }

    pub fn get_mode(&self) -> GpioPinMode {
        match *self {
            Pin::Empty { mode, .. }
            | Pin::UltrasonicEcho { mode, .. }
            | Pin::MicroSwitch { mode, .. }
            | Pin::PressureSensor { mode, .. }
            | Pin::ReflectanceSensor { mode, .. }
            | Pin::Led { mode, .. } => mode,
        }
    }

    pub fn set_mode(&mut self, new_mode: GpioPinMode) {
        match self {
            Pin::Empty { mode, .. }
            | Pin::UltrasonicEcho { mode, .. }
            | Pin::MicroSwitch { mode, .. }
            | Pin::PressureSensor { mode, .. }
            | Pin::ReflectanceSensor { mode, .. }
            | Pin::Led { mode, .. } => *mode = new_mode,
        }
    }

    pub fn get_digital(&self, host: &dyn PhysicsHost) -> bool {
        match *self {
            Pin::Empty { digital, .. } => digital,
            Pin::UltrasonicEcho { .. } => false,
            Pin::MicroSwitch { handle, .. } => host.device_get_value(handle) != 0.0,
            Pin::PressureSensor { .. } => self.get_analog(host) > ANALOG_MAX / 2,
            Pin::ReflectanceSensor { .. } => self.get_analog(host) > ANALOG_MAX / 2,
            Pin::Led { on, .. } => on,
        }
    }

    pub fn set_digital(&mut self, value: bool, host: &mut dyn PhysicsHost) {
        match self {
            Pin::Empty { digital, .. } => *digital = value,
            Pin::Led { handle, on, .. } => {
                host.device_set_value(*handle, if value { 1.0 } else { 0.0 });
                *on = value;
            }
            _ => {}
        }
    }

    pub fn get_analog(&self, host: &dyn PhysicsHost) -> u16 {
        match *self {
            Pin::Empty { analog, .. } => analog,
            Pin::PressureSensor { handle, .. } => {
                (host.device_get_value(handle) as u16).min(ANALOG_MAX)
            }
            Pin::ReflectanceSensor { handle, .. } => {
                let grey = host.device_get_value(handle).clamp(0.0, 255.0);
                map_to_range(grey, (0.0, 255.0), (0.0, ANALOG_MAX as f64)) as u16
            }
            _ => 0,
        }
    }

    /// Distance in mm, for the Arduino board's `u<trigger><echo>` command.
    /// Returns `None` if this pin isn't wired as an ultrasonic echo.
    pub fn get_distance_mm(&self, host: &dyn PhysicsHost) -> Option<i32> {
        match *self {
            Pin::UltrasonicEcho { handle, .. } => Some(host.device_get_value(handle) as i32),
            _ => None,
        }
    }
}

fn map_to_range(value: f64, old: (f64, f64), new: (f64, f64)) -> f64 {
    ((value - old.0) / (old.1 - old.0)) * (new.1 - new.0) + new.0
}
