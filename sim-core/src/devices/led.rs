//! LED device: a single colour index into the fixed 8-entry RGB table
//! (`sim_types::RGB_COLOURS`), index 0 = OFF. Grounded on
//! `original_source/.../devices/led.py`'s `BaseLed`/`NullLed`/`Led` split.

use crate::physics_host::{DeviceHandle, PhysicsHost};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Led {
    Null { colour: u8 },
    Real { handle: DeviceHandle, colour: u8 },
}

impl Led {
    pub fn null() -> Self {
        Led::Null { colour: 0 }
    }

    pub fn real(handle: DeviceHandle) -> Self {
        Led::Real { handle, colour: 0 }
    }

    pub fn set_colour(&mut self, colour: u8, host: &mut dyn PhysicsHost) {
        match self {
            Led::Null { colour: c } => *c = colour,
            Led::Real { handle, colour: c } => {
                host.device_set_value(*handle, colour as f64);
                *c = colour;
            }
        }
    }

    pub fn get_colour(&self) -> u8 {
        match self {
            Led::Null { colour } | Led::Real { colour, .. } => *colour,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_led_roundtrip() {
        let mut host = crate::physics_host::MockPhysicsHost::new(32);
        let mut led = Led::null();
        led.set_colour(3, &mut host);
        assert_eq!(led.get_colour(), 3);
    }
}
