//! Servo device: `{enabled, position}` in microseconds pulse width, with
//! 0.5% Gaussian jitter on set. Grounded on
//! `original_source/.../devices/servo.py`'s `BaseServo`/`NullServo`/`Servo`
//! split (Null defaults to the range midpoint, 1500).

use rand::thread_rng;
use rand_distr::{Distribution, Normal};

use crate::physics_host::{DeviceHandle, PhysicsHost};

pub const MAX_POSITION: i32 = 2000;
pub const MIN_POSITION: i32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Servo {
    Null { position: i32, enabled: bool },
    Real { handle: DeviceHandle, position: i32, enabled: bool },
}

impl Servo {
    pub fn null() -> Self {
        Servo::Null { position: (MAX_POSITION + MIN_POSITION) / 2, enabled: false }
    }

    pub fn real(handle: DeviceHandle) -> Self {
        Servo::Real { handle, position: (MAX_POSITION + MIN_POSITION) / 2, enabled: false }
    }

    pub fn disable(&mut self) {
        match self {
            Servo::Null { enabled, .. } | Servo::Real { enabled, .. } => *enabled = false,
        }
    }

    pub fn set_position(&mut self, value: i32, host: &mut dyn PhysicsHost, jitter: bool) {
        match self {
            Servo::Null { position, enabled } => {
                *position = value;
                *enabled = true;
            }
            Servo::Real { handle, position, enabled } => {
                let native = if jitter {
                    let sigma = value.abs() as f64 * 0.005;
                    let noisy = value as f64
                        + Normal::new(0.0, sigma).unwrap().sample(&mut thread_rng());
                    noisy.clamp(MIN_POSITION as f64, MAX_POSITION as f64)
                } else {
                    value as f64
                };
                let span = (MAX_POSITION - MIN_POSITION) as f64;
                host.device_set_value(*handle, (native - MIN_POSITION as f64) / span);
                *position = value;
                *enabled = true;
            }
        }
    }

    pub fn get_position(&self) -> i32 {
        match self {
            Servo::Null { position, .. } | Servo::Real { position, .. } => *position,
        }
    }

    pub fn enabled(&self) -> bool {
        match self {
            Servo::Null { enabled, .. } | Servo::Real { enabled, .. } => *enabled,
        }
    }

    /// Current feedback is unsupported, matching the original's
    /// `# TODO calculate from torque feedback`.
    pub fn get_current(&self) -> i32 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics_host::MockPhysicsHost;

    #[test]
    fn null_servo_defaults_to_midpoint() {
        let servo = Servo::null();
        assert_eq!(servo.get_position(), 1500);
        assert!(!servo.enabled());
    }

    #[test]
    fn set_position_without_jitter_is_exact() {
        let mut host = MockPhysicsHost::new(32);
        let mut servo = Servo::null();
        servo.set_position(1800, &mut host, false);
        assert_eq!(servo.get_position(), 1800);
        assert!(servo.enabled());
    }
}
