//! Motor device: `{enabled, power}` with Gaussian jitter applied on set.
//! Grounded on `original_source/.../devices/motor.py`'s `BaseMotor`/
//! `NullMotor`/`Motor` split and `uwb_physics.rs`'s
//! `Normal::new(0.0, sigma).unwrap().sample(&mut rng)` noise shape.

use rand::thread_rng;
use rand_distr::{Distribution, Normal};

use crate::physics_host::{DeviceHandle, PhysicsHost};

pub const MAX_POWER: i32 = 1000;
pub const MIN_POWER: i32 = -1000;

/// Firmware deadband: setpoints under 5% of full scale are coerced to zero.
const DEADBAND: i32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motor {
    Null { power: i32, enabled: bool },
    Real { handle: DeviceHandle, power: i32, enabled: bool },
}

impl Motor {
    pub fn null() -> Self {
        Motor::Null { power: 0, enabled: false }
    }

    pub fn real(handle: DeviceHandle) -> Self {
        Motor::Real { handle, power: 0, enabled: false }
    }

    pub fn disable(&mut self, host: &mut dyn PhysicsHost) {
        match self {
            Motor::Null { enabled, .. } => *enabled = false,
            Motor::Real { handle, enabled, .. } => {
                host.device_set_value(*handle, 0.0);
                *enabled = false;
            }
        }
    }

    /// Apply a validated power setpoint (already clamped to
    /// `[MIN_POWER, MAX_POWER]` by the board). `jitter` is disabled in tests
    /// so fixtures can assert exact values (see spec.md S1).
    pub fn set_power(&mut self, value: i32, host: &mut dyn PhysicsHost, jitter: bool) {
        let value = if value.abs() < DEADBAND {
            if value != 0 {
                tracing::warn!(power = value, "motor power below deadband, coercing to 0");
            }
            0
        } else {
            value
        };

        match self {
            Motor::Null { power, enabled } => {
                *power = value;
                *enabled = true;
            }
            Motor::Real { handle, power, enabled } => {
                let native = if jitter {
                    let sigma = value.abs() as f64 * 0.01;
                    let noisy = if sigma > 0.0 {
                        value as f64 + Normal::new(0.0, sigma).unwrap().sample(&mut thread_rng())
                    } else {
                        value as f64
                    };
                    noisy.clamp(MIN_POWER as f64, MAX_POWER as f64)
                } else {
                    value as f64
                };
                host.device_set_value(*handle, native / MAX_POWER as f64);
                *power = value;
                *enabled = true;
            }
        }
    }

    pub fn get_power(&self) -> i32 {
        match self {
            Motor::Null { power, .. } | Motor::Real { power, .. } => *power,
        }
    }

    pub fn enabled(&self) -> bool {
        match self {
            Motor::Null { enabled, .. } | Motor::Real { enabled, .. } => *enabled,
        }
    }

    /// Current feedback is unsupported by the simulated firmware, matching
    /// the original's `# TODO calculate from torque feedback`.
    pub fn get_current(&self) -> i32 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics_host::MockPhysicsHost;

    #[test]
    fn null_motor_set_get_roundtrip() {
        let mut host = MockPhysicsHost::new(32);
        let mut motor = Motor::null();
        motor.set_power(500, &mut host, false);
        assert_eq!(motor.get_power(), 500);
        assert!(motor.enabled());
        motor.disable(&mut host);
        assert!(!motor.enabled());
        assert_eq!(motor.get_power(), 500);
    }

    #[test]
    fn deadband_coerces_small_power_to_zero() {
        let mut host = MockPhysicsHost::new(32);
        let mut motor = Motor::null();
        motor.set_power(10, &mut host, false);
        assert_eq!(motor.get_power(), 0);
    }

    #[test]
    fn jitter_disabled_gives_exact_value() {
        let mut host = MockPhysicsHost::new(32);
        let handle = host.get_device("motor0", crate::physics_host::DeviceKind::Motor).unwrap();
        let mut motor = Motor::real(handle);
        motor.set_power(500, &mut host, false);
        assert_eq!(motor.get_power(), 500);
    }
}
