//! Motor board: fixed-size motor array behind `MOT:<n>:...`. Grounded on
//! `original_source/.../boards/motor_board.py` (firmware v4.4.1).

use sim_types::BoardKind;

use crate::boards::{idn_reply, Reply};
use crate::devices::Motor;
use crate::devices::motor::{MAX_POWER, MIN_POWER};
use crate::physics_host::PhysicsHost;

pub struct MotorBoard {
    pub motors: Vec<Motor>,
    pub asset_tag: String,
    pub software_version: String,
    /// Disabled for deterministic test fixtures (spec.md S1).
    pub jitter_enabled: bool,
}

impl MotorBoard {
    pub fn new(motors: Vec<Motor>, asset_tag: String) -> Self {
        Self { motors, asset_tag, software_version: "4.4.1".to_string(), jitter_enabled: true }
    }

    pub fn handle_command(&mut self, command: &str, host: &mut dyn PhysicsHost) -> Reply {
        let args: Vec<&str> = command.split(':').collect();
        match args.as_slice() {
            ["*IDN?"] => idn_reply(BoardKind::Motor, &self.asset_tag, &self.software_version),
            ["*STATUS?"] => Reply::text("0,0:12000"),
            ["*RESET"] => {
                for motor in &mut self.motors {
                    motor.disable(host);
                }
                Reply::ack()
            }
            ["MOT", rest @ ..] => self.handle_mot(rest, host),
            _ => Reply::nack(format!("Unknown command {}", command.trim())),
        }
    }

    fn handle_mot(&mut self, rest: &[&str], host: &mut dyn PhysicsHost) -> Reply {
        let Some(number_str) = rest.first() else {
            return Reply::nack("Missing motor number");
        };
        let Ok(motor_number) = number_str.parse::<usize>() else {
            return Reply::nack("Invalid motor number");
        };
        if motor_number >= self.motors.len() {
            return Reply::nack("Invalid motor number");
        }
        match rest.get(1) {
            None => Reply::nack("Missing motor command"),
            Some(&"SET") => {
                let Some(power_str) = rest.get(2) else {
                    return Reply::nack("Missing motor power");
                };
                let Ok(power) = power_str.parse::<i32>() else {
                    return Reply::nack("Invalid motor power");
                };
                if !(MIN_POWER..=MAX_POWER).contains(&power) {
                    return Reply::nack("Invalid motor power");
                }
                tracing::info!(motor = motor_number, power, board = %self.asset_tag, "setting motor power");
                self.motors[motor_number].set_power(power, host, self.jitter_enabled);
                Reply::ack()
            }
            Some(&"GET?") => {
                let motor = &self.motors[motor_number];
                Reply::text(format!("{}:{}", motor.enabled() as u8, motor.get_power()))
            }
            Some(&"DISABLE") => {
                tracing::info!(motor = motor_number, board = %self.asset_tag, "disabling motor");
                self.motors[motor_number].disable(host);
                Reply::ack()
            }
            Some(&"I?") => Reply::text(self.current().to_string()),
            _ => Reply::nack("Unknown motor command"),
        }
    }

    fn current(&self) -> i32 {
        self.motors.iter().map(Motor::get_current).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics_host::MockPhysicsHost;

    fn board() -> MotorBoard {
        let mut b = MotorBoard::new(vec![Motor::null(); 4], "MOT".to_string());
        b.jitter_enabled = false;
        b
    }

    #[test]
    fn s1_motor_set_get_disable() {
        let mut b = board();
        let mut host = MockPhysicsHost::new(32);
        let Reply::Text(idn) = b.handle_command("*IDN?", &mut host) else { panic!() };
        assert_eq!(idn, "Student Robotics:MBv4B:MOT:4.4.1");
        assert_eq!(b.handle_command("MOT:0:SET:500", &mut host), Reply::ack());
        assert_eq!(b.handle_command("MOT:0:GET?", &mut host), Reply::text("1:500"));
        assert_eq!(b.handle_command("MOT:0:DISABLE", &mut host), Reply::ack());
        assert_eq!(b.handle_command("MOT:0:GET?", &mut host), Reply::text("0:500"));
    }

    #[test]
    fn clamp_safety() {
        let mut b = board();
        let mut host = MockPhysicsHost::new(32);
        b.handle_command("MOT:0:SET:500", &mut host);
        assert_eq!(
            b.handle_command("MOT:0:SET:5000", &mut host),
            Reply::nack("Invalid motor power")
        );
        assert_eq!(b.handle_command("MOT:0:GET?", &mut host), Reply::text("1:500"));
    }
}
