//! Servo board: fixed-size servo array behind `SERVO:<n>:...`. Grounded on
//! `original_source/.../boards/servo_board.py` (firmware v4.4).

use sim_types::BoardKind;

use crate::boards::{idn_reply, Reply};
use crate::devices::Servo;
use crate::devices::servo::{MAX_POSITION, MIN_POSITION};
use crate::physics_host::PhysicsHost;

pub struct ServoBoard {
    pub servos: Vec<Servo>,
    pub asset_tag: String,
    pub software_version: String,
    pub jitter_enabled: bool,
    watchdog_fail: bool,
    pgood: bool,
}

impl ServoBoard {
    pub fn new(servos: Vec<Servo>, asset_tag: String) -> Self {
        Self {
            servos,
            asset_tag,
            software_version: "4.4".to_string(),
            jitter_enabled: true,
            watchdog_fail: false,
            pgood: true,
        }
    }

    pub fn handle_command(&mut self, command: &str, host: &mut dyn PhysicsHost) -> Reply {
        let args: Vec<&str> = command.split(':').collect();
        match args.as_slice() {
            ["*IDN?"] => idn_reply(BoardKind::Servo, &self.asset_tag, &self.software_version),
            ["*STATUS?"] => Reply::text(format!("{}:{}", self.watchdog_fail, self.pgood)),
            ["*RESET"] => {
                for servo in &mut self.servos {
                    servo.disable();
                }
                Reply::ack()
            }
            ["SERVO", rest @ ..] => self.handle_servo(rest, host),
            _ => Reply::nack(format!("Unknown command {}", command.trim())),
        }
    }

    fn handle_servo(&mut self, rest: &[&str], host: &mut dyn PhysicsHost) -> Reply {
        match rest.first() {
            None => Reply::nack("Missing servo number"),
            Some(&"I?") => Reply::text(self.current().to_string()),
            Some(&"V?") => Reply::text("5000"),
            Some(number_str) => {
                let Ok(servo_number) = number_str.parse::<usize>() else {
                    return Reply::nack("Invalid servo number");
                };
                if servo_number >= self.servos.len() {
                    return Reply::nack("Invalid servo number");
                }
                match rest.get(1) {
                    None => Reply::nack("Missing servo command"),
                    Some(&"DISABLE") => {
                        self.servos[servo_number].disable();
                        Reply::ack()
                    }
                    Some(&"GET?") => Reply::text(self.servos[servo_number].get_position().to_string()),
                    Some(&"SET") => {
                        let Some(setpoint_str) = rest.get(2) else {
                            return Reply::nack("Missing servo setpoint");
                        };
                        let Ok(setpoint) = setpoint_str.parse::<i32>() else {
                            return Reply::nack("Invalid servo setpoint");
                        };
                        if !(MIN_POSITION..=MAX_POSITION).contains(&setpoint) {
                            return Reply::nack("Invalid servo setpoint");
                        }
                        self.servos[servo_number].set_position(setpoint, host, self.jitter_enabled);
                        Reply::ack()
                    }
                    _ => Reply::nack("Unknown servo command"),
                }
            }
        }
    }

    fn current(&self) -> i32 {
        self.servos.iter().map(Servo::get_current).sum()
    }
}
