//! Arduino board: the compact single-character dialect (spec.md §4.3.2),
//! superseding `original_source/.../boards/arduino.py`'s older verbose
//! `PIN:`/`ULTRASOUND:` commands (REDESIGN FLAG — spec.md §9 Design Notes
//! says follow the latest convention, not the earlier one). Housekeeping
//! commands (`*IDN?`/`*STATUS?`/`*RESET`) are kept from the original since
//! nothing in the distillation supersedes them.

use sim_types::{BoardKind, GpioPinMode};

use crate::boards::{idn_reply, Reply};
use crate::devices::Pin;
use crate::physics_host::PhysicsHost;

pub struct Arduino {
    pub pins: Vec<Pin>,
    pub asset_tag: String,
    pub software_version: String,
}

impl Arduino {
    pub fn new(pins: Vec<Pin>, asset_tag: String) -> Self {
        Self { pins, asset_tag, software_version: "2.0".to_string() }
    }

    pub fn handle_command(&mut self, command: &str, host: &mut dyn PhysicsHost) -> Reply {
        if command.starts_with('*') {
            return match command {
                "*IDN?" => idn_reply(BoardKind::Arduino, &self.asset_tag, &self.software_version),
                "*STATUS?" => Reply::text("Yes"),
                "*RESET" => Reply::nack("Reset not supported"),
                _ => Reply::nack(format!("Unknown command {}", command.trim())),
            };
        }

        let mut chars = command.chars();
        match chars.next() {
            Some('a') => match chars.next().and_then(pin_index) {
                Some(p) if p < self.pins.len() => Reply::text(self.pins[p].get_analog(host).to_string()),
                _ => Reply::text("0"),
            },
            Some('r') => match chars.next().and_then(pin_index) {
                Some(p) if p < self.pins.len() => {
                    Reply::text(if self.pins[p].get_digital(host) { "h" } else { "l" })
                }
                _ => Reply::text("l"),
            },
            Some('l') => {
                self.set_digital_if_valid(chars.next(), false, host);
                Reply::Empty
            }
            Some('h') => {
                self.set_digital_if_valid(chars.next(), true, host);
                Reply::Empty
            }
            Some('i') => {
                self.set_mode_if_valid(chars.next(), GpioPinMode::Input);
                Reply::Empty
            }
            Some('o') => {
                self.set_mode_if_valid(chars.next(), GpioPinMode::Output);
                Reply::Empty
            }
            Some('p') => {
                self.set_mode_if_valid(chars.next(), GpioPinMode::InputPullup);
                Reply::Empty
            }
            Some('u') => {
                let trigger = chars.next().and_then(pin_index);
                let echo = chars.next().and_then(pin_index);
                match (trigger, echo) {
                    (Some(t), Some(e)) if t < self.pins.len() && e < self.pins.len() => {
                        match self.pins[e].get_distance_mm(host) {
                            Some(distance) => Reply::text(distance.to_string()),
                            None => Reply::text("0"),
                        }
                    }
                    _ => Reply::text("0"),
                }
            }
            Some('v') => Reply::text(format!("SRduino:{}", self.software_version)),
            _ => Reply::Empty,
        }
    }

    fn set_digital_if_valid(&mut self, pin_char: Option<char>, value: bool, host: &mut dyn PhysicsHost) {
        if let Some(p) = pin_char.and_then(pin_index) {
            if p < self.pins.len() {
                self.pins[p].set_digital(value, host);
            }
        }
    }

    fn set_mode_if_valid(&mut self, pin_char: Option<char>, mode: GpioPinMode) {
        if let Some(p) = pin_char.and_then(pin_index) {
            if p < self.pins.len() {
                self.pins[p].set_mode(mode);
            }
        }
    }
}

/// The Arduino compact dialect's `'a'+index` pin mapping: `'a'` → 0 .. `'z'` → 25.
fn pin_index(c: char) -> Option<usize> {
    if c.is_ascii_lowercase() {
        Some((c as u8 - b'a') as usize)
    } else {
        None
    }
}
