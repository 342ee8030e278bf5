//! LED hat: an addressable array of general LEDs plus a dedicated
//! start-button LED at fixed index 4. Grounded on
//! `original_source/.../boards/led_board.py`.

use sim_types::{colour_index, BoardKind, RGB_COLOURS};

use crate::boards::{idn_reply, Reply};
use crate::devices::Led;
use crate::physics_host::PhysicsHost;

/// Reserved index for the start-button LED (spec.md §9 Design Notes).
pub const LED_START: usize = 4;

pub struct LedBoard {
    pub leds: Vec<Led>,
    pub asset_tag: String,
    pub software_version: String,
}

impl LedBoard {
    pub fn new(leds: Vec<Led>, asset_tag: String) -> Self {
        Self { leds, asset_tag, software_version: "1.0".to_string() }
    }

    pub fn handle_command(&mut self, command: &str, host: &mut dyn PhysicsHost) -> Reply {
        let args: Vec<&str> = command.split(':').collect();
        match args.as_slice() {
            ["*IDN?"] => idn_reply(BoardKind::LedHat, &self.asset_tag, &self.software_version),
            ["*STATUS?"] => Reply::ack(),
            ["*RESET"] => {
                for led in &mut self.leds {
                    led.set_colour(0, host);
                }
                Reply::ack()
            }
            ["LED", rest @ ..] => self.handle_led(rest, host),
            _ => Reply::nack(format!("Unknown command {}", command.trim())),
        }
    }

    fn handle_led(&mut self, rest: &[&str], host: &mut dyn PhysicsHost) -> Reply {
        match rest.first() {
            None => Reply::nack("Missing LED number"),
            Some(&"START") => self.handle_start(&rest[1..], host),
            Some(number_str) => {
                let Ok(led_number) = number_str.parse::<usize>() else {
                    return Reply::nack("Invalid LED number");
                };
                if led_number >= self.leds.len() {
                    return Reply::nack("Invalid LED number");
                }
                match rest.get(1) {
                    None => Reply::nack("Missing LED command"),
                    Some(&"SET") => self.set_rgb(led_number, &rest[2..], host),
                    Some(&"GET?") => {
                        let (r, g, b) = RGB_COLOURS[self.leds[led_number].get_colour() as usize];
                        Reply::text(format!("{}:{}:{}", r as u8, g as u8, b as u8))
                    }
                    _ => Reply::nack("Unknown LED command"),
                }
            }
        }
    }

    fn set_rgb(&mut self, led_number: usize, rest: &[&str], host: &mut dyn PhysicsHost) -> Reply {
        if rest.len() < 3 {
            return Reply::nack("Missing LED colour");
        }
        let Ok(r) = rest[0].parse::<u8>() else { return Reply::nack("Invalid LED colour") };
        let Ok(g) = rest[1].parse::<u8>() else { return Reply::nack("Invalid LED colour") };
        let Ok(b) = rest[2].parse::<u8>() else { return Reply::nack("Invalid LED colour") };
        if r > 1 || g > 1 || b > 1 {
            return Reply::nack("Invalid LED colour");
        }
        let Some(colour) = colour_index((r == 1, g == 1, b == 1)) else {
            return Reply::nack("Invalid LED colour");
        };
        self.leds[led_number].set_colour(colour, host);
        Reply::ack()
    }

    fn handle_start(&mut self, rest: &[&str], host: &mut dyn PhysicsHost) -> Reply {
        match rest {
            [] => Reply::nack("Missing LED command"),
            ["SET"] => Reply::nack("Missing LED start"),
            ["SET", start_str] => {
                let Ok(start) = start_str.parse::<u8>() else { return Reply::nack("Invalid LED start") };
                if start > 1 {
                    return Reply::nack("Invalid LED start");
                }
                self.leds[LED_START].set_colour(start, host);
                Reply::ack()
            }
            ["GET?"] => Reply::text(self.leds[LED_START].get_colour().to_string()),
            _ => Reply::nack("Unknown start command"),
        }
    }
}
