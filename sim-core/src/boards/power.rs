//! Power board: outputs, start button, RUN/ERR status LEDs, buzzer.
//! Grounded line-for-line on
//! `original_source/.../boards/power_board.py` (firmware v4.4.2sb).

use sim_types::BoardKind;

use crate::boards::{idn_reply, Reply};
use crate::devices::{Button, Buzzer, Led, Output};
use crate::physics_host::PhysicsHost;

pub const NUM_OUTPUTS: usize = 7; // 6x 12V outputs + 1x 5V brain output
const SYS_OUTPUT: usize = 6;
const RUN_LED: usize = 0;
const ERR_LED: usize = 1;

pub struct PowerBoard {
    pub outputs: Vec<Output>,
    pub buzzer: Buzzer,
    pub button: Button,
    pub leds: [Led; 2],
    pub asset_tag: String,
    pub software_version: String,
}

impl PowerBoard {
    pub fn new(outputs: Vec<Output>, buzzer: Buzzer, button: Button, leds: [Led; 2], asset_tag: String) -> Self {
        Self { outputs, buzzer, button, leds, asset_tag, software_version: "4.4.2".to_string() }
    }

    pub fn handle_command(&mut self, command: &str, host: &mut dyn PhysicsHost) -> Reply {
        let args: Vec<&str> = command.split(':').collect();
        match args.as_slice() {
            ["*IDN?"] => idn_reply(BoardKind::Power, &self.asset_tag, &self.software_version),
            ["*STATUS?"] => Reply::text("0,0,0,0,0,0,0:25:0:5000"),
            ["*RESET"] => {
                for output in &mut self.outputs {
                    output.set_output(false);
                }
                self.buzzer.set_note(0, 0);
                self.leds[RUN_LED].set_colour(0, host);
                self.leds[ERR_LED].set_colour(0, host);
                Reply::ack()
            }
            ["BTN", rest @ ..] => self.handle_btn(rest, host),
            ["OUT", rest @ ..] => self.handle_out(rest, host),
            ["BATT", rest @ ..] => self.handle_batt(rest, host),
            ["LED", rest @ ..] => self.handle_led(rest, host),
            ["NOTE", rest @ ..] => self.handle_note(rest),
            _ => Reply::nack(format!("Unknown command {}", command.trim())),
        }
    }

    fn handle_btn(&self, rest: &[&str], host: &mut dyn PhysicsHost) -> Reply {
        match rest {
            [] => Reply::nack("Missing button command"),
            ["START:GET?"] => Reply::text(format!("{}:0", self.button.get_state(host) as u8)),
            _ => Reply::nack("Missing button command"),
        }
    }

    fn handle_out(&mut self, rest: &[&str], host: &mut dyn PhysicsHost) -> Reply {
        let Some(number_str) = rest.first() else {
            return Reply::nack("Missing output number");
        };
        let Ok(output_number) = number_str.parse::<usize>() else {
            return Reply::nack("Invalid output number");
        };
        if output_number >= NUM_OUTPUTS {
            return Reply::nack("Invalid output number");
        }
        match rest.get(1) {
            None => Reply::nack("Missing output command"),
            Some(&"SET") => {
                if output_number == SYS_OUTPUT {
                    return Reply::nack("Brain output cannot be controlled");
                }
                let Some(state_str) = rest.get(2) else {
                    return Reply::nack("Missing output state");
                };
                let Ok(state) = state_str.parse::<u8>() else {
                    return Reply::nack("Invalid output state");
                };
                if state > 1 {
                    return Reply::nack("Invalid output state");
                }
                self.outputs[output_number].set_output(state == 1);
                Reply::ack()
            }
            Some(&"GET?") => {
                Reply::text(if self.outputs[output_number].get_output() { "1" } else { "0" })
            }
            Some(&"I?") => {
                Reply::text(self.outputs[output_number].get_current(host).to_string())
            }
            _ => Reply::nack("Unknown output command"),
        }
    }

    fn handle_batt(&self, rest: &[&str], host: &mut dyn PhysicsHost) -> Reply {
        match rest {
            ["V?"] => Reply::text("12000"),
            ["I?"] => Reply::text(self.current(host).to_string()),
            _ => Reply::nack("Missing battery command"),
        }
    }

    fn handle_led(&mut self, rest: &[&str], host: &mut dyn PhysicsHost) -> Reply {
        let Some(&which) = rest.first() else {
            return Reply::nack("Missing LED command");
        };
        let led_index = match which {
            "RUN" => RUN_LED,
            "ERR" => ERR_LED,
            _ => return Reply::nack("Invalid LED type"),
        };
        match rest.get(1) {
            Some(&"SET") => match rest.get(2) {
                Some(&"0") => {
                    self.leds[led_index].set_colour(0, host);
                    Reply::ack()
                }
                Some(&"1") | Some(&"F") => {
                    self.leds[led_index].set_colour(1, host);
                    Reply::ack()
                }
                Some(_) => Reply::nack("Invalid LED state"),
                None => Reply::nack("Missing LED state"),
            },
            Some(&"GET?") => Reply::text(self.leds[led_index].get_colour().to_string()),
            _ => Reply::nack("Invalid LED command"),
        }
    }

    fn handle_note(&mut self, rest: &[&str]) -> Reply {
        match rest {
            [] => Reply::nack("Missing note command"),
            ["GET?"] => {
                let (freq, dur) = self.buzzer.get_note();
                Reply::text(format!("{}:{}", freq, dur))
            }
            [freq_str, dur_str] => {
                let Ok(freq) = freq_str.parse::<i32>() else {
                    return Reply::nack("Invalid note frequency");
                };
                if !(0..10000).contains(&freq) {
                    return Reply::nack("Invalid note frequency");
                }
                let Ok(dur) = dur_str.parse::<i64>() else {
                    return Reply::nack("Invalid note duration");
                };
                if dur < 0 {
                    return Reply::nack("Invalid note duration");
                }
                self.buzzer.set_note(freq as u16, dur as u32);
                Reply::ack()
            }
            [_] => Reply::nack("Missing note frequency"),
            _ => Reply::nack("Unknown note command"),
        }
    }

    fn current(&self, host: &dyn PhysicsHost) -> i32 {
        self.outputs.iter().map(|o| o.get_current(host)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics_host::MockPhysicsHost;

    fn board() -> PowerBoard {
        PowerBoard::new(
            (0..NUM_OUTPUTS).map(|_| Output::new(None)).collect(),
            Buzzer::default(),
            Button::Null,
            [Led::null(), Led::null()],
            "PB1".to_string(),
        )
    }

    #[test]
    fn idn_matches_format() {
        let mut b = board();
        let mut host = MockPhysicsHost::new(32);
        let Reply::Text(idn) = b.handle_command("*IDN?", &mut host) else { panic!() };
        assert_eq!(idn, "Student Robotics:PBv4B:PB1:4.4.2");
    }

    #[test]
    fn brain_output_rejected() {
        let mut b = board();
        let mut host = MockPhysicsHost::new(32);
        assert_eq!(
            b.handle_command("OUT:6:SET:1", &mut host),
            Reply::nack("Brain output cannot be controlled")
        );
    }

    #[test]
    fn invalid_output_number() {
        let mut b = board();
        let mut host = MockPhysicsHost::new(32);
        assert_eq!(
            b.handle_command("OUT:7:SET:1", &mut host),
            Reply::nack("Invalid output number")
        );
    }

    #[test]
    fn invalid_note_frequency() {
        let mut b = board();
        let mut host = MockPhysicsHost::new(32);
        assert_eq!(
            b.handle_command("NOTE:20000:100", &mut host),
            Reply::nack("Invalid note frequency")
        );
    }

    #[test]
    fn reset_clears_outputs_and_leds() {
        let mut b = board();
        let mut host = MockPhysicsHost::new(32);
        b.handle_command("OUT:0:SET:1", &mut host);
        b.handle_command("LED:RUN:SET:1", &mut host);
        b.handle_command("*RESET", &mut host);
        assert_eq!(b.handle_command("OUT:0:GET?", &mut host), Reply::text("0"));
        assert_eq!(b.handle_command("LED:RUN:GET?", &mut host), Reply::text("0"));
        assert_eq!(b.handle_command("NOTE:GET?", &mut host), Reply::text("0:0"));
    }
}
