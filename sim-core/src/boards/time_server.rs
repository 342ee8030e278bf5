//! Time server: `TIME?` returns wall-clock time derived from simulated time,
//! `SLEEP:<ms>` advances the simulator. Grounded on
//! `original_source/.../boards/time_server.py`.

use chrono::{DateTime, Duration, Utc};
use sim_types::BoardKind;

use crate::boards::{idn_reply, Reply};
use crate::physics_host::PhysicsHost;

pub struct TimeServer {
    pub start_time: DateTime<Utc>,
    pub asset_tag: String,
    pub software_version: String,
}

impl TimeServer {
    pub fn new(asset_tag: String) -> Self {
        Self {
            start_time: DateTime::parse_from_rfc3339("2024-06-01T00:00:00+00:00")
                .expect("valid default start time")
                .with_timezone(&Utc),
            asset_tag,
            software_version: "1.0".to_string(),
        }
    }

    pub fn handle_command(&mut self, command: &str, host: &mut dyn PhysicsHost) -> Reply {
        let args: Vec<&str> = command.split(':').collect();
        match args.as_slice() {
            // The original returns an Arduino-manufacturer IDN for the time
            // server too; that's a copy-paste bug (§9 Open Questions), fixed here.
            ["*IDN?"] => idn_reply(BoardKind::TimeServer, &self.asset_tag, &self.software_version),
            ["*STATUS?"] => Reply::text("Yes"),
            ["*RESET"] => Reply::nack("Reset not supported"),
            ["TIME?"] => {
                // `isoformat(timespec='milliseconds')` in the original drops
                // the UTC offset suffix here (unlike a full RFC3339 stamp).
                let current = self.start_time + Duration::milliseconds((host.now() * 1000.0).round() as i64);
                Reply::text(current.format("%Y-%m-%dT%H:%M:%S%.3f").to_string())
            }
            ["SLEEP"] => Reply::nack("Missing duration"),
            ["SLEEP", duration_str] => {
                let Ok(duration_ms) = duration_str.parse::<i32>() else {
                    return Reply::nack("Invalid duration");
                };
                host.step(duration_ms);
                Reply::ack()
            }
            _ => Reply::nack(format!("Unknown command {}", command.trim())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics_host::MockPhysicsHost;

    #[test]
    fn s4_sleep_advances_reported_time() {
        let mut ts = TimeServer::new("TIME".to_string());
        let mut host = MockPhysicsHost::new(32);
        assert_eq!(
            ts.handle_command("TIME?", &mut host),
            Reply::text("2024-06-01T00:00:00.000")
        );
        assert_eq!(ts.handle_command("SLEEP:2500", &mut host), Reply::ack());
        assert_eq!(
            ts.handle_command("TIME?", &mut host),
            Reply::text("2024-06-01T00:00:02.500")
        );
    }

    #[test]
    fn idn_uses_corrected_manufacturer() {
        let mut ts = TimeServer::new("TIME".to_string());
        let mut host = MockPhysicsHost::new(32);
        assert_eq!(
            ts.handle_command("*IDN?", &mut host),
            Reply::text("SourceBots:TimeServer:TIME:1.0")
        );
    }

    #[test]
    fn invalid_sleep_duration_is_nacked() {
        let mut ts = TimeServer::new("TIME".to_string());
        let mut host = MockPhysicsHost::new(32);
        assert_eq!(
            ts.handle_command("SLEEP:abc", &mut host),
            Reply::nack("Invalid duration")
        );
    }
}
