//! Board protocol engines: pure `(command line) -> Reply` state machines,
//! one per simulated board. See spec.md §4.3/§6 for the full wire surface.

pub mod arduino;
pub mod camera;
pub mod led;
pub mod motor;
pub mod power;
pub mod servo;
pub mod time_server;

pub use arduino::Arduino;
pub use camera::CameraBoard;
pub use led::LedBoard;
pub use motor::MotorBoard;
pub use power::PowerBoard;
pub use servo::ServoBoard;
pub use time_server::TimeServer;

/// A board's response to one dispatched command. `Empty` means no bytes at
/// all are written back (only the Arduino compact dialect produces these,
/// spec.md §4.3.2); `Text` gets an LF appended by the Device Server, never
/// by the board itself; `Binary` is written verbatim with no terminator.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    Binary(Vec<u8>),
    Empty,
}

impl Reply {
    pub fn ack() -> Self {
        Reply::Text("ACK".to_string())
    }

    pub fn nack(reason: impl Into<String>) -> Self {
        Reply::Text(format!("NACK:{}", reason.into()))
    }

    pub fn text(s: impl Into<String>) -> Self {
        Reply::Text(s.into())
    }
}

/// Shared `*IDN?` formatting: `<manufacturer>:<boardcode>:<asset_tag>:<version>`.
pub(crate) fn idn_reply(kind: sim_types::BoardKind, asset_tag: &str, version: &str) -> Reply {
    Reply::text(format!(
        "{}:{}:{}:{}",
        kind.manufacturer(),
        kind.boardcode(),
        asset_tag,
        version
    ))
}
