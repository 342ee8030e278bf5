//! # sim-types
//!
//! Shared data types for the board simulator: the fixed RGB colour table,
//! GPIO pin modes, camera intrinsics, and the board identity codes used in
//! `*IDN?` replies. Kept dependency-free beyond `serde` so both `sim-core`
//! and the two binaries can share it without pulling in async runtimes.
//!
//! Coordinate/unit conventions:
//! - Motor power and servo position are raw integer firmware units
//!   (`[-1000, 1000]` and `[1000, 2000]` µs respectively).
//! - Camera images are BGRA, `width * height * 4` bytes, row-major.
//! - LED colour indices are 0-based into [`RGB_COLOURS`]; index 0 is OFF.

use serde::{Deserialize, Serialize};

/// The fixed, total 8-entry RGB colour table shared by the LED hat and the
/// status LEDs on the power board. Index 0 is OFF.
pub const RGB_COLOURS: [(bool, bool, bool); 8] = [
    (false, false, false), // OFF
    (true, false, false),  // RED
    (true, true, false),   // YELLOW
    (false, true, false),  // GREEN
    (false, true, true),   // CYAN
    (false, false, true),  // BLUE
    (true, false, true),   // MAGENTA
    (true, true, true),    // WHITE
];

/// Looks up the table index for an (r, g, b) triple. Every triple with
/// components in `{false, true}` maps to exactly one index.
pub fn colour_index(rgb: (bool, bool, bool)) -> Option<u8> {
    RGB_COLOURS.iter().position(|&c| c == rgb).map(|i| i as u8)
}

/// Board identity codes used in `*IDN?` replies:
/// `<manufacturer>:<boardcode>:<asset_tag>:<version>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardKind {
    Power,
    Motor,
    Servo,
    LedHat,
    Arduino,
    Camera,
    TimeServer,
}

impl BoardKind {
    pub fn manufacturer(self) -> &'static str {
        match self {
            BoardKind::Arduino | BoardKind::TimeServer => "SourceBots",
            _ => "Student Robotics",
        }
    }

    pub fn boardcode(self) -> &'static str {
        match self {
            BoardKind::Power => "PBv4B",
            BoardKind::Motor => "MBv4B",
            BoardKind::Servo => "SBv4B",
            BoardKind::LedHat => "KCHv1B",
            BoardKind::Camera => "CAMv1a",
            BoardKind::Arduino => "SRduino",
            BoardKind::TimeServer => "TimeServer",
        }
    }

    /// The noun used in `links_formatted()`, e.g.
    /// `socket://127.0.0.1:<port>/<board_class_name>/<asset_tag>`.
    pub fn class_name(self) -> &'static str {
        match self {
            BoardKind::Power => "PowerBoard",
            BoardKind::Motor => "MotorBoard",
            BoardKind::Servo => "ServoBoard",
            BoardKind::LedHat => "LedBoard",
            BoardKind::Camera => "CameraBoard",
            BoardKind::Arduino => "Arduino",
            BoardKind::TimeServer => "TimeServer",
        }
    }
}

/// GPIO pin mode, as tracked by the device layer underneath the Arduino
/// board's compact wire dialect (the wire never spells these out, but
/// `i`/`o`/`p` still mutate this).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GpioPinMode {
    #[default]
    Input,
    InputPullup,
    Output,
}

/// Camera intrinsics, derived from resolution and horizontal FOV:
/// `fx = fy = (w/2) / tan(fov/2)`, `cx = w/2`, `cy = h/2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
}

impl CameraIntrinsics {
    pub fn from_resolution(width: u32, height: u32, horizontal_fov_rad: f64) -> Self {
        let fx = (width as f64 / 2.0) / (horizontal_fov_rad / 2.0).tan();
        Self {
            fx,
            fy: fx,
            cx: (width / 2) as f64,
            cy: (height / 2) as f64,
        }
    }
}

/// Tag byte prefixing every `CAM:FRAME!` binary reply, followed by a
/// big-endian u32 length and then exactly that many raw bytes.
pub const CAM_FRAME_TAG: u8 = 0x00;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colour_table_is_bijective() {
        for b0 in [false, true] {
            for b1 in [false, true] {
                for b2 in [false, true] {
                    assert!(colour_index((b0, b1, b2)).is_some());
                }
            }
        }
    }

    #[test]
    fn intrinsics_midpoint() {
        let i = CameraIntrinsics::from_resolution(64, 48, std::f64::consts::FRAC_PI_2);
        assert_eq!(i.cx, 32.0);
        assert_eq!(i.cy, 24.0);
    }
}
