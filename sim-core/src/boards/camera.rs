//! Camera board: `CAM:CALIBRATION?`/`CAM:RESOLUTION?`/`CAM:FRAME!`, the
//! latter a binary TLV reply (spec.md §4.3.1, §6). Grounded on
//! `original_source/.../boards/camera.py`.

use sim_types::{BoardKind, CAM_FRAME_TAG};

use crate::boards::{idn_reply, Reply};
use crate::devices::Camera;
use crate::physics_host::PhysicsHost;

pub struct CameraBoard {
    pub camera: Camera,
    pub asset_tag: String,
    pub software_version: String,
}

impl CameraBoard {
    pub fn new(camera: Camera, asset_tag: String) -> Self {
        Self { camera, asset_tag, software_version: "1.0".to_string() }
    }

    pub fn handle_command(&mut self, command: &str, host: &mut dyn PhysicsHost) -> Reply {
        let args: Vec<&str> = command.split(':').collect();
        match args.as_slice() {
            ["*IDN?"] => idn_reply(BoardKind::Camera, &self.asset_tag, &self.software_version),
            ["*STATUS?"] => Reply::ack(),
            ["*RESET"] => Reply::ack(),
            ["CAM", rest @ ..] => self.handle_cam(rest, host),
            _ => Reply::nack(format!("Unknown command {}", command.trim())),
        }
    }

    fn handle_cam(&mut self, rest: &[&str], host: &mut dyn PhysicsHost) -> Reply {
        match rest {
            [] => Reply::nack("Missing camera command"),
            ["CALIBRATION?"] => {
                let i = self.camera.intrinsics();
                Reply::text(format!("{}:{}:{}:{}", i.fx, i.fy, i.cx, i.cy))
            }
            ["RESOLUTION?"] => {
                let (w, h) = self.camera.resolution();
                Reply::text(format!("{}:{}", w, h))
            }
            ["FRAME!"] => {
                let image = self.camera.get_image(host);
                let mut frame = Vec::with_capacity(1 + 4 + image.len());
                frame.push(CAM_FRAME_TAG);
                frame.extend_from_slice(&(image.len() as u32).to_be_bytes());
                frame.extend_from_slice(&image);
                Reply::Binary(frame)
            }
            _ => Reply::nack("Unknown camera command"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics_host::MockPhysicsHost;

    #[test]
    fn frame_is_tlv_framed() {
        let mut b = CameraBoard::new(Camera::null(64, 48), "CAM".to_string());
        let mut host = MockPhysicsHost::new(32);
        let Reply::Binary(frame) = b.handle_command("CAM:FRAME!", &mut host) else { panic!() };
        assert_eq!(frame[0], 0x00);
        let len = u32::from_be_bytes(frame[1..5].try_into().unwrap());
        assert_eq!(len, 64 * 48 * 4);
        assert_eq!(frame.len() as u32, 5 + len);
    }

    #[test]
    fn resolution_matches_frame_length() {
        let mut b = CameraBoard::new(Camera::null(64, 48), "CAM".to_string());
        let mut host = MockPhysicsHost::new(32);
        assert_eq!(b.handle_command("CAM:RESOLUTION?", &mut host), Reply::text("64:48"));
    }
}
