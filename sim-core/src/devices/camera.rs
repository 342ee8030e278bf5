//! Camera device: acquires one BGRA frame per `CAM:FRAME!`, advancing
//! simulated time by a whole number of basic steps to let the sample settle
//! (spec.md §4.2). Grounded on
//! `original_source/.../devices/camera.py`'s `BaseCamera`/`NullCamera`.

use sim_types::CameraIntrinsics;

use crate::physics_host::{DeviceHandle, PhysicsHost};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Camera {
    Null { width: u32, height: u32 },
    Real {
        handle: DeviceHandle,
        width: u32,
        height: u32,
        horizontal_fov_rad: f64,
        frame_rate: f64,
    },
}

impl Camera {
    pub fn null(width: u32, height: u32) -> Self {
        Camera::Null { width, height }
    }

    pub fn real(
        handle: DeviceHandle,
        width: u32,
        height: u32,
        horizontal_fov_rad: f64,
        frame_rate: f64,
    ) -> Self {
        Camera::Real { handle, width, height, horizontal_fov_rad, frame_rate }
    }

    pub fn resolution(&self) -> (u32, u32) {
        match *self {
            Camera::Null { width, height } => (width, height),
            Camera::Real { width, height, .. } => (width, height),
        }
    }

    pub fn intrinsics(&self) -> CameraIntrinsics {
        match *self {
            Camera::Null { width, height } => {
                CameraIntrinsics::from_resolution(width, height, std::f64::consts::FRAC_PI_2)
            }
            Camera::Real { width, height, horizontal_fov_rad, .. } => {
                CameraIntrinsics::from_resolution(width, height, horizontal_fov_rad)
            }
        }
    }

    /// Acquire one frame: compute the sample period, enable the sensor,
    /// advance time, read the buffer, disable the sensor.
    pub fn get_image(&self, host: &mut dyn PhysicsHost) -> Vec<u8> {
        match *self {
            Camera::Null { width, height } => vec![0u8; (width * height * 4) as usize],
            Camera::Real { handle, frame_rate, .. } => {
                let basic_step_ms = host.basic_step_ms();
                let sample_period_ms =
                    ((1000.0 / frame_rate) / basic_step_ms as f64).floor() as i32 * basic_step_ms;
                host.device_set_enabled(handle, true);
                host.step(sample_period_ms.max(basic_step_ms));
                let image = host.device_capture_image(handle);
                host.device_set_enabled(handle, false);
                image
            }
        }
    }
}
