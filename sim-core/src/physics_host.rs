//! The narrow adapter to the external simulation engine. Every other module
//! in this crate depends only on [`PhysicsHost`]; nothing else talks to the
//! simulator process directly.
//!
//! The handle is shared process-wide between the user-code thread and the
//! board-server thread (see `supervisor`/`socket_server`); callers guard
//! concurrent access with a single [`tokio::sync::Mutex`] wrapping a
//! `dyn PhysicsHost`, never a global.

use std::cell::RefCell;
use std::collections::HashMap;

/// Outcome of a `step(ms)` call: whether the simulator is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    Continued,
    Terminated,
}

/// An opaque reference to a device inside the physics engine, as returned by
/// [`PhysicsHost::get_device`]. Device-kind-specific glue lives in
/// [`crate::devices`]; this facade only deals in name + kind lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    Motor,
    Servo,
    Led,
    DistanceSensor,
    TouchSensor,
    Camera,
}

/// Simulation run mode, as set by the competition supervisor around a match
/// (`SIMULATION_MODE_FAST` while the match runs, `SIMULATION_MODE_PAUSE`
/// once it ends).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationMode {
    Run,
    Fast,
    Pause,
}

pub trait PhysicsHost: Send {
    /// Current simulated time, in seconds.
    fn now(&self) -> f64;

    /// The simulator's native tick length, in milliseconds.
    fn basic_step_ms(&self) -> i32;

    /// Advance simulated time by `ms` milliseconds.
    fn step(&mut self, ms: i32) -> StepResult;

    /// Resolve a named device of the given kind. Returns `None` if no such
    /// device is wired in the current world (callers fall back to a Null
    /// device variant in that case).
    fn get_device(&self, name: &str, kind: DeviceKind) -> Option<DeviceHandle>;

    fn custom_data_get(&self, node_def: &str) -> Option<String>;
    fn custom_data_set(&mut self, node_def: &str, value: &str);

    fn node_field_get_sf_float(&self, node_def: &str, field: &str) -> Option<f64>;
    fn node_field_set_sf_float(&mut self, node_def: &str, field: &str, value: f64);

    fn node_field_get_sf_color(&self, node_def: &str, field: &str) -> Option<(f64, f64, f64)>;
    fn node_field_set_sf_color(&mut self, node_def: &str, field: &str, value: (f64, f64, f64));

    fn node_remove(&mut self, node_def: &str);

    /// Drive a device handle's single native value (motor velocity, servo
    /// position, LED colour index, output on/off as 0.0/1.0). This is the
    /// minimum surface a `DeviceHandle` needs beyond the node-field
    /// accessors above; the engine-specific unit mapping happens in
    /// `crate::devices`, not here.
    fn device_set_value(&mut self, handle: DeviceHandle, value: f64);

    /// Read back a device handle's single native value (sensor reading,
    /// current draw, or an echoed setpoint).
    fn device_get_value(&self, handle: DeviceHandle) -> f64;

    /// Enable or disable a sensor/camera device ahead of a read (mirrors
    /// `DistanceSensor.enable`/`Camera`'s implicit always-on capture).
    fn device_set_enabled(&mut self, handle: DeviceHandle, enabled: bool);

    /// Capture one camera frame as raw BGRA bytes (`width * height * 4`).
    fn device_capture_image(&mut self, handle: DeviceHandle) -> Vec<u8>;

    /// Switch the simulator's stepping rate, used by the supervisor to run
    /// the match itself at fast-forward and everything else at normal speed.
    fn set_simulation_mode(&mut self, mode: SimulationMode);

    fn start_animation_recording(&mut self, path: &std::path::Path);
    fn stop_animation_recording(&mut self);

    fn start_video_recording(&mut self, path: &std::path::Path, resolution: (u32, u32));
    fn stop_video_recording(&mut self);

    /// Capture a still image of the arena to `path` (the post-match photo).
    fn export_image(&mut self, path: &std::path::Path);
}

/// In-process, deterministic [`PhysicsHost`] used by this crate's own tests
/// and by any harness that wants to drive the binaries without a live
/// simulator. Fields default to the same values the original simulator's
/// Null devices carry (see `sim-core::devices`).
pub struct MockPhysicsHost {
    now_s: f64,
    basic_step_ms: i32,
    terminated: bool,
    custom_data: HashMap<String, String>,
    sf_float: HashMap<(String, String), f64>,
    sf_color: HashMap<(String, String), (f64, f64, f64)>,
    removed: Vec<String>,
    handles: RefCell<HashMap<(String, DeviceKind), u64>>,
    next_handle: RefCell<u64>,
    device_values: HashMap<u64, f64>,
    device_enabled: HashMap<u64, bool>,
    simulation_mode: SimulationMode,
    animation_recording: Option<std::path::PathBuf>,
    video_recording: Option<(std::path::PathBuf, (u32, u32))>,
    exported_images: Vec<std::path::PathBuf>,
}

impl MockPhysicsHost {
    pub fn new(basic_step_ms: i32) -> Self {
        Self {
            now_s: 0.0,
            basic_step_ms,
            terminated: false,
            custom_data: HashMap::new(),
            sf_float: HashMap::new(),
            sf_color: HashMap::new(),
            removed: Vec::new(),
            handles: RefCell::new(HashMap::new()),
            next_handle: RefCell::new(1),
            device_values: HashMap::new(),
            device_enabled: HashMap::new(),
            simulation_mode: SimulationMode::Run,
            animation_recording: None,
            video_recording: None,
            exported_images: Vec::new(),
        }
    }

    pub fn set_terminated(&mut self, terminated: bool) {
        self.terminated = terminated;
    }

    pub fn removed_nodes(&self) -> &[String] {
        &self.removed
    }

    pub fn simulation_mode(&self) -> SimulationMode {
        self.simulation_mode
    }

    pub fn animation_recording(&self) -> Option<&std::path::Path> {
        self.animation_recording.as_deref()
    }

    pub fn video_recording(&self) -> Option<&(std::path::PathBuf, (u32, u32))> {
        self.video_recording.as_ref()
    }

    pub fn exported_images(&self) -> &[std::path::PathBuf] {
        &self.exported_images
    }
}

impl PhysicsHost for MockPhysicsHost {
    fn now(&self) -> f64 {
        self.now_s
    }

    fn basic_step_ms(&self) -> i32 {
        self.basic_step_ms
    }

    fn step(&mut self, ms: i32) -> StepResult {
        self.now_s += ms as f64 / 1000.0;
        if self.terminated {
            StepResult::Terminated
        } else {
            StepResult::Continued
        }
    }

    fn get_device(&self, name: &str, kind: DeviceKind) -> Option<DeviceHandle> {
        let key = (name.to_string(), kind);
        let mut handles = self.handles.borrow_mut();
        if let Some(&id) = handles.get(&key) {
            return Some(DeviceHandle(id));
        }
        let mut next = self.next_handle.borrow_mut();
        let id = *next;
        *next += 1;
        handles.insert(key, id);
        Some(DeviceHandle(id))
    }

    fn custom_data_get(&self, node_def: &str) -> Option<String> {
        self.custom_data.get(node_def).cloned()
    }

    fn custom_data_set(&mut self, node_def: &str, value: &str) {
        self.custom_data.insert(node_def.to_string(), value.to_string());
    }

    fn node_field_get_sf_float(&self, node_def: &str, field: &str) -> Option<f64> {
        self.sf_float.get(&(node_def.to_string(), field.to_string())).copied()
    }

    fn node_field_set_sf_float(&mut self, node_def: &str, field: &str, value: f64) {
        self.sf_float.insert((node_def.to_string(), field.to_string()), value);
    }

    fn node_field_get_sf_color(&self, node_def: &str, field: &str) -> Option<(f64, f64, f64)> {
        self.sf_color.get(&(node_def.to_string(), field.to_string())).copied()
    }

    fn node_field_set_sf_color(&mut self, node_def: &str, field: &str, value: (f64, f64, f64)) {
        self.sf_color.insert((node_def.to_string(), field.to_string()), value);
    }

    fn node_remove(&mut self, node_def: &str) {
        self.removed.push(node_def.to_string());
    }

    fn device_set_value(&mut self, handle: DeviceHandle, value: f64) {
        self.device_values.insert(handle.0, value);
    }

    fn device_get_value(&self, handle: DeviceHandle) -> f64 {
        self.device_values.get(&handle.0).copied().unwrap_or(0.0)
    }

    fn device_set_enabled(&mut self, handle: DeviceHandle, enabled: bool) {
        self.device_enabled.insert(handle.0, enabled);
    }

    fn device_capture_image(&mut self, _handle: DeviceHandle) -> Vec<u8> {
        Vec::new()
    }

    fn set_simulation_mode(&mut self, mode: SimulationMode) {
        self.simulation_mode = mode;
    }

    fn start_animation_recording(&mut self, path: &std::path::Path) {
        self.animation_recording = Some(path.to_path_buf());
    }

    fn stop_animation_recording(&mut self) {
        self.animation_recording = None;
    }

    fn start_video_recording(&mut self, path: &std::path::Path, resolution: (u32, u32)) {
        self.video_recording = Some((path.to_path_buf(), resolution));
    }

    fn stop_video_recording(&mut self) {
        self.video_recording = None;
    }

    fn export_image(&mut self, path: &std::path::Path) {
        self.exported_images.push(path.to_path_buf());
    }
}

/// Shared handle type used by the socket server and the supervisor: a single
/// process-wide facade guarded by an async mutex, matching the teacher's
/// `Arc<RwLock<...>>` shared-state idiom.
pub type SharedPhysicsHost = std::sync::Arc<tokio::sync::Mutex<dyn PhysicsHost>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_advances_time() {
        let mut host = MockPhysicsHost::new(32);
        assert_eq!(host.now(), 0.0);
        host.step(32);
        assert!((host.now() - 0.032).abs() < 1e-9);
    }

    #[test]
    fn custom_data_roundtrip() {
        let mut host = MockPhysicsHost::new(32);
        assert_eq!(host.custom_data_get("ROBOT0"), None);
        host.custom_data_set("ROBOT0", "prestart");
        assert_eq!(host.custom_data_get("ROBOT0").as_deref(), Some("prestart"));
    }

    #[test]
    fn terminated_step_result() {
        let mut host = MockPhysicsHost::new(32);
        host.set_terminated(true);
        assert_eq!(host.step(32), StepResult::Terminated);
    }
}
