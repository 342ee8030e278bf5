//! CLI entry point for the competition supervisor. Grounded on
//! `original_source/.../competition_supervisor/competition_supervisor.py`'s
//! `run_match` driver and `scripts/run_comp_match.py`'s zone count, and on
//! the teacher's `clap::Parser` CLI idiom.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use clap::Parser;
use sim_core::config::MatchConfig;
use sim_core::physics_host::{DeviceHandle, DeviceKind, MockPhysicsHost, PhysicsHost, SimulationMode, StepResult};

#[derive(Parser, Debug)]
#[command(name = "match-supervisor", about = "Drives one timed competition match")]
struct Args {
    /// Arena root directory (contains mode.txt, match.json, zone_<i>/).
    #[arg(long, env = "ARENA_ROOT")]
    arena_root: PathBuf,

    /// Number of robot zones in the arena.
    #[arg(long, default_value_t = 4)]
    num_zones: usize,
}

/// Wraps the process's [`MockPhysicsHost`] so the log-line prefix can report
/// simulated time without the logging layer needing a reference into the
/// supervisor's run loop.
struct TimeTrackingHost {
    inner: MockPhysicsHost,
    now_bits: Arc<AtomicU64>,
}

impl TimeTrackingHost {
    fn new(basic_step_ms: i32, now_bits: Arc<AtomicU64>) -> Self {
        Self { inner: MockPhysicsHost::new(basic_step_ms), now_bits }
    }
}

impl PhysicsHost for TimeTrackingHost {
    fn now(&self) -> f64 {
        self.inner.now()
    }
    fn basic_step_ms(&self) -> i32 {
        self.inner.basic_step_ms()
    }
    fn step(&mut self, ms: i32) -> StepResult {
        let result = self.inner.step(ms);
        self.now_bits.store(self.inner.now().to_bits(), Ordering::Relaxed);
        result
    }
    fn get_device(&self, name: &str, kind: DeviceKind) -> Option<DeviceHandle> {
        self.inner.get_device(name, kind)
    }
    fn custom_data_get(&self, node_def: &str) -> Option<String> {
        self.inner.custom_data_get(node_def)
    }
    fn custom_data_set(&mut self, node_def: &str, value: &str) {
        self.inner.custom_data_set(node_def, value);
    }
    fn node_field_get_sf_float(&self, node_def: &str, field: &str) -> Option<f64> {
        self.inner.node_field_get_sf_float(node_def, field)
    }
    fn node_field_set_sf_float(&mut self, node_def: &str, field: &str, value: f64) {
        self.inner.node_field_set_sf_float(node_def, field, value);
    }
    fn node_field_get_sf_color(&self, node_def: &str, field: &str) -> Option<(f64, f64, f64)> {
        self.inner.node_field_get_sf_color(node_def, field)
    }
    fn node_field_set_sf_color(&mut self, node_def: &str, field: &str, value: (f64, f64, f64)) {
        self.inner.node_field_set_sf_color(node_def, field, value);
    }
    fn node_remove(&mut self, node_def: &str) {
        self.inner.node_remove(node_def);
    }
    fn device_set_value(&mut self, handle: DeviceHandle, value: f64) {
        self.inner.device_set_value(handle, value);
    }
    fn device_get_value(&self, handle: DeviceHandle) -> f64 {
        self.inner.device_get_value(handle)
    }
    fn device_set_enabled(&mut self, handle: DeviceHandle, enabled: bool) {
        self.inner.device_set_enabled(handle, enabled);
    }
    fn device_capture_image(&mut self, handle: DeviceHandle) -> Vec<u8> {
        self.inner.device_capture_image(handle)
    }
    fn set_simulation_mode(&mut self, mode: SimulationMode) {
        self.inner.set_simulation_mode(mode);
    }
    fn start_animation_recording(&mut self, path: &std::path::Path) {
        self.inner.start_animation_recording(path);
    }
    fn stop_animation_recording(&mut self) {
        self.inner.stop_animation_recording();
    }
    fn start_video_recording(&mut self, path: &std::path::Path, resolution: (u32, u32)) {
        self.inner.start_video_recording(path, resolution);
    }
    fn stop_video_recording(&mut self) {
        self.inner.stop_video_recording();
    }
    fn export_image(&mut self, path: &std::path::Path) {
        self.inner.export_image(path);
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = MatchConfig::read(&args.arena_root)?;

    let now_bits = Arc::new(AtomicU64::new(0f64.to_bits()));
    let prefix_bits = now_bits.clone();
    let log_path = args.arena_root.join(format!("supervisor-log-{}.txt", config.match_identifier()));
    sim_core::logging::init_teed(&log_path, move || {
        format!("[{:.3}] ", f64::from_bits(prefix_bits.load(Ordering::Relaxed)))
    })?;

    tracing::info!(match_number = config.match_number, zones = args.num_zones, "starting match");
    let mut host = TimeTrackingHost::new(32, now_bits);
    sim_core::supervisor::run_match(&mut host, &args.arena_root, args.num_zones, &config)?;

    Ok(())
}
