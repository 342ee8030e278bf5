//! Competition supervisor: the prestart/ready/start handshake plus the timed
//! match itself, including recording and the arena lighting timeline.
//! Grounded on
//! `original_source/.../competition_supervisor/competition_supervisor.py`'s
//! `run_match`.

pub mod lighting;
pub mod robots;

use std::path::{Path, PathBuf};

use crate::config::MatchConfig;
use crate::error::SimError;
use crate::physics_host::{PhysicsHost, SimulationMode, StepResult};

pub use lighting::LightingControl;
pub use robots::Robots;

const READY_TIMEOUT_S: f64 = 5.0;
const AMBIENT_NODE_DEF: &str = "AMBIENT";

pub struct MatchPaths {
    pub animation: PathBuf,
    pub video: PathBuf,
    pub image: PathBuf,
}

impl MatchPaths {
    pub fn for_match(arena_root: &Path, config: &MatchConfig) -> Self {
        let stem = arena_root.join("recordings").join(config.match_identifier());
        Self {
            animation: stem.with_extension("html"),
            video: stem.with_extension("mp4"),
            image: stem.with_extension("jpg"),
        }
    }
}

/// Runs one full timed match: handshake, recording, lighting, teardown.
/// `num_zones` and `arena_root` drive robot discovery and occupancy; the
/// rest of the timing comes from `config`.
pub fn run_match(
    host: &mut dyn PhysicsHost,
    arena_root: &Path,
    num_zones: usize,
    config: &MatchConfig,
) -> Result<(), SimError> {
    let paths = MatchPaths::for_match(arena_root, config);

    let mut robots = Robots::discover(host, num_zones);
    robots.remove_unoccupied_robots(host, arena_root);
    robots.preset_robots(host);
    robots.wait_for_ready(host, READY_TIMEOUT_S)?;

    let basic_step_ms = host.basic_step_ms();
    let match_timesteps = (config.duration * 1000.0 / basic_step_ms as f64) as i64;
    let mut lighting = LightingControl::new(host, match_timesteps, basic_step_ms, AMBIENT_NODE_DEF)?;

    host.start_animation_recording(&paths.animation);
    // Animations don't capture lighting changes; step once so the recorder
    // picks up the starting frame before the lighting engine begins moving.
    host.step(basic_step_ms);

    if config.recording_config.enabled {
        let resolution = (config.recording_config.resolution[0], config.recording_config.resolution[1]);
        host.start_video_recording(&paths.video, resolution);
    }

    tracing::info!("match start");
    robots.start_robots(host);
    host.set_simulation_mode(SimulationMode::Fast);

    for timestep in 0..match_timesteps {
        if host.step(basic_step_ms) == StepResult::Terminated {
            tracing::error!("physics host terminated mid-match");
            return Err(SimError::PhysicsTerminated);
        }
        lighting.service_lighting(timestep + 1, host);
    }

    tracing::info!("game over, pausing");
    host.set_simulation_mode(SimulationMode::Pause);

    if config.recording_config.enabled {
        host.stop_video_recording();
    }

    // Drain any remaining lighting steps onto the final frame before the
    // still image is captured.
    lighting.service_lighting(match_timesteps, host);
    host.step(0);
    host.export_image(&paths.image);
    host.stop_animation_recording();

    Ok(())
}
