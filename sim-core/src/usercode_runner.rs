//! Per-zone usercode runner: resolves the robot file, starts this zone's
//! Device Server on a background thread, publishes the connection-info env
//! vars, and executes the opaque `robot.py` as a subprocess. Grounded on
//! `original_source/.../controllers/usercode_runner/usercode_runner.py`.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::{zone_robot_path, GameMode};
use crate::device_server::Board;
use crate::error::SimError;
use crate::physics_host::SharedPhysicsHost;
use crate::socket_server::SocketServer;

pub struct UsercodeRun {
    pub zone: usize,
    pub arena_root: PathBuf,
    pub game_mode: GameMode,
}

/// Whether the caller should treat a missing robot file as fatal: it's
/// only an error in competition mode (dev mode just skips the zone).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Ran,
    NoRobotCode,
}

impl UsercodeRun {
    pub fn robot_path(&self) -> PathBuf {
        zone_robot_path(&self.arena_root, self.zone)
    }

    /// Runs this zone's usercode against an already-built board set: spawns
    /// the socket server on its own OS thread with a dedicated
    /// single-threaded Tokio runtime (mirroring the original's dedicated
    /// device-server thread), publishes `SBOT_METADATA_PATH` /
    /// `WEBOTS_SIMULATOR` / `WEBOTS_ROBOT`, then runs `robot.py` as a
    /// subprocess and waits for it to exit before tearing the server down.
    pub fn run(&self, boards: Vec<Board>, host: SharedPhysicsHost) -> Result<RunOutcome, SimError> {
        let robot_path = self.robot_path();
        if !robot_path.exists() {
            tracing::warn!(zone = self.zone, path = %robot_path.display(), "no robot code to run");
            return Ok(RunOutcome::NoRobotCode);
        }

        let metadata_dir = std::env::temp_dir().join(format!("sbot-metadata-zone-{}", self.zone));
        std::fs::create_dir_all(&metadata_dir)
            .map_err(|_| SimError::MissingRobotFile { zone: self.zone, path: metadata_dir.clone() })?;
        let metadata_path = metadata_dir.join("metadata.json");
        std::fs::write(
            &metadata_path,
            serde_json::json!({
                "zone": self.zone,
                "is_competition": self.game_mode == GameMode::Comp,
            })
            .to_string(),
        )
        .map_err(|_| SimError::MissingRobotFile { zone: self.zone, path: metadata_path.clone() })?;

        let server = SocketServer::new(boards);
        let links = server.links_formatted("127.0.0.1");

        let stop = Arc::new(AtomicBool::new(false));
        let terminated = Arc::new(AtomicBool::new(false));
        let server_stop = stop.clone();
        let server_terminated = terminated.clone();
        let server_host = host.clone();
        let server_thread = std::thread::Builder::new()
            .name(format!("device-server-zone-{}", self.zone))
            .spawn(move || {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("failed to build device server runtime");
                runtime.block_on(server.run(server_host, server_stop, server_terminated));
            })
            .expect("failed to spawn device server thread");

        tracing::info!(zone = self.zone, links = %links, "starting usercode");
        let status = Command::new(&robot_path)
            .current_dir(robot_path.parent().unwrap_or(Path::new(".")))
            .env("SBOT_METADATA_PATH", &metadata_dir)
            .env("WEBOTS_SIMULATOR", "1")
            .env("WEBOTS_ROBOT", &links)
            .status();

        stop.store(true, Ordering::Relaxed);
        let _ = server_thread.join();
        let _ = std::fs::remove_dir_all(&metadata_dir);

        if let Err(e) = status {
            tracing::error!(zone = self.zone, error = %e, "failed to execute robot code");
        }

        if terminated.load(Ordering::Relaxed) {
            tracing::error!(zone = self.zone, "physics host terminated while usercode was running");
            return Err(SimError::PhysicsTerminated);
        }

        Ok(RunOutcome::Ran)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_robot_file_is_not_fatal() {
        let run = UsercodeRun {
            zone: 3,
            arena_root: std::env::temp_dir().join("sim-core-usercode-test-empty"),
            game_mode: GameMode::Dev,
        };
        let host: SharedPhysicsHost = Arc::new(tokio::sync::Mutex::new(crate::physics_host::MockPhysicsHost::new(32)));
        assert_eq!(run.run(Vec::new(), host).unwrap(), RunOutcome::NoRobotCode);
    }
}
