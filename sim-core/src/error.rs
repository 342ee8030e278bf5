//! Error taxonomy for the parts of the core that need typed errors: board
//! handler NACKs are plain `Reply` values (see [`crate::boards`]), not
//! `Result`s, so this enum only covers configuration and supervisor failures
//! that propagate to a binary's `main()`.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("arena root {0} does not contain a readable mode.txt or match.json")]
    MissingArenaFile(PathBuf),

    #[error("no robot.py found for zone {zone} at {path}")]
    MissingRobotFile { zone: usize, path: PathBuf },

    #[error("invalid match.json at {path}: {source}")]
    InvalidMatchConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("robot(s) in zone(s) {zones} failed to report ready within {timeout_s:.1} simulated seconds")]
    ReadyTimeout { zones: String, timeout_s: f64 },

    #[error("missing light node: {0}")]
    MissingLightNode(String),

    #[error("invalid game mode {0:?} in mode.txt, expected \"dev\" or \"comp\"")]
    InvalidGameMode(String),

    #[error("physics host terminated while user code was still running")]
    PhysicsTerminated,
}
