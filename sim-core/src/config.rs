//! Arena filesystem layout: `mode.txt` (dev/comp) and `match.json`.
//! Grounded on `original_source/.../modules/robot_utils.py`'s
//! `get_game_mode`/`get_match_data` and `scripts/run_comp_match.py`'s
//! `generate_match_file`.

use std::path::Path;

use serde::Deserialize;

use crate::error::SimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    /// No match is running; the usercode runner talks to a fixed zone 0
    /// with no ready handshake.
    Dev,
    /// A competition supervisor is driving a timed match across zones.
    Comp,
}

impl GameMode {
    /// Defaults to `Dev` when `mode.txt` is absent, matching the original's
    /// `get_game_mode`.
    pub fn read(arena_root: &Path) -> Result<Self, SimError> {
        let path = arena_root.join("mode.txt");
        if !path.exists() {
            return Ok(GameMode::Dev);
        }
        let contents = std::fs::read_to_string(&path)
            .map_err(|_| SimError::MissingArenaFile(path.clone()))?;
        match contents.trim() {
            "dev" => Ok(GameMode::Dev),
            "comp" => Ok(GameMode::Comp),
            other => Err(SimError::InvalidGameMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordingConfig {
    pub enabled: bool,
    pub resolution: [u32; 2],
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchConfig {
    pub match_number: u32,
    pub duration: f64,
    pub recording_config: RecordingConfig,
}

impl MatchConfig {
    pub fn read(arena_root: &Path) -> Result<Self, SimError> {
        let path = arena_root.join("match.json");
        let contents = std::fs::read_to_string(&path)
            .map_err(|_| SimError::MissingArenaFile(path.clone()))?;
        serde_json::from_str(&contents).map_err(|source| SimError::InvalidMatchConfig { path, source })
    }

    pub fn match_identifier(&self) -> String {
        format!("match-{}", self.match_number)
    }
}

pub fn zone_robot_path(arena_root: &Path, zone: usize) -> std::path::PathBuf {
    arena_root.join(format!("zone_{}", zone)).join("robot.py")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct ScratchDir(std::path::PathBuf);

    impl ScratchDir {
        fn new() -> Self {
            static COUNTER: AtomicU32 = AtomicU32::new(0);
            let n = COUNTER.fetch_add(1, Ordering::Relaxed);
            let path = std::env::temp_dir().join(format!("sim-core-config-test-{}-{}", std::process::id(), n));
            std::fs::create_dir_all(&path).unwrap();
            ScratchDir(path)
        }

        fn path(&self) -> &Path {
            &self.0
        }
    }

    impl Drop for ScratchDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    #[test]
    fn missing_mode_file_defaults_to_dev() {
        let dir = ScratchDir::new();
        assert_eq!(GameMode::read(dir.path()).unwrap(), GameMode::Dev);
    }

    #[test]
    fn mode_file_selects_comp() {
        let dir = ScratchDir::new();
        std::fs::write(dir.path().join("mode.txt"), "comp").unwrap();
        assert_eq!(GameMode::read(dir.path()).unwrap(), GameMode::Comp);
    }

    #[test]
    fn invalid_mode_file_is_rejected() {
        let dir = ScratchDir::new();
        std::fs::write(dir.path().join("mode.txt"), "practice").unwrap();
        assert!(matches!(GameMode::read(dir.path()), Err(SimError::InvalidGameMode(_))));
    }

    #[test]
    fn match_config_parses_recording_config() {
        let dir = ScratchDir::new();
        std::fs::write(
            dir.path().join("match.json"),
            r#"{"match_number": 3, "duration": 150.0, "recording_config": {"enabled": true, "resolution": [1920, 1080]}}"#,
        )
        .unwrap();
        let config = MatchConfig::read(dir.path()).unwrap();
        assert_eq!(config.match_number, 3);
        assert_eq!(config.match_identifier(), "match-3");
        assert_eq!(config.recording_config.resolution, [1920, 1080]);
    }
}
