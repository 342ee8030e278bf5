//! CLI entry point for the per-zone usercode runner. Grounded on
//! `original_source/.../usercode_runner/usercode_runner.py::main` for the
//! overall sequencing and on the teacher's `uwb-simulator/src/main.rs` for
//! the `clap::Parser` + `tracing_subscriber` CLI idiom.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use sim_core::config::GameMode;
use sim_core::device_server::Board;
use sim_core::usercode_runner::{RunOutcome, UsercodeRun};

#[derive(Parser, Debug)]
#[command(name = "usercode-runner", about = "Runs one zone's robot code against a simulated board set")]
struct Args {
    /// Arena root directory (contains mode.txt, match.json, zone_<i>/).
    #[arg(long, env = "ARENA_ROOT")]
    arena_root: PathBuf,

    /// Zone index (0..N-1) to run.
    #[arg(long)]
    zone: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sim_core::logging::init_stdout();

    let args = Args::parse();
    let game_mode = GameMode::read(&args.arena_root)?;
    tracing::info!(zone = args.zone, ?game_mode, "starting zone usercode");

    let run = UsercodeRun { zone: args.zone, arena_root: args.arena_root, game_mode };
    let boards = Board::default_zone_boards();
    let host = Arc::new(tokio::sync::Mutex::new(sim_core::physics_host::MockPhysicsHost::new(32)));

    match run.run(boards, host)? {
        RunOutcome::Ran => Ok(()),
        RunOutcome::NoRobotCode => {
            if game_mode == GameMode::Comp {
                anyhow::bail!("no robot.py found for zone {} in competition mode", run.zone);
            }
            Ok(())
        }
    }
}
