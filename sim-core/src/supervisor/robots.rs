//! Per-zone robot bookkeeping and the prestart/ready/start handshake.
//! Grounded on
//! `original_source/.../competition_supervisor.py`'s `RobotData`/`Robots`.

use crate::config::zone_robot_path;
use crate::error::SimError;
use crate::physics_host::{PhysicsHost, StepResult};

pub struct RobotData {
    pub zone: usize,
    pub node_def: String,
    pub registered_ready: bool,
}

impl RobotData {
    pub fn zone_occupied(&self, arena_root: &std::path::Path) -> bool {
        zone_robot_path(arena_root, self.zone).exists()
    }
}

pub struct Robots {
    pub robots: Vec<RobotData>,
}

impl Robots {
    /// Enumerates `ROBOT0..ROBOTN-1` by DEF. A node is considered resolvable
    /// if the Physics Host has ever recorded a `customData` value for it
    /// (including the empty initial string); an unresolvable node is logged
    /// and skipped rather than treated as an error.
    pub fn discover(host: &dyn PhysicsHost, num_zones: usize) -> Self {
        let mut robots = Vec::new();
        for zone in 0..num_zones {
            let node_def = format!("ROBOT{}", zone);
            if host.custom_data_get(&node_def).is_some() {
                robots.push(RobotData { zone, node_def, registered_ready: false });
            } else {
                tracing::warn!(zone, "failed to get Webots node for zone");
            }
        }
        Self { robots }
    }

    pub fn remove_unoccupied_robots(&mut self, host: &mut dyn PhysicsHost, arena_root: &std::path::Path) {
        self.robots.retain(|robot| {
            let occupied = robot.zone_occupied(arena_root);
            if !occupied {
                host.node_remove(&robot.node_def);
            }
            occupied
        });
    }

    pub fn preset_robots(&self, host: &mut dyn PhysicsHost) {
        for robot in &self.robots {
            host.custom_data_set(&robot.node_def, "prestart");
        }
    }

    pub fn start_robots(&self, host: &mut dyn PhysicsHost) {
        for robot in &self.robots {
            host.custom_data_set(&robot.node_def, "start");
        }
    }

    /// Steps simulated time in basic-step increments until every robot has
    /// reported `ready`, or `timeout_s` of simulated time elapses first.
    pub fn wait_for_ready(&mut self, host: &mut dyn PhysicsHost, timeout_s: f64) -> Result<(), SimError> {
        let end_time = host.now() + timeout_s;
        let mut all_ready;
        loop {
            if host.now() >= end_time {
                all_ready = false;
                break;
            }
            let step_ms = host.basic_step_ms();
            if host.step(step_ms) == StepResult::Terminated {
                return Err(SimError::PhysicsTerminated);
            }

            all_ready = true;
            for robot in &mut self.robots {
                if robot.registered_ready {
                    continue;
                }
                if host.custom_data_get(&robot.node_def).as_deref() == Some("ready") {
                    tracing::info!(zone = robot.zone, "robot is ready");
                    robot.registered_ready = true;
                } else {
                    all_ready = false;
                }
            }
            if all_ready {
                break;
            }
        }

        if all_ready {
            Ok(())
        } else {
            let zones = self
                .robots
                .iter()
                .filter(|r| !r.registered_ready)
                .map(|r| r.zone.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            Err(SimError::ReadyTimeout { zones, timeout_s })
        }
    }
}
