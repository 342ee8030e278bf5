//! The collection of [`DeviceServer`]s for one robot's board set, run
//! concurrently. Grounded on `original_source/.../socket_server.py`'s
//! `SocketServer` (`select` loop over every device socket, `links_formatted`
//! for the usercode runner's connection-info banner).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::device_server::DeviceServer;
use crate::physics_host::SharedPhysicsHost;

pub struct SocketServer {
    devices: Vec<DeviceServer>,
}

impl SocketServer {
    pub fn new(devices: Vec<DeviceServer>) -> Self {
        Self { devices }
    }

    /// `socket://<address>:<port>/<board_type>/<asset_tag>;` lines, one per
    /// board, for the usercode runner to hand to `robot.py` as connection info.
    pub fn links_formatted(&self, address: &str) -> String {
        self.devices
            .iter()
            .map(|d| format!("socket://{}:{}/{}/{};", address, d.port(), d.board_type(), d.asset_tag()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Run every device's accept/read loop concurrently, one task per board,
    /// until `stop` is set or a board reports via `terminated` that the
    /// physics host has stopped. Each `DeviceServer::serve` call only
    /// returns on disconnect, so both signals are delivered by aborting the
    /// whole task set rather than by polling inside the loop bodies.
    pub async fn run(self, host: SharedPhysicsHost, stop: Arc<AtomicBool>, terminated: Arc<AtomicBool>) {
        let mut set = tokio::task::JoinSet::new();
        for mut device in self.devices.into_iter() {
            let host = host.clone();
            let terminated = terminated.clone();
            set.spawn(async move { device.serve(host, terminated).await });
        }

        tokio::select! {
            _ = async { while set.join_next().await.is_some() {} } => {}
            _ = watch_flag(stop) => {
                set.abort_all();
                tracing::info!("socket server stopping");
            }
            _ = watch_flag(terminated) => {
                set.abort_all();
                tracing::warn!("socket server stopping: physics host terminated");
            }
        }
    }
}

async fn watch_flag(flag: Arc<AtomicBool>) {
    loop {
        if flag.load(Ordering::Relaxed) {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boards::PowerBoard;
    use crate::device_server::Board;
    use crate::devices::{Button, Led};
    use crate::physics_host::MockPhysicsHost;
    use tokio::sync::Mutex;

    #[tokio::test]
    async fn links_formatted_lists_every_board() {
        let board = Board::Power(PowerBoard::new(
            Vec::new(),
            Default::default(),
            Button::Null,
            [Led::null(), Led::null()],
            "PB1".to_string(),
        ));
        let device = DeviceServer::bind(board).await.unwrap();
        let port = device.port();
        let server = SocketServer::new(vec![device]);
        let links = server.links_formatted("127.0.0.1");
        assert_eq!(links, format!("socket://127.0.0.1:{}/PowerBoard/PB1;", port));
    }

    #[tokio::test]
    async fn run_stops_when_flag_is_set() {
        let board = Board::Power(PowerBoard::new(
            Vec::new(),
            Default::default(),
            Button::Null,
            [Led::null(), Led::null()],
            "PB1".to_string(),
        ));
        let device = DeviceServer::bind(board).await.unwrap();
        let server = SocketServer::new(vec![device]);
        let host: SharedPhysicsHost = Arc::new(Mutex::new(MockPhysicsHost::new(32)));
        let stop = Arc::new(AtomicBool::new(false));
        let stop_clone = stop.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            stop_clone.store(true, Ordering::Relaxed);
        });
        let terminated = Arc::new(AtomicBool::new(false));
        tokio::time::timeout(std::time::Duration::from_secs(2), server.run(host, stop, terminated))
            .await
            .expect("socket server did not stop in time");
    }

    #[tokio::test]
    async fn run_stops_when_physics_host_terminates() {
        let board = Board::Power(PowerBoard::new(
            Vec::new(),
            Default::default(),
            Button::Null,
            [Led::null(), Led::null()],
            "PB1".to_string(),
        ));
        let device = DeviceServer::bind(board).await.unwrap();
        let server = SocketServer::new(vec![device]);
        let host: SharedPhysicsHost = Arc::new(Mutex::new(MockPhysicsHost::new(32)));
        let stop = Arc::new(AtomicBool::new(false));
        let terminated = Arc::new(AtomicBool::new(false));
        let terminated_clone = terminated.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            terminated_clone.store(true, Ordering::Relaxed);
        });
        tokio::time::timeout(std::time::Duration::from_secs(2), server.run(host, stop, terminated))
            .await
            .expect("socket server did not stop in time");
    }
}
