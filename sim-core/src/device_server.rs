//! One `DeviceServer` per simulated board: a single-client TCP listener that
//! speaks that board's line/binary protocol. Grounded on
//! `original_source/.../socket_server.py`'s `DeviceServer` (accept-one,
//! buffer-until-newline, NACK-on-exception).

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::BytesMut;
use sim_types::BoardKind;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::boards::{Arduino, CameraBoard, LedBoard, MotorBoard, PowerBoard, Reply, ServoBoard, TimeServer};
use crate::physics_host::{SharedPhysicsHost, StepResult};

/// Any one of the seven board protocol engines, dispatched uniformly by the
/// server so `SocketServer` doesn't need to know board-specific types.
pub enum Board {
    Power(PowerBoard),
    Motor(MotorBoard),
    Servo(ServoBoard),
    Led(LedBoard),
    Camera(CameraBoard),
    Arduino(Arduino),
    TimeServer(TimeServer),
}

impl Board {
    pub fn asset_tag(&self) -> &str {
        match self {
            Board::Power(b) => &b.asset_tag,
            Board::Motor(b) => &b.asset_tag,
            Board::Servo(b) => &b.asset_tag,
            Board::Led(b) => &b.asset_tag,
            Board::Camera(b) => &b.asset_tag,
            Board::Arduino(b) => &b.asset_tag,
            Board::TimeServer(b) => &b.asset_tag,
        }
    }

    pub fn kind(&self) -> BoardKind {
        match self {
            Board::Power(_) => BoardKind::Power,
            Board::Motor(_) => BoardKind::Motor,
            Board::Servo(_) => BoardKind::Servo,
            Board::Led(_) => BoardKind::LedHat,
            Board::Camera(_) => BoardKind::Camera,
            Board::Arduino(_) => BoardKind::Arduino,
            Board::TimeServer(_) => BoardKind::TimeServer,
        }
    }

    /// The canonical one-of-each board set a zone is wired up with. The
    /// original leaves this list empty (`setup_devices`'s `devices = []`),
    /// to be filled in per-world; since this crate has no world file to read
    /// device wiring from, every board here is built from Null devices —
    /// usercode still gets a full, connectable board set, just with no
    /// physical sensors/actuators behind it until a real `PhysicsHost`
    /// resolves one by name.
    pub fn default_zone_boards() -> Vec<Board> {
        use crate::devices::{Buzzer, Button, Camera, Led, Motor, Output, Servo};

        vec![
            Board::Power(PowerBoard::new(
                (0..crate::boards::power::NUM_OUTPUTS).map(|_| Output::new(None)).collect(),
                Buzzer::default(),
                Button::Null,
                [Led::null(), Led::null()],
                "PBv4".to_string(),
            )),
            Board::Motor(MotorBoard::new(vec![Motor::null(); 2], "MCv4".to_string())),
            Board::Servo(ServoBoard::new(vec![Servo::null(); 12], "SBv4".to_string())),
            Board::Led(LedBoard::new(vec![Led::null(); 5], "KCH".to_string())),
            Board::Camera(CameraBoard::new(Camera::null(64, 48), "CAM".to_string())),
            Board::Arduino(Arduino::new(vec![crate::devices::Pin::empty(); 18], "SR".to_string())),
            Board::TimeServer(TimeServer::new("TIME".to_string())),
        ]
    }

    fn handle_command(&mut self, command: &str, host: &mut dyn crate::physics_host::PhysicsHost) -> Reply {
        match self {
            Board::Power(b) => b.handle_command(command, host),
            Board::Motor(b) => b.handle_command(command, host),
            Board::Servo(b) => b.handle_command(command, host),
            Board::Led(b) => b.handle_command(command, host),
            Board::Camera(b) => b.handle_command(command, host),
            Board::Arduino(b) => b.handle_command(command, host),
            Board::TimeServer(b) => b.handle_command(command, host),
        }
    }
}

pub struct DeviceServer {
    listener: TcpListener,
    port: u16,
    board: Board,
    stream: Option<TcpStream>,
    inbound: BytesMut,
}

impl DeviceServer {
    pub async fn bind(board: Board) -> std::io::Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let port = listener.local_addr()?.port();
        Ok(Self { listener, port, board, stream: None, inbound: BytesMut::new() })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn asset_tag(&self) -> &str {
        self.board.asset_tag()
    }

    pub fn board_type(&self) -> &'static str {
        self.board.kind().class_name()
    }

    /// Accept-then-read loop for this board's socket. Runs until the
    /// connection drops, `terminated` is set by a command that finds the
    /// physics host has stopped, or `serve` is cancelled by the caller
    /// (e.g. via `tokio::select!` against a shutdown signal).
    pub async fn serve(&mut self, host: SharedPhysicsHost, terminated: Arc<AtomicBool>) {
        loop {
            if terminated.load(Ordering::Relaxed) {
                return;
            }

            if self.stream.is_none() {
                match self.listener.accept().await {
                    Ok((stream, _)) => {
                        self.inbound.clear();
                        self.stream = Some(stream);
                    }
                    Err(e) => {
                        tracing::warn!(board = self.asset_tag(), error = %e, "accept failed");
                        continue;
                    }
                }
            }

            let mut buf = [0u8; 4096];
            let stream = self.stream.as_mut().expect("stream just set above");
            match stream.read(&mut buf).await {
                Ok(0) => {
                    tracing::debug!(board = self.asset_tag(), "client disconnected");
                    self.disconnect();
                }
                Ok(n) => {
                    self.inbound.extend_from_slice(&buf[..n]);
                    if let Err(e) = self.drain_commands(&host, &terminated).await {
                        tracing::warn!(board = self.asset_tag(), error = %e, "write failed");
                        self.disconnect();
                    }
                }
                Err(e) => {
                    tracing::warn!(board = self.asset_tag(), error = %e, "read failed");
                    self.disconnect();
                }
            }
        }
    }

    async fn drain_commands(&mut self, host: &SharedPhysicsHost, terminated: &Arc<AtomicBool>) -> std::io::Result<()> {
        while let Some(pos) = self.inbound.iter().position(|&b| b == b'\n') {
            let line = self.inbound.split_to(pos + 1);
            let command = String::from_utf8_lossy(&line[..line.len() - 1]).into_owned();
            let reply = self.run_command(&command, host, terminated).await;
            if !reply.is_empty() {
                let stream = self.stream.as_mut().expect("connected while draining");
                stream.write_all(&reply).await?;
            }
        }
        Ok(())
    }

    /// Advances the shared physics host by one basic step to model dispatch
    /// latency, then runs `command` against this board. Marks `terminated`
    /// if the step reports the physics host has stopped, so the caller can
    /// surface `SimError::PhysicsTerminated` once the server winds down.
    async fn run_command(&mut self, command: &str, host: &SharedPhysicsHost, terminated: &Arc<AtomicBool>) -> Vec<u8> {
        let mut guard = host.lock().await;
        if guard.step(guard.basic_step_ms()) == StepResult::Terminated {
            terminated.store(true, Ordering::Relaxed);
        }
        let board = &mut self.board;
        let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
            board.handle_command(command, &mut *guard)
        }));
        match outcome {
            Ok(Reply::Text(text)) => format!("{}\n", text).into_bytes(),
            Ok(Reply::Binary(bytes)) => bytes,
            Ok(Reply::Empty) => Vec::new(),
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                format!("NACK:{}\n", message).into_bytes()
            }
        }
    }

    fn disconnect(&mut self) {
        self.inbound.clear();
        self.stream = None;
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "board command panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics_host::MockPhysicsHost;
    use tokio::sync::Mutex;

    fn no_terminate() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(false))
    }

    #[tokio::test]
    async fn replies_are_newline_terminated_and_ackable() {
        let board = Board::Power(PowerBoard::new(
            Vec::new(),
            Default::default(),
            crate::devices::Button::Null,
            [crate::devices::Led::null(), crate::devices::Led::null()],
            "PWR".to_string(),
        ));
        let mut server = DeviceServer::bind(board).await.unwrap();
        assert!(server.port() > 0);
        let host: SharedPhysicsHost = Arc::new(Mutex::new(MockPhysicsHost::new(32)));
        let reply = server.run_command("*STATUS?", &host, &no_terminate()).await;
        assert_eq!(reply, b"0,0,0,0,0,0,0:25:0:5000\n".to_vec());
    }

    #[tokio::test]
    async fn binary_reply_has_no_trailing_newline() {
        use crate::devices::Camera;
        let board = Board::Camera(CameraBoard::new(Camera::null(4, 4), "CAM".to_string()));
        let mut server = DeviceServer::bind(board).await.unwrap();
        let host: SharedPhysicsHost = Arc::new(Mutex::new(MockPhysicsHost::new(32)));
        let reply = server.run_command("CAM:FRAME!", &host, &no_terminate()).await;
        assert_eq!(reply[0], 0x00);
        assert_ne!(reply.last(), Some(&b'\n'));
    }

    #[tokio::test]
    async fn malformed_command_is_nacked_not_crashed() {
        let board = Board::Power(PowerBoard::new(
            Vec::new(),
            Default::default(),
            crate::devices::Button::Null,
            [crate::devices::Led::null(), crate::devices::Led::null()],
            "PWR".to_string(),
        ));
        let mut server = DeviceServer::bind(board).await.unwrap();
        let host: SharedPhysicsHost = Arc::new(Mutex::new(MockPhysicsHost::new(32)));
        let reply = server.run_command("OUT:99:SET:1", &host, &no_terminate()).await;
        assert!(String::from_utf8_lossy(&reply).starts_with("NACK:"));
    }

    #[tokio::test]
    async fn terminated_physics_host_is_flagged() {
        let board = Board::Power(PowerBoard::new(
            Vec::new(),
            Default::default(),
            crate::devices::Button::Null,
            [crate::devices::Led::null(), crate::devices::Led::null()],
            "PWR".to_string(),
        ));
        let mut server = DeviceServer::bind(board).await.unwrap();
        let mut mock = MockPhysicsHost::new(32);
        mock.set_terminated(true);
        let host: SharedPhysicsHost = Arc::new(Mutex::new(mock));
        let terminated = no_terminate();
        server.run_command("*STATUS?", &host, &terminated).await;
        assert!(terminated.load(Ordering::Relaxed));
    }

    #[test]
    fn default_zone_boards_cover_every_board_kind() {
        let boards = Board::default_zone_boards();
        let kinds: Vec<BoardKind> = boards.iter().map(|b| b.kind()).collect();
        assert_eq!(kinds.len(), 7);
        assert!(kinds.contains(&BoardKind::Power));
        assert!(kinds.contains(&BoardKind::Motor));
        assert!(kinds.contains(&BoardKind::Servo));
        assert!(kinds.contains(&BoardKind::LedHat));
        assert!(kinds.contains(&BoardKind::Camera));
        assert!(kinds.contains(&BoardKind::Arduino));
        assert!(kinds.contains(&BoardKind::TimeServer));
    }
}
