//! Core simulation library: board protocol engines, simulated devices, the
//! multiplexed socket server, and the competition supervisor's match and
//! lighting engines, all built against a narrow [`physics_host::PhysicsHost`]
//! facade so the rest of the crate never talks to the external simulation
//! engine directly.

pub mod boards;
pub mod config;
pub mod device_server;
pub mod devices;
pub mod error;
pub mod logging;
pub mod physics_host;
pub mod socket_server;
pub mod supervisor;
pub mod usercode_runner;

pub use error::SimError;
