//! Simulated devices: per-device value producers/consumers sitting between
//! a board engine and the [`crate::physics_host::PhysicsHost`]. Every kind
//! has a `Null` variant with no physics coupling, used for unwired board
//! slots (spec.md §3, §9 "abstract device variants").

pub mod camera;
pub mod led;
pub mod motor;
pub mod pin;
pub mod power;
pub mod servo;

pub use camera::Camera;
pub use led::Led;
pub use motor::Motor;
pub use pin::Pin;
pub use power::{Buzzer, Button, Output};
pub use servo::Servo;
