//! Simulation kernel: the per-frame loop tying input, physics, the player
//! entity and the follow camera together.
//!
//! # Invariants
//! - Each frame runs input → physics step → motion resolve → local update → camera follow, in that order.
//! - The physics bridge result is authoritative for the player's position.
//! - The camera position is derived from the player every frame, never integrated.
//! - Physics is initialized once, shut down at most once.

pub mod camera;
pub mod clock;
pub mod config;
pub mod entity;
pub mod physics;
pub mod simulation;

pub use camera::FollowCamera;
pub use clock::FrameClock;
pub use config::{ConfigError, SimConfig};
pub use entity::Player;
pub use physics::{FreeSpacePhysics, PhysicsBackend, PhysicsBridge, PhysicsError};
pub use simulation::{FrameReport, SimError, Simulation};
