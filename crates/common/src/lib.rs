//! Shared types used across the meadow workspace.
//!
//! # Invariants
//! - An [`Orientation`]'s basis vectors always match its yaw/pitch.

pub mod orientation;
pub mod types;

pub use orientation::{Orientation, PITCH_LIMIT_DEGREES, WORLD_UP};
pub use types::Transform;
