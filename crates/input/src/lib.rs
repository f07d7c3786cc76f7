//! Input Mapper: discrete key state and cursor samples mapped to simulation input.
//!
//! # Invariants
//! - Held movement keys compose additively; diagonals are not normalized.
//! - The first cursor sample after arming produces no rotation.
//! - Mouse look consumes absolute cursor samples, independent of frame time.

pub mod action;
pub mod mapper;
pub mod mouse;

pub use action::{Action, MovementKeys, ParseActionError};
pub use mapper::{InputFrame, movement_impulse};
pub use mouse::MouseLook;
