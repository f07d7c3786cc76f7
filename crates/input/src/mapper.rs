use crate::action::MovementKeys;
use glam::{Vec2, Vec3};
use meadow_common::Orientation;
use serde::{Deserialize, Serialize};

/// Everything the simulation reads from the input backend for one frame.
///
/// `cursor` is the most recent absolute cursor sample, if the cursor moved
/// since the last frame. Earlier samples in the same frame are dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputFrame {
    pub keys: MovementKeys,
    pub cursor: Option<Vec2>,
}

impl InputFrame {
    pub fn keys(keys: MovementKeys) -> Self {
        Self { keys, cursor: None }
    }

    pub fn with_cursor(mut self, cursor: Vec2) -> Self {
        self.cursor = Some(cursor);
        self
    }
}

/// Velocity increment for one frame of held keys.
///
/// Forward/backward follow `front` flattened onto the ground plane;
/// left/right follow the unflattened `right` vector. Each held key adds
/// `speed * dt` along its axis, so diagonals come out √2 longer.
pub fn movement_impulse(
    keys: &MovementKeys,
    orientation: &Orientation,
    speed: f32,
    dt: f32,
) -> Vec3 {
    let step = speed * dt;
    let forward = orientation.horizontal_front();
    let right = orientation.right();

    let mut impulse = Vec3::ZERO;
    if keys.forward {
        impulse += forward * step;
    }
    if keys.backward {
        impulse += forward * -step;
    }
    if keys.left {
        impulse += right * -step;
    }
    if keys.right {
        impulse += right * step;
    }
    impulse
}
