use glam::Vec3;
use serde::{Deserialize, Serialize};

/// The single controllable actor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub position: Vec3,
    /// Units per second.
    pub velocity: Vec3,
    /// Impulse magnitude per second of a held movement key.
    pub speed: f32,
}

impl Player {
    pub fn new(position: Vec3, speed: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            speed,
        }
    }

    /// Add a velocity increment. Impulses accumulate across frames.
    pub fn apply_impulse(&mut self, impulse: Vec3) {
        self.velocity += impulse;
    }

    /// Entity-local rules run after the physics bridge: horizontal friction
    /// once per frame, then pin to the ground.
    ///
    /// Friction is per frame, not per second, so the effective deceleration
    /// depends on frame rate.
    pub fn settle(&mut self, friction: f32, ground_height: f32) {
        self.velocity.x *= friction;
        self.velocity.z *= friction;
        self.position.y = ground_height;
        self.velocity.y = 0.0;
    }
}
