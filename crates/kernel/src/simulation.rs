use crate::camera::FollowCamera;
use crate::config::SimConfig;
use crate::entity::Player;
use crate::physics::{PhysicsBackend, PhysicsBridge, PhysicsError};
use glam::Vec3;
use meadow_common::Orientation;
use meadow_input::{InputFrame, MouseLook, movement_impulse};
use serde::{Deserialize, Serialize};

/// Errors from advancing the simulation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    #[error(transparent)]
    Physics(#[from] PhysicsError),
    #[error("simulation is stopped")]
    Stopped,
}

/// What one frame did, for logging and the debug overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub frame: u64,
    pub dt: f32,
    pub impulse: Vec3,
    pub player: Player,
    pub camera_position: Vec3,
    pub orientation: Orientation,
}

/// One player, one camera, one physics backend, advanced frame by frame.
///
/// A failed frame stops the simulation: the error is returned and every
/// later [`Simulation::step`] returns [`SimError::Stopped`], so stale
/// positions are never silently reused.
pub struct Simulation<B: PhysicsBackend> {
    config: SimConfig,
    player: Player,
    camera: FollowCamera,
    mouse: MouseLook,
    physics: PhysicsBridge<B>,
    frame: u64,
    running: bool,
}

impl<B: PhysicsBackend> Simulation<B> {
    /// Build the initial state and initialize physics.
    pub fn new(config: SimConfig, backend: B) -> Result<Self, SimError> {
        let mut physics = PhysicsBridge::new(backend);
        physics.initialize()?;

        let player = Player::new(config.initial_player_position, config.player_speed);
        let camera = FollowCamera::new(
            config.initial_camera_position,
            Orientation::new(config.initial_yaw, config.initial_pitch),
            config.eye_height,
        );
        let mouse = MouseLook::new(config.mouse_sensitivity, config.constrain_pitch);

        tracing::info!(
            backend = physics.backend().name(),
            "simulation started with player at ({:.2}, {:.2}, {:.2})",
            player.position.x,
            player.position.y,
            player.position.z
        );

        Ok(Self {
            config,
            player,
            camera,
            mouse,
            physics,
            frame: 0,
            running: true,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn camera(&self) -> &FollowCamera {
        &self.camera
    }

    /// Explicit orientation set, bypassing mouse look.
    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        self.camera.orientation.set_yaw_pitch(yaw, pitch);
    }

    /// Re-arm the first-cursor-sample rule (window refocus, cursor warp).
    pub fn reset_mouse(&mut self) {
        self.mouse.reset();
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn physics(&self) -> &PhysicsBridge<B> {
        &self.physics
    }

    /// Advance one frame of `dt` seconds.
    pub fn step(&mut self, input: &InputFrame, dt: f32) -> Result<FrameReport, SimError> {
        if !self.running {
            return Err(SimError::Stopped);
        }
        match self.advance(input, dt) {
            Ok(report) => Ok(report),
            Err(e) => {
                tracing::error!(frame = self.frame, "simulation frame failed: {e}");
                self.running = false;
                Err(e)
            }
        }
    }

    fn advance(&mut self, input: &InputFrame, dt: f32) -> Result<FrameReport, SimError> {
        if let Some(cursor) = input.cursor {
            self.mouse.apply(&mut self.camera.orientation, cursor);
        }
        let impulse = movement_impulse(
            &input.keys,
            &self.camera.orientation,
            self.player.speed,
            dt,
        );
        self.player.apply_impulse(impulse);

        self.physics.step(dt)?;
        self.player.position =
            self.physics
                .resolve_player_motion(self.player.position, self.player.velocity, dt)?;

        self.player
            .settle(self.config.friction, self.config.ground_height);
        self.camera.follow(self.player.position);
        self.frame += 1;

        Ok(FrameReport {
            frame: self.frame,
            dt,
            impulse,
            player: self.player,
            camera_position: self.camera.position(),
            orientation: self.camera.orientation,
        })
    }

    /// Point-in-solid query against the physics backend.
    pub fn query_collision(&self, position: Vec3) -> Result<bool, SimError> {
        Ok(self.physics.query_collision(position)?)
    }

    /// Stop accepting frames. Physics stays alive until [`Simulation::shutdown`].
    pub fn stop(&mut self) {
        if self.running {
            tracing::debug!(frames = self.frame, "simulation stopped");
        }
        self.running = false;
    }

    /// Stop and release physics. Safe to call more than once.
    pub fn shutdown(&mut self) {
        self.stop();
        self.physics.shutdown();
    }
}
