use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading a [`SimConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables for the simulation loop.
///
/// Every field has a default, so a config file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Impulse magnitude per second of a held movement key.
    pub player_speed: f32,
    /// Horizontal velocity multiplier applied once per frame.
    pub friction: f32,
    /// Height the player's centre is pinned to after each frame.
    pub ground_height: f32,
    /// Vertical offset from player to camera.
    pub eye_height: f32,
    pub mouse_sensitivity: f32,
    pub constrain_pitch: bool,
    /// Degrees.
    pub initial_yaw: f32,
    /// Degrees.
    pub initial_pitch: f32,
    pub initial_player_position: Vec3,
    /// Camera position until the first frame moves it onto the player.
    pub initial_camera_position: Vec3,
    /// Upper bound on a single frame's dt, in seconds.
    pub max_frame_dt: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            player_speed: 5.0,
            friction: 0.9,
            ground_height: 0.5,
            eye_height: 1.8,
            mouse_sensitivity: 0.1,
            constrain_pitch: true,
            initial_yaw: -90.0,
            initial_pitch: 0.0,
            initial_player_position: Vec3::ZERO,
            initial_camera_position: Vec3::new(0.0, 2.0, 5.0),
            max_frame_dt: 0.1,
        }
    }
}

impl SimConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        tracing::info!("loaded sim config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_frame_dt.is_nan() || self.max_frame_dt <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "max_frame_dt must be positive, got {}",
                self.max_frame_dt
            )));
        }
        if !(0.0..=1.0).contains(&self.friction) {
            return Err(ConfigError::Invalid(format!(
                "friction must be within [0, 1], got {}",
                self.friction
            )));
        }
        if !self.player_speed.is_finite() || self.player_speed < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "player_speed must be a non-negative number, got {}",
                self.player_speed
            )));
        }
        Ok(())
    }
}
