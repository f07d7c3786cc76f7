use glam::{Mat4, Vec3};
use meadow_common::Orientation;

/// First-person camera that rides on the player at eye height.
///
/// Orientation is owned here and edited by mouse look. Position is only ever
/// re-derived from the followed entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowCamera {
    pub orientation: Orientation,
    position: Vec3,
    eye_height: f32,
}

impl FollowCamera {
    pub fn new(position: Vec3, orientation: Orientation, eye_height: f32) -> Self {
        Self {
            orientation,
            position,
            eye_height,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn eye_height(&self) -> f32 {
        self.eye_height
    }

    /// Snap to `target` plus the eye offset.
    pub fn follow(&mut self, target: Vec3) {
        self.position = target + Vec3::Y * self.eye_height;
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.orientation.view_matrix(self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follow_adds_eye_offset() {
        let mut cam = FollowCamera::new(Vec3::new(0.0, 2.0, 5.0), Orientation::default(), 1.8);
        cam.follow(Vec3::new(3.0, 0.5, -2.0));
        assert_eq!(cam.position(), Vec3::new(3.0, 0.5 + 1.8, -2.0));
    }

    #[test]
    fn view_matrix_moves_eye_to_origin() {
        let mut cam = FollowCamera::new(Vec3::ZERO, Orientation::default(), 1.8);
        cam.follow(Vec3::new(1.0, 0.0, 1.0));
        let eye_in_view = cam.view_matrix().transform_point3(cam.position());
        assert!(eye_in_view.length() < 1e-5);
    }
}
