use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// World-space up axis used to derive the camera's right vector.
pub const WORLD_UP: Vec3 = Vec3::Y;

/// Pitch is kept inside `[-PITCH_LIMIT_DEGREES, PITCH_LIMIT_DEGREES]` when constrained.
pub const PITCH_LIMIT_DEGREES: f32 = 89.0;

/// Squared horizontal length below which `front` counts as vertical.
const VERTICAL_EPSILON: f32 = 1e-10;

/// Camera look direction as yaw/pitch in degrees plus the derived basis.
///
/// The basis vectors are private and recomputed on every angle change, so
/// `front`, `right` and `up` can never be observed out of sync with the
/// angles. Serialized form carries the angles only; deserializing rebuilds
/// the basis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Angles", into = "Angles")]
pub struct Orientation {
    yaw: f32,
    pitch: f32,
    front: Vec3,
    right: Vec3,
    up: Vec3,
}

#[derive(Serialize, Deserialize)]
struct Angles {
    yaw: f32,
    pitch: f32,
}

impl From<Angles> for Orientation {
    fn from(a: Angles) -> Self {
        Self::new(a.yaw, a.pitch)
    }
}

impl From<Orientation> for Angles {
    fn from(o: Orientation) -> Self {
        Self {
            yaw: o.yaw,
            pitch: o.pitch,
        }
    }
}

impl Default for Orientation {
    /// Looking down -Z.
    fn default() -> Self {
        Self::new(-90.0, 0.0)
    }
}

impl Orientation {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        let mut o = Self {
            yaw,
            pitch,
            front: Vec3::NEG_Z,
            right: Vec3::X,
            up: WORLD_UP,
        };
        o.update_basis();
        o
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Set both angles (degrees, unclamped) and rebuild the basis.
    pub fn set_yaw_pitch(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch;
        self.update_basis();
    }

    /// Add a scaled cursor delta to yaw/pitch.
    ///
    /// Yaw wraps implicitly. Pitch is clamped to ±89° when `constrain_pitch`
    /// is set.
    pub fn apply_mouse_delta(&mut self, dx: f32, dy: f32, sensitivity: f32, constrain_pitch: bool) {
        self.yaw += dx * sensitivity;
        self.pitch += dy * sensitivity;
        if constrain_pitch {
            self.pitch = self.pitch.clamp(-PITCH_LIMIT_DEGREES, PITCH_LIMIT_DEGREES);
        }
        self.update_basis();
    }

    /// `front` with the vertical component removed, renormalized.
    ///
    /// Zero when looking straight up or down, including the rounding
    /// residue `cos(±90°)` leaves in x/z.
    pub fn horizontal_front(&self) -> Vec3 {
        let flat = Vec3::new(self.front.x, 0.0, self.front.z);
        if flat.length_squared() < VERTICAL_EPSILON {
            Vec3::ZERO
        } else {
            flat.normalize()
        }
    }

    /// Right-handed look-at view from `eye` along `front`.
    pub fn view_matrix(&self, eye: Vec3) -> Mat4 {
        Mat4::look_at_rh(eye, eye + self.front, self.up)
    }

    fn update_basis(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        self.right = self.front.cross(WORLD_UP).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn assert_orthonormal(o: &Orientation) {
        let (f, r, u) = (o.front(), o.right(), o.up());
        assert!((f.length() - 1.0).abs() < EPS, "front len {}", f.length());
        assert!((r.length() - 1.0).abs() < EPS, "right len {}", r.length());
        assert!((u.length() - 1.0).abs() < EPS, "up len {}", u.length());
        assert!(f.dot(r).abs() < EPS);
        assert!(f.dot(u).abs() < EPS);
        assert!(r.dot(u).abs() < EPS);
    }

    #[test]
    fn default_looks_down_negative_z() {
        let o = Orientation::default();
        assert!((o.front() - Vec3::NEG_Z).length() < EPS);
        assert!((o.right() - Vec3::X).length() < EPS);
        assert!((o.up() - Vec3::Y).length() < EPS);
    }

    #[test]
    fn basis_is_orthonormal_across_angles() {
        let mut yaw = -720.0;
        while yaw <= 720.0 {
            let mut pitch = -89.0;
            while pitch <= 89.0 {
                assert_orthonormal(&Orientation::new(yaw, pitch));
                pitch += 7.5;
            }
            yaw += 13.0;
        }
    }

    #[test]
    fn set_yaw_pitch_recomputes_basis() {
        let mut o = Orientation::default();
        o.set_yaw_pitch(0.0, 0.0);
        assert!((o.front() - Vec3::X).length() < EPS);
        assert!((o.right() - Vec3::Z).length() < EPS);
        assert_orthonormal(&o);
    }

    #[test]
    fn pitch_stays_clamped_under_any_delta() {
        let mut o = Orientation::default();
        let deltas = [1.0e6, -3.0e7, 42.0, -0.5, 9.0e5, -9.0e5, 1.0e9];
        for dy in deltas {
            o.apply_mouse_delta(3.0, dy, 0.1, true);
            assert!(o.pitch() <= PITCH_LIMIT_DEGREES);
            assert!(o.pitch() >= -PITCH_LIMIT_DEGREES);
            assert_orthonormal(&o);
        }
    }

    #[test]
    fn unconstrained_pitch_is_not_clamped() {
        let mut o = Orientation::default();
        o.apply_mouse_delta(0.0, 1000.0, 0.1, false);
        assert!((o.pitch() - 100.0).abs() < EPS);
    }

    #[test]
    fn mouse_delta_scales_by_sensitivity() {
        let mut o = Orientation::new(-90.0, 0.0);
        o.apply_mouse_delta(10.0, -20.0, 0.1, true);
        assert!((o.yaw() - -89.0).abs() < EPS);
        assert!((o.pitch() - -2.0).abs() < EPS);
    }

    #[test]
    fn yaw_wraps_without_clamp() {
        let mut o = Orientation::new(0.0, 0.0);
        o.apply_mouse_delta(3600.0, 0.0, 1.0, true);
        assert!((o.yaw() - 3600.0).abs() < EPS);
        assert!((o.front() - Vec3::X).length() < 1e-4);
    }

    #[test]
    fn horizontal_front_drops_vertical_component() {
        let o = Orientation::new(-90.0, 45.0);
        let h = o.horizontal_front();
        assert_eq!(h.y, 0.0);
        assert!((h.length() - 1.0).abs() < EPS);
        assert!((h - Vec3::NEG_Z).length() < EPS);
    }

    #[test]
    fn vertical_front_has_no_horizontal_direction() {
        for yaw in [-90.0, 0.0, 37.0, 180.0] {
            for pitch in [90.0, -90.0] {
                let o = Orientation::new(yaw, pitch);
                assert_eq!(o.horizontal_front(), Vec3::ZERO, "yaw {yaw} pitch {pitch}");
            }
        }
        let near = Orientation::new(-90.0, 89.0);
        assert!((near.horizontal_front() - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn serde_round_trip_rebuilds_basis() {
        let o = Orientation::new(30.0, -12.0);
        let json = serde_json::to_string(&o).unwrap();
        assert!(!json.contains("front"));
        let back: Orientation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, o);
    }
}
