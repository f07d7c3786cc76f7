use glam::Vec3;
use meadow_kernel::{PhysicsBackend, PhysicsError};

const GRAVITY: f32 = 9.81;
const MAX_FALL_SPEED: f32 = 50.0;
/// Bodies touch the ground when their centre is closer than this.
const CONTACT_RADIUS: f32 = 0.5;
const RESTITUTION: f32 = 0.3;
const FRICTION: f32 = 0.8;
const EPSILON: f32 = 1e-4;

/// Infinite plane `dot(p, normal) == distance`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Plane {
    normal: Vec3,
    distance: f32,
}

impl Plane {
    fn signed_distance(&self, p: Vec3) -> f32 {
        p.dot(self.normal) - self.distance
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Body {
    position: Vec3,
    velocity: Vec3,
}

/// Gravity plus a single ground plane at y = 0.
///
/// Holds one internal body. `step` advances it; `resolve_motion` first loads
/// the caller's position and velocity into it, then advances it and reports
/// where it ended up.
#[derive(Debug, Clone)]
pub struct GroundPlanePhysics {
    body: Body,
    ground: Plane,
}

impl Default for GroundPlanePhysics {
    fn default() -> Self {
        Self::new()
    }
}

impl GroundPlanePhysics {
    pub fn new() -> Self {
        Self {
            body: Body {
                position: Vec3::new(0.0, 1.0, 0.0),
                velocity: Vec3::ZERO,
            },
            ground: Plane {
                normal: Vec3::Y,
                distance: 0.0,
            },
        }
    }

    pub fn body_position(&self) -> Vec3 {
        self.body.position
    }

    pub fn body_velocity(&self) -> Vec3 {
        self.body.velocity
    }

    fn integrate(&mut self, dt: f32) {
        let body = &mut self.body;
        body.velocity.y = (body.velocity.y - GRAVITY * dt).max(-MAX_FALL_SPEED);
        body.position += body.velocity * dt;
        self.resolve_ground_contact();
    }

    fn resolve_ground_contact(&mut self) {
        let n = self.ground.normal;
        let distance = self.ground.signed_distance(self.body.position);
        if distance >= CONTACT_RADIUS {
            return;
        }
        let body = &mut self.body;
        body.position += n * (CONTACT_RADIUS - distance);

        let into_ground = body.velocity.dot(n);
        if into_ground > 0.0 {
            return;
        }
        body.velocity += n * (-(1.0 + RESTITUTION) * into_ground);

        let tangent = body.velocity - n * body.velocity.dot(n);
        let len = tangent.length();
        if len > EPSILON {
            let t = tangent / len;
            body.velocity += t * (-body.velocity.dot(t) * FRICTION);
        }
    }
}

impl PhysicsBackend for GroundPlanePhysics {
    fn name(&self) -> &str {
        "ground-plane"
    }

    fn init(&mut self) -> Result<(), PhysicsError> {
        *self = Self::new();
        tracing::debug!("ground-plane physics ready");
        Ok(())
    }

    fn step(&mut self, dt: f32) -> Result<(), PhysicsError> {
        self.integrate(dt);
        Ok(())
    }

    fn resolve_motion(
        &mut self,
        position: Vec3,
        velocity: Vec3,
        dt: f32,
    ) -> Result<Vec3, PhysicsError> {
        self.body = Body { position, velocity };
        self.integrate(dt);
        Ok(self.body.position)
    }

    fn query_collision(&self, position: Vec3) -> Result<bool, PhysicsError> {
        Ok(self.ground.signed_distance(position) < CONTACT_RADIUS)
    }

    fn shutdown(&mut self) {
        tracing::debug!("ground-plane physics released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready() -> GroundPlanePhysics {
        let mut p = GroundPlanePhysics::new();
        p.init().unwrap();
        p
    }

    #[test]
    fn resting_body_stays_on_ground() {
        let mut p = ready();
        let mut pos = Vec3::new(0.0, 0.5, 0.0);
        for _ in 0..100 {
            pos = p.resolve_motion(pos, Vec3::ZERO, 0.016).unwrap();
        }
        assert!((pos.y - 0.5).abs() < 1e-4);
    }

    #[test]
    fn horizontal_velocity_moves_body() {
        let mut p = ready();
        let pos = p
            .resolve_motion(Vec3::new(0.0, 0.5, 0.0), Vec3::new(2.0, 0.0, -1.0), 0.5)
            .unwrap();
        assert!((pos.x - 1.0).abs() < 1e-5);
        assert!((pos.z - -0.5).abs() < 1e-5);
        assert!(pos.y >= 0.5 - 1e-5);
    }

    #[test]
    fn high_body_falls_freely() {
        let mut p = ready();
        let pos = p
            .resolve_motion(Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO, 0.1)
            .unwrap();
        assert!((pos.y - (10.0 - GRAVITY * 0.1 * 0.1)).abs() < 1e-4);
    }

    #[test]
    fn fall_speed_is_capped() {
        let mut p = ready();
        p.resolve_motion(Vec3::new(0.0, 1.0e6, 0.0), Vec3::new(0.0, -49.9, 0.0), 1.0)
            .unwrap();
        assert_eq!(p.body_velocity().y, -MAX_FALL_SPEED);
    }

    #[test]
    fn landing_bounces_with_restitution() {
        let mut p = ready();
        p.resolve_motion(Vec3::new(0.0, 0.6, 0.0), Vec3::new(0.0, -10.0, 0.0), 0.05)
            .unwrap();
        let v = p.body_velocity();
        assert!(v.y > 0.0, "expected upward bounce, got {v}");
        assert!((p.body_position().y - CONTACT_RADIUS).abs() < 1e-5);
    }

    #[test]
    fn ground_contact_applies_friction() {
        let mut p = ready();
        p.resolve_motion(Vec3::new(0.0, 0.5, 0.0), Vec3::new(10.0, 0.0, 0.0), 0.016)
            .unwrap();
        let v = p.body_velocity();
        assert!((v.x - 10.0 * (1.0 - FRICTION)).abs() < 1e-3);
    }

    #[test]
    fn step_advances_internal_body() {
        let mut p = ready();
        let start = p.body_position();
        p.step(0.1).unwrap();
        assert!(p.body_position().y < start.y);
    }

    #[test]
    fn collision_query_uses_contact_radius() {
        let p = ready();
        assert!(p.query_collision(Vec3::new(3.0, 0.2, -1.0)).unwrap());
        assert!(p.query_collision(Vec3::new(0.0, -5.0, 0.0)).unwrap());
        assert!(!p.query_collision(Vec3::new(0.0, 0.5, 0.0)).unwrap());
        assert!(!p.query_collision(Vec3::new(0.0, 2.0, 0.0)).unwrap());
    }
}
