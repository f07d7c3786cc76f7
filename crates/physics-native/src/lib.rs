//! Loadable physics module.
//!
//! Exports the five C entry points the desktop app looks for at runtime and
//! forwards them to a process-wide [`GroundPlanePhysics`].
//!
//! # Invariants
//! - Entry points never unwind across the C boundary.
//! - Calls made before `initPhysics` or after `cleanupPhysics` are ignored
//!   (or report "no collision" / echo the input position).

#![allow(non_snake_case)]

use glam::Vec3;
use meadow_kernel::PhysicsBackend;
use meadow_physics::GroundPlanePhysics;
use std::ffi::c_int;
use std::sync::{Mutex, MutexGuard};

static WORLD: Mutex<Option<GroundPlanePhysics>> = Mutex::new(None);

fn world() -> MutexGuard<'static, Option<GroundPlanePhysics>> {
    WORLD.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[unsafe(no_mangle)]
pub extern "C" fn initPhysics() {
    let mut physics = GroundPlanePhysics::new();
    match physics.init() {
        Ok(()) => {
            *world() = Some(physics);
            tracing::info!("native physics module initialized");
        }
        Err(e) => tracing::error!("native physics init failed: {e}"),
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn cleanupPhysics() {
    if let Some(mut physics) = world().take() {
        physics.shutdown();
        tracing::info!("native physics module released");
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn updatePhysics(dt: f32) {
    if let Some(physics) = world().as_mut() {
        step_logged(physics, dt);
    }
}

/// Step `physics`, logging any failure.
fn step_logged<B: PhysicsBackend>(physics: &mut B, dt: f32) -> bool {
    match physics.step(dt) {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(backend = physics.name(), dt, "native physics step failed: {e}");
            false
        }
    }
}

/// Writes the resolved position to `out_position[0..3]`.
///
/// # Safety
/// `out_position` must be null or point to three writable `f32`s.
#[unsafe(no_mangle)]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn updatePlayerPhysics(
    pos_x: f32,
    pos_y: f32,
    pos_z: f32,
    vel_x: f32,
    vel_y: f32,
    vel_z: f32,
    dt: f32,
    out_position: *mut f32,
) {
    if out_position.is_null() {
        return;
    }
    let position = Vec3::new(pos_x, pos_y, pos_z);
    let velocity = Vec3::new(vel_x, vel_y, vel_z);
    let resolved = match world().as_mut() {
        Some(physics) => physics
            .resolve_motion(position, velocity, dt)
            .unwrap_or_else(|e| {
                tracing::error!("native player motion failed: {e}");
                position
            }),
        None => position,
    };
    // SAFETY: caller guarantees three writable floats behind a non-null pointer.
    let out = unsafe { std::slice::from_raw_parts_mut(out_position, 3) };
    out.copy_from_slice(&resolved.to_array());
}

/// Non-zero when the point is inside solid ground.
#[unsafe(no_mangle)]
pub extern "C" fn checkCollision(pos_x: f32, pos_y: f32, pos_z: f32) -> c_int {
    let hit = world()
        .as_ref()
        .and_then(|physics| physics.query_collision(Vec3::new(pos_x, pos_y, pos_z)).ok())
        .unwrap_or(false);
    c_int::from(hit)
}
