use crate::scene::{MeshKind, SceneFrame};
use glam::{Mat4, Vec3};
use meadow_common::Orientation;
use meadow_kernel::FollowCamera;
use std::fmt::Write as _;

/// Vertical field of view in degrees.
pub const FOV_DEGREES: f32 = 45.0;
pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 100.0;
pub const WINDOW_WIDTH: u32 = 800;
pub const WINDOW_HEIGHT: u32 = 600;
/// Linear RGBA.
pub const CLEAR_COLOR: [f64; 4] = [0.2, 0.3, 0.4, 1.0];

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    pub orientation: Orientation,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Width over height.
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 2.0, 5.0),
            orientation: Orientation::default(),
            fov_degrees: FOV_DEGREES,
            aspect: WINDOW_WIDTH as f32 / WINDOW_HEIGHT as f32,
            near: NEAR_PLANE,
            far: FAR_PLANE,
        }
    }
}

impl RenderView {
    pub fn from_camera(camera: &FollowCamera, aspect: f32) -> Self {
        Self {
            eye: camera.position(),
            orientation: camera.orientation,
            aspect,
            ..Self::default()
        }
    }

    pub fn view(&self) -> Mat4 {
        self.orientation.view_matrix(self.eye)
    }

    /// Right-handed perspective with a [0, 1] depth range.
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer only reads the frame it is given; it has no handle on the
/// simulation.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    fn render(&mut self, frame: &SceneFrame) -> Self::Output;
}

/// Produces a human-readable description of a frame.
///
/// Used by the CLI and in tests in place of a GPU.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&mut self, frame: &SceneFrame) -> String {
        let view = &frame.view;
        let mut out = String::new();
        let _ = writeln!(out, "=== Frame {} ===", frame.frame);
        let _ = writeln!(
            out,
            "Camera: eye=({:.2}, {:.2}, {:.2}) yaw={:.1} pitch={:.1} fov={:.0}",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.orientation.yaw(),
            view.orientation.pitch(),
            view.fov_degrees
        );
        if let Some(p) = frame.player_position() {
            let _ = writeln!(out, "Player: pos=({:.2}, {:.2}, {:.2})", p.x, p.y, p.z);
        }
        let _ = writeln!(
            out,
            "Draws: floor={} cube={} grass_quads={}",
            frame.count(MeshKind::Floor),
            frame.count(MeshKind::PlayerCube),
            frame.count(MeshKind::GrassBlade)
        );
        out
    }
}
