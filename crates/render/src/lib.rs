//! Render Adapter: renderer-agnostic scene contract.
//!
//! # Invariants
//! - Renderers never mutate simulation state.
//! - A [`SceneFrame`] is derived from the camera and the player position
//!   alone; nothing flows back from rendering into the simulation.
//! - Decorative geometry is generated once and is immutable afterwards.

mod grass;
mod mesh;
mod renderer;
mod scene;

pub use grass::{DEFAULT_GRASS_COUNT, GrassBlade, GrassField};
pub use mesh::{MeshData, MeshVertex};
pub use renderer::{
    CLEAR_COLOR, DebugTextRenderer, FAR_PLANE, FOV_DEGREES, NEAR_PLANE, RenderView, Renderer,
    WINDOW_HEIGHT, WINDOW_WIDTH,
};
pub use scene::{DrawItem, MeshKind, SceneFrame};
