//! wgpu render backend for the meadow scene.
//!
//! Static meshes (floor, player cube, grass blade) are uploaded once; each
//! frame only rewrites the uniform and instance buffers.
//!
//! # Invariants
//! - Renderer never mutates simulation state.
//! - No GPU buffers are created in the per-frame path.

mod gpu;
mod shaders;

pub use gpu::WgpuRenderer;
