//! Physics backends behind the kernel's `PhysicsBackend` trait.
//!
//! - [`NativePhysics`]: a dynamically loaded module exposing the numeric C ABI
//!   (`initPhysics`, `cleanupPhysics`, `updatePhysics`, `updatePlayerPhysics`,
//!   `checkCollision`).
//! - [`GroundPlanePhysics`]: the same behaviour in plain Rust.
//!
//! # Invariants
//! - A failed native load reports every path that was tried.
//! - Symbols are only called while the library that owns them is loaded.

pub mod native;
pub mod software;

pub use native::{LibrarySearch, LoadAttempt, LoadError, NativePhysics};
pub use software::GroundPlanePhysics;

use meadow_kernel::PhysicsBackend;
use std::fmt;
use std::str::FromStr;

/// Which backend to run the simulation on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhysicsKind {
    #[default]
    Native,
    Software,
}

impl fmt::Display for PhysicsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicsKind::Native => f.write_str("native"),
            PhysicsKind::Software => f.write_str("software"),
        }
    }
}

impl FromStr for PhysicsKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "native" => Ok(PhysicsKind::Native),
            "software" => Ok(PhysicsKind::Software),
            other => Err(format!("unknown physics backend {other:?}")),
        }
    }
}

/// Open the requested backend. Only the native backend can fail here.
pub fn open_backend(
    kind: PhysicsKind,
    search: &LibrarySearch,
) -> Result<Box<dyn PhysicsBackend>, LoadError> {
    match kind {
        PhysicsKind::Native => Ok(Box::new(NativePhysics::load(search)?)),
        PhysicsKind::Software => Ok(Box::new(GroundPlanePhysics::new())),
    }
}
