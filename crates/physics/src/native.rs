use glam::Vec3;
use libloading::{Library, Symbol};
use meadow_kernel::{PhysicsBackend, PhysicsError};
use std::ffi::c_int;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

type InitFn = unsafe extern "C" fn();
type CleanupFn = unsafe extern "C" fn();
type UpdateFn = unsafe extern "C" fn(f32);
type UpdatePlayerFn = unsafe extern "C" fn(f32, f32, f32, f32, f32, f32, f32, *mut f32);
type CheckCollisionFn = unsafe extern "C" fn(f32, f32, f32) -> c_int;

/// Base name of the module; the platform prefix/suffix is added on lookup.
pub const DEFAULT_LIBRARY_NAME: &str = "physics";

/// Build-output directory, relative to the working directory, searched last.
pub const FALLBACK_DIR: &str = "target/natives";

/// One failed attempt to open the module.
#[derive(Debug, Clone)]
pub struct LoadAttempt {
    pub path: PathBuf,
    pub message: String,
}

/// Errors from locating and binding the native module.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("native physics module not found; tried:{}", render_attempts(.attempts))]
    NotFound { attempts: Vec<LoadAttempt> },
    #[error("native physics module {} lacks symbol `{symbol}`: {message}", .path.display())]
    MissingSymbol {
        path: PathBuf,
        symbol: &'static str,
        message: String,
    },
}

fn render_attempts(attempts: &[LoadAttempt]) -> String {
    let mut out = String::new();
    for a in attempts {
        let _ = write!(out, "\n  {} ({})", a.path.display(), a.message);
    }
    out
}

/// Where to look for the native module, in order:
/// 1. `explicit`, if set
/// 2. the platform library name, resolved by the system loader's search path
/// 3. `<fallback_root>/target/natives/<platform library name>`
#[derive(Debug, Clone)]
pub struct LibrarySearch {
    pub name: String,
    pub explicit: Option<PathBuf>,
    pub fallback_root: PathBuf,
}

impl Default for LibrarySearch {
    fn default() -> Self {
        Self {
            name: DEFAULT_LIBRARY_NAME.to_string(),
            explicit: None,
            fallback_root: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }
}

impl LibrarySearch {
    pub fn with_explicit(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit = Some(path.into());
        self
    }

    pub fn candidates(&self) -> Vec<PathBuf> {
        let file_name = PathBuf::from(libloading::library_filename(&self.name));
        let mut out = Vec::with_capacity(3);
        if let Some(p) = &self.explicit {
            out.push(p.clone());
        }
        out.push(file_name.clone());
        out.push(self.fallback_root.join(FALLBACK_DIR).join(file_name));
        out
    }
}

#[derive(Clone, Copy)]
struct Symbols {
    init: InitFn,
    cleanup: CleanupFn,
    update: UpdateFn,
    update_player: UpdatePlayerFn,
    check_collision: CheckCollisionFn,
}

/// Physics backend backed by a dynamically loaded module.
pub struct NativePhysics {
    symbols: Symbols,
    path: PathBuf,
    // Keeps the symbols valid; must stay the last field.
    _library: Library,
}

impl NativePhysics {
    /// Try each candidate in `search` and bind the first module that opens.
    pub fn load(search: &LibrarySearch) -> Result<Self, LoadError> {
        let mut attempts = Vec::new();
        for candidate in search.candidates() {
            tracing::debug!("trying native physics module {}", candidate.display());
            // SAFETY: opening runs the module's initializers; it is our own build output.
            match unsafe { Library::new(&candidate) } {
                Ok(library) => {
                    let native = Self::bind(library, candidate)?;
                    tracing::info!("loaded native physics module {}", native.path.display());
                    return Ok(native);
                }
                Err(e) => attempts.push(LoadAttempt {
                    path: candidate,
                    message: e.to_string(),
                }),
            }
        }
        Err(LoadError::NotFound { attempts })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn bind(library: Library, path: PathBuf) -> Result<Self, LoadError> {
        // SAFETY: the fn types mirror the module's exported C signatures.
        let symbols = unsafe {
            Symbols {
                init: lookup(&library, &path, "initPhysics")?,
                cleanup: lookup(&library, &path, "cleanupPhysics")?,
                update: lookup(&library, &path, "updatePhysics")?,
                update_player: lookup(&library, &path, "updatePlayerPhysics")?,
                check_collision: lookup(&library, &path, "checkCollision")?,
            }
        };
        Ok(Self {
            symbols,
            path,
            _library: library,
        })
    }
}

/// # Safety
/// `T` must be the exact function pointer type of the exported symbol.
unsafe fn lookup<T: Copy>(
    library: &Library,
    path: &Path,
    symbol: &'static str,
) -> Result<T, LoadError> {
    let sym: Symbol<T> =
        unsafe { library.get(symbol.as_bytes()) }.map_err(|e| LoadError::MissingSymbol {
            path: path.to_path_buf(),
            symbol,
            message: e.to_string(),
        })?;
    Ok(*sym)
}

impl PhysicsBackend for NativePhysics {
    fn name(&self) -> &str {
        "native"
    }

    fn init(&mut self) -> Result<(), PhysicsError> {
        // SAFETY: symbol bound from the loaded module, which outlives self.symbols.
        unsafe { (self.symbols.init)() };
        Ok(())
    }

    fn step(&mut self, dt: f32) -> Result<(), PhysicsError> {
        // SAFETY: as above.
        unsafe { (self.symbols.update)(dt) };
        Ok(())
    }

    fn resolve_motion(
        &mut self,
        position: Vec3,
        velocity: Vec3,
        dt: f32,
    ) -> Result<Vec3, PhysicsError> {
        let mut out = [0.0_f32; 3];
        // SAFETY: as above; `out` has room for the three floats written.
        unsafe {
            (self.symbols.update_player)(
                position.x,
                position.y,
                position.z,
                velocity.x,
                velocity.y,
                velocity.z,
                dt,
                out.as_mut_ptr(),
            )
        };
        Ok(Vec3::from_array(out))
    }

    fn query_collision(&self, position: Vec3) -> Result<bool, PhysicsError> {
        // SAFETY: as above.
        let hit = unsafe { (self.symbols.check_collision)(position.x, position.y, position.z) };
        Ok(hit != 0)
    }

    fn shutdown(&mut self) {
        // SAFETY: as above.
        unsafe { (self.symbols.cleanup)() };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_search() -> LibrarySearch {
        LibrarySearch {
            name: "meadow_no_such_physics_module".into(),
            explicit: Some(PathBuf::from("/nonexistent/meadow/libphysics.so")),
            fallback_root: PathBuf::from("/nonexistent/meadow-root"),
        }
    }

    #[test]
    fn candidates_in_search_order() {
        let search = LibrarySearch {
            name: "physics".into(),
            explicit: Some(PathBuf::from("/opt/custom/libphysics.so")),
            fallback_root: PathBuf::from("/work"),
        };
        let file = PathBuf::from(libloading::library_filename("physics"));
        assert_eq!(
            search.candidates(),
            vec![
                PathBuf::from("/opt/custom/libphysics.so"),
                file.clone(),
                PathBuf::from("/work/target/natives").join(file),
            ]
        );
    }

    #[test]
    fn no_explicit_path_gives_two_candidates() {
        let search = LibrarySearch::default();
        assert_eq!(search.candidates().len(), 2);
        assert_eq!(search.name, DEFAULT_LIBRARY_NAME);
    }

    #[test]
    fn missing_module_lists_every_attempt() {
        let err = match NativePhysics::load(&missing_search()) {
            Ok(_) => panic!("module should not load"),
            Err(e) => e,
        };
        let LoadError::NotFound { attempts } = &err else {
            panic!("unexpected error {err}");
        };
        assert_eq!(attempts.len(), 3);
        let text = err.to_string();
        assert!(text.contains("/nonexistent/meadow/libphysics.so"));
        assert!(text.contains("/nonexistent/meadow-root"));
        assert!(text.contains("meadow_no_such_physics_module"));
    }
}
