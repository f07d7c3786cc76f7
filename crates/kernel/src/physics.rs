use glam::Vec3;

/// Errors surfaced by the physics bridge.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PhysicsError {
    #[error("physics bridge used before initialize()")]
    NotInitialized,
    #[error("physics bridge initialized twice")]
    AlreadyInitialized,
    #[error("physics bridge used after shutdown()")]
    ShutDown,
    #[error("physics backend returned a non-finite position {0}")]
    NonFinite(Vec3),
    #[error("physics backend failure: {0}")]
    Backend(String),
}

/// Capability interface to a physics implementation.
///
/// The simulation only ever talks to physics through this trait. Backends
/// may be a loaded native module or plain Rust. Call ordering is enforced by
/// [`PhysicsBridge`], not by backends.
pub trait PhysicsBackend {
    /// Short human-readable backend name for logs.
    fn name(&self) -> &str;

    fn init(&mut self) -> Result<(), PhysicsError>;

    /// Advance backend-internal state by `dt` seconds.
    fn step(&mut self, dt: f32) -> Result<(), PhysicsError>;

    /// Constrained new position for a body at `position` moving at
    /// `velocity` for `dt` seconds. Velocity is not reported back.
    fn resolve_motion(
        &mut self,
        position: Vec3,
        velocity: Vec3,
        dt: f32,
    ) -> Result<Vec3, PhysicsError>;

    /// Point-in-solid test.
    fn query_collision(&self, position: Vec3) -> Result<bool, PhysicsError>;

    fn shutdown(&mut self);
}

impl<B: PhysicsBackend + ?Sized> PhysicsBackend for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn init(&mut self) -> Result<(), PhysicsError> {
        (**self).init()
    }

    fn step(&mut self, dt: f32) -> Result<(), PhysicsError> {
        (**self).step(dt)
    }

    fn resolve_motion(
        &mut self,
        position: Vec3,
        velocity: Vec3,
        dt: f32,
    ) -> Result<Vec3, PhysicsError> {
        (**self).resolve_motion(position, velocity, dt)
    }

    fn query_collision(&self, position: Vec3) -> Result<bool, PhysicsError> {
        (**self).query_collision(position)
    }

    fn shutdown(&mut self) {
        (**self).shutdown()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BridgeState {
    Uninitialized,
    Ready,
    ShutDown,
}

/// Lifecycle guard around a [`PhysicsBackend`].
///
/// - `initialize` succeeds exactly once.
/// - `step`, `resolve_player_motion` and `query_collision` require `Ready`.
/// - `shutdown` reaches the backend at most once; later calls are no-ops.
/// - Dropping a ready bridge shuts the backend down.
pub struct PhysicsBridge<B: PhysicsBackend> {
    backend: B,
    state: BridgeState,
}

impl<B: PhysicsBackend> PhysicsBridge<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: BridgeState::Uninitialized,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn is_ready(&self) -> bool {
        self.state == BridgeState::Ready
    }

    pub fn is_shut_down(&self) -> bool {
        self.state == BridgeState::ShutDown
    }

    pub fn initialize(&mut self) -> Result<(), PhysicsError> {
        match self.state {
            BridgeState::Uninitialized => {}
            BridgeState::Ready => return Err(PhysicsError::AlreadyInitialized),
            BridgeState::ShutDown => return Err(PhysicsError::ShutDown),
        }
        self.backend.init()?;
        self.state = BridgeState::Ready;
        tracing::info!(backend = self.backend.name(), "physics initialized");
        Ok(())
    }

    pub fn step(&mut self, dt: f32) -> Result<(), PhysicsError> {
        self.ensure_ready()?;
        self.backend.step(dt)
    }

    /// Ask the backend where the player ends up this frame.
    ///
    /// A non-finite answer is reported as an error rather than handed back.
    pub fn resolve_player_motion(
        &mut self,
        position: Vec3,
        velocity: Vec3,
        dt: f32,
    ) -> Result<Vec3, PhysicsError> {
        self.ensure_ready()?;
        let resolved = self.backend.resolve_motion(position, velocity, dt)?;
        if !resolved.is_finite() {
            return Err(PhysicsError::NonFinite(resolved));
        }
        Ok(resolved)
    }

    pub fn query_collision(&self, position: Vec3) -> Result<bool, PhysicsError> {
        self.ensure_ready()?;
        self.backend.query_collision(position)
    }

    /// Release the backend. Returns `true` only for the call that actually
    /// shut it down.
    pub fn shutdown(&mut self) -> bool {
        match self.state {
            BridgeState::Ready => {
                self.backend.shutdown();
                self.state = BridgeState::ShutDown;
                tracing::info!(backend = self.backend.name(), "physics shut down");
                true
            }
            BridgeState::Uninitialized => {
                self.state = BridgeState::ShutDown;
                false
            }
            BridgeState::ShutDown => false,
        }
    }

    fn ensure_ready(&self) -> Result<(), PhysicsError> {
        match self.state {
            BridgeState::Ready => Ok(()),
            BridgeState::Uninitialized => Err(PhysicsError::NotInitialized),
            BridgeState::ShutDown => Err(PhysicsError::ShutDown),
        }
    }
}

impl<B: PhysicsBackend> Drop for PhysicsBridge<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Backend with no world: bodies move freely along their velocity and
/// nothing is solid.
#[derive(Debug, Default)]
pub struct FreeSpacePhysics {
    steps: u64,
}

impl FreeSpacePhysics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }
}

impl PhysicsBackend for FreeSpacePhysics {
    fn name(&self) -> &str {
        "free-space"
    }

    fn init(&mut self) -> Result<(), PhysicsError> {
        self.steps = 0;
        Ok(())
    }

    fn step(&mut self, _dt: f32) -> Result<(), PhysicsError> {
        self.steps += 1;
        Ok(())
    }

    fn resolve_motion(
        &mut self,
        position: Vec3,
        velocity: Vec3,
        dt: f32,
    ) -> Result<Vec3, PhysicsError> {
        Ok(position + velocity * dt)
    }

    fn query_collision(&self, _position: Vec3) -> Result<bool, PhysicsError> {
        Ok(false)
    }

    fn shutdown(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Counts calls into a shared log so the test can inspect them after
    /// the bridge (and its backend) have been dropped.
    #[derive(Default)]
    struct Counting {
        log: Rc<RefCell<Vec<&'static str>>>,
        answer: Option<Vec3>,
    }

    impl PhysicsBackend for Counting {
        fn name(&self) -> &str {
            "counting"
        }
        fn init(&mut self) -> Result<(), PhysicsError> {
            self.log.borrow_mut().push("init");
            Ok(())
        }
        fn step(&mut self, _dt: f32) -> Result<(), PhysicsError> {
            self.log.borrow_mut().push("step");
            Ok(())
        }
        fn resolve_motion(&mut self, p: Vec3, _v: Vec3, _dt: f32) -> Result<Vec3, PhysicsError> {
            self.log.borrow_mut().push("resolve");
            Ok(self.answer.unwrap_or(p))
        }
        fn query_collision(&self, p: Vec3) -> Result<bool, PhysicsError> {
            Ok(p.y < 0.0)
        }
        fn shutdown(&mut self) {
            self.log.borrow_mut().push("shutdown");
        }
    }

    #[test]
    fn calls_before_initialize_fail() {
        let mut bridge = PhysicsBridge::new(Counting::default());
        assert_eq!(bridge.step(0.1), Err(PhysicsError::NotInitialized));
        assert_eq!(
            bridge.resolve_player_motion(Vec3::ZERO, Vec3::ZERO, 0.1),
            Err(PhysicsError::NotInitialized)
        );
        assert_eq!(bridge.query_collision(Vec3::ZERO), Err(PhysicsError::NotInitialized));
    }

    #[test]
    fn initialize_only_once() {
        let mut bridge = PhysicsBridge::new(Counting::default());
        assert!(bridge.initialize().is_ok());
        assert_eq!(bridge.initialize(), Err(PhysicsError::AlreadyInitialized));
        assert!(bridge.is_ready());
    }

    #[test]
    fn shutdown_is_idempotent() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bridge = PhysicsBridge::new(Counting {
            log: log.clone(),
            answer: None,
        });
        bridge.initialize().unwrap();
        assert!(bridge.shutdown());
        assert!(!bridge.shutdown());
        drop(bridge);
        let shutdowns = log.borrow().iter().filter(|c| **c == "shutdown").count();
        assert_eq!(shutdowns, 1);
    }

    #[test]
    fn drop_shuts_down_ready_backend() {
        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let mut bridge = PhysicsBridge::new(Counting {
                log: log.clone(),
                answer: None,
            });
            bridge.initialize().unwrap();
        }
        assert_eq!(*log.borrow(), vec!["init", "shutdown"]);
    }

    #[test]
    fn drop_without_initialize_does_not_shut_down() {
        let log = Rc::new(RefCell::new(Vec::new()));
        drop(PhysicsBridge::new(Counting {
            log: log.clone(),
            answer: None,
        }));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn calls_after_shutdown_fail() {
        let mut bridge = PhysicsBridge::new(Counting::default());
        bridge.initialize().unwrap();
        bridge.shutdown();
        assert_eq!(bridge.step(0.1), Err(PhysicsError::ShutDown));
        assert_eq!(bridge.initialize(), Err(PhysicsError::ShutDown));
    }

    #[test]
    fn non_finite_resolution_is_an_error() {
        let mut bridge = PhysicsBridge::new(Counting {
            log: Rc::default(),
            answer: Some(Vec3::new(f32::NAN, 0.0, 0.0)),
        });
        bridge.initialize().unwrap();
        let err = bridge
            .resolve_player_motion(Vec3::ZERO, Vec3::ZERO, 0.1)
            .unwrap_err();
        assert!(matches!(err, PhysicsError::NonFinite(_)));
    }

    #[test]
    fn boxed_backend_forwards_calls() {
        let boxed: Box<dyn PhysicsBackend> = Box::new(FreeSpacePhysics::new());
        let mut bridge = PhysicsBridge::new(boxed);
        bridge.initialize().unwrap();
        let p = bridge
            .resolve_player_motion(Vec3::ZERO, Vec3::new(1.0, 0.0, 2.0), 0.5)
            .unwrap();
        assert_eq!(p, Vec3::new(0.5, 0.0, 1.0));
        assert_eq!(bridge.backend().name(), "free-space");
        assert!(!bridge.query_collision(Vec3::ZERO).unwrap());
    }
}
