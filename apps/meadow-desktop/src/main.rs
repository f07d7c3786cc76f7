use anyhow::{Context, Result, anyhow};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec2;
use meadow_input::{Action, InputFrame, MovementKeys};
use meadow_kernel::{FrameClock, FrameReport, PhysicsBackend, SimConfig, SimError, Simulation};
use meadow_physics::{LibrarySearch, PhysicsKind, open_backend};
use meadow_render::{GrassField, RenderView, SceneFrame, WINDOW_HEIGHT, WINDOW_WIDTH};
use meadow_render_wgpu::WgpuRenderer;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

#[derive(Parser)]
#[command(name = "meadow-desktop", about = "Walk around a small grassy meadow")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON simulation config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Physics backend: native or software
    #[arg(long, default_value_t = PhysicsKind::Native)]
    physics: PhysicsKind,

    /// Native physics module, tried before the standard search
    #[arg(long)]
    physics_lib: Option<PathBuf>,

    /// Seed for the grass layout
    #[arg(long, default_value_t = 42)]
    grass_seed: u64,

    /// Override the player's impulse speed
    #[arg(long)]
    speed: Option<f32>,

    /// Override mouse sensitivity
    #[arg(long)]
    sensitivity: Option<f32>,
}

impl Cli {
    fn sim_config(&self) -> Result<SimConfig> {
        let mut config = match &self.config {
            Some(path) => SimConfig::load(path)?,
            None => SimConfig::default(),
        };
        if let Some(speed) = self.speed {
            config.player_speed = speed;
        }
        if let Some(sensitivity) = self.sensitivity {
            config.mouse_sensitivity = sensitivity;
        }
        config.validate()?;
        Ok(config)
    }

    fn library_search(&self) -> LibrarySearch {
        let search = LibrarySearch::default();
        match &self.physics_lib {
            Some(path) => search.with_explicit(path),
            None => search,
        }
    }
}

fn action_for(key: KeyCode) -> Option<Action> {
    match key {
        KeyCode::KeyW => Some(Action::MoveForward),
        KeyCode::KeyS => Some(Action::MoveBackward),
        KeyCode::KeyA => Some(Action::StrafeLeft),
        KeyCode::KeyD => Some(Action::StrafeRight),
        KeyCode::Escape => Some(Action::Quit),
        _ => None,
    }
}

/// Everything that is not GPU plumbing.
struct AppState {
    sim: Simulation<Box<dyn PhysicsBackend>>,
    grass: GrassField,
    keys: MovementKeys,
    /// Virtual cursor: the running sum of raw mouse motion.
    cursor: Vec2,
    cursor_moved: bool,
    focused: bool,
    quit_requested: bool,
    clock: FrameClock,
    started: Instant,
    aspect: f32,
    show_overlay: bool,
    last_report: Option<FrameReport>,
}

impl AppState {
    fn new(sim: Simulation<Box<dyn PhysicsBackend>>, grass: GrassField, started: Instant) -> Self {
        let clock = FrameClock::new(sim.config().max_frame_dt);
        Self {
            sim,
            grass,
            keys: MovementKeys::none(),
            cursor: Vec2::ZERO,
            cursor_moved: false,
            focused: true,
            quit_requested: false,
            clock,
            started,
            aspect: WINDOW_WIDTH as f32 / WINDOW_HEIGHT as f32,
            show_overlay: false,
            last_report: None,
        }
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        match action_for(key) {
            // Quit fires on release so the key-up does not leak into anything else.
            Some(Action::Quit) => {
                if !pressed {
                    self.quit_requested = true;
                }
            }
            Some(action) => self.keys.set(action, pressed),
            None => {
                if pressed && key == KeyCode::F1 {
                    self.show_overlay = !self.show_overlay;
                }
            }
        }
    }

    fn mouse_motion(&mut self, dx: f32, dy: f32) {
        if !self.focused {
            return;
        }
        self.cursor += Vec2::new(dx, dy);
        self.cursor_moved = true;
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        if !focused {
            self.keys = MovementKeys::none();
            self.cursor_moved = false;
            self.sim.reset_mouse();
        }
    }

    fn advance(&mut self, now: f64) -> Result<FrameReport, SimError> {
        let dt = self.clock.tick(now);
        let mut input = InputFrame::keys(self.keys);
        if std::mem::take(&mut self.cursor_moved) {
            input = input.with_cursor(self.cursor);
        }
        let report = self.sim.step(&input, dt)?;
        self.last_report = Some(report);
        Ok(report)
    }

    fn scene(&self) -> SceneFrame {
        SceneFrame::compose(
            self.sim.frame(),
            RenderView::from_camera(self.sim.camera(), self.aspect),
            self.sim.player().position,
            &self.grass,
        )
    }

    fn draw_overlay(&self, ctx: &EguiContext) {
        if !self.show_overlay {
            return;
        }
        let player = self.sim.player();
        let orientation = self.sim.camera().orientation;

        egui::SidePanel::left("debug_overlay")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Meadow");
                ui.separator();
                ui.label(format!("Frame: {}", self.sim.frame()));
                if let Some(report) = &self.last_report {
                    ui.label(format!("dt: {:.4} s", report.dt));
                }
                ui.label(format!(
                    "Position: ({:.2}, {:.2}, {:.2})",
                    player.position.x, player.position.y, player.position.z
                ));
                ui.label(format!(
                    "Velocity: ({:.2}, {:.2}, {:.2})",
                    player.velocity.x, player.velocity.y, player.velocity.z
                ));
                ui.label(format!(
                    "Yaw: {:.1}  Pitch: {:.1}",
                    orientation.yaw(),
                    orientation.pitch()
                ));
                ui.separator();
                ui.label(format!("Physics: {}", self.sim.physics().backend().name()));
                ui.label(format!("Grass blades: {}", self.grass.len()));
                ui.separator();
                ui.label("WASD move, mouse look, F1 overlay, Esc quit");
            });
    }
}

struct GpuApp {
    state: AppState,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    config: Option<wgpu::SurfaceConfiguration>,
    renderer: Option<WgpuRenderer>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
    fatal: Option<anyhow::Error>,
    torn_down: bool,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            window: None,
            surface: None,
            device: None,
            queue: None,
            config: None,
            renderer: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
            fatal: None,
            torn_down: false,
        }
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("Meadow")
            .with_inner_size(PhysicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no compatible GPU adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("meadow_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface reports no texture formats"))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        self.state.aspect = config.width as f32 / config.height as f32;

        let renderer = WgpuRenderer::new(&device, surface_format, config.width, config.height);

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        capture_cursor(&window);

        tracing::info!(
            "GPU initialized with {} backend on {}",
            adapter.get_info().backend.to_str(),
            adapter.get_info().name
        );

        self.window = Some(window);
        self.surface = Some(surface);
        self.device = Some(device);
        self.queue = Some(queue);
        self.config = Some(config);
        self.renderer = Some(renderer);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        tracing::error!("{err:#}");
        self.fatal = Some(err);
        event_loop.exit();
    }

    fn draw_frame(&mut self) {
        let (Some(window), Some(surface), Some(device), Some(queue), Some(config), Some(renderer)) = (
            &self.window,
            &self.surface,
            &self.device,
            &self.queue,
            &self.config,
            &self.renderer,
        ) else {
            return;
        };

        let output = match surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                surface.configure(device, config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        renderer.render(device, queue, &view, &self.state.scene());

        if let (Some(egui_winit), Some(egui_renderer)) =
            (&mut self.egui_winit, &mut self.egui_renderer)
        {
            let raw_input = egui_winit.take_egui_input(window);
            let full_output = self.egui_ctx.run(raw_input, |ctx| {
                self.state.draw_overlay(ctx);
            });
            egui_winit.handle_platform_output(window, full_output.platform_output);

            let paint_jobs = self
                .egui_ctx
                .tessellate(full_output.shapes, full_output.pixels_per_point);
            let screen_descriptor = egui_wgpu::ScreenDescriptor {
                size_in_pixels: [config.width, config.height],
                pixels_per_point: full_output.pixels_per_point,
            };

            for (id, image_delta) in &full_output.textures_delta.set {
                egui_renderer.update_texture(device, queue, *id, image_delta);
            }
            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
            egui_renderer.update_buffers(
                device,
                queue,
                &mut encoder,
                &paint_jobs,
                &screen_descriptor,
            );
            {
                let mut pass = encoder
                    .begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("egui_pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Load,
                                store: wgpu::StoreOp::Store,
                            },
                        })],
                        depth_stencil_attachment: None,
                        ..Default::default()
                    })
                    .forget_lifetime();
                egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
            }
            queue.submit(std::iter::once(encoder.finish()));
            for id in &full_output.textures_delta.free {
                egui_renderer.free_texture(id);
            }
        }

        output.present();
        window.request_redraw();
    }

    /// Release everything in dependency order: stop the simulation, drop GPU
    /// resources, shut physics down, then drop the window. Runs once.
    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        self.state.sim.stop();

        self.egui_renderer = None;
        self.egui_winit = None;
        self.renderer = None;
        self.surface = None;
        self.queue = None;
        self.device = None;
        self.config = None;

        self.state.sim.shutdown();

        self.window = None;
        tracing::info!(frames = self.state.sim.frame(), "meadow-desktop shut down");
    }
}

fn capture_cursor(window: &Window) {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Confined)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked));
    if let Err(e) = grabbed {
        tracing::warn!("cursor grab unavailable: {e}");
    }
    window.set_cursor_visible(false);
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.torn_down {
            return;
        }
        if let Err(e) = self.init_gpu(event_loop) {
            self.fail(event_loop, e.context("graphics initialization failed"));
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(egui_winit), Some(window)) = (&mut self.egui_winit, &self.window) {
            let response = egui_winit.on_window_event(window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.state.quit_requested = true;
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let (Some(surface), Some(device), Some(config)) =
                    (&self.surface, &self.device, &mut self.config)
                {
                    config.width = new_size.width.max(1);
                    config.height = new_size.height.max(1);
                    surface.configure(device, config);
                    self.state.aspect = config.width as f32 / config.height as f32;
                    if let Some(renderer) = &mut self.renderer {
                        renderer.resize(device, config.width, config.height);
                    }
                }
            }
            WindowEvent::Focused(focused) => {
                self.state.set_focused(focused);
                if focused {
                    if let Some(window) = &self.window {
                        capture_cursor(window);
                    }
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.state
                    .handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::RedrawRequested => {
                if self.state.quit_requested {
                    event_loop.exit();
                    return;
                }
                let now = self.state.started.elapsed().as_secs_f64();
                if let Err(e) = self.state.advance(now) {
                    self.fail(event_loop, anyhow::Error::new(e).context("simulation stopped"));
                    return;
                }
                self.draw_frame();
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.state.mouse_motion(delta.0 as f32, delta.1 as f32);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.teardown();
    }
}

fn main() -> Result<()> {
    let started = Instant::now();
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("meadow-desktop starting");

    let config = cli.sim_config()?;
    let backend = open_backend(cli.physics, &cli.library_search())
        .with_context(|| format!("cannot start {} physics", cli.physics))?;
    let sim = Simulation::new(config, backend)?;
    let grass = GrassField::new(cli.grass_seed);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(AppState::new(sim, grass, started));
    let run = event_loop.run_app(&mut app);
    app.teardown();
    run?;

    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use meadow_kernel::PhysicsError;
    use meadow_physics::GroundPlanePhysics;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Ground plane that counts how often it is shut down.
    struct CountingShutdown {
        inner: GroundPlanePhysics,
        shutdowns: Rc<Cell<u32>>,
    }

    impl PhysicsBackend for CountingShutdown {
        fn name(&self) -> &str {
            "counting"
        }
        fn init(&mut self) -> Result<(), PhysicsError> {
            self.inner.init()
        }
        fn step(&mut self, dt: f32) -> Result<(), PhysicsError> {
            self.inner.step(dt)
        }
        fn resolve_motion(&mut self, p: Vec3, v: Vec3, dt: f32) -> Result<Vec3, PhysicsError> {
            self.inner.resolve_motion(p, v, dt)
        }
        fn query_collision(&self, p: Vec3) -> Result<bool, PhysicsError> {
            self.inner.query_collision(p)
        }
        fn shutdown(&mut self) {
            self.shutdowns.set(self.shutdowns.get() + 1);
            self.inner.shutdown();
        }
    }

    fn state() -> AppState {
        let backend: Box<dyn PhysicsBackend> = Box::new(GroundPlanePhysics::new());
        let sim = Simulation::new(SimConfig::default(), backend).unwrap();
        AppState::new(sim, GrassField::empty(), Instant::now())
    }

    #[test]
    fn teardown_twice_shuts_physics_down_once() {
        let shutdowns = Rc::new(Cell::new(0));
        let backend: Box<dyn PhysicsBackend> = Box::new(CountingShutdown {
            inner: GroundPlanePhysics::new(),
            shutdowns: shutdowns.clone(),
        });
        let sim = Simulation::new(SimConfig::default(), backend).unwrap();
        let mut app = GpuApp::new(AppState::new(sim, GrassField::empty(), Instant::now()));

        app.teardown();
        app.teardown();
        assert!(app.torn_down);
        assert!(!app.state.sim.is_running());
        assert!(app.state.sim.physics().is_shut_down());
        assert_eq!(shutdowns.get(), 1);

        drop(app);
        assert_eq!(shutdowns.get(), 1);
    }

    #[test]
    fn escape_quits_on_release_only() {
        let mut s = state();
        s.handle_key(KeyCode::Escape, true);
        assert!(!s.quit_requested);
        s.handle_key(KeyCode::Escape, false);
        assert!(s.quit_requested);
    }

    #[test]
    fn wasd_maps_to_movement() {
        let mut s = state();
        s.handle_key(KeyCode::KeyW, true);
        s.handle_key(KeyCode::KeyD, true);
        assert!(s.keys.forward && s.keys.right);
        s.handle_key(KeyCode::KeyW, false);
        assert!(!s.keys.forward);
        assert_eq!(action_for(KeyCode::KeyQ), None);
    }

    #[test]
    fn f1_toggles_overlay() {
        let mut s = state();
        s.handle_key(KeyCode::F1, true);
        s.handle_key(KeyCode::F1, false);
        assert!(s.show_overlay);
    }

    #[test]
    fn cursor_motion_reaches_orientation_after_first_sample() {
        let mut s = state();
        s.mouse_motion(5.0, 0.0);
        s.advance(0.016).unwrap();
        assert_eq!(s.sim.camera().orientation.yaw(), -90.0);
        s.mouse_motion(10.0, 0.0);
        s.advance(0.032).unwrap();
        assert!((s.sim.camera().orientation.yaw() - -89.0).abs() < 1e-4);
    }

    #[test]
    fn focus_loss_releases_keys_and_rearms_mouse() {
        let mut s = state();
        s.handle_key(KeyCode::KeyW, true);
        s.mouse_motion(1.0, 1.0);
        s.advance(0.016).unwrap();
        s.set_focused(false);
        assert!(!s.keys.any());
        s.mouse_motion(100.0, 0.0);
        assert!(!s.cursor_moved);
        s.set_focused(true);
        s.mouse_motion(50.0, 0.0);
        s.advance(0.032).unwrap();
        assert_eq!(s.sim.camera().orientation.yaw(), -90.0);
    }

    #[test]
    fn scene_tracks_player() {
        let mut s = state();
        s.advance(0.016).unwrap();
        let scene = s.scene();
        assert_eq!(scene.player_position(), Some(s.sim.player().position));
        assert_eq!(scene.view.eye, s.sim.camera().position());
    }

    #[test]
    fn config_overrides_apply() {
        let cli = Cli::parse_from(["meadow-desktop", "--speed", "7", "--physics", "software"]);
        assert_eq!(cli.physics, PhysicsKind::Software);
        assert_eq!(cli.sim_config().unwrap().player_speed, 7.0);
        assert!(cli.library_search().explicit.is_none());
    }
}
