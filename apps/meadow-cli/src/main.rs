use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use glam::{Vec2, Vec3};
use meadow_input::{Action, InputFrame, MovementKeys};
use meadow_kernel::{FrameReport, PhysicsBackend, SimConfig, Simulation};
use meadow_physics::{LibrarySearch, PhysicsKind, open_backend};
use meadow_render::{DebugTextRenderer, GrassField, RenderView, Renderer, SceneFrame};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "meadow-cli", about = "Headless driver for the meadow simulation")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PhysicsArgs {
    /// Physics backend: native or software
    #[arg(long, default_value_t = PhysicsKind::Software)]
    physics: PhysicsKind,

    /// Native physics module, tried before the standard search
    #[arg(long)]
    physics_lib: Option<PathBuf>,

    /// JSON simulation config
    #[arg(long)]
    config: Option<PathBuf>,
}

impl PhysicsArgs {
    fn open(&self) -> Result<Simulation<Box<dyn PhysicsBackend>>> {
        let config = match &self.config {
            Some(path) => SimConfig::load(path)?,
            None => SimConfig::default(),
        };
        let mut search = LibrarySearch::default();
        if let Some(path) = &self.physics_lib {
            search = search.with_explicit(path);
        }
        let backend = open_backend(self.physics, &search)
            .with_context(|| format!("cannot start {} physics", self.physics))?;
        Ok(Simulation::new(config, backend)?)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print version, default config and physics search paths
    Info,
    /// Run a scripted number of frames and print the final state
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "60")]
        frames: u64,
        /// Seconds per frame, capped at the config's max_frame_dt
        #[arg(long, default_value = "0.016", value_parser = parse_dt)]
        dt: f32,
        /// Movement keys held for the whole run, e.g. forward,left
        #[arg(long, value_delimiter = ',')]
        hold: Vec<Action>,
        /// Cursor movement per frame as DX,DY
        #[arg(long, value_parser = parse_pair, allow_hyphen_values = true)]
        mouse: Option<Vec2>,
        /// Seed for the grass layout in the rendered frame
        #[arg(long, default_value = "42")]
        grass_seed: u64,
        /// Print the final frame report as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        physics: PhysicsArgs,
    },
    /// Ask the physics backend whether a point is inside solid ground
    Probe {
        #[arg(allow_negative_numbers = true)]
        x: f32,
        #[arg(allow_negative_numbers = true)]
        y: f32,
        #[arg(allow_negative_numbers = true)]
        z: f32,
        #[command(flatten)]
        physics: PhysicsArgs,
    },
}

fn parse_pair(s: &str) -> Result<Vec2, String> {
    let (a, b) = s
        .split_once(',')
        .ok_or_else(|| format!("expected DX,DY, got {s:?}"))?;
    let x = a.trim().parse::<f32>().map_err(|e| format!("bad DX {a:?}: {e}"))?;
    let y = b.trim().parse::<f32>().map_err(|e| format!("bad DY {b:?}: {e}"))?;
    Ok(Vec2::new(x, y))
}

fn parse_dt(s: &str) -> Result<f32, String> {
    let dt = s
        .trim()
        .parse::<f32>()
        .map_err(|e| format!("bad dt {s:?}: {e}"))?;
    if !dt.is_finite() || dt < 0.0 {
        return Err(format!("dt must be a finite, non-negative number of seconds, got {s:?}"));
    }
    Ok(dt)
}

/// Scripted run: the same keys every frame, the cursor moving by `mouse`
/// each frame from the origin.
struct Script {
    frames: u64,
    dt: f32,
    keys: MovementKeys,
    mouse: Option<Vec2>,
}

fn run_script<B: PhysicsBackend>(
    sim: &mut Simulation<B>,
    script: &Script,
) -> Result<Option<FrameReport>> {
    let dt = script.dt.min(sim.config().max_frame_dt);
    if dt < script.dt {
        tracing::debug!(requested = script.dt, dt, "frame dt capped");
    }
    let mut cursor = Vec2::ZERO;
    let mut last = None;
    for _ in 0..script.frames {
        let mut input = InputFrame::keys(script.keys);
        if let Some(step) = script.mouse {
            input = input.with_cursor(cursor);
            cursor += step;
        }
        last = Some(sim.step(&input, dt)?);
    }
    Ok(last)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            println!("meadow-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("default config:");
            println!("{}", serde_json::to_string_pretty(&SimConfig::default())?);
            println!("native physics search order:");
            for candidate in LibrarySearch::default().candidates() {
                println!("  {}", candidate.display());
            }
        }
        Commands::Simulate {
            frames,
            dt,
            hold,
            mouse,
            grass_seed,
            json,
            physics,
        } => {
            let mut sim = physics.open()?;
            let script = Script {
                frames,
                dt,
                keys: MovementKeys::holding(&hold),
                mouse,
            };
            let result = run_script(&mut sim, &script);
            sim.shutdown();
            let report = result?;
            tracing::info!(frames = sim.frame(), "scripted run finished");

            if json {
                match &report {
                    Some(report) => println!("{}", serde_json::to_string_pretty(report)?),
                    None => println!("null"),
                }
            } else {
                let frame = SceneFrame::compose(
                    sim.frame(),
                    RenderView::from_camera(sim.camera(), RenderView::default().aspect),
                    sim.player().position,
                    &GrassField::new(grass_seed),
                );
                print!("{}", DebugTextRenderer::new().render(&frame));
                let v = sim.player().velocity;
                println!("Velocity: ({:.3}, {:.3}, {:.3})", v.x, v.y, v.z);
            }
        }
        Commands::Probe { x, y, z, physics } => {
            let mut sim = physics.open()?;
            let point = Vec3::new(x, y, z);
            let hit = sim.query_collision(point);
            sim.shutdown();
            println!(
                "({x:.2}, {y:.2}, {z:.2}): {}",
                if hit? { "solid" } else { "free" }
            );
        }
    }

    Ok(())
}
