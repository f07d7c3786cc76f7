use std::hint::black_box;
use std::time::Instant;

use glam::Vec2;
use meadow_input::{Action, InputFrame, MovementKeys};
use meadow_kernel::{FreeSpacePhysics, SimConfig, Simulation};

fn bench_idle(frames: usize) {
    let mut sim = match Simulation::new(SimConfig::default(), FreeSpacePhysics::new()) {
        Ok(sim) => sim,
        Err(e) => panic!("simulation init failed: {e}"),
    };
    let input = InputFrame::default();

    let start = Instant::now();
    for _ in 0..frames {
        let _ = black_box(sim.step(black_box(&input), 0.016));
    }
    let elapsed = start.elapsed();
    let per_frame = elapsed / frames as u32;
    println!("  idle ({frames} frames): {per_frame:?}/frame, total {elapsed:?}");
}

fn bench_moving_and_looking(frames: usize) {
    let mut sim = match Simulation::new(SimConfig::default(), FreeSpacePhysics::new()) {
        Ok(sim) => sim,
        Err(e) => panic!("simulation init failed: {e}"),
    };
    let keys = MovementKeys::holding(&[Action::MoveForward, Action::StrafeLeft]);

    let start = Instant::now();
    for i in 0..frames {
        let input = InputFrame::keys(keys).with_cursor(Vec2::new(i as f32, (i % 100) as f32));
        let _ = black_box(sim.step(black_box(&input), 0.016));
    }
    let elapsed = start.elapsed();
    let per_frame = elapsed / frames as u32;
    println!("  move+look ({frames} frames): {per_frame:?}/frame, total {elapsed:?}");
}

fn main() {
    println!("simulation step benchmarks");
    for frames in [10_000, 100_000, 1_000_000] {
        bench_idle(frames);
        bench_moving_and_looking(frames);
    }
}
