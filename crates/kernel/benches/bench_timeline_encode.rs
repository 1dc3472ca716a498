use std::hint::black_box;
use std::time::Instant;

use framedelta_kernel::{FrameState, IterSource, Observation, ParticipantState, Timeline, diff};
use glam::DVec3;

const LOADOUT: [&str; 4] = ["knife", "glock", "ak47", "smokegrenade"];

/// `players` participants walking in a line; every fourth one changes weapon each step.
fn make_steps(players: usize, steps: usize) -> Vec<Vec<Observation>> {
    (0..steps)
        .map(|t| {
            (0..players)
                .map(|p| {
                    let weapon = if p % 4 == 0 { LOADOUT[t % 3 + 1] } else { LOADOUT[2] };
                    Observation::new(
                        76_561_198_000_000_000 + p as u64,
                        format!("player{p}"),
                        DVec3::new(p as f64 * 10.0, t as f64 * 0.25, 0.0),
                        [LOADOUT[0], weapon],
                    )
                })
                .collect()
        })
        .collect()
}

fn bench_encode(players: usize, steps: usize, iterations: usize) {
    let input = make_steps(players, steps);

    let start = Instant::now();
    for _ in 0..iterations {
        let source = IterSource::from_steps(black_box(input.clone()));
        let _ = black_box(Timeline::run(source));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  encode ({players} players, {steps} steps, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_diff(players: usize, iterations: usize) {
    let mut previous = FrameState::empty();
    let mut current = FrameState::empty();
    for p in 0..players {
        let id = framedelta_common::ParticipantId(p as u32 + 1);
        let state = ParticipantState {
            position: DVec3::new(p as f64, 0.0, 0.0),
            ..ParticipantState::default()
        };
        let _ = previous.insert(id, state.clone());
        let moved = ParticipantState {
            position: state.position + DVec3::Y * (p % 2) as f64,
            ..state
        };
        let _ = current.insert(id, moved);
    }

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = black_box(diff(black_box(&previous), black_box(&current)));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  diff ({players} players, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn main() {
    println!("=== Timeline Encode Benchmarks ===\n");

    println!("Full timeline:");
    bench_encode(10, 1000, 20);
    bench_encode(10, 10000, 5);
    bench_encode(64, 1000, 10);

    println!("\nSingle diff:");
    bench_diff(10, 100000);
    bench_diff(100, 10000);
    bench_diff(1000, 1000);

    println!("\n=== Done ===");
}
