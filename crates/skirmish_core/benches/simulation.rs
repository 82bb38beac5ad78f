//! Simulation benchmarks for skirmish_core.
//!
//! Run with: `cargo bench -p skirmish_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use skirmish_core::engine::BattleEngine;
use skirmish_core::simulation::Battle;
use skirmish_core::config::EngineConfig;
use skirmish_test_utils::fixtures::{full_blue, full_red, standard_blue, standard_red, standard_roster};

/// Full battles at both team sizes.
pub fn battle_benchmark(c: &mut Criterion) {
    let roster = standard_roster();
    let engine = BattleEngine::default();
    let matchups = [
        ("3v3", standard_blue(), standard_red()),
        ("5v5", full_blue(), full_red()),
    ];

    let mut group = c.benchmark_group("simulate_battle");
    for (name, blue, red) in &matchups {
        group.bench_with_input(BenchmarkId::from_parameter(name), &(blue, red), |b, (blue, red)| {
            b.iter(|| engine.simulate_battle_seeded(black_box(blue), black_box(red), &roster, black_box(42)));
        });
    }
    group.finish();
}

/// First hundred ticks of a 5v5, without result compilation.
pub fn step_benchmark(c: &mut Criterion) {
    let roster = standard_roster();
    let (blue, red) = (full_blue(), full_red());

    c.bench_function("step_100_ticks_5v5", |b| {
        b.iter(|| {
            let mut battle = Battle::new(&blue, &red, &roster, EngineConfig::default(), 42)
                .expect("valid battle");
            for _ in 0..100 {
                battle.step();
            }
            black_box(battle.state_hash())
        });
    });
}

criterion_group!(benches, battle_benchmark, step_benchmark);
criterion_main!(benches);
