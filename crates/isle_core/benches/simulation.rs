//! Benchmarks for isle_core.
//!
//! Run with: `cargo bench -p isle_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use isle_core::config::GameConfig;
use isle_core::map_generation::{generate_map_with, MapConfig};
use isle_core::math::Vec2;
use isle_core::rng::Mulberry32;
use isle_core::simulation::Simulation;

/// Map generation at the preset sizes.
pub fn map_generation_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_map");
    for config in [MapConfig::small(), MapConfig::medium(), MapConfig::large()] {
        group.bench_with_input(BenchmarkId::from_parameter(config.cols), &config, |b, config| {
            b.iter(|| {
                let mut rng = Mulberry32::new(config.seed);
                black_box(generate_map_with(config, &mut rng))
            });
        });
    }
    group.finish();
}

/// One tick with every unit walking.
pub fn tick_benchmark(c: &mut Criterion) {
    let mut config = GameConfig::default();
    config.units.count = 64;
    let Ok(mut base) = Simulation::new(config) else {
        return;
    };
    base.select_all();
    base.order_move_to(Vec2::new(40.5, 36.5));

    c.bench_function("tick_64_units", |b| {
        b.iter_batched(
            || base.clone(),
            |mut sim| black_box(sim.tick(0.016)),
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, map_generation_benchmark, tick_benchmark);
criterion_main!(benches);
