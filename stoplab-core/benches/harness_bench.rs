//! Criterion benchmarks for StopLab hot paths.
//!
//! Benchmarks:
//! 1. Threshold rule on a single sequence
//! 2. Full harness run (all four strategies) over varying pool sizes

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use stoplab_core::{threshold_rule, MonteCarloHarness, PayoffPool, SimulationConfig};

fn make_pool(n: usize) -> PayoffPool {
    (0..n).map(|i| ((i as f64) * 0.37).sin() * 50.0 + 50.0).collect()
}

fn bench_threshold_rule(c: &mut Criterion) {
    let mut group = c.benchmark_group("threshold_rule");
    for n in [100usize, 1_000, 10_000] {
        let pool = make_pool(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &pool, |b, pool| {
            b.iter(|| threshold_rule(black_box(pool.values()), 0.37))
        });
    }
    group.finish();
}

fn bench_harness(c: &mut Criterion) {
    let mut group = c.benchmark_group("harness_all_strategies");
    group.sample_size(20);
    for n in [100usize, 1_000] {
        let pool = make_pool(n);
        let config = SimulationConfig {
            threshold: 0.37,
            runs: 1_000,
            seed: Some(42),
        };
        let harness = MonteCarloHarness::all_strategies(config);
        group.bench_with_input(BenchmarkId::from_parameter(n), &pool, |b, pool| {
            b.iter(|| harness.run(black_box(pool)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_threshold_rule, bench_harness);
criterion_main!(benches);
