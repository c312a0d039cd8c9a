use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gcmc_sampler_core::{estimate_g, find_equilibration, propose_new_x, TimeSeries};
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Relaxation to a plateau plus AR(1) noise, sampled every 10 steps.
fn loading_series(n: usize, seed: u64) -> TimeSeries {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();
    let phi: f64 = 0.95;
    let scale = (1.0 - phi * phi).sqrt();
    let mut noise = 0.0;
    let values = (0..n)
        .map(|i| {
            noise = phi * noise + scale * normal.sample(&mut rng);
            10.0 * (1.0 - (-(i as f64) / 200.0).exp()) + 0.2 * noise
        })
        .collect();
    TimeSeries::new((0..n as u64).map(|i| i * 10).collect(), values).unwrap()
}

fn bench_equilibration(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_equilibration");
    for n in [1_000, 10_000, 100_000] {
        let series = loading_series(n, 1);
        group.bench_with_input(BenchmarkId::from_parameter(n), &series, |b, series| {
            b.iter(|| black_box(find_equilibration(series).ok()))
        });
    }
    group.finish();
}

fn bench_inefficiency(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimate_g");
    for n in [1_000, 10_000, 100_000] {
        let series = loading_series(n, 2);
        let tail = series.slice_from_index(n / 2);
        group.bench_with_input(BenchmarkId::from_parameter(n), &tail, |b, tail| {
            b.iter(|| black_box(estimate_g(tail, 5_000_000, 0.1).ok()))
        });
    }
    group.finish();
}

fn bench_refinement(c: &mut Criterion) {
    let xs: Vec<f64> = (0..50).map(|i| i as f64).collect();
    let ys: Vec<f64> = xs.iter().map(|x| x / (1.0 + x)).collect();
    c.bench_function("propose_new_x", |b| {
        b.iter(|| black_box(propose_new_x(&xs, &ys, 100).ok()))
    });
}

criterion_group!(benches, bench_equilibration, bench_inefficiency, bench_refinement);
criterion_main!(benches);
