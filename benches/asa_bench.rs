//! Criterion benchmarks for the ASA optimizer.
//!
//! Uses synthetic objectives (Sphere, Rastrigin) so the numbers reflect
//! annealer overhead rather than objective cost.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use u_asa::asa::{generate, Anneal, AnnealState, AsaConfig, AsaRunner, ParameterSpace, Request};

fn sphere(p: &[f64]) -> f64 {
    p.iter().map(|x| x * x).sum()
}

fn rastrigin(p: &[f64]) -> f64 {
    use std::f64::consts::PI;
    10.0 * p.len() as f64
        + p.iter()
            .map(|x| x * x - 10.0 * (2.0 * PI * x).cos())
            .sum::<f64>()
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_runner_sphere(c: &mut Criterion) {
    let mut group = c.benchmark_group("asa_sphere");
    group.sample_size(10);

    for &dim in &[2usize, 10, 50] {
        let config = AsaConfig::default().with_max_steps(2_000).with_seed(42);
        group.bench_with_input(BenchmarkId::from_parameter(dim), &config, |b, config| {
            b.iter(|| {
                let result = AsaRunner::run(
                    &sphere,
                    vec![3.0; dim],
                    vec![(-5.0, 5.0); dim],
                    black_box(config),
                );
                black_box(result)
            })
        });
    }
    group.finish();
}

fn bench_runner_rastrigin(c: &mut Criterion) {
    let mut group = c.benchmark_group("asa_rastrigin");
    group.sample_size(10);

    for &dim in &[2usize, 10] {
        let config = AsaConfig::default()
            .with_max_steps(5_000)
            .with_partials_samples(2 * dim)
            .with_seed(42);
        group.bench_with_input(BenchmarkId::from_parameter(dim), &config, |b, config| {
            b.iter(|| {
                let result = AsaRunner::run(
                    &rastrigin,
                    vec![2.5; dim],
                    vec![(-5.12, 5.12); dim],
                    black_box(config),
                );
                black_box(result)
            })
        });
    }
    group.finish();
}

/// The caller-driven loop without the runner.
fn bench_stepping(c: &mut Criterion) {
    let mut group = c.benchmark_group("asa_stepping");
    group.sample_size(10);

    for &dim in &[2usize, 20] {
        group.bench_with_input(BenchmarkId::from_parameter(dim), &dim, |b, &dim| {
            b.iter(|| {
                let config = AsaConfig::default().with_max_steps(1_000);
                let mut anneal = Anneal::new(
                    vec![0.5; dim],
                    vec![(-1.0, 1.0); dim],
                    config,
                    StdRng::seed_from_u64(7),
                );
                anneal.init(sphere(anneal.x())).ok();
                while anneal.state() != AnnealState::ReadyToStop {
                    match anneal.request() {
                        Request::Candidate(x) => {
                            let f = sphere(x);
                            anneal.supply_candidate(f).ok();
                        }
                        Request::Batch(set) => {
                            let costs: Vec<f64> = set.iter().map(|p| sphere(p)).collect();
                            anneal.supply_samples(&costs).ok();
                        }
                        _ => break,
                    }
                    if anneal.step().is_err() {
                        break;
                    }
                }
                black_box(anneal.f_x_best())
            })
        });
    }
    group.finish();
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("asa_generate");

    for &dim in &[10usize, 100] {
        let space = ParameterSpace::new(vec![(-1.0, 1.0); dim]);
        let x = vec![0.0f64; dim];
        let temperatures = vec![0.01f64; dim];
        let mut rng = StdRng::seed_from_u64(42);
        group.bench_function(BenchmarkId::from_parameter(dim), |b| {
            b.iter(|| black_box(generate(&x, &temperatures, &space, &mut rng)))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_runner_sphere,
    bench_runner_rastrigin,
    bench_stepping,
    bench_generate
);
criterion_main!(benches);
