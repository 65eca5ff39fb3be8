mod common;

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::IVec3;
use tree_sandbox::executor::benchmark::run_benchmark;
use tree_sandbox::prelude::*;

fn single_run_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("sandbox/single_run");
    let template = EnvironmentTemplate::default();

    for definition in common::definitions_by_trunk() {
        let task = GenerationTask::new(
            Arc::new(TreeGrower),
            template.clone(),
            Arc::new(definition.clone()),
            IVec3::ZERO,
            0,
        );
        group.bench_with_input(
            BenchmarkId::from_parameter(definition.trunk.kind()),
            &task,
            |b, task| {
                let mut seed = 0u64;
                b.iter(|| {
                    let mut task = task.clone();
                    task.seed = seed;
                    seed = seed.wrapping_add(1);
                    black_box(task.run());
                });
            },
        );
    }

    group.finish();
}

fn harness_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("sandbox/harness");
    let task = GenerationTask::new(
        Arc::new(TreeGrower),
        EnvironmentTemplate::default(),
        Arc::new(TreeDefinition::oak("bench:oak")),
        IVec3::ZERO,
        0,
    );

    for &threads in &[1usize, 4] {
        let pool = match WorkerPool::new(threads) {
            Ok(pool) => pool,
            Err(e) => panic!("worker pool failed to start: {e}"),
        };
        for mode in [BenchmarkMode::Sequential, BenchmarkMode::Parallel] {
            let config = BenchmarkConfig::new(200).with_mode(mode);
            group.throughput(common::elements_throughput(config.iterations));
            group.bench_with_input(
                BenchmarkId::new(format!("{mode:?}").to_lowercase(), threads),
                &config,
                |b, config| {
                    b.iter(|| black_box(run_benchmark(&pool, &task, config).ok()));
                },
            );
        }
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = single_run_benches, harness_benches
}
criterion_main!(benches);
