mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tree_sandbox::prelude::*;

fn weighted_replacer(alternatives: usize) -> Replacer {
    let pool = common::definitions_by_trunk();
    let alternatives = (0..alternatives)
        .map(|i| WeightedAlternative::new(0.5 / alternatives as f32, pool[i % pool.len()].clone()))
        .collect();
    Replacer::weighted("minecraft:oak", TreeDefinition::oak("bench:default"), alternatives)
}

fn resolve_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("replacer/resolve");

    for &n in &[1usize, 8, 64, 512] {
        let resolver = match ReplacerResolver::new(weighted_replacer(n)) {
            Ok(resolver) => resolver,
            Err(e) => panic!("invalid bench replacer: {e}"),
        };
        group.throughput(common::elements_throughput(n));
        group.bench_with_input(BenchmarkId::new("weighted", n), &n, |b, _| {
            let mut rng = StdRng::seed_from_u64(0xC0FFEE);
            b.iter(|| black_box(resolver.resolve(&mut rng).id.len()));
        });
    }

    let uniform = Replacer::uniform("minecraft:oak", common::definitions_by_trunk())
        .and_then(ReplacerResolver::new);
    let uniform = match uniform {
        Ok(resolver) => resolver,
        Err(e) => panic!("invalid bench replacer: {e}"),
    };
    group.bench_function("uniform", |b| {
        let mut rng = StdRng::seed_from_u64(0xDEADBEEF);
        b.iter(|| black_box(uniform.resolve(&mut rng).id.len()));
    });

    group.finish();
}

fn patch_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("replacer/patch");
    let registry = std::sync::Arc::new(MemoryRegistry::new());
    let patcher = RegistryPatcher::new(
        registry.clone(),
        std::sync::Arc::new(TreeFeatureFactory),
        std::sync::Arc::new(PendingChanges::new()),
    );
    let oak = TreeDefinition::oak("bench:oak");
    registry.register(
        "tree_engine:oak",
        LiveFeature::Tree(tree_sandbox::registry::LiveTreeConfig::from(&oak)),
    );
    let key = RegistryKey::new("tree_engine:oak");

    group.bench_function("apply_patch", |b| {
        b.iter(|| black_box(patcher.apply_patch(&key, &oak).ok()));
    });
    let replacer = weighted_replacer(16);
    group.bench_function("apply_replacer_tracked", |b| {
        b.iter(|| black_box(patcher.apply_replacer(&replacer).ok()));
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = resolve_benches, patch_benches
}
criterion_main!(benches);
