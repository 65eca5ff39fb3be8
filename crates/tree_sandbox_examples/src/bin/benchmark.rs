//! Benchmarks a definition sequentially and in parallel and prints a summary line per mode.
//!
//! Usage: `benchmark [iterations] [threads]`.
use tree_sandbox::prelude::*;
use tree_sandbox_examples::init_tracing;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let mut args = std::env::args().skip(1);
    let iterations: usize = args.next().map(|s| s.parse::<usize>()).transpose()?.unwrap_or(1000);
    let threads: usize = args.next().map(|s| s.parse::<usize>()).transpose()?.unwrap_or(4);

    let sandbox = TreeSandbox::new(EngineConfig::new().with_threads(threads))?;
    let definition = TreeDefinition::oak("bench:oak")
        .with_trunk(TrunkShape::Giant(TrunkHeight::new(13, 2, 14)))
        .with_canopy(CanopyShape::MegaPine {
            radius: 0,
            offset: 0,
            crown_height: 13,
        })
        .with_materials("spruce_log", "spruce_leaves");

    for mode in [BenchmarkMode::Sequential, BenchmarkMode::Parallel] {
        let config = BenchmarkConfig::new(iterations).with_mode(mode).with_base_seed(7);
        let result = sandbox.run_benchmark_with(&definition, &config)?;
        println!(
            "{:<10} {:>6} iterations  total {:>9.2} ms  avg {:>7.3} ms  {:>9.1}/s  {} placements",
            format!("{mode:?}"),
            result.iterations,
            result.total_time_ms,
            result.avg_time_ms,
            result.throughput_per_sec,
            result.total_placements
        );
    }
    Ok(())
}
