//! Repeated sandbox generations timed through the worker pool.
//!
//! Every iteration builds a fresh environment and a fresh RNG seeded from
//! [`iteration_seed`], so two benchmarks with the same base seed grow the same
//! trees regardless of mode. A warm-up of [`WARMUP_ITERATIONS`] sequential runs
//! precedes the timed section and is discarded.
use std::time::Instant;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::executor::pool::{TaskHandle, WorkerPool};
use crate::executor::task::GenerationTask;

pub const MIN_ITERATIONS: usize = 1;
pub const MAX_ITERATIONS: usize = 10_000;
pub const WARMUP_ITERATIONS: usize = 50;
/// Parallel iterations submitted before waiting.
pub const BATCH_SIZE: usize = 100;

/// Clamps a requested iteration count to `[MIN_ITERATIONS, MAX_ITERATIONS]`.
pub fn clamp_iterations(requested: usize) -> usize {
    requested.clamp(MIN_ITERATIONS, MAX_ITERATIONS)
}

/// Seed of iteration `index` for a benchmark seeded with `base`.
pub fn iteration_seed(base: u64, index: u64) -> u64 {
    base ^ index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BenchmarkMode {
    /// One iteration at a time.
    Sequential,
    /// Batches of [`BATCH_SIZE`] across the pool, each awaited before the next.
    #[default]
    Parallel,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkConfig {
    /// Timed iterations; clamped to `[1, 10000]` when the benchmark runs.
    pub iterations: usize,
    pub mode: BenchmarkMode,
    pub base_seed: u64,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            mode: BenchmarkMode::default(),
            base_seed: 0,
        }
    }
}

impl BenchmarkConfig {
    pub fn new(iterations: usize) -> Self {
        Self {
            iterations,
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: BenchmarkMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_base_seed(mut self, seed: u64) -> Self {
        self.base_seed = seed;
        self
    }
}

/// Timing summary of a benchmark.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkResult {
    pub total_time_ms: f64,
    pub avg_time_ms: f64,
    pub throughput_per_sec: f64,
    pub iterations: usize,
    /// Placements summed over all timed iterations.
    pub total_placements: usize,
}

impl BenchmarkResult {
    fn from_timing(elapsed_secs: f64, iterations: usize, total_placements: usize) -> Self {
        let total_time_ms = elapsed_secs * 1000.0;
        Self {
            total_time_ms,
            avg_time_ms: total_time_ms / iterations as f64,
            throughput_per_sec: iterations as f64 / elapsed_secs.max(f64::EPSILON),
            iterations,
            total_placements,
        }
    }
}

fn submit_iteration(pool: &WorkerPool, task: &GenerationTask, seed: u64) -> TaskHandle<usize> {
    let mut task = task.clone();
    task.seed = seed;
    pool.submit(move || Ok(task.run().placements.len()))
}

fn iteration_failed(label: &str, index: usize, error: Error) -> Error {
    Error::TaskFailed(format!("benchmark {label} {index}: {error}"))
}

/// Times `config.iterations` generations of `task` on `pool`.
///
/// The task's own seed is ignored; each iteration uses [`iteration_seed`]. A
/// failed or panicking iteration aborts the benchmark with [`Error::TaskFailed`].
pub fn run_benchmark(
    pool: &WorkerPool,
    task: &GenerationTask,
    config: &BenchmarkConfig,
) -> Result<BenchmarkResult> {
    let iterations = clamp_iterations(config.iterations);
    if iterations != config.iterations {
        debug!(
            "Benchmark iterations {} clamped to {}.",
            config.iterations, iterations
        );
    }

    // Warm-up seeds count down from the end of the seed stream so they never
    // coincide with a timed iteration.
    for w in 0..WARMUP_ITERATIONS {
        submit_iteration(pool, task, iteration_seed(config.base_seed, u64::MAX - w as u64))
            .wait()
            .map_err(|e| iteration_failed("warm-up", w, e))?;
    }

    let started = Instant::now();
    let mut total_placements = 0;
    match config.mode {
        BenchmarkMode::Sequential => {
            for i in 0..iterations {
                let seed = iteration_seed(config.base_seed, i as u64);
                total_placements += submit_iteration(pool, task, seed)
                    .wait()
                    .map_err(|e| iteration_failed("iteration", i, e))?;
            }
        }
        BenchmarkMode::Parallel => {
            for batch_start in (0..iterations).step_by(BATCH_SIZE) {
                let batch_end = (batch_start + BATCH_SIZE).min(iterations);
                let handles: Vec<_> = (batch_start..batch_end)
                    .map(|i| {
                        submit_iteration(pool, task, iteration_seed(config.base_seed, i as u64))
                    })
                    .collect();
                for (i, handle) in (batch_start..batch_end).zip(handles) {
                    total_placements += handle
                        .wait()
                        .map_err(|e| iteration_failed("iteration", i, e))?;
                }
            }
        }
    }
    let result = BenchmarkResult::from_timing(
        started.elapsed().as_secs_f64(),
        iterations,
        total_placements,
    );

    info!(
        "Benchmark of '{}' ({:?}): {} iterations in {:.2} ms, avg {:.3} ms, {:.1}/s.",
        task.definition.id,
        config.mode,
        result.iterations,
        result.total_time_ms,
        result.avg_time_ms,
        result.throughput_per_sec
    );
    Ok(result)
}
