//! Off-thread execution of sandbox runs.
//!
//! - [`task`]: a self-contained generation ([`GenerationTask`]) and its output.
//! - [`pool`]: the bounded [`WorkerPool`] and its [`TaskHandle`]s.
//! - [`benchmark`]: repeated timed generations through the pool.
pub mod benchmark;
pub mod pool;
pub mod task;

pub use benchmark::{run_benchmark, BenchmarkConfig, BenchmarkMode, BenchmarkResult};
pub use pool::{TaskHandle, WorkerPool};
pub use task::{GenerationOutput, GenerationTask};
