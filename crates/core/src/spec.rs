//! Benchmark declarations: workloads, thresholds, execution modes.

use crate::error::WorkloadError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// The operation being measured.
///
/// Opaque to the harness: it returns the number of items it processed
/// (for throughput derivation) or a [`WorkloadError`]. Must be callable
/// from multiple workers at once.
pub type Workload = Arc<dyn Fn() -> Result<u64, WorkloadError> + Send + Sync>;

/// Declared performance bounds for one benchmark.
///
/// Every field is optional; a threshold with no bounds always passes.
/// Declared at registration time, never mutated during a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Threshold {
    /// Maximum allowed wall-clock duration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_duration: Option<Duration>,
    /// Minimum required throughput, in items per second.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_throughput: Option<f64>,
    /// Maximum allowed resident-memory growth, in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_memory_growth: Option<u64>,
    /// Minimum fraction of iterations that must complete without error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_success_ratio: Option<f64>,
}

impl Threshold {
    /// A threshold with no bounds; always passes.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Set the maximum wall-clock duration.
    pub fn max_duration(mut self, limit: Duration) -> Self {
        self.max_duration = Some(limit);
        self
    }

    /// Set the minimum throughput in items per second.
    pub fn min_throughput(mut self, items_per_sec: f64) -> Self {
        self.min_throughput = Some(items_per_sec);
        self
    }

    /// Set the maximum memory growth in bytes.
    pub fn max_memory_growth(mut self, bytes: u64) -> Self {
        self.max_memory_growth = Some(bytes);
        self
    }

    /// Set the minimum success ratio for batch/concurrent runs.
    pub fn min_success_ratio(mut self, ratio: f64) -> Self {
        self.min_success_ratio = Some(ratio);
        self
    }

    /// True when no bound is declared.
    pub fn is_unbounded(&self) -> bool {
        self.max_duration.is_none()
            && self.min_throughput.is_none()
            && self.max_memory_growth.is_none()
            && self.min_success_ratio.is_none()
    }
}

/// How the runner executes a benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExecutionMode {
    /// One synchronous invocation on the calling thread.
    Sequential,
    /// `workers` independent threads, each invoking the workload
    /// `iterations_per_worker` times.
    Concurrent {
        /// Number of worker threads to launch.
        workers: usize,
        /// Invocations per worker.
        iterations_per_worker: usize,
    },
}

impl Default for ExecutionMode {
    fn default() -> Self {
        ExecutionMode::Sequential
    }
}

/// One named, measured unit: workload plus declared bounds.
///
/// Immutable once registered; names must be unique within a run.
#[derive(Clone)]
pub struct BenchmarkSpec {
    /// Unique name within a run.
    pub name: String,
    /// The operation to measure.
    pub workload: Workload,
    /// Declared performance bounds.
    pub threshold: Threshold,
    /// Sequential or concurrent execution.
    pub mode: ExecutionMode,
}

impl BenchmarkSpec {
    /// Declare a sequential benchmark.
    pub fn new(
        name: impl Into<String>,
        threshold: Threshold,
        workload: impl Fn() -> Result<u64, WorkloadError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            workload: Arc::new(workload),
            threshold,
            mode: ExecutionMode::Sequential,
        }
    }

    /// Declare a concurrent benchmark.
    pub fn concurrent(
        name: impl Into<String>,
        threshold: Threshold,
        workers: usize,
        iterations_per_worker: usize,
        workload: impl Fn() -> Result<u64, WorkloadError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            workload: Arc::new(workload),
            threshold,
            mode: ExecutionMode::Concurrent {
                workers,
                iterations_per_worker,
            },
        }
    }
}

impl fmt::Debug for BenchmarkSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BenchmarkSpec")
            .field("name", &self.name)
            .field("threshold", &self.threshold)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}
