//! Benchmark execution: sequential and concurrent runners.
//!
//! Each execution brackets the workload with two [`ResourceSample`]s in
//! total order (before strictly precedes after), so the memory delta is
//! meaningful. Under concurrent load the delta attributes a shared
//! process-global RSS and is an approximation, not a precise per-worker
//! attribution.

use crate::error::WorkloadError;
use crate::sampler::{MemorySnapshot, ResourceSample};
use crate::spec::{BenchmarkSpec, ExecutionMode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::panic::AssertUnwindSafe;
use std::sync::mpsc;
use std::time::Duration;
use tracing::{debug, warn};

/// Everything recorded about one executed benchmark (or one iteration of
/// a concurrent benchmark). Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    /// Benchmark name this measurement belongs to.
    pub name: String,
    /// When execution began.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration of the execution.
    pub duration: Duration,
    /// Resident memory sampled before the workload ran.
    pub memory_before: MemorySnapshot,
    /// Resident memory sampled after the workload finished.
    pub memory_after: MemorySnapshot,
    /// Items processed, for throughput derivation.
    pub items: u64,
    /// Workload invocations this measurement covers (1 for sequential).
    pub iterations: u64,
    /// Invocations that completed without error.
    pub ok_iterations: u64,
    /// Error from the workload, if it failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Measurement {
    /// Memory growth in bytes. Negative deltas (e.g. after a collection
    /// or allocator release) clamp to zero, never a bonus.
    pub fn memory_growth(&self) -> u64 {
        self.memory_after
            .rss_bytes
            .saturating_sub(self.memory_before.rss_bytes)
    }

    /// Fraction of iterations that completed without error.
    pub fn success_ratio(&self) -> f64 {
        if self.iterations == 0 {
            return 1.0;
        }
        self.ok_iterations as f64 / self.iterations as f64
    }

    /// Duration in fractional milliseconds, for display.
    pub fn duration_ms(&self) -> f64 {
        self.duration.as_secs_f64() * 1000.0
    }
}

/// Outcome of a concurrent benchmark: every per-iteration measurement
/// plus the aggregate view across the whole worker pool.
#[derive(Debug, Clone)]
pub struct ConcurrentRun {
    /// One measurement per worker iteration, `workers * iterations` total.
    /// No defined inter-worker ordering.
    pub measurements: Vec<Measurement>,
    /// The folded aggregate: wall-clock span from first launch to last
    /// join, total items, pooled success ratio.
    pub aggregate: Measurement,
}

/// Executes benchmark specs and produces measurements.
///
/// Stateless; the same runner may execute any number of specs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Runner;

impl Runner {
    /// Create a runner.
    pub fn new() -> Self {
        Runner
    }

    /// Execute a spec according to its declared mode, folding concurrent
    /// runs into their aggregate measurement.
    pub fn run(&self, spec: &BenchmarkSpec) -> Measurement {
        match spec.mode {
            ExecutionMode::Sequential => self.run_sequential(spec),
            ExecutionMode::Concurrent {
                workers,
                iterations_per_worker,
            } => {
                self.run_concurrent(spec, workers, iterations_per_worker)
                    .aggregate
            }
        }
    }

    /// Execute the workload once on the calling thread.
    ///
    /// On failure the measurement still carries duration and memory up to
    /// the failure point; there is no retry.
    pub fn run_sequential(&self, spec: &BenchmarkSpec) -> Measurement {
        debug!(benchmark = %spec.name, "running sequential benchmark");
        let before = ResourceSample::capture();
        let outcome = invoke(&spec.workload);
        let after = ResourceSample::capture();

        let (items, error) = split_outcome(outcome);
        let measurement = Measurement {
            name: spec.name.clone(),
            started_at: before.timestamp,
            duration: after.instant.duration_since(before.instant),
            memory_before: MemorySnapshot {
                rss_bytes: before.memory_bytes,
            },
            memory_after: MemorySnapshot {
                rss_bytes: after.memory_bytes,
            },
            items,
            iterations: 1,
            ok_iterations: if error.is_none() { 1 } else { 0 },
            error,
        };
        debug!(
            benchmark = %spec.name,
            duration_ms = measurement.duration_ms(),
            items = measurement.items,
            "sequential benchmark finished"
        );
        measurement
    }

    /// Execute the workload across `workers` threads, each performing
    /// `iterations_per_worker` invocations.
    ///
    /// Every launched worker is joined before this returns; a failing
    /// iteration never cancels its siblings. Exactly
    /// `workers * iterations_per_worker` iteration measurements are
    /// produced regardless of interleaving.
    pub fn run_concurrent(
        &self,
        spec: &BenchmarkSpec,
        workers: usize,
        iterations_per_worker: usize,
    ) -> ConcurrentRun {
        debug!(
            benchmark = %spec.name,
            workers,
            iterations_per_worker,
            "running concurrent benchmark"
        );
        let (tx, rx) = mpsc::channel::<Measurement>();
        let launch = ResourceSample::capture();

        let handles: Vec<_> = (0..workers)
            .map(|worker_idx| {
                let workload = spec.workload.clone();
                let name = spec.name.clone();
                let tx = tx.clone();
                std::thread::Builder::new()
                    .name(format!("{}-w{}", spec.name, worker_idx))
                    .spawn(move || {
                        for _ in 0..iterations_per_worker {
                            let before = ResourceSample::capture();
                            let outcome = invoke(&workload);
                            let after = ResourceSample::capture();
                            let (items, error) = split_outcome(outcome);
                            // Append-only hand-off; the channel is the only
                            // state shared between workers.
                            let _ = tx.send(Measurement {
                                name: name.clone(),
                                started_at: before.timestamp,
                                duration: after.instant.duration_since(before.instant),
                                memory_before: MemorySnapshot {
                                    rss_bytes: before.memory_bytes,
                                },
                                memory_after: MemorySnapshot {
                                    rss_bytes: after.memory_bytes,
                                },
                                items,
                                iterations: 1,
                                ok_iterations: if error.is_none() { 1 } else { 0 },
                                error,
                            });
                        }
                    })
            })
            .collect();

        drop(tx);
        let mut measurements = Vec::with_capacity(workers * iterations_per_worker);
        for measurement in rx {
            measurements.push(measurement);
        }
        for handle in handles {
            match handle {
                Ok(joined) => {
                    if joined.join().is_err() {
                        warn!(benchmark = %spec.name, "worker thread panicked");
                    }
                }
                Err(err) => {
                    warn!(benchmark = %spec.name, error = %err, "failed to spawn worker");
                }
            }
        }
        let join = ResourceSample::capture();

        let total = (workers * iterations_per_worker) as u64;
        let ok = measurements.iter().map(|m| m.ok_iterations).sum::<u64>();
        let items = measurements.iter().map(|m| m.items).sum::<u64>();
        let all_failed = total > 0 && ok == 0;
        let aggregate = Measurement {
            name: spec.name.clone(),
            started_at: launch.timestamp,
            // Wall-clock span from first launch to last join, not the sum
            // of per-worker durations.
            duration: join.instant.duration_since(launch.instant),
            memory_before: MemorySnapshot {
                rss_bytes: launch.memory_bytes,
            },
            memory_after: MemorySnapshot {
                rss_bytes: join.memory_bytes,
            },
            items,
            iterations: total,
            ok_iterations: ok,
            error: if all_failed {
                measurements.iter().find_map(|m| m.error.clone())
            } else {
                None
            },
        };
        debug!(
            benchmark = %spec.name,
            duration_ms = aggregate.duration_ms(),
            success_ratio = aggregate.success_ratio(),
            "concurrent benchmark finished"
        );
        ConcurrentRun {
            measurements,
            aggregate,
        }
    }
}

/// Run the workload, converting a panic into a workload error so sibling
/// workers are never torn down by one bad iteration.
fn invoke(workload: &crate::spec::Workload) -> Result<u64, WorkloadError> {
    match std::panic::catch_unwind(AssertUnwindSafe(|| (workload)())) {
        Ok(result) => result,
        Err(_) => Err(WorkloadError::new("workload panicked")),
    }
}

fn split_outcome(outcome: Result<u64, WorkloadError>) -> (u64, Option<String>) {
    match outcome {
        Ok(items) => (items, None),
        Err(err) => (0, Some(err.message)),
    }
}
