//! Concurrent performance-benchmark harness.
//!
//! Runs named benchmarks sequentially or across a worker pool, measures
//! duration, memory delta, and throughput, compares each measurement
//! against its declared threshold, and aggregates the verdicts into a
//! persisted JSON report suitable for automated gating.
//!
//! # Quick Start
//!
//! ```no_run
//! use perfgate_core::{BenchmarkSpec, Harness, Threshold};
//! use std::time::Duration;
//!
//! let mut harness = Harness::new();
//! harness.register(BenchmarkSpec::new(
//!     "hot-path",
//!     Threshold::unbounded().max_duration(Duration::from_millis(50)),
//!     || Ok(1),
//! ))?;
//! let report = harness.run_all()?;
//! assert!(report.summary.all_passed);
//! # Ok::<(), perfgate_core::HarnessError>(())
//! ```
//!
//! # Modules
//!
//! - [`sampler`] - wall-clock and best-effort memory sampling
//! - [`workload`] - synthetic payload generators and simulated latency
//! - [`spec`] - benchmark declarations and thresholds
//! - [`runner`] - sequential and concurrent execution
//! - [`verdict`] - threshold evaluation
//! - [`report`] - aggregation and the persisted run report
//! - [`harness`] - the end-to-end driver
//! - [`suite`] - built-in benchmark suites
//! - [`markdown`] - markdown report rendering

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod environment;
pub mod error;
pub mod harness;
pub mod markdown;
pub mod report;
pub mod runner;
pub mod sampler;
pub mod spec;
pub mod suite;
pub mod verdict;
pub mod workload;

pub use error::{HarnessError, WorkloadError};
pub use harness::Harness;
pub use report::{Aggregator, RunReport, RunState};
pub use runner::{ConcurrentRun, Measurement, Runner};
pub use spec::{BenchmarkSpec, ExecutionMode, Threshold, Workload};
pub use suite::SuiteKind;
pub use verdict::{evaluate, Verdict, Violation};
pub use workload::{Complexity, LatencyProvider, NoLatency, SimulatedLatency};
