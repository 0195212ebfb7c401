//! Top-level driver: registers specs, runs them, evaluates, reports.

use crate::error::HarnessError;
use crate::report::{Aggregator, RunReport, RunState};
use crate::runner::Runner;
use crate::spec::BenchmarkSpec;
use crate::verdict::evaluate;
use std::path::Path;
use tracing::info;

/// Owns one run end to end.
///
/// Drives the [`Runner`] for each registered spec in registration order,
/// hands each measurement to the evaluator, funnels verdicts into the
/// [`Aggregator`], and finally persists the report.
pub struct Harness {
    runner: Runner,
    aggregator: Aggregator,
    specs: Vec<BenchmarkSpec>,
}

impl Harness {
    /// Create an empty harness.
    pub fn new() -> Self {
        Self {
            runner: Runner::new(),
            aggregator: Aggregator::new(),
            specs: Vec::new(),
        }
    }

    /// Register one benchmark. Duplicate names are rejected here, before
    /// any benchmark executes.
    pub fn register(&mut self, spec: BenchmarkSpec) -> Result<(), HarnessError> {
        self.aggregator
            .register(spec.name.clone(), spec.threshold.clone())?;
        self.specs.push(spec);
        Ok(())
    }

    /// Register a whole suite, rejecting the first duplicate.
    pub fn register_all(
        &mut self,
        specs: impl IntoIterator<Item = BenchmarkSpec>,
    ) -> Result<(), HarnessError> {
        for spec in specs {
            self.register(spec)?;
        }
        Ok(())
    }

    /// Execute every registered benchmark in registration order and
    /// build the report.
    pub fn run_all(&mut self) -> Result<RunReport, HarnessError> {
        info!(
            run_id = %self.aggregator.run_id(),
            benchmarks = self.specs.len(),
            "starting benchmark run"
        );
        for spec in &self.specs {
            let measurement = self.runner.run(spec);
            let verdict = evaluate(measurement, &spec.threshold);
            self.aggregator.record(&spec.name, verdict)?;
        }
        self.aggregator.finalize()
    }

    /// Persist a finalized report and advance the run to its terminal
    /// state. On write failure the report value remains usable and
    /// persistence may be retried.
    pub fn persist(&mut self, report: &RunReport, path: &Path) -> Result<(), HarnessError> {
        report.persist(path)?;
        self.aggregator.mark_persisted()
    }

    /// Current lifecycle state of the run.
    pub fn state(&self) -> RunState {
        self.aggregator.state()
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
