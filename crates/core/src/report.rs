//! Verdict aggregation and the persisted run report.
//!
//! The aggregator is the single owner of results while a run is in
//! flight: verdicts are appended in registration order regardless of
//! completion order, so reports stay deterministic and diffable. After
//! [`Aggregator::finalize`] the report is a plain immutable value.

use crate::environment::EnvironmentInfo;
use crate::error::HarnessError;
use crate::spec::Threshold;
use crate::verdict::{Verdict, Violation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

/// Report document schema version.
pub const SCHEMA_VERSION: &str = "1.0";

/// Lifecycle of a single run.
///
/// `Pending → Running → Finalized → Persisted`; no transition skips a
/// state and `Persisted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Benchmarks registered, nothing executed yet.
    Pending,
    /// At least one verdict recorded.
    Running,
    /// Every registered benchmark has a verdict; report built.
    Finalized,
    /// Report written to storage; terminal.
    Persisted,
}

#[derive(Debug)]
struct Entry {
    name: String,
    threshold: Threshold,
    verdict: Option<Verdict>,
}

/// Collects verdicts for one run and produces the final report.
pub struct Aggregator {
    run_id: String,
    state: RunState,
    started_at: DateTime<Utc>,
    entries: Vec<Entry>,
    names: HashSet<String>,
}

impl Aggregator {
    /// Start a new, empty run.
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            state: RunState::Pending,
            started_at: Utc::now(),
            entries: Vec::new(),
            names: HashSet::new(),
        }
    }

    /// Unique id of this run.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Register a benchmark name and its declared threshold.
    ///
    /// Duplicate names are rejected here, before anything executes;
    /// registration is closed once the first verdict is recorded.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        threshold: Threshold,
    ) -> Result<(), HarnessError> {
        if self.state != RunState::Pending {
            return Err(HarnessError::config(
                "cannot register benchmarks after the run has started",
            ));
        }
        let name = name.into();
        if !self.names.insert(name.clone()) {
            return Err(HarnessError::config(format!(
                "duplicate benchmark name: {name}"
            )));
        }
        self.entries.push(Entry {
            name,
            threshold,
            verdict: None,
        });
        Ok(())
    }

    /// Record the verdict for a registered benchmark. Append-only: a
    /// second verdict for the same name is a configuration error, never a
    /// silent overwrite.
    pub fn record(&mut self, name: &str, verdict: Verdict) -> Result<(), HarnessError> {
        match self.state {
            RunState::Pending => self.state = RunState::Running,
            RunState::Running => {}
            RunState::Finalized | RunState::Persisted => {
                return Err(HarnessError::config(
                    "cannot record verdicts after finalize",
                ));
            }
        }
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.name == name)
            .ok_or_else(|| {
                HarnessError::config(format!("verdict for unregistered benchmark: {name}"))
            })?;
        if entry.verdict.is_some() {
            return Err(HarnessError::config(format!(
                "verdict already recorded for benchmark: {name}"
            )));
        }
        debug!(benchmark = %name, passed = verdict.passed, "verdict recorded");
        entry.verdict = Some(verdict);
        Ok(())
    }

    /// Build the run report. Only legal once every registered benchmark
    /// has a verdict; a run with zero benchmarks finalizes but is flagged
    /// as degenerate.
    pub fn finalize(&mut self) -> Result<RunReport, HarnessError> {
        if matches!(self.state, RunState::Finalized | RunState::Persisted) {
            return Err(HarnessError::config("run already finalized"));
        }
        let mut missing = Vec::new();
        let mut results = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            match &entry.verdict {
                Some(verdict) => results.push(BenchmarkOutcome {
                    name: entry.name.clone(),
                    verdict: verdict.clone(),
                }),
                None => missing.push(entry.name.clone()),
            }
        }
        if !missing.is_empty() {
            return Err(HarnessError::config(format!(
                "cannot finalize, benchmarks without a verdict: {}",
                missing.join(", ")
            )));
        }
        self.state = RunState::Finalized;
        let finished_at = Utc::now();

        let thresholds = self
            .entries
            .iter()
            .map(|e| NamedThreshold {
                name: e.name.clone(),
                threshold: e.threshold.clone(),
            })
            .collect();

        let total = results.len();
        let passed = results.iter().filter(|r| r.verdict.passed).count();
        let degenerate = total == 0;
        let mut warnings = Vec::new();
        if degenerate {
            warnings.push("run contained no benchmarks; trivially passing".to_string());
        }
        let summary = Summary {
            total,
            passed,
            failed: total - passed,
            // An empty run is defined as 100%.
            success_ratio: if total == 0 {
                1.0
            } else {
                passed as f64 / total as f64
            },
            all_passed: passed == total,
            degenerate,
            warnings,
        };
        let recommendations = recommendations(&results);

        info!(
            run_id = %self.run_id,
            total = summary.total,
            passed = summary.passed,
            "run finalized"
        );
        Ok(RunReport {
            schema_version: SCHEMA_VERSION.to_string(),
            run_id: self.run_id.clone(),
            execution: ExecutionInfo {
                started_at: self.started_at,
                finished_at,
                duration_ms: (finished_at - self.started_at).num_milliseconds().max(0) as u64,
                environment: EnvironmentInfo::collect(),
            },
            thresholds,
            results,
            summary,
            recommendations,
        })
    }

    /// Mark the run persisted after its report was written. Terminal.
    pub fn mark_persisted(&mut self) -> Result<(), HarnessError> {
        if self.state != RunState::Finalized {
            return Err(HarnessError::config(
                "only a finalized run can be marked persisted",
            ));
        }
        self.state = RunState::Persisted;
        Ok(())
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// A benchmark name with its declared threshold, as registered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedThreshold {
    /// Benchmark name.
    pub name: String,
    /// Declared bounds.
    pub threshold: Threshold,
}

/// One benchmark's verdict in registration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkOutcome {
    /// Benchmark name.
    pub name: String,
    /// Verdict with its retained measurement.
    pub verdict: Verdict,
}

/// Run timing and host descriptors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionInfo {
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finalized.
    pub finished_at: DateTime<Utc>,
    /// Total run duration in milliseconds.
    pub duration_ms: u64,
    /// Host descriptors.
    pub environment: EnvironmentInfo,
}

/// Summary counts for the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    /// Registered benchmarks.
    pub total: usize,
    /// Benchmarks whose verdict passed.
    pub passed: usize,
    /// Benchmarks whose verdict failed.
    pub failed: usize,
    /// `passed / total`; 1.0 for an empty run.
    pub success_ratio: f64,
    /// True when every verdict passed.
    pub all_passed: bool,
    /// True when the run contained no benchmarks.
    pub degenerate: bool,
    /// Operator-facing warnings about the run itself.
    pub warnings: Vec<String>,
}

/// The persisted run document. Created once at run completion, written
/// once, never mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Document schema version.
    pub schema_version: String,
    /// Unique run id.
    pub run_id: String,
    /// Timing and environment.
    pub execution: ExecutionInfo,
    /// Full declared threshold table, registration order.
    pub thresholds: Vec<NamedThreshold>,
    /// Verdicts in registration order.
    pub results: Vec<BenchmarkOutcome>,
    /// Summary counts.
    pub summary: Summary,
    /// Deduplicated recommendations derived from failing categories.
    pub recommendations: Vec<String>,
}

impl RunReport {
    /// Write the report as pretty JSON, atomically from the reader's
    /// perspective: the document lands under a temporary name in the
    /// destination directory and is renamed into place, so no reader
    /// observes a partial write.
    pub fn persist(&self, path: &Path) -> Result<(), HarnessError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| HarnessError::persistence(path, std::io::Error::other(e)))?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| HarnessError::persistence(path, e))?;
            }
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| HarnessError::persistence(path, e))?;
        fs::rename(&tmp, path).map_err(|e| HarnessError::persistence(path, e))?;
        info!(path = %path.display(), run_id = %self.run_id, "report persisted");
        Ok(())
    }

    /// Read a previously persisted report back.
    pub fn load(path: &Path) -> Result<Self, HarnessError> {
        let content =
            fs::read_to_string(path).map_err(|e| HarnessError::persistence(path, e))?;
        serde_json::from_str(&content).map_err(|e| {
            HarnessError::persistence(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })
    }

    /// Names and reasons for every failing benchmark, in report order.
    pub fn failures(&self) -> Vec<(&str, Vec<String>)> {
        self.results
            .iter()
            .filter(|r| !r.verdict.passed)
            .map(|r| (r.name.as_str(), r.verdict.reasons()))
            .collect()
    }
}

/// Fixed category→text mapping for failing benchmarks. Duplicate texts
/// are deduplicated; order is insertion order of first occurrence.
fn recommendations(results: &[BenchmarkOutcome]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut push = |text: &str| {
        if !out.iter().any(|t| t == text) {
            out.push(text.to_string());
        }
    };
    for outcome in results.iter().filter(|r| !r.verdict.passed) {
        for violation in &outcome.verdict.violations {
            match violation {
                Violation::WorkloadFailed { .. } => {
                    push("investigate workload errors before tuning performance")
                }
                Violation::DurationExceeded { .. } => {
                    push("profile the slow path; consider caching or reducing per-operation work")
                }
                Violation::ThroughputBelow { .. } => {
                    push("consider batching or parallelism to raise throughput")
                }
                Violation::MemoryGrowthExceeded { .. } => {
                    push("consider pooling or streaming to bound memory growth")
                }
                Violation::SuccessRatioBelow { .. } => {
                    push("inspect failing iterations; add retries or backpressure upstream")
                }
                Violation::MeasurementInvalid { .. } => {
                    push("lengthen the workload; the sample window was too short to measure")
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::Measurement;
    use crate::sampler::MemorySnapshot;
    use crate::verdict::evaluate;
    use std::time::Duration;

    fn verdict(passed: bool) -> Verdict {
        let mut m = Measurement {
            name: "m".into(),
            started_at: Utc::now(),
            duration: Duration::from_millis(10),
            memory_before: MemorySnapshot::default(),
            memory_after: MemorySnapshot::default(),
            items: 10,
            iterations: 1,
            ok_iterations: 1,
            error: None,
        };
        if !passed {
            m.error = Some("failed".into());
        }
        evaluate(m, &Threshold::unbounded())
    }

    #[test]
    fn duplicate_registration_is_rejected_before_execution() {
        let mut agg = Aggregator::new();
        agg.register("alpha", Threshold::unbounded()).unwrap();
        let err = agg.register("alpha", Threshold::unbounded()).unwrap_err();
        assert!(matches!(err, HarnessError::Configuration(_)));
        assert_eq!(agg.state(), RunState::Pending);
    }

    #[test]
    fn record_for_unknown_name_is_rejected() {
        let mut agg = Aggregator::new();
        agg.register("alpha", Threshold::unbounded()).unwrap();
        let err = agg.record("beta", verdict(true)).unwrap_err();
        assert!(matches!(err, HarnessError::Configuration(_)));
    }

    #[test]
    fn double_record_is_rejected_not_overwritten() {
        let mut agg = Aggregator::new();
        agg.register("alpha", Threshold::unbounded()).unwrap();
        agg.record("alpha", verdict(true)).unwrap();
        let err = agg.record("alpha", verdict(false)).unwrap_err();
        assert!(matches!(err, HarnessError::Configuration(_)));
        // Original verdict survives.
        let report = agg.finalize().unwrap();
        assert!(report.results[0].verdict.passed);
    }

    #[test]
    fn finalize_requires_every_verdict() {
        let mut agg = Aggregator::new();
        agg.register("alpha", Threshold::unbounded()).unwrap();
        agg.register("beta", Threshold::unbounded()).unwrap();
        agg.record("alpha", verdict(true)).unwrap();
        let err = agg.finalize().unwrap_err();
        assert!(err.to_string().contains("beta"));
        // Still running; recording beta then finalizing succeeds.
        agg.record("beta", verdict(true)).unwrap();
        let report = agg.finalize().unwrap();
        assert_eq!(report.summary.total, 2);
    }

    #[test]
    fn report_preserves_registration_order() {
        let mut agg = Aggregator::new();
        for name in ["c", "a", "b"] {
            agg.register(name, Threshold::unbounded()).unwrap();
        }
        // Completion order differs from registration order.
        agg.record("b", verdict(true)).unwrap();
        agg.record("c", verdict(true)).unwrap();
        agg.record("a", verdict(true)).unwrap();
        let report = agg.finalize().unwrap();
        let order: Vec<_> = report.results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(order, ["c", "a", "b"]);
    }

    #[test]
    fn summary_counts_mixed_results() {
        let mut agg = Aggregator::new();
        agg.register("good", Threshold::unbounded()).unwrap();
        agg.register("bad", Threshold::unbounded()).unwrap();
        agg.record("good", verdict(true)).unwrap();
        agg.record("bad", verdict(false)).unwrap();
        let report = agg.finalize().unwrap();
        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.passed, 1);
        assert_eq!(report.summary.failed, 1);
        assert!((report.summary.success_ratio - 0.5).abs() < 1e-9);
        assert!(!report.summary.all_passed);
    }

    #[test]
    fn empty_run_finalizes_as_degenerate_pass() {
        let mut agg = Aggregator::new();
        let report = agg.finalize().unwrap();
        assert_eq!(report.summary.total, 0);
        assert!((report.summary.success_ratio - 1.0).abs() < 1e-9);
        assert!(report.summary.all_passed);
        assert!(report.summary.degenerate);
        assert!(!report.summary.warnings.is_empty());
    }

    #[test]
    fn state_machine_never_skips() {
        let mut agg = Aggregator::new();
        assert_eq!(agg.state(), RunState::Pending);
        // Persisting before finalize is illegal.
        assert!(agg.mark_persisted().is_err());
        agg.register("x", Threshold::unbounded()).unwrap();
        agg.record("x", verdict(true)).unwrap();
        assert_eq!(agg.state(), RunState::Running);
        // No registration once running.
        assert!(agg.register("y", Threshold::unbounded()).is_err());
        agg.finalize().unwrap();
        assert_eq!(agg.state(), RunState::Finalized);
        // No recording after finalize.
        assert!(agg.record("x", verdict(true)).is_err());
        agg.mark_persisted().unwrap();
        assert_eq!(agg.state(), RunState::Persisted);
        assert!(agg.mark_persisted().is_err());
    }

    #[test]
    fn recommendations_deduplicate_in_first_occurrence_order() {
        let slow = |name: &str| {
            let m = Measurement {
                name: name.into(),
                started_at: Utc::now(),
                duration: Duration::from_millis(200),
                memory_before: MemorySnapshot::default(),
                memory_after: MemorySnapshot::default(),
                items: 1,
                iterations: 1,
                ok_iterations: 1,
                error: None,
            };
            evaluate(
                m,
                &Threshold::unbounded().max_duration(Duration::from_millis(1)),
            )
        };
        let mut agg = Aggregator::new();
        agg.register("slow1", Threshold::unbounded()).unwrap();
        agg.register("slow2", Threshold::unbounded()).unwrap();
        agg.record("slow1", slow("slow1")).unwrap();
        agg.record("slow2", slow("slow2")).unwrap();
        let report = agg.finalize().unwrap();
        // Two duration failures, one recommendation.
        assert_eq!(report.recommendations.len(), 1);
        assert!(report.recommendations[0].contains("profile"));
    }
}
