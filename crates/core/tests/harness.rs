//! End-to-end: register, run, finalize, persist, read back.

use perfgate_core::workload::NoLatency;
use perfgate_core::{BenchmarkSpec, Harness, RunReport, RunState, SuiteKind, Threshold};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn full_run_persists_and_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reports").join("run.json");

    let mut harness = Harness::new();
    harness
        .register(BenchmarkSpec::new(
            "pass/quick",
            Threshold::unbounded().max_duration(Duration::from_secs(5)),
            || Ok(10),
        ))
        .unwrap();
    harness
        .register(BenchmarkSpec::new(
            "fail/slow",
            Threshold::unbounded().max_duration(Duration::from_millis(1)),
            || {
                std::thread::sleep(Duration::from_millis(20));
                Ok(1)
            },
        ))
        .unwrap();

    let report = harness.run_all().unwrap();
    assert_eq!(harness.state(), RunState::Finalized);
    assert_eq!(report.summary.total, 2);
    assert_eq!(report.summary.passed, 1);
    assert!(!report.summary.all_passed);
    assert!(!report.recommendations.is_empty());

    harness.persist(&report, &path).unwrap();
    assert_eq!(harness.state(), RunState::Persisted);
    // Atomic write leaves no temp file behind.
    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());

    let loaded = RunReport::load(&path).unwrap();
    assert_eq!(loaded.run_id, report.run_id);
    assert_eq!(loaded.summary.total, report.summary.total);
    assert_eq!(loaded.summary.passed, report.summary.passed);
    assert_eq!(loaded.summary.failed, report.summary.failed);
    assert_eq!(loaded.results.len(), report.results.len());
    assert_eq!(loaded.thresholds.len(), 2);
    assert_eq!(loaded.results[1].verdict.reasons(), report.results[1].verdict.reasons());
}

#[test]
fn persist_failure_keeps_report_usable() {
    let mut harness = Harness::new();
    harness
        .register(BenchmarkSpec::new("only", Threshold::unbounded(), || Ok(1)))
        .unwrap();
    let report = harness.run_all().unwrap();

    // A directory path cannot be written as a file.
    let dir = tempfile::tempdir().unwrap();
    let err = harness.persist(&report, dir.path());
    assert!(err.is_err());
    assert_eq!(harness.state(), RunState::Finalized);

    // Retry to a valid destination succeeds with the same report.
    let path = dir.path().join("retry.json");
    harness.persist(&report, &path).unwrap();
    assert_eq!(harness.state(), RunState::Persisted);
    assert_eq!(RunReport::load(&path).unwrap().summary.total, 1);
}

#[test]
fn builtin_smoke_suite_gates_green() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("smoke.json");

    let mut harness = Harness::new();
    harness
        .register_all(SuiteKind::Smoke.specs(Arc::new(NoLatency)))
        .unwrap();
    let report = harness.run_all().unwrap();
    assert!(report.summary.all_passed, "failures: {:?}", report.failures());
    harness.persist(&report, &path).unwrap();

    let loaded = RunReport::load(&path).unwrap();
    assert!(loaded.summary.all_passed);
    assert!(loaded.recommendations.is_empty());
}
