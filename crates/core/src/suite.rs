//! Built-in benchmark suites.
//!
//! Synthetic stand-ins for the workload classes real deployments gate
//! on: bulk record creation, dashboard assembly, API payload rendering,
//! repeated query timing, memory churn, and concurrent fan-out. Every
//! workload is driven purely by the generators plus an injected
//! [`LatencyProvider`], so the suites run without any application under
//! test.

use crate::spec::{BenchmarkSpec, Threshold};
use crate::workload::{batch_records, random_bytes, random_text, Complexity, LatencyProvider};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Which built-in suite to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuiteKind {
    /// Tiny bounds, fast; suitable for CI gating of the harness itself.
    Smoke,
    /// The sequential workload mix with production-shaped thresholds.
    Standard,
    /// Concurrent fan-out benchmarks.
    Stress,
}

impl SuiteKind {
    /// Build the suite's benchmark specs with the given latency source.
    pub fn specs(self, latency: Arc<dyn LatencyProvider>) -> Vec<BenchmarkSpec> {
        match self {
            SuiteKind::Smoke => smoke_suite(),
            SuiteKind::Standard => standard_suite(latency),
            SuiteKind::Stress => stress_suite(latency),
        }
    }
}

impl std::fmt::Display for SuiteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SuiteKind::Smoke => "smoke",
            SuiteKind::Standard => "standard",
            SuiteKind::Stress => "stress",
        };
        f.write_str(name)
    }
}

fn smoke_suite() -> Vec<BenchmarkSpec> {
    vec![
        BenchmarkSpec::new(
            "smoke/byte-generation",
            Threshold::unbounded().max_duration(Duration::from_secs(2)),
            || {
                let payload = random_bytes(16 * 1024);
                Ok(payload.len() as u64)
            },
        ),
        BenchmarkSpec::new(
            "smoke/text-generation",
            Threshold::unbounded()
                .max_duration(Duration::from_secs(2))
                .min_throughput(100.0),
            || {
                let text = random_text(1000);
                Ok(text.split_whitespace().count() as u64)
            },
        ),
        BenchmarkSpec::new(
            "smoke/record-batch",
            Threshold::unbounded().max_duration(Duration::from_secs(2)),
            || Ok(batch_records(100).len() as u64),
        ),
    ]
}

fn standard_suite(latency: Arc<dyn LatencyProvider>) -> Vec<BenchmarkSpec> {
    let dashboard_latency = latency.clone();
    let query_latency = latency.clone();
    let api_latency = latency;

    vec![
        BenchmarkSpec::new(
            "standard/bulk-insert",
            Threshold::unbounded()
                .max_duration(Duration::from_secs(5))
                .min_throughput(100.0),
            || {
                let records = batch_records(500);
                Ok(records.len() as u64)
            },
        ),
        BenchmarkSpec::new(
            "standard/dashboard-load",
            Threshold::unbounded().max_duration(Duration::from_secs(3)),
            move || {
                // Six panels: a heavy aggregate plus lighter widgets.
                dashboard_latency.pause(Complexity::Heavy);
                for _ in 0..5 {
                    dashboard_latency.pause(Complexity::Light);
                    let _ = batch_records(25);
                }
                Ok(6)
            },
        ),
        BenchmarkSpec::new(
            "standard/api-response",
            Threshold::unbounded()
                .max_duration(Duration::from_secs(2))
                .max_memory_growth(256 * 1024 * 1024),
            move || {
                api_latency.pause(Complexity::Moderate);
                let body = serde_json::to_vec(&batch_records(200))
                    .map_err(|e| crate::error::WorkloadError::new(e.to_string()))?;
                let _ = random_bytes(body.len().min(64 * 1024));
                Ok(1)
            },
        ),
        BenchmarkSpec::new(
            "standard/query-timing",
            Threshold::unbounded()
                .max_duration(Duration::from_secs(5))
                .min_throughput(5.0),
            move || {
                for _ in 0..20 {
                    query_latency.pause(Complexity::Light);
                }
                Ok(20)
            },
        ),
        BenchmarkSpec::new(
            "standard/memory-churn",
            Threshold::unbounded().max_memory_growth(512 * 1024 * 1024),
            || {
                let mut retained = Vec::new();
                for _ in 0..50 {
                    retained.push(random_bytes(64 * 1024));
                }
                Ok(retained.len() as u64)
            },
        ),
    ]
}

fn stress_suite(latency: Arc<dyn LatencyProvider>) -> Vec<BenchmarkSpec> {
    let read_latency = latency.clone();
    let write_latency = latency;

    vec![
        BenchmarkSpec::concurrent(
            "stress/concurrent-read",
            Threshold::unbounded()
                .max_duration(Duration::from_secs(30))
                .min_success_ratio(0.95),
            8,
            5,
            move || {
                read_latency.pause(Complexity::Light);
                let _ = random_text(50);
                Ok(1)
            },
        ),
        BenchmarkSpec::concurrent(
            "stress/concurrent-write",
            Threshold::unbounded()
                .max_duration(Duration::from_secs(30))
                .min_success_ratio(0.9),
            4,
            10,
            move || {
                write_latency.pause(Complexity::Moderate);
                Ok(batch_records(20).len() as u64)
            },
        ),
    ]
}
