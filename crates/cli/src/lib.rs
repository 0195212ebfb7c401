//! CLI for the perfgate benchmark harness.
//!
//! Provides the `run` subcommand that executes a built-in suite, writes
//! the JSON report (and optionally a markdown summary), prints an
//! itemized pass/fail list, and signals the overall verdict through the
//! process exit code for use in automated gating.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use perfgate_core::workload::{LatencyProvider, NoLatency, SimulatedLatency};
use perfgate_core::{Harness, RunReport, SuiteKind};
use std::path::PathBuf;
use std::sync::Arc;

/// Perfgate CLI.
#[derive(Parser, Debug)]
#[command(name = "perfgate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a benchmark suite and write its report.
    ///
    /// Exits 0 only if every benchmark passed its thresholds, so the
    /// command can gate CI pipelines directly.
    Run {
        /// Which built-in suite to run.
        #[arg(short, long, value_enum, default_value_t = SuiteKind::Standard)]
        suite: SuiteKind,

        /// Directory reports are written into; the file name is
        /// run-scoped with a timestamp.
        #[arg(short, long, default_value = "reports")]
        output: PathBuf,

        /// Also write a markdown summary next to the JSON report.
        #[arg(long)]
        markdown: bool,

        /// Replace simulated latency with a zero-latency stand-in.
        #[arg(long)]
        zero_latency: bool,
    },

    /// List the benchmarks a suite would run, with their thresholds.
    List {
        /// Which built-in suite to describe.
        #[arg(short, long, value_enum, default_value_t = SuiteKind::Standard)]
        suite: SuiteKind,
    },
}

/// Run the CLI with the given arguments.
///
/// Returns the process exit code: 0 when every verdict passed.
pub fn run() -> anyhow::Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            suite,
            output,
            markdown,
            zero_latency,
        } => run_suite(suite, output, markdown, zero_latency),
        Commands::List { suite } => {
            list_suite(suite);
            Ok(0)
        }
    }
}

fn run_suite(
    suite: SuiteKind,
    output: PathBuf,
    markdown: bool,
    zero_latency: bool,
) -> anyhow::Result<i32> {
    let latency: Arc<dyn LatencyProvider> = if zero_latency {
        Arc::new(NoLatency)
    } else {
        Arc::new(SimulatedLatency)
    };

    let mut harness = Harness::new();
    harness
        .register_all(suite.specs(latency))
        .context("failed to register benchmark suite")?;

    println!("Running suite '{suite}'...");
    let report = harness.run_all().context("benchmark run failed")?;

    let stamp = Utc::now().format("%Y%m%dT%H%M%SZ");
    let json_path = output.join(format!("perfgate-{suite}-{stamp}.json"));
    harness
        .persist(&report, &json_path)
        .context("failed to persist report")?;
    println!("Report written to {}", json_path.display());

    if markdown {
        let md_path = json_path.with_extension("md");
        std::fs::write(&md_path, perfgate_core::markdown::generate_summary(&report))
            .with_context(|| format!("failed to write {}", md_path.display()))?;
        println!("Summary written to {}", md_path.display());
    }

    print_outcome(&report);
    Ok(if report.summary.all_passed { 0 } else { 1 })
}

fn print_outcome(report: &RunReport) {
    println!();
    for outcome in &report.results {
        let status = if outcome.verdict.passed { "PASS" } else { "FAIL" };
        println!(
            "  [{status}] {} ({:.2}ms, {} items)",
            outcome.name,
            outcome.verdict.measurement.duration_ms(),
            outcome.verdict.measurement.items,
        );
        for reason in outcome.verdict.reasons() {
            println!("         - {reason}");
        }
    }
    println!();
    println!(
        "{}/{} passed ({:.1}%)",
        report.summary.passed,
        report.summary.total,
        report.summary.success_ratio * 100.0
    );
    for warning in &report.summary.warnings {
        println!("warning: {warning}");
    }
    if !report.recommendations.is_empty() {
        println!();
        println!("Recommendations:");
        for recommendation in &report.recommendations {
            println!("  - {recommendation}");
        }
    }
}

fn list_suite(suite: SuiteKind) {
    let specs = suite.specs(Arc::new(NoLatency));
    println!("Suite '{suite}' ({} benchmarks):", specs.len());
    for spec in &specs {
        println!("  {} [{:?}]", spec.name, spec.mode);
        if let Some(limit) = spec.threshold.max_duration {
            println!("    max_duration: {limit:?}");
        }
        if let Some(floor) = spec.threshold.min_throughput {
            println!("    min_throughput: {floor}/s");
        }
        if let Some(limit) = spec.threshold.max_memory_growth {
            println!("    max_memory_growth: {limit} bytes");
        }
        if let Some(floor) = spec.threshold.min_success_ratio {
            println!("    min_success_ratio: {floor}");
        }
        if spec.threshold.is_unbounded() {
            println!("    (no bounds; always passes)");
        }
    }
}

/// Initialize structured logging from `RUST_LOG`, defaulting to warnings.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();
}
