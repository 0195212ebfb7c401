//! Markdown rendering for run reports.

use crate::report::RunReport;
use std::fmt::Write;

/// Generate a markdown summary table for a run report.
pub fn generate_summary(report: &RunReport) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Benchmark Run {}", report.run_id);
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "Generated: {}",
        report.execution.finished_at.to_rfc3339()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Results");
    let _ = writeln!(output);
    let _ = writeln!(output, "| Benchmark | Status | Duration | Items | Reasons |");
    let _ = writeln!(output, "|-----------|--------|----------|-------|---------|");

    for outcome in &report.results {
        let status = if outcome.verdict.passed {
            "PASS"
        } else {
            "FAIL"
        };
        let reasons = outcome.verdict.reasons().join("; ");
        let _ = writeln!(
            output,
            "| {} | {} | {:.2}ms | {} | {} |",
            outcome.name,
            status,
            outcome.verdict.measurement.duration_ms(),
            outcome.verdict.measurement.items,
            if reasons.is_empty() { "-" } else { reasons.as_str() },
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "---");
    let _ = writeln!(
        output,
        "Total: {} | Passed: {} | Success ratio: {:.1}%",
        report.summary.total,
        report.summary.passed,
        report.summary.success_ratio * 100.0
    );

    if !report.recommendations.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Recommendations");
        let _ = writeln!(output);
        for recommendation in &report.recommendations {
            let _ = writeln!(output, "- {recommendation}");
        }
    }

    output
}

/// Generate a detailed markdown report with per-benchmark JSON payloads.
pub fn generate_detailed_report(report: &RunReport) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Detailed Benchmark Report");
    let _ = writeln!(output);
    let _ = writeln!(output, "Run: {}", report.run_id);
    let _ = writeln!(output);

    for outcome in &report.results {
        let _ = writeln!(output, "## {}", outcome.name);
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "**Status:** {}",
            if outcome.verdict.passed { "PASS" } else { "FAIL" }
        );
        let _ = writeln!(output);
        let _ = writeln!(output, "```json");
        let _ = writeln!(
            output,
            "{}",
            serde_json::to_string_pretty(&outcome.verdict).unwrap_or_default()
        );
        let _ = writeln!(output, "```");
        let _ = writeln!(output);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Aggregator;
    use crate::runner::Measurement;
    use crate::sampler::MemorySnapshot;
    use crate::spec::Threshold;
    use crate::verdict::evaluate;
    use chrono::Utc;
    use std::time::Duration;

    fn sample_report() -> RunReport {
        let mut agg = Aggregator::new();
        agg.register("fast", Threshold::unbounded()).unwrap();
        let m = Measurement {
            name: "fast".into(),
            started_at: Utc::now(),
            duration: Duration::from_millis(12),
            memory_before: MemorySnapshot::default(),
            memory_after: MemorySnapshot::default(),
            items: 5,
            iterations: 1,
            ok_iterations: 1,
            error: None,
        };
        agg.record("fast", evaluate(m, &Threshold::unbounded()))
            .unwrap();
        agg.finalize().unwrap()
    }

    #[test]
    fn summary_contains_table_and_totals() {
        let text = generate_summary(&sample_report());
        assert!(text.contains("| fast | PASS |"));
        assert!(text.contains("Total: 1 | Passed: 1"));
    }

    #[test]
    fn detailed_report_embeds_json() {
        let text = generate_detailed_report(&sample_report());
        assert!(text.contains("## fast"));
        assert!(text.contains("```json"));
    }
}
