//! Threshold evaluation: measurements in, verdicts out.

use crate::runner::Measurement;
use crate::spec::Threshold;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One violated check. Closed set; every variant carries enough to
/// render a human-readable diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// The workload itself failed; fails the verdict regardless of timing.
    WorkloadFailed {
        /// Error recorded on the measurement.
        message: String,
    },
    /// Wall-clock duration exceeded `max_duration`.
    DurationExceeded {
        /// Measured duration in milliseconds.
        actual_ms: f64,
        /// Declared limit in milliseconds.
        limit_ms: f64,
    },
    /// Derived throughput fell below `min_throughput`.
    ThroughputBelow {
        /// Measured items per second.
        actual: f64,
        /// Declared floor in items per second.
        required: f64,
    },
    /// Resident-memory growth exceeded `max_memory_growth`.
    MemoryGrowthExceeded {
        /// Measured growth in bytes (already clamped at zero).
        actual_bytes: u64,
        /// Declared limit in bytes.
        limit_bytes: u64,
    },
    /// Success ratio fell below `min_success_ratio`.
    SuccessRatioBelow {
        /// Measured ratio of error-free iterations.
        actual: f64,
        /// Declared floor.
        required: f64,
    },
    /// The sampler or timer produced a value that invalidates a
    /// comparison; never coerced to a pass.
    MeasurementInvalid {
        /// What made the measurement unusable.
        message: String,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::WorkloadFailed { message } => write!(f, "workload failed: {message}"),
            Violation::DurationExceeded { actual_ms, limit_ms } => {
                write!(f, "duration {actual_ms:.2}ms exceeded limit {limit_ms:.2}ms")
            }
            Violation::ThroughputBelow { actual, required } => {
                write!(f, "throughput {actual:.2}/s below required {required:.2}/s")
            }
            Violation::MemoryGrowthExceeded {
                actual_bytes,
                limit_bytes,
            } => write!(
                f,
                "memory growth {actual_bytes}B exceeded limit {limit_bytes}B"
            ),
            Violation::SuccessRatioBelow { actual, required } => {
                write!(f, "success ratio {actual:.3} below required {required:.3}")
            }
            Violation::MeasurementInvalid { message } => {
                write!(f, "measurement invalid: {message}")
            }
        }
    }
}

/// Pass/fail outcome for one benchmark, with the measurement retained
/// for reporting. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    /// True when no check was violated.
    pub passed: bool,
    /// Every violated check, in evaluation order. Empty when passed.
    pub violations: Vec<Violation>,
    /// The measurement this verdict was derived from.
    pub measurement: Measurement,
}

impl Verdict {
    /// Human-readable reasons, one per violation.
    pub fn reasons(&self) -> Vec<String> {
        self.violations.iter().map(|v| v.to_string()).collect()
    }
}

/// Compare a measurement against its declared threshold.
///
/// Check order: workload error, `max_duration`, `min_throughput`,
/// `max_memory_growth`, `min_success_ratio`. All violated checks are
/// recorded, not just the first. A threshold with no bounds always
/// passes (unless the workload itself failed).
pub fn evaluate(measurement: Measurement, threshold: &Threshold) -> Verdict {
    let mut violations = Vec::new();

    if let Some(message) = &measurement.error {
        violations.push(Violation::WorkloadFailed {
            message: message.clone(),
        });
    }

    if let Some(limit) = threshold.max_duration {
        if measurement.duration > limit {
            violations.push(Violation::DurationExceeded {
                actual_ms: measurement.duration.as_secs_f64() * 1000.0,
                limit_ms: limit.as_secs_f64() * 1000.0,
            });
        }
    }

    if let Some(required) = threshold.min_throughput {
        let secs = measurement.duration.as_secs_f64();
        if secs <= 0.0 {
            // Hard evaluation error: a non-positive duration can never
            // yield a meaningful throughput.
            violations.push(Violation::MeasurementInvalid {
                message: format!(
                    "non-positive duration {secs}s for throughput computation"
                ),
            });
        } else {
            let actual = measurement.items as f64 / secs;
            if actual < required {
                violations.push(Violation::ThroughputBelow { actual, required });
            }
        }
    }

    if let Some(limit_bytes) = threshold.max_memory_growth {
        let actual_bytes = measurement.memory_growth();
        if actual_bytes > limit_bytes {
            violations.push(Violation::MemoryGrowthExceeded {
                actual_bytes,
                limit_bytes,
            });
        }
    }

    if let Some(required) = threshold.min_success_ratio {
        let actual = measurement.success_ratio();
        if actual < required {
            violations.push(Violation::SuccessRatioBelow { actual, required });
        }
    }

    Verdict {
        passed: violations.is_empty(),
        violations,
        measurement,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::MemorySnapshot;
    use chrono::Utc;
    use std::time::Duration;

    fn measurement(duration: Duration, items: u64) -> Measurement {
        Measurement {
            name: "test".into(),
            started_at: Utc::now(),
            duration,
            memory_before: MemorySnapshot { rss_bytes: 1000 },
            memory_after: MemorySnapshot { rss_bytes: 1000 },
            items,
            iterations: 1,
            ok_iterations: 1,
            error: None,
        }
    }

    #[test]
    fn unbounded_threshold_always_passes() {
        let v = evaluate(measurement(Duration::from_secs(10), 0), &Threshold::unbounded());
        assert!(v.passed);
        assert!(v.violations.is_empty());
    }

    #[test]
    fn duration_at_limit_passes_and_over_fails() {
        let t = Threshold::unbounded().max_duration(Duration::from_millis(100));
        let pass = evaluate(measurement(Duration::from_millis(100), 1), &t);
        assert!(pass.passed);

        let fail = evaluate(measurement(Duration::from_millis(101), 1), &t);
        assert!(!fail.passed);
        assert!(matches!(
            fail.violations[0],
            Violation::DurationExceeded { .. }
        ));
    }

    #[test]
    fn throughput_is_items_over_duration() {
        let t = Threshold::unbounded().min_throughput(50.0);
        // 100 items in 2s = 50/s, meets the floor exactly.
        let v = evaluate(measurement(Duration::from_secs(2), 100), &t);
        assert!(v.passed);

        let v = evaluate(measurement(Duration::from_secs(2), 99), &t);
        assert!(!v.passed);
        match &v.violations[0] {
            Violation::ThroughputBelow { actual, .. } => {
                assert!((actual - 49.5).abs() < 1e-9);
            }
            other => panic!("unexpected violation: {other:?}"),
        }
    }

    #[test]
    fn zero_duration_is_a_measurement_error_not_a_pass() {
        let t = Threshold::unbounded().min_throughput(1.0);
        let v = evaluate(measurement(Duration::ZERO, 1000), &t);
        assert!(!v.passed);
        assert!(matches!(
            v.violations[0],
            Violation::MeasurementInvalid { .. }
        ));
    }

    #[test]
    fn memory_growth_respects_limit() {
        let t = Threshold::unbounded().max_memory_growth(500);
        let mut m = measurement(Duration::from_millis(10), 1);
        m.memory_after.rss_bytes = m.memory_before.rss_bytes + 501;
        let v = evaluate(m, &t);
        assert!(!v.passed);

        // Shrinking memory clamps to zero growth and passes.
        let mut m = measurement(Duration::from_millis(10), 1);
        m.memory_after.rss_bytes = 0;
        let v = evaluate(m, &t);
        assert!(v.passed);
    }

    #[test]
    fn workload_error_fails_even_within_timing_bounds() {
        let t = Threshold::unbounded().max_duration(Duration::from_secs(10));
        let mut m = measurement(Duration::from_millis(1), 1);
        m.error = Some("connection refused".into());
        let v = evaluate(m, &t);
        assert!(!v.passed);
        assert!(matches!(v.violations[0], Violation::WorkloadFailed { .. }));
    }

    #[test]
    fn all_violations_are_recorded_not_just_the_first() {
        let t = Threshold::unbounded()
            .max_duration(Duration::from_millis(1))
            .min_throughput(1_000_000.0)
            .min_success_ratio(1.0);
        let mut m = measurement(Duration::from_millis(10), 1);
        m.ok_iterations = 0;
        m.iterations = 2;
        let v = evaluate(m, &t);
        assert_eq!(v.violations.len(), 3);
    }

    #[test]
    fn success_ratio_floor() {
        let t = Threshold::unbounded().min_success_ratio(0.9);
        let mut m = measurement(Duration::from_millis(10), 10);
        m.iterations = 10;
        m.ok_iterations = 8;
        let v = evaluate(m, &t);
        assert!(!v.passed);
        assert!(matches!(
            v.violations[0],
            Violation::SuccessRatioBelow { .. }
        ));
    }

    #[test]
    fn violation_display_is_itemized() {
        let v = Violation::DurationExceeded {
            actual_ms: 150.0,
            limit_ms: 100.0,
        };
        let text = v.to_string();
        assert!(text.contains("150.00ms"));
        assert!(text.contains("100.00ms"));
    }
}
