//! Synthetic workload generators and simulated latency.
//!
//! Generators are pure functions over a target size: deterministic shape,
//! non-deterministic content. Each uses the thread-local RNG, so they are
//! safe to call from any number of concurrent workers. Output size is
//! bounded exactly by the requested target, never "at least".

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const WORD_POOL: &[&str] = &[
    "analytics", "pipeline", "latency", "report", "campaign", "segment",
    "variant", "baseline", "payload", "throughput", "record", "metric",
    "session", "channel", "audience", "rollout", "snapshot", "budget",
];

/// Exactly `len` pseudo-random bytes.
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| rng.gen::<u8>()).collect()
}

/// Exactly `words` whitespace-separated words of filler text.
pub fn random_text(words: usize) -> String {
    let mut rng = rand::thread_rng();
    let mut out = Vec::with_capacity(words);
    for _ in 0..words {
        // WORD_POOL is non-empty, choose cannot return None
        if let Some(word) = WORD_POOL.choose(&mut rng) {
            out.push(*word);
        }
    }
    out.join(" ")
}

/// Exactly `count` JSON records with a fixed shape and randomized content.
///
/// Stands in for the batch-creation workloads real suites would run
/// against an application; the harness only needs payloads it can count
/// and time.
pub fn batch_records(count: usize) -> Vec<serde_json::Value> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|i| {
            serde_json::json!({
                "id": i,
                "name": format!("record-{i}"),
                "score": rng.gen_range(0.0..100.0f64),
                "active": rng.gen_bool(0.5),
                "tags": random_text(3),
            })
        })
        .collect()
}

/// Closed set of simulated operation weights.
///
/// Replaces open-ended string dispatch with an exhaustive enum: every
/// complexity class maps to exactly one simulated latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    /// Cheap lookup, e.g. a cached read.
    Light,
    /// Typical indexed query or small render.
    Moderate,
    /// Joins, aggregation, or large serialization.
    Heavy,
    /// Worst-case reporting or cross-table scans.
    Extreme,
}

impl Complexity {
    /// Simulated latency for this class.
    pub fn simulated_delay(self) -> Duration {
        match self {
            Complexity::Light => Duration::from_millis(2),
            Complexity::Moderate => Duration::from_millis(10),
            Complexity::Heavy => Duration::from_millis(40),
            Complexity::Extreme => Duration::from_millis(120),
        }
    }
}

/// Injectable source of simulated I/O latency.
///
/// Workloads pause through this seam instead of sleeping directly, so
/// harness tests can substitute [`NoLatency`] and measure the harness
/// rather than the simulated timing.
pub trait LatencyProvider: Send + Sync {
    /// Block the calling worker for the latency of `class`.
    fn pause(&self, class: Complexity);
}

/// Sleeps for the delay mapped from each complexity class.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedLatency;

impl LatencyProvider for SimulatedLatency {
    fn pause(&self, class: Complexity) {
        std::thread::sleep(class.simulated_delay());
    }
}

/// Zero-latency stand-in for tests of the harness itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLatency;

impl LatencyProvider for NoLatency {
    fn pause(&self, _class: Complexity) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_are_exact_length() {
        for len in [0, 1, 17, 4096] {
            assert_eq!(random_bytes(len).len(), len);
        }
    }

    #[test]
    fn text_has_exact_word_count() {
        assert_eq!(random_text(0).split_whitespace().count(), 0);
        assert_eq!(random_text(1).split_whitespace().count(), 1);
        assert_eq!(random_text(250).split_whitespace().count(), 250);
    }

    #[test]
    fn batch_has_exact_record_count() {
        let records = batch_records(32);
        assert_eq!(records.len(), 32);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record["id"], i);
            assert!(record["score"].as_f64().is_some());
        }
    }

    #[test]
    fn generators_are_concurrency_safe() {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                std::thread::spawn(|| {
                    for _ in 0..50 {
                        assert_eq!(random_bytes(64).len(), 64);
                        assert_eq!(batch_records(5).len(), 5);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn complexity_delays_are_ordered() {
        assert!(Complexity::Light.simulated_delay() < Complexity::Moderate.simulated_delay());
        assert!(Complexity::Moderate.simulated_delay() < Complexity::Heavy.simulated_delay());
        assert!(Complexity::Heavy.simulated_delay() < Complexity::Extreme.simulated_delay());
    }

    #[test]
    fn no_latency_returns_immediately() {
        let start = std::time::Instant::now();
        NoLatency.pause(Complexity::Extreme);
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
