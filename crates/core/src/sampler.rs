//! Wall-clock and process-memory sampling.
//!
//! Memory readings are best-effort: on platforms without a usable RSS
//! source (or inside sandboxes that hide it) the sample carries a zero
//! sentinel instead of an error. A benchmark is never aborted because
//! memory introspection is unavailable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// One point-in-time reading of the clock and process memory.
#[derive(Debug, Clone, Copy)]
pub struct ResourceSample {
    /// UTC timestamp of the sample (millisecond resolution or better).
    pub timestamp: DateTime<Utc>,
    /// Monotonic instant, used for duration arithmetic.
    pub instant: Instant,
    /// Resident set size in bytes; zero when the host cannot report it.
    pub memory_bytes: u64,
}

impl ResourceSample {
    /// Capture the current clock and memory state.
    pub fn capture() -> Self {
        Self {
            timestamp: Utc::now(),
            instant: Instant::now(),
            memory_bytes: current_rss_bytes(),
        }
    }
}

/// Serializable snapshot of process memory, embedded in measurements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    /// Resident set size in bytes (best-effort, zero if unavailable).
    pub rss_bytes: u64,
}

impl MemorySnapshot {
    /// Capture the current resident set size.
    pub fn capture() -> Self {
        Self {
            rss_bytes: current_rss_bytes(),
        }
    }

    /// RSS in mebibytes, for display.
    pub fn rss_mb(&self) -> f64 {
        self.rss_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Current resident set size of this process, in bytes.
///
/// Returns 0 when the platform offers no readable source.
pub fn current_rss_bytes() -> u64 {
    #[cfg(target_os = "linux")]
    {
        rss_linux()
    }
    #[cfg(target_os = "macos")]
    {
        rss_macos()
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        0
    }
}

#[cfg(target_os = "linux")]
fn rss_linux() -> u64 {
    // /proc/self/statm: total pages, resident pages, ...
    match std::fs::read_to_string("/proc/self/statm") {
        Ok(content) => {
            let rss_pages = content
                .split_whitespace()
                .nth(1)
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(0);
            rss_pages * page_size_bytes()
        }
        Err(_) => 0,
    }
}

#[cfg(target_os = "linux")]
fn page_size_bytes() -> u64 {
    // statm reports pages; assume the common 4 KiB page size.
    4096
}

#[cfg(target_os = "macos")]
fn rss_macos() -> u64 {
    use std::process::Command;
    let output = Command::new("ps")
        .args(["-o", "rss=", "-p", &std::process::id().to_string()])
        .output();
    match output {
        Ok(out) => String::from_utf8_lossy(&out.stdout)
            .trim()
            .parse::<u64>()
            .map(|kb| kb * 1024)
            .unwrap_or(0),
        Err(_) => 0,
    }
}
