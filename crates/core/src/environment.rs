//! Environment descriptors embedded in run reports.

use serde::{Deserialize, Serialize};

/// The subset of host information that needs no external commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentInfo {
    /// Operating system family.
    pub os: String,
    /// CPU architecture.
    pub arch: String,
    /// Logical CPU core count.
    pub cpu_cores: u32,
    /// Process id of the harness.
    pub pid: u32,
    /// Build profile the harness was compiled with.
    pub build_profile: String,
}

impl EnvironmentInfo {
    /// Collect descriptors for the current process.
    pub fn collect() -> Self {
        let cpu_cores = std::thread::available_parallelism()
            .map(|p| p.get() as u32)
            .unwrap_or(1);
        let build_profile = if cfg!(debug_assertions) {
            "debug".to_string()
        } else {
            "release".to_string()
        };
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            cpu_cores,
            pid: std::process::id(),
            build_profile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_is_populated() {
        let env = EnvironmentInfo::collect();
        assert!(!env.os.is_empty());
        assert!(!env.arch.is_empty());
        assert!(env.cpu_cores > 0);
    }
}
