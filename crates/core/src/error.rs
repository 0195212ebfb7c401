//! Error types for the benchmark harness.
//!
//! The taxonomy separates failures of the harness itself from failures of
//! the operation being measured. A failing workload is data (recorded on
//! the [`crate::runner::Measurement`] and reflected in the verdict), not a
//! harness error: the run keeps going. Harness errors abort only the step
//! they belong to.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the harness itself.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Invalid benchmark registration or run setup, rejected before any
    /// benchmark executes.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A sample or timer produced a value that invalidates evaluation,
    /// e.g. a non-positive duration for a throughput computation.
    #[error("measurement error: {0}")]
    Measurement(String),

    /// Writing or reading a persisted report failed. The in-memory report
    /// is still valid and the caller may retry persistence.
    #[error("failed to persist report to {path}: {source}")]
    Persistence {
        /// Destination that could not be written or read.
        path: PathBuf,
        /// Underlying I/O or serialization error.
        #[source]
        source: std::io::Error,
    },
}

impl HarnessError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        HarnessError::Configuration(msg.into())
    }

    pub(crate) fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HarnessError::Persistence {
            path: path.into(),
            source,
        }
    }
}

/// Failure of the operation under measurement.
///
/// Carried inside a [`crate::runner::Measurement`]; always fails the
/// verdict regardless of timing thresholds.
#[derive(Debug, Clone, Error)]
#[error("workload failed: {message}")]
pub struct WorkloadError {
    /// Human-readable description of what went wrong.
    pub message: String,
}

impl WorkloadError {
    /// Create a workload error from any displayable cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for WorkloadError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for WorkloadError {
    fn from(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}
