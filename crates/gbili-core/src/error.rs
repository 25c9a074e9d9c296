//! Error types for GBILI graph construction.
//!
//! Every failure of a run is fatal and surfaces as one variant of [`Error`].
//! Error codes follow the pattern `GBILI-XXX` for easy grepping in logs.

use thiserror::Error;

/// Result type alias for GBILI operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a GBILI graph.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid run configuration (GBILI-001).
    ///
    /// Raised before any work is scheduled: zero `k1`/`k2`, a worker count
    /// of zero or larger than the number of objects, or a labeled set that
    /// is empty or references unknown objects.
    #[error("[GBILI-001] Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Not enough objects to answer the neighbor queries (GBILI-002).
    #[error("[GBILI-002] Insufficient data: {required} objects required, {available} available")]
    InsufficientData {
        /// Minimum number of objects needed (`k1 + 1`).
        required: usize,
        /// Number of objects in the dataset.
        available: usize,
    },

    /// A partition worker crashed or dropped its result channel (GBILI-003).
    #[error("[GBILI-003] Worker for partition {partition} failed: {reason}")]
    WorkerFailure {
        /// Index of the failed partition.
        partition: usize,
        /// Human-readable failure cause.
        reason: String,
    },

    /// Feature vector dimension mismatch (GBILI-004).
    #[error("[GBILI-004] Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// Invalid feature data (GBILI-005).
    #[error("[GBILI-005] Invalid vector: {0}")]
    InvalidVector(String),

    /// A worker stopped because the run was aborted (GBILI-006).
    ///
    /// Never reported as the cause of a failed run; the executor always
    /// prefers the failure that triggered the cancellation.
    #[error("[GBILI-006] Operation cancelled")]
    Cancelled,

    /// IO error (GBILI-007).
    #[error("[GBILI-007] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error (GBILI-008).
    #[error("[GBILI-008] Serialization error: {0}")]
    Serialization(String),

    /// Configuration loading error (GBILI-009).
    #[error("[GBILI-009] Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns the error code (e.g., "GBILI-001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration(_) => "GBILI-001",
            Self::InsufficientData { .. } => "GBILI-002",
            Self::WorkerFailure { .. } => "GBILI-003",
            Self::DimensionMismatch { .. } => "GBILI-004",
            Self::InvalidVector(_) => "GBILI-005",
            Self::Cancelled => "GBILI-006",
            Self::Io(_) => "GBILI-007",
            Self::Serialization(_) => "GBILI-008",
            Self::Config(_) => "GBILI-009",
        }
    }

    /// Returns true if the error was raised before any worker was scheduled.
    #[must_use]
    pub const fn is_preflight(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfiguration(_)
                | Self::InsufficientData { .. }
                | Self::DimensionMismatch { .. }
                | Self::InvalidVector(_)
                | Self::Config(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<crate::config::ConfigError> for Error {
    fn from(err: crate::config::ConfigError) -> Self {
        match err {
            crate::config::ConfigError::InvalidValue { .. } => {
                Self::InvalidConfiguration(err.to_string())
            }
            crate::config::ConfigError::ParseError(_) => Self::Config(err.to_string()),
        }
    }
}
