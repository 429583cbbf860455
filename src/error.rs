//! Error taxonomy for loading, aligning and aggregating run data
//!
//! Errors raised for one run or group are fatal to that group only. The
//! pipeline records them and keeps going with the remaining groups.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the statistics pipeline
#[derive(Error, Debug)]
pub enum StatError {
    #[error("Malformed log {}:{}: {}", path.display(), line, reason)]
    MalformedLog {
        path: PathBuf,
        /// 1-based line number, 0 when the problem concerns the whole file
        line: usize,
        reason: String,
    },

    #[error("Degenerate sample: need at least {required} runs, got {actual}")]
    DegenerateSample { required: usize, actual: usize },

    #[error("Series length mismatch: expected {expected} slots, got {actual}")]
    SeriesLengthMismatch { expected: usize, actual: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Statistics computation failed: {0}")]
    Statistics(String),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StatError {
    /// Build a `MalformedLog` error for a specific line
    pub fn malformed(path: impl Into<PathBuf>, line: usize, reason: impl Into<String>) -> Self {
        StatError::MalformedLog {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, StatError>;
