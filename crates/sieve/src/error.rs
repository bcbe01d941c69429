//! Error types for the Sieve library.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Sieve operations.
///
/// These errors abort an operation wholesale. Failures scoped to a single
/// plan step are reported through [`StepError`] instead and never escape the
/// plan executor.
#[derive(Debug, Error)]
pub enum SieveError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File format not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Empty file or no data to analyze.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Columns of unequal length or duplicate column names.
    #[error("Invalid dataset shape: {0}")]
    Shape(String),

    /// The plan is not a JSON array of well-formed steps.
    #[error("Invalid plan at step {step}: {message}")]
    InvalidPlan { step: usize, message: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error writing results to disk.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SieveError {
    /// Build an [`SieveError::Io`] for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SieveError::Io {
            path: path.into(),
            source,
        }
    }

    /// Build an [`SieveError::InvalidPlan`] for step `step`.
    pub fn invalid_plan(step: usize, message: impl Into<String>) -> Self {
        SieveError::InvalidPlan {
            step,
            message: message.into(),
        }
    }
}

/// Result type alias for Sieve operations.
pub type Result<T> = std::result::Result<T, SieveError>;

/// Category of a per-step failure, as serialized in execution reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A parameter refers to something that does not exist (e.g. a column).
    Validation,
    /// The column does not have the logical type the action needs.
    TypeMismatch,
    /// The data cannot support the action (e.g. nothing to compute a mode from).
    DataIntegrity,
}

impl ErrorKind {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "ValidationError",
            ErrorKind::TypeMismatch => "TypeMismatchError",
            ErrorKind::DataIntegrity => "DataIntegrityError",
        }
    }
}

/// Failure of a single plan step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StepError {
    /// Referenced column or parameter is invalid for the current dataset.
    #[error("{0}")]
    Validation(String),

    /// Column type does not support the requested action.
    #[error("column '{column}' is {actual}, but {action} requires {expected}")]
    TypeMismatch {
        column: String,
        action: &'static str,
        expected: &'static str,
        actual: String,
    },

    /// Data cannot support the requested action.
    #[error("{0}")]
    DataIntegrity(String),
}

impl StepError {
    /// Error for a column name that is not in the dataset.
    pub fn unknown_column(name: &str) -> Self {
        StepError::Validation(format!("column '{}' not found", name))
    }

    /// The error category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StepError::Validation(_) => ErrorKind::Validation,
            StepError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            StepError::DataIntegrity(_) => ErrorKind::DataIntegrity,
        }
    }
}
