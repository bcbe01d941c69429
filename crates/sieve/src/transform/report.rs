//! Execution reports: the audit trail of one plan run.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, Result};
use crate::persistence::{load_json, save_json};
use crate::plan::ActionKind;

/// Overall outcome of a plan run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    /// Every step applied (including the empty plan).
    Success,
    /// Some steps applied, some did not.
    Partial,
    /// No step applied.
    Failure,
}

impl ExecutionStatus {
    /// Status from the number of applied steps out of `total`.
    pub fn from_counts(applied: usize, total: usize) -> Self {
        if applied == total {
            ExecutionStatus::Success
        } else if applied == 0 {
            ExecutionStatus::Failure
        } else {
            ExecutionStatus::Partial
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Success => "success",
            ExecutionStatus::Partial => "partial",
            ExecutionStatus::Failure => "failure",
        }
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepState {
    /// Not attempted (the run was cancelled first).
    Pending,
    Applied,
    Failed,
}

/// Per-step entry in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Position in the plan (0-based).
    pub index: usize,
    pub action: ActionKind,
    pub state: StepState,
    #[serde(default)]
    pub reasoning: String,
}

/// A step that failed, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepFailure {
    pub step_index: usize,
    pub error_kind: ErrorKind,
    pub message: String,
}

/// Rows marked by a `flag_outliers` step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierFlag {
    /// Index of the step that produced the flag.
    pub step: usize,
    pub column: String,
    /// Row positions in the dataset as it stood when the step ran.
    pub rows: Vec<usize>,
}

/// Result of executing a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub status: ExecutionStatus,

    /// One changelog entry per applied step, in plan order.
    #[serde(rename = "report", alias = "applied_steps")]
    pub applied_steps: Vec<String>,

    /// Failed steps, in plan order.
    #[serde(default)]
    pub errors: Vec<StepFailure>,

    /// Data-integrity conditions left by applied steps.
    #[serde(default)]
    pub warnings: Vec<String>,

    #[serde(default)]
    pub flags: Vec<OutlierFlag>,

    /// State of every step in the plan.
    #[serde(default)]
    pub steps: Vec<StepRecord>,

    /// Whether the run stopped early on request.
    #[serde(default)]
    pub cancelled: bool,

    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,
}

impl ExecutionReport {
    /// Number of steps that applied.
    pub fn applied_count(&self) -> usize {
        self.applied_steps.len()
    }

    /// Number of steps that failed.
    pub fn failed_count(&self) -> usize {
        self.errors.len()
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save the report as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save_json(self, path.as_ref(), "execution report")
    }

    /// Load a report saved with [`ExecutionReport::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        load_json(path.as_ref(), "execution report")
    }
}
