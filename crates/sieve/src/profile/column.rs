//! Per-column statistics snapshot.

use serde::{Deserialize, Serialize};

use super::types::ColumnType;

/// Statistics computed for one column.
///
/// A snapshot: recomputed on every profiling call and never used as
/// authoritative state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStat {
    /// Column name.
    pub name: String,
    /// Inferred logical type.
    pub inferred_type: ColumnType,
    /// Number of null/empty/whitespace-only cells.
    pub missing_count: usize,
    /// `100 * missing_count / row_count`, 0 for an empty column.
    pub missing_pct: f64,
    /// Distinct non-missing values (case-sensitive).
    pub unique_count: usize,
    /// Values outside the IQR fence; 0 for non-numeric columns.
    pub outlier_count: usize,
    /// First non-missing values in row order, for display.
    pub sample_values: Vec<String>,
    /// Distribution summary for numeric columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericSummary>,
}

/// Distribution summary for numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    /// First quartile (lower order statistic).
    pub q1: f64,
    pub median: f64,
    /// Third quartile (lower order statistic).
    pub q3: f64,
}

impl NumericSummary {
    /// Calculate the interquartile range.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

impl ColumnStat {
    /// Whether any cell is missing.
    pub fn has_missing(&self) -> bool {
        self.missing_count > 0
    }

    /// Whether any value lies outside the IQR fence.
    pub fn has_outliers(&self) -> bool {
        self.outlier_count > 0
    }
}
