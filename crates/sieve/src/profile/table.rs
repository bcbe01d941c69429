//! Dataset-level profile.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::persistence::save_json;

use super::column::ColumnStat;

/// Quality profile of an entire dataset.
///
/// Created once per profiling call and not modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetProfile {
    pub row_count: usize,
    pub column_count: usize,
    /// Rows repeating an earlier row.
    pub duplicate_row_count: usize,
    /// Estimated in-memory size of the dataset.
    pub memory_bytes: u64,
    /// Statistics keyed by column name, in column order.
    pub column_stats: IndexMap<String, ColumnStat>,
}

impl DatasetProfile {
    /// Get the statistics for a column.
    pub fn column(&self, name: &str) -> Option<&ColumnStat> {
        self.column_stats.get(name)
    }

    /// Total missing cells across all columns.
    pub fn total_missing(&self) -> usize {
        self.column_stats.values().map(|c| c.missing_count).sum()
    }

    /// Columns with at least one missing cell.
    pub fn columns_with_missing(&self) -> impl Iterator<Item = &ColumnStat> {
        self.column_stats.values().filter(|c| c.has_missing())
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save the profile as JSON, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save_json(self, path.as_ref(), "profile")
    }
}
