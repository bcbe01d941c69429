//! Aggregates column statistics into a dataset profile.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dataset::Dataset;
use crate::inference::ColumnAnalyzer;

use super::table::DatasetProfile;

/// Profiling configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilerConfig {
    /// Multiplier `k` in the outlier fence `[Q1 - k*IQR, Q3 + k*IQR]`.
    pub iqr_multiplier: f64,
    /// Fraction of non-missing values that must parse for a column to be
    /// classified numeric (or datetime). 1.0 is all-or-nothing.
    pub numeric_threshold: f64,
    /// Number of sample values kept per column.
    pub sample_size: usize,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            iqr_multiplier: 1.5,
            numeric_threshold: 1.0,
            sample_size: 5,
        }
    }
}

/// Computes [`DatasetProfile`]s.
pub struct DatasetProfiler {
    analyzer: ColumnAnalyzer,
}

impl DatasetProfiler {
    /// Create a profiler with default settings.
    pub fn new() -> Self {
        Self::with_config(&ProfilerConfig::default())
    }

    /// Create a profiler with custom settings.
    pub fn with_config(config: &ProfilerConfig) -> Self {
        Self {
            analyzer: ColumnAnalyzer::with_config(config),
        }
    }

    /// Profile a dataset.
    pub fn profile(&self, dataset: &Dataset) -> DatasetProfile {
        let column_stats = dataset
            .columns()
            .iter()
            .map(|column| (column.name().to_string(), self.analyzer.compute(column)))
            .collect();

        let duplicate_row_count = dataset
            .first_occurrence_mask()
            .iter()
            .filter(|first| !**first)
            .count();

        let profile = DatasetProfile {
            row_count: dataset.row_count(),
            column_count: dataset.column_count(),
            duplicate_row_count,
            memory_bytes: dataset.memory_bytes(),
            column_stats,
        };

        debug!(
            rows = profile.row_count,
            columns = profile.column_count,
            duplicates = profile.duplicate_row_count,
            "profiled dataset"
        );

        profile
    }
}

impl Default for DatasetProfiler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;
    use crate::profile::ColumnType;

    fn people() -> Dataset {
        Dataset::new(vec![
            Column::new("name", vec![Some("Ann"), Some("Bob"), Some("Ann"), Some("Cy")]),
            Column::new("age", vec![Some("25"), Some("30"), Some("25"), None]),
        ])
        .unwrap()
    }

    #[test]
    fn test_profile_counts() {
        let profile = DatasetProfiler::new().profile(&people());
        assert_eq!(profile.row_count, 4);
        assert_eq!(profile.column_count, 2);
        assert_eq!(profile.duplicate_row_count, 1);
        assert!(profile.memory_bytes > 0);

        let names: Vec<&str> = profile.column_stats.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["name", "age"]);
        assert_eq!(profile.column("age").unwrap().inferred_type, ColumnType::Numeric);
        assert_eq!(profile.total_missing(), 1);
    }

    #[test]
    fn test_missing_cells_compare_equal_for_duplicates() {
        let ds = Dataset::new(vec![
            Column::new("a", vec![Some("x"), Some("x"), Some("x")]),
            Column::new("b", vec![None, Some(" "), Some("y")]),
        ])
        .unwrap();
        assert_eq!(DatasetProfiler::new().profile(&ds).duplicate_row_count, 1);
    }

    #[test]
    fn test_empty_dataset() {
        let profile = DatasetProfiler::new().profile(&Dataset::default());
        assert_eq!(profile.row_count, 0);
        assert_eq!(profile.column_count, 0);
        assert_eq!(profile.duplicate_row_count, 0);
        assert!(profile.column_stats.is_empty());
    }

    #[test]
    fn test_profile_json_shape() {
        let profile = DatasetProfiler::new().profile(&people());
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["row_count"], 4);
        assert_eq!(value["duplicate_row_count"], 1);
        let age = &value["column_stats"]["age"];
        assert_eq!(age["inferred_type"], "numeric");
        assert_eq!(age["missing_pct"], 25.0);
        assert!(value["column_stats"]["name"].get("numeric").is_none());
    }

    #[test]
    fn test_custom_multiplier() {
        let ds = Dataset::new(vec![Column::new(
            "x",
            vec![Some("10"), Some("11"), Some("12"), Some("13"), Some("17")],
        )])
        .unwrap();
        // Q1 = 11, Q3 = 13, IQR = 2: 17 is outside 1.5x but inside 3x.
        let default = DatasetProfiler::new().profile(&ds);
        assert_eq!(default.column("x").unwrap().outlier_count, 1);

        let config = ProfilerConfig {
            iqr_multiplier: 3.0,
            ..ProfilerConfig::default()
        };
        let loose = DatasetProfiler::with_config(&config).profile(&ds);
        assert_eq!(loose.column("x").unwrap().outlier_count, 0);
    }
}
