//! Per-column statistics: type, missingness, cardinality, outliers.

use std::collections::HashSet;

use tracing::trace;

use crate::dataset::Column;
use crate::profile::{ColumnStat, ColumnType, NumericSummary, ProfilerConfig};

use super::classify::{parse_number, TypeClassifier};

// =============================================================================
// ORDER STATISTICS
// =============================================================================

/// Lower order-statistic quantile of sorted values: `sorted[floor(p * (n - 1))]`.
///
/// Returns 0 for an empty slice.
pub fn quantile_lower(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = (p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64).floor() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Median of sorted values, averaging the two middle values for even counts.
pub fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    match n {
        0 => 0.0,
        _ if n % 2 == 1 => sorted[n / 2],
        // Halve before adding so two large values cannot overflow.
        _ => sorted[n / 2 - 1] / 2.0 + sorted[n / 2] / 2.0,
    }
}

/// Arithmetic mean (0 for no values).
///
/// Falls back to a running mean when the plain sum overflows, so the result
/// is finite for any finite input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let sum = values.iter().sum::<f64>();
    if sum.is_finite() {
        return sum / n;
    }
    values.iter().enumerate().fold(0.0, |m, (i, &v)| {
        let k = (i + 1) as f64;
        m + v / k - m / k
    })
}

/// Population standard deviation (0 for fewer than two values).
///
/// Rescales by the largest magnitude when the variance overflows.
pub fn population_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    if variance.is_finite() {
        return variance.sqrt();
    }

    let scale = values.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return variance.sqrt();
    }
    let scaled: Vec<f64> = values.iter().map(|v| v / scale).collect();
    scale * population_std(&scaled)
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Inclusive bounds outside which a value is an outlier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IqrFence {
    pub lower: f64,
    pub upper: f64,
}

impl IqrFence {
    /// Fence `[Q1 - k*IQR, Q3 + k*IQR]` over the given values.
    pub fn from_values(values: &[f64], multiplier: f64) -> Self {
        let sorted = sorted(values);
        let q1 = quantile_lower(&sorted, 0.25);
        let q3 = quantile_lower(&sorted, 0.75);
        let iqr = q3 - q1;
        Self {
            lower: q1 - multiplier * iqr,
            upper: q3 + multiplier * iqr,
        }
    }

    /// Whether `value` lies outside the fence.
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }
}

impl NumericSummary {
    /// Summarize a non-empty set of values.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let sorted = sorted(values);
        Some(Self {
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            mean: mean(values),
            std: population_std(values),
            q1: quantile_lower(&sorted, 0.25),
            median: median(&sorted),
            q3: quantile_lower(&sorted, 0.75),
        })
    }
}

// =============================================================================
// COLUMN ANALYZER
// =============================================================================

/// Computes [`ColumnStat`] snapshots for columns.
#[derive(Debug, Clone)]
pub struct ColumnAnalyzer {
    classifier: TypeClassifier,
    iqr_multiplier: f64,
    sample_size: usize,
}

impl ColumnAnalyzer {
    /// Create an analyzer with default settings.
    pub fn new() -> Self {
        Self::with_config(&ProfilerConfig::default())
    }

    /// Create an analyzer from profiler settings.
    pub fn with_config(config: &ProfilerConfig) -> Self {
        Self {
            classifier: TypeClassifier::with_threshold(config.numeric_threshold),
            iqr_multiplier: config.iqr_multiplier,
            sample_size: config.sample_size,
        }
    }

    /// Logical type of a column, honoring an explicit conversion.
    pub fn column_type(&self, column: &Column) -> ColumnType {
        if let Some(declared) = column.declared_type() {
            return declared;
        }
        self.classifier.classify(column.present().map(|(_, v)| v))
    }

    /// Parsed `(row, value)` pairs of a column's numeric cells.
    pub fn numeric_values(&self, column: &Column) -> Vec<(usize, f64)> {
        column
            .present()
            .filter_map(|(row, v)| parse_number(v).map(|n| (row, n)))
            .collect()
    }

    /// Rows of a numeric column lying outside the IQR fence.
    ///
    /// Returns an empty list for non-numeric columns.
    pub fn outlier_rows(&self, column: &Column) -> Vec<usize> {
        if self.column_type(column) != ColumnType::Numeric {
            return Vec::new();
        }
        self.numeric_outliers(&self.numeric_values(column))
    }

    fn numeric_outliers(&self, pairs: &[(usize, f64)]) -> Vec<usize> {
        let values: Vec<f64> = pairs.iter().map(|(_, v)| *v).collect();
        if values.is_empty() {
            return Vec::new();
        }
        let fence = IqrFence::from_values(&values, self.iqr_multiplier);
        pairs
            .iter()
            .filter(|(_, v)| fence.is_outlier(*v))
            .map(|(row, _)| *row)
            .collect()
    }

    /// Compute statistics for one column.
    pub fn compute(&self, column: &Column) -> ColumnStat {
        let row_count = column.len();
        let missing_count = column.missing_count();
        let missing_pct = if row_count == 0 {
            0.0
        } else {
            100.0 * missing_count as f64 / row_count as f64
        };

        let unique_count = column
            .present()
            .map(|(_, v)| v)
            .collect::<HashSet<&str>>()
            .len();

        let sample_values: Vec<String> = column
            .present()
            .take(self.sample_size)
            .map(|(_, v)| v.to_string())
            .collect();

        let inferred_type = self.column_type(column);

        let (outlier_count, numeric) = if inferred_type == ColumnType::Numeric {
            let pairs = self.numeric_values(column);
            let values: Vec<f64> = pairs.iter().map(|(_, v)| *v).collect();
            (
                self.numeric_outliers(&pairs).len(),
                NumericSummary::from_values(&values),
            )
        } else {
            (0, None)
        };

        trace!(
            column = column.name(),
            ?inferred_type,
            missing_count,
            unique_count,
            outlier_count,
            "computed column statistics"
        );

        ColumnStat {
            name: column.name().to_string(),
            inferred_type,
            missing_count,
            missing_pct,
            unique_count,
            outlier_count,
            sample_values,
            numeric,
        }
    }
}

impl Default for ColumnAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(values: &[Option<&str>]) -> Column {
        Column::new("col", values.iter().copied())
    }

    #[test]
    fn test_age_example() {
        let stat = ColumnAnalyzer::new().compute(&column(&[
            Some("25"),
            Some("30"),
            None,
            Some("200"),
        ]));

        assert_eq!(stat.inferred_type, ColumnType::Numeric);
        assert_eq!(stat.missing_count, 1);
        assert_eq!(stat.missing_pct, 25.0);
        assert_eq!(stat.unique_count, 3);
        assert_eq!(stat.outlier_count, 1);
        assert_eq!(stat.sample_values, vec!["25", "30", "200"]);
    }

    #[test]
    fn test_empty_column_defaults() {
        let stat = ColumnAnalyzer::new().compute(&column(&[]));
        assert_eq!(stat.inferred_type, ColumnType::Unknown);
        assert_eq!(stat.missing_count, 0);
        assert_eq!(stat.missing_pct, 0.0);
        assert_eq!(stat.unique_count, 0);
        assert_eq!(stat.outlier_count, 0);
        assert!(stat.sample_values.is_empty());
        assert!(stat.numeric.is_none());
    }

    #[test]
    fn test_whitespace_counts_as_missing() {
        let stat = ColumnAnalyzer::new().compute(&column(&[Some("  "), Some(""), Some("a")]));
        assert_eq!(stat.missing_count, 2);
        assert_eq!(stat.unique_count, 1);
    }

    #[test]
    fn test_mixed_column_is_text_without_outliers() {
        let stat = ColumnAnalyzer::new().compute(&column(&[
            Some("1"),
            Some("2"),
            Some("3"),
            Some("many"),
            Some("1000"),
        ]));
        assert_eq!(stat.inferred_type, ColumnType::Text);
        assert_eq!(stat.outlier_count, 0);
    }

    #[test]
    fn test_cardinality_is_case_sensitive() {
        let stat = ColumnAnalyzer::new().compute(&column(&[Some("a"), Some("A"), Some("a")]));
        assert_eq!(stat.unique_count, 2);
    }

    #[test]
    fn test_sample_limited_to_five_in_row_order() {
        let values: Vec<Option<&str>> = vec![
            None,
            Some("g"),
            Some("f"),
            Some("e"),
            Some("d"),
            Some("c"),
            Some("b"),
        ];
        let stat = ColumnAnalyzer::new().compute(&column(&values));
        assert_eq!(stat.sample_values, vec!["g", "f", "e", "d", "c"]);
    }

    #[test]
    fn test_declared_type_overrides_inference() {
        let mut col = column(&[Some("1"), Some("2")]);
        col.set_declared_type(ColumnType::Text);
        assert_eq!(ColumnAnalyzer::new().column_type(&col), ColumnType::Text);
    }

    #[test]
    fn test_outlier_rows() {
        let col = column(&[Some("10"), Some("11"), Some("12"), Some("13"), Some("100"), None]);
        assert_eq!(ColumnAnalyzer::new().outlier_rows(&col), vec![4]);
    }

    #[test]
    fn test_order_statistics() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile_lower(&sorted, 0.25), 1.0);
        assert_eq!(quantile_lower(&sorted, 0.75), 3.0);
        assert_eq!(median(&sorted), 2.5);
        assert_eq!(median(&[1.0, 5.0, 9.0]), 5.0);
        assert_eq!(mean(&sorted), 2.5);
        assert!((population_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_summary_stays_finite_near_f64_max() {
        let big = [1e308, 1e308, 1e308];
        assert!((mean(&big) / 1e308 - 1.0).abs() < 1e-12);
        assert!(population_std(&big) / 1e308 < 1e-12);

        let spread = [-1e308, 0.0, 1e308];
        assert_eq!(mean(&spread), 0.0);
        let std = population_std(&spread);
        assert!(std.is_finite());
        assert!((std / 1e308 - (2.0f64 / 3.0).sqrt()).abs() < 1e-12);

        assert!(median(&[1e308, f64::MAX]).is_finite());

        let summary = NumericSummary::from_values(&big).unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json["mean"].as_f64().is_some());
        assert!(json["std"].as_f64().is_some());
    }

}
