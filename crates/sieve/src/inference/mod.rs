//! Type inference and column statistics.

mod classify;
mod statistical;

pub use classify::{format_number, parse_datetime, parse_number, ParsedDateTime, TypeClassifier};
pub use statistical::{median, mean, population_std, quantile_lower, ColumnAnalyzer, IqrFence};
