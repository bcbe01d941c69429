//! Applies single plan steps to a dataset.

use indexmap::IndexMap;
use tracing::debug;

use crate::dataset::{is_missing, Dataset};
use crate::error::StepError;
use crate::inference::{
    format_number, mean, median, parse_datetime, parse_number, population_std, ColumnAnalyzer,
};
use crate::plan::{Action, ImputeStrategy, NormalizeMethod, PlanStep, TargetType};
use crate::profile::{ColumnType, ProfilerConfig};

/// What a successfully applied step did.
#[derive(Debug, Clone, PartialEq)]
pub struct StepChange {
    /// Changelog entry describing the effect.
    pub changelog: String,
    /// Rows marked by `flag_outliers`; empty for every other action.
    pub flagged_rows: Vec<usize>,
    /// Data-integrity condition the step left behind (e.g. no rows remain).
    pub warning: Option<String>,
}

impl StepChange {
    fn new(changelog: String) -> Self {
        Self {
            changelog,
            flagged_rows: Vec::new(),
            warning: None,
        }
    }

    fn with_warning(mut self, warning: Option<String>) -> Self {
        self.warning = warning;
        self
    }
}

/// Interprets one typed action against a dataset.
///
/// Every action validates its parameters against the dataset before touching
/// it, so a failed step leaves the dataset exactly as it was. Actions are
/// deterministic: the same dataset and step always give the same result.
#[derive(Debug, Clone, Default)]
pub struct ActionInterpreter {
    analyzer: ColumnAnalyzer,
}

impl ActionInterpreter {
    /// Create an interpreter with default profiling settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an interpreter sharing the profiler's type and outlier rules.
    pub fn with_config(config: &ProfilerConfig) -> Self {
        Self {
            analyzer: ColumnAnalyzer::with_config(config),
        }
    }

    /// Apply a step to a copy of `dataset`, returning the new dataset.
    pub fn apply(
        &self,
        dataset: &Dataset,
        step: &PlanStep,
    ) -> Result<(Dataset, StepChange), StepError> {
        let mut working = dataset.clone();
        let change = self.apply_in_place(&mut working, step)?;
        Ok((working, change))
    }

    /// Apply a step to `dataset` in place.
    ///
    /// On error the dataset is left unchanged.
    pub fn apply_in_place(
        &self,
        dataset: &mut Dataset,
        step: &PlanStep,
    ) -> Result<StepChange, StepError> {
        debug!(action = %step.action.kind(), "applying step");

        match &step.action {
            Action::DropDuplicates => Ok(self.drop_duplicates(dataset)),
            Action::DropMissing { columns } => self.drop_missing(dataset, columns),
            Action::Impute { column, strategy } => self.impute(dataset, column, strategy),
            Action::DropColumns { columns } => self.drop_columns(dataset, columns),
            Action::Normalize { column, method } => self.normalize(dataset, column, *method),
            Action::ConvertType { column, target } => self.convert_type(dataset, column, *target),
            Action::FlagOutliers { column } => self.flag_outliers(dataset, column),
        }
    }

    fn drop_duplicates(&self, dataset: &mut Dataset) -> StepChange {
        let before = dataset.row_count();
        let keep = dataset.first_occurrence_mask();
        dataset.retain_rows(&keep);
        StepChange::new(format!(
            "Dropped {} duplicate rows",
            before - dataset.row_count()
        ))
    }

    fn drop_missing(
        &self,
        dataset: &mut Dataset,
        columns: &[String],
    ) -> Result<StepChange, StepError> {
        let indices = columns
            .iter()
            .map(|name| {
                dataset
                    .column_index(name)
                    .ok_or_else(|| StepError::unknown_column(name))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let before = dataset.row_count();
        let keep: Vec<bool> = (0..before)
            .map(|row| indices.iter().all(|&col| !is_missing(dataset.get(row, col))))
            .collect();
        dataset.retain_rows(&keep);

        let dropped = before - dataset.row_count();
        Ok(StepChange::new(format!(
            "Dropped {} rows with missing values in [{}]",
            dropped,
            columns.join(", ")
        ))
        .with_warning(emptied_warning(before, dataset.row_count(), "drop_missing")))
    }

    fn impute(
        &self,
        dataset: &mut Dataset,
        name: &str,
        strategy: &ImputeStrategy,
    ) -> Result<StepChange, StepError> {
        let column = dataset
            .column(name)
            .ok_or_else(|| StepError::unknown_column(name))?;

        let fill = match strategy {
            ImputeStrategy::Mean | ImputeStrategy::Median => {
                let action = if *strategy == ImputeStrategy::Mean {
                    "impute(mean)"
                } else {
                    "impute(median)"
                };
                self.require_numeric(dataset, name, action)?;

                let mut values: Vec<f64> = self
                    .analyzer
                    .numeric_values(column)
                    .into_iter()
                    .map(|(_, v)| v)
                    .collect();
                if values.is_empty() {
                    return Err(StepError::DataIntegrity(format!(
                        "column '{}' has no values to compute a {} from",
                        name,
                        strategy.as_str()
                    )));
                }

                let fill = if *strategy == ImputeStrategy::Mean {
                    mean(&values)
                } else {
                    values.sort_by(|a, b| a.total_cmp(b));
                    median(&values)
                };
                if !fill.is_finite() {
                    return Err(StepError::DataIntegrity(format!(
                        "{} of column '{}' is not a finite number",
                        strategy.as_str(),
                        name
                    )));
                }
                format_number(fill)
            }
            ImputeStrategy::Mode => mode(column.present().map(|(_, v)| v)).ok_or_else(|| {
                StepError::DataIntegrity(format!(
                    "column '{}' has no values to compute a mode from",
                    name
                ))
            })?,
            ImputeStrategy::Value(value) if is_missing(Some(value)) => {
                return Err(StepError::Validation(format!(
                    "fill value for column '{}' is blank",
                    name
                )));
            }
            ImputeStrategy::Value(value) => value.clone(),
        };

        let mut filled = 0;
        if let Some(column) = dataset.column_mut(name) {
            for cell in column.values_mut() {
                if is_missing(cell.as_deref()) {
                    *cell = Some(fill.clone());
                    filled += 1;
                }
            }
        }

        Ok(StepChange::new(format!(
            "Imputed {} missing values in {} with {} ({})",
            filled,
            name,
            strategy.as_str(),
            fill
        )))
    }

    fn drop_columns(
        &self,
        dataset: &mut Dataset,
        columns: &[String],
    ) -> Result<StepChange, StepError> {
        if let Some(unknown) = columns.iter().find(|c| dataset.column_index(c).is_none()) {
            return Err(StepError::unknown_column(unknown));
        }

        let before = dataset.column_count();
        dataset.remove_columns(columns);

        let warning = (before > 0 && dataset.column_count() == 0)
            .then(|| "dataset has no columns left after drop_columns".to_string());
        Ok(StepChange::new(format!("Dropped columns: [{}]", columns.join(", "))).with_warning(warning))
    }

    fn normalize(
        &self,
        dataset: &mut Dataset,
        name: &str,
        method: NormalizeMethod,
    ) -> Result<StepChange, StepError> {
        let column = dataset
            .column(name)
            .ok_or_else(|| StepError::unknown_column(name))?;
        self.require_numeric(dataset, name, "normalize")?;

        let pairs = self.analyzer.numeric_values(column);
        if pairs.is_empty() {
            return Err(StepError::DataIntegrity(format!(
                "column '{}' has no numeric values to normalize",
                name
            )));
        }
        let values: Vec<f64> = pairs.iter().map(|(_, v)| *v).collect();

        // Work on halved values so spans near f64::MAX stay finite.
        let (offset, half_span) = match method {
            NormalizeMethod::MinMax => {
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                (min, max / 2.0 - min / 2.0)
            }
            NormalizeMethod::ZScore => (mean(&values), population_std(&values) / 2.0),
        };

        let mut scaled = Vec::with_capacity(pairs.len());
        for &(row, value) in &pairs {
            // Constant columns map to 0 rather than dividing by zero.
            let v = if half_span == 0.0 {
                0.0
            } else {
                (value / 2.0 - offset / 2.0) / half_span
            };
            if !v.is_finite() {
                return Err(StepError::DataIntegrity(format!(
                    "normalizing column '{}' produced a non-finite value at row {}",
                    name, row
                )));
            }
            scaled.push((row, v));
        }

        if let Some(column) = dataset.column_mut(name) {
            let cells = column.values_mut();
            for (row, v) in scaled {
                cells[row] = Some(format_number(v));
            }
        }

        Ok(StepChange::new(format!(
            "Normalized {} using {}",
            name,
            method.as_str()
        )))
    }

    fn convert_type(
        &self,
        dataset: &mut Dataset,
        name: &str,
        target: TargetType,
    ) -> Result<StepChange, StepError> {
        let column = dataset
            .column_mut(name)
            .ok_or_else(|| StepError::unknown_column(name))?;

        let convert: fn(&str) -> Option<String> = match target {
            TargetType::Numeric => |v| parse_number(v).map(format_number),
            TargetType::Datetime => |v| parse_datetime(v).map(|dt| dt.to_iso()),
            TargetType::String => |v| Some(v.to_string()),
        };

        let mut unparsed = 0;
        for cell in column.values_mut() {
            if is_missing(cell.as_deref()) {
                continue;
            }
            let converted = cell.as_deref().and_then(convert);
            if converted.is_none() {
                unparsed += 1;
            }
            *cell = converted;
        }

        column.set_declared_type(match target {
            TargetType::Numeric => ColumnType::Numeric,
            TargetType::Datetime => ColumnType::DateTime,
            TargetType::String => ColumnType::Text,
        });

        let mut changelog = format!("Converted {} to {}", name, target.as_str());
        if unparsed > 0 {
            changelog.push_str(&format!(
                " ({} unparseable values set to missing)",
                unparsed
            ));
        }
        Ok(StepChange::new(changelog))
    }

    fn flag_outliers(&self, dataset: &Dataset, name: &str) -> Result<StepChange, StepError> {
        let column = dataset
            .column(name)
            .ok_or_else(|| StepError::unknown_column(name))?;
        self.require_numeric(dataset, name, "flag_outliers")?;

        let rows = self.analyzer.outlier_rows(column);
        Ok(StepChange {
            changelog: format!("Flagged {} outliers in {}", rows.len(), name),
            flagged_rows: rows,
            warning: None,
        })
    }

    fn require_numeric(
        &self,
        dataset: &Dataset,
        name: &str,
        action: &'static str,
    ) -> Result<(), StepError> {
        let column = dataset
            .column(name)
            .ok_or_else(|| StepError::unknown_column(name))?;
        let actual = self.analyzer.column_type(column);
        if actual.is_numeric() {
            Ok(())
        } else {
            Err(StepError::TypeMismatch {
                column: name.to_string(),
                action,
                expected: "numeric",
                actual: actual.to_string(),
            })
        }
    }
}

/// Most frequent value; ties go to the value seen first.
fn mode<'a>(values: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if best.is_none_or(|(_, n)| count > n) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value.to_string())
}

fn emptied_warning(before: usize, after: usize, action: &str) -> Option<String> {
    (before > 0 && after == 0).then(|| format!("dataset is empty after {}", action))
}
