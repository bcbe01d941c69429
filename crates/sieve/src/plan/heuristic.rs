//! Rule-based plan generation from a dataset profile.
//!
//! Produces a conservative plan without any external service:
//!
//! - `drop_duplicates` when the profile reports duplicate rows
//! - for each column, in column order:
//!   - `impute` missing values with the mean (numeric) or the mode (otherwise)
//!   - `flag_outliers` when the column has IQR outliers

use tracing::debug;

use crate::error::Result;
use crate::profile::{ColumnStat, ColumnType, DatasetProfile};

use super::step::{Action, ImputeStrategy, PlanStep};
use super::{Plan, PlanSource};

/// Proposes plans using fixed rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPlanner;

impl HeuristicPlanner {
    /// Create a heuristic planner.
    pub fn new() -> Self {
        Self
    }

    /// Build the plan for a profile.
    pub fn plan(&self, profile: &DatasetProfile) -> Plan {
        let mut plan = Plan::default();

        if profile.duplicate_row_count > 0 {
            plan.push(
                PlanStep::new(Action::DropDuplicates).with_reasoning(format!(
                    "Found {} duplicate rows.",
                    profile.duplicate_row_count
                )),
            );
        }

        for stat in profile.column_stats.values() {
            if let Some(step) = Self::impute_step(stat) {
                plan.push(step);
            }
            if let Some(step) = Self::outlier_step(stat) {
                plan.push(step);
            }
        }

        debug!(steps = plan.len(), "generated heuristic plan");
        plan
    }

    fn impute_step(stat: &ColumnStat) -> Option<PlanStep> {
        if !stat.has_missing() {
            return None;
        }
        // A column with nothing but missing cells has no value to impute from.
        if stat.inferred_type == ColumnType::Unknown {
            return None;
        }

        let strategy = if stat.inferred_type.is_numeric() {
            ImputeStrategy::Mean
        } else {
            ImputeStrategy::Mode
        };
        let reasoning = format!(
            "Column '{}' has {} missing values. Imputing with {}.",
            stat.name,
            stat.missing_count,
            strategy.as_str()
        );

        Some(
            PlanStep::new(Action::Impute {
                column: stat.name.clone(),
                strategy,
            })
            .with_reasoning(reasoning),
        )
    }

    fn outlier_step(stat: &ColumnStat) -> Option<PlanStep> {
        if !stat.has_outliers() {
            return None;
        }
        Some(
            PlanStep::new(Action::FlagOutliers {
                column: stat.name.clone(),
            })
            .with_reasoning(format!(
                "Column '{}' has {} potential outliers.",
                stat.name, stat.outlier_count
            )),
        )
    }
}

impl PlanSource for HeuristicPlanner {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn propose(&self, profile: &DatasetProfile) -> Result<Plan> {
        Ok(self.plan(profile))
    }
}
