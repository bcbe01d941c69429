//! Sequential plan execution with per-step error capture.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use crate::dataset::Dataset;
use crate::plan::{Action, Plan};
use crate::profile::ProfilerConfig;

use super::interpreter::ActionInterpreter;
use super::report::{
    ExecutionReport, ExecutionStatus, OutlierFlag, StepFailure, StepRecord, StepState,
};

/// Runs plans step by step.
///
/// A failing step is recorded and skipped; the working dataset keeps the
/// state left by the previous successful step and execution continues.
#[derive(Debug, Clone, Default)]
pub struct PlanExecutor {
    interpreter: ActionInterpreter,
}

impl PlanExecutor {
    /// Create an executor with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an executor using the given outlier and type rules.
    pub fn with_config(config: &ProfilerConfig) -> Self {
        Self {
            interpreter: ActionInterpreter::with_config(config),
        }
    }

    /// Execute a plan against a copy of `dataset`.
    pub fn execute(&self, dataset: &Dataset, plan: &Plan) -> (Dataset, ExecutionReport) {
        self.execute_until(dataset, plan, &AtomicBool::new(false))
    }

    /// Execute a plan, checking `cancel` before each step.
    ///
    /// Once `cancel` is set no further step starts; the remaining steps are
    /// reported as pending and the dataset is returned as it stands.
    pub fn execute_until(
        &self,
        dataset: &Dataset,
        plan: &Plan,
        cancel: &AtomicBool,
    ) -> (Dataset, ExecutionReport) {
        let mut working = dataset.clone();

        let mut applied_steps = Vec::new();
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut flags = Vec::new();
        let mut steps: Vec<StepRecord> = plan
            .iter()
            .enumerate()
            .map(|(index, step)| StepRecord {
                index,
                action: step.action.kind(),
                state: StepState::Pending,
                reasoning: step.reasoning.clone(),
            })
            .collect();
        let mut cancelled = false;

        for (index, step) in plan.iter().enumerate() {
            if cancel.load(Ordering::Relaxed) {
                info!(step = index, "execution cancelled");
                cancelled = true;
                break;
            }

            match self.interpreter.apply_in_place(&mut working, step) {
                Ok(change) => {
                    debug!(step = index, change = %change.changelog, "step applied");
                    if let Action::FlagOutliers { column } = &step.action {
                        flags.push(OutlierFlag {
                            step: index,
                            column: column.clone(),
                            rows: change.flagged_rows,
                        });
                    }
                    if let Some(warning) = change.warning {
                        warn!(step = index, "{}", warning);
                        warnings.push(format!("step {}: {}", index, warning));
                    }
                    applied_steps.push(change.changelog);
                    steps[index].state = StepState::Applied;
                }
                Err(err) => {
                    warn!(
                        step = index,
                        kind = err.kind().label(),
                        "step failed: {}",
                        err
                    );
                    errors.push(StepFailure {
                        step_index: index,
                        error_kind: err.kind(),
                        message: err.to_string(),
                    });
                    steps[index].state = StepState::Failed;
                }
            }
        }

        let status = ExecutionStatus::from_counts(applied_steps.len(), plan.len());
        info!(
            %status,
            applied = applied_steps.len(),
            failed = errors.len(),
            rows = working.row_count(),
            columns = working.column_count(),
            "plan executed"
        );

        let report = ExecutionReport {
            status,
            applied_steps,
            errors,
            warnings,
            flags,
            steps,
            cancelled,
            rows_before: dataset.row_count(),
            rows_after: working.row_count(),
            columns_before: dataset.column_count(),
            columns_after: working.column_count(),
        };

        (working, report)
    }
}
