//! Cleaning plans: ordered, validated lists of typed actions.
//!
//! Plans come from untrusted sources (rules, language models, hand-edited
//! files), so every step is checked against the closed action set before
//! anything runs. A plan that is not a JSON array of well-formed steps is
//! rejected as a whole with [`SieveError::InvalidPlan`].
//!
//! # Example
//!
//! ```
//! use sieve::plan::{Action, Plan};
//!
//! let plan = Plan::parse(r#"[
//!     {"action": "drop_duplicates", "params": {}, "reasoning": "3 duplicate rows"},
//!     {"action": "impute", "params": {"column": "age", "strategy": "median"}}
//! ]"#).unwrap();
//!
//! assert_eq!(plan.len(), 2);
//! assert_eq!(plan.steps()[0].action, Action::DropDuplicates);
//! ```

mod heuristic;
mod step;

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SieveError};
use crate::persistence::{load_json, save_json};
use crate::profile::DatasetProfile;

pub use heuristic::HeuristicPlanner;
pub use step::{
    Action, ActionKind, ImputeStrategy, NormalizeMethod, PlanStep, RawStep, TargetType,
};

/// An ordered sequence of plan steps. Order is significant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Plan {
    steps: Vec<PlanStep>,
}

impl Plan {
    /// Create a plan from steps.
    pub fn new(steps: Vec<PlanStep>) -> Self {
        Self { steps }
    }

    /// Parse and validate a plan from JSON text.
    pub fn parse(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| SieveError::invalid_plan(0, format!("not valid JSON: {}", e)))?;
        Self::from_value(value)
    }

    /// Validate a plan from an already-parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        let items = match value {
            Value::Array(items) => items,
            other => {
                return Err(SieveError::invalid_plan(
                    0,
                    format!("plan must be a JSON array of steps, got {}", kind_of(&other)),
                ));
            }
        };

        let steps = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| parse_step(index, item))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { steps })
    }

    /// Load and validate a plan file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let value: Value = load_json(path.as_ref(), "plan")?;
        Self::from_value(value)
    }

    /// Save the plan as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save_json(self, path.as_ref(), "plan")
    }

    /// Serialize to pretty-printed JSON text.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Steps in execution order.
    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the plan has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Iterate over steps.
    pub fn iter(&self) -> std::slice::Iter<'_, PlanStep> {
        self.steps.iter()
    }

    /// Append a step.
    pub fn push(&mut self, step: PlanStep) {
        self.steps.push(step);
    }
}

impl FromIterator<PlanStep> for Plan {
    fn from_iter<I: IntoIterator<Item = PlanStep>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a PlanStep;
    type IntoIter = std::slice::Iter<'a, PlanStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

fn parse_step(index: usize, item: Value) -> Result<PlanStep> {
    if !item.is_object() {
        return Err(SieveError::invalid_plan(
            index,
            format!("step must be an object, got {}", kind_of(&item)),
        ));
    }
    let raw: RawStep =
        serde_json::from_value(item).map_err(|e| SieveError::invalid_plan(index, e.to_string()))?;
    PlanStep::try_from(raw).map_err(|message| SieveError::invalid_plan(index, message))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Anything that can propose a cleaning plan from a profile.
///
/// Implementations must only produce plans; execution and validation are
/// handled by the engine.
pub trait PlanSource {
    /// Name of the source, for logging and reports.
    fn name(&self) -> &str;

    /// Propose a plan for a profiled dataset.
    fn propose(&self, profile: &DatasetProfile) -> Result<Plan>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_parse_valid_plan() {
        let plan = Plan::parse(
            r#"[
                {"action": "drop_duplicates", "params": {}, "reasoning": "dupes"},
                {"action": "drop_columns", "params": {"columns": ["notes"]}, "reasoning": ""}
            ]"#,
        )
        .unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.steps()[0].reasoning, "dupes");
        assert_eq!(
            plan.steps()[1].action,
            Action::DropColumns {
                columns: vec!["notes".into()]
            }
        );
    }

    #[test]
    fn test_empty_plan_is_valid() {
        assert!(Plan::parse("[]").unwrap().is_empty());
    }

    #[test]
    fn test_not_an_array_rejected() {
        let err = Plan::parse(r#"{"action": "drop_duplicates"}"#).unwrap_err();
        assert!(matches!(err, SieveError::InvalidPlan { step: 0, .. }));
        assert!(err.to_string().contains("JSON array"));
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(matches!(
            Plan::parse("[{"),
            Err(SieveError::InvalidPlan { .. })
        ));
    }

    #[test]
    fn test_error_names_offending_step() {
        let err = Plan::from_value(json!([
            {"action": "drop_duplicates"},
            {"action": "impute", "params": {"column": "age"}},
        ]))
        .unwrap_err();
        match err {
            SieveError::InvalidPlan { step, message } => {
                assert_eq!(step, 1);
                assert!(message.contains("strategy"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_object_step_rejected() {
        let err = Plan::from_value(json!([{"action": "drop_duplicates"}, "drop_missing"]))
            .unwrap_err();
        assert!(matches!(err, SieveError::InvalidPlan { step: 1, .. }));
    }

    #[test]
    fn test_missing_action_rejected() {
        let err = Plan::from_value(json!([{"params": {}}])).unwrap_err();
        assert!(matches!(err, SieveError::InvalidPlan { step: 0, .. }));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plan.json");

        let plan: Plan = vec![
            PlanStep::new(Action::DropDuplicates).with_reasoning("dupes"),
            PlanStep::new(Action::Normalize {
                column: "score".into(),
                method: NormalizeMethod::MinMax,
            }),
        ]
        .into_iter()
        .collect();

        plan.save(&path).unwrap();
        assert_eq!(Plan::load(&path).unwrap(), plan);
    }

    #[test]
    fn test_deserialize_via_serde() {
        let plan: Plan =
            serde_json::from_str(r#"[{"action": "flag_outliers", "params": {"column": "x"}}]"#)
                .unwrap();
        assert_eq!(plan.len(), 1);

        let bad: std::result::Result<Plan, _> =
            serde_json::from_str(r#"[{"action": "explode", "params": {}}]"#);
        assert!(bad.is_err());
    }
}
