//! Plan steps: a closed set of typed cleaning actions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Names of the supported actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    DropDuplicates,
    DropMissing,
    Impute,
    DropColumns,
    Normalize,
    ConvertType,
    FlagOutliers,
}

impl ActionKind {
    /// All actions, in documentation order.
    pub const ALL: [ActionKind; 7] = [
        ActionKind::DropDuplicates,
        ActionKind::DropMissing,
        ActionKind::Impute,
        ActionKind::DropColumns,
        ActionKind::Normalize,
        ActionKind::ConvertType,
        ActionKind::FlagOutliers,
    ];

    /// Wire name of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::DropDuplicates => "drop_duplicates",
            ActionKind::DropMissing => "drop_missing",
            ActionKind::Impute => "impute",
            ActionKind::DropColumns => "drop_columns",
            ActionKind::Normalize => "normalize",
            ActionKind::ConvertType => "convert_type",
            ActionKind::FlagOutliers => "flag_outliers",
        }
    }
}

impl std::str::FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = ActionKind::ALL.iter().map(ActionKind::as_str).collect();
                format!("unknown action '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How `impute` chooses the fill value.
#[derive(Debug, Clone, PartialEq)]
pub enum ImputeStrategy {
    /// Mean of the non-missing values (numeric columns).
    Mean,
    /// Median of the non-missing values (numeric columns).
    Median,
    /// Most frequent non-missing value; ties go to the first encountered.
    Mode,
    /// A literal replacement.
    Value(String),
}

impl ImputeStrategy {
    /// Wire name of the strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImputeStrategy::Mean => "mean",
            ImputeStrategy::Median => "median",
            ImputeStrategy::Mode => "mode",
            ImputeStrategy::Value(_) => "value",
        }
    }
}

/// Normalization method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizeMethod {
    /// `(x - min) / (max - min)`.
    MinMax,
    /// `(x - mean) / stddev`.
    ZScore,
}

impl NormalizeMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            NormalizeMethod::MinMax => "minmax",
            NormalizeMethod::ZScore => "zscore",
        }
    }
}

/// Target of `convert_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Numeric,
    Datetime,
    String,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Numeric => "numeric",
            TargetType::Datetime => "datetime",
            TargetType::String => "string",
        }
    }
}

/// A typed cleaning action with validated parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    DropDuplicates,
    DropMissing { columns: Vec<String> },
    Impute { column: String, strategy: ImputeStrategy },
    DropColumns { columns: Vec<String> },
    Normalize { column: String, method: NormalizeMethod },
    ConvertType { column: String, target: TargetType },
    FlagOutliers { column: String },
}

impl Action {
    /// The action's name.
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::DropDuplicates => ActionKind::DropDuplicates,
            Action::DropMissing { .. } => ActionKind::DropMissing,
            Action::Impute { .. } => ActionKind::Impute,
            Action::DropColumns { .. } => ActionKind::DropColumns,
            Action::Normalize { .. } => ActionKind::Normalize,
            Action::ConvertType { .. } => ActionKind::ConvertType,
            Action::FlagOutliers { .. } => ActionKind::FlagOutliers,
        }
    }

    /// Build an action from its name and raw parameters.
    pub fn from_params(kind: ActionKind, params: &Map<String, Value>) -> Result<Self, String> {
        let action = match kind {
            ActionKind::DropDuplicates => Action::DropDuplicates,
            ActionKind::DropMissing => Action::DropMissing {
                columns: column_list(params, "columns")?,
            },
            ActionKind::DropColumns => Action::DropColumns {
                columns: column_list(params, "columns")?,
            },
            ActionKind::Impute => {
                let column = required_str(params, "column")?;
                let strategy = match required_str(params, "strategy")?.as_str() {
                    "mean" => ImputeStrategy::Mean,
                    "median" => ImputeStrategy::Median,
                    "mode" => ImputeStrategy::Mode,
                    "value" => ImputeStrategy::Value(literal(params, "value")?),
                    other => {
                        return Err(format!(
                            "unknown impute strategy '{}' (expected mean, median, mode or value)",
                            other
                        ));
                    }
                };
                Action::Impute { column, strategy }
            }
            ActionKind::Normalize => {
                let column = required_str(params, "column")?;
                let method = match required_str(params, "method")?.as_str() {
                    "minmax" => NormalizeMethod::MinMax,
                    "zscore" => NormalizeMethod::ZScore,
                    other => {
                        return Err(format!(
                            "unknown normalize method '{}' (expected minmax or zscore)",
                            other
                        ));
                    }
                };
                Action::Normalize { column, method }
            }
            ActionKind::ConvertType => {
                let column = required_str(params, "column")?;
                let target = match required_str(params, "type")?.as_str() {
                    "numeric" => TargetType::Numeric,
                    "datetime" => TargetType::Datetime,
                    "string" => TargetType::String,
                    other => {
                        return Err(format!(
                            "unknown target type '{}' (expected numeric, datetime or string)",
                            other
                        ));
                    }
                };
                Action::ConvertType { column, target }
            }
            ActionKind::FlagOutliers => Action::FlagOutliers {
                column: required_str(params, "column")?,
            },
        };
        Ok(action)
    }

    /// Raw parameters, as they appear on the wire.
    pub fn params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        match self {
            Action::DropDuplicates => {}
            Action::DropMissing { columns } | Action::DropColumns { columns } => {
                params.insert("columns".into(), Value::from(columns.clone()));
            }
            Action::Impute { column, strategy } => {
                params.insert("column".into(), Value::from(column.as_str()));
                params.insert("strategy".into(), Value::from(strategy.as_str()));
                if let ImputeStrategy::Value(v) = strategy {
                    params.insert("value".into(), Value::from(v.as_str()));
                }
            }
            Action::Normalize { column, method } => {
                params.insert("column".into(), Value::from(column.as_str()));
                params.insert("method".into(), Value::from(method.as_str()));
            }
            Action::ConvertType { column, target } => {
                params.insert("column".into(), Value::from(column.as_str()));
                params.insert("type".into(), Value::from(target.as_str()));
            }
            Action::FlagOutliers { column } => {
                params.insert("column".into(), Value::from(column.as_str()));
            }
        }
        params
    }
}

fn required_str(params: &Map<String, Value>, key: &str) -> Result<String, String> {
    match params.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(format!("parameter '{}' must not be empty", key)),
        Some(other) => Err(format!(
            "parameter '{}' must be a string, got {}",
            key,
            json_type(other)
        )),
        None => Err(format!("missing required parameter '{}'", key)),
    }
}

fn column_list(params: &Map<String, Value>, key: &str) -> Result<Vec<String>, String> {
    let columns: Vec<String> = match params.get(key) {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(format!(
                    "parameter '{}' must contain only strings, got {}",
                    key,
                    json_type(other)
                )),
            })
            .collect::<Result<_, _>>()?,
        Some(other) => {
            return Err(format!(
                "parameter '{}' must be a list of column names, got {}",
                key,
                json_type(other)
            ));
        }
        None => return Err(format!("missing required parameter '{}'", key)),
    };

    if columns.is_empty() {
        return Err(format!("parameter '{}' must name at least one column", key));
    }
    Ok(columns)
}

/// A literal fill value. Numbers and booleans are accepted and stringified.
///
/// Blank strings are rejected: they would read back as missing.
fn literal(params: &Map<String, Value>, key: &str) -> Result<String, String> {
    match params.get(key) {
        Some(Value::String(s)) if s.trim().is_empty() => Err(format!(
            "parameter '{}' must not be blank",
            key
        )),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(Value::Null) | None => Err(format!(
            "parameter '{}' is required when strategy is 'value'",
            key
        )),
        Some(other) => Err(format!(
            "parameter '{}' must be a scalar, got {}",
            key,
            json_type(other)
        )),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The wire form of a step: `{action, params, reasoning}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawStep {
    pub action: String,
    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(default)]
    pub reasoning: String,
}

/// One validated step of a cleaning plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawStep", into = "RawStep")]
pub struct PlanStep {
    pub action: Action,
    /// Free-text explanation from whoever proposed the step.
    pub reasoning: String,
}

impl PlanStep {
    /// Create a step without reasoning.
    pub fn new(action: Action) -> Self {
        Self {
            action,
            reasoning: String::new(),
        }
    }

    /// Set the reasoning.
    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }
}

impl TryFrom<RawStep> for PlanStep {
    type Error = String;

    fn try_from(raw: RawStep) -> Result<Self, Self::Error> {
        let kind: ActionKind = raw.action.parse()?;
        let action = Action::from_params(kind, &raw.params)?;
        Ok(PlanStep {
            action,
            reasoning: raw.reasoning,
        })
    }
}

impl From<PlanStep> for RawStep {
    fn from(step: PlanStep) -> Self {
        RawStep {
            action: step.action.kind().as_str().to_string(),
            params: step.action.params(),
            reasoning: step.reasoning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Result<PlanStep, String> {
        let raw: RawStep = serde_json::from_value(value).map_err(|e| e.to_string())?;
        PlanStep::try_from(raw)
    }

    #[test]
    fn test_parse_each_action() {
        assert_eq!(
            parse(json!({"action": "drop_duplicates"})).unwrap().action,
            Action::DropDuplicates
        );
        assert_eq!(
            parse(json!({"action": "drop_missing", "params": {"columns": ["a", "b"]}}))
                .unwrap()
                .action,
            Action::DropMissing {
                columns: vec!["a".into(), "b".into()]
            }
        );
        assert_eq!(
            parse(json!({"action": "impute", "params": {"column": "age", "strategy": "median"}}))
                .unwrap()
                .action,
            Action::Impute {
                column: "age".into(),
                strategy: ImputeStrategy::Median
            }
        );
        assert_eq!(
            parse(json!({"action": "normalize", "params": {"column": "x", "method": "zscore"}}))
                .unwrap()
                .action,
            Action::Normalize {
                column: "x".into(),
                method: NormalizeMethod::ZScore
            }
        );
        assert_eq!(
            parse(json!({"action": "convert_type", "params": {"column": "d", "type": "datetime"}}))
                .unwrap()
                .action,
            Action::ConvertType {
                column: "d".into(),
                target: TargetType::Datetime
            }
        );
        assert_eq!(
            parse(json!({"action": "flag_outliers", "params": {"column": "x"}}))
                .unwrap()
                .action,
            Action::FlagOutliers { column: "x".into() }
        );
    }

    #[test]
    fn test_unknown_action_rejected() {
        let err = parse(json!({"action": "rename_column", "params": {}})).unwrap_err();
        assert!(err.contains("unknown action 'rename_column'"));
    }

    #[test]
    fn test_value_strategy_requires_value() {
        let err = parse(json!({"action": "impute", "params": {"column": "a", "strategy": "value"}}))
            .unwrap_err();
        assert!(err.contains("'value'"));

        let step = parse(json!({
            "action": "impute",
            "params": {"column": "a", "strategy": "value", "value": 0}
        }))
        .unwrap();
        assert_eq!(
            step.action,
            Action::Impute {
                column: "a".into(),
                strategy: ImputeStrategy::Value("0".into())
            }
        );
    }

    #[test]
    fn test_blank_fill_value_rejected() {
        for blank in ["", "   "] {
            let err = parse(json!({
                "action": "impute",
                "params": {"column": "a", "strategy": "value", "value": blank}
            }))
            .unwrap_err();
            assert_eq!(err, "parameter 'value' must not be blank");
        }
    }

    #[test]
    fn test_missing_and_ill_typed_params() {
        assert!(parse(json!({"action": "normalize", "params": {"column": "x"}}))
            .unwrap_err()
            .contains("missing required parameter 'method'"));
        assert!(parse(json!({"action": "drop_columns", "params": {"columns": [1, 2]}}))
            .unwrap_err()
            .contains("only strings"));
        assert!(parse(json!({"action": "drop_columns", "params": {"columns": []}}))
            .unwrap_err()
            .contains("at least one"));
        assert!(parse(json!({"action": "flag_outliers", "params": {"column": 3}}))
            .unwrap_err()
            .contains("must be a string"));
    }

    #[test]
    fn test_single_column_string_accepted() {
        let step = parse(json!({"action": "drop_columns", "params": {"columns": "notes"}})).unwrap();
        assert_eq!(
            step.action,
            Action::DropColumns {
                columns: vec!["notes".into()]
            }
        );
    }

    #[test]
    fn test_serializes_to_wire_form() {
        let step = PlanStep::new(Action::Impute {
            column: "city".into(),
            strategy: ImputeStrategy::Value("Unknown".into()),
        })
        .with_reasoning("fill gaps");

        let value = serde_json::to_value(&step).unwrap();
        assert_eq!(
            value,
            json!({
                "action": "impute",
                "params": {"column": "city", "strategy": "value", "value": "Unknown"},
                "reasoning": "fill gaps"
            })
        );
        let back: PlanStep = serde_json::from_value(value).unwrap();
        assert_eq!(back, step);
    }
}
