//! Core type definitions for profiles.

use serde::{Deserialize, Serialize};

/// Inferred logical type for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Finite numbers.
    Numeric,
    /// Free text; the fallback classification.
    Text,
    /// Dates or date-times.
    #[serde(rename = "datetime")]
    DateTime,
    /// Values from a single two-element domain such as true/false.
    Boolean,
    /// No non-missing values to classify.
    #[default]
    Unknown,
}

impl ColumnType {
    /// Lowercase name as used in serialized profiles.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Numeric => "numeric",
            ColumnType::Text => "text",
            ColumnType::DateTime => "datetime",
            ColumnType::Boolean => "boolean",
            ColumnType::Unknown => "unknown",
        }
    }

    /// Returns true if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Numeric)
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_names() {
        for t in [
            ColumnType::Numeric,
            ColumnType::Text,
            ColumnType::DateTime,
            ColumnType::Boolean,
            ColumnType::Unknown,
        ] {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
        }
    }
}
