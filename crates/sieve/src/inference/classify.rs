//! Logical type classification from raw cell text.
//!
//! Classification is a ranked list of parse attempts. The first attempt that
//! succeeds over the column's non-missing values wins:
//!
//! 1. boolean: the distinct values fit one two-element domain
//! 2. numeric: values parse as finite numbers
//! 3. datetime: values parse as a date or date-time
//! 4. text: always succeeds
//!
//! A column with no non-missing values is `unknown`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::profile::ColumnType;

// =============================================================================
// LAZY STATIC PATTERNS
// =============================================================================
// Cheap shape check run before trying every chrono format.

static DATE_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(\d{1,4}[-/.]\d{1,2}[-/.]\d{1,4}|\d{1,2} [a-z]{3,9} \d{4}|[a-z]{3,9} \d{1,2},? \d{4})",
    )
    .expect("date shape pattern is valid")
});

/// Two-element value domains recognized as boolean, lowercase.
const BOOLEAN_DOMAINS: &[(&str, &str)] = &[
    ("true", "false"),
    ("yes", "no"),
    ("1", "0"),
    ("t", "f"),
    ("y", "n"),
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// A successfully parsed temporal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedDateTime {
    pub value: NaiveDateTime,
    /// Whether the source text carried a time component.
    pub has_time: bool,
}

impl ParsedDateTime {
    /// ISO 8601 rendering: `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS`.
    pub fn to_iso(&self) -> String {
        if self.has_time {
            self.value.format("%Y-%m-%d %H:%M:%S").to_string()
        } else {
            self.value.format("%Y-%m-%d").to_string()
        }
    }
}

/// Parse a cell as a finite number.
pub fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a cell as a date or date-time.
pub fn parse_datetime(value: &str) -> Option<ParsedDateTime> {
    let trimmed = value.trim();
    if !DATE_SHAPE.is_match(trimmed) {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(ParsedDateTime {
            value: dt.naive_utc(),
            has_time: true,
        });
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(value) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(ParsedDateTime {
                value,
                has_time: true,
            });
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|value| ParsedDateTime {
                value,
                has_time: false,
            });
        }
    }

    None
}

/// Render a number the way it is written back into cells.
pub fn format_number(value: f64) -> String {
    // Avoid "-0" in output.
    if value == 0.0 {
        return "0".to_string();
    }
    value.to_string()
}

/// Classifies a column of cells into a logical type.
#[derive(Debug, Clone)]
pub struct TypeClassifier {
    /// Fraction (0, 1] of non-missing values that must parse for the
    /// numeric and datetime attempts to succeed.
    threshold: f64,
}

impl TypeClassifier {
    /// Create a classifier with the all-or-nothing rule.
    pub fn new() -> Self {
        Self { threshold: 1.0 }
    }

    /// Create a classifier accepting a partial parse rate.
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(f64::MIN_POSITIVE, 1.0),
        }
    }

    /// Classify non-missing values.
    pub fn classify<'a, I>(&self, values: I) -> ColumnType
    where
        I: IntoIterator<Item = &'a str>,
    {
        let values: Vec<&str> = values.into_iter().map(str::trim).collect();
        if values.is_empty() {
            return ColumnType::Unknown;
        }

        if is_boolean_domain(&values) {
            return ColumnType::Boolean;
        }
        if self.passes(&values, |v| parse_number(v).is_some()) {
            return ColumnType::Numeric;
        }
        if self.passes(&values, |v| parse_datetime(v).is_some()) {
            return ColumnType::DateTime;
        }
        ColumnType::Text
    }

    fn passes(&self, values: &[&str], parses: impl Fn(&str) -> bool) -> bool {
        let ok = values.iter().filter(|v| parses(v)).count();
        if self.threshold >= 1.0 {
            ok == values.len()
        } else {
            ok as f64 / values.len() as f64 >= self.threshold
        }
    }
}

impl Default for TypeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn is_boolean_domain(values: &[&str]) -> bool {
    let mut domain: Vec<String> = values.iter().map(|v| v.to_lowercase()).collect();
    domain.sort();
    domain.dedup();
    if domain.len() > 2 {
        return false;
    }
    BOOLEAN_DOMAINS
        .iter()
        .any(|(a, b)| domain.iter().all(|v| v == a || v == b))
}
