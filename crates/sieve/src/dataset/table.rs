//! Column-oriented in-memory dataset.

use std::collections::HashSet;
use std::mem::size_of;

use crate::error::{Result, SieveError};
use crate::profile::ColumnType;

/// A single cell. `None` is a null cell.
pub type Cell = Option<String>;

/// Check if a cell is missing: null, empty, or whitespace-only.
pub fn is_missing(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(s) => s.trim().is_empty(),
    }
}

/// A named column of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<Cell>,
    /// Logical type fixed by an explicit conversion, overriding inference.
    declared_type: Option<ColumnType>,
}

impl Column {
    /// Create a column from cell values.
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = Option<S>>,
    ) -> Self {
        Self {
            name: name.into(),
            values: values.into_iter().map(|v| v.map(Into::into)).collect(),
            declared_type: None,
        }
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the column has no cells.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All cells in row order.
    pub fn values(&self) -> &[Cell] {
        &self.values
    }

    /// Mutable access to the cells. The slice cannot change the column length.
    pub fn values_mut(&mut self) -> &mut [Cell] {
        &mut self.values
    }

    /// Get a cell as a string slice (`None` for null cells).
    pub fn get(&self, row: usize) -> Option<&str> {
        self.values.get(row).and_then(|v| v.as_deref())
    }

    /// Iterate over cells as string slices.
    pub fn iter(&self) -> impl Iterator<Item = Option<&str>> {
        self.values.iter().map(|v| v.as_deref())
    }

    /// Iterate over `(row, value)` for non-missing cells.
    pub fn present(&self) -> impl Iterator<Item = (usize, &str)> {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| match v.as_deref() {
                Some(s) if !s.trim().is_empty() => Some((i, s)),
                _ => None,
            })
    }

    /// Number of missing cells.
    pub fn missing_count(&self) -> usize {
        self.iter().filter(|v| is_missing(*v)).count()
    }

    /// Logical type set by an explicit conversion, if any.
    pub fn declared_type(&self) -> Option<ColumnType> {
        self.declared_type
    }

    /// Fix the logical type of this column.
    pub fn set_declared_type(&mut self, column_type: ColumnType) {
        self.declared_type = Some(column_type);
    }

    fn retain(&mut self, keep: &[bool]) {
        let mut idx = 0;
        self.values.retain(|_| {
            let k = keep[idx];
            idx += 1;
            k
        });
    }

    fn memory_bytes(&self) -> u64 {
        let cells: usize = self
            .values
            .iter()
            .map(|v| size_of::<Cell>() + v.as_ref().map_or(0, |s| s.len()))
            .sum();
        (size_of::<Column>() + self.name.len() + cells) as u64
    }
}

/// An ordered set of named columns with a uniform row count.
///
/// The shape invariant (every column has `row_count` cells, names are unique)
/// is enforced at construction and preserved by every mutating method.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    /// Create a dataset from columns.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map_or(0, Column::len);

        let mut seen = HashSet::new();
        for column in &columns {
            if column.len() != row_count {
                return Err(SieveError::Shape(format!(
                    "column '{}' has {} values, expected {}",
                    column.name,
                    column.len(),
                    row_count
                )));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(SieveError::Shape(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
        }

        Ok(Self { columns, row_count })
    }

    /// Create a dataset from headers and row-major cells.
    ///
    /// Short rows are padded with nulls; long rows are truncated.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        let mut columns: Vec<Vec<Cell>> = vec![Vec::with_capacity(rows.len()); headers.len()];
        for row in rows {
            let mut cells = row.into_iter();
            for column in columns.iter_mut() {
                column.push(cells.next().flatten());
            }
        }

        let columns = headers
            .into_iter()
            .zip(columns)
            .map(|(name, values)| Column {
                name,
                values,
                declared_type: None,
            })
            .collect();
        Self::new(columns)
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// All columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get all column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get a mutable column by name.
    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.columns.get(col).and_then(|c| c.get(row))
    }

    /// Row values in column order.
    pub fn row(&self, row: usize) -> Vec<Option<&str>> {
        self.columns.iter().map(|c| c.get(row)).collect()
    }

    /// Row key used for duplicate detection.
    ///
    /// Every missing cell maps to `None`, so a null, an empty string and a
    /// whitespace-only string compare equal to each other and to nothing else.
    pub fn row_signature(&self, row: usize) -> Vec<Option<&str>> {
        self.columns
            .iter()
            .map(|c| c.get(row).filter(|v| !v.trim().is_empty()))
            .collect()
    }

    /// Mask that is `false` for every row repeating an earlier row.
    pub fn first_occurrence_mask(&self) -> Vec<bool> {
        let mut seen = HashSet::with_capacity(self.row_count);
        (0..self.row_count)
            .map(|row| seen.insert(self.row_signature(row)))
            .collect()
    }

    /// Keep only rows whose mask entry is `true`.
    ///
    /// # Panics
    ///
    /// Panics if `keep.len()` differs from the row count.
    pub fn retain_rows(&mut self, keep: &[bool]) {
        assert_eq!(keep.len(), self.row_count, "row mask length mismatch");
        for column in &mut self.columns {
            column.retain(keep);
        }
        self.row_count = keep.iter().filter(|k| **k).count();
    }

    /// Remove columns by name, returning how many were removed.
    pub fn remove_columns(&mut self, names: &[String]) -> usize {
        let before = self.columns.len();
        self.columns.retain(|c| !names.contains(&c.name));
        before - self.columns.len()
    }

    /// Approximate in-memory size: per-cell slot size plus string bytes.
    pub fn memory_bytes(&self) -> u64 {
        self.columns.iter().map(Column::memory_bytes).sum()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(vec![
            Column::new("id", vec![Some("1"), Some("2"), Some("1")]),
            Column::new("name", vec![Some("a"), None, Some("a")]),
        ])
        .unwrap()
    }

    #[test]
    fn test_default_is_empty() {
        let ds = Dataset::default();
        assert_eq!(ds.row_count(), 0);
        assert_eq!(ds.column_count(), 0);
        assert_eq!(ds, Dataset::new(Vec::new()).unwrap());
    }

    #[test]
    fn test_is_missing() {
        assert!(is_missing(None));
        assert!(is_missing(Some("")));
        assert!(is_missing(Some("   ")));
        assert!(!is_missing(Some("0")));
        assert!(!is_missing(Some("NA")));
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let err = Dataset::new(vec![
            Column::new("a", vec![Some("1")]),
            Column::new("b", vec![Some("1"), Some("2")]),
        ]);
        assert!(matches!(err, Err(SieveError::Shape(_))));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = Dataset::new(vec![
            Column::new("a", vec![Some("1")]),
            Column::new("a", vec![Some("2")]),
        ]);
        assert!(matches!(err, Err(SieveError::Shape(_))));
    }

    #[test]
    fn test_from_rows_pads_short_rows() {
        let ds = Dataset::from_rows(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![Some("1".to_string())], vec![Some("2".to_string()), Some("x".to_string())]],
        )
        .unwrap();
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.get(0, 1), None);
        assert_eq!(ds.get(1, 1), Some("x"));
    }

    #[test]
    fn test_row_signature_treats_blank_as_null() {
        let ds = Dataset::new(vec![Column::new(
            "a",
            vec![None, Some(""), Some("  "), Some("x")],
        )])
        .unwrap();
        assert_eq!(ds.row_signature(0), ds.row_signature(1));
        assert_eq!(ds.row_signature(1), ds.row_signature(2));
        assert_ne!(ds.row_signature(2), ds.row_signature(3));
    }

    #[test]
    fn test_first_occurrence_mask() {
        assert_eq!(sample().first_occurrence_mask(), vec![true, true, false]);
    }

    #[test]
    fn test_retain_rows_and_remove_columns() {
        let mut ds = sample();
        ds.retain_rows(&[true, false, true]);
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.get(1, 0), Some("1"));

        let removed = ds.remove_columns(&["name".to_string()]);
        assert_eq!(removed, 1);
        assert_eq!(ds.column_names(), vec!["id"]);
        assert_eq!(ds.row_count(), 2);
    }

    #[test]
    fn test_memory_bytes_monotonic() {
        let small = Dataset::new(vec![Column::new("a", vec![Some("1")])]).unwrap();
        let more_rows = Dataset::new(vec![Column::new("a", vec![Some("1"), Some("2")])]).unwrap();
        let more_cols = Dataset::new(vec![
            Column::new("a", vec![Some("1")]),
            Column::new("b", vec![Some("1")]),
        ])
        .unwrap();
        assert!(more_rows.memory_bytes() > small.memory_bytes());
        assert!(more_cols.memory_bytes() > small.memory_bytes());
        assert_eq!(small.memory_bytes(), small.clone().memory_bytes());
    }
}
