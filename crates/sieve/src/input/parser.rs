//! CSV/TSV parser with delimiter detection.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::dataset::{Cell, Dataset};
use crate::error::{Result, SieveError};

use super::source::SourceMetadata;

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Tokens read as null cells unless configured otherwise.
const DEFAULT_NA_VALUES: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

/// Parser configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether the file has a header row.
    pub has_header: bool,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
    /// Cell contents (after trimming) that are read as null.
    pub na_values: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
            quote: b'"',
            na_values: DEFAULT_NA_VALUES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Parses delimited text files into datasets.
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file and return the dataset and source metadata.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(Dataset, SourceMetadata)> {
        let path = path.as_ref();

        let mut file = File::open(path).map_err(|e| SieveError::io(path, e))?;
        let size_bytes = file
            .metadata()
            .map_err(|e| SieveError::io(path, e))?
            .len();

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .map_err(|e| SieveError::io(path, e))?;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(&contents)?,
        };

        let dataset = self.parse_bytes(&contents, delimiter)?;

        let format = match delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        }
        .to_string();

        debug!(
            path = %path.display(),
            format = %format,
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            "parsed input file"
        );

        let source = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            size_bytes,
            format,
            dataset.row_count(),
            dataset.column_count(),
        );

        Ok((dataset, source))
    }

    /// Parse in-memory text with delimiter auto-detection.
    pub fn parse_str(&self, text: &str) -> Result<Dataset> {
        let bytes = text.as_bytes();
        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(bytes)?,
        };
        self.parse_bytes(bytes, delimiter)
    }

    /// Parse bytes with a known delimiter.
    fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<Dataset> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(self.config.has_header)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let mut records = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }
            records.push(result?);
        }

        let headers: Vec<String> = if self.config.has_header {
            reader.headers()?.iter().map(|s| s.to_string()).collect()
        } else {
            match records.first() {
                Some(record) => (0..record.len())
                    .map(|i| format!("column_{}", i + 1))
                    .collect(),
                None => return Err(SieveError::EmptyData("No data rows found".to_string())),
            }
        };

        if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
            return Err(SieveError::EmptyData("No columns found".to_string()));
        }

        let rows: Vec<Vec<Cell>> = records
            .iter()
            .map(|record| record.iter().map(|s| self.to_cell(s)).collect())
            .collect();

        Dataset::from_rows(headers, rows)
    }

    fn to_cell(&self, raw: &str) -> Cell {
        let trimmed = raw.trim();
        if self.config.na_values.iter().any(|na| na == trimmed) {
            None
        } else {
            Some(raw.to_string())
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick the delimiter that splits the first lines most evenly.
///
/// Candidates are ranked by whether every sampled line has the same field
/// count, then by that count, then by preference order (tab first).
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let lines: Vec<String> = BufReader::new(bytes)
        .lines()
        .take(10)
        .map_while(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(SieveError::EmptyData("No lines to analyze".to_string()));
    }

    let best = DELIMITERS
        .iter()
        .enumerate()
        .filter_map(|(rank, &delim)| {
            let first = unquoted_count(&lines[0], delim);
            if first == 0 {
                return None;
            }
            let uniform = lines[1..]
                .iter()
                .all(|line| unquoted_count(line, delim) == first);
            Some(((uniform, first, std::cmp::Reverse(rank)), delim))
        })
        .max_by_key(|(score, _)| *score)
        .map(|(_, delim)| delim);

    Ok(best.unwrap_or(b','))
}

/// Occurrences of `delimiter` outside double-quoted sections.
fn unquoted_count(line: &str, delimiter: u8) -> usize {
    line.split('"')
        .step_by(2)
        .map(|segment| segment.bytes().filter(|&b| b == delimiter).count())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter_csv() {
        let data = b"a,b,c\n1,2,3\n4,5,6";
        assert_eq!(detect_delimiter(data).unwrap(), b',');
    }

    #[test]
    fn test_detect_delimiter_tsv() {
        let data = b"a\tb\tc\n1\t2\t3\n4\t5\t6";
        assert_eq!(detect_delimiter(data).unwrap(), b'\t');
    }

    #[test]
    fn test_detect_delimiter_ignores_quoted_commas() {
        let data = b"name;city\n\"Smith, J\";Oslo\n\"Doe, A\";Rome";
        assert_eq!(detect_delimiter(data).unwrap(), b';');
    }

    #[test]
    fn test_detect_delimiter_prefers_uniform_split() {
        // Only one data row contains commas.
        let data = b"a|b\nx,y,z|1\np|2";
        assert_eq!(detect_delimiter(data).unwrap(), b'|');
    }

    #[test]
    fn test_parse_csv() {
        let parser = Parser::new();
        let data = b"name,age,city\nAlice,30,NYC\nBob,25,LA";
        let ds = parser.parse_bytes(data, b',').unwrap();

        assert_eq!(ds.column_names(), vec!["name", "age", "city"]);
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.get(0, 0), Some("Alice"));
        assert_eq!(ds.get(1, 1), Some("25"));
    }

    #[test]
    fn test_na_tokens_become_null() {
        let parser = Parser::new();
        let ds = parser.parse_str("a,b\nNA,1\n,2\nnull,3\nmissing,4\n").unwrap();
        let col = ds.column("a").unwrap();
        assert_eq!(col.get(0), None);
        assert_eq!(col.get(1), None);
        assert_eq!(col.get(2), None);
        assert_eq!(col.get(3), Some("missing"));
    }

    #[test]
    fn test_custom_na_values() {
        let config = ParserConfig {
            na_values: vec!["-999".to_string()],
            ..ParserConfig::default()
        };
        let ds = Parser::with_config(config)
            .parse_str("x,y\n-999,1\nNA,2\n")
            .unwrap();
        assert_eq!(ds.get(0, 0), None);
        assert_eq!(ds.get(1, 0), Some("NA"));
    }

    #[test]
    fn test_ragged_rows_padded() {
        let ds = Parser::new().parse_str("a,b,c\n1,2\n4,5,6,7\n").unwrap();
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.get(0, 2), None);
        assert_eq!(ds.get(1, 2), Some("6"));
    }

    #[test]
    fn test_header_only_file_has_zero_rows() {
        let ds = Parser::new().parse_str("a,b\n").unwrap();
        assert_eq!(ds.row_count(), 0);
        assert_eq!(ds.column_count(), 2);
    }

    #[test]
    fn test_max_rows() {
        let config = ParserConfig {
            max_rows: Some(1),
            ..ParserConfig::default()
        };
        let ds = Parser::with_config(config)
            .parse_str("a\n1\n2\n3\n")
            .unwrap();
        assert_eq!(ds.row_count(), 1);
    }
}
