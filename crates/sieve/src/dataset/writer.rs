//! Serializing datasets back to delimited text or JSON records.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SieveError};
use crate::persistence::ensure_parent_dir;

use super::table::Dataset;

/// Output format for a cleaned dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Tsv,
    /// Array of row objects keyed by column name.
    Json,
}

impl OutputFormat {
    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Tsv => "tsv",
            OutputFormat::Json => "json",
        }
    }

    /// Guess the format from a path's extension.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?;
        ext.parse().ok()
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "tsv" | "tab" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use csv, tsv, or json.", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Writes datasets to files or arbitrary writers.
pub struct DatasetWriter {
    format: OutputFormat,
}

impl DatasetWriter {
    /// Create a writer for the given format.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Write the dataset to a file, creating parent directories as needed.
    pub fn write_file(&self, dataset: &Dataset, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        ensure_parent_dir(path)?;
        let file = File::create(path).map_err(|e| SieveError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        self.write(dataset, &mut writer)?;
        writer.flush().map_err(|e| SieveError::io(path, e))?;
        Ok(())
    }

    /// Write the dataset to any writer.
    pub fn write<W: Write>(&self, dataset: &Dataset, writer: W) -> Result<()> {
        match self.format {
            OutputFormat::Csv => write_delimited(dataset, writer, b','),
            OutputFormat::Tsv => write_delimited(dataset, writer, b'\t'),
            OutputFormat::Json => write_json(dataset, writer),
        }
    }
}

fn write_delimited<W: Write>(dataset: &Dataset, writer: W, delimiter: u8) -> Result<()> {
    let mut out = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    out.write_record(dataset.column_names())?;
    for row in 0..dataset.row_count() {
        out.write_record(dataset.row(row).into_iter().map(|v| v.unwrap_or("")))?;
    }
    out.flush().map_err(|e| SieveError::Persistence(e.to_string()))?;
    Ok(())
}

fn write_json<W: Write>(dataset: &Dataset, writer: W) -> Result<()> {
    let names = dataset.column_names();
    let records: Vec<IndexMap<&str, Option<&str>>> = (0..dataset.row_count())
        .map(|row| names.iter().copied().zip(dataset.row(row)).collect())
        .collect();
    serde_json::to_writer_pretty(writer, &records)?;
    Ok(())
}
