//! In-memory tabular data and its serialization.

mod table;
mod writer;

pub use table::{is_missing, Cell, Column, Dataset};
pub use writer::{DatasetWriter, OutputFormat};
