//! Dataset profiles: per-column statistics and dataset-level aggregates.

mod column;
mod profiler;
mod table;
mod types;

pub use column::{ColumnStat, NumericSummary};
pub use profiler::{DatasetProfiler, ProfilerConfig};
pub use table::DatasetProfile;
pub use types::ColumnType;
