//! Sieve: dataset profiling and plan-driven cleaning for tabular data.
//!
//! Sieve profiles a raw dataset, accepts a cleaning plan (an ordered list of
//! typed actions, from rules or from any other [`plan::PlanSource`]) and
//! applies it, producing a new dataset together with a changelog.
//!
//! # Core Principles
//!
//! - **Non-destructive**: the input dataset is never modified
//! - **Untrusted plans**: every step is validated against a closed action set
//! - **Partial success**: a failing step is recorded and skipped, never fatal
//! - **Deterministic**: the same data and plan always give the same result
//!
//! # Example
//!
//! ```no_run
//! use std::sync::atomic::AtomicBool;
//! use sieve::{CleanOptions, Sieve};
//!
//! let sieve = Sieve::new();
//! let profiled = sieve.profile_file("survey.csv").unwrap();
//! println!("Duplicates: {}", profiled.profile.duplicate_row_count);
//!
//! let plan = sieve.heuristic_plan(&profiled.profile);
//! let result = sieve
//!     .clean_file("survey.csv", &plan, &CleanOptions::default(), &AtomicBool::new(false))
//!     .unwrap();
//! for entry in &result.report.applied_steps {
//!     println!("{}", entry);
//! }
//! ```

pub mod dataset;
pub mod error;
pub mod inference;
pub mod input;
pub mod plan;
pub mod profile;
pub mod transform;

mod persistence;
mod sieve;

pub use crate::sieve::{CleanOptions, CleanResult, ProfileResult, Sieve, SieveConfig};
pub use dataset::{Column, Dataset, DatasetWriter, OutputFormat};
pub use error::{ErrorKind, Result, SieveError, StepError};
pub use input::SourceMetadata;
pub use plan::{Action, Plan, PlanSource, PlanStep};
pub use profile::{ColumnStat, ColumnType, DatasetProfile, DatasetProfiler};
pub use transform::{ExecutionReport, ExecutionStatus, PlanExecutor};
