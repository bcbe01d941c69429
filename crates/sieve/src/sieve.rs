//! Main Sieve struct and public API.

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dataset::{Dataset, DatasetWriter, OutputFormat};
use crate::error::{Result, SieveError};
use crate::input::{sibling_path, Parser, ParserConfig, SourceMetadata};
use crate::persistence::load_json;
use crate::plan::{HeuristicPlanner, Plan, PlanSource};
use crate::profile::{DatasetProfile, DatasetProfiler, ProfilerConfig};
use crate::transform::{ExecutionReport, PlanExecutor};

/// Configuration for a Sieve instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SieveConfig {
    /// How input files are read.
    pub parser: ParserConfig,
    /// Type inference and outlier settings, shared by profiling and execution.
    pub profiler: ProfilerConfig,
    /// Format of cleaned output when neither the caller nor the output path
    /// decides it.
    pub output_format: Option<OutputFormat>,
}

impl SieveConfig {
    /// Load configuration from a JSON file. Missing fields take defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        load_json(path, "configuration").map_err(|e| match e {
            SieveError::Persistence(msg) => SieveError::Config(msg),
            other => other,
        })
    }
}

/// Profile of a data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResult {
    pub source: SourceMetadata,
    pub profile: DatasetProfile,
}

/// Where and how to write a cleaned dataset.
#[derive(Debug, Clone, Default)]
pub struct CleanOptions {
    /// Output file; defaults to `<stem>_cleaned.<ext>` next to the input.
    pub output: Option<PathBuf>,
    /// Report file; defaults to `<output stem>.report.json` next to the output.
    pub report: Option<PathBuf>,
    /// Output format; defaults to the output extension, then the configured
    /// format, then the input's delimited format.
    pub format: Option<OutputFormat>,
}

/// Result of cleaning a data file.
#[derive(Debug, Clone)]
pub struct CleanResult {
    pub source: SourceMetadata,
    /// The cleaned dataset, as written to `output_path`.
    pub dataset: Dataset,
    pub report: ExecutionReport,
    pub output_path: PathBuf,
    pub report_path: PathBuf,
}

/// The main Sieve engine: load, profile, plan and clean.
pub struct Sieve {
    config: SieveConfig,
    parser: Parser,
    profiler: DatasetProfiler,
    executor: PlanExecutor,
}

impl Sieve {
    /// Create a new Sieve instance with default configuration.
    pub fn new() -> Self {
        Self::with_config(SieveConfig::default())
    }

    /// Create a Sieve instance with custom configuration.
    pub fn with_config(config: SieveConfig) -> Self {
        let parser = Parser::with_config(config.parser.clone());
        let profiler = DatasetProfiler::with_config(&config.profiler);
        let executor = PlanExecutor::with_config(&config.profiler);

        Self {
            config,
            parser,
            profiler,
            executor,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &SieveConfig {
        &self.config
    }

    /// Load a delimited data file.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<(Dataset, SourceMetadata)> {
        self.parser.parse_file(path)
    }

    /// Profile an in-memory dataset.
    pub fn profile(&self, dataset: &Dataset) -> DatasetProfile {
        self.profiler.profile(dataset)
    }

    /// Load and profile a data file.
    pub fn profile_file(&self, path: impl AsRef<Path>) -> Result<ProfileResult> {
        let (dataset, source) = self.load(path)?;
        let profile = self.profile(&dataset);
        Ok(ProfileResult { source, profile })
    }

    /// Ask a plan source for a plan.
    pub fn propose_plan(
        &self,
        source: &dyn PlanSource,
        profile: &DatasetProfile,
    ) -> Result<Plan> {
        let plan = source.propose(profile)?;
        info!(source = source.name(), steps = plan.len(), "plan proposed");
        Ok(plan)
    }

    /// The rule-based plan for a profile.
    pub fn heuristic_plan(&self, profile: &DatasetProfile) -> Plan {
        HeuristicPlanner::new().plan(profile)
    }

    /// Execute a plan against an in-memory dataset.
    pub fn execute(&self, dataset: &Dataset, plan: &Plan) -> (Dataset, ExecutionReport) {
        self.executor.execute(dataset, plan)
    }

    /// Load a file, execute a plan, and write the cleaned data and report.
    ///
    /// The input file is never written. The cleaned dataset is saved whatever
    /// the run's status, so partial results can be inspected.
    pub fn clean_file(
        &self,
        path: impl AsRef<Path>,
        plan: &Plan,
        options: &CleanOptions,
        cancel: &AtomicBool,
    ) -> Result<CleanResult> {
        let path = path.as_ref();
        let (raw, source) = self.load(path)?;

        let format = self.output_format(&source, options);
        let output_path = options
            .output
            .clone()
            .unwrap_or_else(|| sibling_path(path, &format!("_cleaned.{}", format.extension())));
        if same_file(path, &output_path) {
            return Err(SieveError::Config(format!(
                "output path '{}' is the input file",
                output_path.display()
            )));
        }
        let report_path = options
            .report
            .clone()
            .unwrap_or_else(|| sibling_path(&output_path, ".report.json"));
        if same_file(path, &report_path) {
            return Err(SieveError::Config(format!(
                "report path '{}' is the input file",
                report_path.display()
            )));
        }

        let (dataset, report) = self.executor.execute_until(&raw, plan, cancel);

        DatasetWriter::new(format).write_file(&dataset, &output_path)?;
        report.save(&report_path)?;

        info!(
            output = %output_path.display(),
            report = %report_path.display(),
            status = %report.status,
            "cleaned dataset written"
        );

        Ok(CleanResult {
            source,
            dataset,
            report,
            output_path,
            report_path,
        })
    }

    fn output_format(&self, source: &SourceMetadata, options: &CleanOptions) -> OutputFormat {
        options
            .format
            .or_else(|| options.output.as_ref().and_then(|p| OutputFormat::from_path(p)))
            .or(self.config.output_format)
            .or_else(|| source.format.parse().ok())
            .unwrap_or_default()
    }
}

impl Default for Sieve {
    fn default() -> Self {
        Self::new()
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_config_roundtrip_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sieve.json");
        fs::write(&path, r#"{"profiler": {"iqr_multiplier": 3.0}, "output_format": "json"}"#)
            .unwrap();

        let config = SieveConfig::load(&path).unwrap();
        assert_eq!(config.profiler.iqr_multiplier, 3.0);
        assert_eq!(config.profiler.sample_size, 5);
        assert_eq!(config.output_format, Some(OutputFormat::Json));
        assert_eq!(config.parser, ParserConfig::default());
    }

    #[test]
    fn test_bad_config_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sieve.json");
        fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(SieveConfig::load(&path), Err(SieveError::Config(_))));
    }

    #[test]
    fn test_refuses_to_overwrite_input() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("data.csv");
        fs::write(&input, "a,b\n1,2\n").unwrap();

        let options = CleanOptions {
            output: Some(input.clone()),
            ..CleanOptions::default()
        };
        let err = Sieve::new()
            .clean_file(&input, &Plan::default(), &options, &AtomicBool::new(false))
            .unwrap_err();
        assert!(matches!(err, SieveError::Config(_)));
        assert_eq!(fs::read_to_string(&input).unwrap(), "a,b\n1,2\n");
    }

    #[test]
    fn test_default_output_paths() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("data.tsv");
        fs::write(&input, "a\tb\n1\t2\n1\t2\n").unwrap();

        let plan = Plan::parse(r#"[{"action": "drop_duplicates"}]"#).unwrap();
        let result = Sieve::new()
            .clean_file(&input, &plan, &CleanOptions::default(), &AtomicBool::new(false))
            .unwrap();

        assert_eq!(result.output_path, dir.path().join("data_cleaned.tsv"));
        assert_eq!(result.report_path, dir.path().join("data_cleaned.report.json"));
        assert_eq!(
            fs::read_to_string(&result.output_path).unwrap(),
            "a\tb\n1\t2\n"
        );
        let saved = ExecutionReport::load(&result.report_path).unwrap();
        assert_eq!(saved, result.report);
    }
}
