//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use sieve::OutputFormat;
use std::path::PathBuf;

/// Sieve: profile tabular data and apply cleaning plans
#[derive(Parser)]
#[command(name = "sieve")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON configuration file (parser, profiler and output settings)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Profile a data file
    Profile {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print the profile as JSON
        #[arg(long)]
        json: bool,

        /// Also save the profile as JSON to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Propose a rule-based cleaning plan for a data file
    Plan {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path for the plan (default: print to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Apply a cleaning plan and write the cleaned data
    Clean {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Path to the plan (JSON array of steps)
        #[arg(short, long, value_name = "PLAN")]
        plan: PathBuf,

        /// Output path for cleaned data (default: <file>_cleaned.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (csv, tsv or json)
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Output path for the execution report (default: <output>.report.json)
        #[arg(long, value_name = "REPORT")]
        report: Option<PathBuf>,

        /// Print the execution report as JSON
        #[arg(long)]
        json: bool,
    },
}
