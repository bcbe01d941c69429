//! Clean command - execute a plan against a data file.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use sieve::transform::StepState;
use sieve::{CleanOptions, ExecutionReport, ExecutionStatus, OutputFormat, Plan};

use super::{load_sieve, require_file};

/// Arguments for the clean command.
pub struct CleanArgs {
    pub file: PathBuf,
    pub plan: PathBuf,
    pub output: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub report: Option<PathBuf>,
    pub json: bool,
}

pub fn run(
    args: CleanArgs,
    config: Option<&Path>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    require_file(&args.file)?;
    if !args.plan.exists() {
        return Err(format!("Plan file not found: {}", args.plan.display()).into());
    }

    let sieve = load_sieve(config)?;
    let plan = Plan::load(&args.plan)?;
    tracing::debug!(plan = %args.plan.display(), steps = plan.len(), "plan loaded");

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        ctrlc::set_handler(move || {
            tracing::warn!("interrupt received, stopping after the current step");
            cancel.store(true, Ordering::SeqCst);
        })?;
    }

    if !args.json {
        println!(
            "{} {} with {}",
            "Cleaning".cyan().bold(),
            args.file.display().to_string().white(),
            format!("{} steps", plan.len()).white().bold()
        );
    }

    let options = CleanOptions {
        output: args.output,
        report: args.report,
        format: args.format,
    };
    let result = sieve.clean_file(&args.file, &plan, &options, &cancel)?;

    if args.json {
        println!("{}", result.report.to_json_pretty()?);
        return Ok(());
    }

    print_report(&result.report, verbose);

    println!();
    println!(
        "{} {}",
        "Saved to".green().bold(),
        result.output_path.display().to_string().white()
    );
    println!(
        "{} {}",
        "Report:".green().bold(),
        result.report_path.display().to_string().white()
    );

    Ok(())
}

fn print_report(report: &ExecutionReport, verbose: bool) {
    println!();
    let status = match report.status {
        ExecutionStatus::Success => report.status.as_str().green().bold(),
        ExecutionStatus::Partial => report.status.as_str().yellow().bold(),
        ExecutionStatus::Failure => report.status.as_str().red().bold(),
    };
    println!(
        "Status: {} ({} applied, {} failed)",
        status,
        report.applied_count(),
        report.failed_count()
    );
    println!(
        "Rows: {} -> {}  Columns: {} -> {}",
        report.rows_before, report.rows_after, report.columns_before, report.columns_after
    );
    if report.cancelled {
        println!("{}", "Cancelled before the plan finished".yellow());
    }

    if !report.applied_steps.is_empty() {
        println!();
        println!("{}", "Applied:".cyan().bold());
        for entry in &report.applied_steps {
            println!("  {} {}", "✓".green(), entry);
        }
    }

    if !report.errors.is_empty() {
        println!();
        println!("{}", "Errors:".red().bold());
        for failure in &report.errors {
            println!(
                "  {} step {} [{}] {}",
                "✗".red(),
                failure.step_index,
                failure.error_kind.label(),
                failure.message
            );
        }
    }

    if !report.warnings.is_empty() {
        println!();
        println!("{}", "Warnings:".yellow().bold());
        for warning in &report.warnings {
            println!("  {} {}", "!".yellow(), warning);
        }
    }

    if verbose {
        for flag in &report.flags {
            println!("  flagged rows in {}: {:?}", flag.column, flag.rows);
        }

        println!();
        println!("{}", "Steps:".cyan().bold());
        for record in &report.steps {
            let state = match record.state {
                StepState::Applied => "applied".green(),
                StepState::Failed => "failed".red(),
                StepState::Pending => "pending".dimmed(),
            };
            println!("  {}. {} {}", record.index, record.action, state);
        }
    }
}
