//! Example: profile a data file, build the heuristic plan and apply it.
//!
//! Usage:
//!   cargo run --example clean -- <file_path>

use std::env;
use std::path::Path;
use std::sync::atomic::AtomicBool;

use sieve::{CleanOptions, Sieve};

fn main() -> sieve::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --example clean -- <file_path>");
        std::process::exit(1);
    }

    let path = Path::new(&args[1]);
    if !path.exists() {
        eprintln!("Error: File not found: {}", path.display());
        std::process::exit(1);
    }

    let sieve = Sieve::new();
    let profiled = sieve.profile_file(path)?;
    let profile = &profiled.profile;

    println!("## Profile: {}", profiled.source.file);
    println!(
        "  {} rows, {} columns, {} duplicate rows",
        profile.row_count, profile.column_count, profile.duplicate_row_count
    );
    for stat in profile.column_stats.values() {
        println!(
            "  {:20} {:10} missing={:<5} unique={:<5} outliers={}",
            stat.name, stat.inferred_type, stat.missing_count, stat.unique_count, stat.outlier_count
        );
    }
    println!();

    let plan = sieve.heuristic_plan(profile);
    println!("## Plan ({} steps)", plan.len());
    for (i, step) in plan.iter().enumerate() {
        println!("  {}. {} - {}", i + 1, step.action.kind(), step.reasoning);
    }
    println!();

    let result = sieve.clean_file(path, &plan, &CleanOptions::default(), &AtomicBool::new(false))?;
    println!("## Result: {}", result.report.status);
    for entry in &result.report.applied_steps {
        println!("  - {}", entry);
    }
    for failure in &result.report.errors {
        println!(
            "  ! step {}: {} ({})",
            failure.step_index,
            failure.message,
            failure.error_kind.label()
        );
    }
    println!();
    println!("Cleaned data: {}", result.output_path.display());
    println!("Report:       {}", result.report_path.display());

    Ok(())
}
