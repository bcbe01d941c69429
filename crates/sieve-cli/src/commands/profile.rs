//! Profile command - summarize a data file.

use std::path::{Path, PathBuf};

use colored::Colorize;
use sieve::{ColumnType, DatasetProfile};

use super::{load_sieve, require_file};

pub fn run(
    file: PathBuf,
    json_output: bool,
    output: Option<PathBuf>,
    config: Option<&Path>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    require_file(&file)?;
    let sieve = load_sieve(config)?;

    if !json_output {
        println!(
            "{} {}",
            "Profiling".cyan().bold(),
            file.display().to_string().white()
        );
    }

    let result = sieve.profile_file(&file)?;
    let json = if json_output && verbose {
        // Include source metadata alongside the profile.
        serde_json::to_string_pretty(&result)?
    } else {
        result.profile.to_json_pretty()?
    };

    if let Some(path) = &output {
        result.profile.save(path)?;
    }

    if json_output {
        println!("{}", json);
        return Ok(());
    }

    if verbose {
        println!("  Format: {}", result.source.format);
        println!("  Hash:   {}", result.source.hash.dimmed());
    }
    print_profile(&result.profile);

    if let Some(path) = &output {
        println!();
        println!(
            "{} {}",
            "Saved to".green().bold(),
            path.display().to_string().white()
        );
    }

    Ok(())
}

fn print_profile(profile: &DatasetProfile) {
    println!();
    println!(
        "{} rows, {} columns, {} duplicate rows, {} bytes",
        profile.row_count.to_string().white().bold(),
        profile.column_count.to_string().white().bold(),
        highlight(profile.duplicate_row_count),
        profile.memory_bytes
    );

    let incomplete: Vec<&str> = profile
        .columns_with_missing()
        .map(|c| c.name.as_str())
        .collect();
    if !incomplete.is_empty() {
        println!(
            "{} {}",
            "Missing values in:".yellow(),
            incomplete.join(", ")
        );
    }

    println!();
    println!("{}", "Columns:".cyan().bold());

    for stat in profile.column_stats.values() {
        println!(
            "  {} {}",
            stat.name.white().bold(),
            format!("({})", type_label(stat.inferred_type)).dimmed()
        );
        println!(
            "    missing: {} ({:.1}%)  unique: {}  outliers: {}",
            highlight(stat.missing_count),
            stat.missing_pct,
            stat.unique_count,
            highlight(stat.outlier_count)
        );
        if let Some(numeric) = &stat.numeric {
            println!(
                "    min: {}  max: {}  mean: {:.3}  median: {}  std: {:.3}  iqr: {}",
                numeric.min,
                numeric.max,
                numeric.mean,
                numeric.median,
                numeric.std,
                numeric.iqr()
            );
        }
        if !stat.sample_values.is_empty() {
            println!("    sample: {}", stat.sample_values.join(", ").dimmed());
        }
    }
}

fn type_label(t: ColumnType) -> colored::ColoredString {
    match t {
        ColumnType::Numeric => t.as_str().blue(),
        ColumnType::DateTime => t.as_str().magenta(),
        ColumnType::Boolean => t.as_str().cyan(),
        ColumnType::Text => t.as_str().normal(),
        ColumnType::Unknown => t.as_str().red(),
    }
}

fn highlight(count: usize) -> colored::ColoredString {
    if count > 0 {
        count.to_string().yellow()
    } else {
        count.to_string().green()
    }
}
