//! Plan command - propose a rule-based cleaning plan.

use std::path::{Path, PathBuf};

use colored::Colorize;
use sieve::plan::HeuristicPlanner;

use super::{load_sieve, require_file};

pub fn run(
    file: PathBuf,
    output: Option<PathBuf>,
    config: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    require_file(&file)?;
    let sieve = load_sieve(config)?;

    let result = sieve.profile_file(&file)?;
    let plan = sieve.propose_plan(&HeuristicPlanner::new(), &result.profile)?;

    match output {
        Some(path) => {
            plan.save(&path)?;
            println!(
                "{} {} for {}",
                "Proposed".cyan().bold(),
                format!("{} steps", plan.len()).white().bold(),
                file.display()
            );
            for (i, step) in plan.iter().enumerate() {
                println!(
                    "  {}. {} {}",
                    i + 1,
                    step.action.kind().as_str().white(),
                    step.reasoning.dimmed()
                );
            }
            println!();
            println!(
                "{} {}",
                "Saved to".green().bold(),
                path.display().to_string().white()
            );
        }
        // Plain JSON on stdout so the plan can be piped into a file.
        None => println!("{}", plan.to_json_pretty()?),
    }

    Ok(())
}
