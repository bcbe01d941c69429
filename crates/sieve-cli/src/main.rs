//! Sieve CLI - dataset profiling and plan-driven cleaning.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

/// Install the tracing subscriber. Logs go to stderr so stdout stays
/// machine-readable.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Profile { file, json, output } => {
            commands::profile::run(file, json, output, config, cli.verbose)
        }

        Commands::Plan { file, output } => commands::plan::run(file, output, config),

        Commands::Clean {
            file,
            plan,
            output,
            format,
            report,
            json,
        } => commands::clean::run(
            commands::clean::CleanArgs {
                file,
                plan,
                output,
                format,
                report,
                json,
            },
            config,
            cli.verbose,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
