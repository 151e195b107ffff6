//! `ConnProf` CLI - Command-line interface for the `ConnProf` profile manager
//!
//! Provides commands for listing stored profiles and for bulk-importing
//! profiles from CSV with a reviewable plan before any write occurs.

mod cli;
mod commands;
mod error;
mod reader;
mod report;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        let level = match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("connprof={level}")));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let config_path = cli.config.as_deref();
    let result = commands::dispatch(config_path, cli.quiet, cli.command);

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(e.exit_code());
    }
}
