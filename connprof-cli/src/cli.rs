//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use connprof_core::import::{BatchDuplicate, ExistingConflict};

/// `ConnProf` command-line interface for managing connection profiles
#[derive(Parser)]
#[command(name = "connprof")]
#[command(author, version, about = "ConnProf command-line interface")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the profile directory
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// List stored profiles
    #[command(about = "List all profiles in the store")]
    List {
        /// Output format
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Bulk-import profiles from a CSV file
    #[command(about = "Plan a bulk profile import and optionally commit it")]
    Import {
        /// CSV file with candidate rows (header row required)
        file: PathBuf,

        /// Action when a proposed name already exists in the store
        #[arg(long, default_value = "skip", value_enum)]
        on_existing: OnExistingArg,

        /// Action when an earlier row in the batch proposed the same name
        #[arg(long, default_value = "skip", value_enum)]
        on_duplicate: OnDuplicateArg,

        /// Probe each planned profile's endpoint before committing
        #[arg(long)]
        check: bool,

        /// Maximum concurrent connectivity probes
        #[arg(long, default_value = "4", requires = "check")]
        concurrency: usize,

        /// Per-probe timeout in seconds
        #[arg(long, default_value = "5", requires = "check")]
        timeout: u64,

        /// Write the planned profiles after showing the plan
        #[arg(long)]
        commit: bool,

        /// Keep committing remaining rows when one write fails
        #[arg(long, requires = "commit")]
        continue_on_error: bool,

        /// Output format for the plan
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },
}

/// Output format for plan and list rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables
    Table,
    /// Machine-readable JSON
    Json,
}

/// `--on-existing` argument values
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnExistingArg {
    /// Replace the stored profile
    Overwrite,
    /// Import under a generated unique name
    Rename,
    /// Leave the stored profile untouched and drop the row
    Skip,
}

impl From<OnExistingArg> for ExistingConflict {
    fn from(arg: OnExistingArg) -> Self {
        match arg {
            OnExistingArg::Overwrite => Self::Overwrite,
            OnExistingArg::Rename => Self::Rename,
            OnExistingArg::Skip => Self::Skip,
        }
    }
}

/// `--on-duplicate` argument values
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnDuplicateArg {
    /// Import the later row under a generated unique name
    Rename,
    /// Drop the later row
    Skip,
}

impl From<OnDuplicateArg> for BatchDuplicate {
    fn from(arg: OnDuplicateArg) -> Self {
        match arg {
            OnDuplicateArg::Rename => Self::Rename,
            OnDuplicateArg::Skip => Self::Skip,
        }
    }
}
