//! Bulk import command.
//!
//! Reads candidate rows from CSV, produces an import plan, renders it, and
//! optionally commits it to the store. Without `--commit` this is a dry run;
//! nothing is written.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use connprof_core::import::{
    ConflictPolicy, PlanOutcome, PrecheckOptions, TcpConnectivityTester, ValidationRules,
    plan_import, plan_import_checked,
};

use crate::cli::{OnDuplicateArg, OnExistingArg, OutputFormat};
use crate::error::CliError;
use crate::report;

use super::resolve_store;

/// Parameters for the import command.
pub struct ImportParams<'a> {
    /// CSV file with candidate rows.
    pub file: &'a Path,
    /// Policy for names already present in the store.
    pub on_existing: OnExistingArg,
    /// Policy for names duplicated inside the batch.
    pub on_duplicate: OnDuplicateArg,
    /// Run the connectivity precheck.
    pub check: bool,
    /// Maximum concurrent probes.
    pub concurrency: usize,
    /// Per-probe timeout in seconds.
    pub timeout: u64,
    /// Write the plan after rendering it.
    pub commit: bool,
    /// Keep committing after individual write failures.
    pub continue_on_error: bool,
    /// Output format.
    pub format: OutputFormat,
    /// Suppress informational output.
    pub quiet: bool,
}

/// Import command handler
pub fn cmd_import(config_path: Option<&Path>, params: ImportParams<'_>) -> Result<(), CliError> {
    let store = resolve_store(config_path)?;
    let rows = crate::reader::read_csv(params.file)?;
    let existing = store.list_names()?;

    let rules = ValidationRules::default();
    let policy = ConflictPolicy {
        on_existing: params.on_existing.into(),
        on_batch_duplicate: params.on_duplicate.into(),
    };

    let outcome = if params.check {
        let options = PrecheckOptions {
            concurrency: params.concurrency,
            timeout: Duration::from_secs(params.timeout),
        };
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(plan_import_checked(
            rows,
            &existing,
            &rules,
            policy,
            Arc::new(TcpConnectivityTester),
            &options,
            None,
        ))?
    } else {
        plan_import(rows, &existing, &rules, policy)?
    };

    render(&outcome, params.format)?;

    if params.commit {
        let summary = store.commit(&outcome.plan, params.continue_on_error)?;
        if !params.quiet {
            println!();
            println!("Committed: {} saved, {} failed", summary.saved, summary.failed);
        }
    } else if !params.quiet && outcome.plan.total_planned() > 0 {
        println!();
        println!("Dry run; re-run with --commit to write these profiles.");
    }

    Ok(())
}

fn render(outcome: &PlanOutcome, format: OutputFormat) -> Result<(), CliError> {
    match format {
        OutputFormat::Table => println!("{}", report::format_table(&outcome.plan, &outcome.errors)),
        OutputFormat::Json => println!("{}", report::format_json(&outcome.plan, &outcome.errors)?),
    }
    Ok(())
}
