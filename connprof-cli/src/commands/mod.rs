//! Command handler modules for the CLI.

mod import;
mod list;

use std::path::{Path, PathBuf};

use connprof_core::ProfileStore;

use crate::cli::Commands;
use crate::error::CliError;

/// Dispatch a CLI command to the appropriate handler.
pub fn dispatch(
    config_path: Option<&Path>,
    quiet: bool,
    command: Commands,
) -> Result<(), CliError> {
    match command {
        Commands::List { format } => list::cmd_list(config_path, format),
        Commands::Import {
            file,
            on_existing,
            on_duplicate,
            check,
            concurrency,
            timeout,
            commit,
            continue_on_error,
            format,
        } => import::cmd_import(
            config_path,
            import::ImportParams {
                file: &file,
                on_existing,
                on_duplicate,
                check,
                concurrency,
                timeout,
                commit,
                continue_on_error,
                format,
                quiet,
            },
        ),
    }
}

/// Resolves the profile store from the `--config` flag or the platform
/// default directory.
pub fn resolve_store(config_path: Option<&Path>) -> Result<ProfileStore, CliError> {
    let dir: PathBuf = match config_path {
        Some(path) => path.to_path_buf(),
        None => ProfileStore::default_dir()
            .ok_or_else(|| CliError::Config("cannot determine config directory".to_string()))?,
    };
    Ok(ProfileStore::new(dir))
}
