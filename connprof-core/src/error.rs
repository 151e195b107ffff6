//! Error types for the ConnProf core library.

use std::path::PathBuf;

/// Fatal failures of the import planning operation.
///
/// These abort the whole plan rather than skipping a row: a plan produced
/// past one of these would be silently incomplete or name-colliding.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// The rename generation loop could not find a unique name within the
    /// attempt budget.
    #[error("could not generate a unique name for '{name}' after {attempts} attempts")]
    RenameExhausted {
        /// The conflicting base name.
        name: String,
        /// Number of suffixes tried.
        attempts: usize,
    },

    /// The existing profile-name set could not be read.
    #[error("failed to list existing profiles: {0}")]
    ExistingNamesUnavailable(#[from] StoreError),
}

/// Errors from the file-backed profile store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The profile directory could not be read.
    #[error("cannot read profile directory {path}: {source}")]
    DirectoryUnreadable {
        /// The directory that failed to read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A profile name is not usable as a file stem.
    #[error("invalid profile name: '{0}'")]
    InvalidName(String),

    /// A commit write was asked to create a profile that already exists.
    #[error("profile '{0}' already exists and the plan did not allow overwrite")]
    AlreadyExists(String),

    /// Profile file serialization failed.
    #[error("failed to serialize profile: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Profile file parsing failed.
    #[error("failed to parse profile file {path}: {reason}")]
    Parse {
        /// The file that failed to parse.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level error type aggregating all core error domains.
#[derive(Debug, thiserror::Error)]
pub enum ConnProfError {
    /// Import planning failed.
    #[error("planning error: {0}")]
    Plan(#[from] PlanError),

    /// Profile store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
