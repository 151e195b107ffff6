//! CLI error types and exit codes.

use connprof_core::{ConnProfError, PlanError, StoreError};

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - configuration, input, or store errors
    pub const GENERAL_ERROR: i32 = 1;
    /// Planning failure - the import plan could not be produced
    pub const PLAN_FAILURE: i32 = 2;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input file error (missing file, malformed CSV)
    #[error("Input error: {0}")]
    Input(String),

    /// Import planning failed
    #[error("Planning error: {0}")]
    Plan(String),

    /// Profile store error
    #[error("Store error: {0}")]
    Store(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<PlanError> for CliError {
    fn from(err: PlanError) -> Self {
        Self::Plan(err.to_string())
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        Self::Store(err.to_string())
    }
}

impl From<ConnProfError> for CliError {
    fn from(err: ConnProfError) -> Self {
        match err {
            ConnProfError::Plan(e) => e.into(),
            ConnProfError::Store(e) => e.into(),
        }
    }
}

impl CliError {
    /// Returns the appropriate exit code for this error type.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: General error (configuration, input, store, IO)
    /// - 2: Planning failure
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Plan(_) => exit_codes::PLAN_FAILURE,
            Self::Config(_) | Self::Input(_) | Self::Store(_) | Self::Io(_) => {
                exit_codes::GENERAL_ERROR
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_errors_use_plan_failure_exit_code() {
        let err: CliError = PlanError::RenameExhausted {
            name: "prod-db".to_string(),
            attempts: 10_000,
        }
        .into();
        assert_eq!(err.exit_code(), exit_codes::PLAN_FAILURE);
    }

    #[test]
    fn store_errors_use_general_exit_code() {
        let err: CliError = StoreError::InvalidName("a/b".to_string()).into();
        assert_eq!(err.exit_code(), exit_codes::GENERAL_ERROR);
    }
}
