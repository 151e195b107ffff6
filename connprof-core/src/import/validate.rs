//! Field-level row validation.
//!
//! Validation rules are configuration, not planner logic: the validator
//! applies whichever checks the [`ValidationRules`] enable and collects every
//! failure for a row instead of stopping at the first, so users see the
//! complete defect list.

use std::collections::BTreeMap;

use regex::Regex;
use secrecy::ExposeSecret;

use super::row::{CandidateRow, CellError};

/// Configurable field-level checks applied to each candidate row.
#[derive(Debug, Clone)]
pub struct ValidationRules {
    /// Require a non-empty database host.
    pub require_host: bool,
    /// Require a non-empty database user.
    pub require_user: bool,
    /// Require a non-empty database password.
    pub require_password: bool,
    /// When the SSH tunnel is enabled, require tunnel host, user and at
    /// least one authentication method (password or identity file).
    pub require_ssh_auth: bool,
    /// Optional pattern the profile name must match.
    pub name_pattern: Option<Regex>,
    /// Optional maximum profile name length in characters.
    pub max_name_len: Option<usize>,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            require_host: true,
            require_user: true,
            require_password: true,
            require_ssh_auth: true,
            name_pattern: None,
            max_name_len: None,
        }
    }
}

/// Result of validating a batch of candidate rows.
#[derive(Debug, Default)]
pub struct ValidationOutcome {
    /// Rows with no errors, in input order.
    pub valid: Vec<CandidateRow>,
    /// Rows with at least one error, in input order.
    pub invalid: Vec<CandidateRow>,
    /// All cell errors, sorted by `(row, column, message)`.
    pub errors: Vec<CellError>,
}

impl ValidationOutcome {
    /// Returns the errors grouped by row number, each group in
    /// `(column, message)` order.
    #[must_use]
    pub fn errors_by_row(&self) -> BTreeMap<u32, Vec<&CellError>> {
        let mut grouped: BTreeMap<u32, Vec<&CellError>> = BTreeMap::new();
        for error in &self.errors {
            grouped.entry(error.row).or_default().push(error);
        }
        grouped
    }
}

/// Validates candidate rows against the given rules.
///
/// Pure function of its inputs: rows carrying upstream parse errors or
/// failing any enabled check land in `invalid`, everything else in `valid`.
#[must_use]
pub fn validate(rows: Vec<CandidateRow>, rules: &ValidationRules) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::default();

    for row in rows {
        let mut errors = row.parse_errors.clone();
        check_row(&row, rules, &mut errors);

        if errors.is_empty() {
            outcome.valid.push(row);
        } else {
            outcome.errors.append(&mut errors);
            outcome.invalid.push(row);
        }
    }

    outcome.errors.sort();
    outcome
}

fn check_row(row: &CandidateRow, rules: &ValidationRules, errors: &mut Vec<CellError>) {
    let name = row.name.trim();
    if name.is_empty() {
        errors.push(CellError::new(row.row_num, "name", "required field is empty"));
    } else {
        if let Some(pattern) = &rules.name_pattern {
            if !pattern.is_match(name) {
                errors.push(CellError::new(
                    row.row_num,
                    "name",
                    format!("does not match required pattern {}", pattern.as_str()),
                ));
            }
        }
        if let Some(max) = rules.max_name_len {
            if name.chars().count() > max {
                errors.push(CellError::new(
                    row.row_num,
                    "name",
                    format!("longer than {max} characters"),
                ));
            }
        }
    }

    let db = &row.profile.db;
    if rules.require_host && db.host.trim().is_empty() {
        errors.push(CellError::new(row.row_num, "host", "required field is empty"));
    }
    if rules.require_user && db.user.trim().is_empty() {
        errors.push(CellError::new(row.row_num, "user", "required field is empty"));
    }
    if rules.require_password && db.password.expose_secret().is_empty() {
        errors.push(CellError::new(row.row_num, "password", "required field is empty"));
    }
    if db.port == 0 {
        errors.push(CellError::new(row.row_num, "port", "must be between 1 and 65535"));
    }

    let ssh = &row.profile.ssh_tunnel;
    if ssh.enabled && rules.require_ssh_auth {
        if ssh.host.trim().is_empty() {
            errors.push(CellError::new(
                row.row_num,
                "ssh_host",
                "required when ssh_enabled=true",
            ));
        }
        if ssh.user.trim().is_empty() {
            errors.push(CellError::new(
                row.row_num,
                "ssh_user",
                "required when ssh_enabled=true",
            ));
        }
        if ssh.password.expose_secret().is_empty() && ssh.identity_file.trim().is_empty() {
            errors.push(CellError::new(
                row.row_num,
                "ssh_password",
                "ssh_password or ssh_identity_file required when ssh_enabled=true",
            ));
        }
    }
}
