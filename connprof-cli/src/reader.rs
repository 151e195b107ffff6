//! CSV reader producing candidate rows for the import planner.
//!
//! The reader is deliberately forgiving about layout (header casing,
//! separators inside header names, extra columns) and strict about content:
//! a malformed cell never drops the row, it attaches a [`CellError`] so the
//! planner reports it as `invalid-row` with the full defect list.

use std::collections::HashMap;
use std::path::Path;

use connprof_core::import::{CandidateRow, CellError};
use connprof_core::models::ProfileInfo;
use secrecy::SecretString;

use crate::error::CliError;

/// Columns the reader understands, after header normalization.
const KNOWN_COLUMNS: &[&str] = &[
    "name",
    "host",
    "port",
    "user",
    "password",
    "ssh_enabled",
    "ssh_host",
    "ssh_port",
    "ssh_user",
    "ssh_password",
    "ssh_key",
    "ssh_identity_file",
    "ssh_local_port",
];

/// Columns that must be present in the header.
const REQUIRED_COLUMNS: &[&str] = &["name", "host", "user", "password"];

/// Reads candidate rows from a CSV file.
///
/// Row numbers are 1-based file line numbers; the header is row 1, so the
/// first data row is row 2. Fully empty rows are dropped without a row
/// number being consumed by the planner.
pub fn read_csv(path: &Path) -> Result<Vec<CandidateRow>, CliError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| CliError::Input(format!("cannot open {}: {e}", path.display())))?;

    let headers = reader
        .headers()
        .map_err(|e| CliError::Input(format!("cannot read header row: {e}")))?;
    let columns = map_columns(headers)?;

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let row_num = u32::try_from(idx)
            .map_err(|_| CliError::Input("too many rows".to_string()))?
            + 2;
        let record =
            record.map_err(|e| CliError::Input(format!("malformed CSV at row {row_num}: {e}")))?;

        if record.iter().all(str::is_empty) {
            continue;
        }
        rows.push(parse_row(row_num, &record, &columns));
    }

    tracing::info!(file = %path.display(), rows = rows.len(), "read import file");
    Ok(rows)
}

/// Normalizes a header cell to a column key.
///
/// Lowercases and folds spaces, dashes and dots into underscores, so
/// "SSH Host", "ssh-host" and "ssh.host" all address the same column.
fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' || c == '.' { '_' } else { c })
        .collect()
}

fn map_columns(headers: &csv::StringRecord) -> Result<HashMap<String, usize>, CliError> {
    let mut columns = HashMap::new();
    for (idx, header) in headers.iter().enumerate() {
        let key = normalize_header(header);
        if key.is_empty() {
            continue;
        }
        if !KNOWN_COLUMNS.contains(&key.as_str()) {
            tracing::warn!(column = %header, "ignoring unknown column");
            continue;
        }
        if columns.insert(key.clone(), idx).is_some() {
            return Err(CliError::Input(format!("duplicate column '{key}'")));
        }
    }

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !columns.contains_key(*c))
        .collect();
    if !missing.is_empty() {
        return Err(CliError::Input(format!(
            "missing required column(s): {}",
            missing.join(", ")
        )));
    }
    Ok(columns)
}

fn parse_row(
    row_num: u32,
    record: &csv::StringRecord,
    columns: &HashMap<String, usize>,
) -> CandidateRow {
    let cell = |name: &str| -> &str {
        columns
            .get(name)
            .and_then(|&idx| record.get(idx))
            .unwrap_or("")
            .trim()
    };
    let mut errors = Vec::new();

    let mut profile = ProfileInfo::new(cell("name"), cell("host"), 3306);
    profile.db.port = parse_port(row_num, "port", cell("port"), 3306, &mut errors);
    profile.db.user = cell("user").to_string();
    profile.db.password = SecretString::from(cell("password").to_string());

    let ssh = &mut profile.ssh_tunnel;
    ssh.enabled = parse_bool(row_num, "ssh_enabled", cell("ssh_enabled"), &mut errors);
    ssh.host = cell("ssh_host").to_string();
    ssh.port = parse_port(row_num, "ssh_port", cell("ssh_port"), 22, &mut errors);
    ssh.user = cell("ssh_user").to_string();
    ssh.password = SecretString::from(cell("ssh_password").to_string());
    let identity = cell("ssh_key");
    ssh.identity_file = if identity.is_empty() {
        cell("ssh_identity_file").to_string()
    } else {
        identity.to_string()
    };
    ssh.local_port = parse_port(row_num, "ssh_local_port", cell("ssh_local_port"), 0, &mut errors);

    let mut row = CandidateRow::new(row_num, profile);
    row.parse_errors = errors;
    row
}

fn parse_port(row: u32, column: &str, value: &str, default: u16, errors: &mut Vec<CellError>) -> u16 {
    if value.is_empty() {
        return default;
    }
    match value.parse::<u16>() {
        Ok(port) => port,
        Err(_) => {
            errors.push(CellError::new(
                row,
                column,
                format!("invalid port '{value}'"),
            ));
            default
        }
    }
}

fn parse_bool(row: u32, column: &str, value: &str, errors: &mut Vec<CellError>) -> bool {
    match value.to_lowercase().as_str() {
        "" | "false" | "no" | "0" => false,
        "true" | "yes" | "1" => true,
        other => {
            errors.push(CellError::new(
                row,
                column,
                format!("invalid boolean '{other}'"),
            ));
            false
        }
    }
}
