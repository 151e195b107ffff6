//! Plan report rendering.
//!
//! Formats a finished [`ImportPlan`] for review before commit, as a table or
//! as JSON. Output never contains secrets; only endpoint coordinates and
//! names appear.

use std::fmt::Write as _;

use connprof_core::import::{CellError, ImportPlan, PlannedRow};

use crate::error::CliError;

/// Formats the plan as human-readable tables.
#[must_use]
pub fn format_table(plan: &ImportPlan, errors: &[CellError]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Plan: {}", plan.summary());

    let planned = plan.planned_rows();
    if !planned.is_empty() {
        // Formatting width counts characters, so byte lengths would
        // misalign non-ASCII names.
        let name_width = planned
            .iter()
            .map(|r| r.planned_name.chars().count())
            .max()
            .unwrap_or(4)
            .max(4);
        let host_width = planned
            .iter()
            .map(|r| r.profile.db.host.chars().count())
            .max()
            .unwrap_or(4)
            .max(4);

        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "{:>4}  {:<9}  {:<name_width$}  {:<host_width$}  {:<5}",
            "ROW", "ACTION", "NAME", "HOST", "PORT"
        );
        let _ = writeln!(
            output,
            "{:->4}  {:-<9}  {:-<name_width$}  {:-<host_width$}  {:-<5}",
            "", "", "", "", ""
        );
        for row in &planned {
            let action = row.action().map_or("", |a| a.label());
            let _ = writeln!(
                output,
                "{:>4}  {:<9}  {:<name_width$}  {:<host_width$}  {:<5}",
                row.row_num, action, row.planned_name, row.profile.db.host, row.profile.db.port
            );
        }
    }

    let mappings = plan.rename_mappings();
    if !mappings.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "Renamed to avoid conflicts:");
        for (row_num, from, to) in mappings {
            let _ = writeln!(output, "  row {row_num}: {from} -> {to}");
        }
    }

    if plan.skip_count() > 0 {
        let _ = writeln!(output);
        let _ = writeln!(output, "Skipped rows:");
        for (reason, rows) in &plan.skipped {
            let _ = writeln!(output, "  {} ({}):", reason.label(), rows.len());
            for row in rows {
                let name = if row.name.is_empty() { "<unnamed>" } else { &row.name };
                let _ = writeln!(output, "    row {}: {}", row.row_num, name);
            }
        }
    }

    if !errors.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "Validation errors:");
        for error in errors {
            let _ = writeln!(output, "  {error}");
        }
    }

    output.trim_end().to_string()
}

/// Formats the plan as pretty-printed JSON.
pub fn format_json(plan: &ImportPlan, errors: &[CellError]) -> Result<String, CliError> {
    let report = PlanReport::from_plan(plan, errors);
    serde_json::to_string_pretty(&report)
        .map_err(|e| CliError::Config(format!("Failed to serialize to JSON: {e}")))
}

/// Machine-readable plan report. Passwords never appear here.
#[derive(Debug, serde::Serialize)]
struct PlanReport<'a> {
    summary: SummaryReport,
    rows: Vec<RowReport<'a>>,
    errors: &'a [CellError],
}

#[derive(Debug, serde::Serialize)]
struct SummaryReport {
    create: usize,
    overwrite: usize,
    rename: usize,
    skipped: usize,
    total: usize,
}

#[derive(Debug, serde::Serialize)]
struct RowReport<'a> {
    row: u32,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    skip_reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    planned_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    renamed_from: Option<&'a str>,
    host: &'a str,
    port: u16,
}

impl<'a> PlanReport<'a> {
    fn from_plan(plan: &'a ImportPlan, errors: &'a [CellError]) -> Self {
        let mut rows: Vec<RowReport<'a>> = plan
            .planned_rows()
            .into_iter()
            .chain(plan.skipped.values().flatten())
            .map(RowReport::from_row)
            .collect();
        rows.sort_by_key(|r| r.row);

        Self {
            summary: SummaryReport {
                create: plan.create.len(),
                overwrite: plan.overwrite.len(),
                rename: plan.rename.len(),
                skipped: plan.skip_count(),
                total: plan.total_rows(),
            },
            rows,
            errors,
        }
    }
}

impl<'a> RowReport<'a> {
    fn from_row(row: &'a PlannedRow) -> Self {
        Self {
            row: row.row_num,
            name: &row.name,
            action: row.action().map(|a| a.label()),
            skip_reason: row.skip_reason().map(|r| r.label()),
            planned_name: (!row.is_skipped()).then_some(row.planned_name.as_str()),
            renamed_from: row.renamed_from.as_deref(),
            host: &row.profile.db.host,
            port: row.profile.db.port,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connprof_core::import::{CandidateRow, PlanAction, SkipReason};
    use connprof_core::models::ProfileInfo;
    use secrecy::SecretString;

    fn plan() -> ImportPlan {
        let mut profile = ProfileInfo::new("prod-db", "db1.example.com", 3306);
        profile.db.password = SecretString::from("top-secret".to_string());
        let create = connprof_core::PlannedRow::planned(
            CandidateRow::new(2, profile),
            PlanAction::Create,
            "prod-db".to_string(),
        );
        let rename = connprof_core::PlannedRow::planned(
            CandidateRow::new(3, ProfileInfo::new("prod-db", "db2.example.com", 3306)),
            PlanAction::Rename,
            "prod-db_2".to_string(),
        );
        let skip = connprof_core::PlannedRow::skipped(
            CandidateRow::new(4, ProfileInfo::new("", "h", 3306)),
            SkipReason::InvalidRow,
        );
        ImportPlan::build(vec![create, rename, skip])
    }

    #[test]
    fn table_shows_summary_renames_and_skips() {
        let table = format_table(&plan(), &[]);
        assert!(table.contains("Create: 1, Overwrite: 0, Rename: 1, Skipped: 1"));
        assert!(table.contains("prod-db -> prod-db_2"));
        assert!(table.contains("invalid-row (1):"));
        assert!(table.contains("<unnamed>"));
    }

    #[test]
    fn table_aligns_non_ascii_names() {
        let short = connprof_core::PlannedRow::planned(
            CandidateRow::new(2, ProfileInfo::new("café-db", "h1", 3306)),
            PlanAction::Create,
            "café-db".to_string(),
        );
        let long = connprof_core::PlannedRow::planned(
            CandidateRow::new(3, ProfileInfo::new("a-much-longer-name", "h2", 3306)),
            PlanAction::Create,
            "a-much-longer-name".to_string(),
        );
        let table = format_table(&ImportPlan::build(vec![short, long]), &[]);

        fn char_col(line: &str, needle: &str) -> usize {
            let byte = line.find(needle).unwrap();
            line[..byte].chars().count()
        }
        let line_for = |needle: &str| {
            table
                .lines()
                .find(|l| l.contains(needle))
                .unwrap()
                .to_string()
        };
        assert_eq!(
            char_col(&line_for("h1"), "h1"),
            char_col(&line_for("h2"), "h2")
        );
    }

    #[test]
    fn table_lists_validation_errors() {
        let errors = vec![CellError::new(4, "name", "name is required")];
        let table = format_table(&plan(), &errors);
        assert!(table.contains("row 4 [name]: name is required"));
    }

    #[test]
    fn json_orders_rows_and_never_leaks_secrets() {
        let json = format_json(&plan(), &[]).unwrap();
        assert!(!json.contains("top-secret"));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["summary"]["total"], 3);
        let rows = value["rows"].as_array().unwrap();
        let row_nums: Vec<u64> = rows.iter().map(|r| r["row"].as_u64().unwrap()).collect();
        assert_eq!(row_nums, vec![2, 3, 4]);
        assert_eq!(rows[1]["renamed_from"], "prod-db");
        assert_eq!(rows[2]["skip_reason"], "invalid-row");
        assert!(rows[2].get("action").is_none());
    }
}
