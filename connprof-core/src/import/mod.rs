//! Bulk profile import planner.
//!
//! Turns a batch of pre-parsed candidate rows into a deterministic,
//! human-reviewable [`ImportPlan`] before any write occurs. Planning runs in
//! four stages, each consuming the output of the one before it:
//!
//! 1. Row validation ([`validate`]) — field-level checks, complete defect
//!    list per row; invalid rows are skipped with `invalid-row`.
//! 2. Name conflict resolution ([`resolve`]) — assigns each valid row a
//!    create/overwrite/rename/skip disposition against the existing store
//!    and the rest of the batch, in ascending row-number order.
//! 3. Connectivity precheck ([`precheck`], optional) — probes each planned
//!    row's endpoint on a bounded worker pool; failures convert the row to
//!    `conn-test-failed`.
//! 4. Plan aggregation ([`ImportPlan::build`]) — stable grouping and counts.
//!
//! For fixed inputs the produced plan is byte-identical regardless of input
//! row order. The commit step treats the plan as authoritative; no conflict
//! decision is re-derived at write time.
//!
//! ```ignore
//! let outcome = import::plan_import(rows, &existing, &rules, policy)?;
//! println!("{}", outcome.plan.summary());
//! ```

mod plan;
mod precheck;
mod resolver;
mod row;
mod validate;

pub use plan::ImportPlan;
pub use precheck::{
    CancelHandle, ConnectivityTester, DEFAULT_PRECHECK_CONCURRENCY, DEFAULT_PRECHECK_TIMEOUT,
    PrecheckOptions, ProbeFailure, TcpConnectivityTester, precheck,
};
pub use resolver::{BatchDuplicate, ConflictPolicy, ExistingConflict, MAX_RENAME_ATTEMPTS, resolve};
pub use row::{CandidateRow, CellError, Disposition, PlanAction, PlannedRow, SkipReason};
pub use validate::{ValidationOutcome, ValidationRules, validate};

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::PlanError;

/// Result of a planning run: the plan plus the retained cell errors for
/// reporting.
#[derive(Debug)]
pub struct PlanOutcome {
    /// The finished plan.
    pub plan: ImportPlan,
    /// All validation errors, sorted by `(row, column, message)`.
    pub errors: Vec<CellError>,
}

/// Plans an import without a connectivity precheck.
///
/// Every input row maps to exactly one row of the returned plan.
pub fn plan_import(
    rows: Vec<CandidateRow>,
    existing_names: &HashSet<String>,
    rules: &ValidationRules,
    policy: ConflictPolicy,
) -> Result<PlanOutcome, PlanError> {
    let (planned, errors) = resolve_batch(rows, existing_names, rules, policy)?;
    Ok(PlanOutcome {
        plan: ImportPlan::build(planned),
        errors,
    })
}

/// Plans an import and runs the connectivity precheck on the eligible rows
/// before building the plan.
pub async fn plan_import_checked(
    rows: Vec<CandidateRow>,
    existing_names: &HashSet<String>,
    rules: &ValidationRules,
    policy: ConflictPolicy,
    tester: Arc<dyn ConnectivityTester>,
    options: &PrecheckOptions,
    cancel: Option<&CancelHandle>,
) -> Result<PlanOutcome, PlanError> {
    let (planned, errors) = resolve_batch(rows, existing_names, rules, policy)?;
    let planned = precheck(planned, tester, options, cancel).await;
    Ok(PlanOutcome {
        plan: ImportPlan::build(planned),
        errors,
    })
}

fn resolve_batch(
    rows: Vec<CandidateRow>,
    existing_names: &HashSet<String>,
    rules: &ValidationRules,
    policy: ConflictPolicy,
) -> Result<(Vec<PlannedRow>, Vec<CellError>), PlanError> {
    let total = rows.len();
    let outcome = validate(rows, rules);
    tracing::info!(
        total,
        valid = outcome.valid.len(),
        invalid = outcome.invalid.len(),
        "validated import batch"
    );

    let mut planned = resolve(outcome.valid, existing_names, policy)?;
    planned.extend(
        outcome
            .invalid
            .into_iter()
            .map(|row| PlannedRow::skipped(row, SkipReason::InvalidRow)),
    );

    Ok((planned, outcome.errors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProfileInfo;
    use secrecy::SecretString;

    fn candidate(row_num: u32, name: &str) -> CandidateRow {
        let mut profile = ProfileInfo::new(name, "db.example.com", 3306);
        profile.db.user = "app".to_string();
        profile.db.password = SecretString::from("secret".to_string());
        CandidateRow::new(row_num, profile)
    }

    fn existing(names: &[&str]) -> HashSet<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    #[test]
    fn invalid_rows_are_planned_as_invalid_row_skips() {
        let rows = vec![candidate(2, "good"), candidate(3, "")];
        let outcome = plan_import(
            rows,
            &existing(&[]),
            &ValidationRules::default(),
            ConflictPolicy::default(),
        )
        .unwrap();

        assert_eq!(outcome.plan.total_rows(), 2);
        assert_eq!(outcome.plan.create.len(), 1);
        assert_eq!(outcome.plan.skip_count_for(SkipReason::InvalidRow), 1);
        assert_eq!(outcome.errors.len(), 1);
    }

    #[test]
    fn spec_scenario_rename_policy() {
        // Store: {prod-db}; rows 1-2 propose prod-db, row 3 dev-db, row 4 empty.
        let rows = vec![
            candidate(1, "prod-db"),
            candidate(2, "prod-db"),
            candidate(3, "dev-db"),
            candidate(4, ""),
        ];
        let policy = ConflictPolicy {
            on_existing: ExistingConflict::Rename,
            on_batch_duplicate: BatchDuplicate::Rename,
        };
        let outcome = plan_import(
            rows,
            &existing(&["prod-db"]),
            &ValidationRules::default(),
            policy,
        )
        .unwrap();

        assert_eq!(outcome.plan.total_planned(), 3);
        assert_eq!(outcome.plan.rename.len(), 2);
        assert_eq!(outcome.plan.create.len(), 1);
        assert_eq!(outcome.plan.skip_count_for(SkipReason::InvalidRow), 1);

        let mappings = outcome.plan.rename_mappings();
        assert_eq!(mappings[0].0, 1);
        assert_eq!(mappings[1].0, 2);
        assert_ne!(mappings[0].2, mappings[1].2);
    }

    #[test]
    fn spec_scenario_skip_policy() {
        let rows = vec![
            candidate(1, "prod-db"),
            candidate(2, "prod-db"),
            candidate(3, "dev-db"),
        ];
        let policy = ConflictPolicy {
            on_existing: ExistingConflict::Skip,
            on_batch_duplicate: BatchDuplicate::Skip,
        };
        let outcome = plan_import(
            rows,
            &existing(&["prod-db"]),
            &ValidationRules::default(),
            policy,
        )
        .unwrap();

        assert_eq!(outcome.plan.skip_count_for(SkipReason::ConflictSkip), 1);
        assert_eq!(outcome.plan.skip_count_for(SkipReason::DuplicateName), 1);
        assert_eq!(outcome.plan.create.len(), 1);
        assert_eq!(outcome.plan.create[0].planned_name, "dev-db");
    }

    #[tokio::test]
    async fn checked_plan_applies_precheck_to_planned_rows_only() {
        struct RejectAll;

        #[async_trait::async_trait]
        impl ConnectivityTester for RejectAll {
            async fn test(&self, _profile: &ProfileInfo) -> Result<(), ProbeFailure> {
                Err(ProbeFailure::new("unreachable"))
            }
        }

        let rows = vec![candidate(2, "good"), candidate(3, "")];
        let outcome = plan_import_checked(
            rows,
            &existing(&[]),
            &ValidationRules::default(),
            ConflictPolicy::default(),
            Arc::new(RejectAll),
            &PrecheckOptions::default(),
            None,
        )
        .await
        .unwrap();

        assert_eq!(outcome.plan.total_planned(), 0);
        assert_eq!(outcome.plan.skip_count_for(SkipReason::ConnTestFailed), 1);
        assert_eq!(outcome.plan.skip_count_for(SkipReason::InvalidRow), 1);
    }
}
