//! Integration tests for the bulk import planner.
//!
//! Covers the end-to-end pipeline properties: determinism across input
//! orderings, the partition invariant, and idempotence of re-planning
//! against the planner's own output.

use std::collections::HashSet;

use connprof_core::import::{
    BatchDuplicate, CandidateRow, ConflictPolicy, ExistingConflict, PlanAction, ValidationRules,
    plan_import,
};
use connprof_core::models::ProfileInfo;
use secrecy::SecretString;

fn candidate(row_num: u32, name: &str) -> CandidateRow {
    let mut profile = ProfileInfo::new(name, "db.example.com", 3306);
    profile.db.user = "app".to_string();
    profile.db.password = SecretString::from("secret".to_string());
    CandidateRow::new(row_num, profile)
}

fn names(values: &[&str]) -> HashSet<String> {
    values.iter().map(|n| (*n).to_string()).collect()
}

fn rename_all() -> ConflictPolicy {
    ConflictPolicy {
        on_existing: ExistingConflict::Rename,
        on_batch_duplicate: BatchDuplicate::Rename,
    }
}

/// Renders the plan into comparable (row, name, planned, disposition) rows.
fn fingerprint(plan: &connprof_core::ImportPlan) -> Vec<String> {
    let mut out = Vec::new();
    for row in &plan.create {
        out.push(format!("{} create {}", row.row_num, row.planned_name));
    }
    for row in &plan.overwrite {
        out.push(format!("{} overwrite {}", row.row_num, row.planned_name));
    }
    for row in &plan.rename {
        out.push(format!(
            "{} rename {} -> {}",
            row.row_num,
            row.renamed_from.as_deref().unwrap_or(""),
            row.planned_name
        ));
    }
    for (reason, rows) in &plan.skipped {
        for row in rows {
            out.push(format!("{} skip {}", row.row_num, reason.label()));
        }
    }
    out
}

#[test]
fn plans_are_identical_regardless_of_input_order() {
    let batch = || {
        vec![
            candidate(2, "prod-db"),
            candidate(3, "prod-db"),
            candidate(4, "dev-db"),
            candidate(5, ""),
            candidate(6, "Prod-DB"),
        ]
    };
    let mut shuffled = batch();
    shuffled.reverse();
    shuffled.swap(0, 2);

    let existing = names(&["prod-db"]);
    let rules = ValidationRules::default();

    let a = plan_import(batch(), &existing, &rules, rename_all()).unwrap();
    let b = plan_import(shuffled, &existing, &rules, rename_all()).unwrap();

    assert_eq!(fingerprint(&a.plan), fingerprint(&b.plan));
    assert_eq!(a.errors, b.errors);
}

#[test]
fn every_candidate_maps_to_exactly_one_planned_row() {
    let batch = vec![
        candidate(2, "a"),
        candidate(3, "a"),
        candidate(4, "b"),
        candidate(5, ""),
    ];
    let outcome = plan_import(
        batch,
        &names(&["a", "b"]),
        &ValidationRules::default(),
        ConflictPolicy::default(),
    )
    .unwrap();

    assert_eq!(outcome.plan.total_rows(), 4);

    let mut row_nums: Vec<u32> = outcome
        .plan
        .planned_rows()
        .iter()
        .map(|r| r.row_num)
        .chain(
            outcome
                .plan
                .skipped
                .values()
                .flatten()
                .map(|r| r.row_num),
        )
        .collect();
    row_nums.sort_unstable();
    assert_eq!(row_nums, vec![2, 3, 4, 5]);
}

#[test]
fn replanning_created_output_never_creates_duplicates() {
    let batch = || vec![candidate(2, "alpha"), candidate(3, "beta"), candidate(4, "gamma")];

    let first = plan_import(
        batch(),
        &names(&[]),
        &ValidationRules::default(),
        ConflictPolicy::default(),
    )
    .unwrap();
    assert_eq!(first.plan.create.len(), 3);

    // Treat the planned names as the new store content.
    let new_existing: HashSet<String> = first
        .plan
        .planned_rows()
        .iter()
        .map(|r| r.planned_name.clone())
        .collect();

    let skip_policy = ConflictPolicy {
        on_existing: ExistingConflict::Skip,
        on_batch_duplicate: BatchDuplicate::Skip,
    };
    let rerun = plan_import(batch(), &new_existing, &ValidationRules::default(), skip_policy).unwrap();
    assert_eq!(rerun.plan.total_planned(), 0);
    assert_eq!(
        rerun.plan.skip_count_for(connprof_core::SkipReason::ConflictSkip),
        3
    );

    let overwrite_policy = ConflictPolicy {
        on_existing: ExistingConflict::Overwrite,
        on_batch_duplicate: BatchDuplicate::Skip,
    };
    let rerun = plan_import(
        batch(),
        &new_existing,
        &ValidationRules::default(),
        overwrite_policy,
    )
    .unwrap();
    assert_eq!(rerun.plan.overwrite.len(), 3);
    assert_eq!(rerun.plan.create.len(), 0);
}

#[test]
fn planned_names_stay_disjoint_from_store_except_overwrites() {
    let existing = names(&["a", "b", "c"]);
    let batch = vec![
        candidate(2, "a"),
        candidate(3, "b"),
        candidate(4, "d"),
    ];
    let policy = ConflictPolicy {
        on_existing: ExistingConflict::Rename,
        on_batch_duplicate: BatchDuplicate::Skip,
    };
    let outcome = plan_import(batch, &existing, &ValidationRules::default(), policy).unwrap();

    for row in outcome.plan.planned_rows() {
        if row.action() == Some(PlanAction::Overwrite) {
            continue;
        }
        assert!(
            !existing.contains(&row.planned_name),
            "{} collides with store",
            row.planned_name
        );
    }
}
