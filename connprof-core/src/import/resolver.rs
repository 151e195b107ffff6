//! Name conflict resolution.
//!
//! Assigns every validated row a disposition against the existing store and
//! the rest of the batch. Processing is in ascending row-number order so the
//! outcome is independent of any upstream ordering instability: the row with
//! the smallest number holds the first claim on a name, later rows with the
//! same proposal are the ones renamed or skipped.
//!
//! Name comparison is case-insensitive; the planned name keeps the proposed
//! casing.

use std::collections::HashSet;

use crate::error::PlanError;

use super::row::{CandidateRow, PlanAction, PlannedRow, SkipReason};

/// Upper bound on rename suffix generation attempts per name.
pub const MAX_RENAME_ATTEMPTS: usize = 10_000;

/// Outcome policy for a name that already exists in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExistingConflict {
    /// Replace the stored profile.
    Overwrite,
    /// Import under a generated unique name.
    Rename,
    /// Leave the stored profile untouched and drop the row.
    #[default]
    Skip,
}

/// Outcome policy for a name already proposed by an earlier row in the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchDuplicate {
    /// Import the later row under a generated unique name.
    Rename,
    /// Drop the later row.
    #[default]
    Skip,
}

/// Per-collision-type conflict policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConflictPolicy {
    /// Applied when the proposed name exists in the target store.
    pub on_existing: ExistingConflict,
    /// Applied when an earlier row in the batch proposed the same name.
    pub on_batch_duplicate: BatchDuplicate,
}

/// Normalizes a name into its conflict key.
fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Generates a unique name by appending `_2`, `_3`, … to `base`.
///
/// Every candidate is re-tested against `taken` before acceptance; the loop
/// fails hard once the attempt budget is spent so a colliding plan can never
/// be produced silently.
fn auto_rename(base: &str, taken: &HashSet<String>) -> Result<String, PlanError> {
    let mut base = base.trim();
    if base.is_empty() {
        base = "profile";
    }

    for n in 2..2 + MAX_RENAME_ATTEMPTS {
        let candidate = format!("{base}_{n}");
        if !taken.contains(&name_key(&candidate)) {
            return Ok(candidate);
        }
    }

    Err(PlanError::RenameExhausted {
        name: base.to_string(),
        attempts: MAX_RENAME_ATTEMPTS,
    })
}

/// Resolves name conflicts for the validated rows of a batch.
///
/// `existing_names` is the profile-name set currently on disk. Every input
/// row maps to exactly one output row; non-skipped output rows carry planned
/// names that are pairwise distinct and, except for overwrites, disjoint
/// from `existing_names`.
pub fn resolve(
    mut rows: Vec<CandidateRow>,
    existing_names: &HashSet<String>,
    policy: ConflictPolicy,
) -> Result<Vec<PlannedRow>, PlanError> {
    rows.sort_by_key(|r| r.row_num);

    let existing: HashSet<String> = existing_names.iter().map(|n| name_key(n)).collect();
    // Names claimed so far: existing store plus every planned name in this
    // batch. Generated names are tested against this full set.
    let mut taken = existing.clone();
    // Names proposed by an earlier row, whatever that row's outcome was.
    // The first proposal holds the claim; later rows are batch duplicates.
    let mut proposed = HashSet::new();

    let mut planned = Vec::with_capacity(rows.len());

    for row in rows {
        let name = row.name.trim().to_string();
        let key = name_key(&name);

        let first_claim = proposed.insert(key.clone());
        let collides_in_batch = !first_claim || (taken.contains(&key) && !existing.contains(&key));

        let resolved = if collides_in_batch {
            match policy.on_batch_duplicate {
                BatchDuplicate::Rename => {
                    let new_name = auto_rename(&name, &taken)?;
                    tracing::debug!(row = row.row_num, from = %name, to = %new_name, "batch duplicate renamed");
                    taken.insert(name_key(&new_name));
                    PlannedRow::planned(row, PlanAction::Rename, new_name)
                }
                BatchDuplicate::Skip => {
                    tracing::debug!(row = row.row_num, name = %name, "batch duplicate skipped");
                    PlannedRow::skipped(row, SkipReason::DuplicateName)
                }
            }
        } else if existing.contains(&key) {
            match policy.on_existing {
                ExistingConflict::Overwrite => {
                    taken.insert(key);
                    PlannedRow::planned(row, PlanAction::Overwrite, name)
                }
                ExistingConflict::Rename => {
                    let new_name = auto_rename(&name, &taken)?;
                    tracing::debug!(row = row.row_num, from = %name, to = %new_name, "existing conflict renamed");
                    taken.insert(name_key(&new_name));
                    PlannedRow::planned(row, PlanAction::Rename, new_name)
                }
                ExistingConflict::Skip => {
                    tracing::debug!(row = row.row_num, name = %name, "existing conflict skipped");
                    PlannedRow::skipped(row, SkipReason::ConflictSkip)
                }
            }
        } else {
            taken.insert(key);
            PlannedRow::planned(row, PlanAction::Create, name)
        };

        planned.push(resolved);
    }

    Ok(planned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProfileInfo;

    fn candidate(row_num: u32, name: &str) -> CandidateRow {
        CandidateRow::new(row_num, ProfileInfo::new(name, "db.example.com", 3306))
    }

    fn existing(names: &[&str]) -> HashSet<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    fn rename_all() -> ConflictPolicy {
        ConflictPolicy {
            on_existing: ExistingConflict::Rename,
            on_batch_duplicate: BatchDuplicate::Rename,
        }
    }

    #[test]
    fn unique_names_become_creates() {
        let rows = vec![candidate(1, "alpha"), candidate(2, "beta")];
        let planned = resolve(rows, &existing(&[]), ConflictPolicy::default()).unwrap();
        assert!(planned.iter().all(|r| r.action() == Some(PlanAction::Create)));
        assert_eq!(planned[0].planned_name, "alpha");
        assert_eq!(planned[1].planned_name, "beta");
    }

    #[test]
    fn existing_name_renamed_and_batch_duplicate_renamed_distinctly() {
        // Spec scenario: store has prod-db; rows 1 and 2 both propose it.
        let rows = vec![
            candidate(1, "prod-db"),
            candidate(2, "prod-db"),
            candidate(3, "dev-db"),
        ];
        let planned = resolve(rows, &existing(&["prod-db"]), rename_all()).unwrap();

        assert_eq!(planned[0].action(), Some(PlanAction::Rename));
        assert_eq!(planned[0].planned_name, "prod-db_2");
        assert_eq!(planned[0].renamed_from.as_deref(), Some("prod-db"));

        assert_eq!(planned[1].action(), Some(PlanAction::Rename));
        assert_eq!(planned[1].planned_name, "prod-db_3");

        assert_eq!(planned[2].action(), Some(PlanAction::Create));
        assert_eq!(planned[2].planned_name, "dev-db");

        assert_eq!(planned.iter().filter(|r| !r.is_skipped()).count(), 3);
    }

    #[test]
    fn existing_skip_policy_with_batch_duplicate_skip() {
        let rows = vec![
            candidate(1, "prod-db"),
            candidate(2, "prod-db"),
            candidate(3, "dev-db"),
        ];
        let planned = resolve(rows, &existing(&["prod-db"]), ConflictPolicy::default()).unwrap();

        assert_eq!(planned[0].skip_reason(), Some(SkipReason::ConflictSkip));
        assert_eq!(planned[1].skip_reason(), Some(SkipReason::DuplicateName));
        assert_eq!(planned[2].action(), Some(PlanAction::Create));
    }

    #[test]
    fn batch_duplicate_renamed_even_when_first_row_was_skipped() {
        // The first proposal claims the name regardless of its own outcome.
        let policy = ConflictPolicy {
            on_existing: ExistingConflict::Skip,
            on_batch_duplicate: BatchDuplicate::Rename,
        };
        let rows = vec![candidate(1, "prod-db"), candidate(2, "prod-db")];
        let planned = resolve(rows, &existing(&["prod-db"]), policy).unwrap();

        assert_eq!(planned[0].skip_reason(), Some(SkipReason::ConflictSkip));
        assert_eq!(planned[1].action(), Some(PlanAction::Rename));
        assert_eq!(planned[1].planned_name, "prod-db_2");
    }

    #[test]
    fn overwrite_applies_only_to_store_names_not_batch_claims() {
        let policy = ConflictPolicy {
            on_existing: ExistingConflict::Overwrite,
            on_batch_duplicate: BatchDuplicate::Skip,
        };
        let rows = vec![candidate(1, "fresh"), candidate(2, "fresh")];
        let planned = resolve(rows, &existing(&[]), policy).unwrap();

        // Row 1 creates; row 2 collides with a batch claim, never overwrites.
        assert_eq!(planned[0].action(), Some(PlanAction::Create));
        assert_eq!(planned[1].skip_reason(), Some(SkipReason::DuplicateName));
    }

    #[test]
    fn overwrite_keeps_proposed_name() {
        let policy = ConflictPolicy {
            on_existing: ExistingConflict::Overwrite,
            on_batch_duplicate: BatchDuplicate::Skip,
        };
        let planned = resolve(vec![candidate(1, "prod-db")], &existing(&["prod-db"]), policy).unwrap();
        assert_eq!(planned[0].action(), Some(PlanAction::Overwrite));
        assert_eq!(planned[0].planned_name, "prod-db");
        assert!(planned[0].renamed_from.is_none());
    }

    #[test]
    fn tie_break_is_independent_of_input_order() {
        let forward = vec![candidate(1, "prod-db"), candidate(2, "prod-db")];
        let reversed = vec![candidate(2, "prod-db"), candidate(1, "prod-db")];

        let a = resolve(forward, &existing(&["prod-db"]), rename_all()).unwrap();
        let b = resolve(reversed, &existing(&["prod-db"]), rename_all()).unwrap();

        assert_eq!(a[0].row_num, b[0].row_num);
        assert_eq!(a[0].planned_name, b[0].planned_name);
        assert_eq!(a[1].planned_name, b[1].planned_name);
    }

    #[test]
    fn generated_name_skips_taken_suffixes() {
        let planned = resolve(
            vec![candidate(1, "prod-db")],
            &existing(&["prod-db", "prod-db_2", "prod-db_3"]),
            rename_all(),
        )
        .unwrap();
        assert_eq!(planned[0].planned_name, "prod-db_4");
    }

    #[test]
    fn collision_with_generated_name_is_a_batch_duplicate() {
        // Row 1 gets renamed to prod-db_2; row 2 proposes exactly that name.
        let rows = vec![candidate(1, "prod-db"), candidate(2, "prod-db_2")];
        let planned = resolve(rows, &existing(&["prod-db"]), rename_all()).unwrap();

        assert_eq!(planned[0].planned_name, "prod-db_2");
        assert_eq!(planned[1].action(), Some(PlanAction::Rename));
        assert_eq!(planned[1].planned_name, "prod-db_2_2");
    }

    #[test]
    fn conflicts_are_case_insensitive() {
        let planned = resolve(
            vec![candidate(1, "Prod-DB")],
            &existing(&["prod-db"]),
            ConflictPolicy::default(),
        )
        .unwrap();
        assert_eq!(planned[0].skip_reason(), Some(SkipReason::ConflictSkip));
    }

    #[test]
    fn rename_exhaustion_is_fatal() {
        let mut names: HashSet<String> = (2..2 + MAX_RENAME_ATTEMPTS)
            .map(|n| format!("prod-db_{n}"))
            .collect();
        names.insert("prod-db".to_string());

        let result = resolve(vec![candidate(1, "prod-db")], &names, rename_all());
        assert!(matches!(result, Err(PlanError::RenameExhausted { .. })));
    }

    #[test]
    fn planned_name_trims_whitespace() {
        let planned = resolve(
            vec![candidate(1, "  padded  ")],
            &existing(&[]),
            ConflictPolicy::default(),
        )
        .unwrap();
        assert_eq!(planned[0].planned_name, "padded");
    }
}
