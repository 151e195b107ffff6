//! Plan aggregation.
//!
//! [`ImportPlan`] is the planner's final output: rows grouped by disposition
//! with summary counts, ready for reporting and for the commit step. The
//! builder performs no decision-making; it only shapes the resolver's
//! output. Grouping is stable (ascending row number within each group) and
//! skip groups iterate in the fixed [`SkipReason`] order, so identical
//! inputs always render identically.

use std::collections::BTreeMap;

use super::row::{Disposition, PlanAction, PlannedRow, SkipReason};

/// A finished, immutable import plan.
#[derive(Debug, Default)]
pub struct ImportPlan {
    /// Rows that will create new profiles.
    pub create: Vec<PlannedRow>,
    /// Rows that will overwrite existing profiles.
    pub overwrite: Vec<PlannedRow>,
    /// Rows that will be written under a generated name.
    pub rename: Vec<PlannedRow>,
    /// Skipped rows grouped by reason, iterated in fixed reason order.
    pub skipped: BTreeMap<SkipReason, Vec<PlannedRow>>,
}

impl ImportPlan {
    /// Builds a plan from resolved rows.
    #[must_use]
    pub fn build(mut rows: Vec<PlannedRow>) -> Self {
        rows.sort_by_key(|r| r.row_num);

        let mut plan = Self::default();
        for row in rows {
            match row.disposition {
                Disposition::Act(PlanAction::Create) => plan.create.push(row),
                Disposition::Act(PlanAction::Overwrite) => plan.overwrite.push(row),
                Disposition::Act(PlanAction::Rename) => plan.rename.push(row),
                Disposition::Skip(reason) => {
                    plan.skipped.entry(reason).or_default().push(row);
                }
            }
        }
        plan
    }

    /// Number of rows that will be written at commit time.
    #[must_use]
    pub fn total_planned(&self) -> usize {
        self.create.len() + self.overwrite.len() + self.rename.len()
    }

    /// Number of skipped rows across all reasons.
    #[must_use]
    pub fn skip_count(&self) -> usize {
        self.skipped.values().map(Vec::len).sum()
    }

    /// Total number of rows in the plan.
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.total_planned() + self.skip_count()
    }

    /// Number of skipped rows for one reason.
    #[must_use]
    pub fn skip_count_for(&self, reason: SkipReason) -> usize {
        self.skipped.get(&reason).map_or(0, Vec::len)
    }

    /// All non-skipped rows in ascending row-number order.
    ///
    /// This is the sequence the commit step walks; it must treat these rows
    /// as authoritative and final.
    #[must_use]
    pub fn planned_rows(&self) -> Vec<&PlannedRow> {
        let mut rows: Vec<&PlannedRow> = self
            .create
            .iter()
            .chain(&self.overwrite)
            .chain(&self.rename)
            .collect();
        rows.sort_by_key(|r| r.row_num);
        rows
    }

    /// Rename mappings as `(row_num, from, to)`, in row order.
    #[must_use]
    pub fn rename_mappings(&self) -> Vec<(u32, &str, &str)> {
        self.rename
            .iter()
            .map(|r| {
                let from = r.renamed_from.as_deref().unwrap_or(r.name.as_str());
                (r.row_num, from, r.planned_name.as_str())
            })
            .collect()
    }

    /// Returns a one-line summary of the plan.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Create: {}, Overwrite: {}, Rename: {}, Skipped: {}",
            self.create.len(),
            self.overwrite.len(),
            self.rename.len(),
            self.skip_count()
        )
    }
}
