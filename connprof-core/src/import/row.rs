//! Row types flowing through the bulk import planner.
//!
//! A [`CandidateRow`] is one pre-parsed row of the import batch. Planning
//! turns every candidate into exactly one [`PlannedRow`] carrying a
//! [`Disposition`]: either an action to perform at commit time or a skip with
//! a recorded reason.

use serde::Serialize;

use crate::models::ProfileInfo;

/// A candidate profile row produced by an upstream parser.
#[derive(Debug, Clone, Default)]
pub struct CandidateRow {
    /// 1-based source row number; stable ordering key, unique in a batch.
    pub row_num: u32,
    /// Proposed profile name.
    pub name: String,
    /// The full profile fields; opaque to the planner beyond name checks.
    pub profile: ProfileInfo,
    /// Cell errors already attached by the upstream parser (malformed
    /// numbers, etc.). The validator carries these through.
    pub parse_errors: Vec<CellError>,
}

impl CandidateRow {
    /// Creates a candidate row from a parsed profile.
    #[must_use]
    pub fn new(row_num: u32, profile: ProfileInfo) -> Self {
        Self {
            row_num,
            name: profile.name.clone(),
            profile,
            parse_errors: Vec::new(),
        }
    }
}

/// A field-level validation failure attached to a row.
///
/// Ordering is `(row, column, message)`, which gives the deterministic
/// display order required for error reporting.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct CellError {
    /// 1-based source row number.
    pub row: u32,
    /// Column name the failure applies to.
    pub column: String,
    /// Human-readable failure message.
    pub message: String,
}

impl CellError {
    /// Creates a cell error.
    #[must_use]
    pub fn new(row: u32, column: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            row,
            column: column.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for CellError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {} [{}]: {}", self.row, self.column, self.message)
    }
}

/// Commit-time action for a non-skipped row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanAction {
    /// Write a new profile file.
    Create,
    /// Replace an existing profile file of the same name.
    Overwrite,
    /// Write under a generated name because the proposed name collided.
    Rename,
}

impl PlanAction {
    /// Returns the stable label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Overwrite => "overwrite",
            Self::Rename => "rename",
        }
    }
}

/// Reason a row was excluded from the plan.
///
/// Variant order is the fixed iteration order for grouped reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SkipReason {
    /// The row failed field validation.
    #[serde(rename = "invalid-row")]
    InvalidRow,
    /// The proposed name duplicates an earlier row in the same batch.
    #[serde(rename = "duplicate-name")]
    DuplicateName,
    /// The name exists in the store and policy forbids overwrite and rename.
    #[serde(rename = "conflict-skip")]
    ConflictSkip,
    /// The connectivity precheck failed for this row.
    #[serde(rename = "conn-test-failed")]
    ConnTestFailed,
    /// Planning was cancelled before this row's precheck finished.
    #[serde(rename = "cancelled")]
    Cancelled,
    /// No specific reason was recorded.
    #[serde(rename = "unknown")]
    Unknown,
}

impl SkipReason {
    /// All reasons, in fixed reporting order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::InvalidRow,
            Self::DuplicateName,
            Self::ConflictSkip,
            Self::ConnTestFailed,
            Self::Cancelled,
            Self::Unknown,
        ]
    }

    /// Returns the stable label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::InvalidRow => "invalid-row",
            Self::DuplicateName => "duplicate-name",
            Self::ConflictSkip => "conflict-skip",
            Self::ConnTestFailed => "conn-test-failed",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }
}

/// Final per-row outcome: exactly one of an action or a skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The row will be committed with this action.
    Act(PlanAction),
    /// The row is excluded for this reason.
    Skip(SkipReason),
}

/// One row of the finished import plan.
#[derive(Debug, Clone)]
pub struct PlannedRow {
    /// Provenance back to the source row.
    pub row_num: u32,
    /// Original proposed name.
    pub name: String,
    /// Final name to use; equals `name` unless renamed.
    pub planned_name: String,
    /// Set only when a rename occurred.
    pub renamed_from: Option<String>,
    /// The row's disposition.
    pub disposition: Disposition,
    /// The profile to write at commit time.
    pub profile: ProfileInfo,
}

impl PlannedRow {
    /// Creates a non-skipped row with the given action and planned name.
    #[must_use]
    pub fn planned(candidate: CandidateRow, action: PlanAction, planned_name: String) -> Self {
        let renamed_from = (action == PlanAction::Rename).then(|| candidate.name.clone());
        let mut profile = candidate.profile;
        profile.name = planned_name.clone();
        Self {
            row_num: candidate.row_num,
            name: candidate.name,
            planned_name,
            renamed_from,
            disposition: Disposition::Act(action),
            profile,
        }
    }

    /// Creates a skipped row.
    #[must_use]
    pub fn skipped(candidate: CandidateRow, reason: SkipReason) -> Self {
        Self {
            row_num: candidate.row_num,
            planned_name: candidate.name.clone(),
            name: candidate.name,
            renamed_from: None,
            disposition: Disposition::Skip(reason),
            profile: candidate.profile,
        }
    }

    /// Returns true if the row is excluded from the plan.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self.disposition, Disposition::Skip(_))
    }

    /// Returns the commit action, if the row is not skipped.
    #[must_use]
    pub const fn action(&self) -> Option<PlanAction> {
        match self.disposition {
            Disposition::Act(action) => Some(action),
            Disposition::Skip(_) => None,
        }
    }

    /// Returns the skip reason, if the row is skipped.
    #[must_use]
    pub const fn skip_reason(&self) -> Option<SkipReason> {
        match self.disposition {
            Disposition::Act(_) => None,
            Disposition::Skip(reason) => Some(reason),
        }
    }

    /// Overrides the disposition with a skip.
    ///
    /// Used by the connectivity precheck: a failed probe takes precedence
    /// over any previously computed action.
    pub fn mark_skipped(&mut self, reason: SkipReason) {
        self.disposition = Disposition::Skip(reason);
    }
}
