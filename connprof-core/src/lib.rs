//! `ConnProf` Core Library
//!
//! This crate provides the core functionality for the `ConnProf` database
//! connection profile manager: the profile data model, the file-backed
//! profile store, and the bulk import planner.
//!
//! # Crate Structure
//!
//! - [`models`] - Profile data structures (database endpoint, SSH tunnel)
//! - [`store`] - File-backed profile store (listing, load/save, plan commit)
//! - [`import`] - Bulk import planner (validation, conflict resolution,
//!   connectivity precheck, plan aggregation)
//! - [`error`] - Error types for all core domains
//!
//! The planner is a pure computation layer: it reads no ambient process
//! state, takes all configuration as arguments, and emits structured data
//! only. Secrets never appear in planner output.

// Enable missing_docs warning for public API documentation
#![warn(missing_docs)]

pub mod error;
pub mod import;
pub mod models;
pub mod store;

pub use error::{ConnProfError, PlanError, StoreError};
pub use import::{
    CandidateRow, CellError, ConflictPolicy, ConnectivityTester, ImportPlan, PlanAction,
    PlanOutcome, PlannedRow, SkipReason, ValidationRules,
};
pub use models::ProfileInfo;
pub use store::{CommitSummary, ProfileStore};
