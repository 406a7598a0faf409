//! Core attendance data layer for Rollbook.
//! This crate is the single source of truth for business invariants:
//! roster uniqueness, the one-record-per-(person, date) ledger upsert,
//! and derived attendance percentages.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod stats;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::person::{Person, PersonDraft, PersonId, PersonValidationError};
pub use model::record::{normalize_notes, AttendanceRecord, AttendanceStatus};
pub use repo::ledger_repo::{
    LedgerEntry, LedgerFilter, LedgerRepository, SqliteLedgerRepository,
};
pub use repo::roster_repo::{RosterRepository, SqliteRosterRepository};
pub use repo::{RepoError, RepoResult};
pub use service::attendance_service::{
    AttendanceService, AttendanceServiceError, MarkAttendanceRequest,
};
pub use service::roster_service::RosterService;
pub use stats::summary::{
    summarize, PersonSummary, SummaryError, SummaryQuery, SummaryResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
