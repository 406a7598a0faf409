//! Attendance use-case service.
//!
//! # Responsibility
//! - Resolve mark requests through the roster before touching the ledger.
//! - Apply the mark contract: status parsing, date defaulting, notes
//!   normalization.
//!
//! # Invariants
//! - A mark against an unknown `external_id` fails with `PersonNotFound`
//!   and creates no record.
//! - An unrecognized status fails before any storage access.
//! - Date defaults to today on the caller's local clock when omitted.

use crate::model::record::{normalize_notes, AttendanceRecord, AttendanceStatus};
use crate::repo::ledger_repo::{LedgerEntry, LedgerFilter, LedgerRepository};
use crate::repo::roster_repo::RosterRepository;
use crate::repo::RepoError;
use chrono::{Local, NaiveDate};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for attendance use-cases.
#[derive(Debug)]
pub enum AttendanceServiceError {
    /// Mark references an external id with no roster entry.
    PersonNotFound(String),
    /// Status value outside the closed `present|absent|late` set.
    UnknownStatus(String),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for AttendanceServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PersonNotFound(external_id) => {
                write!(f, "person not found: `{external_id}`")
            }
            Self::UnknownStatus(value) => {
                write!(f, "unknown status `{value}`; expected present|absent|late")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AttendanceServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AttendanceServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Request model for marking one person's status on one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkAttendanceRequest {
    /// Roster external identifier of the person being marked.
    pub external_id: String,
    /// Raw status value; must parse into the closed enumeration.
    pub status: String,
    /// Calendar date; defaults to today when `None`.
    pub date: Option<NaiveDate>,
    /// Optional free text; empty strings are treated as absent.
    pub notes: Option<String>,
}

/// Attendance service facade over roster and ledger repositories.
pub struct AttendanceService<R: RosterRepository, L: LedgerRepository> {
    roster: R,
    ledger: L,
}

impl<R: RosterRepository, L: LedgerRepository> AttendanceService<R, L> {
    /// Creates a service using the provided repository implementations.
    pub fn new(roster: R, ledger: L) -> Self {
        Self { roster, ledger }
    }

    /// Marks one person's status for one date.
    ///
    /// # Contract
    /// - Resolves `external_id` through the roster; `PersonNotFound` when
    ///   absent.
    /// - Upserts keyed on (person, date): repeated marks for the same pair
    ///   replace status/notes and bump `updated_at`, never duplicate.
    /// - Returns post-write state.
    pub fn mark(
        &self,
        request: &MarkAttendanceRequest,
    ) -> Result<AttendanceRecord, AttendanceServiceError> {
        let status = AttendanceStatus::parse(&request.status)
            .ok_or_else(|| AttendanceServiceError::UnknownStatus(request.status.clone()))?;

        let person = self
            .roster
            .find_by_external_id(&request.external_id)?
            .ok_or_else(|| AttendanceServiceError::PersonNotFound(request.external_id.clone()))?;

        let date = request.date.unwrap_or_else(today);
        let notes = normalize_notes(request.notes.as_deref());

        let record = self
            .ledger
            .upsert_mark(person.uuid, date, status, notes.as_deref())?;

        // Metadata only: roster identifiers and dates stay out of log lines.
        info!(
            "event=attendance_mark module=service status=ok value={}",
            record.status.as_str()
        );

        Ok(record)
    }

    /// Lists ledger records matching the filter, joined with person fields.
    ///
    /// Ordering: date DESC, person name ASC, record id ASC.
    pub fn list_records(
        &self,
        filter: &LedgerFilter,
    ) -> Result<Vec<LedgerEntry>, AttendanceServiceError> {
        Ok(self.ledger.list(filter)?)
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
