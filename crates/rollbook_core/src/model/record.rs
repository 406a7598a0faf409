//! Attendance record domain model.
//!
//! # Responsibility
//! - Define the per-(person, date) status record and its closed status set.
//! - Normalize free-text notes before persistence.
//!
//! # Invariants
//! - `(person_id, date)` identifies at most one record.
//! - `status` is a closed enumeration; unknown values never reach storage.
//! - Empty or whitespace-only notes are stored as absent, not as `""`.

use crate::model::person::PersonId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Day status for one person. Closed set; anything else is invalid input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

impl AttendanceStatus {
    /// Parses a wire/storage value into the closed enumeration.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "present" => Some(Self::Present),
            "absent" => Some(Self::Absent),
            "late" => Some(Self::Late),
            _ => None,
        }
    }

    /// Canonical storage spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::Late => "late",
        }
    }
}

/// One day's status for one person, post-write state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Surrogate key; ever-increasing, used as deterministic tie-break.
    pub id: i64,
    /// Owning reference to the person, by stable id.
    pub person_id: PersonId,
    /// Calendar date, no time component.
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    /// Optional free text. `None` when the caller supplied nothing usable.
    pub notes: Option<String>,
    /// Creation timestamp in epoch milliseconds, set once.
    pub created_at: i64,
    /// Refreshed on every write to this record.
    pub updated_at: i64,
}

/// Normalizes caller-supplied notes: trims, maps empty to absent.
pub fn normalize_notes(notes: Option<&str>) -> Option<String> {
    let trimmed = notes?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
