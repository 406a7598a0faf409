//! Person domain model.
//!
//! # Responsibility
//! - Define the canonical roster entry referenced by attendance records.
//! - Validate add-person input before any SQL mutation.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another person.
//! - `external_id` and `contact` are each globally unique; duplicates are a
//!   conflict at the storage boundary, never a silent overwrite.
//! - Persons are never deleted or mutated by this core.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a roster entry.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type PersonId = Uuid;

/// Canonical roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Stable surrogate key used by attendance records.
    pub uuid: PersonId,
    /// User-supplied identifier (e.g. roll number). Unique, immutable.
    pub external_id: String,
    /// Display name.
    pub name: String,
    /// Contact string (e.g. email). Unique.
    pub contact: String,
    /// Creation timestamp in epoch milliseconds, set once.
    pub created_at: i64,
}

/// Input for registering a new person, prior to persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonDraft {
    pub name: String,
    pub contact: String,
    pub external_id: String,
}

impl PersonDraft {
    pub fn new(
        name: impl Into<String>,
        contact: impl Into<String>,
        external_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            contact: contact.into(),
            external_id: external_id.into(),
        }
    }

    /// Rejects drafts with empty or whitespace-only required fields.
    pub fn validate(&self) -> Result<(), PersonValidationError> {
        for (field, value) in [
            ("name", self.name.as_str()),
            ("contact", self.contact.as_str()),
            ("external_id", self.external_id.as_str()),
        ] {
            if value.trim().is_empty() {
                return Err(PersonValidationError::EmptyField { field });
            }
        }
        Ok(())
    }
}

/// Validation error for person input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonValidationError {
    EmptyField { field: &'static str },
}

impl Display for PersonValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField { field } => write!(f, "required field `{field}` is empty"),
        }
    }
}

impl Error for PersonValidationError {}
