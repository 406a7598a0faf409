//! Roster use-case service.
//!
//! # Responsibility
//! - Provide stable add/find/list entry points for core callers.
//! - Delegate persistence to the roster repository.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::person::{Person, PersonDraft};
use crate::repo::roster_repo::RosterRepository;
use crate::repo::RepoResult;

/// Use-case service wrapper for roster operations.
pub struct RosterService<R: RosterRepository> {
    repo: R,
}

impl<R: RosterRepository> RosterService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new person.
    ///
    /// # Contract
    /// - Fails with `RepoError::Validation` when any field is empty.
    /// - Fails with `RepoError::Conflict` when `contact` or `external_id`
    ///   already exists; the roster is left unchanged.
    /// - Returns the persisted person including generated id and timestamp.
    pub fn add_person(
        &self,
        name: impl Into<String>,
        contact: impl Into<String>,
        external_id: impl Into<String>,
    ) -> RepoResult<Person> {
        let draft = PersonDraft::new(name, contact, external_id);
        self.repo.add(&draft)
    }

    /// Looks up one person by external identifier.
    pub fn find_by_external_id(&self, external_id: &str) -> RepoResult<Option<Person>> {
        self.repo.find_by_external_id(external_id)
    }

    /// Lists all persons sorted by name ascending.
    pub fn list_persons(&self) -> RepoResult<Vec<Person>> {
        self.repo.list()
    }
}
