//! Roster repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist and look up roster entries over the canonical `persons` table.
//! - Translate unique-constraint violations into field-level conflicts.
//!
//! # Invariants
//! - Write paths validate drafts before any SQL mutation.
//! - Duplicate `external_id` or `contact` surfaces as `RepoError::Conflict`
//!   and leaves the roster unchanged.
//! - Listing is ordered by name ascending with a stable tie-break.

use crate::model::person::{Person, PersonDraft, PersonId};
use crate::repo::{ensure_schema_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const PERSON_SELECT_SQL: &str = "SELECT
    uuid,
    external_id,
    name,
    contact,
    created_at
FROM persons";

const PERSON_COLUMNS: &[&str] = &["uuid", "external_id", "name", "contact", "created_at"];

/// Repository interface for roster operations.
///
/// No update or delete: persons are immutable once registered.
pub trait RosterRepository {
    /// Persists a new person and returns the stored row, including the
    /// generated id and creation timestamp.
    fn add(&self, draft: &PersonDraft) -> RepoResult<Person>;
    /// Looks up one person by external identifier.
    fn find_by_external_id(&self, external_id: &str) -> RepoResult<Option<Person>>;
    /// Returns all persons sorted by name ascending.
    fn list(&self) -> RepoResult<Vec<Person>>;
}

/// SQLite-backed roster repository.
pub struct SqliteRosterRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRosterRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, &[("persons", PERSON_COLUMNS)])?;
        Ok(Self { conn })
    }
}

impl RosterRepository for SqliteRosterRepository<'_> {
    fn add(&self, draft: &PersonDraft) -> RepoResult<Person> {
        draft.validate()?;

        let uuid: PersonId = Uuid::new_v4();
        let created_at: i64 = self
            .conn
            .query_row(
                "INSERT INTO persons (uuid, external_id, name, contact)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING created_at;",
                params![
                    uuid.to_string(),
                    draft.external_id.as_str(),
                    draft.name.as_str(),
                    draft.contact.as_str(),
                ],
                |row| row.get(0),
            )
            .map_err(map_insert_error)?;

        Ok(Person {
            uuid,
            external_id: draft.external_id.clone(),
            name: draft.name.clone(),
            contact: draft.contact.clone(),
            created_at,
        })
    }

    fn find_by_external_id(&self, external_id: &str) -> RepoResult<Option<Person>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PERSON_SELECT_SQL} WHERE external_id = ?1;"))?;

        let mut rows = stmt.query([external_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_person_row(row)?));
        }

        Ok(None)
    }

    fn list(&self) -> RepoResult<Vec<Person>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PERSON_SELECT_SQL} ORDER BY name ASC, external_id ASC;"
        ))?;

        let mut rows = stmt.query([])?;
        let mut persons = Vec::new();
        while let Some(row) = rows.next()? {
            persons.push(parse_person_row(row)?);
        }

        Ok(persons)
    }
}

fn parse_person_row(row: &Row<'_>) -> RepoResult<Person> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in persons.uuid"))
    })?;

    Ok(Person {
        uuid,
        external_id: row.get("external_id")?,
        name: row.get("name")?,
        contact: row.get("contact")?,
        created_at: row.get("created_at")?,
    })
}

fn map_insert_error(err: rusqlite::Error) -> RepoError {
    if let Some(field) = unique_conflict_field(&err) {
        return RepoError::Conflict { field };
    }
    err.into()
}

/// Maps a SQLite unique-violation message to the conflicting person field.
fn unique_conflict_field(err: &rusqlite::Error) -> Option<&'static str> {
    let rusqlite::Error::SqliteFailure(failure, Some(message)) = err else {
        return None;
    };
    if failure.code != rusqlite::ErrorCode::ConstraintViolation {
        return None;
    }
    if message.contains("persons.external_id") {
        Some("external_id")
    } else if message.contains("persons.contact") {
        Some("contact")
    } else {
        None
    }
}
