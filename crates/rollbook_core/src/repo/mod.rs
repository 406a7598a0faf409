//! Repository contracts and shared persistence error type.
//!
//! # Responsibility
//! - Define the error surface shared by roster and ledger repositories.
//! - Guard repositories against unmigrated or structurally broken schemas.
//!
//! # Invariants
//! - Transient storage failures (`busy`/`locked`/`cannot open`) surface as
//!   `Unavailable`, distinct from hard `Db` failures, so callers can retry.
//! - No error kind silently degrades into another.

use crate::db::{migrations::latest_version, DbError};
use crate::model::person::PersonValidationError;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod ledger_repo;
pub mod roster_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for roster and ledger persistence.
#[derive(Debug)]
pub enum RepoError {
    /// Caller-supplied input failed validation before any SQL ran.
    Validation(PersonValidationError),
    /// A unique constraint rejected the write; `field` names the duplicate.
    Conflict { field: &'static str },
    /// Hard storage failure.
    Db(DbError),
    /// Transient storage failure; the caller may retry.
    Unavailable(DbError),
    /// Persisted state does not decode into a valid domain value.
    InvalidData(String),
    /// Connection schema version is behind what this binary requires.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Conflict { field } => write!(f, "value for `{field}` already exists"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Unavailable(err) => write!(f, "storage unavailable: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} is behind required {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) | Self::Unavailable(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PersonValidationError> for RepoError {
    fn from(value: PersonValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        if value.is_transient() {
            Self::Unavailable(value)
        } else {
            Self::Db(value)
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        DbError::Sqlite(value).into()
    }
}

/// Verifies the connection has been migrated and carries the given tables
/// and columns. Repositories call this once at construction.
pub(crate) fn ensure_schema_ready(
    conn: &Connection,
    required: &[(&'static str, &[&'static str])],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for (table, columns) in required {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for column in *columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
