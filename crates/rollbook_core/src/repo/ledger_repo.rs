//! Attendance ledger contract and SQLite implementation.
//!
//! # Responsibility
//! - Own the per-(person, date) upsert over `attendance_records`.
//! - Provide the filtered listing joined with roster display fields.
//!
//! # Invariants
//! - At most one record per (person, date); the upsert is one atomic
//!   conditional write, never an exists-check followed by insert.
//! - A repeated mark replaces `status`/`notes` and bumps `updated_at`
//!   in place; it never creates a second row.
//! - Listing order is date DESC, person name ASC, record id ASC.

use crate::model::person::PersonId;
use crate::model::record::{AttendanceRecord, AttendanceStatus};
use crate::repo::{ensure_schema_ready, RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

const RECORD_COLUMNS: &[&str] = &[
    "id",
    "person_uuid",
    "date",
    "status",
    "notes",
    "created_at",
    "updated_at",
];

/// Filter options for the ledger listing. All dimensions are independently
/// optional and combine conjunctively; date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerFilter {
    /// Restrict to one person by external identifier.
    pub external_id: Option<String>,
    /// Inclusive lower date bound.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub date_to: Option<NaiveDate>,
    /// Restrict to one status.
    pub status: Option<AttendanceStatus>,
}

/// Read model for the listing use-case: one record joined with the
/// owning person's display fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub record_id: i64,
    pub external_id: String,
    pub name: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
    pub updated_at: i64,
}

/// Repository interface for attendance ledger operations.
pub trait LedgerRepository {
    /// Upserts the status for `(person_id, date)` and returns post-write
    /// state. Safe to call repeatedly with identical input.
    fn upsert_mark(
        &self,
        person_id: PersonId,
        date: NaiveDate,
        status: AttendanceStatus,
        notes: Option<&str>,
    ) -> RepoResult<AttendanceRecord>;
    /// Lists records matching the filter, joined with person fields.
    fn list(&self, filter: &LedgerFilter) -> RepoResult<Vec<LedgerEntry>>;
}

/// SQLite-backed attendance ledger.
pub struct SqliteLedgerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLedgerRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(
            conn,
            &[
                ("attendance_records", RECORD_COLUMNS),
                ("persons", &["uuid", "external_id", "name"]),
            ],
        )?;
        Ok(Self { conn })
    }
}

impl LedgerRepository for SqliteLedgerRepository<'_> {
    fn upsert_mark(
        &self,
        person_id: PersonId,
        date: NaiveDate,
        status: AttendanceStatus,
        notes: Option<&str>,
    ) -> RepoResult<AttendanceRecord> {
        // Single conditional write: the unique (person_uuid, date) constraint
        // resolves concurrent same-key marks by letting one commit win.
        let mut stmt = self.conn.prepare(
            "INSERT INTO attendance_records (person_uuid, date, status, notes)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(person_uuid, date) DO UPDATE SET
                status = excluded.status,
                notes = excluded.notes,
                updated_at = (strftime('%s', 'now') * 1000)
             RETURNING id, person_uuid, date, status, notes, created_at, updated_at;",
        )?;

        let mut rows = stmt.query(params![
            person_id.to_string(),
            date_to_db(date),
            status.as_str(),
            notes,
        ])?;
        let row = rows.next()?.ok_or_else(|| {
            RepoError::InvalidData("upsert returned no row for attendance mark".to_string())
        })?;

        parse_record_row(row)
    }

    fn list(&self, filter: &LedgerFilter) -> RepoResult<Vec<LedgerEntry>> {
        let mut sql = String::from(
            "SELECT
                r.id AS id,
                p.external_id AS external_id,
                p.name AS name,
                r.date AS date,
                r.status AS status,
                r.notes AS notes,
                r.updated_at AS updated_at
             FROM attendance_records r
             INNER JOIN persons p ON p.uuid = r.person_uuid
             WHERE 1 = 1",
        );
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(external_id) = filter.external_id.as_ref() {
            sql.push_str(" AND p.external_id = ?");
            bind_values.push(Value::Text(external_id.clone()));
        }
        if let Some(date_from) = filter.date_from {
            sql.push_str(" AND r.date >= ?");
            bind_values.push(Value::Text(date_to_db(date_from)));
        }
        if let Some(date_to) = filter.date_to {
            sql.push_str(" AND r.date <= ?");
            bind_values.push(Value::Text(date_to_db(date_to)));
        }
        if let Some(status) = filter.status {
            sql.push_str(" AND r.status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }

        sql.push_str(" ORDER BY r.date DESC, p.name ASC, r.id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut entries = Vec::new();

        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }

        Ok(entries)
    }
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<AttendanceRecord> {
    let person_text: String = row.get("person_uuid")?;
    let person_id = Uuid::parse_str(&person_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid value `{person_text}` in attendance_records.person_uuid"
        ))
    })?;

    Ok(AttendanceRecord {
        id: row.get("id")?,
        person_id,
        date: parse_db_date(&row.get::<_, String>("date")?)?,
        status: parse_db_status(&row.get::<_, String>("status")?)?,
        notes: row.get("notes")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<LedgerEntry> {
    Ok(LedgerEntry {
        record_id: row.get("id")?,
        external_id: row.get("external_id")?,
        name: row.get("name")?,
        date: parse_db_date(&row.get::<_, String>("date")?)?,
        status: parse_db_status(&row.get::<_, String>("status")?)?,
        notes: row.get("notes")?,
        updated_at: row.get("updated_at")?,
    })
}

pub(crate) fn date_to_db(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn parse_db_date(value: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid date value `{value}` in attendance_records.date"
        ))
    })
}

fn parse_db_status(value: &str) -> RepoResult<AttendanceStatus> {
    AttendanceStatus::parse(value).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid status value `{value}` in attendance_records.status"
        ))
    })
}
