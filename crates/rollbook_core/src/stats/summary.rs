//! Per-person attendance aggregation.
//!
//! # Responsibility
//! - Derive per-person counts and an attendance percentage from the ledger.
//! - Keep zero-record persons visible with explicit absent percentages.
//!
//! # Invariants
//! - Read-only: never mutates roster or ledger state.
//! - One SELECT per call, so results reflect a single consistent snapshot.
//! - Date-range predicates scope the joined records, never the person set.
//! - `attendance_percentage` is `None` when a person has no matching
//!   records; division by zero is undefined, not 0 or 100.

use crate::db::DbError;
use crate::repo::ledger_repo::date_to_db;
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type for summary APIs.
pub type SummaryResult<T> = Result<T, SummaryError>;

/// Aggregation-layer error for DB interaction and result decoding.
#[derive(Debug)]
pub enum SummaryError {
    Db(DbError),
    /// Transient storage failure; the caller may retry.
    Unavailable(DbError),
    InvalidData(String),
}

impl Display for SummaryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Unavailable(err) => write!(f, "storage unavailable: {err}"),
            Self::InvalidData(message) => write!(f, "invalid summary row: {message}"),
        }
    }
}

impl Error for SummaryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) | Self::Unavailable(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for SummaryError {
    fn from(value: DbError) -> Self {
        if value.is_transient() {
            Self::Unavailable(value)
        } else {
            Self::Db(value)
        }
    }
}

impl From<rusqlite::Error> for SummaryError {
    fn from(value: rusqlite::Error) -> Self {
        DbError::Sqlite(value).into()
    }
}

/// Scope options for the aggregation. No status dimension: a summary
/// covers all statuses at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryQuery {
    /// Restrict to one person by external identifier.
    pub external_id: Option<String>,
    /// Inclusive lower date bound on counted records.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper date bound on counted records.
    pub date_to: Option<NaiveDate>,
}

/// One aggregation row per roster entry.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonSummary {
    pub external_id: String,
    pub name: String,
    pub present_count: i64,
    pub absent_count: i64,
    pub late_count: i64,
    pub total_count: i64,
    /// `round(present / total * 100, 2)`; absent when `total_count == 0`.
    pub attendance_percentage: Option<f64>,
}

/// Aggregates attendance counts per person, ordered by name ascending.
///
/// Every roster entry appears exactly once; persons with no matching
/// records come back with zero counts and no percentage.
pub fn summarize(conn: &Connection, query: &SummaryQuery) -> SummaryResult<Vec<PersonSummary>> {
    let mut sql = String::from(
        "SELECT
            p.external_id AS external_id,
            p.name AS name,
            COUNT(r.id) AS total_count,
            COALESCE(SUM(CASE WHEN r.status = 'present' THEN 1 ELSE 0 END), 0) AS present_count,
            COALESCE(SUM(CASE WHEN r.status = 'absent' THEN 1 ELSE 0 END), 0) AS absent_count,
            COALESCE(SUM(CASE WHEN r.status = 'late' THEN 1 ELSE 0 END), 0) AS late_count
         FROM persons p
         LEFT JOIN attendance_records r
            ON r.person_uuid = p.uuid",
    );
    let mut bind_values: Vec<Value> = Vec::new();

    // Date bounds belong to the join condition: a person with no records in
    // range must still appear with zero counts.
    if let Some(date_from) = query.date_from {
        sql.push_str(" AND r.date >= ?");
        bind_values.push(Value::Text(date_to_db(date_from)));
    }
    if let Some(date_to) = query.date_to {
        sql.push_str(" AND r.date <= ?");
        bind_values.push(Value::Text(date_to_db(date_to)));
    }

    sql.push_str(" WHERE 1 = 1");
    if let Some(external_id) = query.external_id.as_ref() {
        sql.push_str(" AND p.external_id = ?");
        bind_values.push(Value::Text(external_id.clone()));
    }

    sql.push_str(" GROUP BY p.uuid ORDER BY p.name ASC, p.external_id ASC");

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut summaries = Vec::new();

    while let Some(row) = rows.next()? {
        summaries.push(parse_summary_row(row)?);
    }

    Ok(summaries)
}

fn parse_summary_row(row: &Row<'_>) -> SummaryResult<PersonSummary> {
    let present_count: i64 = row.get("present_count")?;
    let absent_count: i64 = row.get("absent_count")?;
    let late_count: i64 = row.get("late_count")?;
    let total_count: i64 = row.get("total_count")?;

    if present_count + absent_count + late_count != total_count {
        return Err(SummaryError::InvalidData(format!(
            "status counts {present_count}+{absent_count}+{late_count} do not sum to total {total_count}"
        )));
    }

    Ok(PersonSummary {
        external_id: row.get("external_id")?,
        name: row.get("name")?,
        present_count,
        absent_count,
        late_count,
        total_count,
        attendance_percentage: attendance_percentage(present_count, total_count),
    })
}

/// Percentage of `present` over `total`, rounded to two decimal places.
///
/// Returns `None` when `total` is zero so "not yet tracked" is never
/// misreported as 0% attendance.
pub fn attendance_percentage(present: i64, total: i64) -> Option<f64> {
    if total <= 0 {
        return None;
    }
    let raw = present as f64 / total as f64 * 100.0;
    Some((raw * 100.0).round() / 100.0)
}
