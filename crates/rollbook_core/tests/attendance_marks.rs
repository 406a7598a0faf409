use chrono::NaiveDate;
use rollbook_core::db::open_db_in_memory;
use rollbook_core::{
    AttendanceService, AttendanceServiceError, AttendanceStatus, LedgerFilter, RosterRepository,
    RosterService, SqliteLedgerRepository, SqliteRosterRepository,
};
use rusqlite::Connection;

fn date(value: &str) -> NaiveDate {
    value.parse().unwrap()
}

fn mark_request(
    external_id: &str,
    status: &str,
    day: Option<&str>,
    notes: Option<&str>,
) -> rollbook_core::MarkAttendanceRequest {
    rollbook_core::MarkAttendanceRequest {
        external_id: external_id.to_string(),
        status: status.to_string(),
        date: day.map(date),
        notes: notes.map(str::to_string),
    }
}

fn service(
    conn: &Connection,
) -> AttendanceService<SqliteRosterRepository<'_>, SqliteLedgerRepository<'_>> {
    AttendanceService::new(
        SqliteRosterRepository::try_new(conn).unwrap(),
        SqliteLedgerRepository::try_new(conn).unwrap(),
    )
}

fn register(conn: &Connection, name: &str, contact: &str, external_id: &str) {
    let roster = RosterService::new(SqliteRosterRepository::try_new(conn).unwrap());
    roster.add_person(name, contact, external_id).unwrap();
}

#[test]
fn mark_creates_record_with_given_date_and_notes() {
    let conn = open_db_in_memory().unwrap();
    register(&conn, "Ann", "ann@x.com", "S1");
    let service = service(&conn);

    let record = service
        .mark(&mark_request("S1", "present", Some("2025-03-01"), Some("on time")))
        .unwrap();

    assert_eq!(record.date, date("2025-03-01"));
    assert_eq!(record.status, AttendanceStatus::Present);
    assert_eq!(record.notes.as_deref(), Some("on time"));
    assert!(record.created_at > 0);
    assert_eq!(record.created_at, record.updated_at);
}

#[test]
fn repeated_mark_for_same_pair_updates_in_place() {
    let conn = open_db_in_memory().unwrap();
    register(&conn, "Ann", "ann@x.com", "S1");
    let service = service(&conn);

    let first = service
        .mark(&mark_request("S1", "present", Some("2025-03-01"), None))
        .unwrap();
    let second = service
        .mark(&mark_request("S1", "late", Some("2025-03-01"), Some("bus delay")))
        .unwrap();

    assert_eq!(second.id, first.id);
    assert_eq!(second.status, AttendanceStatus::Late);
    assert_eq!(second.notes.as_deref(), Some("bus delay"));
    assert_eq!(second.created_at, first.created_at);

    let rows = service.list_records(&LedgerFilter::default()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, AttendanceStatus::Late);
}

#[test]
fn mark_is_idempotent_for_identical_input() {
    let conn = open_db_in_memory().unwrap();
    register(&conn, "Ann", "ann@x.com", "S1");
    let service = service(&conn);

    let request = mark_request("S1", "absent", Some("2025-03-02"), Some("sick"));
    let first = service.mark(&request).unwrap();
    let second = service.mark(&request).unwrap();

    assert_eq!(second.id, first.id);
    assert_eq!(second.status, first.status);
    assert_eq!(second.notes, first.notes);
    assert_eq!(service.list_records(&LedgerFilter::default()).unwrap().len(), 1);
}

#[test]
fn mark_with_unknown_person_fails_and_creates_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service
        .mark(&mark_request("S9", "present", Some("2025-03-01"), None))
        .unwrap_err();
    assert!(matches!(err, AttendanceServiceError::PersonNotFound(id) if id == "S9"));

    assert!(service.list_records(&LedgerFilter::default()).unwrap().is_empty());
}

#[test]
fn mark_with_unknown_status_fails_before_storage() {
    let conn = open_db_in_memory().unwrap();
    register(&conn, "Ann", "ann@x.com", "S1");
    let service = service(&conn);

    let err = service
        .mark(&mark_request("S1", "excused", Some("2025-03-01"), None))
        .unwrap_err();
    assert!(matches!(err, AttendanceServiceError::UnknownStatus(value) if value == "excused"));

    assert!(service.list_records(&LedgerFilter::default()).unwrap().is_empty());
}

#[test]
fn empty_notes_are_stored_as_absent() {
    let conn = open_db_in_memory().unwrap();
    register(&conn, "Ann", "ann@x.com", "S1");
    let service = service(&conn);

    let record = service
        .mark(&mark_request("S1", "present", Some("2025-03-01"), Some("   ")))
        .unwrap();
    assert_eq!(record.notes, None);

    let overwritten = service
        .mark(&mark_request("S1", "present", Some("2025-03-01"), Some("")))
        .unwrap();
    assert_eq!(overwritten.notes, None);
}

#[test]
fn omitted_date_defaults_to_today() {
    let conn = open_db_in_memory().unwrap();
    register(&conn, "Ann", "ann@x.com", "S1");
    let service = service(&conn);

    let before = chrono::Local::now().date_naive();
    let record = service.mark(&mark_request("S1", "present", None, None)).unwrap();
    let after = chrono::Local::now().date_naive();

    assert!(record.date == before || record.date == after);
}

#[test]
fn resolving_person_binds_record_to_roster_entry() {
    let conn = open_db_in_memory().unwrap();
    register(&conn, "Ann", "ann@x.com", "S1");
    let service = service(&conn);

    let roster = SqliteRosterRepository::try_new(&conn).unwrap();
    let person = roster.find_by_external_id("S1").unwrap().unwrap();

    let record = service
        .mark(&mark_request("S1", "present", Some("2025-03-01"), None))
        .unwrap();
    assert_eq!(record.person_id, person.uuid);
}

#[test]
fn end_to_end_scenario_last_mark_wins() {
    let conn = open_db_in_memory().unwrap();
    register(&conn, "Ann", "ann@x.com", "S1");
    let service = service(&conn);

    service
        .mark(&mark_request("S1", "present", Some("2025-03-01"), None))
        .unwrap();
    service
        .mark(&mark_request("S1", "late", Some("2025-03-01"), None))
        .unwrap();

    let filter = LedgerFilter {
        external_id: Some("S1".to_string()),
        ..LedgerFilter::default()
    };
    let rows = service.list_records(&filter).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].date, date("2025-03-01"));
    assert_eq!(rows[0].status, AttendanceStatus::Late);
}
