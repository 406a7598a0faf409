use rollbook_core::db::open_db_in_memory;
use rollbook_core::{PersonValidationError, RepoError, RosterService, SqliteRosterRepository};
use rusqlite::Connection;

#[test]
fn add_and_find_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRosterRepository::try_new(&conn).unwrap();
    let service = RosterService::new(repo);

    let added = service.add_person("Ann", "ann@x.com", "S1").unwrap();
    assert_eq!(added.name, "Ann");
    assert_eq!(added.contact, "ann@x.com");
    assert_eq!(added.external_id, "S1");
    assert!(added.created_at > 0);

    let found = service.find_by_external_id("S1").unwrap().unwrap();
    assert_eq!(found, added);

    assert!(service.find_by_external_id("S2").unwrap().is_none());
}

#[test]
fn duplicate_external_id_is_a_conflict_and_roster_is_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRosterRepository::try_new(&conn).unwrap();
    let service = RosterService::new(repo);

    service.add_person("Ann", "ann@x.com", "S1").unwrap();
    let err = service
        .add_person("Other Ann", "other@x.com", "S1")
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Conflict {
            field: "external_id"
        }
    ));

    assert_eq!(service.list_persons().unwrap().len(), 1);
}

#[test]
fn duplicate_contact_is_a_conflict_and_roster_is_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRosterRepository::try_new(&conn).unwrap();
    let service = RosterService::new(repo);

    service.add_person("Ann", "ann@x.com", "S1").unwrap();
    let err = service.add_person("Ben", "ann@x.com", "S2").unwrap_err();
    assert!(matches!(err, RepoError::Conflict { field: "contact" }));

    assert_eq!(service.list_persons().unwrap().len(), 1);
}

#[test]
fn empty_fields_are_rejected_before_any_write() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRosterRepository::try_new(&conn).unwrap();
    let service = RosterService::new(repo);

    let err = service.add_person("", "ann@x.com", "S1").unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(PersonValidationError::EmptyField { field: "name" })
    ));

    let err = service.add_person("Ann", "  ", "S1").unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(PersonValidationError::EmptyField { field: "contact" })
    ));

    assert!(service.list_persons().unwrap().is_empty());
}

#[test]
fn list_is_sorted_by_name_ascending() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRosterRepository::try_new(&conn).unwrap();
    let service = RosterService::new(repo);

    service.add_person("Cara", "cara@x.com", "S3").unwrap();
    service.add_person("Ann", "ann@x.com", "S1").unwrap();
    service.add_person("Ben", "ben@x.com", "S2").unwrap();

    let names: Vec<_> = service
        .list_persons()
        .unwrap()
        .into_iter()
        .map(|person| person.name)
        .collect();
    assert_eq!(names, vec!["Ann", "Ben", "Cara"]);
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteRosterRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE persons (
            uuid TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL
        );
        PRAGMA user_version = 999;",
    )
    .unwrap();

    let result = SqliteRosterRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "persons",
            column: "external_id"
        })
    ));
}
