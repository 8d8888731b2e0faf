use std::fs;

use chrono::NaiveDate;
use rusqlite::Connection;

use super::*;
use crate::ledger::builders::ManpowerForm;
use crate::ledger::roster::Roster;
use crate::ledger::schema::{ACTIVITIES, ALERTS, EOD, MANPOWER};
use crate::ledger::session::LedgerSession;
use crate::model::{
    ActivityRecord, ActivityStatus, AlertRecord, EodKind, EodRecord, ManpowerRecord, Priority,
    Shift,
};

fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid test date")
}

fn sample_ledger() -> Ledger {
    Ledger {
        manpower: vec![
            ManpowerRecord {
                shift: Shift::ShiftA,
                person_count: 4,
                employee_names: vec!["A".to_string(), "B".to_string()],
            },
            ManpowerRecord {
                shift: Shift::General,
                person_count: 0,
                employee_names: Vec::new(),
            },
        ],
        activities: vec![ActivityRecord {
            name: "Module cleaning".to_string(),
            location: "Block 4, Row 12".to_string(),
            shift: Shift::ShiftB,
            person_count: 6,
            employee_names: vec!["Anil".to_string(), "Bhavna".to_string()],
            status: ActivityStatus::InProgress,
            priority: Some(Priority::Critical),
        }],
        alerts: vec![AlertRecord {
            activity_name: "Tracker Fault".to_string(),
            total_count: 33,
            rectified_count: 10,
            balance: 23,
        }],
        eod: vec![EodRecord {
            kind: EodKind::Alert,
            name: "Tracker Fault".to_string(),
            status: "Partially Rectified".to_string(),
            remarks: "motor replaced on T-14".to_string(),
            resolved_today: 10,
            balance_after: 23,
            recorded_at: "2026-10-16T17:30:00Z".to_string(),
        }],
    }
}

fn column_names(connection: &Connection, table: &str) -> Vec<String> {
    let mut statement = connection
        .prepare(&format!("PRAGMA table_info(\"{table}\")"))
        .expect("table_info should prepare");
    statement
        .query_map([], |row| row.get::<_, String>(1))
        .expect("table_info should run")
        .collect::<Result<Vec<_>, _>>()
        .expect("table_info rows")
}

#[test]
fn empty_ledger_round_trip_is_stable_and_writes_canonical_schema() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = LedgerStore::new(dir.path());
    let day = date("2026-10-16");

    let first = store.load(day);
    assert!(first.ledger.is_empty());
    assert!(first.notices.is_empty());

    store.save(day, &first.ledger).expect("save empty ledger");
    let reloaded = store.load(day);
    assert_eq!(reloaded.ledger, Ledger::default());
    assert!(reloaded.notices.is_empty());

    let connection = Connection::open(store.ledger_path(day)).expect("open saved ledger");
    for schema in [&MANPOWER, &ACTIVITIES, &ALERTS, &EOD] {
        let mut expected = vec!["row_id".to_string()];
        expected.extend(schema.columns.iter().map(|column| column.name.to_string()));
        assert_eq!(column_names(&connection, schema.name), expected);
    }
}

#[test]
fn save_then_load_returns_the_same_tables() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = LedgerStore::new(dir.path().join("nested"));
    let day = date("2026-10-16");
    let ledger = sample_ledger();

    store.save(day, &ledger).expect("save ledger");
    let loaded = store.load(day);

    assert!(loaded.notices.is_empty());
    assert_eq!(loaded.ledger, ledger);
}

#[test]
fn save_replaces_previous_contents_and_leaves_no_temp_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = LedgerStore::new(dir.path());
    let day = date("2026-10-16");

    store.save(day, &sample_ledger()).expect("first save");
    let mut smaller = sample_ledger();
    smaller.manpower.truncate(1);
    smaller.eod.clear();
    store.save(day, &smaller).expect("second save");

    assert_eq!(store.load(day).ledger, smaller);
    assert!(!store.temp_path(day).exists());

    let names = fs::read_dir(dir.path())
        .expect("read dir")
        .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["POD_2026-10-16.sqlite".to_string()]);
}

#[test]
fn dates_never_share_a_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = LedgerStore::new(dir.path());

    store
        .save(date("2026-10-15"), &sample_ledger())
        .expect("save first day");
    store
        .save(date("2026-10-16"), &Ledger::default())
        .expect("save second day");

    assert_eq!(store.load(date("2026-10-15")).ledger, sample_ledger());
    assert!(store.load(date("2026-10-16")).ledger.is_empty());
}

#[test]
fn load_rederives_alert_balance_from_stored_counts() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = LedgerStore::new(dir.path());
    let day = date("2026-10-16");

    let connection = Connection::open(store.ledger_path(day)).expect("create ledger");
    connection
        .execute_batch(
            "
            CREATE TABLE Alerts (activity_name TEXT, total_count INTEGER, rectified_count INTEGER, balance INTEGER);
            INSERT INTO Alerts VALUES ('Tracker Fault', 10, 12, 99);
            INSERT INTO Alerts VALUES ('SCB offline', 8, 3, 0);
            ",
        )
        .expect("seed alerts");
    drop(connection);

    let loaded = store.load(day);
    assert!(loaded.notices.is_empty());
    let alerts = &loaded.ledger.alerts;
    assert_eq!((alerts[0].rectified_count, alerts[0].balance), (10, 0));
    assert_eq!((alerts[1].rectified_count, alerts[1].balance), (3, 5));
}

#[test]
fn load_backfills_columns_missing_from_older_files() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = LedgerStore::new(dir.path());
    let day = date("2026-10-16");

    let connection = Connection::open(store.ledger_path(day)).expect("create ledger");
    connection
        .execute_batch(
            "
            CREATE TABLE Manpower (shift TEXT, person_count INTEGER);
            INSERT INTO Manpower VALUES ('Shift A (06:30-15:00)', 5);
            CREATE TABLE Activities (name TEXT, location TEXT, shift TEXT);
            INSERT INTO Activities VALUES ('Inverter PM', NULL, 'General');
            CREATE TABLE Alerts (activity_name TEXT, total_count INTEGER);
            INSERT INTO Alerts VALUES ('Tracker Fault', 7);
            ",
        )
        .expect("seed legacy tables");
    drop(connection);

    let loaded = store.load(day);
    assert!(loaded.notices.is_empty());

    let ledger = loaded.ledger;
    assert_eq!(
        ledger.manpower,
        vec![ManpowerRecord {
            shift: Shift::ShiftA,
            person_count: 5,
            employee_names: Vec::new(),
        }]
    );
    assert_eq!(
        ledger.activities,
        vec![ActivityRecord {
            name: "Inverter PM".to_string(),
            location: String::new(),
            shift: Shift::General,
            person_count: 0,
            employee_names: Vec::new(),
            status: ActivityStatus::Planned,
            priority: None,
        }]
    );
    assert_eq!(
        ledger.alerts,
        vec![AlertRecord {
            activity_name: "Tracker Fault".to_string(),
            total_count: 7,
            rectified_count: 0,
            balance: 7,
        }]
    );
    assert!(ledger.eod.is_empty());
}

#[test]
fn corrupt_file_loads_as_empty_ledger_with_notice() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = LedgerStore::new(dir.path());
    let day = date("2026-10-16");
    fs::write(store.ledger_path(day), b"this is not a sqlite database at all").expect("write");

    let loaded = store.load(day);

    assert!(loaded.ledger.is_empty());
    assert_eq!(loaded.notices.len(), 1);
}

#[test]
fn corrupt_row_empties_only_its_table() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = LedgerStore::new(dir.path());
    let day = date("2026-10-16");
    store.save(day, &sample_ledger()).expect("save ledger");

    let connection = Connection::open(store.ledger_path(day)).expect("open ledger");
    connection
        .execute("UPDATE Manpower SET person_count = -3", [])
        .expect("corrupt manpower");
    drop(connection);

    let loaded = store.load(day);

    assert_eq!(loaded.notices.len(), 1);
    assert!(loaded.ledger.manpower.is_empty());
    assert_eq!(loaded.ledger.activities, sample_ledger().activities);
    assert_eq!(loaded.ledger.alerts, sample_ledger().alerts);
    assert_eq!(loaded.ledger.eod, sample_ledger().eod);
}

#[test]
fn ledger_stamped_with_another_date_is_not_trusted() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = LedgerStore::new(dir.path());
    let stamped = date("2026-10-15");
    let requested = date("2026-10-16");

    store.save(stamped, &sample_ledger()).expect("save ledger");
    fs::copy(store.ledger_path(stamped), store.ledger_path(requested)).expect("copy ledger");

    let loaded = store.load(requested);

    assert!(loaded.ledger.is_empty());
    assert!(matches!(
        loaded.notices.as_slice(),
        [StorageError::ForeignLedger { found, expected, .. }]
            if *found == stamped && *expected == requested
    ));
}

#[test]
fn roster_names_containing_commas_survive_a_reload() {
    let dir = tempfile::tempdir().expect("temp dir");
    let day = date("2026-10-16");
    let roster = Roster::new(vec!["Sharma, Ravi".to_string(), "Asha".to_string()]);

    let mut session = LedgerSession::open(LedgerStore::new(dir.path()), day, roster.clone());
    let saved = session
        .add_manpower(&ManpowerForm {
            shift: "ShiftA".to_string(),
            person_count: 2,
            names_text: "Dev".to_string(),
            selected_names: vec!["Sharma, Ravi".to_string()],
        })
        .expect("add manpower")
        .clone();
    assert_eq!(saved.employee_names, vec!["Sharma, Ravi", "Dev"]);

    let reopened = LedgerSession::open(LedgerStore::new(dir.path()), day, roster);
    assert!(reopened.notices().is_empty());
    assert_eq!(reopened.snapshot().manpower, vec![saved]);
}

#[test]
fn comma_joined_names_from_older_files_still_load() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = LedgerStore::new(dir.path());
    let day = date("2026-10-16");

    let connection = Connection::open(store.ledger_path(day)).expect("create ledger");
    connection
        .execute_batch(
            "
            CREATE TABLE Manpower (shift TEXT, person_count INTEGER, employee_names TEXT);
            INSERT INTO Manpower VALUES ('ShiftB', 3, 'Anil, Bhavna,  ,Anil');
            ",
        )
        .expect("seed legacy tables");
    drop(connection);

    let loaded = store.load(day);
    assert!(loaded.notices.is_empty());
    assert_eq!(loaded.ledger.manpower[0].employee_names, vec!["Anil", "Bhavna"]);
}
