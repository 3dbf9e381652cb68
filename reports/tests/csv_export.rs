use std::fs;

use reports::core::{ColumnSchema, Columns, DataType, Output, Row};
use reports::csv::{build_csv, CsvStore};
use reports::ReportError;

fn columns() -> Columns {
    Columns::new()
        .with(ColumnSchema::hidden("ID", "User ID", DataType::Integer))
        .with(ColumnSchema::new("username", "Username", DataType::UserLogin))
        .with(ColumnSchema::new("joined", "Date Joined", DataType::Date).visible_in(&[Output::Table]))
        .with(ColumnSchema::new("earned", "Earned Count", DataType::Integer))
}

fn rows(count: usize) -> Vec<Row> {
    (0..count)
        .map(|idx| {
            Row::new()
                .with("ID", idx)
                .with("username", format!("user{idx}"))
                .with("joined", "2023-01-01 00:00:00")
                .with("earned", idx * 2)
        })
        .collect()
}

#[test]
fn line_count_is_header_plus_rows() {
    for count in [1, 2, 7] {
        let csv = build_csv(&rows(count), &columns()).unwrap();
        assert_eq!(csv.split('\n').count(), count + 1);
    }
}

#[test]
fn restricted_columns_never_appear() {
    let csv = build_csv(&rows(3), &columns()).unwrap();
    let header = csv.split('\n').next().unwrap();
    assert_eq!(header, "Username,Earned Count");
    assert!(!csv.contains("2023-01-01"));
    assert!(!csv.contains("User ID"));
}

#[test]
fn save_is_idempotent_and_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvStore::new(dir.path().join("reports"), "https://example.org/reports");
    let name = "badgeos-report-active-users-report-2023_06_01";

    let first = store.save(&rows(4), &columns(), name).unwrap();
    let first_bytes = fs::read(&first).unwrap();
    let second = store.save(&rows(4), &columns(), name).unwrap();
    let second_bytes = fs::read(&second).unwrap();

    assert_eq!(first, second);
    assert_eq!(first_bytes, second_bytes);

    let expected = build_csv(&rows(4), &columns()).unwrap();
    assert_eq!(first_bytes, expected.as_bytes());

    let served = store.serve(name).unwrap();
    assert_eq!(served.body, expected.as_bytes());
    assert_eq!(served.filename, name);
}

#[test]
fn nothing_exists_before_first_save() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvStore::new(dir.path(), "");
    assert!(store.path("never").is_none());
    assert!(store.url("never").is_none());
    assert!(matches!(store.serve("never"), Err(ReportError::FileNotFound(_))));
}

#[test]
fn empty_input_yields_no_partial_csv() {
    assert!(matches!(build_csv(&[], &columns()), Err(ReportError::EmptyInput)));
    assert!(matches!(
        build_csv(&rows(2), &Columns::new()),
        Err(ReportError::EmptyInput)
    ));
}
