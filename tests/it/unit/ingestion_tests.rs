//! Unit tests for ingestion adapters and export.

use databoard::data::{parse_csv_content, parse_csv_file, parse_json_content, DataError};
use databoard::export::{table_to_csv, table_to_json};
use databoard::types::{CellValue, ColumnType, SourceFormat, Table};
use std::io::Write;

#[test]
fn test_csv_types_columns() {
    let table = parse_csv_content("name,age,active\nAlice,30,yes\nBob,,no", ',').unwrap();

    assert_eq!(table.columns(), ["name", "age", "active"]);
    assert_eq!(table.rows()[0].value("age"), &CellValue::Number(30.0));
    assert_eq!(table.rows()[1].value("age"), &CellValue::Null);
    assert_eq!(table.rows()[1].value("active"), &CellValue::Bool(false));

    let types: Vec<ColumnType> = table.column_types().into_iter().map(|(_, t)| t).collect();
    assert_eq!(types, vec![ColumnType::Text, ColumnType::Number, ColumnType::Boolean]);
}

#[test]
fn test_csv_export_reparses_to_same_table() {
    let source = "city,note\n\"Paris, FR\",\"said \"\"hi\"\"\"\nRome,plain";
    let table = parse_csv_content(source, ',').unwrap();
    let exported = table_to_csv(&table, ',');

    assert_eq!(exported, source);
    assert_eq!(parse_csv_content(&exported, ',').unwrap(), table);
}

#[test]
fn test_csv_file_records_source_meta() {
    let mut file = tempfile::Builder::new().suffix(".tsv").tempfile().unwrap();
    write!(file, "a\tb\n1\t2\n").unwrap();

    let table = parse_csv_file(file.path()).unwrap();
    let meta = table.source_meta().unwrap();
    assert_eq!(meta.format, SourceFormat::Tsv);
    assert!(meta.ingested_at.is_some());
    assert_eq!(table.columns(), ["a", "b"]);
}

#[test]
fn test_empty_csv_is_an_error() {
    assert!(matches!(parse_csv_content("", ','), Err(DataError::EmptyFile)));
}

#[test]
fn test_json_keeps_key_order() {
    let table = parse_json_content(r#"{"items": [{"z": 1, "a": "x", "m": null}]}"#).unwrap();
    assert_eq!(table.columns(), ["z", "a", "m"]);
    assert_eq!(table.rows()[0].value("m"), &CellValue::Null);
}

#[test]
fn test_json_rejects_non_object_rows() {
    let err = parse_json_content(r#"[{"a": 1}, 2]"#).unwrap_err();
    assert!(matches!(err, DataError::RowNotObject { index: 1 }));
}

#[test]
fn test_json_rejects_mismatched_first_row() {
    let json = r#"{"columns": ["a", "b"], "rows": [{"a": 1}]}"#;
    assert!(serde_json::from_str::<Table>(json).is_err());
}

#[test]
fn test_table_json_export_round_trips() {
    let table = parse_json_content(r#"[{"k": "v", "n": 2}]"#).unwrap();
    let value = table_to_json(&table);
    let back: Table = serde_json::from_value(value).unwrap();
    assert_eq!(back, table);
}
