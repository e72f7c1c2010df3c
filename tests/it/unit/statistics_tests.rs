//! Unit tests for the column statistics engine.

use crate::helpers::{people_table, TestTableBuilder};
use databoard::data::{compute_statistics, compute_statistics_capped};
use databoard::types::{CellValue, ColumnType};

fn mixed_column(numeric: usize, text: usize) -> databoard::Table {
    let values = (0..numeric)
        .map(|i| CellValue::from(i as f64))
        .chain((0..text).map(|i| CellValue::text(format!("label {}", i))));
    TestTableBuilder::new(&["v"]).rows_of(values).build()
}

#[test]
fn test_counts_add_up_for_every_column() {
    let table = people_table();
    let stats = compute_statistics(&table);

    assert_eq!(stats.len(), 3);
    for (name, column) in stats.iter() {
        assert_eq!(
            column.non_null_count + column.null_count,
            column.total_count,
            "column {}",
            name
        );
        assert_eq!(column.total_count, table.row_count());
    }
    assert_eq!(stats.get("city").map(|c| c.null_count), Some(1));
    assert_eq!(stats.get("city").map(|c| c.unique_count), Some(3));
}

#[test]
fn test_exactly_eighty_percent_is_not_numeric() {
    let stats = compute_statistics(&mixed_column(80, 20));
    assert!(!stats.get("v").unwrap().is_numeric);
    assert!(stats.get("v").unwrap().numeric.is_none());
}

#[test]
fn test_eighty_one_percent_is_numeric() {
    let stats = compute_statistics(&mixed_column(81, 19));
    let column = stats.get("v").unwrap();
    assert!(column.is_numeric);
    // Summary covers the parseable subset only
    let summary = column.numeric.unwrap();
    assert_eq!(summary.min, 0.0);
    assert_eq!(summary.max, 80.0);
}

#[test]
fn test_median_takes_upper_middle() {
    let table = TestTableBuilder::new(&["v"])
        .rows_of([4.0, 2.0, 1.0, 3.0].map(CellValue::from))
        .build();
    let summary = compute_statistics(&table).get("v").unwrap().numeric.unwrap();

    assert_eq!(summary.median, 3.0);
    assert_eq!(summary.mean, 2.5);
    assert!((summary.std - 1.25f64.sqrt()).abs() < 1e-12);
}

#[test]
fn test_numeric_text_counts_as_numeric() {
    let table = people_table();
    let stats = compute_statistics(&table);
    let age = stats.get("age").unwrap();

    // 4 of 5 parse: exactly 80%, so not numeric
    assert!(!age.is_numeric);
    assert_eq!(age.inferred_type, ColumnType::Text);
    assert_eq!(stats.numeric_columns(), Vec::<&str>::new());
}

#[test]
fn test_capped_statistics_report_truncation() {
    let table = mixed_column(10, 0);
    let summary = compute_statistics_capped(&table, Some(4));

    assert!(summary.is_truncated());
    assert_eq!(summary.rows_examined, 4);
    assert_eq!(summary.source_row_count, 10);
    assert_eq!(summary.columns.get("v").map(|c| c.total_count), Some(4));

    let full = compute_statistics_capped(&table, Some(100));
    assert!(!full.is_truncated());
    assert_eq!(full.columns, compute_statistics(&table));
}

#[test]
fn test_empty_table_has_zero_counts() {
    let table = TestTableBuilder::new(&["a"]).build();
    let stats = compute_statistics(&table);
    let a = stats.get("a").unwrap();
    assert_eq!((a.total_count, a.non_null_count, a.unique_count), (0, 0, 0));
    assert!(!a.is_numeric);
}
