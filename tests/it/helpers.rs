//! Test helpers and builders for reducing boilerplate in tests.
//!
//! This module provides:
//! - `TestTableBuilder` - Builder pattern for creating test tables
//! - Small accessors for reading pipeline output

use databoard::types::{CellValue, Record, Table};

// ============================================================================
// TestTableBuilder - Builder pattern for creating test tables
// ============================================================================

/// Builder for creating test tables column-first.
///
/// # Example
/// ```ignore
/// let table = TestTableBuilder::new(&["cat", "val"])
///     .row(vec!["A".into(), 10.0.into()])
///     .row(vec!["B".into(), 5.0.into()])
///     .build();
/// ```
pub struct TestTableBuilder {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl TestTableBuilder {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Add a row; missing trailing cells become null.
    pub fn row(mut self, cells: Vec<CellValue>) -> Self {
        self.rows.push(cells);
        self
    }

    /// Add one row per value for a single-column table.
    pub fn rows_of(mut self, values: impl IntoIterator<Item = CellValue>) -> Self {
        for value in values {
            self.rows.push(vec![value]);
        }
        self
    }

    pub fn build(self) -> Table {
        let rows: Vec<Record> = self
            .rows
            .into_iter()
            .map(|cells| {
                let mut cells = cells.into_iter();
                self.columns
                    .iter()
                    .map(|c| (c.clone(), cells.next().unwrap_or_default()))
                    .collect()
            })
            .collect();
        Table::new(self.columns, rows).expect("test table should be valid")
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// `[{cat:"A",val:10},{cat:"A",val:20},{cat:"B",val:5}]`
pub fn sales_table() -> Table {
    TestTableBuilder::new(&["cat", "val"])
        .row(vec!["A".into(), 10.0.into()])
        .row(vec!["A".into(), 20.0.into()])
        .row(vec!["B".into(), 5.0.into()])
        .build()
}

/// Five people with mixed-quality ages
pub fn people_table() -> Table {
    TestTableBuilder::new(&["name", "age", "city"])
        .row(vec!["Alice".into(), "30".into(), "Berlin".into()])
        .row(vec!["Bob".into(), "abc".into(), "Paris".into()])
        .row(vec!["Carol".into(), "41".into(), "Berlin".into()])
        .row(vec!["Dave".into(), "25".into(), CellValue::Null])
        .row(vec!["Eve".into(), "35".into(), "Rome".into()])
        .build()
}

/// Display strings of `column` for every row.
pub fn column_strings(table: &Table, column: &str) -> Vec<String> {
    table.column_values(column).map(|v| v.to_string()).collect()
}
