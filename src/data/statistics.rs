//! Column statistics engine
//!
//! Descriptive statistics per column, computed as a pure function of a
//! [`Table`]'s current rows. Callers recompute whenever the table changes;
//! nothing here caches.
//!
//! ## Numeric columns
//!
//! A column is numeric when strictly more than 80% of its non-null values
//! parse as finite numbers. The numeric summary (`min`, `max`, `mean`,
//! `median`, `std`) covers only the values that parse. `median` is the
//! upper median: the element at `floor(n / 2)` of the sorted values.

use crate::constants::{NUMERIC_RATIO_DEN, NUMERIC_RATIO_NUM};
use crate::data::infer_column_type;
use crate::types::{CellValue, ColumnType, Table};
use serde::{Deserialize, Serialize, Serializer};
use serde::ser::SerializeMap;
use std::collections::HashSet;

/// Statistics for a single column
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnStatistics {
    pub total_count: usize,
    pub non_null_count: usize,
    pub null_count: usize,
    pub unique_count: usize,
    pub is_numeric: bool,
    pub inferred_type: ColumnType,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericSummary>,
}

/// Summary over the numeric-parseable values of a column
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation
    pub std: f64,
}

impl NumericSummary {
    /// Summarize `values`. Returns `None` for an empty slice.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Some(Self {
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            mean,
            median: sorted[sorted.len() / 2],
            std: variance.sqrt(),
        })
    }
}

/// Upper median: element at `floor(n / 2)` in ascending order.
pub fn upper_median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(sorted[sorted.len() / 2])
}

/// Statistics for every column of a table, keyed by column name in column
/// order. Serializes as a JSON object.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableStatistics {
    columns: Vec<(String, ColumnStatistics)>,
}

impl TableStatistics {
    pub fn get(&self, column: &str) -> Option<&ColumnStatistics> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, stats)| stats)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnStatistics)> {
        self.columns.iter().map(|(name, stats)| (name.as_str(), stats))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Names of the numeric columns, in column order.
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, s)| s.is_numeric)
            .map(|(name, _)| name)
            .collect()
    }
}

impl Serialize for TableStatistics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, stats) in &self.columns {
            map.serialize_entry(name, stats)?;
        }
        map.end()
    }
}

/// Whether `numeric` out of `non_null` values crosses the 80% threshold.
pub fn crosses_numeric_threshold(numeric: usize, non_null: usize) -> bool {
    non_null > 0 && numeric * NUMERIC_RATIO_DEN > non_null * NUMERIC_RATIO_NUM
}

fn unique_key(value: &CellValue) -> (u8, String) {
    let tag = match value {
        CellValue::Null => 0,
        CellValue::Bool(_) => 1,
        CellValue::Number(_) => 2,
        CellValue::Text(_) => 3,
    };
    (tag, value.to_string())
}

/// Statistics for one column over the first `limit` rows.
fn column_statistics(table: &Table, column: &str, limit: usize) -> ColumnStatistics {
    let values: Vec<&CellValue> = table.column_values(column).take(limit).collect();
    let total_count = values.len();

    let present: Vec<&CellValue> = values.iter().copied().filter(|v| !v.is_blank()).collect();
    let non_null_count = present.len();

    let unique_count = present
        .iter()
        .map(|v| unique_key(v))
        .collect::<HashSet<_>>()
        .len();

    let numbers: Vec<f64> = present.iter().filter_map(|v| v.as_f64()).collect();
    let is_numeric = crosses_numeric_threshold(numbers.len(), non_null_count);

    ColumnStatistics {
        total_count,
        non_null_count,
        null_count: total_count - non_null_count,
        unique_count,
        is_numeric,
        inferred_type: infer_column_type(present.iter().copied()),
        numeric: if is_numeric {
            NumericSummary::from_values(&numbers)
        } else {
            None
        },
    }
}

/// Compute statistics for every column of `table`.
///
/// Pure function; an empty column list yields an empty result.
pub fn compute_statistics(table: &Table) -> TableStatistics {
    let limit = table.row_count();
    TableStatistics {
        columns: table
            .columns()
            .iter()
            .map(|c| (c.clone(), column_statistics(table, c, limit)))
            .collect(),
    }
}

/// Statistics over a bounded prefix of rows, with the counts needed to tell
/// "rows examined" apart from "rows in source".
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSummary {
    pub columns: TableStatistics,
    pub rows_examined: usize,
    pub source_row_count: usize,
}

impl StatisticsSummary {
    pub fn is_truncated(&self) -> bool {
        self.rows_examined < self.source_row_count
    }
}

/// Compute statistics over at most `cap` rows (all rows when `cap` is `None`).
pub fn compute_statistics_capped(table: &Table, cap: Option<usize>) -> StatisticsSummary {
    let source_row_count = table.row_count();
    let rows_examined = cap.map_or(source_row_count, |c| c.min(source_row_count));

    if rows_examined < source_row_count {
        tracing::debug!(
            rows_examined,
            source_row_count,
            "Statistics computed over a row prefix"
        );
    }

    StatisticsSummary {
        columns: TableStatistics {
            columns: table
                .columns()
                .iter()
                .map(|c| (c.clone(), column_statistics(table, c, rows_examined)))
                .collect(),
        },
        rows_examined,
        source_row_count,
    }
}
