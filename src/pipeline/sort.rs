//! Sort engine.

use crate::pipeline::config::SortOrder;
use crate::types::Record;

/// Stable sort by `sort_by`; `None` leaves the order untouched.
///
/// Ordering follows [`CellValue::compare`](crate::types::CellValue::compare):
/// null, then numbers, then text. Ties keep their input order in both
/// directions.
pub fn apply_sorting(mut rows: Vec<Record>, sort_by: Option<&str>, order: SortOrder) -> Vec<Record> {
    let Some(column) = sort_by else {
        return rows;
    };
    match order {
        SortOrder::Asc => rows.sort_by(|a, b| a.value(column).compare(b.value(column))),
        SortOrder::Desc => rows.sort_by(|a, b| b.value(column).compare(a.value(column))),
    }
    rows
}
