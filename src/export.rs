//! Export of tables and dashboard state as plain text formats.
//!
//! Byte formats (PDF, PNG, spreadsheets) belong to the export collaborator;
//! this module only provides what it consumes: CSV text and JSON values.

use crate::charts::Dashboard;
use crate::pipeline::PipelineConfig;
use crate::types::Table;
use serde::Serialize;

/// Render `table` as CSV, header first, rows in column order.
///
/// Fields containing the delimiter, quotes or line breaks are quoted with
/// internal quotes doubled. Null cells are empty fields.
pub fn table_to_csv(table: &Table, delimiter: char) -> String {
    let separator = delimiter.to_string();
    let mut lines = Vec::with_capacity(table.row_count() + 1);

    let headers: Vec<String> = table
        .columns()
        .iter()
        .map(|name| quote_csv_field(name, delimiter))
        .collect();
    lines.push(headers.join(&separator));

    for row in table.rows() {
        let cells: Vec<String> = table
            .columns()
            .iter()
            .map(|name| quote_csv_field(&row.value(name).to_string(), delimiter))
            .collect();
        lines.push(cells.join(&separator));
    }

    lines.join("\n")
}

fn quote_csv_field(value: &str, delimiter: char) -> String {
    let needs_quoting = value.contains(delimiter)
        || value.contains('"')
        || value.contains('\n')
        || value.contains('\r');

    if needs_quoting {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// `{ "columns": [..], "rows": [..] }`
pub fn table_to_json(table: &Table) -> serde_json::Value {
    serde_json::json!({
        "columns": table.columns(),
        "rows": table.rows(),
    })
}

/// Everything needed to recreate a board
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardExport<'a> {
    pub table: &'a Table,
    pub pipeline: &'a PipelineConfig,
    pub dashboard: &'a Dashboard,
}

pub fn board_to_json(
    table: &Table,
    pipeline: &PipelineConfig,
    dashboard: &Dashboard,
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&BoardExport {
        table,
        pipeline,
        dashboard,
    })
}
