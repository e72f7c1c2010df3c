//! JSON data parsing
//!
//! Parses JSON arrays of objects into a [`Table`]. Key order within each
//! object is kept as written in the document.

use crate::constants::JSON_WRAPPER_KEYS;
use crate::data::error::{DataError, DataResult};
use crate::types::{Record, SourceFormat, SourceMeta, Table};
use serde::Deserialize;
use std::path::Path;

/// One element of the row array: an object, or anything else (rejected)
#[derive(Deserialize)]
#[serde(untagged)]
enum RawRow {
    Object(Record),
    Other(serde_json::Value),
}

/// Common wrapper patterns around the row array
#[derive(Deserialize)]
struct Wrapper {
    #[serde(alias = "rows", alias = "items", alias = "records", alias = "results")]
    data: Vec<RawRow>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonDocument {
    Array(Vec<RawRow>),
    Wrapped(Wrapper),
}

/// Parse a JSON file into a Table
pub fn parse_json_file(path: &Path) -> DataResult<Table> {
    let content = std::fs::read_to_string(path)?;
    let table = parse_json_content(&content)?;

    tracing::debug!(
        path = %path.display(),
        rows = table.row_count(),
        "Parsed JSON file"
    );

    Ok(table.with_source_meta(SourceMeta {
        file_name: path.file_name().map(|n| n.to_string_lossy().to_string()),
        format: SourceFormat::Json,
        ingested_at: Some(crate::persistence::now_millis()),
    }))
}

/// Parse JSON content from a string
///
/// Accepts a top-level array of objects, or an object holding that array
/// under one of the [`JSON_WRAPPER_KEYS`]. Fails fast when any row is not
/// an object.
pub fn parse_json_content(json: &str) -> DataResult<Table> {
    let document: JsonDocument = serde_json::from_str(json).map_err(|e| {
        if e.is_data() {
            DataError::InvalidData(format!(
                "JSON must be an array of objects or have a {} array",
                JSON_WRAPPER_KEYS.join("/")
            ))
        } else {
            DataError::Json(e)
        }
    })?;

    let raw_rows = match document {
        JsonDocument::Array(rows) => rows,
        JsonDocument::Wrapped(wrapper) => wrapper.data,
    };

    let rows = raw_rows
        .into_iter()
        .enumerate()
        .map(|(index, row)| match row {
            RawRow::Object(record) => Ok(record),
            RawRow::Other(_) => Err(DataError::RowNotObject { index }),
        })
        .collect::<DataResult<Vec<_>>>()?;

    Table::from_records(rows)
}
