//! CSV and TSV parsing
//!
//! Parses CSV/TSV content into a [`Table`] with per-column type inference.
//!
//! ## Memory Limits
//!
//! To prevent unbounded memory growth:
//! - Files larger than 100MB are rejected (see [`MAX_CSV_SIZE_MB`])
//! - Files with more than 100,000 rows are rejected (see [`MAX_CSV_ROWS`])

use crate::constants::{MAX_CSV_ROWS, MAX_CSV_SIZE_MB};
use crate::data::error::{DataError, DataResult};
use crate::data::infer_column_type;
use crate::types::{CellValue, ColumnType, Record, SourceFormat, SourceMeta, Table};
use std::path::Path;

/// Parse a CSV or TSV file into a Table
///
/// Detects the delimiter from the file extension (.tsv uses tab) or from
/// whichever delimiter appears most in the first lines.
pub fn parse_csv_file(path: &Path) -> DataResult<Table> {
    let metadata = std::fs::metadata(path)?;
    let size_mb = metadata.len() / (1024 * 1024);
    if size_mb > MAX_CSV_SIZE_MB as u64 {
        return Err(DataError::TooLarge {
            size_mb,
            max_mb: MAX_CSV_SIZE_MB,
        });
    }

    let content = std::fs::read_to_string(path)?;
    let delimiter = detect_delimiter(path, &content);
    let table = parse_csv_content(&content, delimiter)?;

    tracing::debug!(
        path = %path.display(),
        rows = table.row_count(),
        columns = table.column_count(),
        "Parsed delimited file"
    );

    Ok(table.with_source_meta(SourceMeta {
        file_name: path.file_name().map(|n| n.to_string_lossy().to_string()),
        format: if delimiter == '\t' {
            SourceFormat::Tsv
        } else {
            SourceFormat::Csv
        },
        ingested_at: Some(crate::persistence::now_millis()),
    }))
}

/// Parse CSV/TSV content from a string
///
/// Content with more than [`MAX_CSV_ROWS`] data rows returns
/// [`DataError::TooManyRows`].
pub fn parse_csv_content(content: &str, delimiter: char) -> DataResult<Table> {
    let mut lines = content.lines();

    let header_line = lines.next().ok_or(DataError::EmptyFile)?;
    let headers: Vec<String> = split_csv_line(header_line, delimiter)
        .ok_or_else(|| unterminated_quote(1))?
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(DataError::NoColumns);
    }

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for (index, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        if raw_rows.len() >= MAX_CSV_ROWS {
            return Err(DataError::TooManyRows {
                rows: raw_rows.len() + 1,
                max_rows: MAX_CSV_ROWS,
            });
        }
        let fields = split_csv_line(line, delimiter).ok_or_else(|| unterminated_quote(index + 2))?;
        raw_rows.push(fields);
    }

    // Infer each column from its raw text, then type the cells to match
    let types: Vec<ColumnType> = (0..headers.len())
        .map(|i| {
            let column: Vec<CellValue> = raw_rows
                .iter()
                .map(|r| r.get(i).map(|s| CellValue::text(s.trim())).unwrap_or_default())
                .collect();
            infer_column_type(&column)
        })
        .collect();

    let rows = raw_rows
        .iter()
        .map(|raw| {
            headers
                .iter()
                .zip(&types)
                .enumerate()
                .map(|(i, (name, column_type))| {
                    let text = raw.get(i).map(|s| s.trim()).unwrap_or("");
                    (name.clone(), typed_cell(text, *column_type))
                })
                .collect::<Record>()
        })
        .collect();

    Table::new(headers, rows)
}

/// Convert raw text into a cell of the column's inferred type
fn typed_cell(text: &str, column_type: ColumnType) -> CellValue {
    if text.is_empty() {
        return CellValue::Null;
    }

    match column_type {
        ColumnType::Number => text
            .parse::<f64>()
            .map(CellValue::Number)
            .unwrap_or_else(|_| CellValue::text(text)),
        ColumnType::Boolean => match text.to_lowercase().as_str() {
            "true" | "yes" | "y" => CellValue::Bool(true),
            "false" | "no" | "n" => CellValue::Bool(false),
            _ => CellValue::text(text),
        },
        ColumnType::Date | ColumnType::Text => CellValue::text(text),
    }
}

/// Detect the delimiter to use for parsing
fn detect_delimiter(path: &Path, content: &str) -> char {
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        if ext.eq_ignore_ascii_case("tsv") {
            return '\t';
        }
    }

    // Count delimiters in first few lines to determine most likely
    let first_lines: String = content.lines().take(5).collect::<Vec<_>>().join("\n");

    let comma_count = first_lines.matches(',').count();
    let tab_count = first_lines.matches('\t').count();
    let semicolon_count = first_lines.matches(';').count();

    if tab_count > comma_count && tab_count > semicolon_count {
        '\t'
    } else if semicolon_count > comma_count {
        ';'
    } else {
        ','
    }
}

fn unterminated_quote(line_number: usize) -> DataError {
    DataError::Csv(format!("unterminated quoted field on line {}", line_number))
}

/// Split a CSV line respecting quoted fields and doubled quotes.
///
/// Returns `None` when a quoted field is still open at the end of the line.
fn split_csv_line(line: &str, delimiter: char) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            c if c == delimiter && !in_quotes => fields.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    if in_quotes {
        return None;
    }
    fields.push(current);

    Some(fields)
}
