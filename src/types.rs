//! Core types for the Databoard data model.
//!
//! A [`Table`] is an immutable-per-version value: every pipeline stage that
//! changes data produces a new `Table` rather than editing one in place.

use crate::data::error::{DataError, DataResult};
use crate::data::infer_column_type;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

// ============================================================================
// Cell Values
// ============================================================================

/// A single scalar cell value.
///
/// A key missing from a [`Record`] plays the role of "undefined"; every
/// accessor treats it exactly like [`CellValue::Null`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// True for null and for the empty string.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Parse the value as a finite number.
    ///
    /// Text is trimmed before parsing; booleans and null never parse.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Text(s) => parse_finite(s),
            _ => None,
        }
    }

    /// Read the leading number of the value, ignoring any trailing text.
    ///
    /// `"10%"` reads as 10 and `"1.5kg"` as 1.5. Non-finite results, booleans
    /// and null read as `None`.
    pub fn leading_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Text(s) => parse_leading_float(s).filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Leading numeric value, or `0.0` when there is none.
    pub fn leading_f64_or_zero(&self) -> f64 {
        self.leading_f64().unwrap_or(0.0)
    }

    /// Truthiness: null, `false`, zero, NaN and the empty string are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Null => false,
            CellValue::Bool(b) => *b,
            CellValue::Number(n) => *n != 0.0 && !n.is_nan(),
            CellValue::Text(s) => !s.is_empty(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            CellValue::Null => 0,
            CellValue::Bool(_) | CellValue::Number(_) => 1,
            CellValue::Text(_) => 2,
        }
    }

    fn numeric_rank_value(&self) -> f64 {
        match self {
            CellValue::Bool(b) => f64::from(u8::from(*b)),
            CellValue::Number(n) => *n,
            _ => f64::NAN,
        }
    }

    /// Total order used by the sort engine.
    ///
    /// Numbers (and booleans as 0/1) compare numerically, text compares
    /// lexicographically. Across kinds: null < numbers < text.
    pub fn compare(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
            (a, b) if a.rank() == 1 && b.rank() == 1 => a
                .numeric_rank_value()
                .total_cmp(&b.numeric_rank_value()),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Number(n) => {
                // Whole numbers print without a trailing ".0"
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

/// Parse trimmed text as a finite `f64`.
pub fn parse_finite(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse the longest numeric prefix of `s` after leading whitespace.
///
/// Accepts an optional sign, digits with at most one decimal point, an
/// optional exponent and the literal `Infinity`. Returns `None` when no digit
/// starts the text.
pub fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        let infinity = if s.starts_with('-') { f64::NEG_INFINITY } else { f64::INFINITY };
        return Some(infinity);
    }

    let digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let integer = digits(end);
    end += integer;
    let mut fraction = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction = digits(end + 1);
        if integer + fraction > 0 {
            end += 1 + fraction;
        }
    }
    if integer + fraction == 0 {
        return None;
    }

    // An exponent only counts when digits follow it
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digits(exp);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }

    s[..end].parse::<f64>().ok()
}

// ============================================================================
// Records
// ============================================================================

/// One row: an insertion-ordered mapping from column name to value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, CellValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Value for `key`, with a missing key read as null.
    pub fn value(&self, key: &str) -> &CellValue {
        static NULL: CellValue = CellValue::Null;
        self.get(key).unwrap_or(&NULL)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Set `key`, replacing in place if present, appending otherwise.
    pub fn insert(&mut self, key: impl Into<String>, value: CellValue) -> Option<CellValue> {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((key, value));
                None
            }
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &CellValue> {
        self.fields.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, CellValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, CellValue)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = Record;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of column values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Record, A::Error> {
                let mut record = Record::with_capacity(access.size_hint().unwrap_or(0));
                // Nested arrays/objects are kept as their JSON text
                while let Some((key, value)) = access.next_entry::<String, serde_json::Value>()? {
                    record.insert(key, CellValue::from_json(&value));
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

// ============================================================================
// Tables
// ============================================================================

/// Format the data originally came from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Csv,
    Tsv,
    Json,
    Excel,
    #[default]
    Manual,
}

/// Where a table came from. Opaque to the pipeline.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMeta {
    pub file_name: Option<String>,
    pub format: SourceFormat,
    /// Unix timestamp in milliseconds
    pub ingested_at: Option<u64>,
}

/// Inferred type of a column
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Number,
    Boolean,
    Date,
    #[default]
    Text,
}

impl ColumnType {
    pub fn label(&self) -> &'static str {
        match self {
            ColumnType::Number => "Number",
            ColumnType::Boolean => "Boolean",
            ColumnType::Date => "Date",
            ColumnType::Text => "Text",
        }
    }
}

/// Normalized in-memory tabular dataset.
///
/// Invariant: column names are unique, and when `rows` is non-empty the
/// column set equals the key set of `rows[0]`. Later rows may carry extra
/// keys (e.g. validation flags) or miss keys (read as null).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawTable")]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Record>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_meta: Option<SourceMeta>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTable {
    #[serde(default)]
    columns: Option<Vec<String>>,
    rows: Vec<Record>,
    #[serde(default)]
    source_meta: Option<SourceMeta>,
}

impl TryFrom<RawTable> for Table {
    type Error = DataError;

    fn try_from(raw: RawTable) -> DataResult<Self> {
        let table = match raw.columns {
            Some(columns) => Table::new(columns, raw.rows)?,
            None => Table::from_records(raw.rows)?,
        };
        Ok(match raw.source_meta {
            Some(meta) => table.with_source_meta(meta),
            None => table,
        })
    }
}

impl Table {
    /// Build a table, checking the column invariant.
    pub fn new(columns: Vec<String>, rows: Vec<Record>) -> DataResult<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(DataError::DuplicateColumn(column.clone()));
            }
        }

        if let Some(first) = rows.first() {
            let keys: HashSet<&str> = first.keys().collect();
            if keys != seen {
                return Err(DataError::ColumnMismatch {
                    expected: columns.clone(),
                    found: first.keys().map(str::to_string).collect(),
                });
            }
        }

        Ok(Self {
            columns,
            rows,
            source_meta: None,
        })
    }

    /// Build a table whose columns are the keys of the first record.
    pub fn from_records(rows: Vec<Record>) -> DataResult<Self> {
        let columns = rows
            .first()
            .map(|r| r.keys().map(str::to_string).collect())
            .unwrap_or_default();
        Self::new(columns, rows)
    }

    /// Assemble pipeline output. Callers derive `columns` from `rows[0]`.
    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Record>) -> Self {
        Self {
            columns,
            rows,
            source_meta: None,
        }
    }

    pub fn with_source_meta(mut self, meta: SourceMeta) -> Self {
        self.source_meta = Some(meta);
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn source_meta(&self) -> Option<&SourceMeta> {
        self.source_meta.as_ref()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Values of one column in row order, missing keys read as null.
    pub fn column_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a CellValue> + 'a {
        self.rows.iter().map(move |r| r.value(name))
    }

    /// Inferred type of every column, in column order.
    pub fn column_types(&self) -> Vec<(String, ColumnType)> {
        self.columns
            .iter()
            .map(|c| (c.clone(), infer_column_type(self.column_values(c))))
            .collect()
    }

    pub fn into_rows(self) -> Vec<Record> {
        self.rows
    }
}

impl CellValue {
    /// Convert a JSON scalar. Nested arrays/objects are kept as their JSON text.
    pub fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => CellValue::Null,
            Value::Bool(b) => CellValue::Bool(*b),
            Value::Number(n) => n.as_f64().map(CellValue::Number).unwrap_or(CellValue::Null),
            Value::String(s) => CellValue::Text(s.clone()),
            other => CellValue::Text(other.to_string()),
        }
    }
}
