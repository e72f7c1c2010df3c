//! Type conversion engine.

use crate::data::parse_date_value;
use crate::pipeline::config::{TargetType, TypeConversion};
use crate::types::{CellValue, Record};

impl TargetType {
    /// Coerce a single value.
    ///
    /// - `number`: leading numeric value (`"10%"` is 10), or `0` when there is none
    /// - `string`: display form, so null becomes the empty string rather than `"null"`
    /// - `date`: `YYYY-MM-DD`, or the original value when it is not a date
    /// - `boolean`: `false` for falsy values and the literals `"false"` / `"0"`
    pub fn convert(&self, value: &CellValue) -> CellValue {
        match self {
            TargetType::Number => CellValue::Number(value.leading_f64_or_zero()),
            TargetType::String => CellValue::Text(value.to_string()),
            TargetType::Date => parse_date_value(value)
                .map(|date| CellValue::Text(date.format("%Y-%m-%d").to_string()))
                .unwrap_or_else(|| value.clone()),
            TargetType::Boolean => {
                let is_false_literal =
                    matches!(value, CellValue::Text(s) if s == "false" || s == "0");
                CellValue::Bool(value.is_truthy() && !is_false_literal)
            }
        }
    }
}

/// Apply enabled conversions in declared order.
///
/// Later conversions on the same column see earlier output. Rows without the
/// column are left alone.
pub fn apply_conversions(mut rows: Vec<Record>, conversions: &[TypeConversion]) -> Vec<Record> {
    for conversion in conversions.iter().filter(|c| c.enabled && !c.column.is_empty()) {
        for row in &mut rows {
            if let Some(current) = row.get(&conversion.column) {
                let converted = conversion.to_type.convert(current);
                row.insert(conversion.column.as_str(), converted);
            }
        }
    }
    rows
}
