//! Filter engine: global search plus declarative row predicates.
//!
//! Text operators compare the lowercased display form of the cell and the
//! operand. Numeric operators parse both sides; a side that does not parse
//! excludes the row. Rules are ANDed together. A row missing a rule's key
//! reads it as null; a rule naming a column no row has excludes nothing.

use crate::pipeline::config::{FilterOperator, FilterRule};
use crate::types::{CellValue, Record};
use std::collections::HashSet;

/// Compare both sides as numbers; a side that does not parse fails.
fn compare_numbers(cell: &CellValue, operand: &CellValue, cmp: fn(f64, f64) -> bool) -> bool {
    match (cell.as_f64(), operand.as_f64()) {
        (Some(lhs), Some(rhs)) => cmp(lhs, rhs),
        _ => false,
    }
}

impl FilterOperator {
    /// Evaluate `cell <op> operand`.
    pub fn evaluate(&self, cell: &CellValue, operand: &CellValue) -> bool {
        let text = || (cell.to_string().to_lowercase(), operand.to_string().to_lowercase());
        match self {
            FilterOperator::Equals => {
                let (lhs, rhs) = text();
                lhs == rhs
            }
            FilterOperator::NotEquals => {
                let (lhs, rhs) = text();
                lhs != rhs
            }
            FilterOperator::Contains => {
                let (lhs, rhs) = text();
                lhs.contains(&rhs)
            }
            FilterOperator::NotContains => {
                let (lhs, rhs) = text();
                !lhs.contains(&rhs)
            }
            FilterOperator::StartsWith => {
                let (lhs, rhs) = text();
                lhs.starts_with(&rhs)
            }
            FilterOperator::EndsWith => {
                let (lhs, rhs) = text();
                lhs.ends_with(&rhs)
            }
            FilterOperator::GreaterThan => compare_numbers(cell, operand, |a, b| a > b),
            FilterOperator::LessThan => compare_numbers(cell, operand, |a, b| a < b),
            FilterOperator::GreaterEqual => compare_numbers(cell, operand, |a, b| a >= b),
            FilterOperator::LessEqual => compare_numbers(cell, operand, |a, b| a <= b),
        }
    }
}

impl FilterRule {
    /// Disabled rules and rules without a column or operand never exclude rows.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.column.is_empty() && !self.value.is_blank()
    }

    /// Whether `row` passes this rule. A missing key is evaluated as null.
    pub fn matches(&self, row: &Record) -> bool {
        !self.is_active() || self.operator.evaluate(row.value(&self.column), &self.value)
    }
}

/// Whether any value of `row` contains `needle` (already lowercased).
fn matches_search(row: &Record, needle: &str) -> bool {
    row.values()
        .any(|v| v.to_string().to_lowercase().contains(needle))
}

/// Keep rows matching the search term (if any) and every active filter.
pub fn apply_filters(rows: Vec<Record>, search_term: &str, filters: &[FilterRule]) -> Vec<Record> {
    let needle = search_term.to_lowercase();
    // Flag rules add their column to failing rows only, so look across all rows
    let known: HashSet<&str> = rows.iter().flat_map(|row| row.keys()).collect();
    let active: Vec<&FilterRule> = filters
        .iter()
        .filter(|f| f.is_active() && known.contains(f.column.as_str()))
        .collect();

    if needle.is_empty() && active.is_empty() {
        return rows;
    }

    rows.into_iter()
        .filter(|row| needle.is_empty() || matches_search(row, &needle))
        .filter(|row| active.iter().all(|f| f.matches(row)))
        .collect()
}
