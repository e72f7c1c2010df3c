//! Calculated column engine.

use crate::constants::FORMULA_ERROR;
use crate::pipeline::config::CalculatedColumn;
use crate::pipeline::formula::{Formula, FormulaLimits};
use crate::types::{CellValue, Record};
use tracing::{trace, warn};

/// Append one column per enabled calculated column.
///
/// `columns` is the column set visible to the first formula; each applied
/// column becomes visible to the ones after it. A row whose formula fails
/// gets the text `"Error"` instead of a number.
pub fn apply_calculated_columns(
    mut rows: Vec<Record>,
    columns: &[String],
    calcs: &[CalculatedColumn],
    limits: FormulaLimits,
) -> Vec<Record> {
    let mut available = columns.to_vec();

    for calc in calcs.iter().filter(|c| c.enabled && !c.name.is_empty()) {
        let compiled = Formula::compile(&calc.formula, &available, limits);
        let mut errors = 0usize;

        for row in &mut rows {
            let result = compiled.as_ref().map_err(Clone::clone).and_then(|f| f.evaluate(row));
            let value = match result {
                Ok(n) => CellValue::Number(n),
                Err(err) => {
                    trace!(column = %calc.name, %err, "formula failed for row");
                    errors += 1;
                    CellValue::text(FORMULA_ERROR)
                }
            };
            row.insert(calc.name.as_str(), value);
        }

        if errors > 0 {
            match &compiled {
                Err(err) => warn!(column = %calc.name, %err, "formula does not compile"),
                Ok(_) => warn!(column = %calc.name, errors, "formula failed on some rows"),
            }
        }

        if !available.contains(&calc.name) {
            available.push(calc.name.clone());
        }
    }

    rows
}
