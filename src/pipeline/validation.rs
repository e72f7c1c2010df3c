//! Validation engine.
//!
//! `remove` rules drop failing rows, `flag` rules keep them and add
//! `<column>_valid = false`. Rules run in declared order, so a row removed
//! by one rule is never seen by the next. Rules that cannot be evaluated
//! (bad pattern, unparseable bound) treat every row as valid.

use crate::pipeline::config::{RuleAction, RuleKind, ValidationRule};
use crate::types::{parse_finite, CellValue, Record};
use regex::Regex;
use tracing::{debug, warn};

/// A rule with its operand resolved once up front
enum Check {
    NotEmpty,
    IsNumber,
    MinLength(usize),
    MaxLength(usize),
    Pattern(Regex),
    AlwaysValid,
}

impl Check {
    fn compile(rule: &ValidationRule) -> Self {
        let bound = || rule.value.to_string().trim().parse::<usize>().ok();
        match rule.rule {
            RuleKind::NotEmpty => Check::NotEmpty,
            RuleKind::IsNumber => Check::IsNumber,
            RuleKind::MinLength => bound().map_or(Check::AlwaysValid, Check::MinLength),
            RuleKind::MaxLength => bound().map_or(Check::AlwaysValid, Check::MaxLength),
            RuleKind::Regex => match Regex::new(&rule.value.to_string()) {
                Ok(re) => Check::Pattern(re),
                Err(err) => {
                    warn!(column = %rule.column, %err, "invalid validation pattern, rule ignored");
                    Check::AlwaysValid
                }
            },
        }
    }

    fn passes(&self, value: &CellValue) -> bool {
        match self {
            Check::NotEmpty => !value.to_string().trim().is_empty(),
            Check::IsNumber => match value {
                CellValue::Number(n) => n.is_finite(),
                CellValue::Text(s) => parse_finite(s).is_some(),
                _ => false,
            },
            Check::MinLength(min) => value.to_string().chars().count() >= *min,
            Check::MaxLength(max) => value.to_string().chars().count() <= *max,
            Check::Pattern(re) => re.is_match(&value.to_string()),
            Check::AlwaysValid => true,
        }
    }
}

/// Apply enabled validation rules in declared order.
pub fn apply_validation_rules(mut rows: Vec<Record>, rules: &[ValidationRule]) -> Vec<Record> {
    for rule in rules.iter().filter(|r| r.enabled && !r.column.is_empty()) {
        let check = Check::compile(rule);
        let before = rows.len();

        match rule.action {
            RuleAction::Remove => rows.retain(|row| check.passes(row.value(&rule.column))),
            RuleAction::Flag => {
                let flag = rule.flag_column();
                for row in rows.iter_mut().filter(|row| !check.passes(row.value(&rule.column))) {
                    row.insert(flag.as_str(), CellValue::Bool(false));
                }
            }
        }

        debug!(
            column = %rule.column,
            rule = ?rule.rule,
            action = ?rule.action,
            removed = before - rows.len(),
            "validation rule applied"
        );
    }
    rows
}
