//! Unit tests for individual pipeline engines through the public API.

use crate::helpers::{column_strings, people_table, TestTableBuilder};
use databoard::pipeline::{
    apply_filters, apply_validation_rules, run, CalculatedColumn, FilterOperator, FilterRule,
    Formula, FormulaError, FormulaLimits, PipelineConfig, RuleAction, RuleKind, ValidationRule,
};
use databoard::types::{CellValue, Record};

fn ages(values: &[&str]) -> Vec<Record> {
    TestTableBuilder::new(&["age"])
        .rows_of(values.iter().map(|v| CellValue::from(*v)))
        .build()
        .into_rows()
}

// ============================================================================
// Filters
// ============================================================================

#[test]
fn test_disjoint_filters_yield_nothing() {
    let table = people_table();
    let config = PipelineConfig::new()
        .with_filter(FilterRule::new("city", FilterOperator::Equals, "Berlin"))
        .with_filter(FilterRule::new("city", FilterOperator::Equals, "Paris"));

    let result = run(&table, &config);
    assert_eq!(result.filtered_row_count, 0);
    assert_eq!(result.original_row_count, 5);
}

#[test]
fn test_search_and_filters_combine() {
    let rows = people_table().into_rows();
    let filters = [FilterRule::new("age", FilterOperator::GreaterThan, "28")];

    let out = apply_filters(rows, "berlin", &filters);
    let names: Vec<String> = out.iter().map(|r| r.value("name").to_string()).collect();
    assert_eq!(names, vec!["Alice", "Carol"]);
}

#[test]
fn test_not_equals_on_null_cell() {
    let rows = people_table().into_rows();
    let filters = [FilterRule::new("city", FilterOperator::NotEquals, "Berlin")];
    // Dave's null city displays as "" and is kept
    assert_eq!(apply_filters(rows, "", &filters).len(), 3);
}

#[test]
fn test_filter_only_config_is_idempotent() {
    let table = people_table();
    let config = PipelineConfig::new()
        .with_search("e")
        .with_filter(FilterRule::new("age", FilterOperator::LessEqual, 35.0));

    let once = run(&table, &config).table;
    let twice = run(&once, &config).table;
    assert_eq!(once.rows(), twice.rows());
    assert_eq!(once.columns(), twice.columns());
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_is_number_remove() {
    let rule = ValidationRule::new("age", RuleKind::IsNumber, RuleAction::Remove);
    let out = apply_validation_rules(ages(&["30", "abc"]), &[rule]);

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].value("age"), &CellValue::text("30"));
}

#[test]
fn test_is_number_flag() {
    let rule = ValidationRule::new("age", RuleKind::IsNumber, RuleAction::Flag);
    let out = apply_validation_rules(ages(&["30", "abc"]), &[rule]);

    assert_eq!(out.len(), 2);
    assert_eq!(out[1].value("age_valid"), &CellValue::Bool(false));
    assert_eq!(out[0].get("age_valid"), None);
}

#[test]
fn test_flagged_table_columns_follow_first_row() {
    let table = TestTableBuilder::new(&["age"])
        .rows_of(["x", "1"].map(CellValue::from))
        .build();
    let config = PipelineConfig::new()
        .with_validation_rule(ValidationRule::new("age", RuleKind::IsNumber, RuleAction::Flag));

    let result = run(&table, &config);
    assert_eq!(result.table.columns(), ["age", "age_valid"]);
    assert_eq!(column_strings(&result.table, "age_valid"), vec!["false", ""]);
}

// ============================================================================
// Formulas
// ============================================================================

#[test]
fn test_overlapping_column_names_resolve_longest_first() {
    let table = TestTableBuilder::new(&["a", "ab", "a b"])
        .row(vec![1.0.into(), 10.0.into(), 100.0.into()])
        .build();
    let config = PipelineConfig::new()
        .with_calculated_column(CalculatedColumn::new("x", "ab + a"))
        .with_calculated_column(CalculatedColumn::new("y", "a b - a"));

    let result = run(&table, &config);
    let row = &result.table.rows()[0];
    assert_eq!(row.value("x"), &CellValue::Number(11.0));
    assert_eq!(row.value("y"), &CellValue::Number(99.0));
}

#[test]
fn test_formula_cannot_reach_outside_arithmetic() {
    let columns = vec!["a".to_string()];
    for hostile in ["process.exit(1)", "a; a", "a ** 2", "`a`", "a[0]"] {
        assert!(
            Formula::compile(hostile, &columns, FormulaLimits::default()).is_err(),
            "{} should not compile",
            hostile
        );
    }
}

#[test]
fn test_formula_depth_limit() {
    let deep = format!("{}1{}", "(".repeat(100), ")".repeat(100));
    assert_eq!(
        Formula::compile(&deep, &[], FormulaLimits::default()),
        Err(FormulaError::TooDeep(64))
    );
}
