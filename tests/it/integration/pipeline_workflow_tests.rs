//! End-to-end pipeline workflows: ingest, transform, inspect, export.

use crate::helpers::{column_strings, people_table, sales_table, TestTableBuilder};
use databoard::data::{compute_statistics, parse_csv_content};
use databoard::export::table_to_csv;
use databoard::pipeline::{
    AggregateFunction, Aggregation, CalculatedColumn, FilterOperator, FilterRule, Pipeline,
    PipelineConfig, RuleAction, RuleKind, SortOrder, TargetType, TypeConversion, ValidationRule,
};
use databoard::settings::EngineSettings;
use databoard::types::{CellValue, Record};
use databoard::{run, Table};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

fn numbered(n: usize) -> Table {
    (0..n)
        .fold(TestTableBuilder::new(&["id", "score"]), |builder, i| {
            builder.row(vec![(i as i64).into(), ((n - i) as i64).into()])
        })
        .build()
}

#[test]
fn test_group_and_sum_with_alias() {
    let config = PipelineConfig::new()
        .with_group_by("cat")
        .with_aggregation(Aggregation::new("val", AggregateFunction::Sum).with_alias("total"));

    let result = run(&sales_table(), &config);

    let expected: HashSet<(String, String)> = [("A", "30"), ("B", "5")]
        .into_iter()
        .map(|(c, t)| (c.to_string(), t.to_string()))
        .collect();
    let actual: HashSet<(String, String)> = result
        .table
        .rows()
        .iter()
        .map(|r| (r.value("cat").to_string(), r.value("total").to_string()))
        .collect();

    assert_eq!(actual, expected);
    assert_eq!(result.table.columns(), ["cat", "total"]);
    assert_eq!(result.original_row_count, 3);
    assert_eq!(result.filtered_row_count, 2);
}

#[test]
fn test_sampling_under_sort_is_top_n() {
    let table = numbered(5);
    let config = PipelineConfig::new()
        .with_sort("score", SortOrder::Asc)
        .with_sample_size(2);

    for _ in 0..10 {
        let result = run(&table, &config);
        assert_eq!(column_strings(&result.table, "score"), vec!["1", "2"]);
    }
}

#[test]
fn test_random_sampling_draws_distinct_rows() {
    let table = numbered(20);
    let config = PipelineConfig::new().with_sample_size(5);
    assert!(!config.is_deterministic());

    let result = run(&table, &config);
    let ids: HashSet<String> = column_strings(&result.table, "id").into_iter().collect();
    assert_eq!(ids.len(), 5);
    assert_eq!(result.filtered_row_count, 5);

    // Seeded runs reproduce
    let pipeline = Pipeline::new();
    let a = pipeline.run_with_rng(&table, &config, &mut StdRng::seed_from_u64(9));
    let b = pipeline.run_with_rng(&table, &config, &mut StdRng::seed_from_u64(9));
    assert_eq!(a.table, b.table);
}

#[test]
fn test_full_pipeline_from_csv_to_export() {
    let csv = "region,units,price\nnorth,3,2.5\nsouth,x,4\nnorth,2,10\neast,1,1\nsouth,4,4";
    let table = parse_csv_content(csv, ',').unwrap();

    let config = PipelineConfig::new()
        .with_conversion(TypeConversion::new("units", TargetType::Number))
        .with_calculated_column(CalculatedColumn::new("revenue", "units * price"))
        .with_validation_rule(
            ValidationRule::new("revenue", RuleKind::Regex, RuleAction::Remove).with_value("^[1-9]"),
        )
        .with_filter(FilterRule::new("region", FilterOperator::NotEquals, "east"))
        .with_group_by("region")
        .with_aggregation(Aggregation::new("revenue", AggregateFunction::Sum).with_alias("revenue"))
        .with_aggregation(Aggregation::new("units", AggregateFunction::Count).with_alias("orders"))
        .with_sort("revenue", SortOrder::Desc);

    let result = run(&table, &config);

    assert_eq!(result.original_row_count, 5);
    assert_eq!(
        table_to_csv(&result.table, ','),
        "region,revenue,orders\nnorth,27.5,2\nsouth,16,1"
    );

    let stats = compute_statistics(&result.table);
    assert!(stats.get("revenue").unwrap().is_numeric);
    assert_eq!(stats.get("region").unwrap().unique_count, 2);
}

#[test]
fn test_input_table_is_never_mutated() {
    let table = people_table();
    let before = table.clone();
    let config = PipelineConfig::new()
        .with_conversion(TypeConversion::new("age", TargetType::Number))
        .with_calculated_column(CalculatedColumn::new("next", "age + 1"))
        .with_validation_rule(ValidationRule::new("city", RuleKind::NotEmpty, RuleAction::Flag));

    let result = run(&table, &config);
    assert_eq!(table, before);
    assert_eq!(result.table.rows()[1].value("age"), &CellValue::Number(0.0));
    assert_eq!(result.table.rows()[3].value("city_valid"), &CellValue::Bool(false));
}

#[test]
fn test_calculated_columns_do_not_see_group_outputs() {
    // "total" only exists after grouping, so the formula cannot resolve it
    let config = PipelineConfig::new()
        .with_calculated_column(CalculatedColumn::new("half", "total / 2"))
        .with_group_by("cat")
        .with_aggregation(Aggregation::new("val", AggregateFunction::Sum).with_alias("total"));

    let result = run(&sales_table(), &config);
    assert_eq!(result.table.columns(), ["cat", "total"]);

    let ungrouped = run(
        &sales_table(),
        &PipelineConfig::new().with_calculated_column(CalculatedColumn::new("half", "total / 2")),
    );
    assert_eq!(column_strings(&ungrouped.table, "half"), vec!["Error", "Error", "Error"]);
}

#[test]
fn test_sample_size_of_zero_or_negative_is_ignored() {
    let table = numbered(4);
    for size in [0, -3, 4, 100] {
        let result = run(&table, &PipelineConfig::new().with_sample_size(size));
        assert_eq!(result.filtered_row_count, 4, "sample size {}", size);
    }
}

#[test]
fn test_settings_drive_formula_sandbox() {
    let settings = EngineSettings {
        max_formula_depth: 2,
        ..EngineSettings::default()
    };
    let config = PipelineConfig::new()
        .with_calculated_column(CalculatedColumn::new("shallow", "(val)"))
        .with_calculated_column(CalculatedColumn::new("deep", "(((val)))"));

    let result = Pipeline::with_settings(&settings).run(&sales_table(), &config);
    let first: &Record = &result.table.rows()[0];
    assert_eq!(first.value("shallow"), &CellValue::Number(10.0));
    assert_eq!(first.value("deep"), &CellValue::text("Error"));
}

#[test]
fn test_flagged_rows_can_be_filtered_in_the_same_run() {
    let table = TestTableBuilder::new(&["age"])
        .rows_of(["30", "abc", "40"].map(CellValue::text))
        .build();
    let config = PipelineConfig::new()
        .with_validation_rule(ValidationRule::new("age", RuleKind::IsNumber, RuleAction::Flag))
        .with_filter(FilterRule::new("age_valid", FilterOperator::Equals, "false"));

    let result = run(&table, &config);
    assert_eq!(column_strings(&result.table, "age"), vec!["abc"]);

    let passing = run(
        &table,
        &PipelineConfig::new()
            .with_validation_rule(ValidationRule::new("age", RuleKind::IsNumber, RuleAction::Flag))
            .with_filter(FilterRule::new("age_valid", FilterOperator::NotEquals, "false")),
    );
    assert_eq!(column_strings(&passing.table, "age"), vec!["30", "40"]);
}
