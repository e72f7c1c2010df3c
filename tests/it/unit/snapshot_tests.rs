//! Snapshot tests using the insta crate.
//!
//! Snapshot testing pins the JSON shape of values handed to collaborators
//! (persistence, export, dashboards), so a serde attribute change cannot
//! silently break stored data.
//!
//! To update snapshots after intentional changes:
//! ```sh
//! cargo insta test --accept
//! ```
//!
//! Or review changes interactively:
//! ```sh
//! cargo insta review
//! ```

use databoard::charts::{get_spec, validate_config, ChartCandidate, ChartType, Dashboard};
use databoard::pipeline::{
    AggregateFunction, Aggregation, PipelineConfig, RuleAction, RuleKind, SortOrder, ValidationRule,
};

// ============================================================================
// Pipeline Config Serialization Tests
// ============================================================================

#[test]
fn snapshot_default_pipeline_config() {
    insta::assert_json_snapshot!(PipelineConfig::default(), @r###"
    {
      "searchTerm": "",
      "filters": [],
      "dataTypeConversions": [],
      "calculatedColumns": [],
      "validationRules": [],
      "groupBy": null,
      "aggregations": [],
      "sortBy": null,
      "sortOrder": "asc",
      "sampleSize": null
    }
    "###);
}

#[test]
fn snapshot_grouped_pipeline_config() {
    let config = PipelineConfig::new()
        .with_validation_rule(
            ValidationRule::new("email", RuleKind::Regex, RuleAction::Flag).with_value("@"),
        )
        .with_group_by("region")
        .with_aggregation(Aggregation::new("sales", AggregateFunction::Median))
        .with_sort("median_sales", SortOrder::Desc)
        .with_sample_size(10);

    insta::assert_json_snapshot!(config, @r###"
    {
      "searchTerm": "",
      "filters": [],
      "dataTypeConversions": [],
      "calculatedColumns": [],
      "validationRules": [
        {
          "column": "email",
          "rule": "regex",
          "value": "@",
          "action": "flag",
          "enabled": true
        }
      ],
      "groupBy": "region",
      "aggregations": [
        {
          "column": "sales",
          "function": "median",
          "alias": ""
        }
      ],
      "sortBy": "median_sales",
      "sortOrder": "desc",
      "sampleSize": 10
    }
    "###);
}

// ============================================================================
// Chart Registry Serialization Tests
// ============================================================================

#[test]
fn snapshot_sankey_spec() {
    insta::assert_json_snapshot!(get_spec("sankey"), @r###"
    {
      "requiresX": false,
      "requiresY": true,
      "requiresZ": false,
      "xDomain": "any",
      "yDomain": "numeric",
      "supportsColorBy": false,
      "supportsSizeBy": false,
      "supportsZAxis": false,
      "additionalFields": [
        {
          "name": "source",
          "label": "Source",
          "kind": "select",
          "required": true
        },
        {
          "name": "target",
          "label": "Target",
          "kind": "select",
          "required": true
        }
      ]
    }
    "###);
}

#[test]
fn snapshot_config_issues() {
    let issues = validate_config("sankey", &ChartCandidate::default());
    insta::assert_json_snapshot!(issues, @r###"
    [
      {
        "issue": "missing_title"
      },
      {
        "issue": "missing_y_axis"
      },
      {
        "issue": "missing_field",
        "detail": "source"
      },
      {
        "issue": "missing_field",
        "detail": "target"
      }
    ]
    "###);
}

// ============================================================================
// Dashboard Serialization Tests
// ============================================================================

#[test]
fn snapshot_dashboard() {
    let mut dashboard = Dashboard::new();
    dashboard.add_widget(
        ChartType::Bar,
        ChartCandidate::new("Sales by region").with_x("region").with_y("total"),
    );
    dashboard.active_tab = 1;

    insta::assert_json_snapshot!(dashboard, {
        ".widgets[].id" => "[id]",
    }, @r###"
    {
      "widgets": [
        {
          "id": "[id]",
          "chartType": "bar",
          "config": {
            "title": "Sales by region",
            "xAxis": "region",
            "yAxis": "total"
          },
          "layout": {
            "x": 0,
            "y": 0,
            "w": 6,
            "h": 4
          }
        }
      ],
      "activeTab": 1
    }
    "###);
}
