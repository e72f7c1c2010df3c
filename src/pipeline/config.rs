//! Declarative pipeline configuration.
//!
//! A [`PipelineConfig`] is plain data: the caller accumulates edits and hands
//! the whole value to [`run`](crate::pipeline::run). It serializes to JSON
//! with camelCase keys so it can be persisted or exported as is.

use crate::types::{CellValue, Table};
use serde::{Deserialize, Serialize};

fn enabled_by_default() -> bool {
    true
}

// ============================================================================
// Filters
// ============================================================================

/// Comparison applied by a [`FilterRule`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    #[default]
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    GreaterThan,
    LessThan,
    GreaterEqual,
    LessEqual,
}

impl FilterOperator {
    pub fn label(&self) -> &'static str {
        match self {
            FilterOperator::Equals => "equals",
            FilterOperator::NotEquals => "does not equal",
            FilterOperator::Contains => "contains",
            FilterOperator::NotContains => "does not contain",
            FilterOperator::StartsWith => "starts with",
            FilterOperator::EndsWith => "ends with",
            FilterOperator::GreaterThan => ">",
            FilterOperator::LessThan => "<",
            FilterOperator::GreaterEqual => ">=",
            FilterOperator::LessEqual => "<=",
        }
    }

    /// True for operators that compare parsed numbers rather than text.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FilterOperator::GreaterThan
                | FilterOperator::LessThan
                | FilterOperator::GreaterEqual
                | FilterOperator::LessEqual
        )
    }
}

/// A single row predicate
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRule {
    #[serde(default)]
    pub column: String,
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: CellValue,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

impl FilterRule {
    pub fn new(column: impl Into<String>, operator: FilterOperator, value: impl Into<CellValue>) -> Self {
        Self {
            column: column.into(),
            operator,
            value: value.into(),
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

// ============================================================================
// Type Conversions
// ============================================================================

/// Target type of a [`TypeConversion`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Number,
    #[default]
    String,
    Date,
    Boolean,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeConversion {
    pub column: String,
    pub to_type: TargetType,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

impl TypeConversion {
    pub fn new(column: impl Into<String>, to_type: TargetType) -> Self {
        Self {
            column: column.into(),
            to_type,
            enabled: true,
        }
    }
}

// ============================================================================
// Calculated Columns
// ============================================================================

/// A derived column computed per row from an arithmetic formula
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedColumn {
    pub name: String,
    pub formula: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

impl CalculatedColumn {
    pub fn new(name: impl Into<String>, formula: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            formula: formula.into(),
            enabled: true,
        }
    }
}

// ============================================================================
// Validation Rules
// ============================================================================

/// Predicate checked by a [`ValidationRule`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    #[default]
    NotEmpty,
    IsNumber,
    MinLength,
    MaxLength,
    Regex,
}

/// What happens to a row failing a rule
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    #[default]
    Flag,
    Remove,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRule {
    pub column: String,
    pub rule: RuleKind,
    /// Bound for the length rules, pattern for `regex`
    #[serde(default)]
    pub value: CellValue,
    pub action: RuleAction,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

impl ValidationRule {
    pub fn new(column: impl Into<String>, rule: RuleKind, action: RuleAction) -> Self {
        Self {
            column: column.into(),
            rule,
            value: CellValue::Null,
            action,
            enabled: true,
        }
    }

    pub fn with_value(mut self, value: impl Into<CellValue>) -> Self {
        self.value = value.into();
        self
    }

    /// Name of the boolean column a `flag` rule adds to failing rows.
    pub fn flag_column(&self) -> String {
        format!("{}_valid", self.column)
    }
}

// ============================================================================
// Grouping
// ============================================================================

/// Reduction applied to a group's values
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFunction {
    #[default]
    Sum,
    Average,
    Count,
    Min,
    Max,
    Median,
}

impl AggregateFunction {
    /// Serialized name, also used to build default aliases.
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateFunction::Sum => "sum",
            AggregateFunction::Average => "average",
            AggregateFunction::Count => "count",
            AggregateFunction::Min => "min",
            AggregateFunction::Max => "max",
            AggregateFunction::Median => "median",
        }
    }

    pub fn all() -> &'static [AggregateFunction] {
        &[
            AggregateFunction::Sum,
            AggregateFunction::Average,
            AggregateFunction::Count,
            AggregateFunction::Min,
            AggregateFunction::Max,
            AggregateFunction::Median,
        ]
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregation {
    pub column: String,
    pub function: AggregateFunction,
    #[serde(default)]
    pub alias: String,
}

impl Aggregation {
    pub fn new(column: impl Into<String>, function: AggregateFunction) -> Self {
        Self {
            column: column.into(),
            function,
            alias: String::new(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    /// Output column name: the alias, or `<function>_<column>`.
    pub fn output_name(&self) -> String {
        if self.alias.is_empty() {
            format!("{}_{}", self.function.as_str(), self.column)
        } else {
            self.alias.clone()
        }
    }
}

// ============================================================================
// Sorting
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

// ============================================================================
// Pipeline
// ============================================================================

/// Full description of a transformation.
///
/// Applying the same config to the same table always yields the same
/// result, except for random sampling (`sample_size` without `sort_by`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    pub search_term: String,
    pub filters: Vec<FilterRule>,
    pub data_type_conversions: Vec<TypeConversion>,
    pub calculated_columns: Vec<CalculatedColumn>,
    pub validation_rules: Vec<ValidationRule>,
    pub group_by: Option<String>,
    pub aggregations: Vec<Aggregation>,
    pub sort_by: Option<String>,
    pub sort_order: SortOrder,
    /// Cap on output rows; zero or negative means no cap
    pub sample_size: Option<i64>,
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn with_filter(mut self, filter: FilterRule) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_conversion(mut self, conversion: TypeConversion) -> Self {
        self.data_type_conversions.push(conversion);
        self
    }

    pub fn with_calculated_column(mut self, column: CalculatedColumn) -> Self {
        self.calculated_columns.push(column);
        self
    }

    pub fn with_validation_rule(mut self, rule: ValidationRule) -> Self {
        self.validation_rules.push(rule);
        self
    }

    pub fn with_group_by(mut self, column: impl Into<String>) -> Self {
        self.group_by = Some(column.into());
        self
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregations.push(aggregation);
        self
    }

    pub fn with_sort(mut self, column: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(column.into());
        self.sort_order = order;
        self
    }

    pub fn with_sample_size(mut self, size: i64) -> Self {
        self.sample_size = Some(size);
        self
    }

    /// Grouping column, ignoring an empty name.
    pub fn active_group_by(&self) -> Option<&str> {
        self.group_by.as_deref().filter(|c| !c.is_empty())
    }

    /// Sort column, ignoring an empty name.
    pub fn active_sort_by(&self) -> Option<&str> {
        self.sort_by.as_deref().filter(|c| !c.is_empty())
    }

    /// Positive sample size, if any.
    pub fn active_sample_size(&self) -> Option<usize> {
        self.sample_size
            .filter(|n| *n > 0)
            .and_then(|n| usize::try_from(n).ok())
    }

    /// Whether running this config twice on one table may differ.
    pub fn is_deterministic(&self) -> bool {
        self.active_sample_size().is_none() || self.active_sort_by().is_some()
    }
}

/// Output of running a [`PipelineConfig`] over a [`Table`]
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResult {
    pub table: Table,
    pub original_row_count: usize,
    pub filtered_row_count: usize,
    pub applied_config: PipelineConfig,
}
