//! Chart-compatibility registry.
//!
//! Static metadata describing which roles each chart type needs and what
//! kind of column fits each role. It carries no rendering logic; dashboards
//! use it to decide whether a widget's configuration is complete.

use crate::data::TableStatistics;
use crate::types::ColumnType;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Chart Types
// ============================================================================

/// Types of charts available
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
    Area,
    Pie,
    Scatter,
    Bubble,
    Heatmap,
    Histogram,
    Radar,
    Funnel,
    Treemap,
    Sunburst,
    Sankey,
}

impl ChartType {
    pub fn label(&self) -> &'static str {
        match self {
            ChartType::Bar => "Bar",
            ChartType::Line => "Line",
            ChartType::Area => "Area",
            ChartType::Pie => "Pie",
            ChartType::Scatter => "Scatter",
            ChartType::Bubble => "Bubble",
            ChartType::Heatmap => "Heatmap",
            ChartType::Histogram => "Histogram",
            ChartType::Radar => "Radar",
            ChartType::Funnel => "Funnel",
            ChartType::Treemap => "Treemap",
            ChartType::Sunburst => "Sunburst",
            ChartType::Sankey => "Sankey",
        }
    }

    /// Registry key, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Area => "area",
            ChartType::Pie => "pie",
            ChartType::Scatter => "scatter",
            ChartType::Bubble => "bubble",
            ChartType::Heatmap => "heatmap",
            ChartType::Histogram => "histogram",
            ChartType::Radar => "radar",
            ChartType::Funnel => "funnel",
            ChartType::Treemap => "treemap",
            ChartType::Sunburst => "sunburst",
            ChartType::Sankey => "sankey",
        }
    }

    pub fn all() -> &'static [ChartType] {
        &[
            ChartType::Bar,
            ChartType::Line,
            ChartType::Area,
            ChartType::Pie,
            ChartType::Scatter,
            ChartType::Bubble,
            ChartType::Heatmap,
            ChartType::Histogram,
            ChartType::Radar,
            ChartType::Funnel,
            ChartType::Treemap,
            ChartType::Sunburst,
            ChartType::Sankey,
        ]
    }

    pub fn spec(&self) -> &'static ChartSpec {
        get_spec(self.as_str())
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownChartType(pub String);

impl fmt::Display for UnknownChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown chart type {:?}", self.0)
    }
}

impl std::error::Error for UnknownChartType {}

impl FromStr for ChartType {
    type Err = UnknownChartType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        ChartType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == key)
            .ok_or_else(|| UnknownChartType(s.to_string()))
    }
}

// ============================================================================
// Specs
// ============================================================================

/// Kind of column a chart role accepts
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Numeric,
    Date,
    #[default]
    Any,
}

impl Domain {
    /// Whether a column with these properties fits the domain.
    pub fn accepts(&self, is_numeric: bool, inferred: ColumnType) -> bool {
        match self {
            Domain::Numeric => is_numeric,
            Domain::Date => inferred == ColumnType::Date,
            Domain::Any => true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Select,
    Multiselect,
}

/// Extra, chart-specific configuration field
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalField {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

/// Static requirements of one chart type
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    pub requires_x: bool,
    pub requires_y: bool,
    pub requires_z: bool,
    pub x_domain: Domain,
    pub y_domain: Domain,
    pub supports_color_by: bool,
    pub supports_size_by: bool,
    pub supports_z_axis: bool,
    pub additional_fields: Vec<AdditionalField>,
}

impl ChartSpec {
    /// Spec used for chart types the registry does not know.
    fn permissive() -> Self {
        Self {
            requires_x: true,
            requires_y: true,
            requires_z: false,
            x_domain: Domain::Any,
            y_domain: Domain::Any,
            supports_color_by: false,
            supports_size_by: false,
            supports_z_axis: false,
            additional_fields: Vec::new(),
        }
    }

    fn xy(x_domain: Domain, y_domain: Domain) -> Self {
        Self {
            x_domain,
            y_domain,
            ..Self::permissive()
        }
    }

    fn with_color(mut self) -> Self {
        self.supports_color_by = true;
        self
    }

    fn with_size(mut self) -> Self {
        self.supports_size_by = true;
        self
    }

    fn with_z(mut self, required: bool) -> Self {
        self.supports_z_axis = true;
        self.requires_z = required;
        self
    }

    fn without_x(mut self) -> Self {
        self.requires_x = false;
        self
    }

    fn without_y(mut self) -> Self {
        self.requires_y = false;
        self
    }

    fn with_field(mut self, name: &'static str, label: &'static str, kind: FieldKind, required: bool) -> Self {
        self.additional_fields.push(AdditionalField {
            name,
            label,
            kind,
            required,
        });
        self
    }
}

static FALLBACK_SPEC: Lazy<ChartSpec> = Lazy::new(ChartSpec::permissive);

static REGISTRY: Lazy<HashMap<ChartType, ChartSpec>> = Lazy::new(|| {
    use Domain::{Any, Numeric};
    use FieldKind::{Multiselect, Select};

    HashMap::from([
        (ChartType::Bar, ChartSpec::xy(Any, Numeric).with_color()),
        (
            ChartType::Line,
            ChartSpec::xy(Any, Numeric)
                .with_color()
                .with_field("series", "Series", Multiselect, false),
        ),
        (
            ChartType::Area,
            ChartSpec::xy(Any, Numeric)
                .with_color()
                .with_field("series", "Series", Multiselect, false),
        ),
        (ChartType::Pie, ChartSpec::xy(Any, Numeric)),
        (
            ChartType::Scatter,
            ChartSpec::xy(Numeric, Numeric).with_color().with_size().with_z(false),
        ),
        (
            ChartType::Bubble,
            ChartSpec::xy(Numeric, Numeric).with_color().with_size().with_z(true),
        ),
        (ChartType::Heatmap, ChartSpec::xy(Any, Any).with_z(true)),
        (ChartType::Histogram, ChartSpec::xy(Numeric, Any).without_y()),
        (
            ChartType::Radar,
            ChartSpec::xy(Any, Numeric).with_field("series", "Series", Multiselect, false),
        ),
        (ChartType::Funnel, ChartSpec::xy(Any, Numeric)),
        (
            ChartType::Treemap,
            ChartSpec::xy(Any, Numeric)
                .without_x()
                .with_color()
                .with_field("hierarchy", "Hierarchy", Multiselect, true),
        ),
        (
            ChartType::Sunburst,
            ChartSpec::xy(Any, Numeric)
                .without_x()
                .with_field("hierarchy", "Hierarchy", Multiselect, true),
        ),
        (
            ChartType::Sankey,
            ChartSpec::xy(Any, Numeric)
                .without_x()
                .with_field("source", "Source", Select, true)
                .with_field("target", "Target", Select, true),
        ),
    ])
});

/// Spec for `chart_type`, or a permissive spec when the type is unknown.
pub fn get_spec(chart_type: &str) -> &'static ChartSpec {
    chart_type
        .parse::<ChartType>()
        .ok()
        .and_then(|t| REGISTRY.get(&t))
        .unwrap_or_else(|| &*FALLBACK_SPEC)
}

// ============================================================================
// Candidate Configs
// ============================================================================

/// Value of an additional field
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    One(String),
    Many(Vec<String>),
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::One(s) => s.trim().is_empty(),
            FieldValue::Many(items) => items.iter().all(|s| s.trim().is_empty()),
        }
    }
}

/// A chart configuration as collected from the user
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartCandidate {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_axis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_by: Option<String>,
    /// Chart-specific fields keyed by [`AdditionalField::name`]
    #[serde(flatten)]
    pub extra: BTreeMap<String, FieldValue>,
}

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

impl ChartCandidate {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_x(mut self, column: impl Into<String>) -> Self {
        self.x_axis = Some(column.into());
        self
    }

    pub fn with_y(mut self, column: impl Into<String>) -> Self {
        self.y_axis = Some(column.into());
        self
    }

    pub fn with_z(mut self, column: impl Into<String>) -> Self {
        self.z_axis = Some(column.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.extra.insert(name.into(), value);
        self
    }
}

/// Why a candidate configuration is not yet renderable
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", content = "detail", rename_all = "snake_case")]
pub enum ConfigIssue {
    MissingTitle,
    MissingXAxis,
    MissingYAxis,
    MissingZAxis,
    MissingField(String),
    /// A role is bound to a column outside its domain
    IncompatibleColumn { role: String, column: String, expected: Domain },
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigIssue::MissingTitle => f.write_str("title is required"),
            ConfigIssue::MissingXAxis => f.write_str("X axis is required"),
            ConfigIssue::MissingYAxis => f.write_str("Y axis is required"),
            ConfigIssue::MissingZAxis => f.write_str("Z axis is required"),
            ConfigIssue::MissingField(name) => write!(f, "{} is required", name),
            ConfigIssue::IncompatibleColumn { role, column, expected } => {
                write!(f, "column {:?} does not fit {} (expected {:?})", column, role, expected)
            }
        }
    }
}

/// Every reason `candidate` is incomplete for `chart_type`.
pub fn validate_config(chart_type: &str, candidate: &ChartCandidate) -> Vec<ConfigIssue> {
    let spec = get_spec(chart_type);
    let mut issues = Vec::new();

    if candidate.title.trim().is_empty() {
        issues.push(ConfigIssue::MissingTitle);
    }
    if spec.requires_x && !is_set(&candidate.x_axis) {
        issues.push(ConfigIssue::MissingXAxis);
    }
    if spec.requires_y && !is_set(&candidate.y_axis) {
        issues.push(ConfigIssue::MissingYAxis);
    }
    if spec.requires_z && spec.supports_z_axis && !is_set(&candidate.z_axis) {
        issues.push(ConfigIssue::MissingZAxis);
    }
    for field in spec.additional_fields.iter().filter(|f| f.required) {
        let present = candidate.extra.get(field.name).is_some_and(|v| !v.is_empty());
        if !present {
            issues.push(ConfigIssue::MissingField(field.name.to_string()));
        }
    }
    issues
}

/// Whether `candidate` satisfies every requirement of `chart_type`.
pub fn is_config_complete(chart_type: &str, candidate: &ChartCandidate) -> bool {
    validate_config(chart_type, candidate).is_empty()
}

/// Check the bound axis columns against the spec's domains.
///
/// Columns missing from `statistics` are reported as incompatible.
pub fn validate_domains(
    chart_type: &str,
    candidate: &ChartCandidate,
    statistics: &TableStatistics,
) -> Vec<ConfigIssue> {
    let spec = get_spec(chart_type);
    let roles = [("x", &candidate.x_axis, spec.x_domain), ("y", &candidate.y_axis, spec.y_domain)];

    roles
        .into_iter()
        .filter_map(|(role, column, domain)| {
            let column = column.as_deref().filter(|c| !c.trim().is_empty())?;
            let fits = statistics
                .get(column)
                .is_some_and(|s| domain.accepts(s.is_numeric, s.inferred_type));
            (!fits).then(|| ConfigIssue::IncompatibleColumn {
                role: role.to_string(),
                column: column.to_string(),
                expected: domain,
            })
        })
        .collect()
}

/// Columns whose statistics fit `domain`, in column order.
pub fn compatible_columns(domain: Domain, statistics: &TableStatistics) -> Vec<&str> {
    statistics
        .iter()
        .filter(|(_, s)| domain.accepts(s.is_numeric, s.inferred_type))
        .map(|(name, _)| name)
        .collect()
}
