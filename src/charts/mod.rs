//! Chart compatibility rules and dashboard descriptors

pub mod dashboard;
pub mod registry;

pub use dashboard::{Dashboard, Widget, WidgetLayout};
pub use registry::{
    compatible_columns, get_spec, is_config_complete, validate_config, validate_domains,
    AdditionalField, ChartCandidate, ChartSpec, ChartType, ConfigIssue, Domain, FieldKind,
    FieldValue, UnknownChartType,
};
