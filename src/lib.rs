//! Databoard engine
//!
//! The data core of a dashboard workbench: a normalized [`Table`] model,
//! per-column statistics, a declarative transformation pipeline and the
//! chart-compatibility rules dashboards check before rendering a widget.
//!
//! ## Query/command surface
//!
//! - [`compute_statistics`]: per-column counts and numeric summaries
//! - [`run`]: apply a [`PipelineConfig`] and get a [`TransformResult`]
//! - [`get_spec`] / [`is_config_complete`]: chart requirements
//!
//! Ingestion, export, persistence and AI insights are collaborator
//! contracts around that core.

pub mod charts;
pub mod constants;
pub mod data;
pub mod export;
pub mod insights;
pub mod perf;
pub mod persistence;
pub mod pipeline;
pub mod settings;
pub mod types;

pub use charts::{get_spec, is_config_complete, ChartCandidate, ChartSpec, ChartType};
pub use data::{compute_statistics, ColumnStatistics, DataError, DataResult, TableStatistics};
pub use pipeline::{run, Pipeline, PipelineConfig, TransformResult};
pub use settings::EngineSettings;
pub use types::{CellValue, Record, Table};

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber filtered by `RUST_LOG` (default `databoard=info`).
///
/// Safe to call more than once; only the first call installs anything.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("databoard=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
