//! Data transformation pipeline
//!
//! A [`PipelineConfig`] describes conversions, calculated columns,
//! validation, filters, grouping, sorting and sampling. [`run`] applies it to
//! a [`Table`](crate::types::Table) and returns a fresh
//! [`TransformResult`]; each engine is also usable on its own.

mod calculated;
pub mod config;
mod convert;
mod filter;
pub mod formula;
mod group;
mod orchestrator;
mod sample;
mod sort;
mod validation;

pub use calculated::apply_calculated_columns;
pub use config::*;
pub use convert::apply_conversions;
pub use filter::apply_filters;
pub use formula::{Formula, FormulaError, FormulaLimits};
pub use group::apply_grouping;
pub use orchestrator::{run, Pipeline};
pub use sample::{apply_sampling, apply_sampling_with_rng};
pub use sort::apply_sorting;
pub use validation::apply_validation_rules;
