//! Pipeline orchestrator.
//!
//! Runs the engines in a fixed order:
//!
//! 1. type conversions
//! 2. calculated columns
//! 3. validation rules
//! 4. search and filters
//! 5. grouping / aggregation
//! 6. sorting
//! 7. sampling
//!
//! The input table is never modified. Per-row failures are absorbed by the
//! stages themselves, so a run always produces a result.

use crate::constants::SLOW_STAGE_WARN_MS;
use crate::perf::StageTimer;
use crate::pipeline::calculated::apply_calculated_columns;
use crate::pipeline::config::{PipelineConfig, TransformResult};
use crate::pipeline::convert::apply_conversions;
use crate::pipeline::filter::apply_filters;
use crate::pipeline::formula::FormulaLimits;
use crate::pipeline::group::apply_grouping;
use crate::pipeline::sample::apply_sampling_with_rng;
use crate::pipeline::sort::apply_sorting;
use crate::pipeline::validation::apply_validation_rules;
use crate::settings::EngineSettings;
use crate::types::{Record, Table};
use rand::Rng;
use tracing::{debug, info_span};

/// A configured pipeline runner
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pipeline {
    limits: FormulaLimits,
    slow_stage_warn_ms: f64,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            limits: FormulaLimits::default(),
            slow_stage_warn_ms: SLOW_STAGE_WARN_MS,
        }
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner honouring the formula sandbox limits and slow-stage threshold
    /// of `settings`.
    pub fn with_settings(settings: &EngineSettings) -> Self {
        Self {
            limits: FormulaLimits {
                max_length: settings.max_formula_length,
                max_depth: settings.max_formula_depth,
            },
            slow_stage_warn_ms: settings.slow_stage_warn_ms,
        }
    }

    pub fn formula_limits(&self) -> FormulaLimits {
        self.limits
    }

    /// Apply `config` to `table`.
    pub fn run(&self, table: &Table, config: &PipelineConfig) -> TransformResult {
        self.run_with_rng(table, config, &mut rand::thread_rng())
    }

    /// [`run`](Self::run) with a caller-supplied RNG for random sampling.
    pub fn run_with_rng<R: Rng + ?Sized>(
        &self,
        table: &Table,
        config: &PipelineConfig,
        rng: &mut R,
    ) -> TransformResult {
        let _span = info_span!("pipeline", rows = table.row_count()).entered();
        let mut rows: Vec<Record> = table.rows().to_vec();

        rows = self.stage("conversions", rows, |rows| {
            apply_conversions(rows, &config.data_type_conversions)
        });
        rows = self.stage("calculated_columns", rows, |rows| {
            apply_calculated_columns(rows, table.columns(), &config.calculated_columns, self.limits)
        });
        rows = self.stage("validation", rows, |rows| {
            apply_validation_rules(rows, &config.validation_rules)
        });
        rows = self.stage("filters", rows, |rows| {
            apply_filters(rows, &config.search_term, &config.filters)
        });
        rows = self.stage("grouping", rows, |rows| {
            apply_grouping(rows, config.active_group_by(), &config.aggregations)
        });
        rows = self.stage("sorting", rows, |rows| {
            apply_sorting(rows, config.active_sort_by(), config.sort_order)
        });
        rows = self.stage("sampling", rows, |rows| {
            apply_sampling_with_rng(
                rows,
                config.active_sample_size(),
                config.active_sort_by().is_some(),
                rng,
            )
        });

        let columns = match rows.first() {
            Some(first) => first.keys().map(str::to_string).collect(),
            None => table.columns().to_vec(),
        };
        let filtered_row_count = rows.len();

        debug!(
            original = table.row_count(),
            filtered = filtered_row_count,
            columns = columns.len(),
            "pipeline finished"
        );

        TransformResult {
            table: Table::from_parts(columns, rows),
            original_row_count: table.row_count(),
            filtered_row_count,
            applied_config: config.clone(),
        }
    }

    fn stage(
        &self,
        name: &'static str,
        rows: Vec<Record>,
        apply: impl FnOnce(Vec<Record>) -> Vec<Record>,
    ) -> Vec<Record> {
        let _timer = StageTimer::new(name, self.slow_stage_warn_ms);
        let before = rows.len();
        let rows = apply(rows);
        debug!(stage = name, before, after = rows.len(), "stage applied");
        rows
    }
}

/// Apply `config` to `table` with default settings.
pub fn run(table: &Table, config: &PipelineConfig) -> TransformResult {
    Pipeline::default().run(table, config)
}
