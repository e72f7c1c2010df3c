//! Contract with the AI insights collaborator.
//!
//! The collaborator only ever sees column statistics, table dimensions and
//! a handful of sample rows, never the full dataset.

use crate::constants::INSIGHT_SAMPLE_ROWS;
use crate::data::{compute_statistics_capped, TableStatistics};
use crate::settings::EngineSettings;
use crate::types::{Record, Table};
use serde::{Deserialize, Serialize};

/// Summary sent to the insights collaborator
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightRequest {
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<String>,
    pub statistics: TableStatistics,
    pub sample_rows: Vec<Record>,
}

impl InsightRequest {
    pub fn from_table(table: &Table) -> Self {
        Self::from_table_capped(table, None)
    }

    /// Build the request honouring the configured statistics row cap.
    pub fn with_settings(table: &Table, settings: &EngineSettings) -> Self {
        Self::from_table_capped(table, settings.statistics_row_cap)
    }

    /// Build the request, computing statistics over at most `row_cap` rows.
    pub fn from_table_capped(table: &Table, row_cap: Option<usize>) -> Self {
        let summary = compute_statistics_capped(table, row_cap);
        Self {
            row_count: table.row_count(),
            column_count: table.column_count(),
            columns: table.columns().to_vec(),
            statistics: summary.columns,
            sample_rows: table.rows().iter().take(INSIGHT_SAMPLE_ROWS).cloned().collect(),
        }
    }
}

/// One finding returned by the collaborator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub columns: Vec<String>,
}

/// Remote insight generation
pub trait InsightProvider {
    fn generate(&self, request: &InsightRequest) -> anyhow::Result<Vec<Insight>>;
}
