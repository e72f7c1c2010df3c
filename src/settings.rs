//! Engine settings.
//!
//! Stored as JSON. Missing fields take their defaults, so a settings file
//! written by an older build still loads.

use crate::constants::{
    DEFAULT_PERSISTENCE_TTL_DAYS, MAX_FORMULA_DEPTH, MAX_FORMULA_LENGTH, SLOW_STAGE_WARN_MS,
};
use crate::data::{compute_statistics_capped, StatisticsSummary};
use crate::types::Table;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    /// Rows examined when precomputing statistics; `None` examines all
    pub statistics_row_cap: Option<usize>,
    pub persistence_ttl_days: u64,
    pub slow_stage_warn_ms: f64,
    pub max_formula_length: usize,
    pub max_formula_depth: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            statistics_row_cap: None,
            persistence_ttl_days: DEFAULT_PERSISTENCE_TTL_DAYS,
            slow_stage_warn_ms: SLOW_STAGE_WARN_MS,
            max_formula_length: MAX_FORMULA_LENGTH,
            max_formula_depth: MAX_FORMULA_DEPTH,
        }
    }
}

impl EngineSettings {
    /// `<config dir>/databoard/settings.json`
    pub fn default_settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("databoard").join("settings.json"))
    }

    /// Precompute statistics over at most `statistics_row_cap` rows.
    pub fn precompute_statistics(&self, table: &Table) -> StatisticsSummary {
        compute_statistics_capped(table, self.statistics_row_cap)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("read settings {}", path.display()))?;
        let settings = serde_json::from_str(&content)
            .with_context(|| format!("parse settings {}", path.display()))?;
        debug!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    /// Load `path`, falling back to defaults when it is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|err| {
            warn!(error = %format!("{:#}", err), "using default settings");
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("create settings directory {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("serialize settings")?;
        fs::write(path, json).with_context(|| format!("write settings {}", path.display()))?;
        Ok(())
    }
}
