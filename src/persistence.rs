//! Save/restore of pipeline configs and dashboard layouts.
//!
//! Values are JSON-encoded and wrapped as `{ "value": .., "savedAt": ms }`.
//! Reading an entry older than the TTL deletes it and reports nothing
//! stored. The backing store is a plain string key/value map behind the
//! [`KeyValueStore`] trait: [`MemoryStore`] for tests and embedding,
//! [`FileStore`] for one JSON file per key on disk.

use crate::constants::{DEFAULT_PERSISTENCE_TTL_DAYS, MS_PER_DAY};
use crate::settings::EngineSettings;
use anyhow::{bail, Context, Result};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Key for the persisted [`PipelineConfig`](crate::pipeline::PipelineConfig)
pub const PIPELINE_CONFIG_KEY: &str = "pipeline_config";
/// Key for the persisted [`Dashboard`](crate::charts::Dashboard)
pub const DASHBOARD_KEY: &str = "dashboard";
/// Key for the persisted active tab index
pub const ACTIVE_TAB_KEY: &str = "active_tab";

/// Milliseconds since the Unix epoch (0 for clocks before it).
pub fn now_millis() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}

// ============================================================================
// Stores
// ============================================================================

/// String key/value storage
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
    fn keys(&self) -> Result<Vec<String>>;
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.entries.read().keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

/// One `<key>.json` file per key under a root directory
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store under the user's data directory.
    pub fn in_data_dir() -> Result<Self> {
        let base = dirs::data_dir().context("no data directory for this platform")?;
        Ok(Self::new(base.join("databoard").join("store")))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
            && !key.starts_with('.');
        if !valid {
            bail!("invalid store key {:?}", key);
        }
        Ok(self.root.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("read {}", path.display())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root)
            .with_context(|| format!("create store directory {}", self.root.display()))?;

        // Write next to the destination, then rename into place
        let mut tmp = NamedTempFile::new_in(&self.root).context("create temp file")?;
        tmp.write_all(value.as_bytes()).context("write temp file")?;
        tmp.as_file().sync_all().context("sync temp file")?;
        tmp.persist(&path)
            .with_context(|| format!("replace {}", path.display()))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove {}", path.display())),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).with_context(|| format!("list {}", self.root.display())),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

// ============================================================================
// TTL wrapper
// ============================================================================

/// Envelope written for every persisted value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stored<T> {
    pub value: T,
    pub saved_at: u64,
}

/// Typed, expiring access to a [`KeyValueStore`]
#[derive(Debug)]
pub struct Persistence<S> {
    store: S,
    ttl_ms: u64,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self::with_ttl_days(store, DEFAULT_PERSISTENCE_TTL_DAYS)
    }

    pub fn with_ttl_days(store: S, days: u64) -> Self {
        Self {
            store,
            ttl_ms: days.saturating_mul(MS_PER_DAY),
        }
    }

    pub fn from_settings(store: S, settings: &EngineSettings) -> Self {
        Self::with_ttl_days(store, settings.persistence_ttl_days)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn ttl_ms(&self) -> u64 {
        self.ttl_ms
    }

    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.save_at(key, value, now_millis())
    }

    /// Save with an explicit timestamp.
    pub fn save_at<T: Serialize>(&self, key: &str, value: &T, saved_at: u64) -> Result<()> {
        let json = serde_json::to_string(&Stored { value, saved_at })
            .with_context(|| format!("serialize {}", key))?;
        self.store.set(key, &json)
    }

    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.load_at(key, now_millis())
    }

    /// Load as of `now`. Expired or unreadable entries are removed.
    pub fn load_at<T: DeserializeOwned>(&self, key: &str, now: u64) -> Result<Option<T>> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };

        let stored: Stored<T> = match serde_json::from_str(&raw) {
            Ok(stored) => stored,
            Err(err) => {
                warn!(key, %err, "discarding unreadable stored value");
                self.store.remove(key)?;
                return Ok(None);
            }
        };

        if self.is_expired(stored.saved_at, now) {
            debug!(key, saved_at = stored.saved_at, "stored value expired");
            self.store.remove(key)?;
            return Ok(None);
        }
        Ok(Some(stored.value))
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.store.remove(key)
    }

    /// Remove every expired or unreadable entry; returns how many went.
    pub fn purge_expired(&self, now: u64) -> Result<usize> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Stamp {
            saved_at: u64,
        }

        let mut removed = 0;
        for key in self.store.keys()? {
            let Some(raw) = self.store.get(&key)? else {
                continue;
            };
            let keep = serde_json::from_str::<Stamp>(&raw)
                .map(|stamp| !self.is_expired(stamp.saved_at, now))
                .unwrap_or(false);
            if !keep {
                self.store.remove(&key)?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn is_expired(&self, saved_at: u64, now: u64) -> bool {
        now.saturating_sub(saved_at) > self.ttl_ms
    }
}
