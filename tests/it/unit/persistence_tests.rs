//! Unit tests for settings files and the file-backed store.

use databoard::constants::MS_PER_DAY;
use databoard::persistence::{FileStore, KeyValueStore, Persistence, PIPELINE_CONFIG_KEY};
use databoard::pipeline::{FilterOperator, FilterRule, PipelineConfig, SortOrder};
use databoard::settings::EngineSettings;
use tempfile::TempDir;

#[test]
fn test_settings_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("settings.json");

    let settings = EngineSettings {
        statistics_row_cap: Some(10_000),
        persistence_ttl_days: 3,
        ..EngineSettings::default()
    };
    settings.save(&path).unwrap();

    assert_eq!(EngineSettings::load(&path).unwrap(), settings);
}

#[test]
fn test_settings_fall_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.json");
    assert_eq!(EngineSettings::load_or_default(&missing), EngineSettings::default());

    let broken = dir.path().join("broken.json");
    std::fs::write(&broken, "{ not json").unwrap();
    assert!(EngineSettings::load(&broken).is_err());
    assert_eq!(EngineSettings::load_or_default(&broken), EngineSettings::default());
}

#[test]
fn test_file_store_basic_operations() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path().join("store"));

    assert_eq!(store.keys().unwrap(), Vec::<String>::new());
    assert_eq!(store.get("a").unwrap(), None);

    store.set("a", "1").unwrap();
    store.set("b", "2").unwrap();
    store.set("a", "3").unwrap();
    assert_eq!(store.get("a").unwrap().as_deref(), Some("3"));
    assert_eq!(store.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);

    store.remove("a").unwrap();
    store.remove("a").unwrap();
    assert_eq!(store.keys().unwrap(), vec!["b".to_string()]);
}

#[test]
fn test_pipeline_config_persists_until_ttl() {
    let dir = TempDir::new().unwrap();
    let persistence = Persistence::new(FileStore::new(dir.path()));
    let config = PipelineConfig::new()
        .with_filter(FilterRule::new("age", FilterOperator::GreaterThan, 30.0))
        .with_sort("age", SortOrder::Desc);

    persistence.save_at(PIPELINE_CONFIG_KEY, &config, 0).unwrap();
    assert!(dir.path().join("pipeline_config.json").exists());

    let restored: Option<PipelineConfig> =
        persistence.load_at(PIPELINE_CONFIG_KEY, 6 * MS_PER_DAY).unwrap();
    assert_eq!(restored, Some(config));

    let expired: Option<PipelineConfig> =
        persistence.load_at(PIPELINE_CONFIG_KEY, 8 * MS_PER_DAY).unwrap();
    assert_eq!(expired, None);
    assert!(!dir.path().join("pipeline_config.json").exists());
}

#[test]
fn test_ttl_comes_from_settings() {
    let settings = EngineSettings {
        persistence_ttl_days: 2,
        ..EngineSettings::default()
    };
    let persistence = Persistence::from_settings(databoard::persistence::MemoryStore::new(), &settings);
    assert_eq!(persistence.ttl_ms(), 2 * MS_PER_DAY);
}
