//! Configuration store persisted in the synchronized area.

use std::sync::Arc;

use tracing::{info, warn};

use crate::kv::{KvStore, StorageArea};
use promptsync_core::{Config, ConfigProvider, Result};

/// Storage key of the configuration object.
pub const CONFIG_KEY: &str = "config";

/// `ConfigProvider` backed by the key-value store.
///
/// Read-modify-write across callers is not atomic; last save wins.
pub struct StoredConfig {
    kv: Arc<KvStore>,
}

impl StoredConfig {
    pub fn new(kv: Arc<KvStore>) -> Self {
        Self { kv }
    }

    /// Persist the current value so defaults become explicit on first run.
    pub fn ensure_initialized(&self) -> Result<Config> {
        let config = self.load()?;
        self.save(config)
    }
}

impl ConfigProvider for StoredConfig {
    fn load(&self) -> Result<Config> {
        match self.kv.get_raw(StorageArea::Sync, CONFIG_KEY)? {
            None => Ok(Config::default()),
            Some(raw) => match serde_json::from_str::<Config>(&raw) {
                Ok(config) => Ok(config.normalized()),
                Err(e) => {
                    warn!("Stored config unreadable, using defaults: {}", e);
                    Ok(Config::default())
                }
            },
        }
    }

    fn save(&self, config: Config) -> Result<Config> {
        let config = config.normalized();
        self.kv.set(StorageArea::Sync, CONFIG_KEY, &config)?;
        info!(
            "Config saved: endpoint={}, autoSync={}, interval={}m",
            config.remote_endpoint, config.auto_sync, config.sync_interval_minutes
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptsync_core::MAX_SYNC_INTERVAL_MINUTES;

    fn provider() -> (StoredConfig, Arc<KvStore>) {
        let kv = Arc::new(KvStore::open_in_memory().unwrap());
        (StoredConfig::new(kv.clone()), kv)
    }

    #[test]
    fn test_load_defaults_when_unset() {
        let (config, _) = provider();
        assert_eq!(config.load().unwrap(), Config::default());
    }

    #[test]
    fn test_save_load_round_trip() {
        let (config, _) = provider();
        let wanted = Config {
            remote_endpoint: "https://sync.example.com/api/v1".into(),
            auto_sync: false,
            sync_interval_minutes: 30,
        };
        let saved = config.save(wanted.clone()).unwrap();
        assert_eq!(saved, wanted);
        assert_eq!(config.load().unwrap(), wanted);
    }

    #[test]
    fn test_partial_stored_value_merges_defaults() {
        let (config, kv) = provider();
        kv.set_raw(StorageArea::Sync, CONFIG_KEY, r#"{"autoSync": false}"#).unwrap();
        let loaded = config.load().unwrap();
        assert!(!loaded.auto_sync);
        assert_eq!(loaded.sync_interval_minutes, 5);
    }

    #[test]
    fn test_oversized_interval_is_capped() {
        let (config, kv) = provider();
        let saved = config
            .save(Config {
                sync_interval_minutes: u64::MAX,
                ..Config::default()
            })
            .unwrap();
        assert_eq!(saved.sync_interval_minutes, MAX_SYNC_INTERVAL_MINUTES);

        // Values written before the cap existed are clamped on load.
        let raw = format!(r#"{{"syncIntervalMinutes": {}}}"#, u64::MAX);
        kv.set_raw(StorageArea::Sync, CONFIG_KEY, &raw).unwrap();
        let loaded = config.load().unwrap();
        assert_eq!(loaded.sync_interval_minutes, MAX_SYNC_INTERVAL_MINUTES);
        assert_eq!(loaded.sync_interval().as_secs(), MAX_SYNC_INTERVAL_MINUTES * 60);
    }

    #[test]
    fn test_config_is_not_a_history_entry() {
        let (config, kv) = provider();
        config.ensure_initialized().unwrap();
        assert_eq!(kv.count(StorageArea::Local).unwrap(), 0);
        assert_eq!(kv.count(StorageArea::Sync).unwrap(), 1);
    }
}
