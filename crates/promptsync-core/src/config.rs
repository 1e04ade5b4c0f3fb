//! Sync configuration, the provider seam, and process settings.

use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DEFAULT_REMOTE_ENDPOINT: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_SYNC_INTERVAL_MINUTES: u64 = 5;
/// Upper bound on the sync interval: one week.
pub const MAX_SYNC_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

/// User-facing sync settings. Missing fields fall back to defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "remoteEndpoint", default = "default_endpoint")]
    pub remote_endpoint: String,
    #[serde(rename = "autoSync", default = "default_true")]
    pub auto_sync: bool,
    #[serde(rename = "syncIntervalMinutes", default = "default_interval")]
    pub sync_interval_minutes: u64,
}

fn default_endpoint() -> String {
    DEFAULT_REMOTE_ENDPOINT.into()
}
fn default_true() -> bool {
    true
}
fn default_interval() -> u64 {
    DEFAULT_SYNC_INTERVAL_MINUTES
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote_endpoint: default_endpoint(),
            auto_sync: true,
            sync_interval_minutes: DEFAULT_SYNC_INTERVAL_MINUTES,
        }
    }
}

impl Config {
    /// Trim the endpoint's trailing slash and clamp the interval to
    /// `1..=MAX_SYNC_INTERVAL_MINUTES`.
    pub fn normalized(mut self) -> Self {
        let endpoint = self.remote_endpoint.trim().trim_end_matches('/');
        self.remote_endpoint = if endpoint.is_empty() {
            default_endpoint()
        } else {
            endpoint.to_string()
        };
        self.sync_interval_minutes = clamp_interval(self.sync_interval_minutes);
        self
    }

    pub fn sync_interval(&self) -> std::time::Duration {
        let minutes = clamp_interval(self.sync_interval_minutes);
        std::time::Duration::from_secs(minutes.saturating_mul(60))
    }
}

fn clamp_interval(minutes: u64) -> u64 {
    minutes.clamp(1, MAX_SYNC_INTERVAL_MINUTES)
}

/// Source of the current configuration, injected into consumers.
///
/// `load` returns an owned copy; nothing outside the provider holds a
/// mutable reference to the stored value.
pub trait ConfigProvider: Send + Sync {
    fn load(&self) -> Result<Config>;

    /// Persist `config` and return the value as stored.
    fn save(&self, config: Config) -> Result<Config>;
}

/// In-memory provider, used by tests and embedders with static settings.
#[derive(Debug, Default)]
pub struct FixedConfig {
    inner: RwLock<Config>,
}

impl FixedConfig {
    pub fn new(config: Config) -> Self {
        Self {
            inner: RwLock::new(config.normalized()),
        }
    }

    /// Defaults with the given endpoint and auto-sync flag.
    pub fn with_endpoint(endpoint: impl Into<String>, auto_sync: bool) -> Self {
        Self::new(Config {
            remote_endpoint: endpoint.into(),
            auto_sync,
            ..Config::default()
        })
    }
}

impl ConfigProvider for FixedConfig {
    fn load(&self) -> Result<Config> {
        Ok(self.inner.read().clone())
    }

    fn save(&self, config: Config) -> Result<Config> {
        let config = config.normalized();
        *self.inner.write() = config.clone();
        Ok(config)
    }
}

/// Paths to PromptSync data files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Key-value database (`data/promptsync.db`).
    pub database: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates it if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            database: root.join("promptsync.db"),
            root,
        })
    }
}

/// Settings for the background process binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Local bridge port.
    pub port: u16,
    pub data_paths: DataPaths,
}

impl ServerSettings {
    /// Create settings from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3004);

        Ok(Self {
            port,
            data_paths: DataPaths::new(data_dir)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_merges_defaults() {
        let config: Config = serde_json::from_str(r#"{"autoSync": false}"#).unwrap();
        assert!(!config.auto_sync);
        assert_eq!(config.remote_endpoint, DEFAULT_REMOTE_ENDPOINT);
        assert_eq!(config.sync_interval_minutes, 5);
    }

    #[test]
    fn test_normalized() {
        let config = Config {
            remote_endpoint: "https://example.com/api/v1/".into(),
            auto_sync: true,
            sync_interval_minutes: 0,
        }
        .normalized();
        assert_eq!(config.remote_endpoint, "https://example.com/api/v1");
        assert_eq!(config.sync_interval_minutes, 1);
        assert_eq!(config.sync_interval().as_secs(), 60);
    }

    #[test]
    fn test_huge_interval_is_capped() {
        let raw = Config {
            sync_interval_minutes: u64::MAX,
            ..Config::default()
        };
        assert_eq!(raw.sync_interval().as_secs(), MAX_SYNC_INTERVAL_MINUTES * 60);

        let config = raw.normalized();
        assert_eq!(config.sync_interval_minutes, MAX_SYNC_INTERVAL_MINUTES);

        let provider = FixedConfig::default();
        let saved = provider
            .save(Config {
                sync_interval_minutes: u64::MAX / 2,
                ..Config::default()
            })
            .unwrap();
        assert_eq!(saved.sync_interval_minutes, MAX_SYNC_INTERVAL_MINUTES);
    }

    #[test]
    fn test_fixed_config_round_trip() {
        let provider = FixedConfig::default();
        assert_eq!(provider.load().unwrap(), Config::default());

        let saved = provider
            .save(Config {
                remote_endpoint: "http://backend:9000/v1".into(),
                auto_sync: false,
                sync_interval_minutes: 15,
            })
            .unwrap();
        assert_eq!(provider.load().unwrap(), saved);
        assert!(!provider.load().unwrap().auto_sync);
    }

    #[test]
    fn test_data_paths() {
        let dir = std::env::temp_dir().join(format!("promptsync-paths-{}", std::process::id()));
        let paths = DataPaths::new(&dir).unwrap();
        assert!(paths.root.exists());
        assert_eq!(paths.database, dir.join("promptsync.db"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
