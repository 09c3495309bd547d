use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::sync::SyncOptions;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    store: StoreConfig,
    #[serde(default)]
    sync: SyncConfig,
}

#[derive(Deserialize, Default)]
struct StoreConfig {
    database_path: Option<PathBuf>,
    busy_timeout_ms: Option<u64>,
}

#[derive(Deserialize, Default)]
struct SyncConfig {
    max_concurrent_requests: Option<usize>,
}

pub struct Config {
    store: StoreConfig,
    sync: SyncConfig,
}

impl Config {
    /// Embedded defaults, with the user's config file merged on top.
    pub fn load() -> Self {
        let mut config = Self::embedded();

        if let Some(path) = user_config_path() {
            if path.exists() {
                match std::fs::read_to_string(&path) {
                    Ok(contents) => {
                        if let Err(e) = config.merge_str(&contents) {
                            log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                        }
                    }
                    Err(e) => {
                        log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
                    }
                }
            }
        }

        config
    }

    /// Only the built-in defaults.
    pub fn embedded() -> Self {
        let base: ConfigFile = toml::from_str(DEFAULT_CONFIG).unwrap_or_else(|e| {
            log::error!(target: "config", "embedded config.toml is invalid: {}", e);
            ConfigFile::default()
        });
        Config {
            store: base.store,
            sync: base.sync,
        }
    }

    /// Merge TOML overrides key by key; keys absent from `contents` keep
    /// their current value.
    pub fn merge_str(&mut self, contents: &str) -> Result<(), toml::de::Error> {
        let user: ConfigFile = toml::from_str(contents)?;
        merge_store(&mut self.store, user.store);
        merge_sync(&mut self.sync, user.sync);
        Ok(())
    }

    /// Path of the workstation database.
    pub fn database_path(&self) -> PathBuf {
        self.store.database_path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("beets")
                .join("workstation.sqlite")
        })
    }

    /// How long SQLite waits on a locked database (clamped to 0..=60s).
    pub fn busy_timeout(&self) -> Duration {
        let ms = self
            .store
            .busy_timeout_ms
            .unwrap_or(DEFAULT_BUSY_TIMEOUT_MS)
            .min(60_000);
        Duration::from_millis(ms)
    }

    /// Maximum store calls in flight per sync phase (clamped to 1..=64).
    pub fn max_concurrent_requests(&self) -> usize {
        self.sync
            .max_concurrent_requests
            .unwrap_or(SyncOptions::default().max_concurrent_requests)
            .clamp(1, 64)
    }

    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            max_concurrent_requests: self.max_concurrent_requests(),
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("beets").join("config.toml"))
}

fn merge_store(base: &mut StoreConfig, user: StoreConfig) {
    if user.database_path.is_some() {
        base.database_path = user.database_path;
    }
    if user.busy_timeout_ms.is_some() {
        base.busy_timeout_ms = user.busy_timeout_ms;
    }
}

fn merge_sync(base: &mut SyncConfig, user: SyncConfig) {
    if user.max_concurrent_requests.is_some() {
        base.max_concurrent_requests = user.max_concurrent_requests;
    }
}
