//! Configuration types for the notification preference service.

use crate::notifications::queue::OverflowPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Preference store settings.
    pub store: StoreConfig,
    /// Notification task queue settings.
    pub queue: QueueConfig,
    /// Notification worker supervision settings.
    pub worker: WorkerConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind (`0` = auto-assign).
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8000,
        }
    }
}

/// Preference store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the SQLite database file.
    pub db_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("notify-prefs.db"),
        }
    }
}

/// Notification task queue configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Maximum number of jobs waiting for the worker.
    pub capacity: usize,
    /// What producers do when the queue is full.
    pub overflow: OverflowPolicy,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: 1024,
            overflow: OverflowPolicy::Reject,
        }
    }
}

/// Notification worker supervision configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Restarts allowed after the worker loop panics before it is left stopped.
    pub max_restarts: u32,
    /// Delay before restarting a panicked worker loop, in milliseconds.
    pub restart_backoff_ms: u64,
}

impl WorkerConfig {
    /// Restart delay as a [`Duration`].
    pub fn restart_backoff(&self) -> Duration {
        Duration::from_millis(self.restart_backoff_ms)
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_restarts: 5,
            restart_backoff_ms: 250,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| crate::error::NotifyError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::NotifyError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.queue.capacity == 0 {
            return Err(crate::error::NotifyError::Config(
                "queue.capacity must be greater than zero".to_owned(),
            ));
        }
        if self.server.host.trim().is_empty() {
            return Err(crate::error::NotifyError::Config(
                "server.host must not be empty".to_owned(),
            ));
        }
        Ok(())
    }

    /// Returns the default config file path: `~/.config/notify-prefs/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config)
                .join("notify-prefs")
                .join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("notify-prefs")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/notify-prefs-config/config.toml")
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ServiceConfig::default();
        config.validate().expect("defaults validate");
        assert_eq!(config.server.port, 8000);
        assert!(config.queue.capacity > 0);
        assert_eq!(config.queue.overflow, OverflowPolicy::Reject);
        assert_eq!(config.worker.restart_backoff(), Duration::from_millis(250));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("nested").join("config.toml");

        let mut config = ServiceConfig::default();
        config.server.port = 9100;
        config.store.db_path = dir.path().join("prefs.db");
        config.queue.capacity = 8;
        config.queue.overflow = OverflowPolicy::Wait;
        config.save_to_file(&path).expect("save");

        let loaded = ServiceConfig::from_file(&path).expect("load");
        assert_eq!(loaded.server.port, 9100);
        assert_eq!(loaded.store.db_path, config.store.db_path);
        assert_eq!(loaded.queue.capacity, 8);
        assert_eq!(loaded.queue.overflow, OverflowPolicy::Wait);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: ServiceConfig = toml::from_str(
            r#"
            [queue]
            overflow = "wait"

            [worker]
            max_restarts = 1
            "#,
        )
        .unwrap();
        assert_eq!(config.queue.overflow, OverflowPolicy::Wait);
        assert_eq!(config.queue.capacity, 1024);
        assert_eq!(config.worker.max_restarts, 1);
        assert_eq!(config.worker.restart_backoff_ms, 250);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[queue]\ncapacity = 0\n").unwrap();

        let err = ServiceConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("queue.capacity"));
    }

    #[test]
    fn unknown_overflow_policy_fails_to_parse() {
        let result: Result<ServiceConfig, _> = toml::from_str("[queue]\noverflow = \"drop\"\n");
        assert!(result.is_err());
    }
}
