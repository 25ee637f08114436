//! Configuration management for the event monitor.
//!
//! This module handles loading and validation of the monitor configuration
//! from TOML files, and applying command-line overrides on top of it.

use crate::cli::CliArgs;
use anyhow::{bail, Result};
use event_manager::EventManagerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Monitor configuration loaded from a TOML file.
///
/// Every section is optional; a missing section takes its defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Settings handed straight to the event manager
    #[serde(default)]
    pub manager: EventManagerConfig,
    /// Synthetic event producers
    #[serde(default)]
    pub producers: ProducerSettings,
    /// Logging configuration settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Synthetic producer configuration.
///
/// Each producer task emits one tick per interval, plus input events on a
/// fixed cadence relative to its tick counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProducerSettings {
    /// Number of concurrent producer tasks
    #[serde(default = "default_producer_threads")]
    pub threads: usize,
    /// Ticks emitted by each producer before it stops (0 means unlimited)
    #[serde(default)]
    pub events_per_thread: u64,
    /// Delay between ticks in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Seconds between statistics reports (0 to disable)
    #[serde(default = "default_stats_interval_secs")]
    pub stats_interval_secs: u64,
}

fn default_producer_threads() -> usize {
    2
}

fn default_interval_ms() -> u64 {
    16
}

fn default_stats_interval_secs() -> u64 {
    5
}

impl Default for ProducerSettings {
    fn default() -> Self {
        Self {
            threads: default_producer_threads(),
            events_per_thread: 0,
            interval_ms: default_interval_ms(),
            stats_interval_secs: default_stats_interval_secs(),
        }
    }
}

/// Logging system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Whether to output logs in JSON format
    #[serde(default)]
    pub json_format: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl MonitorConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, writes a default configuration file at the
    /// specified path and returns the defaults.
    pub async fn load_from_file(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            let config: MonitorConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let default_config = MonitorConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            info!("📝 Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Applies command-line overrides.
    pub fn apply_cli(&mut self, args: &CliArgs) {
        if let Some(level) = &args.log_level {
            self.logging.level = level.clone();
        }
        if args.json_logs {
            self.logging.json_format = true;
        }
    }

    /// Validates the configuration for consistency and correctness.
    pub fn validate(&self) -> Result<()> {
        self.manager.validate()?;

        if self.producers.interval_ms == 0 {
            bail!("producers.interval_ms must be greater than zero");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};
    use tokio::fs;

    #[test]
    fn test_monitor_config_default() {
        let config = MonitorConfig::default();
        assert_eq!(config.manager, EventManagerConfig::default());
        assert_eq!(config.producers.threads, 2);
        assert_eq!(config.producers.events_per_thread, 0);
        assert_eq!(config.producers.interval_ms, 16);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json_format);
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_load_from_nonexistent_file_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("event_monitor.toml");

        let config = MonitorConfig::load_from_file(&path).await.unwrap();
        assert_eq!(config.producers.threads, 2);
        assert!(path.exists());

        // the written file loads back to the same settings
        let reloaded = MonitorConfig::load_from_file(&path).await.unwrap();
        assert_eq!(reloaded.manager, config.manager);
        assert_eq!(reloaded.producers.interval_ms, config.producers.interval_ms);
    }

    #[tokio::test]
    async fn test_load_from_existing_file() {
        let toml_content = r#"
[manager]
poll_interval_ms = 25
queue_capacity = 512
worker_thread_name = "input-dispatch"

[producers]
threads = 4
events_per_thread = 100
interval_ms = 5

[logging]
level = "debug"
json_format = true
"#;

        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), toml_content).await.unwrap();

        let config = MonitorConfig::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.manager.poll_interval_ms, 25);
        assert_eq!(config.manager.queue_capacity, Some(512));
        assert_eq!(config.manager.worker_thread_name, "input-dispatch");
        assert!(config.manager.spawn_worker);
        assert_eq!(config.producers.threads, 4);
        assert_eq!(config.producers.events_per_thread, 100);
        assert_eq!(config.producers.interval_ms, 5);
        assert_eq!(config.producers.stats_interval_secs, 5);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json_format);
    }

    #[tokio::test]
    async fn test_load_rejects_malformed_toml() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), "[producers\nthreads = ").await.unwrap();
        assert!(MonitorConfig::load_from_file(temp_file.path()).await.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = MonitorConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());

        let mut config = MonitorConfig::default();
        config.producers.interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = MonitorConfig::default();
        config.manager.queue_capacity = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = MonitorConfig::default();
        let args = CliArgs {
            log_level: Some("trace".to_string()),
            json_logs: true,
            ..Default::default()
        };
        config.apply_cli(&args);
        assert_eq!(config.logging.level, "trace");
        assert!(config.logging.json_format);
    }
}
