//! Runtime configuration for an [`EventManager`](crate::EventManager).

use crate::error::EventError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_poll_interval_ms() -> u64 {
    10
}

fn default_worker_thread_name() -> String {
    "event-dispatch".to_string()
}

fn default_spawn_worker() -> bool {
    true
}

/// Settings controlling the queued delivery path.
///
/// Every field has a serde default, so an empty TOML table deserializes to
/// [`EventManagerConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventManagerConfig {
    /// Upper bound on how long the worker sleeps before re-checking the queue
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Maximum number of pending queued events; `None` means unbounded
    #[serde(default)]
    pub queue_capacity: Option<usize>,
    /// Name given to the dispatch worker thread
    #[serde(default = "default_worker_thread_name")]
    pub worker_thread_name: String,
    /// Whether to start a background worker. When disabled the owner drains
    /// the queue itself through `EventManager::process`.
    #[serde(default = "default_spawn_worker")]
    pub spawn_worker: bool,
}

impl Default for EventManagerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            queue_capacity: None,
            worker_thread_name: default_worker_thread_name(),
            spawn_worker: default_spawn_worker(),
        }
    }
}

impl EventManagerConfig {
    /// Configuration for an application that drains the queue on its own
    /// thread, e.g. once per frame.
    pub fn manual() -> Self {
        Self {
            spawn_worker: false,
            ..Self::default()
        }
    }

    /// Worker wait timeout as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Checks the values the manager cannot work with.
    pub fn validate(&self) -> Result<(), EventError> {
        if self.poll_interval_ms == 0 {
            return Err(EventError::InvalidConfig(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.queue_capacity == Some(0) {
            return Err(EventError::InvalidConfig(
                "queue_capacity must be greater than zero when set".to_string(),
            ));
        }
        if self.spawn_worker && self.worker_thread_name.trim().is_empty() {
            return Err(EventError::InvalidConfig(
                "worker_thread_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EventManagerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.poll_interval(), Duration::from_millis(10));
        assert!(config.spawn_worker);
        assert_eq!(config.queue_capacity, None);
    }

    #[test]
    fn test_rejects_zero_values() {
        let config = EventManagerConfig {
            poll_interval_ms: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(EventError::InvalidConfig(_))));

        let config = EventManagerConfig {
            queue_capacity: Some(0),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(EventError::InvalidConfig(_))));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: EventManagerConfig = serde_json::from_str(r#"{"queue_capacity": 64}"#).unwrap();
        assert_eq!(config.queue_capacity, Some(64));
        assert_eq!(config.poll_interval_ms, 10);
        assert_eq!(config.worker_thread_name, "event-dispatch");
    }
}
