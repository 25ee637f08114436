//! Error types for the event manager.

use thiserror::Error;

/// Errors surfaced by the event manager's fallible operations.
///
/// Unsubscribing an unknown handle and publishing an event nobody listens to
/// are deliberately *not* errors; see `EventManager::unsubscribe`.
#[derive(Error, Debug)]
pub enum EventError {
    #[error("Event queue is full (capacity {capacity})")]
    QueueFull { capacity: usize },
    #[error("Event manager has been shut down")]
    ShutDown,
    #[error("Failed to spawn dispatch worker: {0}")]
    WorkerSpawn(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
