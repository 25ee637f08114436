//! # Utility Functions
//!
//! Timestamp generation shared by the standard events, and the factory used
//! by applications that share one manager across threads.

use crate::config::EventManagerConfig;
use crate::error::EventError;
use crate::system::EventManager;
use std::sync::Arc;

/// Milliseconds since the Unix epoch, or 0 if the system clock reads earlier.
pub fn current_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

/// Creates an event manager ready to be shared across threads.
///
/// # Examples
///
/// ```rust
/// use event_manager::*;
///
/// let events = create_event_manager(EventManagerConfig::default())?;
/// events.subscribe_queued(|event: &AppTickEvent| {
///     println!("tick {}", event.tick);
/// });
/// events.enqueue(std::sync::Arc::new(AppTickEvent::new(1)))?;
/// # Ok::<(), EventError>(())
/// ```
pub fn create_event_manager(config: EventManagerConfig) -> Result<Arc<EventManager>, EventError> {
    Ok(Arc::new(EventManager::new(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_is_monotonic_enough() {
        let a = current_timestamp();
        let b = current_timestamp();
        assert!(a > 0);
        assert!(b >= a);
    }

    #[test]
    fn test_factory_rejects_invalid_config() {
        let config = EventManagerConfig {
            poll_interval_ms: 0,
            ..Default::default()
        };
        assert!(matches!(
            create_event_manager(config),
            Err(EventError::InvalidConfig(_))
        ));
    }
}
