/// Subscription management methods
use super::core::EventManager;
use super::stats::StatsCounters;
use crate::registry::{EventListener, TypedListener};
use crate::types::{DispatchMode, Event, EventType, SubscriptionHandle};
use std::sync::Arc;

impl EventManager {
    /// Subscribes `callback` to every [`dispatch`](Self::dispatch) of a `T`.
    ///
    /// The callback runs synchronously on the dispatching thread, after every
    /// direct listener of `T` that subscribed before it.
    ///
    /// ```rust
    /// # use event_manager::{EventManager, EventManagerConfig, WindowResizeEvent};
    /// # let manager = EventManager::new(EventManagerConfig::manual())?;
    /// let handle = manager.subscribe_direct(|event: &WindowResizeEvent| {
    ///     println!("resized to {}x{}", event.width, event.height);
    /// });
    /// assert!(handle.is_valid());
    /// # Ok::<(), event_manager::EventError>(())
    /// ```
    pub fn subscribe_direct<T, F>(&self, callback: F) -> SubscriptionHandle
    where
        T: Event,
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.subscribe(DispatchMode::Direct, callback)
    }

    /// Subscribes `callback` to every queued `T`, delivered by the worker in
    /// priority order.
    pub fn subscribe_queued<T, F>(&self, callback: F) -> SubscriptionHandle
    where
        T: Event,
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.subscribe(DispatchMode::Queued, callback)
    }

    /// Subscribes `callback` to `T` in the given mode.
    pub fn subscribe<T, F>(&self, mode: DispatchMode, callback: F) -> SubscriptionHandle
    where
        T: Event,
        F: Fn(&T) + Send + Sync + 'static,
    {
        let listener_name = format!("{}::{}", mode, T::type_name());
        let listener: Arc<dyn EventListener> = Arc::new(TypedListener::new(listener_name, callback));

        let handle = self
            .shared
            .registry
            .register(EventType::of::<T>(), mode, listener);
        StatsCounters::incr(&self.shared.stats.total_subscribed);
        handle
    }

    /// Removes a subscription.
    ///
    /// Returns `false`, with a warning in the log, for
    /// [`SubscriptionHandle::INVALID`] or any handle that is not active, e.g.
    /// one already unsubscribed. Calling it twice on the same handle returns
    /// `true` then `false`.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        let removed = self.shared.registry.unregister(handle);
        if removed {
            StatsCounters::incr(&self.shared.stats.total_unsubscribed);
        }
        removed
    }

    /// Removes every direct and queued subscription for `T`, returning how
    /// many were removed.
    pub fn unsubscribe_all<T: Event>(&self) -> usize {
        let removed = self.shared.registry.unregister_type(EventType::of::<T>());
        StatsCounters::add(&self.shared.stats.total_unsubscribed, removed as u64);
        removed
    }
}

#[cfg(test)]
mod tests {
    use crate::{DispatchMode, EventManager, EventManagerConfig, SubscriptionHandle};
    use std::collections::HashSet;

    #[derive(Debug)]
    struct Alpha;

    #[derive(Debug)]
    struct Beta;

    #[test]
    fn test_handles_are_unique_and_valid() {
        let manager = EventManager::new(EventManagerConfig::manual()).unwrap();
        let mut seen = HashSet::new();
        for i in 0..100 {
            let handle = if i % 2 == 0 {
                manager.subscribe_direct(|_: &Alpha| {})
            } else {
                manager.subscribe_queued(|_: &Beta| {})
            };
            assert!(handle.is_valid());
            assert!(seen.insert(handle));
        }
        assert_eq!(seen.len(), 100);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let manager = EventManager::new(EventManagerConfig::manual()).unwrap();
        let handle = manager.subscribe_queued(|_: &Alpha| {});

        assert!(manager.unsubscribe(handle));
        assert!(!manager.unsubscribe(handle));
        assert!(!manager.unsubscribe(SubscriptionHandle::INVALID));

        let stats = manager.stats();
        assert_eq!(stats.total_subscribed, 1);
        assert_eq!(stats.total_unsubscribed, 1);
    }

    #[test]
    fn test_unsubscribe_all_only_touches_one_type() {
        let manager = EventManager::new(EventManagerConfig::manual()).unwrap();
        manager.subscribe_direct(|_: &Alpha| {});
        manager.subscribe_queued(|_: &Alpha| {});
        let beta = manager.subscribe(DispatchMode::Queued, |_: &Beta| {});

        assert_eq!(manager.unsubscribe_all::<Alpha>(), 2);
        assert_eq!(manager.listener_count::<Alpha>(DispatchMode::Direct), 0);
        assert!(manager.has_listeners::<Beta>(DispatchMode::Queued));
        assert!(manager.unsubscribe(beta));
    }
}
