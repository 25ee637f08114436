/// Introspection and statistics methods
use super::core::EventManager;
use super::stats::{EventManagerStats, StatsCounters};
use crate::types::{DispatchMode, Event, EventType};
use crate::worker::WorkerState;

impl EventManager {
    /// Number of active `mode` listeners for `T`.
    pub fn listener_count<T: Event>(&self, mode: DispatchMode) -> usize {
        self.shared
            .registry
            .listener_count(EventType::of::<T>(), mode)
    }

    /// Whether any `mode` listener for `T` is active.
    pub fn has_listeners<T: Event>(&self, mode: DispatchMode) -> bool {
        self.listener_count::<T>(mode) > 0
    }

    /// Number of queued events not yet picked up for delivery.
    pub fn queue_len(&self) -> usize {
        self.shared.queue.len()
    }

    /// Maximum queue length, if the queue is bounded.
    pub fn queue_capacity(&self) -> Option<usize> {
        self.shared.queue.capacity()
    }

    /// Current state of the dispatch worker.
    pub fn worker_state(&self) -> WorkerState {
        self.shared.worker_state.get()
    }

    /// Takes a consistent-enough snapshot of the manager's counters.
    pub fn stats(&self) -> EventManagerStats {
        let counts = self.shared.registry.counts();
        let stats = &self.shared.stats;
        EventManagerStats {
            direct_subscriptions: counts.direct,
            queued_subscriptions: counts.queued,
            total_subscribed: StatsCounters::load(&stats.total_subscribed),
            total_unsubscribed: StatsCounters::load(&stats.total_unsubscribed),
            events_dispatched: StatsCounters::load(&stats.events_dispatched),
            events_enqueued: StatsCounters::load(&stats.events_enqueued),
            events_delivered: StatsCounters::load(&stats.events_delivered),
            listener_invocations: StatsCounters::load(&stats.listener_invocations),
            listener_panics: StatsCounters::load(&stats.listener_panics),
            events_rejected: StatsCounters::load(&stats.events_rejected),
            events_discarded: StatsCounters::load(&stats.events_discarded),
            queue_depth: self.shared.queue.len(),
            worker_state: self.worker_state(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{DispatchMode, EventManager, EventManagerConfig, WorkerState};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    #[derive(Debug)]
    struct Tick;

    #[test]
    fn test_stats_track_both_paths() {
        let manager = EventManager::new(EventManagerConfig::manual()).unwrap();
        manager.subscribe_direct(|_: &Tick| {});
        manager.subscribe_queued(|_: &Tick| {});
        manager.subscribe_queued(|_: &Tick| {});

        manager.dispatch(Arc::new(Tick));
        manager.enqueue(Arc::new(Tick)).unwrap();
        manager.enqueue(Arc::new(Tick)).unwrap();
        assert_eq!(manager.stats().queue_depth, 2);
        manager.process();

        let stats = manager.stats();
        assert_eq!(stats.direct_subscriptions, 1);
        assert_eq!(stats.queued_subscriptions, 2);
        assert_eq!(stats.events_dispatched, 1);
        assert_eq!(stats.events_enqueued, 2);
        assert_eq!(stats.events_delivered, 2);
        assert_eq!(stats.listener_invocations, 1 + 2 * 2);
        assert_eq!(stats.queue_depth, 0);
        assert_eq!(stats.worker_state, WorkerState::Manual);
    }

    #[test]
    fn test_stats_serialize_to_json() {
        let manager = EventManager::new(EventManagerConfig::manual()).unwrap();
        let json = serde_json::to_value(manager.stats()).unwrap();
        assert_eq!(json["events_dispatched"], 0);
        assert_eq!(json["worker_state"], "Manual");
    }

    #[test]
    fn test_worker_state_transitions() {
        let manager = EventManager::new(EventManagerConfig::default()).unwrap();
        assert!(matches!(
            manager.worker_state(),
            WorkerState::Idle | WorkerState::Draining
        ));
        assert!(!manager.has_listeners::<Tick>(DispatchMode::Queued));

        manager.shutdown();
        let deadline = Instant::now() + Duration::from_secs(1);
        while manager.worker_state() != WorkerState::Stopped && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(manager.worker_state(), WorkerState::Stopped);
        assert!(manager.is_shut_down());
    }
}
