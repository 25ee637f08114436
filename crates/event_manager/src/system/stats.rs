/// Event manager statistics
use crate::worker::WorkerState;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time statistics for an event manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventManagerStats {
    /// Currently active direct subscriptions
    pub direct_subscriptions: usize,
    /// Currently active queued subscriptions
    pub queued_subscriptions: usize,
    /// Subscriptions ever created
    pub total_subscribed: u64,
    /// Successful unsubscribes
    pub total_unsubscribed: u64,
    /// Calls to `dispatch`
    pub events_dispatched: u64,
    /// Entries accepted by the queue
    pub events_enqueued: u64,
    /// Queued entries popped and delivered
    pub events_delivered: u64,
    /// Individual listener calls on both paths
    pub listener_invocations: u64,
    /// Queued listener calls that panicked
    pub listener_panics: u64,
    /// Entries rejected because the bounded queue was full
    pub events_rejected: u64,
    /// Entries still pending when the manager shut down
    pub events_discarded: u64,
    /// Entries waiting in the queue right now
    pub queue_depth: usize,
    /// Dispatch worker state
    pub worker_state: WorkerState,
}

/// Lock-free counters updated on the hot paths.
#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    pub total_subscribed: AtomicU64,
    pub total_unsubscribed: AtomicU64,
    pub events_dispatched: AtomicU64,
    pub events_enqueued: AtomicU64,
    pub events_delivered: AtomicU64,
    pub listener_invocations: AtomicU64,
    pub listener_panics: AtomicU64,
    pub events_rejected: AtomicU64,
    pub events_discarded: AtomicU64,
}

impl StatsCounters {
    #[inline]
    pub fn add(counter: &AtomicU64, value: u64) {
        counter.fetch_add(value, Ordering::Relaxed);
    }

    #[inline]
    pub fn incr(counter: &AtomicU64) {
        Self::add(counter, 1);
    }

    pub fn load(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}
