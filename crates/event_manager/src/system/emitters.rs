/// Event emission and queue draining methods
use super::core::EventManager;
use super::stats::StatsCounters;
use crate::error::EventError;
use crate::types::{DispatchMode, Event, EventPayload, Priority};
use crate::worker::deliver_queued;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

impl EventManager {
    /// Delivers `event` synchronously to every direct listener of `T`.
    ///
    /// Listeners run on the calling thread in subscription order and have all
    /// finished when this returns. With no listeners this is a cheap no-op.
    /// A panicking listener unwinds into the caller; the manager itself is
    /// unaffected because no lock is held while listeners run.
    #[inline]
    pub fn dispatch<T: Event>(&self, event: Arc<T>) {
        self.dispatch_payload(EventPayload::from_arc(event));
    }

    /// Type-erased form of [`dispatch`](Self::dispatch).
    pub fn dispatch_payload(&self, payload: EventPayload) {
        StatsCounters::incr(&self.shared.stats.events_dispatched);

        let listeners = self
            .shared
            .registry
            .snapshot(payload.event_type(), DispatchMode::Direct);
        if listeners.is_empty() {
            trace!("No direct listeners for {}", payload.event_type());
            return;
        }

        if cfg!(debug_assertions) {
            debug!("📤 Dispatching {} to {} listeners", payload.event_type(), listeners.len());
        }
        for listener in &listeners {
            StatsCounters::incr(&self.shared.stats.listener_invocations);
            listener.invoke(&payload);
        }
    }

    /// Queues `event` at [`Priority::Normal`] for the dispatch worker.
    #[inline]
    pub fn enqueue<T: Event>(&self, event: Arc<T>) -> Result<(), EventError> {
        self.enqueue_payload(EventPayload::from_arc(event), Priority::default())
    }

    /// Queues `event` at `priority` for the dispatch worker.
    #[inline]
    pub fn enqueue_with_priority<T: Event>(
        &self,
        event: Arc<T>,
        priority: Priority,
    ) -> Result<(), EventError> {
        self.enqueue_payload(EventPayload::from_arc(event), priority)
    }

    /// Type-erased form of [`enqueue_with_priority`](Self::enqueue_with_priority).
    ///
    /// Returns immediately. The entry is queued even if nobody listens yet;
    /// listeners are looked up when the entry is delivered, so a listener
    /// subscribed in between may or may not see it.
    ///
    /// # Errors
    ///
    /// * [`EventError::QueueFull`] if a bounded queue is at capacity
    /// * [`EventError::ShutDown`] once [`shutdown`](Self::shutdown) has begun
    pub fn enqueue_payload(&self, payload: EventPayload, priority: Priority) -> Result<(), EventError> {
        let event_type = payload.event_type();
        match self.shared.queue.push(payload, priority) {
            Ok(sequence) => {
                StatsCounters::incr(&self.shared.stats.events_enqueued);
                trace!("Queued {} at {} priority (seq {})", event_type, priority, sequence);
                Ok(())
            }
            Err(e @ EventError::QueueFull { .. }) => {
                StatsCounters::incr(&self.shared.stats.events_rejected);
                warn!("⚠️ Dropping {}: {}", event_type, e);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Drains everything currently queued on the calling thread, in priority
    /// order, and returns the number of entries delivered.
    ///
    /// This is what the worker does on every wake-up. With
    /// `spawn_worker = false` it is the only way queued listeners run. When a
    /// worker is running, each entry is still delivered exactly once by
    /// whichever thread pops it. Panicking queued listeners are logged and
    /// skipped, exactly as on the worker.
    pub fn process(&self) -> usize {
        let entries = self.shared.queue.pop_all();
        if entries.is_empty() {
            return 0;
        }
        deliver_queued(&self.shared, entries)
    }

    /// Delivers only the highest-priority pending entry. Returns `false` if
    /// the queue was empty.
    pub fn process_one(&self) -> bool {
        match self.shared.queue.pop() {
            Some(entry) => deliver_queued(&self.shared, vec![entry]) == 1,
            None => false,
        }
    }

    /// Blocks until the queue is empty and no popped entry is still being
    /// delivered, or until `timeout` elapses. Returns `true` if drained.
    ///
    /// Without a worker the queue is drained on the calling thread first.
    pub fn flush(&self, timeout: Duration) -> bool {
        if !self.config.spawn_worker {
            self.process();
        }
        self.shared.queue.wait_idle(timeout)
    }
}
