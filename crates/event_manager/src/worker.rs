//! # Dispatch Worker
//!
//! A single background thread that drains the priority queue and invokes the
//! queued listeners. It sleeps on the queue's condition variable with a
//! bounded timeout, so an idle manager costs next to no CPU.
//!
//! Lifecycle: `Idle -> Draining -> Idle -> ... -> Stopped`. A stop request is
//! observed at every wake-up; entries already popped are always delivered
//! before the thread exits.

use crate::queue::{NextBatch, QueueEntry};
use crate::system::core::ManagerShared;
use crate::system::stats::StatsCounters;
use crate::types::DispatchMode;
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;
use tracing::{debug, error, info};

/// Observable state of the dispatch worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkerState {
    /// Waiting for queued events.
    #[default]
    Idle,
    /// Delivering a popped batch.
    Draining,
    /// Exited; terminal.
    Stopped,
    /// No worker thread; the owner drains through `process`.
    Manual,
}

impl WorkerState {
    fn to_u8(self) -> u8 {
        match self {
            WorkerState::Idle => 0,
            WorkerState::Draining => 1,
            WorkerState::Stopped => 2,
            WorkerState::Manual => 3,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => WorkerState::Idle,
            1 => WorkerState::Draining,
            2 => WorkerState::Stopped,
            _ => WorkerState::Manual,
        }
    }
}

/// Atomic cell holding a [`WorkerState`].
#[derive(Debug)]
pub(crate) struct WorkerStateCell(AtomicU8);

impl WorkerStateCell {
    pub fn new(state: WorkerState) -> Self {
        Self(AtomicU8::new(state.to_u8()))
    }

    pub fn get(&self) -> WorkerState {
        WorkerState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, state: WorkerState) {
        self.0.store(state.to_u8(), Ordering::Release);
    }
}

/// Handle to the running worker thread.
#[derive(Debug)]
pub(crate) struct DispatchWorker {
    handle: JoinHandle<()>,
}

impl DispatchWorker {
    /// Starts the worker thread.
    pub fn spawn(
        shared: Arc<ManagerShared>,
        thread_name: &str,
        poll_interval: Duration,
    ) -> std::io::Result<Self> {
        let handle = thread::Builder::new()
            .name(thread_name.to_string())
            .spawn(move || run(shared, poll_interval))?;
        Ok(Self { handle })
    }

    pub fn thread_id(&self) -> ThreadId {
        self.handle.thread().id()
    }

    /// Waits for the thread to exit. Must only be called after the queue has
    /// been closed.
    pub fn join(self) {
        if self.handle.join().is_err() {
            error!("❌ Dispatch worker terminated with a panic");
        }
    }
}

fn run(shared: Arc<ManagerShared>, poll_interval: Duration) {
    info!("🚀 Dispatch worker started (poll interval {:?})", poll_interval);
    shared.worker_state.set(WorkerState::Idle);

    loop {
        match shared.queue.next_batch(poll_interval) {
            NextBatch::Stopped => break,
            NextBatch::Empty => continue,
            NextBatch::Ready(entries) => {
                shared.worker_state.set(WorkerState::Draining);
                debug!("📤 Draining {} queued events", entries.len());
                deliver_queued(&shared, entries);
                shared.worker_state.set(WorkerState::Idle);
            }
        }
    }

    shared.worker_state.set(WorkerState::Stopped);
    info!("🛑 Dispatch worker stopped");
}

/// Reports popped entries back to the queue even if delivery unwinds.
struct InFlight<'a> {
    shared: &'a ManagerShared,
    remaining: usize,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.shared.queue.finish(self.remaining) {
            self.shared.release_subscriptions();
        }
    }
}

/// Delivers popped entries in order to the queued listeners registered for
/// each entry's type at delivery time. A panicking listener is logged and
/// skipped; the remaining listeners and entries are still delivered.
pub(crate) fn deliver_queued(shared: &ManagerShared, entries: Vec<QueueEntry>) -> usize {
    let total = entries.len();
    let mut in_flight = InFlight {
        shared,
        remaining: total,
    };

    for entry in entries {
        let event_type = entry.event_type();
        let listeners = shared.registry.snapshot(event_type, DispatchMode::Queued);

        for listener in &listeners {
            let result = panic::catch_unwind(AssertUnwindSafe(|| listener.invoke(&entry.payload)));
            StatsCounters::incr(&shared.stats.listener_invocations);
            if result.is_err() {
                StatsCounters::incr(&shared.stats.listener_panics);
                error!(
                    "❌ Queued listener {} panicked while handling {} (priority {}, seq {})",
                    listener.listener_name(),
                    event_type,
                    entry.priority,
                    entry.sequence
                );
            }
        }

        StatsCounters::incr(&shared.stats.events_delivered);
        drop(entry);
        in_flight.remaining -= 1;
        // a shutdown requested mid-batch leaves the release to the last delivery
        if shared.queue.finish(1) {
            shared.release_subscriptions();
        }
    }

    total
}
