/// Core EventManager implementation
use super::stats::StatsCounters;
use crate::config::EventManagerConfig;
use crate::error::EventError;
use crate::queue::PriorityQueue;
use crate::registry::SubscriptionRegistry;
use crate::worker::{DispatchWorker, WorkerState, WorkerStateCell};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

/// State shared between the facade and the dispatch worker thread.
pub(crate) struct ManagerShared {
    pub registry: SubscriptionRegistry,
    pub queue: PriorityQueue,
    pub stats: StatsCounters,
    pub worker_state: WorkerStateCell,
    released: AtomicBool,
}

impl ManagerShared {
    /// Drops every subscription, once. Runs when shutdown finds the queue
    /// idle, or after the last delivery that was in flight when it closed.
    pub fn release_subscriptions(&self) {
        if self.released.swap(true, Ordering::AcqRel) {
            return;
        }
        let released = self.registry.clear();
        info!("🛑 Event manager shut down ({} subscriptions released)", released);
    }
}

/// The in-process event bus.
///
/// Listeners subscribe per event type in one of two modes. Direct listeners
/// run synchronously inside [`dispatch`](EventManager::dispatch) on the
/// caller's thread. Queued listeners run on the dispatch worker after
/// [`enqueue`](EventManager::enqueue), in priority order.
///
/// # Thread Safety
///
/// Every method takes `&self`; share the manager as `Arc<EventManager>`.
/// No internal lock is held while a listener runs, so listeners may freely
/// subscribe, unsubscribe, dispatch or enqueue from inside a callback.
///
/// # Lifecycle
///
/// Construction starts the worker thread. [`shutdown`](EventManager::shutdown),
/// or dropping the manager, stops and joins it, discards whatever is still
/// queued, and releases every subscription.
///
/// # Examples
///
/// ```rust
/// use event_manager::{EventManager, EventManagerConfig, KeyPressedEvent, Priority};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let manager = EventManager::new(EventManagerConfig::default())?;
///
/// let handle = manager.subscribe_direct(|event: &KeyPressedEvent| {
///     println!("key {} pressed", event.key_code);
/// });
///
/// manager.dispatch(Arc::new(KeyPressedEvent::new(32, false)));
/// manager.enqueue_with_priority(Arc::new(KeyPressedEvent::new(13, false)), Priority::High)?;
/// manager.flush(Duration::from_secs(1));
///
/// assert!(manager.unsubscribe(handle));
/// manager.shutdown();
/// # Ok::<(), event_manager::EventError>(())
/// ```
pub struct EventManager {
    pub(super) shared: Arc<ManagerShared>,
    pub(super) worker: Mutex<Option<DispatchWorker>>,
    pub(super) config: EventManagerConfig,
    pub(super) shut_down: AtomicBool,
}

impl std::fmt::Debug for EventManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventManager")
            .field("registry", &self.shared.registry)
            .field("queue_len", &self.shared.queue.len())
            .field("worker_state", &self.shared.worker_state.get())
            .field("config", &self.config)
            .finish()
    }
}

impl EventManager {
    /// Creates a manager and, unless disabled in `config`, starts its worker.
    pub fn new(config: EventManagerConfig) -> Result<Self, EventError> {
        config.validate()?;

        let initial_state = if config.spawn_worker {
            WorkerState::Idle
        } else {
            WorkerState::Manual
        };
        let shared = Arc::new(ManagerShared {
            registry: SubscriptionRegistry::new(),
            queue: PriorityQueue::new(config.queue_capacity),
            stats: StatsCounters::default(),
            worker_state: WorkerStateCell::new(initial_state),
            released: AtomicBool::new(false),
        });

        let worker = if config.spawn_worker {
            Some(DispatchWorker::spawn(
                shared.clone(),
                &config.worker_thread_name,
                config.poll_interval(),
            )?)
        } else {
            info!("🔧 Event manager running without a worker; drain with process()");
            None
        };

        Ok(Self {
            shared,
            worker: Mutex::new(worker),
            config,
            shut_down: AtomicBool::new(false),
        })
    }

    /// The configuration this manager was built with.
    pub fn config(&self) -> &EventManagerConfig {
        &self.config
    }

    /// `true` once [`shutdown`](Self::shutdown) has started.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    /// Stops the worker, discards pending queued events and releases every
    /// subscription. Idempotent; also run on drop.
    ///
    /// Entries the worker had already popped are delivered before it exits.
    /// After shutdown, enqueueing fails with [`EventError::ShutDown`].
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return;
        }

        let discarded = self.shared.queue.close();
        if discarded > 0 {
            StatsCounters::add(&self.shared.stats.events_discarded, discarded as u64);
            warn!("⚠️ Discarded {} queued events at shutdown", discarded);
        }

        if let Some(worker) = self.worker.lock().take() {
            if worker.thread_id() == thread::current().id() {
                // called from a queued listener; the loop exits on its own
                // once the current batch is delivered
                warn!("⚠️ Event manager shut down from its own worker thread; not joining");
            } else {
                worker.join();
            }
        } else {
            self.shared.worker_state.set(WorkerState::Stopped);
        }

        // entries popped before the queue closed still reach their listeners;
        // whichever thread finishes the last of them releases the registry
        if self.shared.queue.is_idle() {
            self.shared.release_subscriptions();
        } else {
            debug!("⏳ Deferring subscription release until in-flight deliveries finish");
        }
    }
}

impl Drop for EventManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}
