//! The monitor application.
//!
//! Wires listeners onto an event manager, runs synthetic producers against
//! it, and reports statistics until a signal or a simulated window close
//! ends the run.

use crate::config::{MonitorConfig, ProducerSettings};
use crate::signals;
use anyhow::Result;
use event_manager::{
    create_event_manager, AppTickEvent, EventError, EventManager, EventManagerStats, KeyPressedEvent,
    MouseMovedEvent, Priority, WindowCloseEvent, WindowResizeEvent,
};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Deliveries observed by the monitor's own listeners.
#[derive(Debug, Default)]
pub struct ListenerCounters {
    pub ticks: AtomicU64,
    pub key_presses: AtomicU64,
    pub mouse_moves: AtomicU64,
    pub resizes: AtomicU64,
}

/// What a finished run reports.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub ticks: u64,
    pub key_presses: u64,
    pub mouse_moves: u64,
    pub resizes: u64,
    pub manager: EventManagerStats,
}

pub struct MonitorApp {
    config: MonitorConfig,
    manager: Arc<EventManager>,
    counters: Arc<ListenerCounters>,
    close_requested: Arc<Notify>,
}

impl MonitorApp {
    /// Creates the event manager and registers the monitor's listeners.
    pub fn new(config: MonitorConfig) -> Result<Self> {
        let manager = create_event_manager(config.manager.clone())?;
        let counters = Arc::new(ListenerCounters::default());
        let close_requested = Arc::new(Notify::new());

        // Window events are handled synchronously by whoever dispatches them
        {
            let counters = counters.clone();
            manager.subscribe_direct(move |event: &WindowResizeEvent| {
                counters.resizes.fetch_add(1, Ordering::Relaxed);
                debug!("🪟 Viewport resized to {}x{}", event.width, event.height);
            });
        }
        {
            let close_requested = close_requested.clone();
            manager.subscribe_direct(move |_: &WindowCloseEvent| {
                info!("🚪 Window close requested");
                close_requested.notify_one();
            });
        }

        // Input and ticks go through the priority queue
        {
            let counters = counters.clone();
            manager.subscribe_queued(move |_: &AppTickEvent| {
                counters.ticks.fetch_add(1, Ordering::Relaxed);
            });
        }
        {
            let counters = counters.clone();
            manager.subscribe_queued(move |event: &KeyPressedEvent| {
                counters.key_presses.fetch_add(1, Ordering::Relaxed);
                debug!("⌨️ Key {} pressed (repeat: {})", event.key_code, event.repeat);
            });
        }
        {
            let counters = counters.clone();
            manager.subscribe_queued(move |_: &MouseMovedEvent| {
                counters.mouse_moves.fetch_add(1, Ordering::Relaxed);
            });
        }

        Ok(Self {
            config,
            manager,
            counters,
            close_requested,
        })
    }

    pub fn manager(&self) -> &Arc<EventManager> {
        &self.manager
    }

    /// Runs until a termination signal arrives or a `WindowCloseEvent` is
    /// dispatched. With `duration` set, that close event is dispatched
    /// automatically once it elapses.
    pub async fn run(self, duration: Option<Duration>) -> Result<RunSummary> {
        let mut tasks: Vec<JoinHandle<()>> = Vec::new();

        for producer_id in 0..self.config.producers.threads {
            tasks.push(tokio::spawn(produce(
                self.manager.clone(),
                producer_id,
                self.config.producers.clone(),
            )));
        }

        if !self.manager.config().spawn_worker {
            tasks.push(tokio::spawn(pump_queue(self.manager.clone())));
        }

        if self.config.producers.stats_interval_secs > 0 {
            tasks.push(tokio::spawn(report_stats(
                self.manager.clone(),
                Duration::from_secs(self.config.producers.stats_interval_secs),
            )));
        }

        if let Some(duration) = duration {
            let manager = self.manager.clone();
            tasks.push(tokio::spawn(async move {
                tokio::time::sleep(duration).await;
                manager.dispatch(Arc::new(WindowCloseEvent::new()));
            }));
        }

        info!(
            "🚀 Event monitor running with {} producer(s)",
            self.config.producers.threads
        );

        tokio::select! {
            result = signals::wait_for_shutdown_signal() => result?,
            _ = self.close_requested.notified() => {}
        }

        info!("🛑 Stopping event monitor...");
        for task in &tasks {
            task.abort();
        }
        for task in tasks {
            // cancelled tasks report a JoinError, which is expected here
            let _ = task.await;
        }

        if !self.manager.flush(DRAIN_TIMEOUT) {
            warn!("⚠️ Queue did not drain within {:?}", DRAIN_TIMEOUT);
        }
        self.manager.shutdown();

        Ok(self.summary())
    }

    fn summary(&self) -> RunSummary {
        RunSummary {
            ticks: self.counters.ticks.load(Ordering::Relaxed),
            key_presses: self.counters.key_presses.load(Ordering::Relaxed),
            mouse_moves: self.counters.mouse_moves.load(Ordering::Relaxed),
            resizes: self.counters.resizes.load(Ordering::Relaxed),
            manager: self.manager.stats(),
        }
    }
}

/// Emits one tick's worth of synthetic events.
fn emit_frame(manager: &EventManager, tick: u64) -> Result<(), EventError> {
    manager.enqueue_with_priority(Arc::new(AppTickEvent::new(tick)), Priority::High)?;

    let angle = tick as f32 * 0.1;
    manager.enqueue_with_priority(
        Arc::new(MouseMovedEvent::new(640.0 + angle.cos() * 100.0, 360.0 + angle.sin() * 100.0)),
        Priority::Low,
    )?;

    if tick % 3 == 0 {
        manager.enqueue(Arc::new(KeyPressedEvent::new(32, tick % 6 == 0)))?;
    }
    if tick % 5 == 0 {
        let width = 1280 + (tick % 7) as u32 * 16;
        manager.dispatch(Arc::new(WindowResizeEvent::new(width, 720)));
    }
    Ok(())
}

async fn produce(manager: Arc<EventManager>, producer_id: usize, settings: ProducerSettings) {
    let mut ticker = tokio::time::interval(Duration::from_millis(settings.interval_ms));
    let mut tick = 0;

    while settings.events_per_thread == 0 || tick < settings.events_per_thread {
        ticker.tick().await;
        tick += 1;

        match emit_frame(&manager, tick) {
            Ok(()) => {}
            // the manager already logged the rejection; drop the rest of the frame
            Err(EventError::QueueFull { .. }) => {}
            Err(EventError::ShutDown) => break,
            Err(e) => {
                warn!("⚠️ Producer {} stopping: {}", producer_id, e);
                break;
            }
        }
    }

    debug!("🏁 Producer {} finished after {} ticks", producer_id, tick);
}

/// Drains the queue once per poll interval when no worker thread exists.
async fn pump_queue(manager: Arc<EventManager>) {
    let mut ticker = tokio::time::interval(manager.config().poll_interval());
    loop {
        ticker.tick().await;
        manager.process();
    }
}

async fn report_stats(manager: Arc<EventManager>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    // the first tick completes immediately
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let stats = manager.stats();
        info!(
            "📊 enqueued: {}, delivered: {}, pending: {}, rejected: {}, panics: {}, worker: {:?}",
            stats.events_enqueued,
            stats.events_delivered,
            stats.queue_depth,
            stats.events_rejected,
            stats.listener_panics,
            stats.worker_state
        );
    }
}
