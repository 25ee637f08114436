//! # Event Manager
//!
//! A type-indexed, in-process publish/subscribe event bus. Producers of input,
//! window and application-lifecycle events publish typed payloads; consumers
//! subscribe by payload type and never need to know who produced what.
//!
//! ## Core Features
//!
//! - **Type Safety**: listeners receive `&T` of exactly the subscribed type
//! - **Two Delivery Modes**: synchronous direct dispatch, and priority-ordered
//!   queued delivery on a background worker thread
//! - **Handle-Based Lifecycle**: every subscription returns a handle that
//!   unsubscribes it; stale handles are harmless
//! - **Reentrancy**: no internal lock is held while user code runs
//! - **Failure Isolation**: a panicking queued listener never stops the worker
//! - **Statistics**: built-in counters for monitoring
//!
//! ## Delivery Modes
//!
//! ### Direct
//! [`EventManager::dispatch`] calls every direct listener of the payload type
//! on the caller's thread, in subscription order, before returning.
//!
//! ### Queued
//! [`EventManager::enqueue`] stores the payload with a [`Priority`] and returns
//! immediately. The dispatch worker drains the queue highest priority first,
//! FIFO within a priority, and calls the queued listeners for each entry.
//!
//! ## Quick Start Example
//!
//! ```rust
//! use event_manager::*;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::time::Duration;
//!
//! let events = create_event_manager(EventManagerConfig::default())?;
//!
//! events.subscribe_direct(|event: &WindowResizeEvent| {
//!     println!("viewport is now {}x{}", event.width, event.height);
//! });
//!
//! let ticks = Arc::new(AtomicUsize::new(0));
//! let counter = ticks.clone();
//! let handle = events.subscribe_queued(move |_: &AppTickEvent| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! events.dispatch(Arc::new(WindowResizeEvent::new(1280, 720)));
//! events.enqueue_with_priority(Arc::new(AppTickEvent::new(1)), Priority::High)?;
//!
//! assert!(events.flush(Duration::from_secs(1)));
//! assert_eq!(ticks.load(Ordering::SeqCst), 1);
//!
//! events.unsubscribe(handle);
//! events.shutdown();
//! # Ok::<(), EventError>(())
//! ```

pub mod config;
pub mod error;
pub mod events;
mod queue;
pub mod registry;
pub mod system;
pub mod types;
pub mod utils;
pub mod worker;

pub use config::EventManagerConfig;
pub use error::EventError;
pub use events::*;
pub use registry::{EventListener, SubscriptionCounts, SubscriptionRegistry, TypedListener};
pub use system::{EventManager, EventManagerStats};
pub use types::{DispatchMode, Event, EventPayload, EventType, Priority, SubscriptionHandle};
pub use utils::{create_event_manager, current_timestamp};
pub use worker::WorkerState;
