//! # Subscription Registry
//!
//! Tracks who is listening for what. For each [`DispatchMode`] the registry
//! keeps a map from [`EventType`] to the ordered set of listeners, plus a
//! reverse index from [`SubscriptionHandle`] to the `(type, mode)` pair so a
//! handle can be removed without scanning.
//!
//! Both maps live behind a single mutex and are only ever mutated together.
//! Listener sets are keyed by handle in a `BTreeMap`; since handles are issued
//! in increasing order, iterating a set yields listeners in subscription order.

use crate::types::{DispatchMode, Event, EventPayload, EventType, SubscriptionHandle};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

// ============================================================================
// Listener Abstraction
// ============================================================================

/// Type-erased callback stored in the registry.
pub trait EventListener: Send + Sync {
    /// Invokes the callback. The payload's type must match [`Self::event_type`].
    fn invoke(&self, payload: &EventPayload);
    /// The event type this listener was registered for.
    fn event_type(&self) -> EventType;
    /// Name used in diagnostics.
    fn listener_name(&self) -> &str;
}

/// Adapts a typed `Fn(&T)` closure to [`EventListener`].
pub struct TypedListener<T, F>
where
    T: Event,
    F: Fn(&T) + Send + Sync,
{
    callback: F,
    name: String,
    _phantom: PhantomData<fn(&T)>,
}

impl<T, F> TypedListener<T, F>
where
    T: Event,
    F: Fn(&T) + Send + Sync,
{
    pub fn new(name: String, callback: F) -> Self {
        Self {
            callback,
            name,
            _phantom: PhantomData,
        }
    }
}

impl<T, F> EventListener for TypedListener<T, F>
where
    T: Event,
    F: Fn(&T) + Send + Sync,
{
    fn invoke(&self, payload: &EventPayload) {
        debug_assert_eq!(payload.event_type(), self.event_type());
        if let Some(event) = payload.downcast_ref::<T>() {
            (self.callback)(event);
        }
    }

    fn event_type(&self) -> EventType {
        EventType::of::<T>()
    }

    fn listener_name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Registry
// ============================================================================

type ListenerSet = BTreeMap<SubscriptionHandle, Arc<dyn EventListener>>;

#[derive(Default)]
struct RegistryState {
    direct: HashMap<EventType, ListenerSet>,
    queued: HashMap<EventType, ListenerSet>,
    index: HashMap<SubscriptionHandle, (EventType, DispatchMode)>,
    last_handle: u64,
}

impl RegistryState {
    fn listeners(&self, mode: DispatchMode) -> &HashMap<EventType, ListenerSet> {
        match mode {
            DispatchMode::Direct => &self.direct,
            DispatchMode::Queued => &self.queued,
        }
    }

    fn listeners_mut(&mut self, mode: DispatchMode) -> &mut HashMap<EventType, ListenerSet> {
        match mode {
            DispatchMode::Direct => &mut self.direct,
            DispatchMode::Queued => &mut self.queued,
        }
    }

    fn count(&self, mode: DispatchMode) -> usize {
        self.listeners(mode).values().map(BTreeMap::len).sum()
    }

    /// The reverse index and the listener maps agree on `handle`: it is
    /// indexed under `(event_type, mode)` exactly when that set lists it.
    fn agrees_on(&self, handle: SubscriptionHandle, event_type: EventType, mode: DispatchMode) -> bool {
        let listed = self
            .listeners(mode)
            .get(&event_type)
            .is_some_and(|set| set.contains_key(&handle));
        listed == (self.index.get(&handle) == Some(&(event_type, mode)))
    }

    /// Every indexed handle has exactly one listener entry and vice versa.
    #[cfg(test)]
    fn is_consistent(&self) -> bool {
        let indexed_ok = self.index.iter().all(|(handle, (event_type, mode))| {
            self.listeners(*mode)
                .get(event_type)
                .is_some_and(|set| set.contains_key(handle))
        });
        indexed_ok
            && self.count(DispatchMode::Direct) + self.count(DispatchMode::Queued)
                == self.index.len()
    }
}

/// Counts of active subscriptions per mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubscriptionCounts {
    pub direct: usize,
    pub queued: usize,
}

/// Thread-safe store of active subscriptions.
#[derive(Default)]
pub struct SubscriptionRegistry {
    state: Mutex<RegistryState>,
}

impl std::fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts = self.counts();
        f.debug_struct("SubscriptionRegistry")
            .field("direct", &counts.direct)
            .field("queued", &counts.queued)
            .finish()
    }
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener and returns its freshly issued handle.
    pub fn register(
        &self,
        event_type: EventType,
        mode: DispatchMode,
        listener: Arc<dyn EventListener>,
    ) -> SubscriptionHandle {
        debug_assert_eq!(listener.event_type(), event_type);
        let mut state = self.state.lock();
        state.last_handle += 1;
        let handle = SubscriptionHandle::from_raw(state.last_handle);

        state
            .listeners_mut(mode)
            .entry(event_type)
            .or_default()
            .insert(handle, listener);
        state.index.insert(handle, (event_type, mode));
        debug_assert!(state.agrees_on(handle, event_type, mode));
        drop(state);

        debug!("📝 Registered {} listener {} for {}", mode, handle, event_type);
        handle
    }

    /// Removes the subscription behind `handle`.
    ///
    /// Returns `false` and logs a warning if the handle is not active.
    pub fn unregister(&self, handle: SubscriptionHandle) -> bool {
        let removed = {
            let mut state = self.state.lock();
            match state.index.remove(&handle) {
                Some((event_type, mode)) => {
                    let listeners = state.listeners_mut(mode);
                    let removed = listeners
                        .get_mut(&event_type)
                        .and_then(|set| set.remove(&handle));
                    if listeners.get(&event_type).is_some_and(BTreeMap::is_empty) {
                        listeners.remove(&event_type);
                    }
                    debug_assert!(removed.is_some());
                    debug_assert!(state.agrees_on(handle, event_type, mode));
                    removed.map(|listener| (listener, event_type, mode))
                }
                None => None,
            }
        };

        // the listener is dropped here, outside the lock
        match removed {
            Some((_listener, event_type, mode)) => {
                debug!("🗑️ Unregistered {} listener {} for {}", mode, handle, event_type);
                true
            }
            None => {
                warn!("⚠️ Attempted to unsubscribe unknown handle {}", handle);
                false
            }
        }
    }

    /// Removes every subscription, direct and queued, for `event_type`.
    pub fn unregister_type(&self, event_type: EventType) -> usize {
        let removed: Vec<ListenerSet> = {
            let mut state = self.state.lock();
            let sets: Vec<ListenerSet> = [DispatchMode::Direct, DispatchMode::Queued]
                .into_iter()
                .filter_map(|mode| state.listeners_mut(mode).remove(&event_type))
                .collect();
            for handle in sets.iter().flat_map(BTreeMap::keys) {
                state.index.remove(handle);
            }
            debug_assert!(
                !state.direct.contains_key(&event_type) && !state.queued.contains_key(&event_type)
            );
            sets
        };

        let count = removed.iter().map(BTreeMap::len).sum();
        if count > 0 {
            debug!("🗑️ Removed {} listeners for {}", count, event_type);
        }
        count
    }

    /// Copies the listeners for `(event_type, mode)` in subscription order.
    pub fn snapshot(&self, event_type: EventType, mode: DispatchMode) -> Vec<Arc<dyn EventListener>> {
        let state = self.state.lock();
        state
            .listeners(mode)
            .get(&event_type)
            .map(|set| set.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of listeners for `(event_type, mode)`.
    pub fn listener_count(&self, event_type: EventType, mode: DispatchMode) -> usize {
        let state = self.state.lock();
        state
            .listeners(mode)
            .get(&event_type)
            .map_or(0, BTreeMap::len)
    }

    /// `true` if `handle` is currently registered.
    pub fn contains(&self, handle: SubscriptionHandle) -> bool {
        self.state.lock().index.contains_key(&handle)
    }

    /// Active subscription totals per mode.
    pub fn counts(&self) -> SubscriptionCounts {
        let state = self.state.lock();
        SubscriptionCounts {
            direct: state.count(DispatchMode::Direct),
            queued: state.count(DispatchMode::Queued),
        }
    }

    /// Drops every subscription and returns how many there were.
    ///
    /// The handle counter is left untouched so handles are never reissued.
    pub fn clear(&self) -> usize {
        let (direct, queued, count) = {
            let mut state = self.state.lock();
            let count = state.index.len();
            state.index.clear();
            (
                std::mem::take(&mut state.direct),
                std::mem::take(&mut state.queued),
                count,
            )
        };
        drop(direct);
        drop(queued);
        count
    }
}
