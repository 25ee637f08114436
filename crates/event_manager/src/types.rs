//! # Core Types
//!
//! The small set of value types every other module is built on: the runtime
//! event type tag, subscription handles, delivery modes, queue priorities and
//! the type-erased [`EventPayload`] carried through both delivery paths.

use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

// ============================================================================
// Event Trait and Type Registry
// ============================================================================

/// Marker trait for anything that can travel through the event manager.
///
/// It is implemented automatically for every `Send + Sync + Debug` type with a
/// `'static` lifetime, so plain structs become events without any ceremony:
///
/// ```rust
/// use event_manager::Event;
///
/// #[derive(Debug)]
/// struct Ping { seq: u32 }
///
/// assert!(Ping::type_name().ends_with("Ping"));
/// ```
pub trait Event: Any + Send + Sync + fmt::Debug {
    /// Human-readable type name, used in log output and listener names.
    fn type_name() -> &'static str
    where
        Self: Sized,
    {
        std::any::type_name::<Self>()
    }
}

impl<T> Event for T where T: Any + Send + Sync + fmt::Debug {}

/// Runtime identifier of a concrete event type, used as the dispatch key.
///
/// Equality and hashing only consider the underlying [`TypeId`]; the name is
/// carried along for diagnostics.
#[derive(Clone, Copy)]
pub struct EventType {
    id: TypeId,
    name: &'static str,
}

impl EventType {
    /// Returns the tag for `T`. Pure and lock-free.
    #[inline]
    pub fn of<T: Event>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Fully qualified name of the tagged type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The raw [`TypeId`] behind this tag.
    pub fn type_id(&self) -> TypeId {
        self.id
    }
}

impl PartialEq for EventType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventType {}

impl Hash for EventType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventType").field(&self.name).finish()
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// ============================================================================
// Subscription Handles
// ============================================================================

/// Opaque identifier returned by `subscribe_*` and consumed by `unsubscribe`.
///
/// Handles are issued in strictly increasing order starting at 1 and are never
/// reused by the manager that issued them. [`SubscriptionHandle::INVALID`] is
/// never issued and stands for "not subscribed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    /// Sentinel that no registry ever hands out.
    pub const INVALID: SubscriptionHandle = SubscriptionHandle(0);

    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value, mostly useful for logging.
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// `false` only for [`SubscriptionHandle::INVALID`].
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

impl Default for SubscriptionHandle {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// Delivery Modes and Priorities
// ============================================================================

/// How a subscription wants to be notified. Fixed when subscribing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DispatchMode {
    /// Invoked synchronously on the thread calling `dispatch`.
    Direct,
    /// Invoked later by the dispatch worker (or `process`) after `enqueue`.
    Queued,
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchMode::Direct => f.write_str("direct"),
            DispatchMode::Queued => f.write_str("queued"),
        }
    }
}

/// Ordering class for queued events. `Highest` is drained first.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Highest,
}

impl Priority {
    /// All levels, lowest first.
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Normal,
        Priority::High,
        Priority::Highest,
    ];
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
            Priority::Highest => "highest",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Event Payload
// ============================================================================

/// Shared, immutable, type-erased event data tagged with its [`EventType`].
///
/// The tag is computed once at construction and never changes. Cloning a
/// payload only bumps a reference count.
#[derive(Clone)]
pub struct EventPayload {
    event_type: EventType,
    data: Arc<dyn Any + Send + Sync>,
}

impl EventPayload {
    /// Wraps an owned event.
    pub fn new<T: Event>(event: T) -> Self {
        Self::from_arc(Arc::new(event))
    }

    /// Wraps an already shared event without copying it.
    pub fn from_arc<T: Event>(event: Arc<T>) -> Self {
        Self {
            event_type: EventType::of::<T>(),
            data: event,
        }
    }

    /// The type tag assigned at construction.
    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    /// Borrows the event as `T`, or `None` if `T` is not the exact payload type.
    pub fn downcast_ref<T: Event>(&self) -> Option<&T> {
        (*self.data).downcast_ref::<T>()
    }

    /// Returns a new shared reference to the event as `T`.
    pub fn downcast<T: Event>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.data).downcast::<T>().ok()
    }

    /// `true` if the payload holds a `T`.
    pub fn is<T: Event>(&self) -> bool {
        self.event_type == EventType::of::<T>()
    }
}

impl<T: Event> From<Arc<T>> for EventPayload {
    fn from(event: Arc<T>) -> Self {
        Self::from_arc(event)
    }
}

impl fmt::Debug for EventPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventPayload")
            .field("event_type", &self.event_type)
            .finish_non_exhaustive()
    }
}
