//! # Priority Queue
//!
//! Pending queued events, ordered by descending [`Priority`] and, within a
//! priority, by the sequence number assigned at push time. No two entries
//! ever compare equal, so the drain order is fully deterministic.
//!
//! The queue has its own lock, independent of the subscription registry, and
//! two condition variables: one wakes the dispatch worker when work arrives,
//! the other wakes `flush` callers once everything popped has been delivered.

use crate::error::EventError;
use crate::types::{EventPayload, EventType, Priority};
use parking_lot::{Condvar, Mutex};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

/// One pending event.
#[derive(Debug)]
pub(crate) struct QueueEntry {
    pub payload: EventPayload,
    pub priority: Priority,
    pub sequence: u64,
}

impl QueueEntry {
    pub fn event_type(&self) -> EventType {
        self.payload.event_type()
    }
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    // BinaryHeap pops the greatest entry: higher priority first, then the
    // lower (older) sequence number.
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// What the worker should do after waiting on the queue.
pub(crate) enum NextBatch {
    Ready(Vec<QueueEntry>),
    Empty,
    Stopped,
}

#[derive(Default)]
struct QueueState {
    heap: BinaryHeap<QueueEntry>,
    next_sequence: u64,
    /// Entries popped but not yet reported back through `finish`.
    in_flight: usize,
    closed: bool,
}

impl QueueState {
    fn drain_ordered(&mut self) -> Vec<QueueEntry> {
        let mut entries = Vec::with_capacity(self.heap.len());
        while let Some(entry) = self.heap.pop() {
            entries.push(entry);
        }
        self.in_flight += entries.len();
        entries
    }

    fn is_idle(&self) -> bool {
        self.heap.is_empty() && self.in_flight == 0
    }
}

pub(crate) struct PriorityQueue {
    state: Mutex<QueueState>,
    available: Condvar,
    idle: Condvar,
    capacity: Option<usize>,
}

impl PriorityQueue {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            available: Condvar::new(),
            idle: Condvar::new(),
            capacity,
        }
    }

    /// Adds an entry and wakes the worker. Returns the assigned sequence.
    pub fn push(&self, payload: EventPayload, priority: Priority) -> Result<u64, EventError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(EventError::ShutDown);
        }
        if let Some(capacity) = self.capacity {
            if state.heap.len() >= capacity {
                return Err(EventError::QueueFull { capacity });
            }
        }

        let sequence = state.next_sequence;
        state.next_sequence += 1;
        state.heap.push(QueueEntry {
            payload,
            priority,
            sequence,
        });
        drop(state);

        self.available.notify_one();
        Ok(sequence)
    }

    /// Pops the single next entry. The caller must report it through `finish`.
    pub fn pop(&self) -> Option<QueueEntry> {
        let mut state = self.state.lock();
        let entry = state.heap.pop();
        if entry.is_some() {
            state.in_flight += 1;
        }
        entry
    }

    /// Pops everything currently queued, in delivery order. The caller must
    /// report the entries through `finish` once delivered.
    pub fn pop_all(&self) -> Vec<QueueEntry> {
        self.state.lock().drain_ordered()
    }

    /// Blocks until entries are available, `timeout` elapses, or the queue is
    /// closed, then pops everything available.
    pub fn next_batch(&self, timeout: Duration) -> NextBatch {
        let mut state = self.state.lock();
        if !state.closed && state.heap.is_empty() {
            self.available.wait_for(&mut state, timeout);
        }
        if state.closed {
            NextBatch::Stopped
        } else if state.heap.is_empty() {
            NextBatch::Empty
        } else {
            NextBatch::Ready(state.drain_ordered())
        }
    }

    /// Marks `count` popped entries as delivered. Returns `true` if the queue
    /// is closed and this was the last delivery still outstanding.
    pub fn finish(&self, count: usize) -> bool {
        if count == 0 {
            return false;
        }
        let mut state = self.state.lock();
        debug_assert!(state.in_flight >= count);
        state.in_flight = state.in_flight.saturating_sub(count);
        if state.is_idle() {
            self.idle.notify_all();
            state.closed
        } else {
            false
        }
    }

    /// `true` if nothing is queued or being delivered.
    pub fn is_idle(&self) -> bool {
        self.state.lock().is_idle()
    }

    /// Waits until nothing is queued or being delivered. Returns `false` on timeout.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        while !state.is_idle() {
            if self.idle.wait_until(&mut state, deadline).timed_out() {
                return state.is_idle();
            }
        }
        true
    }

    /// Rejects further pushes, discards pending entries and wakes all waiters.
    /// Returns the number of discarded entries.
    pub fn close(&self) -> usize {
        let mut state = self.state.lock();
        state.closed = true;
        let discarded = state.heap.len();
        state.heap.clear();
        let idle = state.is_idle();
        drop(state);

        self.available.notify_all();
        if idle {
            self.idle.notify_all();
        }
        discarded
    }

    pub fn len(&self) -> usize {
        self.state.lock().heap.len()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[derive(Debug)]
    struct Tagged(&'static str);

    fn push(queue: &PriorityQueue, tag: &'static str, priority: Priority) {
        queue.push(EventPayload::new(Tagged(tag)), priority).unwrap();
    }

    fn tags(entries: &[QueueEntry]) -> Vec<&'static str> {
        entries
            .iter()
            .map(|entry| entry.payload.downcast_ref::<Tagged>().unwrap().0)
            .collect()
    }

    #[test]
    fn test_priority_then_fifo_order() {
        let queue = PriorityQueue::new(None);
        push(&queue, "normal-1", Priority::Normal);
        push(&queue, "highest-1", Priority::Highest);
        push(&queue, "low-1", Priority::Low);
        push(&queue, "high-1", Priority::High);
        push(&queue, "highest-2", Priority::Highest);
        push(&queue, "normal-2", Priority::Normal);

        let entries = queue.pop_all();
        assert_eq!(
            tags(&entries),
            vec!["highest-1", "highest-2", "high-1", "normal-1", "normal-2", "low-1"]
        );
        queue.finish(entries.len());
        assert_eq!(queue.len(), 0);
        assert!(queue.wait_idle(Duration::from_millis(1)));
    }

    #[test]
    fn test_pop_one_at_a_time() {
        let queue = PriorityQueue::new(None);
        push(&queue, "a", Priority::Low);
        push(&queue, "b", Priority::High);

        let first = queue.pop().unwrap();
        assert_eq!(first.priority, Priority::High);
        assert_eq!(queue.len(), 1);
        // popped but unfinished entries keep the queue busy
        assert!(!queue.wait_idle(Duration::from_millis(5)));
        queue.finish(1);

        let second = queue.pop().unwrap();
        assert_eq!(second.priority, Priority::Low);
        queue.finish(1);
        assert!(queue.pop().is_none());
        assert!(queue.wait_idle(Duration::from_millis(1)));
    }

    #[test]
    fn test_sequence_is_strictly_increasing() {
        let queue = PriorityQueue::new(None);
        let a = queue.push(EventPayload::new(Tagged("a")), Priority::Normal).unwrap();
        let b = queue.push(EventPayload::new(Tagged("b")), Priority::Normal).unwrap();
        assert!(b > a);
    }

    #[test]
    fn test_bounded_queue_rejects_when_full() {
        let queue = PriorityQueue::new(Some(2));
        push(&queue, "a", Priority::Normal);
        push(&queue, "b", Priority::Normal);
        let err = queue
            .push(EventPayload::new(Tagged("c")), Priority::Highest)
            .unwrap_err();
        assert!(matches!(err, EventError::QueueFull { capacity: 2 }));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_close_discards_and_rejects() {
        let queue = PriorityQueue::new(None);
        push(&queue, "a", Priority::Normal);
        push(&queue, "b", Priority::Low);

        assert_eq!(queue.close(), 2);
        assert_eq!(queue.len(), 0);
        assert!(matches!(
            queue.push(EventPayload::new(Tagged("c")), Priority::Normal),
            Err(EventError::ShutDown)
        ));
        assert!(matches!(queue.next_batch(Duration::from_millis(1)), NextBatch::Stopped));
    }

    #[test]
    fn test_finish_reports_last_delivery_after_close() {
        let queue = PriorityQueue::new(None);
        push(&queue, "a", Priority::Normal);
        push(&queue, "b", Priority::Normal);
        push(&queue, "c", Priority::Normal);
        let entries = queue.pop_all();
        assert!(!queue.finish(1));

        // closing mid-delivery leaves the popped entries outstanding
        assert_eq!(queue.close(), 0);
        assert!(!queue.is_idle());
        assert!(!queue.finish(1));
        assert!(queue.finish(1));
        assert!(queue.is_idle());
        drop(entries);
    }

    #[test]
    fn test_next_batch_times_out_when_empty() {
        let queue = PriorityQueue::new(None);
        let started = Instant::now();
        assert!(matches!(queue.next_batch(Duration::from_millis(20)), NextBatch::Empty));
        assert!(started.elapsed() >= Duration::from_millis(15));
    }

    #[test]
    fn test_next_batch_wakes_on_push() {
        let queue = Arc::new(PriorityQueue::new(None));
        let producer = {
            let queue = queue.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                push(&queue, "wake", Priority::Normal);
            })
        };

        let mut received = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(5);
        while received.is_empty() && Instant::now() < deadline {
            if let NextBatch::Ready(entries) = queue.next_batch(Duration::from_secs(1)) {
                received = entries;
            }
        }
        producer.join().unwrap();

        assert_eq!(tags(&received), vec!["wake"]);
        queue.finish(received.len());
    }

    #[test]
    fn test_close_wakes_waiting_worker() {
        let queue = Arc::new(PriorityQueue::new(None));
        let waiter = {
            let queue = queue.clone();
            thread::spawn(move || matches!(queue.next_batch(Duration::from_secs(10)), NextBatch::Stopped))
        };
        thread::sleep(Duration::from_millis(20));
        queue.close();
        assert!(waiter.join().unwrap());
    }
}
