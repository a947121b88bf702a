//! Priority buffers and blocking work queues.
//!
//! Items leave in descending `Ord` order; equal items leave first-in,
//! first-out. A [`WorkQueue`] additionally blocks consumers and carries
//! stop tokens that are served before any queued work, so shutdown cannot
//! be starved by a continuous stream of high-priority items.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Outcome of a blocking take.
#[derive(Debug)]
pub enum Take<T> {
    /// A queued item.
    Work(T),
    /// The consumer must stop.
    Stop,
}

/// An item tagged with its insertion order.
#[derive(Debug)]
struct Sequenced<T> {
    item: T,
    seq: u64,
}

impl<T: Ord> PartialEq for Sequenced<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T: Ord> Eq for Sequenced<T> {}

impl<T: Ord> PartialOrd for Sequenced<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Ord> Ord for Sequenced<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap: greater item first, then the older sequence number.
        self.item
            .cmp(&other.item)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Non-blocking max-priority buffer with FIFO tie-breaking.
#[derive(Debug)]
pub struct PriorityBuffer<T: Ord> {
    heap: BinaryHeap<Sequenced<T>>,
    next_seq: u64,
    high_water: usize,
}

impl<T: Ord> PriorityBuffer<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
            high_water: 0,
        }
    }

    pub fn push(&mut self, item: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Sequenced { item, seq });
        self.high_water = self.high_water.max(self.heap.len());
    }

    /// Remove the greatest item.
    pub fn pop(&mut self) -> Option<T> {
        self.heap.pop().map(|entry| entry.item)
    }

    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.heap.peek().map(|entry| &entry.item)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Largest size the buffer ever reached.
    #[must_use]
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    /// Remove every item, in no particular order.
    pub fn drain(&mut self) -> Vec<T> {
        self.heap.drain().map(|entry| entry.item).collect()
    }
}

impl<T: Ord> Default for PriorityBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct QueueState<T: Ord> {
    buffer: PriorityBuffer<T>,
    stops: usize,
    active: usize,
    pushes: u64,
}

/// Blocking multi-producer, multi-consumer priority queue.
///
/// Consumers call [`WorkQueue::take`], process the item, then call
/// [`WorkQueue::done`]; the in-progress count feeds quiescence checks.
#[derive(Debug)]
pub struct WorkQueue<T: Ord> {
    state: Mutex<QueueState<T>>,
    ready: Condvar,
}

/// Point-in-time view of a queue used for quiescence checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueProbe {
    pub queued: usize,
    pub active: usize,
    pub pushes: u64,
}

impl<T: Ord> WorkQueue<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                buffer: PriorityBuffer::new(),
                stops: 0,
                active: 0,
                pushes: 0,
            }),
            ready: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, item: T) {
        let mut state = self.lock();
        state.buffer.push(item);
        state.pushes += 1;
        drop(state);
        self.ready.notify_one();
    }

    /// Post one stop token; exactly one consumer will observe it.
    pub fn push_stop(&self) {
        self.lock().stops += 1;
        self.ready.notify_one();
    }

    /// Block until a stop token or an item is available. Stop tokens win.
    pub fn take(&self) -> Take<T> {
        let mut state = self.lock();
        loop {
            if state.stops > 0 {
                state.stops -= 1;
                return Take::Stop;
            }
            if let Some(item) = state.buffer.pop() {
                state.active += 1;
                return Take::Work(item);
            }
            state = self
                .ready
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Mark one item obtained from [`WorkQueue::take`] as fully processed.
    pub fn done(&self) {
        let mut state = self.lock();
        state.active = state.active.saturating_sub(1);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().buffer.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().buffer.is_empty()
    }

    #[must_use]
    pub fn probe(&self) -> QueueProbe {
        let state = self.lock();
        QueueProbe {
            queued: state.buffer.len(),
            active: state.active,
            pushes: state.pushes,
        }
    }

    #[must_use]
    pub fn high_water(&self) -> usize {
        self.lock().buffer.high_water()
    }

    /// Discard queued items and unconsumed stop tokens and reset the
    /// in-progress count. Call only once every consumer has exited.
    /// Returns the number of items discarded.
    pub fn drain(&self) -> usize {
        let mut state = self.lock();
        state.stops = 0;
        state.active = 0;
        let residue = state.buffer.drain();
        drop(state);
        residue.len()
    }
}

impl<T: Ord> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
