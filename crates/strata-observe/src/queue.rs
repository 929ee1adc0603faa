//! Bounded, pollable event queue.

use crate::{IndexEvent, Observer};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Default number of buffered events before the oldest are evicted.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// An [`Observer`] that buffers events until a consumer drains them.
///
/// A UI that redraws on its own schedule polls this instead of being called
/// back from inside the index. When full, the oldest event is evicted and
/// counted in [`dropped`](Self::dropped); `emit` never blocks on a slow
/// consumer.
pub struct EventQueue {
    buffer: Mutex<VecDeque<IndexEvent>>,
    capacity: usize,
    dropped: Mutex<u64>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    /// Create a queue holding at most `capacity` events (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_QUEUE_CAPACITY))),
            capacity,
            dropped: Mutex::new(0),
        }
    }

    /// Take every buffered event, oldest first.
    pub fn drain(&self) -> Vec<IndexEvent> {
        self.buffer.lock().drain(..).collect()
    }

    /// Take the oldest buffered event.
    pub fn pop(&self) -> Option<IndexEvent> {
        self.buffer.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.buffer.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events evicted because the queue was full.
    pub fn dropped(&self) -> u64 {
        *self.dropped.lock()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for EventQueue {
    fn emit(&self, event: IndexEvent) {
        let mut buf = self.buffer.lock();
        if buf.len() >= self.capacity {
            buf.pop_front();
            *self.dropped.lock() += 1;
        }
        buf.push_back(event);
    }
}
