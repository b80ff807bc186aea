//! Fixed-capacity sliding window of recent values.
//!
//! Backed by a `HeapRb`; when full, the oldest value is evicted before the
//! new one is pushed, so the window always holds the most recent
//! `min(count, capacity)` values in arrival order.

use std::fmt;
use std::num::NonZeroUsize;

use ringbuf::{traits::*, HeapRb};

/// Sliding window over the most recent samples of one axis
pub struct SlidingWindow {
    ring: HeapRb<f64>,
    capacity: NonZeroUsize,
    /// Most recently enqueued value, cached so `head` is O(1)
    newest: Option<f64>,
}

impl fmt::Debug for SlidingWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlidingWindow")
            .field("len", &self.ring.occupied_len())
            .field("capacity", &self.capacity)
            .field("head", &self.newest)
            .finish()
    }
}

impl SlidingWindow {
    /// Create an empty window
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            ring: HeapRb::new(capacity.get()),
            capacity,
            newest: None,
        }
    }

    /// Push a value, evicting the oldest when full
    #[inline]
    pub fn enqueue(&mut self, value: f64) {
        if self.ring.is_full() {
            let _ = self.ring.try_pop();
        }
        let _ = self.ring.try_push(value);
        self.newest = Some(value);
    }

    /// Most recently enqueued value, 0.0 when empty
    #[inline]
    pub fn head(&self) -> f64 {
        self.newest.unwrap_or(0.0)
    }

    /// Oldest retained value, 0.0 when empty
    #[inline]
    pub fn tail(&self) -> f64 {
        self.ring.iter().next().copied().unwrap_or(0.0)
    }

    /// Number of retained values
    #[inline]
    pub fn len(&self) -> usize {
        self.ring.occupied_len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    /// Arithmetic mean of the retained values, `None` when empty
    pub fn mean(&self) -> Option<f64> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        Some(self.ring.iter().sum::<f64>() / len as f64)
    }

    /// Retained values, most recent first
    pub fn values(&self) -> Vec<f64> {
        let mut values: Vec<f64> = self.ring.iter().copied().collect();
        values.reverse();
        values
    }

    /// Drop all values, keeping the capacity
    pub fn clear(&mut self) {
        self.ring = HeapRb::new(self.capacity.get());
        self.newest = None;
    }
}
