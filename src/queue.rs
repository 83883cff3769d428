//! Bounded binary min-heap used to drive tree construction.
//!
//! Entries are ordered by `(weight, sequence)`, where `sequence` is the
//! insertion counter. Equal weights therefore come out in FIFO order, which
//! keeps the resulting tree identical across runs on the same input.

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
struct Entry<T> {
    weight: u64,
    seq: u64,
    item: T,
}

impl<T> Entry<T> {
    fn key(&self) -> (u64, u64) {
        (self.weight, self.seq)
    }
}

/// Array-backed min-heap with a fixed capacity.
#[derive(Debug, Clone)]
pub struct PriorityQueue<T> {
    entries: Vec<Entry<T>>,
    capacity: usize,
    next_seq: u64,
}

impl<T> PriorityQueue<T> {
    /// Create an empty queue that holds at most `capacity` items.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
            next_seq: 0,
        }
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of items the queue accepts.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert `item` keyed by `weight`.
    ///
    /// # Errors
    /// Returns `Error::QueueOverflow` if the queue is already full; the item is dropped
    /// and the queue is left unchanged.
    pub fn insert(&mut self, item: T, weight: u64) -> Result<()> {
        if self.entries.len() >= self.capacity {
            return Err(Error::QueueOverflow {
                capacity: self.capacity,
            });
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Entry { weight, seq, item });
        self.sift_up(self.entries.len() - 1);
        Ok(())
    }

    /// Remove and return the lowest-weight item, or `None` if empty.
    pub fn extract_min(&mut self) -> Option<T> {
        if self.entries.is_empty() {
            return None;
        }

        let last = self.entries.len() - 1;
        self.entries.swap(0, last);
        let min = self.entries.pop()?;
        if !self.entries.is_empty() {
            self.sift_down(0);
        }
        Some(min.item)
    }

    /// Remove the lowest-weight item together with its weight.
    pub fn extract_min_weighted(&mut self) -> Option<(T, u64)> {
        let weight = self.entries.first()?.weight;
        self.extract_min().map(|item| (item, weight))
    }

    fn sift_up(&mut self, mut idx: usize) {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if self.entries[idx].key() >= self.entries[parent].key() {
                break;
            }
            self.entries.swap(idx, parent);
            idx = parent;
        }
    }

    fn sift_down(&mut self, mut idx: usize) {
        let n = self.entries.len();
        loop {
            let left = 2 * idx + 1;
            let right = left + 1;
            let mut lower = idx;

            if left < n && self.entries[left].key() < self.entries[lower].key() {
                lower = left;
            }
            if right < n && self.entries[right].key() < self.entries[lower].key() {
                lower = right;
            }
            if lower == idx {
                break;
            }
            self.entries.swap(idx, lower);
            idx = lower;
        }
    }
}
