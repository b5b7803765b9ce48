//! Bucketed priority queue
//!
//! A bounded-range minimum queue over label indices. Keys are nonnegative
//! weighted costs quantized into fixed-size buckets; items beyond the
//! range land in an overflow bucket that is rebased (the range advanced
//! and its items redistributed) once the main buckets run dry. With
//! integer-quantized nonnegative weights this gives amortized O(1) pops
//! where a binary heap pays a log factor on millions of labels.
//!
//! The queue stores indices only; the caller supplies a cost accessor to
//! `pop` so overflow rebasing can read the current sort cost of a label.
//!
//! Ties within a bucket pop in push order (FIFO); a decrease re-enqueues
//! the item at the back of its new bucket. Either way the order is a pure
//! function of the operation sequence, so runs are deterministic.

use std::collections::VecDeque;

pub use crate::label::INVALID_LABEL;

pub struct BucketQueue {
    buckets: Vec<VecDeque<u32>>,
    overflow: VecDeque<u32>,
    bucket_size: f32,
    /// Cost at the bottom of bucket 0.
    min_cost: f32,
    /// Cost at the top of the last main bucket; everything at or beyond
    /// goes to overflow.
    max_cost: f32,
    /// Scan position: buckets below this are known empty.
    current: usize,
    size: usize,
}

impl BucketQueue {
    /// `range` is the span of the main buckets (`bucket_count ×
    /// bucket_size`); `bucket_size` is the costing's unit size.
    pub fn new(min_cost: f32, range: f32, bucket_size: f32) -> Self {
        assert!(bucket_size > 0.0, "bucket size must be positive");
        assert!(range >= bucket_size, "range must cover at least one bucket");
        let bucket_count = (range / bucket_size).ceil() as usize;
        Self {
            buckets: vec![VecDeque::new(); bucket_count],
            overflow: VecDeque::new(),
            bucket_size,
            min_cost,
            max_cost: min_cost + bucket_count as f32 * bucket_size,
            current: 0,
            size: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Bucket slot for `key`; `None` means overflow. Keys below the
    /// current base (possible after aggressive decreases) clamp into the
    /// lowest bucket.
    fn bucket_for(&self, key: f32) -> Option<usize> {
        if key >= self.max_cost {
            return None;
        }
        let b = ((key - self.min_cost).max(0.0) / self.bucket_size) as usize;
        Some(b.min(self.buckets.len() - 1))
    }

    pub fn push(&mut self, idx: u32, key: f32) {
        match self.bucket_for(key) {
            Some(b) => {
                self.buckets[b].push_back(idx);
                self.current = self.current.min(b);
            }
            None => self.overflow.push_back(idx),
        }
        self.size += 1;
    }

    /// Remove and return the index with the smallest key, or `None` when
    /// the queue is empty. Ties within a bucket come out in push order.
    /// `sort_cost` reads the current key of a label; it is consulted when
    /// overflow items must be rebased into the main range.
    pub fn pop(&mut self, sort_cost: impl Fn(u32) -> f32) -> Option<u32> {
        loop {
            while self.current < self.buckets.len() {
                if let Some(idx) = self.buckets[self.current].pop_front() {
                    self.size -= 1;
                    return Some(idx);
                }
                self.current += 1;
            }
            if self.overflow.is_empty() {
                return None;
            }
            self.rebase(&sort_cost);
        }
    }

    /// Move an item to the bucket of its lowered key. `new_key` must not
    /// exceed `old_key` — costs only ever shrink during relaxation.
    pub fn decrease(&mut self, idx: u32, new_key: f32, old_key: f32) {
        debug_assert!(new_key <= old_key, "decrease must not raise a key");
        let removed = match self.bucket_for(old_key) {
            Some(b) => remove_item(&mut self.buckets[b], idx),
            None => remove_item(&mut self.overflow, idx),
        };
        debug_assert!(removed, "decrease on an index not in the queue");
        if removed {
            self.size -= 1;
            self.push(idx, new_key);
        }
    }

    /// Advance the bucket range to the smallest overflow key and pull the
    /// overflow items that now fit back into the main buckets.
    fn rebase(&mut self, sort_cost: &impl Fn(u32) -> f32) {
        let mut low = f32::MAX;
        for &idx in &self.overflow {
            low = low.min(sort_cost(idx));
        }
        // Align the new base to a bucket boundary so bucket membership
        // stays stable across rebases.
        let base = (low / self.bucket_size).floor() * self.bucket_size;
        self.min_cost = base;
        self.max_cost = base + self.buckets.len() as f32 * self.bucket_size;
        self.current = 0;

        let pending = std::mem::take(&mut self.overflow);
        for idx in pending {
            let key = sort_cost(idx);
            match self.bucket_for(key) {
                Some(b) => self.buckets[b].push_back(idx),
                None => self.overflow.push_back(idx),
            }
        }
    }

    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.overflow.clear();
        self.current = 0;
        self.size = 0;
    }
}

// Order-preserving removal, so a decrease does not shuffle the FIFO
// order of the items left behind.
fn remove_item(bucket: &mut VecDeque<u32>, idx: u32) -> bool {
    match bucket.iter().position(|&i| i == idx) {
        Some(pos) => {
            bucket.remove(pos);
            true
        }
        None => false,
    }
}
