//! Per-locale work-stealing "bag": an array of [`BagSegment`]s, one per
//! worker thread, with round-robin hints steering producers/consumers to
//! their own segment in the common case.

use std::sync::atomic::Ordering;

use crate::concurrency::atomic::AtomicCounter;
use crate::concurrency::CachePadded;

use super::segment::BagSegment;

/// A set of per-thread [`BagSegment`]s sized by a locale's parallelism.
pub struct Bag<T> {
    segments: Vec<CachePadded<BagSegment<T>>>,
    start_idx_enq: AtomicCounter,
    start_idx_deq: AtomicCounter,
}

impl<T> Bag<T> {
    /// Creates a bag with `max_task_par` segments.
    pub fn new(max_task_par: usize, initial_block_size: usize, max_block_size: usize) -> Self {
        assert!(max_task_par > 0, "Bag requires at least one segment");
        let segments = (0..max_task_par)
            .map(|_| CachePadded::new(BagSegment::new(initial_block_size, max_block_size)))
            .collect();
        Self {
            segments,
            start_idx_enq: AtomicCounter::new(0),
            start_idx_deq: AtomicCounter::new(0),
        }
    }

    /// Total number of segments (the locale's configured parallelism).
    #[inline(always)]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Sum of every segment's element count. Not a single atomic snapshot
    /// (segments may be mutated concurrently), but is exact in any quiescent
    /// state, which is all callers of this method need.
    pub fn size(&self) -> usize {
        self.segments.iter().map(|s| s.len()).sum()
    }

    /// Whether every segment is currently empty.
    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|s| s.is_empty())
    }

    /// Adds `item` to the bag: pins to the hinted segment and retries until
    /// it is acquired (the "average-case" enqueue path).
    pub fn add(&self, item: T) {
        let hint = self.start_idx_enq.fetch_add(1, Ordering::Relaxed) % self.segments.len();
        let segment = &self.segments[hint];
        let mut item = item;
        loop {
            match segment.try_push(item, true) {
                Ok(()) => return,
                Err(back) => item = back,
            }
        }
    }

    /// Attempts a non-blocking add: scans every segment once
    /// (the best-case enqueue path), returning the item back if every segment was
    /// contended.
    pub fn try_add(&self, item: T) -> Result<(), T> {
        let n = self.segments.len();
        let hint = self.start_idx_enq.fetch_add(1, Ordering::Relaxed) % n;
        let mut item = item;
        for offset in 0..n {
            let idx = (hint + offset) % n;
            match self.segments[idx].try_push(item, false) {
                Ok(()) => return Ok(()),
                Err(back) => item = back,
            }
        }
        Err(item)
    }

    /// Removes and returns one item, scanning from the hinted segment and
    /// accepting contention rather than retrying forever (the
    /// "average-case" dequeue path). Returns `None` only once every
    /// segment has been observed empty.
    pub fn remove(&self) -> Option<T> {
        let n = self.segments.len();
        let hint = self.start_idx_deq.fetch_add(1, Ordering::Relaxed) % n;

        for offset in 0..n {
            let idx = (hint + offset) % n;
            let segment = &self.segments[idx];
            if segment.is_empty() {
                continue;
            }
            if let Some(item) = segment.try_pop(true) {
                return Some(item);
            }
        }
        None
    }

    /// Bulk-removes up to `n` items from the hinted segment (falling back to
    /// the next non-empty segment), for callers that want to drain a batch
    /// in one shot instead of popping one at a time.
    pub fn take_elements(&self, n: usize) -> Vec<T> {
        let segment_count = self.segments.len();
        let hint = self.start_idx_deq.fetch_add(1, Ordering::Relaxed) % segment_count;
        for offset in 0..segment_count {
            let idx = (hint + offset) % segment_count;
            let segment = &self.segments[idx];
            if segment.is_empty() {
                continue;
            }
            let taken = segment.take_elements(n, true);
            if !taken.is_empty() {
                return taken;
            }
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_remove_round_trips() {
        let bag: Bag<u32> = Bag::new(4, 4, 16);
        for i in 0..100u32 {
            bag.add(i);
        }
        assert_eq!(bag.size(), 100);

        let mut seen = Vec::new();
        while let Some(item) = bag.remove() {
            seen.push(item);
        }
        seen.sort_unstable();
        assert_eq!(seen, (0..100).collect::<Vec<_>>());
        assert!(bag.is_empty());
    }

    #[test]
    fn size_matches_add_minus_remove_under_concurrency() {
        let bag = std::sync::Arc::new(Bag::<u32>::new(8, 4, 32));
        std::thread::scope(|scope| {
            for t in 0..8u32 {
                let bag = std::sync::Arc::clone(&bag);
                scope.spawn(move || {
                    for i in 0..200 {
                        bag.add(t * 200 + i);
                    }
                });
            }
        });
        assert_eq!(bag.size(), 1600);

        let removed = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        std::thread::scope(|scope| {
            for _ in 0..8 {
                let bag = std::sync::Arc::clone(&bag);
                let removed = std::sync::Arc::clone(&removed);
                scope.spawn(move || {
                    while bag.remove().is_some() {
                        removed.fetch_add(1, Ordering::Relaxed);
                    }
                });
            }
        });
        assert_eq!(removed.load(Ordering::Relaxed), 1600);
        assert!(bag.is_empty());
    }
}
