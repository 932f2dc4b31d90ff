//! A single worker thread's share of a `Bag`: a status-word-protected chain
//! of `BagSegmentBlock`s.
//!
//! The status word (`UNLOCKED`/`ADD`/`REMOVE`/`LOOKUP`) is the segment's
//! entire synchronization mechanism — a compare-exchange acquires it, the
//! holder mutates the block chain through an `UnsafeCell`, and a release
//! store puts it back to `UNLOCKED`. This is deliberately the same
//! test-and-test-and-set shape as [`crate::spinlock::Spinlock`], specialized
//! to carry an operation tag instead of a bare bool, because a dequeue needs
//! to distinguish "locked by a concurrent add" from "locked by a concurrent
//! remove" when deciding whether to keep scanning for a stealable segment.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::concurrency::atomic::AtomicCounter;
use super::block::BagSegmentBlock;

const UNLOCKED: u8 = 0;
const ADD: u8 = 1;
const REMOVE: u8 = 2;
const LOOKUP: u8 = 3;

/// One worker thread's private (but stealable) share of a [`super::Bag`].
pub struct BagSegment<T> {
    status: AtomicU8,
    blocks: std::cell::UnsafeCell<VecDeque<BagSegmentBlock<T>>>,
    n_elems: AtomicCounter,
    initial_block_size: usize,
    max_block_size: usize,
}

// SAFETY: all access to `blocks` is gated by a successful CAS on `status`,
// the same discipline `Spinlock` uses for its payload.
unsafe impl<T: Send> Send for BagSegment<T> {}
unsafe impl<T: Send> Sync for BagSegment<T> {}

/// Which operation currently holds a segment, used by the two-phase
/// dequeue scan to tell "busy with an add" apart from "busy with a remove".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentStatus {
    /// No operation holds the segment.
    Unlocked,
    /// An enqueue holds the segment.
    Add,
    /// A dequeue holds the segment.
    Remove,
    /// A non-mutating lookup holds the segment.
    Lookup,
}

impl<T> BagSegment<T> {
    /// Creates an empty segment.
    pub fn new(initial_block_size: usize, max_block_size: usize) -> Self {
        Self {
            status: AtomicU8::new(UNLOCKED),
            blocks: std::cell::UnsafeCell::new(VecDeque::new()),
            n_elems: AtomicCounter::new(0),
            initial_block_size,
            max_block_size,
        }
    }

    /// Lock-free peek at this segment's current status.
    #[inline]
    pub fn peek_status(&self) -> SegmentStatus {
        match self.status.load(Ordering::Acquire) {
            ADD => SegmentStatus::Add,
            REMOVE => SegmentStatus::Remove,
            LOOKUP => SegmentStatus::Lookup,
            _ => SegmentStatus::Unlocked,
        }
    }

    /// Lock-free peek at the element count (`nElems`).
    #[inline]
    pub fn len(&self) -> usize {
        self.n_elems.load(Ordering::Acquire)
    }

    /// Whether this segment currently holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attempts to acquire the segment for `tag`, cooperatively yielding
    /// between observations if `wait` is set (the "average-case" scan);
    /// returns `false` immediately without yielding if `wait` is
    /// unset (the "best-case" scan).
    fn try_acquire(&self, tag: u8, wait: bool) -> bool {
        loop {
            if self
                .status
                .compare_exchange(UNLOCKED, tag, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
            {
                return true;
            }
            if !wait {
                return false;
            }
            if self.status.load(Ordering::Relaxed) == UNLOCKED {
                continue;
            }
            std::thread::yield_now();
            return false;
        }
    }

    fn release(&self) {
        self.status.store(UNLOCKED, Ordering::Release);
    }

    /// Attempts to push `item` onto this segment.
    ///
    /// `wait` selects between the best-case (fail fast if contended) and
    /// average-case (pin and retry) enqueue strategies.
    pub fn try_push(&self, item: T, wait: bool) -> Result<(), T> {
        if !self.try_acquire(ADD, wait) {
            return Err(item);
        }
        // SAFETY: this thread holds the ADD status.
        let blocks = unsafe { &mut *self.blocks.get() };
        if blocks.back().map(|b| b.is_full()).unwrap_or(true) {
            let next_cap = blocks
                .back()
                .map(|b| b.next_capacity(self.max_block_size))
                .unwrap_or(self.initial_block_size);
            blocks.push_back(BagSegmentBlock::with_capacity(next_cap));
        }
        blocks.back_mut().unwrap().push(item);
        self.n_elems.fetch_add(1, Ordering::AcqRel);
        self.release();
        Ok(())
    }

    /// Attempts to pop one item from this segment's head block.
    ///
    /// An emptied head block is unlinked. Returns `None` both when the
    /// segment could not be acquired and when it was acquired but empty;
    /// callers distinguish the two via [`BagSegment::peek_status`]/`len`
    /// before calling, matching the "traversed and all empty" contract.
    pub fn try_pop(&self, wait: bool) -> Option<T> {
        if !self.try_acquire(REMOVE, wait) {
            return None;
        }
        // SAFETY: this thread holds the REMOVE status.
        let blocks = unsafe { &mut *self.blocks.get() };
        let item = loop {
            match blocks.front_mut() {
                None => break None,
                Some(head) => match head.pop() {
                    Some(item) => break Some(item),
                    None => {
                        blocks.pop_front();
                    }
                },
            }
        };
        if item.is_some() {
            self.n_elems.fetch_sub(1, Ordering::AcqRel);
        }
        debug_assert!(
            !(blocks.is_empty() && self.n_elems.load(Ordering::Relaxed) != 0),
            "BagSegment block chain emptied while nElems > 0"
        );
        self.release();
        item
    }

    /// Bulk-removes up to `n` items from the head of the segment in one
    /// acquisition, reducing `nElems` once (the `takeElements` bulk path).
    pub fn take_elements(&self, n: usize, wait: bool) -> Vec<T> {
        if n == 0 || !self.try_acquire(REMOVE, wait) {
            return Vec::new();
        }
        // SAFETY: this thread holds the REMOVE status.
        let blocks = unsafe { &mut *self.blocks.get() };
        let mut taken = Vec::with_capacity(n);
        while taken.len() < n {
            let Some(head) = blocks.front_mut() else {
                break;
            };
            let want = n - taken.len();
            let mut chunk = head.take(want);
            let got_all = chunk.len() == want;
            taken.append(&mut chunk);
            if head.is_empty() {
                blocks.pop_front();
            }
            if got_all {
                break;
            }
        }
        if !taken.is_empty() {
            self.n_elems.fetch_sub(taken.len(), Ordering::AcqRel);
        }
        self.release();
        taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometric_growth_push_then_pop_all() {
        let seg: BagSegment<u32> = BagSegment::new(2, 8);
        for i in 0..20u32 {
            seg.try_push(i, true).unwrap();
        }
        assert_eq!(seg.len(), 20);

        let mut popped = Vec::new();
        while let Some(item) = seg.try_pop(true) {
            popped.push(item);
        }
        assert_eq!(popped.len(), 20);
        assert_eq!(seg.len(), 0);
        assert!(seg.is_empty());
    }

    #[test]
    fn take_elements_reduces_count_once() {
        let seg: BagSegment<u32> = BagSegment::new(4, 16);
        for i in 0..10u32 {
            seg.try_push(i, true).unwrap();
        }
        let taken = seg.take_elements(5, true);
        assert_eq!(taken.len(), 5);
        assert_eq!(seg.len(), 5);
    }
}
