//! A single unrolled-list node: a contiguous, growable run of work items.
//!
//! Pushes append to the end; pops remove from the end. Treating each block
//! as a small stack (rather than a shifting queue) keeps both operations
//! O(1) and cache-friendly; the *block chain* (see `segment.rs`) is what
//! gives the overall structure its FIFO-across-blocks ordering.

/// One node of a `BagSegment`'s unrolled linked list.
pub struct BagSegmentBlock<T> {
    data: Vec<T>,
    capacity: usize,
}

impl<T> BagSegmentBlock<T> {
    /// Creates an empty block with room for `capacity` items.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// The capacity this block was allocated with.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of items currently stored in this block.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether this block holds no items.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether this block has no remaining room for pushes.
    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.data.len() >= self.capacity
    }

    /// Appends `item`. Caller must check [`BagSegmentBlock::is_full`] first.
    #[inline]
    pub fn push(&mut self, item: T) {
        debug_assert!(!self.is_full(), "push into a full BagSegmentBlock");
        self.data.push(item);
    }

    /// Removes and returns the most recently pushed item, if any.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        self.data.pop()
    }

    /// Removes and returns up to `n` items in one bulk transfer, in
    /// most-recently-pushed-first order, for `Bag::take_elements`.
    pub fn take(&mut self, n: usize) -> Vec<T> {
        let take_n = n.min(self.data.len());
        self.data.split_off(self.data.len() - take_n)
    }

    /// Computes the next block's capacity given this block's capacity and a
    /// ceiling: `min(max_block_size, 2 * capacity)`.
    pub fn next_capacity(&self, max_block_size: usize) -> usize {
        self.capacity.saturating_mul(2).min(max_block_size)
    }
}
