//! Per-vertex / per-edge incidence list.
//!
//! `NodeData<N>` is the leaf data structure of the whole engine: a single
//! vertex's (or edge's) neighbor list, protected by its own spinlock so that
//! concurrent appends to *different* vertices never contend with one
//! another.

use std::sync::atomic::Ordering;

use crate::concurrency::atomic::AtomicCounter;
use crate::spinlock::Spinlock;

/// The incidence list for a single vertex or edge.
///
/// `N` is the neighbor descriptor type: `EdgeId` for a vertex's `NodeData`,
/// `VertexId` for an edge's `NodeData`.
pub struct NodeData<N> {
    lock: Spinlock,
    neighbors: std::cell::UnsafeCell<Vec<N>>,
    is_sorted: std::cell::UnsafeCell<bool>,
    neighbor_list_size: AtomicCounter,
}

// SAFETY: all access to `neighbors`/`is_sorted` is mediated by `lock`, which
// provides the same mutual exclusion a `Mutex` would; `AtomicCounter` is
// independently `Sync`.
unsafe impl<N: Send> Send for NodeData<N> {}
unsafe impl<N: Send> Sync for NodeData<N> {}

impl<N> NodeData<N> {
    /// Creates an empty incidence list.
    pub fn new() -> Self {
        Self {
            lock: Spinlock::new(),
            neighbors: std::cell::UnsafeCell::new(Vec::new()),
            is_sorted: std::cell::UnsafeCell::new(true),
            neighbor_list_size: AtomicCounter::new(0),
        }
    }

    /// Lock-free read of the logical neighbor count.
    ///
    /// Always up to date with the most recent completed `add_neighbors`,
    /// even if the caller never acquires the lock.
    #[inline]
    pub fn num_neighbors(&self) -> usize {
        self.neighbor_list_size.load(Ordering::Acquire)
    }

    /// Appends `items` to the neighbor list under the spinlock.
    ///
    /// Not safe to call concurrently with [`NodeData::iterate`] on the same
    /// object (readers are not protected against writers).
    pub fn add_neighbors(&self, items: impl IntoIterator<Item = N>) {
        if tracing::enabled!(tracing::Level::TRACE) {
            tracing::trace!(target: "node_data", "acquiring spinlock for append");
        }
        self.lock.with_lock(|| {
            // SAFETY: the spinlock is held for the duration of this closure.
            let neighbors = unsafe { &mut *self.neighbors.get() };
            let before = neighbors.len();
            neighbors.extend(items);
            let added = neighbors.len() - before;
            if added > 0 {
                // SAFETY: the spinlock is held.
                unsafe {
                    *self.is_sorted.get() = false;
                }
                self.neighbor_list_size
                    .fetch_add(added, Ordering::Release);
            }
        });
    }

    /// Runs `f` over a read-only view of the current neighbor sequence.
    ///
    /// Caller must not run this concurrently with a write to the same
    /// `NodeData`; the engine does not detect that misuse.
    pub fn iterate<R>(&self, f: impl FnOnce(&[N]) -> R) -> R {
        // SAFETY: caller upholds the no-concurrent-writer contract documented above.
        let neighbors = unsafe { &*self.neighbors.get() };
        f(neighbors)
    }
}

impl<N: Ord + Copy> NodeData<N> {
    /// Returns whether `needle` is present, sorting the backing storage
    /// lazily on first call after a write if it is not already sorted.
    pub fn has_neighbor(&self, needle: N) -> bool {
        self.lock.with_lock(|| {
            // SAFETY: the spinlock is held.
            let sorted = unsafe { &mut *self.is_sorted.get() };
            if !*sorted {
                // SAFETY: the spinlock is held.
                let neighbors = unsafe { &mut *self.neighbors.get() };
                neighbors.sort_unstable();
                *sorted = true;
            }
            // SAFETY: the spinlock is held.
            let neighbors = unsafe { &*self.neighbors.get() };
            neighbors.binary_search(&needle).is_ok()
        })
    }

    /// Returns a sorted snapshot of the neighbor list, sorting lazily if
    /// needed. Used by the butterfly/caterpillar analytics, which require
    /// sorted-array intersection.
    pub fn sorted_snapshot(&self) -> Vec<N> {
        self.lock.with_lock(|| {
            // SAFETY: the spinlock is held.
            let sorted = unsafe { &mut *self.is_sorted.get() };
            if !*sorted {
                // SAFETY: the spinlock is held.
                let neighbors = unsafe { &mut *self.neighbors.get() };
                neighbors.sort_unstable();
                *sorted = true;
            }
            // SAFETY: the spinlock is held.
            unsafe { (*self.neighbors.get()).clone() }
        })
    }

    /// Sorts, then removes adjacent duplicate entries, updating
    /// `neighbor_list_size` to match. Returns the number of entries removed.
    ///
    /// Duplicate inclusions are an expected, non-fatal byproduct of
    /// `generateChungLu`'s independent per-side sampling; this is the
    /// per-`NodeData` half of `removeDuplicates()`.
    pub fn dedup(&self) -> usize {
        self.lock.with_lock(|| {
            // SAFETY: the spinlock is held.
            let neighbors = unsafe { &mut *self.neighbors.get() };
            neighbors.sort_unstable();
            let before = neighbors.len();
            neighbors.dedup();
            let removed = before - neighbors.len();
            if removed > 0 {
                self.neighbor_list_size
                    .fetch_sub(removed, Ordering::Release);
            }
            // SAFETY: the spinlock is held.
            unsafe {
                *self.is_sorted.get() = true;
            }
            removed
        })
    }
}

impl<N> Default for NodeData<N> {
    fn default() -> Self {
        Self::new()
    }
}
