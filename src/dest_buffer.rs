//! Bounded, fixed-capacity batch of pending cross-locale inclusions.
//!
//! `DestinationBuffer` is the insert-side aggregation buffer that converts
//! many small cross-locale writes into one bulk drain. Reservation uses a
//! `fetch_add` on `size`; the writer then stores the triple and bumps
//! `filled` — the release fence between those two steps is what lets the
//! drainer on the owning locale observe a consistent, hole-free buffer
//! (modulo in-flight slots, which are skipped).
//!
//! Each slot is a lock-free `UnsafeCell<Entry>`, not a per-slot mutex: a
//! slot's unique writer is determined by the `fetch_add` on `size` (exactly
//! one caller ever observes a given index), and the single drainer (see
//! below) observes every written slot through the `Release` store on
//! `filled` paired with an `Acquire` load, the release-sequence fence the
//! module doc describes.
//!
//! Concurrent generator workers (`run_workers` in the ER/Chung-Lu/BTER
//! drivers) all share one `DestinationBuffer` per locale, so more than one
//! thread can observe `Full`/`Closed` from [`DestinationBuffer::append`] at
//! once. Draining is therefore guarded by `drain_lock`: only the thread that
//! acquires it actually replays and clears the buffer, every other thread
//! that reaches [`DestinationBuffer::drain_and_clear`] concurrently just
//! waits its turn and then finds an already-cleared, empty buffer. Without
//! this, two concurrent drainers would each replay every filled slot,
//! double-appending every inclusion in the buffer onto `NodeData`, or race a
//! `clear()` against an in-flight `drain()`'s reads.

use std::cell::UnsafeCell;
use std::sync::atomic::Ordering;

use crate::concurrency::atomic::AtomicCounter;
use crate::descriptor::{EdgeId, VertexId};
use crate::spinlock::Spinlock;

/// Which side of the bipartite graph a destination-buffer entry targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InclusionKind {
    /// The entry's `dest_id` should be appended to a vertex's `NodeData`.
    Vertex,
    /// The entry's `dest_id` should be appended to an edge's `NodeData`.
    Edge,
    /// An unclaimed hole (a slot that was reserved but never observed
    /// written by the time of a drain, or the buffer's initial state).
    None,
}

/// A single pending cross-locale inclusion write.
#[derive(Debug, Clone, Copy)]
pub struct Entry {
    /// The id on the side that owns this buffer.
    pub src_id: usize,
    /// The id to append on the owning locale's `NodeData`.
    pub dest_id: usize,
    /// Which `NodeData` array `dest_id` belongs in.
    pub kind: InclusionKind,
}

impl Entry {
    const EMPTY: Entry = Entry {
        src_id: 0,
        dest_id: 0,
        kind: InclusionKind::None,
    };
}

/// Outcome of a single [`DestinationBuffer::append`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendStatus {
    /// The entry was stored; the buffer has room for more.
    Ok,
    /// The entry was stored and this call observed the buffer become full.
    Full,
    /// The buffer was already closed (`size >= capacity`); the caller must
    /// drain-and-clear it and retry.
    Closed,
}

/// Fixed-capacity buffer of pending `(src, dest, kind)` triples awaiting a
/// bulk drain onto the owning locale's `NodeData` arrays.
pub struct DestinationBuffer {
    capacity: usize,
    size: AtomicCounter,
    filled: AtomicCounter,
    slots: Box<[UnsafeCell<Entry>]>,
    drain_lock: Spinlock,
}

// SAFETY: each slot's writer is the single caller whose `size.fetch_add`
// returned that slot's index (never shared), and the slots are only ever
// read back by whichever thread holds `drain_lock` — the one drainer at a
// time. `filled`'s `Release` store (in `append`) paired with the drainer's
// `Acquire` load (in `drain`) is the synchronization that makes every
// writer's store visible to that drainer.
unsafe impl Sync for DestinationBuffer {}

impl DestinationBuffer {
    /// Creates an empty buffer with room for `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|_| UnsafeCell::new(Entry::EMPTY))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            capacity,
            size: AtomicCounter::new(0),
            filled: AtomicCounter::new(0),
            slots,
            drain_lock: Spinlock::new(),
        }
    }

    /// The fixed capacity this buffer was constructed with.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots reserved so far (may exceed `filled` transiently).
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.size.load(Ordering::Acquire)
    }

    /// Number of slots actually written so far.
    #[inline(always)]
    pub fn filled(&self) -> usize {
        self.filled.load(Ordering::Acquire)
    }

    /// Reserves a slot and stores `entry` in it.
    ///
    /// Once `size` has reached capacity the buffer is *closed* and this
    /// call returns `Closed` immediately rather than spinning.
    pub fn append(&self, entry: Entry) -> AppendStatus {
        let i = self.size.fetch_add(1, Ordering::AcqRel);
        if i >= self.capacity {
            return AppendStatus::Closed;
        }

        // SAFETY: `i < capacity` was just checked, and `fetch_add` on `size`
        // hands out every index at most once, so no other thread writes
        // this slot concurrently; the drainer only reads it after the
        // `filled` release/acquire pair below establishes happens-before.
        unsafe {
            *self.slots[i].get() = entry;
        }

        let filled = self.filled.fetch_add(1, Ordering::Release) + 1;
        debug_assert!(filled <= self.capacity);
        if filled == self.capacity {
            AppendStatus::Full
        } else {
            AppendStatus::Ok
        }
    }

    /// Drains every non-`None` entry into the supplied sinks and then
    /// clears the buffer back to empty, all while holding `drain_lock`.
    ///
    /// Runs on the buffer's owning locale; the caller passes closures that
    /// append to the local vertex/edge `NodeData` arrays so this type
    /// itself stays oblivious to the hypergraph's storage layout.
    ///
    /// This is the *only* entry point that reads or resets the slots: with
    /// concurrent generator workers sharing one buffer per locale, more
    /// than one thread can observe `Full`/`Closed` from [`Self::append`] at
    /// the same time and each call this method. `drain_lock` serializes
    /// them — the first thread in replays and clears every slot; every
    /// later thread blocks until that finishes, then finds `filled == 0`
    /// and does nothing, instead of double-replaying or racing a `clear()`
    /// against an in-flight read.
    pub fn drain_and_clear(
        &self,
        mut on_vertex: impl FnMut(usize, usize),
        mut on_edge: impl FnMut(usize, usize),
    ) {
        self.drain_lock.with_lock(|| {
            let filled = self.filled.load(Ordering::Acquire).min(self.capacity);
            let mut drained = 0usize;
            for slot in &self.slots[..filled] {
                // SAFETY: `drain_lock` makes this the only thread reading
                // slots right now; `filled`'s `Acquire` load above
                // synchronizes with every writer's `Release` fetch_add, so
                // all `filled` writes are visible here.
                let entry = unsafe { *slot.get() };
                match entry.kind {
                    InclusionKind::Vertex => {
                        on_vertex(entry.src_id, entry.dest_id);
                        drained += 1;
                    }
                    InclusionKind::Edge => {
                        on_edge(entry.src_id, entry.dest_id);
                        drained += 1;
                    }
                    InclusionKind::None => {}
                }
            }
            tracing::info!(target: "dest_buffer", drained, "drained destination buffer");

            for slot in self.slots.iter() {
                // SAFETY: still holding `drain_lock`; no writer can be
                // mid-write to an index below the `size` that is about to
                // be reset, per the `append` safety argument above.
                unsafe {
                    *slot.get() = Entry::EMPTY;
                }
            }
            self.filled.store(0, Ordering::Release);
            self.size.store(0, Ordering::Release);
        });
    }
}

/// Builds the vertex-side entry for routing `(v, e)` through
/// `addInclusionBuffered`.
pub fn vertex_entry(v: VertexId, e: EdgeId) -> Entry {
    Entry {
        src_id: v.index(),
        dest_id: e.index(),
        kind: InclusionKind::Vertex,
    }
}

/// Builds the edge-side entry for routing `(v, e)` through
/// `addInclusionBuffered`.
pub fn edge_entry(v: VertexId, e: EdgeId) -> Entry {
    Entry {
        src_id: e.index(),
        dest_id: v.index(),
        kind: InclusionKind::Edge,
    }
}
