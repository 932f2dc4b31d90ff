//! The locale abstraction: a compute node with its own memory.
//!
//! This is a single-process reimplementation, so there is no actual network
//! boundary between locales — but `Locale`/`Locales` are still real types,
//! and [`Locales::run_local`] is the one seam where a future transport
//! would slot in. Everything above this module (the hypergraph, the work
//! queue) is written against
//! that seam, not against "just index a `Vec`", so swapping the seam's
//! implementation would not require touching call sites.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Identifies one locale by its integer id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocaleId(pub usize);

impl LocaleId {
    /// The underlying integer id.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// The set of locales the engine is configured to run across.
///
/// In production this would be one entry per compute node; here it is one
/// entry per in-process shard, sized by [`crate::config::EngineConfig::locale_count`].
pub struct Locales {
    count: usize,
}

impl Locales {
    /// Creates a locale set of size `count`.
    pub fn new(count: usize) -> Self {
        assert!(count > 0, "Locales requires at least one locale");
        Self { count }
    }

    /// Number of locales in the set.
    #[inline(always)]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Deterministically shards a raw integer id across the locale set,
    /// round-robin. Used by `owner_of(VertexId)`/`owner_of(EdgeId)` in
    /// [`crate::graph::hypergraph::AdjListHyperGraph`].
    #[inline]
    pub fn owner_of_index(&self, id: usize) -> LocaleId {
        LocaleId(id % self.count)
    }

    /// Runs `f` "on" locale `loc`.
    ///
    /// In this single-process engine there is no actual remote hop, so `f`
    /// simply runs inline; a distributed transport would instead dispatch
    /// this closure's captured state to the real remote process and block
    /// for the result. Keeping the call shaped this way means hypergraph
    /// and work-queue code never assumes in-process execution directly.
    #[inline]
    pub fn run_local<R>(&self, loc: LocaleId, f: impl FnOnce() -> R) -> R {
        debug_assert!(loc.index() < self.count, "locale id out of range");
        f()
    }
}

/// A concurrent registry mapping a privatization id to one instance per
/// locale.
pub struct LocaleMap<T> {
    instances: Vec<T>,
    next_privatization_id: AtomicUsize,
}

impl<T> LocaleMap<T> {
    /// Builds a registry with one instance per locale, constructed by
    /// `make` for each locale id in turn.
    pub fn build(locales: &Locales, mut make: impl FnMut(LocaleId) -> T) -> Self {
        let instances = (0..locales.count())
            .map(|i| make(LocaleId(i)))
            .collect();
        Self {
            instances,
            next_privatization_id: AtomicUsize::new(0),
        }
    }

    /// The locale-local instance for `loc`.
    #[inline]
    pub fn get(&self, loc: LocaleId) -> &T {
        &self.instances[loc.index()]
    }

    /// Iterates every locale-local instance alongside its id.
    pub fn iter(&self) -> impl Iterator<Item = (LocaleId, &T)> {
        self.instances
            .iter()
            .enumerate()
            .map(|(i, t)| (LocaleId(i), t))
    }

    /// Allocates a fresh, process-wide-unique privatization id.
    ///
    /// Assigned once at construction time.
    pub fn next_privatization_id(&self) -> usize {
        self.next_privatization_id.fetch_add(1, Ordering::Relaxed)
    }
}
