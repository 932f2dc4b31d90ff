//! # `hyperloom` — a distributed, parallel hypergraph engine
//!
//! Construction, mutation, traversal, and analytic queries over bipartite
//! vertex/edge incidence structures, built for scientific workloads (random
//! hypergraph generation, community discovery, butterfly/caterpillar
//! analytics) that need to scale across multi-node, multi-threaded
//! environments with minimum communication overhead.
//!
//! ## Architecture
//!
//! Four tightly coupled subsystems carry the hard engineering:
//!
//! - [`node_data`] — per-vertex/per-edge incidence lists, each guarded by its
//!   own [`spinlock::Spinlock`] so that concurrent appends to *different*
//!   nodes never contend.
//! - [`concurrency::worklist`] + [`work_queue`] — a per-locale,
//!   per-thread work-stealing "bag" with an optional aggregating enqueue on
//!   top, the distributed facade that analytic traversals submit work to.
//! - [`termination`] — the started/finished quiescence protocol that lets
//!   dynamically generated, cross-locale work know when it is done.
//! - [`generators`] — Erdős–Rényi, Chung–Lu, and BTER random hypergraph
//!   generation, driving the buffered insertion path in [`dest_buffer`].
//!
//! [`graph::AdjListHyperGraph`] ties the vertex/edge arrays together with a
//! privatized per-locale handle (see [`locale`]) and exposes the analytic
//! queries in [`graph::analytics`].
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use hyperloom::descriptor::{EdgeId, VertexId};
//! use hyperloom::graph::AdjListHyperGraph;
//! use hyperloom::locale::Locales;
//!
//! let graph = AdjListHyperGraph::new(4, 4, Arc::new(Locales::new(1)), 1 << 10);
//! graph.add_inclusion(VertexId(0), EdgeId(0)).unwrap();
//! graph.add_inclusion_buffered(VertexId(1), EdgeId(1)).unwrap();
//! graph.flush_buffers();
//!
//! assert_eq!(graph.vertex_degree(VertexId(0)), 1);
//! assert_eq!(graph.vertex_degree(VertexId(1)), 1);
//! ```

#![warn(missing_docs, clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod concurrency;
pub mod config;
pub mod descriptor;
pub mod dest_buffer;
pub mod error;
pub mod generators;
pub mod graph;
pub mod locale;
pub mod node_data;
pub mod spinlock;
pub mod termination;
pub mod work_queue;

pub use config::EngineConfig;
pub use descriptor::{EdgeId, VertexId};
pub use error::{EngineError, EngineResult};
pub use graph::AdjListHyperGraph;
pub use locale::{LocaleId, Locales};
pub use termination::TerminationDetector;

// Compile-time assertions for memory layout optimizations.
const _: () = {
    use core::mem;

    // Descriptors are thin newtypes over `usize`, never boxed.
    assert!(mem::size_of::<VertexId>() == mem::size_of::<usize>());
    assert!(mem::size_of::<EdgeId>() == mem::size_of::<usize>());

    // `LocaleId` is likewise a bare integer, not a pointer-bearing handle.
    assert!(mem::size_of::<LocaleId>() == mem::size_of::<usize>());
};
