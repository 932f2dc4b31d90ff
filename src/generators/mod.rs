//! Random hypergraph generators: Erdős–Rényi, Chung–Lu, and BTER.
//!
//! Each generator drives [`crate::graph::AdjListHyperGraph::add_inclusion_buffered`]
//! rather than the direct insertion path, since generation is the
//! cross-locale-heavy workload the buffered protocol exists for.

pub mod bter;
pub mod chung_lu;
pub mod erdos_renyi;
pub mod rng;
pub mod sampling;

pub use bter::{generate_bter, BterParams};
pub use chung_lu::generate_chung_lu;
pub use erdos_renyi::generate_erdos_renyi;
