//! The hypergraph store and its analytic queries.

pub mod analytics;
pub mod hypergraph;
pub mod intersection;

pub use hypergraph::AdjListHyperGraph;
