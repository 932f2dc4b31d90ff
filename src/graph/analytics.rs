//! Butterfly / caterpillar / metamorphosis-coefficient analytics.
//!
//! A *butterfly* is a 4-cycle in the bipartite incidence graph: two vertices
//! sharing at least two common hyperedges. Counting them directly (all
//! pairs of edges through a vertex) is quadratic in degree; instead we use
//! the "distance-two multiplicity" trick — for every vertex `w` reachable
//! from `v` in exactly two hops, count how many distinct two-hop paths
//! reach it, then turn each count `c` into `choose(c, 2)` butterflies.

use std::collections::HashMap;

use crate::descriptor::{EdgeId, VertexId};
use crate::error::EngineResult;

use super::hypergraph::{choose2, AdjListHyperGraph};

impl AdjListHyperGraph {
    /// Number of butterflies each vertex participates in, indexed by
    /// vertex id.
    pub fn get_vertex_num_butterflies(&self) -> Vec<usize> {
        self.get_vertices()
            .map(|v| self.inclusion_free_vertex_butterflies(v))
            .collect()
    }

    /// Number of butterflies each edge participates in, indexed by edge id.
    pub fn get_edge_butterflies(&self) -> Vec<usize> {
        self.get_edges()
            .map(|e| self.inclusion_free_edge_butterflies(e))
            .collect()
    }

    /// Parallel counterpart to [`AdjListHyperGraph::get_vertex_num_butterflies`].
    ///
    /// Every vertex's count only reads `sorted_snapshot()`s (never mutates),
    /// so the per-vertex computations are independent and safe to fan out
    /// across a `rayon` thread pool; gated behind the `parallel` feature to
    /// keep the default build free of the `rayon` dependency.
    #[cfg(feature = "parallel")]
    pub fn get_vertex_num_butterflies_parallel(&self) -> Vec<usize> {
        use rayon::prelude::*;
        (0..self.num_vertices())
            .into_par_iter()
            .map(|i| self.inclusion_free_vertex_butterflies(VertexId(i)))
            .collect()
    }

    /// Parallel counterpart to [`AdjListHyperGraph::get_edge_butterflies`].
    #[cfg(feature = "parallel")]
    pub fn get_edge_butterflies_parallel(&self) -> Vec<usize> {
        use rayon::prelude::*;
        (0..self.num_edges())
            .into_par_iter()
            .map(|i| self.inclusion_free_edge_butterflies(EdgeId(i)))
            .collect()
    }

    fn inclusion_free_vertex_butterflies(&self, v: VertexId) -> usize {
        let mut two_hop_counts: HashMap<VertexId, usize> = HashMap::new();
        for e in self.vertex_node_data(v).sorted_snapshot() {
            for w in self.edge_node_data(e).sorted_snapshot() {
                if w != v {
                    *two_hop_counts.entry(w).or_insert(0) += 1;
                }
            }
        }
        two_hop_counts.values().map(|&c| choose2(c)).sum()
    }

    fn inclusion_free_edge_butterflies(&self, e: EdgeId) -> usize {
        let mut two_hop_counts: HashMap<EdgeId, usize> = HashMap::new();
        for v in self.edge_node_data(e).sorted_snapshot() {
            for e2 in self.vertex_node_data(v).sorted_snapshot() {
                if e2 != e {
                    *two_hop_counts.entry(e2).or_insert(0) += 1;
                }
            }
        }
        two_hop_counts.values().map(|&c| choose2(c)).sum()
    }

    /// Number of butterflies passing through the specific inclusion
    /// `(v, e)`: for every other vertex `w` sharing edge `e` with `v`, the
    /// number of additional edges (besides `e`) that `v` and `w` also share.
    pub fn get_inclusion_num_butterflies(&self, v: VertexId, e: EdgeId) -> EngineResult<usize> {
        self.check_ids(v, e)?;
        let v_edges = self.vertex_node_data(v).sorted_snapshot();
        let e_vertices = self.edge_node_data(e).sorted_snapshot();

        let mut total = 0;
        for w in &e_vertices {
            if *w == v {
                continue;
            }
            let w_edges = self.vertex_node_data(*w).sorted_snapshot();
            let shared = super::intersection::intersection_size(&v_edges, &w_edges);
            // `e` itself is always counted in `shared`; a butterfly needs a
            // *second* shared edge to close the 4-cycle.
            total += shared.saturating_sub(1);
        }
        Ok(total)
    }

    /// `(deg(v) - 1) * (deg(e) - 1)`: the number of open 4-paths through the
    /// inclusion `(v, e)`.
    pub fn get_inclusion_num_caterpillars(&self, v: VertexId, e: EdgeId) -> EngineResult<usize> {
        self.check_ids(v, e)?;
        let dv = self.vertex_degree(v).saturating_sub(1);
        let de = self.edge_degree(e).saturating_sub(1);
        Ok(dv * de)
    }

    /// `butterflies(v, e) / caterpillars(v, e)`, or `0.0` if there are no
    /// caterpillars through this inclusion.
    pub fn get_inclusion_metamorph_coef(&self, v: VertexId, e: EdgeId) -> EngineResult<f64> {
        let butterflies = self.get_inclusion_num_butterflies(v, e)?;
        let caterpillars = self.get_inclusion_num_caterpillars(v, e)?;
        Ok(if caterpillars == 0 {
            0.0
        } else {
            butterflies as f64 / caterpillars as f64
        })
    }

    fn check_ids(&self, v: VertexId, e: EdgeId) -> EngineResult<()> {
        if v.index() >= self.num_vertices() {
            return Err(crate::error::precondition(format!(
                "vertex id {} out of range",
                v.index()
            )));
        }
        if e.index() >= self.num_edges() {
            return Err(crate::error::precondition(format!(
                "edge id {} out of range",
                e.index()
            )));
        }
        Ok(())
    }
}
