//! The adjacency-list hypergraph store: vertex/edge arrays, privatized
//! per-locale handles, and the buffered inclusion protocol.

use std::sync::Arc;

use crate::dest_buffer::{edge_entry, vertex_entry, AppendStatus, DestinationBuffer};
use crate::descriptor::{EdgeId, VertexId};
use crate::error::{precondition, EngineResult};
use crate::locale::{LocaleId, LocaleMap, Locales};
use crate::node_data::NodeData;

/// Vertex and edge incidence arrays, privatized per locale, with buffered
/// cross-locale inclusion insertion.
pub struct AdjListHyperGraph {
    num_vertices: usize,
    num_edges: usize,
    vertex_data: Vec<NodeData<EdgeId>>,
    edge_data: Vec<NodeData<VertexId>>,
    locales: Arc<Locales>,
    dest_buffers: LocaleMap<DestinationBuffer>,
    privatization_id: usize,
}

impl AdjListHyperGraph {
    /// Allocates a hypergraph with `num_vertices` vertices and `num_edges`
    /// edges, every `NodeData` initialized empty, sharded across `locales`.
    pub fn new(num_vertices: usize, num_edges: usize, locales: Arc<Locales>, dest_buffer_capacity: usize) -> Self {
        let vertex_data = (0..num_vertices).map(|_| NodeData::new()).collect();
        let edge_data = (0..num_edges).map(|_| NodeData::new()).collect();
        let dest_buffers = LocaleMap::build(&locales, |_| DestinationBuffer::new(dest_buffer_capacity));
        let privatization_id = dest_buffers.next_privatization_id();

        tracing::info!(
            target: "hypergraph",
            num_vertices,
            num_edges,
            locales = locales.count(),
            privatization_id,
            "constructed AdjListHyperGraph"
        );

        Self {
            num_vertices,
            num_edges,
            vertex_data,
            edge_data,
            locales,
            dest_buffers,
            privatization_id,
        }
    }

    /// Number of vertices in the domain.
    #[inline(always)]
    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    /// Number of edges in the domain.
    #[inline(always)]
    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    /// The privatization id assigned at construction.
    #[inline(always)]
    pub fn privatization_id(&self) -> usize {
        self.privatization_id
    }

    /// Iterates every vertex descriptor in the domain.
    pub fn get_vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.num_vertices).map(VertexId)
    }

    /// Iterates every edge descriptor in the domain.
    pub fn get_edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        (0..self.num_edges).map(EdgeId)
    }

    fn check_vertex(&self, v: VertexId) -> EngineResult<()> {
        if v.index() >= self.num_vertices {
            return Err(precondition(format!(
                "vertex id {} out of range [0, {})",
                v.index(),
                self.num_vertices
            )));
        }
        Ok(())
    }

    fn check_edge(&self, e: EdgeId) -> EngineResult<()> {
        if e.index() >= self.num_edges {
            return Err(precondition(format!(
                "edge id {} out of range [0, {})",
                e.index(),
                self.num_edges
            )));
        }
        Ok(())
    }

    fn owner_of_vertex(&self, v: VertexId) -> LocaleId {
        self.locales.owner_of_index(v.index())
    }

    fn owner_of_edge(&self, e: EdgeId) -> LocaleId {
        self.locales.owner_of_index(e.index())
    }

    /// Direct, unbuffered insertion: acquires both `NodeData` locks and
    /// appends immediately. Correct but high-latency across locales.
    pub fn add_inclusion(&self, v: VertexId, e: EdgeId) -> EngineResult<()> {
        self.check_vertex(v)?;
        self.check_edge(e)?;
        self.vertex_data[v.index()].add_neighbors([e]);
        self.edge_data[e.index()].add_neighbors([v]);
        Ok(())
    }

    /// Buffered insertion: routes each half-inclusion to the owning
    /// locale's `DestinationBuffer`, draining and retrying once if either
    /// side's buffer was closed.
    pub fn add_inclusion_buffered(&self, v: VertexId, e: EdgeId) -> EngineResult<()> {
        self.check_vertex(v)?;
        self.check_edge(e)?;

        self.append_with_retry(self.owner_of_vertex(v), vertex_entry(v, e))?;
        self.append_with_retry(self.owner_of_edge(e), edge_entry(v, e))?;
        Ok(())
    }

    fn append_with_retry(
        &self,
        owner: LocaleId,
        entry: crate::dest_buffer::Entry,
    ) -> EngineResult<()> {
        let buffer = self.dest_buffers.get(owner);
        match buffer.append(entry) {
            AppendStatus::Ok => Ok(()),
            AppendStatus::Full => {
                self.drain_buffer(owner);
                Ok(())
            }
            AppendStatus::Closed => {
                self.drain_buffer(owner);
                match buffer.append(entry) {
                    AppendStatus::Closed => Err(crate::error::capacity_exceeded(format!(
                        "destination buffer on locale {} stayed closed after drain",
                        owner.index()
                    ))),
                    _ => Ok(()),
                }
            }
        }
    }

    fn drain_buffer(&self, owner: LocaleId) {
        let buffer = self.dest_buffers.get(owner);
        let vertex_data = &self.vertex_data;
        let edge_data = &self.edge_data;
        self.locales.run_local(owner, || {
            buffer.drain_and_clear(
                |src, dest| vertex_data[src].add_neighbors([EdgeId(dest)]),
                |src, dest| edge_data[src].add_neighbors([VertexId(dest)]),
            );
        });
    }

    /// Drains and clears every locale's destination buffer: the quiescence
    /// barrier after a generator finishes.
    pub fn flush_buffers(&self) {
        for (loc, _buffer) in self.dest_buffers.iter() {
            self.drain_buffer(loc);
        }
    }

    /// The (unsorted-order) neighbor edges of `v`, or an error if `v` is
    /// out of range.
    pub fn vertex_neighbors(&self, v: VertexId) -> EngineResult<Vec<EdgeId>> {
        self.check_vertex(v)?;
        Ok(self.vertex_data[v.index()].sorted_snapshot())
    }

    /// The neighbor vertices of `e`, or an error if `e` is out of range.
    pub fn edge_neighbors(&self, e: EdgeId) -> EngineResult<Vec<VertexId>> {
        self.check_edge(e)?;
        Ok(self.edge_data[e.index()].sorted_snapshot())
    }

    /// Lock-free degree read for a single vertex.
    pub fn vertex_degree(&self, v: VertexId) -> usize {
        self.vertex_data[v.index()].num_neighbors()
    }

    /// Lock-free degree read for a single edge.
    pub fn edge_degree(&self, e: EdgeId) -> usize {
        self.edge_data[e.index()].num_neighbors()
    }

    /// Per-vertex degree array. Not safe if the graph is mutated
    /// concurrently.
    pub fn get_vertex_degrees(&self) -> Vec<usize> {
        self.vertex_data.iter().map(|nd| nd.num_neighbors()).collect()
    }

    /// Per-edge degree array. Not safe if the graph is mutated concurrently.
    pub fn get_edge_degrees(&self) -> Vec<usize> {
        self.edge_data.iter().map(|nd| nd.num_neighbors()).collect()
    }

    /// Yields `(VertexId, degree)` pairs for every vertex.
    pub fn for_each_vertex_degree(&self, mut f: impl FnMut(VertexId, usize)) {
        for (i, nd) in self.vertex_data.iter().enumerate() {
            f(VertexId(i), nd.num_neighbors());
        }
    }

    /// Yields `(EdgeId, degree)` pairs for every edge.
    pub fn for_each_edge_degree(&self, mut f: impl FnMut(EdgeId, usize)) {
        for (i, nd) in self.edge_data.iter().enumerate() {
            f(EdgeId(i), nd.num_neighbors());
        }
    }

    /// Sorts and deduplicates every vertex's and edge's neighbor list,
    /// returning the total number of duplicate entries removed.
    ///
    /// Non-fatal by design: `generateChungLu`'s independent per-side
    /// sampling can redraw the same `(v, e)` pair, and this is the reporting
    /// path for that expected anomaly rather than a correctness bug.
    pub fn remove_duplicates(&self) -> usize {
        let vertex_removed: usize = self.vertex_data.iter().map(NodeData::dedup).sum();
        let edge_removed: usize = self.edge_data.iter().map(NodeData::dedup).sum();
        let total = vertex_removed + edge_removed;
        if total > 0 {
            tracing::info!(
                target: "hypergraph",
                vertex_removed,
                edge_removed,
                "removed duplicate inclusions"
            );
        }
        total
    }

    pub(crate) fn vertex_node_data(&self, v: VertexId) -> &NodeData<EdgeId> {
        &self.vertex_data[v.index()]
    }

    pub(crate) fn edge_node_data(&self, e: EdgeId) -> &NodeData<VertexId> {
        &self.edge_data[e.index()]
    }
}

/// `choose(n, 2) = n(n-1)/2`, used throughout the butterfly analytics.
pub(crate) fn choose2(n: usize) -> usize {
    n.saturating_mul(n.saturating_sub(1)) / 2
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_graph() -> AdjListHyperGraph {
        AdjListHyperGraph::new(4, 4, Arc::new(Locales::new(1)), 64)
    }

    #[test]
    fn direct_and_buffered_insertion_agree() {
        let g = tiny_graph();
        g.add_inclusion(VertexId(0), EdgeId(0)).unwrap();
        g.add_inclusion_buffered(VertexId(1), EdgeId(1)).unwrap();
        g.flush_buffers();

        assert_eq!(g.vertex_neighbors(VertexId(0)).unwrap(), vec![EdgeId(0)]);
        assert_eq!(g.vertex_neighbors(VertexId(1)).unwrap(), vec![EdgeId(1)]);
        assert_eq!(g.edge_neighbors(EdgeId(0)).unwrap(), vec![VertexId(0)]);
        assert_eq!(g.edge_neighbors(EdgeId(1)).unwrap(), vec![VertexId(1)]);
    }

    #[test]
    fn out_of_range_ids_are_rejected() {
        let g = tiny_graph();
        assert!(g.add_inclusion(VertexId(99), EdgeId(0)).is_err());
        assert!(g.add_inclusion(VertexId(0), EdgeId(99)).is_err());
    }

    #[test]
    fn degrees_increase_monotonically_during_insertion() {
        let g = tiny_graph();
        let mut last = 0;
        for e in 0..4 {
            g.add_inclusion(VertexId(0), EdgeId(e)).unwrap();
            let degree = g.vertex_degree(VertexId(0));
            assert!(degree >= last);
            last = degree;
        }
        assert_eq!(last, 4);
    }

    #[test]
    fn remove_duplicates_reports_and_clears_repeated_inclusions() {
        let g = tiny_graph();
        g.add_inclusion(VertexId(0), EdgeId(0)).unwrap();
        g.add_inclusion(VertexId(0), EdgeId(0)).unwrap();
        g.add_inclusion(VertexId(0), EdgeId(1)).unwrap();

        assert_eq!(g.vertex_degree(VertexId(0)), 3);
        let removed = g.remove_duplicates();
        assert_eq!(removed, 2); // one duplicate on the vertex side, one on the edge side
        assert_eq!(g.vertex_degree(VertexId(0)), 2);
        assert_eq!(g.vertex_neighbors(VertexId(0)).unwrap(), vec![EdgeId(0), EdgeId(1)]);
    }
}
