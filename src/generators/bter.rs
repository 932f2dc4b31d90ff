//! BTER (Block Two-level Erdős–Rényi) random hypergraph generation.
//!
//! BTER groups vertices and edges into "affinity blocks" of near-identical
//! target degree, fills each block with a dense Erdős–Rényi sub-hypergraph
//! sized so the block's expected metamorphosis coefficient matches the
//! caller's target `(mV, mE)`, then tops up any remaining degree deficit
//! with a [`super::chung_lu`] pass over the whole domain.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::EngineConfig;
use crate::descriptor::{EdgeId, VertexId};
use crate::error::{precondition, EngineResult};
use crate::graph::AdjListHyperGraph;

use super::chung_lu::generate_chung_lu;

/// Target degree sequences and metamorphosis coefficients driving block
/// sizing.
pub struct BterParams {
    /// Target degree for each vertex, indexed by vertex id.
    pub vertex_degrees: Vec<usize>,
    /// Target degree for each edge, indexed by edge id.
    pub edge_degrees: Vec<usize>,
    /// Target vertex-side metamorphosis coefficient.
    pub vertex_metamorph: f64,
    /// Target edge-side metamorphosis coefficient.
    pub edge_metamorph: f64,
}

/// Generates a hypergraph matching `params` via affinity blocks, with a
/// residual Chung–Lu top-up for any degree deficit the blocks left behind.
pub fn generate_bter(
    graph: &AdjListHyperGraph,
    params: &BterParams,
    config: &EngineConfig,
) -> EngineResult<()> {
    if params.vertex_degrees.len() != graph.num_vertices() {
        return Err(precondition("vertex_degrees length must match num_vertices"));
    }
    if params.edge_degrees.len() != graph.num_edges() {
        return Err(precondition("edge_degrees length must match num_edges"));
    }

    let mut sorted_v: Vec<usize> = (0..params.vertex_degrees.len()).collect();
    sorted_v.sort_by_key(|&i| params.vertex_degrees[i]);
    let mut sorted_e: Vec<usize> = (0..params.edge_degrees.len()).collect();
    sorted_e.sort_by_key(|&i| params.edge_degrees[i]);

    // mV/mE >= 1: vertices are "more clustered" than edges, so blocks are
    // sized off the edge-side degree class and vice versa.
    let mv_over_me = if params.edge_metamorph.abs() < f64::EPSILON {
        f64::INFINITY
    } else {
        params.vertex_metamorph / params.edge_metamorph
    };

    tracing::info!(
        target: "generators::bter",
        num_vertices = sorted_v.len(),
        num_edges = sorted_e.len(),
        mv_over_me,
        "generating BTER hypergraph"
    );

    let mut rng = SmallRng::seed_from_u64(config.rng_base_seed);
    let (mut cv, mut ce) = (0usize, 0usize);

    while cv < sorted_v.len() && ce < sorted_e.len() {
        let d = params.vertex_degrees[sorted_v[cv]].min(params.edge_degrees[sorted_e[ce]]);
        let (block_n_v, block_n_e, rho) = affinity_block_shape(d, mv_over_me);
        let block_n_v = block_n_v.min(sorted_v.len() - cv).max(1);
        let block_n_e = block_n_e.min(sorted_e.len() - ce).max(1);

        for &vi in &sorted_v[cv..cv + block_n_v] {
            for &ei in &sorted_e[ce..ce + block_n_e] {
                if rng.random::<f64>() < rho {
                    graph
                        .add_inclusion_buffered(VertexId(vi), EdgeId(ei))
                        .expect("block ids are always in range");
                }
            }
        }

        cv += block_n_v;
        ce += block_n_e;
    }
    graph.flush_buffers();

    // Residual top-up: whatever degree the affinity blocks didn't account
    // for is filled in with a Chung-Lu pass weighted by the shortfall.
    let residual_v: Vec<f64> = graph
        .get_vertex_degrees()
        .iter()
        .zip(&params.vertex_degrees)
        .map(|(&have, &want)| (want as isize - have as isize).max(0) as f64)
        .collect();
    let residual_e: Vec<f64> = graph
        .get_edge_degrees()
        .iter()
        .zip(&params.edge_degrees)
        .map(|(&have, &want)| (want as isize - have as isize).max(0) as f64)
        .collect();

    let residual_total = residual_v.iter().sum::<f64>().min(residual_e.iter().sum::<f64>());
    if residual_total > 0.0 {
        let num_residual = residual_total.round() as usize;
        if num_residual > 0 {
            generate_chung_lu(graph, &residual_v, &residual_e, num_residual, config)?;
        }
    }

    Ok(())
}

/// Given a shared degree class `d` and the `mV/mE` ratio, returns
/// `(block_vertex_count, block_edge_count, intra_block_density)`.
fn affinity_block_shape(d: usize, mv_over_me: f64) -> (usize, usize, f64) {
    if mv_over_me >= 1.0 {
        let n_v = d + 1;
        let n_e = (((d + 1) as f64) / mv_over_me).ceil().max(1.0) as usize;
        let rho = (d as f64 / n_e as f64).min(1.0);
        (n_v, n_e, rho)
    } else {
        let n_e = d + 1;
        let n_v = (((d + 1) as f64) * mv_over_me).ceil().max(1.0) as usize;
        let rho = (d as f64 / n_v as f64).min(1.0);
        (n_v, n_e, rho)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::locale::Locales;

    #[test]
    fn balanced_blocks_produce_a_nonempty_graph() {
        let graph = AdjListHyperGraph::new(20, 20, Arc::new(Locales::new(1)), 4096);
        let mut config = EngineConfig::default();
        config.max_task_par = 1;
        config.rng_base_seed = 11;

        let params = BterParams {
            vertex_degrees: (1..=20).collect(),
            edge_degrees: (1..=20).collect(),
            vertex_metamorph: 1.0,
            edge_metamorph: 1.0,
        };
        generate_bter(&graph, &params, &config).unwrap();

        let total: usize = graph.get_vertices().map(|v| graph.vertex_degree(v)).sum();
        assert!(total > 0);
    }

    #[test]
    fn rejects_mismatched_degree_sequence_length() {
        let graph = AdjListHyperGraph::new(3, 3, Arc::new(Locales::new(1)), 64);
        let config = EngineConfig::default();
        let params = BterParams {
            vertex_degrees: vec![1, 2],
            edge_degrees: vec![1, 2, 3],
            vertex_metamorph: 1.0,
            edge_metamorph: 1.0,
        };
        assert!(generate_bter(&graph, &params, &config).is_err());
    }

    #[test]
    fn affinity_block_shape_respects_ratio_branches() {
        let (nv, ne, rho) = affinity_block_shape(4, 2.0);
        assert_eq!(nv, 5);
        assert!(ne >= 1 && rho <= 1.0);

        let (nv2, ne2, rho2) = affinity_block_shape(4, 0.5);
        assert_eq!(ne2, 5);
        assert!(nv2 >= 1 && rho2 <= 1.0);
    }
}
