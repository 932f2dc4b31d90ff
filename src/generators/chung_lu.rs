//! Chung–Lu random hypergraph generation.
//!
//! Each half of an inclusion is drawn independently from a distribution
//! proportional to a target degree sequence, via [`super::sampling`]'s
//! prefix-sum table. The result matches the target degree sequence only in
//! expectation, not exactly.

use rand::Rng;

use crate::concurrency::scoped::run_workers;
use crate::config::EngineConfig;
use crate::descriptor::{EdgeId, VertexId};
use crate::error::{precondition, EngineResult};
use crate::graph::AdjListHyperGraph;

use super::rng::task_rng;
use super::sampling::{get_random_element, normalized_prefix_sums};

/// Generates `num_inclusions` inclusions by sampling a vertex from `d_v` and
/// an edge from `d_e` independently, each weighted by its target degree.
pub fn generate_chung_lu(
    graph: &AdjListHyperGraph,
    d_v: &[f64],
    d_e: &[f64],
    num_inclusions: usize,
    config: &EngineConfig,
) -> EngineResult<()> {
    if d_v.len() != graph.num_vertices() {
        return Err(precondition(format!(
            "d_v length {} must match num_vertices {}",
            d_v.len(),
            graph.num_vertices()
        )));
    }
    if d_e.len() != graph.num_edges() {
        return Err(precondition(format!(
            "d_e length {} must match num_edges {}",
            d_e.len(),
            graph.num_edges()
        )));
    }
    if num_inclusions == 0 || d_v.is_empty() || d_e.is_empty() {
        return Ok(());
    }

    let p_v = normalized_prefix_sums(d_v);
    let p_e = normalized_prefix_sums(d_e);

    tracing::info!(
        target: "generators::chung_lu",
        num_inclusions,
        num_vertices = d_v.len(),
        num_edges = d_e.len(),
        "generating Chung-Lu hypergraph"
    );

    let max_task_par = config.max_task_par.max(1);
    run_workers(max_task_par, graph, |graph, tid| {
        let mut rng = task_rng(config.rng_base_seed, 0, tid, max_task_par);
        let share =
            num_inclusions / max_task_par + usize::from(tid < num_inclusions % max_task_par);
        for _ in 0..share {
            let r_v = rng.random::<f64>();
            let r_e = rng.random::<f64>();
            let v = get_random_element(&p_v, r_v).expect("r_v is drawn from [0, 1)");
            let e = get_random_element(&p_e, r_e).expect("r_e is drawn from [0, 1)");
            graph
                .add_inclusion_buffered(VertexId(v), EdgeId(e))
                .expect("sampled ids are always in range");
        }
    });

    graph.flush_buffers();
    Ok(())
}
