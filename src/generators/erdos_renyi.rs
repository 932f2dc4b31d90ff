//! Erdős–Rényi random hypergraph generation.

use rand::Rng;

use crate::concurrency::scoped::run_workers;
use crate::config::EngineConfig;
use crate::descriptor::{EdgeId, VertexId};
use crate::error::{precondition, EngineResult};
use crate::graph::AdjListHyperGraph;

use super::rng::task_rng;

/// Generates inclusions by sampling `(v, e)` pairs uniformly with
/// replacement.
///
/// When `coupon_collector` is set, `p` is first corrected to
/// `p' = ln(1 / (1 - p))` — the expected number of draws needed for every
/// `(v, e)` pair to be *covered* at least once converges to
/// `|V|*|E|*p'` rather than `|V|*|E|*p`, since sampling with replacement
/// revisits pairs.
pub fn generate_erdos_renyi(
    graph: &AdjListHyperGraph,
    p: f64,
    coupon_collector: bool,
    config: &EngineConfig,
) -> EngineResult<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(precondition(format!("p must be in [0, 1], got {p}")));
    }

    let effective_p = if coupon_collector {
        if p >= 1.0 {
            return Err(precondition(
                "coupon_collector correction is undefined at p = 1.0",
            ));
        }
        (1.0 / (1.0 - p)).ln()
    } else {
        p
    };

    let num_vertices = graph.num_vertices();
    let num_edges = graph.num_edges();
    let total_draws =
        (num_vertices as f64 * num_edges as f64 * effective_p).round() as usize;

    tracing::info!(
        target: "generators::erdos_renyi",
        p,
        effective_p,
        coupon_collector,
        total_draws,
        "generating Erdos-Renyi hypergraph"
    );

    if num_vertices == 0 || num_edges == 0 {
        return Ok(());
    }

    // At p = 1.0 every pair is included; sampling with replacement cannot
    // guarantee full coverage, so the complete domain is enumerated instead.
    if effective_p >= 1.0 {
        for v in 0..num_vertices {
            for e in 0..num_edges {
                graph
                    .add_inclusion_buffered(VertexId(v), EdgeId(e))
                    .expect("enumerated ids are always in range");
            }
        }
        graph.flush_buffers();
        return Ok(());
    }

    if total_draws == 0 {
        return Ok(());
    }

    let max_task_par = config.max_task_par.max(1);
    run_workers(max_task_par, graph, |graph, tid| {
        let mut rng = task_rng(config.rng_base_seed, 0, tid, max_task_par);
        let share = total_draws / max_task_par + usize::from(tid < total_draws % max_task_par);
        for _ in 0..share {
            let v = rng.random_range(0..num_vertices);
            let e = rng.random_range(0..num_edges);
            // Out-of-range ids cannot happen here; draws are bounded above.
            graph
                .add_inclusion_buffered(VertexId(v), EdgeId(e))
                .expect("sampled ids are always in range");
        }
    });

    graph.flush_buffers();
    Ok(())
}
