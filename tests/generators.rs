//! End-to-end generator scenarios.

use std::sync::Arc;

use hyperloom::config::EngineConfig;
use hyperloom::descriptor::{EdgeId, VertexId};
use hyperloom::generators::{generate_bter, generate_chung_lu, generate_erdos_renyi, BterParams};
use hyperloom::locale::Locales;
use hyperloom::AdjListHyperGraph;

fn small_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.max_task_par = 4;
    config
}

#[test]
fn tiny_erdos_renyi_full_coverage() {
    let graph = AdjListHyperGraph::new(4, 4, Arc::new(Locales::new(1)), 64);
    let config = small_config();

    generate_erdos_renyi(&graph, 1.0, false, &config).unwrap();

    for v in 0..4 {
        assert_eq!(graph.vertex_degree(VertexId(v)), 4);
    }
    for e in 0..4 {
        assert_eq!(graph.edge_degree(EdgeId(e)), 4);
    }
}

#[test]
fn erdos_renyi_rejects_out_of_range_probability() {
    let graph = AdjListHyperGraph::new(4, 4, Arc::new(Locales::new(1)), 64);
    let config = small_config();
    assert!(generate_erdos_renyi(&graph, 1.5, false, &config).is_err());
    assert!(generate_erdos_renyi(&graph, -0.1, false, &config).is_err());
}

#[test]
fn coupon_collector_correction_is_undefined_at_p_one() {
    let graph = AdjListHyperGraph::new(4, 4, Arc::new(Locales::new(1)), 64);
    let config = small_config();
    assert!(generate_erdos_renyi(&graph, 1.0, true, &config).is_err());
}

#[test]
fn chung_lu_rejects_mismatched_degree_sequence_length() {
    let graph = AdjListHyperGraph::new(4, 3, Arc::new(Locales::new(1)), 64);
    let config = small_config();
    let d_v = vec![1.0; 4];
    let d_e = vec![1.0; 99]; // wrong length for 3 edges
    assert!(generate_chung_lu(&graph, &d_v, &d_e, 100, &config).is_err());
}

#[test]
fn chung_lu_with_duplicates_cleans_up_via_remove_duplicates() {
    // A tiny domain with 10,000 draws guarantees repeated (v, e) pairs.
    let graph = AdjListHyperGraph::new(3, 3, Arc::new(Locales::new(1)), 1 << 12);
    let config = small_config();
    let d_v = vec![1.0, 1.0, 1.0];
    let d_e = vec![1.0, 1.0, 1.0];

    generate_chung_lu(&graph, &d_v, &d_e, 10_000, &config).unwrap();

    let before: usize = graph.get_vertex_degrees().iter().sum();
    assert!(before > 0);

    let removed = graph.remove_duplicates();
    let after: usize = graph.get_vertex_degrees().iter().sum();
    assert_eq!(after + removed, before);

    // Every vertex's neighbor list is duplicate-free afterward.
    for v in 0..3 {
        let mut neighbors = graph.vertex_neighbors(VertexId(v)).unwrap();
        let before_len = neighbors.len();
        neighbors.dedup();
        assert_eq!(neighbors.len(), before_len);
    }
}

#[test]
fn bter_matches_declared_degree_sequence_lengths() {
    let graph = AdjListHyperGraph::new(6, 6, Arc::new(Locales::new(1)), 1 << 10);
    let config = small_config();
    let params = BterParams {
        vertex_degrees: vec![1, 1, 2, 2, 3, 3],
        edge_degrees: vec![1, 1, 2, 2, 3, 3],
        vertex_metamorph: 0.5,
        edge_metamorph: 0.5,
    };

    generate_bter(&graph, &params, &config).unwrap();

    // BTER only matches the degree sequence in expectation, but every
    // vertex/edge should have received at least some inclusions.
    let total_degree: usize = graph.get_vertex_degrees().iter().sum();
    assert!(total_degree > 0);
}

#[test]
fn bter_rejects_mismatched_vertex_degree_length() {
    let graph = AdjListHyperGraph::new(4, 4, Arc::new(Locales::new(1)), 64);
    let config = small_config();
    let params = BterParams {
        vertex_degrees: vec![1, 1, 1], // wrong length for 4 vertices
        edge_degrees: vec![1, 1, 1, 1],
        vertex_metamorph: 1.0,
        edge_metamorph: 1.0,
    };
    assert!(generate_bter(&graph, &params, &config).is_err());
}
