use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hyperloom::node_data::NodeData;

fn bench_node_data_append(c: &mut Criterion) {
    c.bench_function("node_data_append_1000", |b| {
        b.iter(|| {
            let nd: NodeData<u32> = NodeData::new();
            for i in 0..1000u32 {
                nd.add_neighbors([black_box(i)]);
            }
            black_box(nd.num_neighbors())
        });
    });
}

fn bench_node_data_has_neighbor(c: &mut Criterion) {
    let nd: NodeData<u32> = NodeData::new();
    nd.add_neighbors(0..10_000u32);

    c.bench_function("node_data_has_neighbor_lookup", |b| {
        b.iter(|| black_box(nd.has_neighbor(black_box(9_999))));
    });
}

fn bench_node_data_sorted_snapshot(c: &mut Criterion) {
    c.bench_function("node_data_sorted_snapshot_10000_unsorted", |b| {
        b.iter(|| {
            let nd: NodeData<u32> = NodeData::new();
            nd.add_neighbors((0..10_000u32).rev());
            black_box(nd.sorted_snapshot())
        });
    });
}

criterion_group!(
    benches,
    bench_node_data_append,
    bench_node_data_has_neighbor,
    bench_node_data_sorted_snapshot
);
criterion_main!(benches);
