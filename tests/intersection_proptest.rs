//! Property tests for the sorted-array intersection laws and the
//! NodeData/DestinationBuffer invariants under randomized insertion
//! sequences.

use std::collections::BTreeSet;

use proptest::prelude::*;

use hyperloom::dest_buffer::{vertex_entry, AppendStatus, DestinationBuffer};
use hyperloom::descriptor::{EdgeId, VertexId};
use hyperloom::graph::intersection::{intersection, intersection_size, intersection_size_at_least};
use hyperloom::node_data::NodeData;

fn sorted_dedup_vec(mut xs: Vec<i32>) -> Vec<i32> {
    xs.sort_unstable();
    xs.dedup();
    xs
}

proptest! {
    #[test]
    fn intersection_is_commutative(a in proptest::collection::vec(0i32..200, 0..100), b in proptest::collection::vec(0i32..200, 0..100)) {
        let a = sorted_dedup_vec(a);
        let b = sorted_dedup_vec(b);
        prop_assert_eq!(intersection(&a, &b), intersection(&b, &a));
    }

    #[test]
    fn intersection_matches_brute_force_set_intersection(a in proptest::collection::vec(0i32..200, 0..100), b in proptest::collection::vec(0i32..200, 0..100)) {
        let a = sorted_dedup_vec(a);
        let b = sorted_dedup_vec(b);

        let set_a: BTreeSet<i32> = a.iter().copied().collect();
        let set_b: BTreeSet<i32> = b.iter().copied().collect();
        let expected: Vec<i32> = set_a.intersection(&set_b).copied().collect();

        prop_assert_eq!(intersection(&a, &b), expected);
    }

    #[test]
    fn intersection_size_matches_intersection_length(a in proptest::collection::vec(0i32..200, 0..100), b in proptest::collection::vec(0i32..200, 0..100)) {
        let a = sorted_dedup_vec(a);
        let b = sorted_dedup_vec(b);
        prop_assert_eq!(intersection_size(&a, &b), intersection(&a, &b).len());
    }

    #[test]
    fn size_at_least_agrees_with_exact_size_for_every_threshold(a in proptest::collection::vec(0i32..50, 0..60), b in proptest::collection::vec(0i32..50, 0..60)) {
        let a = sorted_dedup_vec(a);
        let b = sorted_dedup_vec(b);
        let size = intersection_size(&a, &b);
        for s in 0..=size + 1 {
            prop_assert_eq!(intersection_size_at_least(&a, &b, s), s <= size);
        }
    }

    /// `NodeData::num_neighbors()` always equals the number of items
    /// appended (sorting/dedup only happens through `dedup()`, which is
    /// never called here), regardless of how the appends are batched.
    #[test]
    fn node_data_neighbor_count_matches_total_appended(batches in proptest::collection::vec(proptest::collection::vec(0u32..1000, 0..20), 0..20)) {
        let nd: NodeData<u32> = NodeData::new();
        let mut total = 0usize;
        for batch in &batches {
            total += batch.len();
            nd.add_neighbors(batch.iter().copied());
        }
        prop_assert_eq!(nd.num_neighbors(), total);
    }

    /// `NodeData::dedup()` always leaves behind a sorted, duplicate-free
    /// list whose length plus the reported removal count equals the
    /// pre-dedup length.
    #[test]
    fn node_data_dedup_shrinks_by_exactly_the_duplicate_count(items in proptest::collection::vec(0u32..50, 0..200)) {
        let nd: NodeData<u32> = NodeData::new();
        nd.add_neighbors(items.iter().copied());
        let before = nd.num_neighbors();

        let removed = nd.dedup();
        let after = nd.num_neighbors();
        prop_assert_eq!(before, after + removed);

        let snapshot = nd.sorted_snapshot();
        prop_assert!(snapshot.windows(2).all(|w| w[0] < w[1]));
    }

    /// However many entries are appended, `DestinationBuffer::append` never
    /// reports `Ok`/`Full` past `capacity` reservations, and `filled` never
    /// exceeds `size`.
    #[test]
    fn dest_buffer_never_overfills_past_capacity(capacity in 1usize..32, attempts in 0usize..64) {
        let buf = DestinationBuffer::new(capacity);
        let mut stored = 0usize;
        for i in 0..attempts {
            let entry = vertex_entry(VertexId(i), EdgeId(i));
            match buf.append(entry) {
                AppendStatus::Ok | AppendStatus::Full => stored += 1,
                AppendStatus::Closed => {}
            }
        }
        prop_assert_eq!(stored, attempts.min(capacity));
        prop_assert_eq!(buf.filled(), stored);
        prop_assert!(buf.filled() <= buf.capacity());
    }
}
