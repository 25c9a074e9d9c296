//! Property tests for graph construction over random datasets.
//!
//! Every property is checked against a fresh pipeline run; small integer
//! coordinates keep exact distance ties common.

use gbili_core::{
    edge_weight, euclidean, BruteForceIndex, FeatureMatrix, GbiliBuilder, GbiliGraph, LabeledSet,
    ProximityMaps,
};
use proptest::prelude::*;

/// Dataset, labeled set, k1, k2 with `k1 + 1 <= N`.
fn instance() -> impl Strategy<Value = (FeatureMatrix, LabeledSet, usize, usize)> {
    (1usize..=4, 4usize..=48).prop_flat_map(|(dim, n)| {
        (
            proptest::collection::vec(-6i32..6, n * dim),
            proptest::collection::vec(0..n, 1..=4),
            1usize..n,
            1usize..=5,
        )
            .prop_map(move |(values, labels, k1, k2)| {
                let data = values.into_iter().map(|v| v as f32).collect();
                (
                    FeatureMatrix::new(data, dim).expect("matrix"),
                    LabeledSet::new(labels),
                    k1,
                    k2,
                )
            })
    })
}

fn run(points: &FeatureMatrix, labeled: &LabeledSet, k1: usize, k2: usize, workers: usize) -> GbiliGraph {
    GbiliBuilder::new()
        .with_k1(k1)
        .with_k2(k2)
        .with_workers(workers)
        .build(points, labeled)
        .expect("build")
}

fn phase_one(points: &FeatureMatrix, labeled: &LabeledSet, k1: usize, workers: usize) -> ProximityMaps {
    GbiliBuilder::new()
        .with_k1(k1)
        .with_workers(workers)
        .compute_proximity(points, labeled, &BruteForceIndex::new(points))
        .expect("phase 1")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Property: the edge list does not depend on the worker count.
    #[test]
    fn prop_partitioning_invariant(
        (points, labeled, k1, k2) in instance(),
        workers in 2usize..=8,
    ) {
        let workers = workers.min(points.len());

        let serial = run(&points, &labeled, k1, k2, 1);
        let parallel = run(&points, &labeled, k1, k2, workers);

        prop_assert_eq!(serial.edges, parallel.edges);
    }

    /// Property: every kNN list has exactly k1 entries, sorted, without self.
    #[test]
    fn prop_knn_lists_complete(
        (points, labeled, k1, _k2) in instance(),
        workers in 1usize..=4,
    ) {
        let maps = phase_one(&points, &labeled, k1, workers.min(points.len()));

        prop_assert_eq!(maps.len(), points.len());
        for (object, list) in maps.knn.iter().enumerate() {
            prop_assert_eq!(list.len(), k1);
            prop_assert!(list.iter().all(|n| n.id != object));
            prop_assert!(list.windows(2).all(|w| w[0].distance <= w[1].distance));
        }
    }

    /// Property: the nearest labeled object is labeled and truly nearest.
    #[test]
    fn prop_nearest_labeled_is_minimal(
        (points, labeled, k1, _k2) in instance(),
    ) {
        let maps = phase_one(&points, &labeled, k1, 1);

        for (object, nearest) in maps.nearest_labeled.iter().enumerate() {
            prop_assert!(labeled.contains(nearest.label));
            if labeled.len() >= 2 {
                prop_assert_ne!(nearest.label, object);
            }
            for label in labeled.iter().filter(|&l| l != object || labeled.len() == 1) {
                let d = euclidean(points.row(object), points.row(label));
                prop_assert!(nearest.distance <= d);
            }
        }
    }

    /// Property: edges are mutual, capped at k2 per source, weighted by distance.
    #[test]
    fn prop_edges_mutual_and_weighted(
        (points, labeled, k1, k2) in instance(),
    ) {
        let maps = phase_one(&points, &labeled, k1, 1);
        let graph = run(&points, &labeled, k1, k2, 1);

        for edge in &graph.edges {
            prop_assert_ne!(edge.source, edge.target);
            prop_assert!(maps.is_neighbor(edge.source, edge.target));
            prop_assert!(maps.is_neighbor(edge.target, edge.source));

            let d = maps.knn[edge.source]
                .iter()
                .find(|n| n.id == edge.target)
                .map(|n| n.distance)
                .expect("target in knn");
            prop_assert_eq!(edge.weight, edge_weight(d));
            prop_assert!(edge.weight > 0.0 && edge.weight <= 1.0);
        }
        for source in 0..points.len() {
            prop_assert!(graph.edges_from(source).count() <= k2);
        }
    }

    /// Property: two runs over the same input produce the same edges.
    #[test]
    fn prop_deterministic(
        (points, labeled, k1, k2) in instance(),
    ) {
        let workers = 3.min(points.len());

        prop_assert_eq!(
            run(&points, &labeled, k1, k2, workers).edges,
            run(&points, &labeled, k1, k2, workers).edges
        );
    }
}
