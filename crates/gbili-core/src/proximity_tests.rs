//! Tests for `proximity` module

use super::dataset::{FeatureMatrix, LabeledSet};
use super::error::Error;
use super::executor::Partition;
use super::graph::{NearestLabeled, Neighbor, ProximityMaps};
use super::index::{BruteForceIndex, KdTree};
use super::proximity::*;
use std::sync::atomic::AtomicBool;

/// Six points on a line: 0, 1, 2, 3, 10, 11.
fn line() -> FeatureMatrix {
    FeatureMatrix::from_rows([0.0f32, 1.0, 2.0, 3.0, 10.0, 11.0].iter().map(|&x| [x]))
        .expect("valid matrix")
}

fn ids(neighbors: &[Neighbor]) -> Vec<usize> {
    neighbors.iter().map(|n| n.id).collect()
}

// =========================================================================
// Nearest labeled object
// =========================================================================

#[test]
fn test_nearest_labeled_on_line() {
    // Arrange
    let points = line();
    let labeled = LabeledSet::new([0, 4]);
    let index = KdTree::new(&points);
    let proximity = LabeledProximity::new(&points, &labeled, &index, 2);

    // Act
    let nearest: Vec<NearestLabeled> = (0..6).map(|o| proximity.nearest_labeled(o)).collect();

    // Assert: a labeled object never maps to itself while another label exists
    let expected = [(4, 10.0), (0, 1.0), (0, 2.0), (0, 3.0), (0, 10.0), (4, 1.0)];
    for (object, (label, distance)) in expected.into_iter().enumerate() {
        assert_eq!(nearest[object].label, label, "object {object}");
        assert!((nearest[object].distance - distance).abs() < 1e-6);
    }
}

#[test]
fn test_nearest_labeled_tie_prefers_smallest_id() {
    // Object 1 sits halfway between labels 0 and 2.
    let points = FeatureMatrix::from_rows([[0.0f32], [1.0], [2.0]]).expect("valid");
    let labeled = LabeledSet::new([2, 0]);
    let index = BruteForceIndex::new(&points);
    let proximity = LabeledProximity::new(&points, &labeled, &index, 1);

    let nearest = proximity.nearest_labeled(1);

    assert_eq!(nearest.label, 0);
    assert!((nearest.distance - 1.0).abs() < 1e-6);
}

#[test]
fn test_nearest_labeled_with_overflowing_distances_stays_labeled() {
    // Both labels are farther than f32 can represent from object 0.
    let points = FeatureMatrix::from_rows([[-3.0e38f32], [3.0e38], [3.0e38]]).expect("valid");
    let labeled = LabeledSet::new([1, 2]);
    let index = BruteForceIndex::new(&points);
    let proximity = LabeledProximity::new(&points, &labeled, &index, 1);

    let nearest = proximity.nearest_labeled(0);

    assert_eq!(nearest.label, 1);
    assert!(nearest.distance.is_infinite());
}

#[test]
fn test_single_label_maps_to_itself() {
    let points = line();
    let labeled = LabeledSet::new([3]);
    let index = KdTree::new(&points);
    let proximity = LabeledProximity::new(&points, &labeled, &index, 1);

    let nearest = proximity.nearest_labeled(3);

    assert_eq!(nearest.label, 3);
    assert_eq!(nearest.distance, 0.0);
    assert_eq!(proximity.nearest_labeled(5).label, 3);
}

// =========================================================================
// k1 nearest neighbors
// =========================================================================

#[test]
fn test_nearest_neighbors_exclude_self() {
    let points = line();
    let labeled = LabeledSet::new([0]);
    let index = KdTree::new(&points);
    let proximity = LabeledProximity::new(&points, &labeled, &index, 2);

    let knn: Vec<Vec<usize>> = (0..6)
        .map(|o| ids(&proximity.nearest_neighbors(o).expect("query")))
        .collect();

    assert_eq!(
        knn,
        vec![
            vec![1, 2],
            vec![0, 2],
            vec![1, 3],
            vec![2, 1],
            vec![5, 3],
            vec![4, 3],
        ]
    );
}

#[test]
fn test_nearest_neighbors_are_ascending() {
    let points = line();
    let labeled = LabeledSet::new([0]);
    let index = BruteForceIndex::new(&points);
    let proximity = LabeledProximity::new(&points, &labeled, &index, 5);

    let knn = proximity.nearest_neighbors(4).expect("query");

    assert_eq!(knn.len(), 5);
    assert!(knn.windows(2).all(|w| w[0].distance <= w[1].distance));
    assert!(knn.iter().all(|n| n.id != 4));
}

#[test]
fn test_duplicates_still_yield_k1_other_objects() {
    // Three identical points: with k1 = 1 the query for object 2 returns
    // ids 0 and 1 ahead of itself, so the last entry is dropped instead.
    let points = FeatureMatrix::from_rows([[1.0f32, 1.0], [1.0, 1.0], [1.0, 1.0], [4.0, 4.0]])
        .expect("valid");
    let labeled = LabeledSet::new([3]);
    let index = KdTree::new(&points);
    let proximity = LabeledProximity::new(&points, &labeled, &index, 1);

    let knn = proximity.nearest_neighbors(2).expect("query");

    assert_eq!(ids(&knn), vec![0]);
    assert!(knn.iter().all(|n| n.distance == 0.0));
}

// =========================================================================
// Pre-flight
// =========================================================================

#[test]
fn test_preflight_insufficient_data() {
    let points = FeatureMatrix::from_rows([[0.0f32], [1.0], [2.0]]).expect("valid");
    let labeled = LabeledSet::new([0]);
    let index = KdTree::new(&points);
    let proximity = LabeledProximity::new(&points, &labeled, &index, 3);

    let err = proximity.preflight().expect_err("k1 + 1 > N");

    assert!(matches!(
        err,
        Error::InsufficientData {
            required: 4,
            available: 3
        }
    ));
}

#[test]
fn test_huge_k1_is_insufficient_data() {
    let points = line();
    let labeled = LabeledSet::new([0]);
    let index = BruteForceIndex::new(&points);
    let proximity = LabeledProximity::new(&points, &labeled, &index, usize::MAX);

    let expected = |err: &Error| {
        matches!(
            err,
            Error::InsufficientData {
                required: usize::MAX,
                available: 6
            }
        )
    };
    assert!(expected(&proximity.preflight().expect_err("preflight")));
    assert!(expected(&proximity.nearest_neighbors(0).expect_err("query")));
}

#[test]
fn test_preflight_rejects_zero_k1_and_bad_labels() {
    let points = line();
    let index = KdTree::new(&points);

    let empty = LabeledSet::default();
    let out_of_range = LabeledSet::new([6]);
    let ok = LabeledSet::new([0]);

    assert!(matches!(
        LabeledProximity::new(&points, &ok, &index, 0).preflight(),
        Err(Error::InvalidConfiguration(_))
    ));
    assert!(matches!(
        LabeledProximity::new(&points, &empty, &index, 2).preflight(),
        Err(Error::InvalidConfiguration(_))
    ));
    assert!(matches!(
        LabeledProximity::new(&points, &out_of_range, &index, 2).preflight(),
        Err(Error::InvalidConfiguration(_))
    ));
    assert!(LabeledProximity::new(&points, &ok, &index, 5).preflight().is_ok());
}

// =========================================================================
// Partition compute and merge
// =========================================================================

#[test]
fn test_compute_covers_partition_range_only() {
    // Arrange
    let points = line();
    let labeled = LabeledSet::new([0, 4]);
    let index = KdTree::new(&points);
    let proximity = LabeledProximity::new(&points, &labeled, &index, 2);
    let flag = AtomicBool::new(false);

    // Act
    let maps = proximity
        .compute(&Partition::new(1, 2..4, &flag))
        .expect("compute");

    // Assert: entries are local to the range, in id order
    assert_eq!(maps.len(), 2);
    assert_eq!(ids(&maps.knn[0]), vec![1, 3]);
    assert_eq!(ids(&maps.knn[1]), vec![2, 1]);
    assert_eq!(maps.nearest_labeled[1].label, 0);
}

#[test]
fn test_compute_stops_when_cancelled() {
    let points = line();
    let labeled = LabeledSet::new([0]);
    let index = KdTree::new(&points);
    let proximity = LabeledProximity::new(&points, &labeled, &index, 2);
    let flag = AtomicBool::new(true);

    let result = proximity.compute(&Partition::new(0, 0..6, &flag));

    assert!(matches!(result, Err(Error::Cancelled)));
}

#[test]
fn test_merge_concatenates_in_partition_order() {
    let points = line();
    let labeled = LabeledSet::new([0, 4]);
    let index = KdTree::new(&points);
    let proximity = LabeledProximity::new(&points, &labeled, &index, 2);
    let flag = AtomicBool::new(false);

    let whole = proximity
        .compute(&Partition::new(0, 0..6, &flag))
        .expect("compute");
    let parts = vec![
        proximity.compute(&Partition::new(0, 0..4, &flag)).expect("first"),
        proximity.compute(&Partition::new(1, 4..6, &flag)).expect("second"),
    ];

    let merged = merge_proximity(parts, 6).expect("merge");

    assert_eq!(merged, whole);
}

#[test]
fn test_merge_detects_missing_objects() {
    let part = ProximityMaps {
        nearest_labeled: vec![NearestLabeled { label: 0, distance: 0.0 }],
        knn: vec![vec![Neighbor::new(1, 1.0)]],
    };

    let result = merge_proximity(vec![part], 2);

    assert!(matches!(result, Err(Error::WorkerFailure { .. })));
}

#[test]
fn test_merge_detects_inconsistent_partition() {
    let good = ProximityMaps {
        nearest_labeled: vec![NearestLabeled { label: 0, distance: 0.0 }],
        knn: vec![vec![Neighbor::new(1, 1.0)]],
    };
    let bad = ProximityMaps {
        nearest_labeled: vec![NearestLabeled { label: 0, distance: 1.0 }],
        knn: vec![],
    };

    let result = merge_proximity(vec![good, bad], 2);

    assert!(matches!(
        result,
        Err(Error::WorkerFailure { partition: 1, .. })
    ));
}
