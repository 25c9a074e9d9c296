//! Tests for `graph` module

use super::graph::*;

fn maps() -> ProximityMaps {
    ProximityMaps {
        nearest_labeled: vec![
            NearestLabeled { label: 1, distance: 1.0 },
            NearestLabeled { label: 0, distance: 1.0 },
            NearestLabeled { label: 0, distance: 2.0 },
        ],
        knn: vec![
            vec![Neighbor::new(1, 1.0)],
            vec![Neighbor::new(0, 1.0)],
            vec![Neighbor::new(1, 1.0)],
        ],
    }
}

#[test]
fn test_proximity_maps_len() {
    let maps = maps();

    assert_eq!(maps.len(), 3);
    assert!(!maps.is_empty());
    assert!(ProximityMaps::default().is_empty());
}

#[test]
fn test_is_neighbor_is_directional() {
    let maps = maps();

    assert!(maps.is_neighbor(2, 1));
    assert!(!maps.is_neighbor(1, 2));
    assert!(maps.is_neighbor(0, 1) && maps.is_neighbor(1, 0));
}

#[test]
fn test_edges_from_filters_by_source() {
    // Arrange
    let graph = GbiliGraph {
        edges: vec![Edge::new(0, 1, 0.5), Edge::new(0, 2, 0.25), Edge::new(1, 0, 0.5)],
        stats: RunStats::default(),
    };

    // Act
    let targets: Vec<usize> = graph.edges_from(0).map(|e| e.target).collect();

    // Assert
    assert_eq!(targets, vec![1, 2]);
    assert_eq!(graph.edges_from(2).count(), 0);
    assert_eq!(graph.len(), 3);
}

#[test]
fn test_edge_serializes_with_named_fields() {
    let json = serde_json::to_string(&Edge::new(3, 7, 0.5)).expect("serialize");

    assert_eq!(json, r#"{"source":3,"target":7,"weight":0.5}"#);
}
