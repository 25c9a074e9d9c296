//! Intermediate maps and the output edge list.

use crate::dataset::ObjectId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A neighbor returned by an index query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// Neighbor object id.
    pub id: ObjectId,
    /// Euclidean distance to the query.
    pub distance: f32,
}

impl Neighbor {
    /// Creates a new neighbor entry.
    #[must_use]
    pub const fn new(id: ObjectId, distance: f32) -> Self {
        Self { id, distance }
    }
}

/// The closest labeled object of some object, and the distance to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NearestLabeled {
    /// Id of the closest labeled object.
    pub label: ObjectId,
    /// Euclidean distance to it.
    pub distance: f32,
}

/// A weighted edge emitted from `source`'s perspective.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Object that generated the edge.
    pub source: ObjectId,
    /// Mutual nearest neighbor of `source`.
    pub target: ObjectId,
    /// `1 / (1 + distance(source, target))`.
    pub weight: f32,
}

impl Edge {
    /// Creates a new edge.
    #[must_use]
    pub const fn new(source: ObjectId, target: ObjectId, weight: f32) -> Self {
        Self {
            source,
            target,
            weight,
        }
    }
}

/// Phase 1 output for every object, indexed by object id.
///
/// Both vectors have exactly one entry per object once the executor has
/// merged all partitions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProximityMaps {
    /// `nearest_labeled[o]` is the closest labeled object of `o`.
    pub nearest_labeled: Vec<NearestLabeled>,
    /// `knn[o]` holds the k1 nearest neighbors of `o`, ascending by distance.
    pub knn: Vec<Vec<Neighbor>>,
}

impl ProximityMaps {
    /// Number of objects covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.knn.len()
    }

    /// Returns true if no object is covered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.knn.is_empty()
    }

    /// Returns true if `candidate` is among the k1 nearest neighbors of `object`.
    #[inline]
    #[must_use]
    pub fn is_neighbor(&self, object: ObjectId, candidate: ObjectId) -> bool {
        self.knn[object].iter().any(|n| n.id == candidate)
    }
}

/// Counters collected during a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Number of objects (N).
    pub objects: usize,
    /// Number of labeled objects.
    pub labeled: usize,
    /// Number of partitions actually scheduled per phase.
    pub partitions: usize,
    /// Mutual candidates found before k2 truncation.
    pub mutual_candidates: usize,
    /// Number of emitted edges.
    pub edges: usize,
    /// Time spent building the index.
    pub index_build: Duration,
    /// Time spent in phase 1.
    pub proximity: Duration,
    /// Time spent in phase 2.
    pub selection: Duration,
}

/// Result of a successful run.
#[derive(Debug, Clone, Default)]
pub struct GbiliGraph {
    /// Emitted edges, grouped by source in ascending source order.
    pub edges: Vec<Edge>,
    /// Run counters.
    pub stats: RunStats,
}

impl GbiliGraph {
    /// Number of emitted edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns true if no edge was emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Edges emitted by `source`.
    pub fn edges_from(&self, source: ObjectId) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter().filter(move |e| e.source == source)
    }
}
