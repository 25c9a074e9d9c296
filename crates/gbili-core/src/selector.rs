//! Phase 2: mutual-kNN edge selection ranked by informativeness.
//!
//! For object `o` and each neighbor `n` in `knn[o]`:
//!
//! ```text
//! mutual(o, n) = o ∈ knn[n]
//! score(o, n)  = d(o, n) + nearest_labeled[n].distance
//! weight(o, n) = 1 / (1 + d(o, n))
//! ```
//!
//! Mutual neighbors are sorted by `(score, n)` and the first `k2` become
//! edges `(o, n, weight)`. The score decides which edges survive; the weight
//! only reflects geometric closeness.

use crate::dataset::ObjectId;
use crate::distance::edge_weight;
use crate::error::{Error, Result};
use crate::executor::Partition;
use crate::graph::{Edge, ProximityMaps};

/// A mutual neighbor of some object, with its ranking score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCandidate {
    /// Neighbor id.
    pub neighbor: ObjectId,
    /// Distance from the originating object.
    pub distance: f32,
    /// `distance + distance(neighbor, its nearest labeled object)`.
    pub score: f32,
}

/// Phase 2 output of one partition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectedEdges {
    /// Edges in ascending source order.
    pub edges: Vec<Edge>,
    /// Mutual candidates seen before k2 truncation.
    pub mutual_candidates: usize,
}

/// Selects up to `k2` edges per object from merged phase 1 maps.
#[derive(Debug, Clone, Copy)]
pub struct MutualKnnSelector<'a> {
    maps: &'a ProximityMaps,
    k2: usize,
}

impl<'a> MutualKnnSelector<'a> {
    /// Creates a selector over an immutable snapshot of the phase 1 maps.
    #[must_use]
    pub fn new(maps: &'a ProximityMaps, k2: usize) -> Self {
        Self { maps, k2 }
    }

    /// Checks the selector parameters.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if `k2` is zero.
    pub fn preflight(&self) -> Result<()> {
        if self.k2 == 0 {
            return Err(Error::InvalidConfiguration("k2 must be at least 1".into()));
        }
        Ok(())
    }

    /// Mutual neighbors of `object`, ascending by `(score, neighbor id)`.
    #[must_use]
    pub fn candidates(&self, object: ObjectId) -> Vec<ScoredCandidate> {
        let mut candidates: Vec<ScoredCandidate> = self.maps.knn[object]
            .iter()
            .filter(|n| n.id != object && self.maps.is_neighbor(n.id, object))
            .map(|n| ScoredCandidate {
                neighbor: n.id,
                distance: n.distance,
                score: n.distance + self.maps.nearest_labeled[n.id].distance,
            })
            .collect();

        candidates.sort_by(|a, b| {
            a.score
                .total_cmp(&b.score)
                .then(a.neighbor.cmp(&b.neighbor))
        });
        candidates
    }

    /// Edges emitted by `object`: at most `k2`, fewer if fewer are mutual.
    #[must_use]
    pub fn select(&self, object: ObjectId) -> Vec<Edge> {
        self.candidates(object)
            .into_iter()
            .take(self.k2)
            .map(|c| Edge::new(object, c.neighbor, edge_weight(c.distance)))
            .collect()
    }

    /// Runs phase 2 over one partition.
    ///
    /// # Errors
    ///
    /// `Cancelled` if the run was aborted.
    pub fn compute(&self, partition: &Partition<'_>) -> Result<SelectedEdges> {
        let capacity = partition
            .range()
            .map(|object| self.maps.knn[object].len().min(self.k2))
            .sum();
        let mut out = SelectedEdges {
            edges: Vec::with_capacity(capacity),
            mutual_candidates: 0,
        };

        for object in partition.range() {
            partition.checkpoint()?;
            let candidates = self.candidates(object);
            out.mutual_candidates += candidates.len();
            out.edges.extend(
                candidates
                    .into_iter()
                    .take(self.k2)
                    .map(|c| Edge::new(object, c.neighbor, edge_weight(c.distance))),
            );
        }
        Ok(out)
    }
}

/// Concatenates per-partition edges in partition order.
#[must_use]
pub fn merge_edges(parts: Vec<SelectedEdges>) -> SelectedEdges {
    let total = parts.iter().map(|p| p.edges.len()).sum();
    let mut merged = SelectedEdges {
        edges: Vec::with_capacity(total),
        mutual_candidates: 0,
    };
    for part in parts {
        merged.mutual_candidates += part.mutual_candidates;
        merged.edges.extend(part.edges);
    }
    merged
}
