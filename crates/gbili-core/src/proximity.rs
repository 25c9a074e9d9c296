//! Phase 1: nearest labeled object and k1 nearest neighbors of every object.

use crate::dataset::{FeatureMatrix, LabeledSet, ObjectId};
use crate::distance::euclidean;
use crate::error::{Error, Result};
use crate::executor::Partition;
use crate::graph::{NearestLabeled, Neighbor, ProximityMaps};
use crate::index::NeighborIndex;

/// Computes [`ProximityMaps`] entries against a shared, read-only index.
pub struct LabeledProximity<'a> {
    points: &'a FeatureMatrix,
    labeled: &'a LabeledSet,
    index: &'a dyn NeighborIndex,
    k1: usize,
}

impl<'a> LabeledProximity<'a> {
    /// Creates a phase 1 computer.
    #[must_use]
    pub fn new(
        points: &'a FeatureMatrix,
        labeled: &'a LabeledSet,
        index: &'a dyn NeighborIndex,
        k1: usize,
    ) -> Self {
        Self {
            points,
            labeled,
            index,
            k1,
        }
    }

    /// Checks that every object can get exactly k1 neighbors.
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration` if `k1` is zero or the labeled set is invalid
    /// - `InsufficientData` if the dataset has fewer than `k1 + 1` objects
    pub fn preflight(&self) -> Result<()> {
        if self.k1 == 0 {
            return Err(Error::InvalidConfiguration("k1 must be at least 1".into()));
        }
        self.labeled.validate(self.points.len())?;

        if self.k1 >= self.points.len() {
            return Err(Error::InsufficientData {
                required: self.k1.saturating_add(1),
                available: self.points.len(),
            });
        }
        Ok(())
    }

    /// Closest labeled object of `object` by linear scan.
    ///
    /// Labeled ids are scanned in ascending order with a strict `<`, so
    /// ties go to the smallest id. The object itself is skipped unless it is
    /// the only labeled object.
    #[must_use]
    pub fn nearest_labeled(&self, object: ObjectId) -> NearestLabeled {
        let row = self.points.row(object);
        let skip_self = self.labeled.len() >= 2;

        let mut candidates = self
            .labeled
            .iter()
            .filter(|&label| !(skip_self && label == object))
            .map(|label| NearestLabeled {
                label,
                distance: euclidean(row, self.points.row(label)),
            });

        // A validated labeled set always yields a candidate.
        let Some(first) = candidates.next() else {
            return NearestLabeled {
                label: object,
                distance: 0.0,
            };
        };
        candidates.fold(first, |best, candidate| {
            if candidate.distance < best.distance {
                candidate
            } else {
                best
            }
        })
    }

    /// The k1 nearest neighbors of `object`, ascending, self excluded.
    ///
    /// Queries k1 + 1 neighbors and removes `object` itself. With heavy
    /// duplication the object may not be among them (equidistant points with
    /// smaller ids come first); the farthest result is dropped instead.
    ///
    /// # Errors
    ///
    /// `InsufficientData` if the index returns fewer than k1 other objects.
    pub fn nearest_neighbors(&self, object: ObjectId) -> Result<Vec<Neighbor>> {
        let mut hits = self
            .index
            .query(self.points.row(object), self.k1.saturating_add(1))?;

        if let Some(pos) = hits.iter().position(|n| n.id == object) {
            hits.remove(pos);
        }
        hits.truncate(self.k1);

        if hits.len() < self.k1 {
            return Err(Error::InsufficientData {
                required: self.k1.saturating_add(1),
                available: self.index.len(),
            });
        }
        Ok(hits)
    }

    /// Runs phase 1 over one partition.
    ///
    /// # Errors
    ///
    /// `Cancelled` if the run was aborted, or any index query error.
    pub fn compute(&self, partition: &Partition<'_>) -> Result<ProximityMaps> {
        let mut nearest_labeled = Vec::with_capacity(partition.len());
        let mut knn = Vec::with_capacity(partition.len());

        for object in partition.range() {
            partition.checkpoint()?;
            nearest_labeled.push(self.nearest_labeled(object));
            knn.push(self.nearest_neighbors(object)?);
        }

        Ok(ProximityMaps {
            nearest_labeled,
            knn,
        })
    }
}

/// Concatenates per-partition maps (in partition order) into global maps.
///
/// # Errors
///
/// `WorkerFailure` naming the first partition whose output does not line up
/// with its id range, so an object can never be silently dropped.
pub fn merge_proximity(parts: Vec<ProximityMaps>, object_count: usize) -> Result<ProximityMaps> {
    let mut merged = ProximityMaps {
        nearest_labeled: Vec::with_capacity(object_count),
        knn: Vec::with_capacity(object_count),
    };

    for (index, part) in parts.into_iter().enumerate() {
        if part.nearest_labeled.len() != part.knn.len() {
            return Err(Error::WorkerFailure {
                partition: index,
                reason: format!(
                    "inconsistent output: {} nearest-labeled entries, {} knn lists",
                    part.nearest_labeled.len(),
                    part.knn.len()
                ),
            });
        }
        merged.nearest_labeled.extend(part.nearest_labeled);
        merged.knn.extend(part.knn);
    }

    if merged.len() != object_count {
        return Err(Error::WorkerFailure {
            partition: 0,
            reason: format!(
                "merged {} entries for {object_count} objects",
                merged.len()
            ),
        });
    }
    Ok(merged)
}
