//! Exhaustive exact search.

use super::top_k::TopK;
use super::{check_dimension, NeighborIndex};
use crate::dataset::FeatureMatrix;
use crate::distance::squared_euclidean;
use crate::error::Result;
use crate::graph::Neighbor;

/// Scans every object for each query. O(N·D) per query.
#[derive(Debug, Clone, Copy)]
pub struct BruteForceIndex<'a> {
    points: &'a FeatureMatrix,
}

impl<'a> BruteForceIndex<'a> {
    /// Wraps the matrix; no preprocessing.
    #[must_use]
    pub fn new(points: &'a FeatureMatrix) -> Self {
        Self { points }
    }
}

impl NeighborIndex for BruteForceIndex<'_> {
    fn len(&self) -> usize {
        self.points.len()
    }

    fn dimension(&self) -> usize {
        self.points.dimension()
    }

    fn query(&self, point: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        check_dimension(self.points.dimension(), point)?;

        let mut top = TopK::new(k.min(self.points.len()));
        for (id, row) in self.points.rows().enumerate() {
            top.push(squared_euclidean(point, row), id);
        }
        Ok(top.into_sorted())
    }
}
