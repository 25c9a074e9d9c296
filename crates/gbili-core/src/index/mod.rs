//! Exact nearest-neighbor indexes over a [`FeatureMatrix`].
//!
//! Two backends implement [`NeighborIndex`]:
//!
//! - [`KdTree`]: k-d tree with median splits on the widest dimension (default)
//! - [`BruteForceIndex`]: exhaustive scan, the reference for correctness
//!
//! Both return the same neighbors for the same query: results are the k
//! smallest `(distance, id)` pairs, so equidistant points are ordered by id.

mod brute_force;
mod kdtree;
mod top_k;


pub use brute_force::BruteForceIndex;
pub use kdtree::{KdTree, DEFAULT_LEAF_SIZE, PARALLEL_BUILD_THRESHOLD};

use crate::dataset::FeatureMatrix;
use crate::error::{Error, Result};
use crate::graph::Neighbor;
use serde::{Deserialize, Serialize};

/// Read-only exact k-nearest-neighbor index.
///
/// Implementations are immutable after construction and shared across
/// worker threads.
pub trait NeighborIndex: Send + Sync {
    /// Number of indexed objects.
    fn len(&self) -> usize;

    /// Returns true if the index holds no objects.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimension of indexed vectors.
    fn dimension(&self) -> usize;

    /// Returns the `min(k, len)` nearest objects to `point`, ascending by
    /// Euclidean distance, ties broken by ascending id.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if `point` has the wrong length.
    fn query(&self, point: &[f32], k: usize) -> Result<Vec<Neighbor>>;
}

/// Index backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    /// k-d tree (default).
    #[default]
    KdTree,
    /// Exhaustive scan.
    BruteForce,
}

/// Builds the configured index over `matrix`.
///
/// `leaf_size` only applies to [`IndexKind::KdTree`].
#[must_use]
pub fn build_index(
    kind: IndexKind,
    matrix: &FeatureMatrix,
    leaf_size: usize,
) -> Box<dyn NeighborIndex + '_> {
    match kind {
        IndexKind::KdTree => Box::new(KdTree::with_leaf_size(matrix, leaf_size)),
        IndexKind::BruteForce => Box::new(BruteForceIndex::new(matrix)),
    }
}

#[inline]
fn check_dimension(expected: usize, point: &[f32]) -> Result<()> {
    if point.len() == expected {
        Ok(())
    } else {
        Err(Error::DimensionMismatch {
            expected,
            actual: point.len(),
        })
    }
}
