//! Input data for graph construction: the feature matrix and the labeled set.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Identifier of an object: its row in the feature matrix, in `[0, N)`.
pub type ObjectId = usize;

/// Dense row-major matrix of N objects × D attributes.
///
/// Immutable once built; shared by reference with every worker.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    data: Vec<f32>,
    dimension: usize,
}

impl FeatureMatrix {
    /// Creates a matrix from a flat row-major buffer.
    ///
    /// # Errors
    ///
    /// - `InvalidVector` if the buffer is empty, `dimension` is zero, or a
    ///   value is NaN/infinite.
    /// - `DimensionMismatch` if the buffer length is not a multiple of
    ///   `dimension`.
    pub fn new(data: Vec<f32>, dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(Error::InvalidVector("dimension must be at least 1".into()));
        }
        if data.is_empty() {
            return Err(Error::InvalidVector("feature matrix is empty".into()));
        }
        if data.len() % dimension != 0 {
            return Err(Error::DimensionMismatch {
                expected: dimension,
                actual: data.len() % dimension,
            });
        }
        if let Some(pos) = data.iter().position(|v| !v.is_finite()) {
            return Err(Error::InvalidVector(format!(
                "non-finite value at object {} attribute {}",
                pos / dimension,
                pos % dimension
            )));
        }

        Ok(Self { data, dimension })
    }

    /// Creates a matrix from one vector per object.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if rows differ in length, otherwise the same
    /// errors as [`FeatureMatrix::new`].
    pub fn from_rows<I, R>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[f32]>,
    {
        let mut data = Vec::new();
        let mut dimension = None;

        for row in rows {
            let row = row.as_ref();
            match dimension {
                None => dimension = Some(row.len()),
                Some(expected) if expected != row.len() => {
                    return Err(Error::DimensionMismatch {
                        expected,
                        actual: row.len(),
                    });
                }
                Some(_) => {}
            }
            data.extend_from_slice(row);
        }

        Self::new(data, dimension.unwrap_or(0))
    }

    /// Number of objects (N).
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    /// Always false: construction rejects empty matrices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of attributes per object (D).
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Feature vector of object `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id >= self.len()`.
    #[inline]
    #[must_use]
    pub fn row(&self, id: ObjectId) -> &[f32] {
        let start = id * self.dimension;
        &self.data[start..start + self.dimension]
    }

    /// Iterates over all feature vectors in id order.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f32]> + '_ {
        self.data.chunks_exact(self.dimension)
    }
}

/// Set of labeled object ids, kept sorted ascending and deduplicated.
///
/// Iteration order is ascending id, which makes "first minimum wins" in the
/// nearest-labeled scan resolve ties to the smallest id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ObjectId>", into = "Vec<ObjectId>")]
pub struct LabeledSet {
    ids: Vec<ObjectId>,
}

impl LabeledSet {
    /// Creates a labeled set; duplicates are dropped.
    pub fn new<I: IntoIterator<Item = ObjectId>>(ids: I) -> Self {
        let mut ids: Vec<ObjectId> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        Self { ids }
    }

    /// Checks that the set is non-empty and every id is below `object_count`.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` describing the first violation.
    pub fn validate(&self, object_count: usize) -> Result<()> {
        if self.ids.is_empty() {
            return Err(Error::InvalidConfiguration(
                "labeled set must contain at least one object".into(),
            ));
        }
        // Sorted, so checking the last id covers the whole set.
        if let Some(&max) = self.ids.last() {
            if max >= object_count {
                return Err(Error::InvalidConfiguration(format!(
                    "labeled object {max} is out of range [0, {object_count})"
                )));
            }
        }
        Ok(())
    }

    /// Number of labeled objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if no object is labeled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns true if `id` is labeled.
    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    /// Labeled ids in ascending order.
    #[must_use]
    pub fn as_slice(&self) -> &[ObjectId] {
        &self.ids
    }

    /// Iterates over labeled ids in ascending order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = ObjectId> + '_ {
        self.ids.iter().copied()
    }
}

impl FromIterator<ObjectId> for LabeledSet {
    fn from_iter<I: IntoIterator<Item = ObjectId>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl From<Vec<ObjectId>> for LabeledSet {
    fn from(ids: Vec<ObjectId>) -> Self {
        Self::new(ids)
    }
}

impl From<LabeledSet> for Vec<ObjectId> {
    fn from(set: LabeledSet) -> Self {
        set.ids
    }
}
