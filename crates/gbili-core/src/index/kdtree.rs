//! Exact k-d tree.
//!
//! # Construction
//!
//! Each internal node splits its objects at the median of the dimension with
//! the widest spread. Objects equal to the split value may land on either
//! side; the search handles this by visiting the far side whenever the
//! splitting plane is not strictly farther than the current k-th best.
//! Subtrees with at least [`PARALLEL_BUILD_THRESHOLD`] objects are built
//! concurrently with `rayon::join`.
//!
//! # Search
//!
//! Depth-first descent into the near child, then the far child if the plane
//! distance is admissible. The result is identical to [`super::BruteForceIndex`].

use super::top_k::TopK;
use super::{check_dimension, NeighborIndex};
use crate::dataset::{FeatureMatrix, ObjectId};
use crate::distance::squared_euclidean;
use crate::error::Result;
use crate::graph::Neighbor;

/// Default number of objects per leaf bucket.
pub const DEFAULT_LEAF_SIZE: usize = 16;

/// Subtrees at least this large are built on the rayon pool.
pub const PARALLEL_BUILD_THRESHOLD: usize = 4096;

#[derive(Debug)]
enum Node {
    Leaf {
        start: usize,
        end: usize,
    },
    Split {
        dim: usize,
        value: f32,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// k-d tree over a borrowed feature matrix.
#[derive(Debug)]
pub struct KdTree<'a> {
    points: &'a FeatureMatrix,
    /// Object ids permuted so every leaf owns a contiguous range.
    order: Vec<ObjectId>,
    root: Node,
    leaf_size: usize,
}

impl<'a> KdTree<'a> {
    /// Builds a tree with [`DEFAULT_LEAF_SIZE`].
    #[must_use]
    pub fn new(points: &'a FeatureMatrix) -> Self {
        Self::with_leaf_size(points, DEFAULT_LEAF_SIZE)
    }

    /// Builds a tree with the given leaf bucket size (clamped to at least 1).
    #[must_use]
    pub fn with_leaf_size(points: &'a FeatureMatrix, leaf_size: usize) -> Self {
        let leaf_size = leaf_size.max(1);
        let mut order: Vec<ObjectId> = (0..points.len()).collect();
        let root = build(points, &mut order, 0, leaf_size);
        Self {
            points,
            order,
            root,
            leaf_size,
        }
    }

    /// Leaf bucket size used at construction.
    #[must_use]
    pub fn leaf_size(&self) -> usize {
        self.leaf_size
    }

    /// Depth of the deepest leaf (a single leaf has depth 0).
    #[must_use]
    pub fn depth(&self) -> usize {
        fn walk(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(left).max(walk(right)),
            }
        }
        walk(&self.root)
    }

    fn search(&self, node: &Node, point: &[f32], top: &mut TopK) {
        match node {
            Node::Leaf { start, end } => {
                for &id in &self.order[*start..*end] {
                    top.push(squared_euclidean(point, self.points.row(id)), id);
                }
            }
            Node::Split {
                dim,
                value,
                left,
                right,
            } => {
                let diff = point[*dim] - *value;
                let (near, far) = if diff <= 0.0 {
                    (left, right)
                } else {
                    (right, left)
                };
                self.search(near, point, top);
                if top.admits(diff * diff) {
                    self.search(far, point, top);
                }
            }
        }
    }
}

impl NeighborIndex for KdTree<'_> {
    fn len(&self) -> usize {
        self.points.len()
    }

    fn dimension(&self) -> usize {
        self.points.dimension()
    }

    fn query(&self, point: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        check_dimension(self.points.dimension(), point)?;

        let mut top = TopK::new(k.min(self.points.len()));
        self.search(&self.root, point, &mut top);
        Ok(top.into_sorted())
    }
}

/// Recursively partitions `ids` (which start at `offset` in the full order).
fn build(points: &FeatureMatrix, ids: &mut [ObjectId], offset: usize, leaf_size: usize) -> Node {
    let len = ids.len();
    let leaf = Node::Leaf {
        start: offset,
        end: offset + len,
    };
    if len <= leaf_size {
        return leaf;
    }

    let Some(dim) = widest_dimension(points, ids) else {
        // All points identical: splitting cannot separate them.
        return leaf;
    };

    let mid = len / 2;
    ids.select_nth_unstable_by(mid, |&a, &b| {
        points.row(a)[dim]
            .total_cmp(&points.row(b)[dim])
            .then(a.cmp(&b))
    });
    let value = points.row(ids[mid])[dim];

    let (lo, hi) = ids.split_at_mut(mid);
    let (left, right) = if len >= PARALLEL_BUILD_THRESHOLD {
        rayon::join(
            || build(points, lo, offset, leaf_size),
            || build(points, hi, offset + mid, leaf_size),
        )
    } else {
        (
            build(points, lo, offset, leaf_size),
            build(points, hi, offset + mid, leaf_size),
        )
    };

    Node::Split {
        dim,
        value,
        left: Box::new(left),
        right: Box::new(right),
    }
}

/// Dimension with the largest max-min spread, or `None` if every spread is 0.
fn widest_dimension(points: &FeatureMatrix, ids: &[ObjectId]) -> Option<usize> {
    let dimension = points.dimension();
    let mut lo = vec![f32::INFINITY; dimension];
    let mut hi = vec![f32::NEG_INFINITY; dimension];

    for &id in ids {
        for (d, &v) in points.row(id).iter().enumerate() {
            lo[d] = lo[d].min(v);
            hi[d] = hi[d].max(v);
        }
    }

    let mut best: Option<(usize, f32)> = None;
    for d in 0..dimension {
        let spread = hi[d] - lo[d];
        if spread > 0.0 && best.map_or(true, |(_, s)| spread > s) {
            best = Some((d, spread));
        }
    }
    best.map(|(d, _)| d)
}
