//! Bounded selection of the k smallest `(distance, id)` pairs.

use crate::dataset::ObjectId;
use crate::graph::Neighbor;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Heap entry ordered by squared distance, then by id.
///
/// The id component makes the selected set unique for any input, which is
/// what gives index queries their deterministic tie-breaking.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    squared: f32,
    id: ObjectId,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.squared
            .total_cmp(&other.squared)
            .then(self.id.cmp(&other.id))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

/// Max-heap holding the best `k` candidates seen so far.
#[derive(Debug)]
pub(crate) struct TopK {
    k: usize,
    heap: BinaryHeap<Candidate>,
}

impl TopK {
    pub(crate) fn new(k: usize) -> Self {
        Self {
            k,
            heap: BinaryHeap::with_capacity(k.saturating_add(1)),
        }
    }

    /// Offers a candidate; keeps it only if it beats the current worst.
    #[inline]
    pub(crate) fn push(&mut self, squared: f32, id: ObjectId) {
        if self.k == 0 {
            return;
        }
        let candidate = Candidate { squared, id };
        if self.heap.len() < self.k {
            self.heap.push(candidate);
        } else if let Some(mut worst) = self.heap.peek_mut() {
            if candidate < *worst {
                *worst = candidate;
            }
        }
    }

    /// Returns true if a point at `squared` distance could still enter the set.
    ///
    /// Equality counts: an equidistant point with a smaller id must be seen.
    #[inline]
    pub(crate) fn admits(&self, squared: f32) -> bool {
        if self.heap.len() < self.k {
            return true;
        }
        self.heap
            .peek()
            .is_some_and(|worst| squared <= worst.squared)
    }

    /// Consumes the heap, returning neighbors ascending by `(distance, id)`.
    pub(crate) fn into_sorted(self) -> Vec<Neighbor> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|c| Neighbor::new(c.id, c.squared.sqrt()))
            .collect()
    }
}
