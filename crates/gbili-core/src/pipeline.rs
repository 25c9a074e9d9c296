//! End-to-end GBILI graph construction.
//!
//! ```text
//! FeatureMatrix ──► NeighborIndex (built once)
//!                        │
//!   phase 1 (per partition): nearest labeled + k1-NN ──► merge ──► ProximityMaps
//!                                                                     │
//!   phase 2 (per partition): mutual kNN + score ranking ──► merge ──► edges
//! ```
//!
//! Each phase is a barrier: phase 2 only starts once every phase 1 partition
//! has been merged, and the edge list only exists once every phase 2
//! partition has returned.

use crate::config::GbiliConfig;
use crate::dataset::{FeatureMatrix, LabeledSet};
use crate::error::{Error, Result};
use crate::executor::{partition_ranges, PartitionExecutor};
use crate::graph::{GbiliGraph, ProximityMaps, RunStats};
use crate::index::{build_index, IndexKind, NeighborIndex};
use crate::proximity::{merge_proximity, LabeledProximity};
use crate::selector::{merge_edges, MutualKnnSelector};
use std::time::{Duration, Instant};

/// Builder for a GBILI run.
///
/// # Example
///
/// ```
/// use gbili_core::{FeatureMatrix, GbiliBuilder, LabeledSet};
///
/// let points = FeatureMatrix::from_rows(
///     [0.0f32, 1.0, 2.0, 3.0, 10.0, 11.0].iter().map(|&p| vec![p]),
/// )?;
/// let labeled = LabeledSet::new([0, 4]);
///
/// let graph = GbiliBuilder::new()
///     .with_k1(2)
///     .with_k2(1)
///     .with_workers(2)
///     .build(&points, &labeled)?;
///
/// assert_eq!(graph.len(), 6);
/// # Ok::<(), gbili_core::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GbiliBuilder {
    k1: usize,
    k2: usize,
    workers: usize,
    index: IndexKind,
    leaf_size: usize,
}

impl Default for GbiliBuilder {
    fn default() -> Self {
        Self::from_config(&GbiliConfig::default())
    }
}

impl GbiliBuilder {
    /// Creates a builder with default parameters (k1 = 3, k2 = 3, 4 workers).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder from a loaded configuration.
    #[must_use]
    pub fn from_config(config: &GbiliConfig) -> Self {
        Self {
            k1: config.graph.k1,
            k2: config.graph.k2,
            workers: config.execution.workers,
            index: config.index.kind,
            leaf_size: config.index.leaf_size,
        }
    }

    /// Builder: set neighbors per object.
    #[must_use]
    pub fn with_k1(mut self, k1: usize) -> Self {
        self.k1 = k1;
        self
    }

    /// Builder: set maximum edges per object.
    #[must_use]
    pub fn with_k2(mut self, k2: usize) -> Self {
        self.k2 = k2;
        self
    }

    /// Builder: set worker (partition) count.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Builder: set index backend.
    #[must_use]
    pub fn with_index(mut self, index: IndexKind) -> Self {
        self.index = index;
        self
    }

    /// Builder: set k-d tree leaf size.
    #[must_use]
    pub fn with_leaf_size(mut self, leaf_size: usize) -> Self {
        self.leaf_size = leaf_size;
        self
    }

    /// Neighbors per object.
    #[must_use]
    pub fn k1(&self) -> usize {
        self.k1
    }

    /// Maximum edges per object.
    #[must_use]
    pub fn k2(&self) -> usize {
        self.k2
    }

    /// Worker count.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Validates parameters against the dataset without scheduling work.
    ///
    /// Checks, in order: `k1`, `k2` and worker count are non-zero; the
    /// labeled set is non-empty and in range; at least `k1 + 1` objects
    /// exist; the worker count does not exceed the object count.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` or `InsufficientData`.
    pub fn preflight(&self, points: &FeatureMatrix, labeled: &LabeledSet) -> Result<()> {
        if self.k1 == 0 {
            return Err(Error::InvalidConfiguration("k1 must be at least 1".into()));
        }
        if self.k2 == 0 {
            return Err(Error::InvalidConfiguration("k2 must be at least 1".into()));
        }
        if self.workers == 0 {
            return Err(Error::InvalidConfiguration(
                "worker count must be at least 1".into(),
            ));
        }
        labeled.validate(points.len())?;

        if self.k1 >= points.len() {
            return Err(Error::InsufficientData {
                required: self.k1.saturating_add(1),
                available: points.len(),
            });
        }

        partition_ranges(points.len(), self.workers).map(|_| ())
    }

    /// Runs the full pipeline with the configured index backend.
    ///
    /// # Errors
    ///
    /// Pre-flight errors before any work is scheduled, then the first
    /// worker failure of either phase.
    pub fn build(&self, points: &FeatureMatrix, labeled: &LabeledSet) -> Result<GbiliGraph> {
        self.preflight(points, labeled)?;

        let started = Instant::now();
        let index = build_index(self.index, points, self.leaf_size.max(1));
        let index_build = started.elapsed();
        tracing::info!(
            objects = points.len(),
            dimension = points.dimension(),
            index = ?self.index,
            elapsed_ms = index_build.as_millis() as u64,
            "nearest-neighbor index built"
        );

        let mut graph = self.run(points, labeled, index.as_ref())?;
        graph.stats.index_build = index_build;
        Ok(graph)
    }

    /// Runs both phases against a caller-supplied index over `points`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::build`], plus `DimensionMismatch` or
    /// `InvalidConfiguration` if the index was not built over `points`.
    pub fn build_with_index(
        &self,
        points: &FeatureMatrix,
        labeled: &LabeledSet,
        index: &dyn NeighborIndex,
    ) -> Result<GbiliGraph> {
        self.preflight(points, labeled)?;
        check_index(points, index)?;
        self.run(points, labeled, index)
    }

    /// Runs phase 1 only and returns the merged maps.
    ///
    /// # Errors
    ///
    /// Pre-flight errors, an index not built over `points`, or the first
    /// phase 1 worker failure.
    pub fn compute_proximity(
        &self,
        points: &FeatureMatrix,
        labeled: &LabeledSet,
        index: &dyn NeighborIndex,
    ) -> Result<ProximityMaps> {
        self.preflight(points, labeled)?;
        check_index(points, index)?;
        self.proximity_phase(points, labeled, index)
            .map(|(maps, _)| maps)
    }

    /// Both phases over already validated inputs.
    fn run(
        &self,
        points: &FeatureMatrix,
        labeled: &LabeledSet,
        index: &dyn NeighborIndex,
    ) -> Result<GbiliGraph> {
        let object_count = points.len();

        let started = Instant::now();
        let (maps, partitions) = self.proximity_phase(points, labeled, index)?;
        let proximity = started.elapsed();
        tracing::info!(
            objects = object_count,
            k1 = self.k1,
            partitions,
            elapsed_ms = proximity.as_millis() as u64,
            "phase 1 complete: nearest labeled and k1-NN merged"
        );

        let started = Instant::now();
        let selector = MutualKnnSelector::new(&maps, self.k2);
        let parts = PartitionExecutor::new(self.workers)
            .execute(object_count, |partition| selector.compute(partition))?;
        let selected = merge_edges(parts);
        let selection = started.elapsed();
        tracing::info!(
            edges = selected.edges.len(),
            mutual_candidates = selected.mutual_candidates,
            k2 = self.k2,
            elapsed_ms = selection.as_millis() as u64,
            "phase 2 complete: edges selected"
        );

        let stats = RunStats {
            objects: object_count,
            labeled: labeled.len(),
            partitions,
            mutual_candidates: selected.mutual_candidates,
            edges: selected.edges.len(),
            index_build: Duration::ZERO,
            proximity,
            selection,
        };

        Ok(GbiliGraph {
            edges: selected.edges,
            stats,
        })
    }

    /// Phase 1 over already validated inputs; also returns the partition count.
    fn proximity_phase(
        &self,
        points: &FeatureMatrix,
        labeled: &LabeledSet,
        index: &dyn NeighborIndex,
    ) -> Result<(ProximityMaps, usize)> {
        let proximity = LabeledProximity::new(points, labeled, index, self.k1);
        let parts = PartitionExecutor::new(self.workers)
            .execute(points.len(), |partition| proximity.compute(partition))?;
        let partitions = parts.len();
        Ok((merge_proximity(parts, points.len())?, partitions))
    }
}

fn check_index(points: &FeatureMatrix, index: &dyn NeighborIndex) -> Result<()> {
    if index.dimension() != points.dimension() {
        return Err(Error::DimensionMismatch {
            expected: points.dimension(),
            actual: index.dimension(),
        });
    }
    if index.len() != points.len() {
        return Err(Error::InvalidConfiguration(format!(
            "index holds {} objects, dataset has {}",
            index.len(),
            points.len()
        )));
    }
    Ok(())
}
