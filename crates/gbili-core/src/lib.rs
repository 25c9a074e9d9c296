//! # GBILI Core
//!
//! Graph construction for semi-supervised learning, based on the
//! Graph-Based on Informativeness of Labeled Instances (GBILI) rule.
//!
//! Given a dataset of feature vectors and a small set of labeled objects,
//! GBILI connects each object to up to `k2` of its mutual k-nearest
//! neighbors, preferring neighbors that sit close to some labeled object.
//!
//! ## Features
//!
//! - **Exact neighbors**: k-d tree or brute-force search, SIMD distances
//! - **Two-phase parallel pipeline**: fixed partitions, fail-fast workers
//! - **Deterministic output**: identical edge list for any worker count
//! - **Edge list writers**: plain text or JSON lines
//!
//! ## Quick Start
//!
//! ```rust
//! use gbili_core::{FeatureMatrix, GbiliBuilder, LabeledSet};
//!
//! let points = FeatureMatrix::from_rows(vec![
//!     vec![0.0f32, 0.0],
//!     vec![0.0, 1.0],
//!     vec![1.0, 0.0],
//!     vec![5.0, 5.0],
//!     vec![5.0, 6.0],
//! ])?;
//! let labeled = LabeledSet::new([0, 3]);
//!
//! let graph = GbiliBuilder::new()
//!     .with_k1(2)
//!     .with_k2(2)
//!     .with_workers(2)
//!     .build(&points, &labeled)?;
//!
//! for edge in &graph.edges {
//!     println!("{} {} {}", edge.source, edge.target, edge.weight);
//! }
//! # Ok::<(), gbili_core::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::suboptimal_flops)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::wildcard_imports)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod dataset;
pub mod distance;
#[cfg(test)]
mod distance_tests;
pub mod error;
pub mod executor;
pub mod graph;
#[cfg(test)]
mod graph_tests;
pub mod index;
pub mod pipeline;
pub mod proximity;
#[cfg(test)]
mod proximity_tests;
pub mod selector;
pub mod writer;

pub use config::{ConfigError, GbiliConfig, OutputFormat};
pub use dataset::{FeatureMatrix, LabeledSet, ObjectId};
pub use distance::{edge_weight, euclidean, squared_euclidean};
pub use error::{Error, Result};
pub use executor::{partition_ranges, Partition, PartitionExecutor};
pub use graph::{Edge, GbiliGraph, NearestLabeled, Neighbor, ProximityMaps, RunStats};
pub use index::{build_index, BruteForceIndex, IndexKind, KdTree, NeighborIndex};
pub use pipeline::GbiliBuilder;
pub use proximity::{merge_proximity, LabeledProximity};
pub use selector::{merge_edges, MutualKnnSelector, ScoredCandidate, SelectedEdges};
pub use writer::{write_edges, writer_for, GraphWriter, JsonLinesEdgeWriter, TextEdgeWriter};
