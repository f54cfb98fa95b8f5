//! Density-based hierarchy construction.
//!
//! The sweep needs one hierarchy per neighbourhood size. This module provides
//! the pieces that produce them:
//!
//! - [`mutual_reachability`]: density-smoothed distances, so the tree depends
//!   on `k`.
//! - [`Hdbscan`]: condenses the single-linkage tree over those distances and
//!   picks flat clusters by excess of mass. It also serves the meta-clustering
//!   step, run on `1 − HAI` distances.
//! - [`DensityHierarchy`]: the default [`HierarchyBuilder`], wiring a metric
//!   and the swept value into [`Hdbscan`] and returning a [`HierarchyRun`].
//!
//! ## Swapping the collaborator
//!
//! The sweep only talks to [`HierarchyBuilder`]; any type that can turn
//! features plus a parameter into a [`crate::hierarchy::Dendrogram`] can
//! be swept. Report per-parameter failures as
//! [`crate::Error::UpstreamClustering`] so they are skipped rather than
//! aborting the sweep.
//!
//! ```rust
//! use hai_sweep::cluster::{DensityHierarchy, HierarchyBuilder};
//! use hai_sweep::{FeatureMatrix, MetricKind};
//!
//! let features = FeatureMatrix::from_rows(&[
//!     vec![0.0, 0.0], vec![0.1, 0.0], vec![0.0, 0.1],
//!     vec![5.0, 5.0], vec![5.1, 5.0], vec![5.0, 5.1],
//! ]).unwrap();
//! let run = DensityHierarchy::new(MetricKind::Euclidean)
//!     .build(&features, 3)
//!     .unwrap();
//! assert_eq!(run.tree.n_merges(), 5);
//! ```

mod hdbscan;
mod mutual_reachability;
mod run;
mod traits;

pub use hdbscan::{Hdbscan, HdbscanFit, NOISE};
pub use mutual_reachability::{core_distances, mutual_reachability, mutual_reachability_from};
pub use run::{DensityHierarchy, ExternalScores, HierarchyRun};
pub use traits::{DensityClustering, HierarchyBuilder};
