//! # hai-sweep
//!
//! Parameter sweeps over density-based hierarchies, compared with the
//! Hierarchy Agreement Index (HAI) and meta-clustered into representative
//! settings.
//!
//! Sweeping HDBSCAN's neighbourhood size yields one hierarchy per value. Many
//! of those hierarchies are structurally the same; this crate finds out which,
//! groups them, and returns one representative value per group.
//!
//! ```rust
//! use hai_sweep::{run_analysis, FeatureMatrix, SweepConfig};
//!
//! let mut rows = Vec::new();
//! for (cx, cy) in [(0.0, 0.0), (10.0, 0.0)] {
//!     for i in 0..8 {
//!         let t = i as f64;
//!         rows.push(vec![cx + 0.1 * t.cos(), cy + 0.1 * t.sin()]);
//!     }
//! }
//! let features = FeatureMatrix::from_rows(&rows).unwrap();
//! let analysis = run_analysis(&features, &SweepConfig::new(2, 6)).unwrap();
//! assert_eq!(analysis.ordered_param_values, vec![2, 3, 4, 5, 6]);
//! assert_eq!(analysis.hai_matrix.len(), 5);
//! ```
//!
//! **Default build** runs sweeps and scale-matrix construction on the rayon
//! pool; disable the `parallel` feature for a single-threaded build.

pub mod analysis;
pub mod cluster;
/// Error types used across `hai-sweep`.
pub mod error;
pub mod hai;
pub mod hierarchy;
pub mod metrics;
pub mod sweep;

mod data;
mod distance;


pub use analysis::{analyze, run_analysis, AnalysisOutcome, HaiAnalysis};
pub use cluster::{DensityHierarchy, Hdbscan, HierarchyBuilder, HierarchyRun};
pub use data::{DistanceMatrix, FeatureMatrix, SYMMETRY_TOLERANCE};
pub use distance::{Distance, MetricKind};
pub use error::{Error, Result};
pub use hai::{assemble, hai_score, medoids, HaiMatrix, MetaClusterer};
pub use hierarchy::{Dendrogram, Merge, ScaleMatrix};
pub use metrics::{ami, ari, nmi};
pub use sweep::{
    run_density_sweep, run_sweep, run_sweep_with, ParameterRun, SweepConfig, SweepOutcome,
};
