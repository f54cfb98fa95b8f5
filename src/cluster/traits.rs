//! Seams for the external clustering collaborators.

use super::HierarchyRun;
use crate::data::{DistanceMatrix, FeatureMatrix};
use crate::error::Result;

/// Builds one hierarchy per swept parameter value.
///
/// Implementations must be pure functions of `(features, param)`: the sweep
/// may call them concurrently and in any order.
pub trait HierarchyBuilder {
    /// Build the hierarchy for one parameter value.
    ///
    /// A failure specific to this value should be reported as
    /// [`crate::Error::UpstreamClustering`]; the sweep skips such runs.
    /// Any other error aborts the sweep.
    fn build(&self, features: &FeatureMatrix, param: usize) -> Result<HierarchyRun>;
}

/// Density clustering over a precomputed distance matrix.
pub trait DensityClustering {
    /// Fit and return one label per point, `-1` for noise.
    fn fit_precomputed(&self, dist: &DistanceMatrix) -> Result<Vec<i32>>;
}
