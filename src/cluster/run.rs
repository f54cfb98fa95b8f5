use super::hdbscan::{Hdbscan, NOISE};
use super::traits::HierarchyBuilder;
use crate::data::{DistanceMatrix, FeatureMatrix};
use crate::distance::{Distance, MetricKind};
use crate::error::{Error, Result};
use crate::hierarchy::Dendrogram;
use crate::metrics::{ami, ari, nmi};
use serde::Serialize;
use std::collections::HashSet;

/// Artifacts of one successful parameter run.
///
/// Only `tree` is needed for meta-analysis; labels and probabilities pass
/// through to presentation untouched.
#[derive(Debug, Clone, Serialize)]
pub struct HierarchyRun {
    /// Parameter value that produced this run.
    pub param: usize,
    /// Merge sequence over all samples.
    pub tree: Dendrogram,
    /// Flat cluster label per sample, `-1` for noise.
    pub labels: Vec<i32>,
    /// Membership strength per sample.
    pub probabilities: Vec<f64>,
}

/// Agreement of a run's flat labels with known classes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExternalScores {
    /// Adjusted Rand Index.
    pub ari: f64,
    /// Adjusted Mutual Information.
    pub ami: f64,
    /// Normalized Mutual Information, without chance adjustment.
    pub nmi: f64,
}

impl HierarchyRun {
    /// Number of samples the hierarchy spans.
    pub fn n_samples(&self) -> usize {
        self.tree.n_items()
    }

    /// Number of distinct non-noise labels.
    pub fn n_clusters(&self) -> usize {
        self.labels
            .iter()
            .filter(|&&l| l != NOISE)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Number of samples labelled as noise.
    pub fn noise_points(&self) -> usize {
        self.labels.iter().filter(|&&l| l == NOISE).count()
    }

    /// Score the flat labels against ground truth. Noise counts as its own label.
    pub fn external_scores(&self, truth: &[i32]) -> Result<ExternalScores> {
        if truth.len() != self.labels.len() {
            return Err(Error::invalid(format!(
                "label file has {} entries, data has {}",
                truth.len(),
                self.labels.len()
            )));
        }
        Ok(ExternalScores {
            ari: ari(&self.labels, truth),
            ami: ami(&self.labels, truth),
            nmi: nmi(&self.labels, truth),
        })
    }
}

/// Default hierarchy collaborator: HDBSCAN's single-linkage tree over
/// mutual reachability distances.
///
/// The swept value drives both the minimum cluster size and the core
/// neighbourhood size, unless `min_samples` is pinned with
/// [`DensityHierarchy::with_min_samples`].
#[derive(Debug, Clone)]
pub struct DensityHierarchy<M = MetricKind> {
    metric: M,
    min_samples: Option<usize>,
}

impl<M: Distance> DensityHierarchy<M> {
    /// Create a builder using `metric` for raw distances.
    pub fn new(metric: M) -> Self {
        Self {
            metric,
            min_samples: None,
        }
    }

    /// Pin the core neighbourhood size instead of following the swept value.
    pub fn with_min_samples(mut self, min_samples: Option<usize>) -> Self {
        self.min_samples = min_samples;
        self
    }

    /// Metric used for raw distances.
    pub fn metric(&self) -> &M {
        &self.metric
    }

    /// Raw pairwise distances under this builder's metric.
    ///
    /// They do not depend on the swept value, so a sweep computes them once
    /// and hands them to [`DensityHierarchy::build_precomputed`].
    pub fn distances(&self, features: &FeatureMatrix) -> DistanceMatrix {
        DistanceMatrix::from_features(features, &self.metric)
    }

    /// Build the run for `param` from raw distances.
    pub fn build_precomputed(&self, dist: &DistanceMatrix, param: usize) -> Result<HierarchyRun> {
        let fit = Hdbscan::new(param)
            .with_min_samples(self.min_samples.unwrap_or(param))
            .fit(dist)
            .map_err(|e| Error::UpstreamClustering {
                param,
                reason: e.to_string(),
            })?;

        Ok(HierarchyRun {
            param,
            tree: fit.tree,
            labels: fit.labels,
            probabilities: fit.probabilities,
        })
    }
}

impl Default for DensityHierarchy<MetricKind> {
    fn default() -> Self {
        Self::new(MetricKind::default())
    }
}

impl<M: Distance> HierarchyBuilder for DensityHierarchy<M> {
    fn build(&self, features: &FeatureMatrix, param: usize) -> Result<HierarchyRun> {
        self.build_precomputed(&self.distances(features), param)
    }
}
