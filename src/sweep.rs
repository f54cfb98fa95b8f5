//! Parameter sweeps.
//!
//! A sweep runs the hierarchy builder once per parameter value in
//! `min, min + step, …, ≤ max`. Runs are independent, so with the `parallel`
//! feature they execute on the rayon pool; results are always returned in
//! increasing parameter order.
//!
//! A run that fails with [`Error::UpstreamClustering`] is logged and
//! skipped. Any other error is a contract violation and aborts the sweep.

use crate::cluster::{DensityHierarchy, HierarchyBuilder, HierarchyRun};
use crate::data::{DistanceMatrix, FeatureMatrix};
use crate::distance::{Distance, MetricKind};
use crate::error::{Error, Result};
use crate::hierarchy::Dendrogram;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Sweep specification: `{min, max, step, metric}`.
///
/// `min_samples` is optional and pins the core neighbourhood size; when
/// absent the swept value drives both knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// First parameter value.
    pub min: usize,
    /// Last parameter value, inclusive.
    pub max: usize,
    /// Increment between values; must be positive.
    pub step: usize,
    /// Metric for raw distances.
    pub metric: MetricKind,
    /// Fixed core neighbourhood size, if decoupled from the swept value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_samples: Option<usize>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            min: 2,
            max: 10,
            step: 1,
            metric: MetricKind::Euclidean,
            min_samples: None,
        }
    }
}

impl SweepConfig {
    /// Create a sweep over `min..=max` with unit step.
    pub fn new(min: usize, max: usize) -> Self {
        Self {
            min,
            max,
            ..Self::default()
        }
    }

    /// Set the step.
    pub fn with_step(mut self, step: usize) -> Self {
        self.step = step;
        self
    }

    /// Set the metric.
    pub fn with_metric(mut self, metric: MetricKind) -> Self {
        self.metric = metric;
        self
    }

    /// Pin the core neighbourhood size.
    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = Some(min_samples);
        self
    }

    /// Parameter values in sweep order. Empty when `max < min`.
    pub fn params(&self) -> Result<Vec<usize>> {
        if self.step == 0 {
            return Err(Error::invalid("sweep step must be a positive integer"));
        }
        if self.max < self.min {
            return Ok(Vec::new());
        }
        Ok((self.min..=self.max).step_by(self.step).collect())
    }

    /// The default hierarchy builder for this configuration.
    pub fn builder(&self) -> DensityHierarchy {
        DensityHierarchy::new(self.metric).with_min_samples(self.min_samples)
    }
}

/// One parameter value and what building its hierarchy produced.
#[derive(Debug, Clone)]
pub struct ParameterRun {
    /// Swept value.
    pub param: usize,
    /// The run, or why it failed.
    pub outcome: Result<HierarchyRun>,
}

/// Successful runs keyed by parameter, plus the skipped ones.
#[derive(Debug, Clone, Default)]
pub struct SweepOutcome {
    /// Successful runs in increasing parameter order.
    pub runs: BTreeMap<usize, HierarchyRun>,
    /// Skipped parameter values with their failure, in sweep order.
    pub skipped: Vec<(usize, Error)>,
}

impl SweepOutcome {
    /// `(param, tree)` pairs in increasing parameter order.
    pub fn trees(&self) -> impl Iterator<Item = (usize, &Dendrogram)> {
        self.runs.iter().map(|(&param, run)| (param, &run.tree))
    }

    /// Swept values that produced a hierarchy.
    pub fn params(&self) -> Vec<usize> {
        self.runs.keys().copied().collect()
    }

    /// True if no run succeeded.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// Sweep with the default [`DensityHierarchy`] builder.
pub fn run_sweep(features: &FeatureMatrix, config: &SweepConfig) -> Result<SweepOutcome> {
    run_density_sweep(features, config, &config.builder())
}

/// Sweep a [`DensityHierarchy`], computing raw distances once for all runs.
///
/// `builder`'s own metric is used; `config.metric` only matters to
/// [`SweepConfig::builder`].
pub fn run_density_sweep<M>(
    features: &FeatureMatrix,
    config: &SweepConfig,
    builder: &DensityHierarchy<M>,
) -> Result<SweepOutcome>
where
    M: Distance + Sync,
{
    let dist = builder.distances(features);
    log::debug!("computed {n}x{n} raw distances", n = dist.n());
    run_sweep_with(features, config, &Precomputed { builder, dist: &dist })
}

/// Runs a [`DensityHierarchy`] against distances shared by the whole sweep.
struct Precomputed<'a, M> {
    builder: &'a DensityHierarchy<M>,
    dist: &'a DistanceMatrix,
}

impl<M: Distance> HierarchyBuilder for Precomputed<'_, M> {
    fn build(&self, _features: &FeatureMatrix, param: usize) -> Result<HierarchyRun> {
        self.builder.build_precomputed(self.dist, param)
    }
}

/// Sweep with a caller-supplied hierarchy builder.
pub fn run_sweep_with<B>(
    features: &FeatureMatrix,
    config: &SweepConfig,
    builder: &B,
) -> Result<SweepOutcome>
where
    B: HierarchyBuilder + Sync + ?Sized,
{
    let params = config.params()?;
    let attempted = params.len();

    let run_one = |&param: &usize| {
        log::debug!("building hierarchy for parameter {param}");
        ParameterRun {
            param,
            outcome: builder.build(features, param),
        }
    };

    #[cfg(feature = "parallel")]
    let runs: Vec<ParameterRun> = params.par_iter().map(run_one).collect();

    #[cfg(not(feature = "parallel"))]
    let runs: Vec<ParameterRun> = params.iter().map(run_one).collect();

    let mut outcome = SweepOutcome::default();
    for ParameterRun { param, outcome: result } in runs {
        match result {
            Ok(run) => {
                outcome.runs.insert(param, run);
            }
            Err(e @ Error::UpstreamClustering { .. }) => {
                log::warn!("skipping parameter {param}: {e}");
                outcome.skipped.push((param, e));
            }
            Err(e) => return Err(e),
        }
    }

    log::info!(
        "sweep finished: {attempted} attempted, {} succeeded, {} skipped",
        outcome.runs.len(),
        outcome.skipped.len()
    );
    Ok(outcome)
}
