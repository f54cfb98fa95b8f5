//! End-to-end HAI analysis and its wire form.
//!
//! ```text
//! features ─► run_sweep ─► assemble ─► MetaClusterer ─► medoids ─► HaiAnalysis
//! ```
//!
//! [`HaiAnalysis`] serialises to
//! `{hai_matrix, meta_labels, meta_dendrogram, medoids, ordered_param_values}`.
//! `medoids` maps each meta-cluster label to the parameter value of its
//! representative run, not to a row index. `meta_dendrogram` is a list of
//! `[a, b, distance, size]` merge rows over the runs.

use crate::data::FeatureMatrix;
use crate::error::Result;
use crate::hai::{assemble, medoids, MetaClusterer};
use crate::sweep::{run_sweep, SweepConfig, SweepOutcome};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Result of one analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HaiAnalysis {
    /// Pairwise agreement, rows in `ordered_param_values` order.
    pub hai_matrix: Vec<Vec<f64>>,
    /// Meta-cluster label per run, `-1` for unassigned.
    pub meta_labels: Vec<i32>,
    /// Single-linkage merges over the runs.
    pub meta_dendrogram: Vec<[f64; 4]>,
    /// Meta-cluster label to representative parameter value.
    pub medoids: BTreeMap<i32, usize>,
    /// Parameter value of each row.
    pub ordered_param_values: Vec<usize>,
}

impl HaiAnalysis {
    /// Number of distinct non-noise meta-clusters.
    pub fn n_meta_clusters(&self) -> usize {
        self.medoids.len()
    }
}

/// Either an analysis or an explicit failure, as sent on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisOutcome {
    /// Successful analysis.
    Analysis(HaiAnalysis),
    /// `{"error": "..."}`.
    Failure {
        /// Human-readable reason.
        error: String,
    },
}

impl From<Result<HaiAnalysis>> for AnalysisOutcome {
    fn from(result: Result<HaiAnalysis>) -> Self {
        match result {
            Ok(analysis) => AnalysisOutcome::Analysis(analysis),
            Err(e) => AnalysisOutcome::Failure {
                error: e.to_string(),
            },
        }
    }
}

/// Analyse the successful runs of a sweep.
///
/// Fails with [`crate::Error::NoValidHierarchies`] if the sweep produced
/// nothing.
pub fn analyze(outcome: &SweepOutcome) -> Result<HaiAnalysis> {
    let (hai, params) = assemble(outcome.trees())?;
    let meta = MetaClusterer::default().cluster(&hai)?;

    let medoids: BTreeMap<i32, usize> = medoids(&hai, &meta.labels)
        .into_iter()
        .map(|(label, idx)| (label, params[idx]))
        .collect();

    log::info!(
        "HAI analysis: {} runs, {} meta-clusters, {} distinct agreement values",
        params.len(),
        medoids.len(),
        hai.n_unique()
    );

    Ok(HaiAnalysis {
        hai_matrix: hai.to_rows(),
        meta_labels: meta.labels,
        meta_dendrogram: meta.merges.linkage_rows(),
        medoids,
        ordered_param_values: params,
    })
}

/// Sweep `features` and analyse the result.
pub fn run_analysis(features: &FeatureMatrix, config: &SweepConfig) -> Result<HaiAnalysis> {
    let outcome = run_sweep(features, config)?;
    analyze(&outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_failure_wire_form() {
        let out = AnalysisOutcome::from(Err(Error::NoValidHierarchies));
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 1);
        assert!(json["error"].as_str().unwrap().contains("no valid hierarchies"));
    }

    #[test]
    fn test_empty_sweep_is_no_valid_hierarchies() {
        assert_eq!(analyze(&SweepOutcome::default()), Err(Error::NoValidHierarchies));
    }

    #[test]
    fn test_analysis_wire_form() {
        let analysis = HaiAnalysis {
            hai_matrix: vec![vec![1.0, 0.5], vec![0.5, 1.0]],
            meta_labels: vec![0, 0],
            meta_dendrogram: vec![[0.0, 1.0, 0.5, 2.0]],
            medoids: BTreeMap::from([(0, 4)]),
            ordered_param_values: vec![4, 6],
        };
        let json = serde_json::to_value(AnalysisOutcome::Analysis(analysis.clone())).unwrap();
        assert_eq!(json["medoids"]["0"], 4);
        assert_eq!(json["ordered_param_values"][1], 6);
        assert_eq!(json["meta_dendrogram"][0][3], 2.0);

        let back: HaiAnalysis = serde_json::from_value(json).unwrap();
        assert_eq!(back, analysis);
    }
}
