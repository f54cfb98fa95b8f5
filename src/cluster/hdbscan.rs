//! HDBSCAN over a precomputed distance matrix.
//!
//! # The Algorithm (Campello, Moulavi & Sander, 2013)
//!
//! HDBSCAN turns DBSCAN's single density threshold into a hierarchy over
//! *all* thresholds, then keeps the clusters that persist the longest.
//!
//! 1. **Mutual reachability**: smooth distances by local density
//!    (`min_samples` neighbours, see [`super::mutual_reachability`]).
//! 2. **Single linkage** over the smoothed matrix ([`Dendrogram`]).
//! 3. **Condense**: walk the tree top-down at `λ = 1/distance`. A split
//!    where both sides hold at least `min_cluster_size` points creates two
//!    child clusters; otherwise the small side's points "fall out" of the
//!    parent at that λ and the parent carries on.
//! 4. **Excess of mass**: a cluster's stability is
//!    `Σ_{p ∈ C} (λ_p − λ_birth(C))`. Bottom-up, keep a cluster if it is
//!    more stable than its children combined, otherwise pass the children's
//!    stability upward.
//! 5. **Label**: points fall into the selected cluster above them, or `-1`.
//!
//! The root is eligible for selection only with `allow_single_cluster`, so a
//! data set that is one coherent blob can still come back as one cluster.
//!
//! ## Differences from scikit-learn
//!
//! `min_samples` counts neighbours *excluding* the point itself, matching
//! the core-distance definition used throughout this crate. Zero distances
//! map to a large finite λ rather than infinity so stabilities stay finite.
//!
//! # References
//!
//! - Campello, Moulavi & Sander (2013). "Density-Based Clustering Based on
//!   Hierarchical Density Estimates." PAKDD.
//! - McInnes & Healy (2017). "Accelerated Hierarchical Density Based
//!   Clustering." ICDMW.

use super::mutual_reachability::mutual_reachability_from;
use super::traits::DensityClustering;
use crate::data::DistanceMatrix;
use crate::error::{Error, Result};
use crate::hierarchy::{Dendrogram, Merge};
use std::collections::{HashMap, VecDeque};

/// Label assigned to points that belong to no cluster.
pub const NOISE: i32 = -1;

/// λ used for zero-distance merges.
const MAX_LAMBDA: f64 = 1e12;

/// HDBSCAN clustering on precomputed distances.
#[derive(Debug, Clone)]
pub struct Hdbscan {
    /// Smallest group that counts as a cluster.
    min_cluster_size: usize,
    /// Neighbours used for core distances (self excluded).
    min_samples: usize,
    /// Whether the root may be returned as the only cluster.
    allow_single_cluster: bool,
}

/// Result of one HDBSCAN fit.
#[derive(Debug, Clone)]
pub struct HdbscanFit {
    /// Single-linkage merge sequence over mutual reachability distances.
    pub tree: Dendrogram,
    /// Cluster label per point, [`NOISE`] for unassigned points.
    pub labels: Vec<i32>,
    /// Membership strength per point in [0, 1]; 0 for noise.
    pub probabilities: Vec<f64>,
}

/// One edge of the condensed tree: `child` (a point or a cluster) leaves
/// `parent` at `lambda`.
#[derive(Debug, Clone, Copy)]
struct CondensedEdge {
    parent: usize,
    child: usize,
    lambda: f64,
    size: usize,
}

impl Hdbscan {
    /// Create a clusterer; `min_samples` defaults to `min_cluster_size`.
    pub fn new(min_cluster_size: usize) -> Self {
        Self {
            min_cluster_size,
            min_samples: min_cluster_size,
            allow_single_cluster: false,
        }
    }

    /// Set the core-distance neighbourhood size.
    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples;
        self
    }

    /// Allow the whole data set to be returned as a single cluster.
    pub fn with_allow_single_cluster(mut self, allow: bool) -> Self {
        self.allow_single_cluster = allow;
        self
    }

    /// Minimum cluster size.
    pub fn min_cluster_size(&self) -> usize {
        self.min_cluster_size
    }

    /// Fit on a precomputed distance matrix.
    pub fn fit(&self, dist: &DistanceMatrix) -> Result<HdbscanFit> {
        let n = dist.n();
        if self.min_cluster_size < 2 {
            return Err(Error::invalid(format!(
                "min_cluster_size must be at least 2, got {}",
                self.min_cluster_size
            )));
        }
        if self.min_cluster_size > n {
            return Err(Error::invalid(format!(
                "min_cluster_size {} exceeds the {n} available samples",
                self.min_cluster_size
            )));
        }

        let mreach = mutual_reachability_from(dist, self.min_samples)?;
        let tree = Dendrogram::single_linkage(&mreach);
        let merges: Vec<Merge> = tree.merges().copied().collect();

        let condensed = self.condense(&merges, n);
        let selected = self.select_clusters(&condensed, n);
        let (labels, probabilities) = self.label_points(&condensed, &selected, n);

        Ok(HdbscanFit {
            tree,
            labels,
            probabilities,
        })
    }

    fn condense(&self, merges: &[Merge], n: usize) -> Vec<CondensedEdge> {
        let root = 2 * n - 2;
        let size_of = |id: usize| if id < n { 1 } else { merges[id - n].size };

        let mut relabel = vec![0usize; 2 * n - 1];
        relabel[root] = n;
        let mut next_label = n + 1;
        let mut ignore = vec![false; 2 * n - 1];
        let mut edges = Vec::with_capacity(2 * n);

        for node in descendants(merges, n, root) {
            if ignore[node] || node < n {
                continue;
            }
            let merge = &merges[node - n];
            let (left, right) = (merge.cluster_a, merge.cluster_b);
            let lambda = lambda_of(merge.distance);
            let parent = relabel[node];

            let left_size = size_of(left);
            let right_size = size_of(right);
            let left_big = left_size >= self.min_cluster_size;
            let right_big = right_size >= self.min_cluster_size;

            let mut fall_out = |sub: usize, edges: &mut Vec<CondensedEdge>| {
                for d in descendants(merges, n, sub) {
                    if d < n {
                        edges.push(CondensedEdge {
                            parent,
                            child: d,
                            lambda,
                            size: 1,
                        });
                    }
                    ignore[d] = true;
                }
            };

            match (left_big, right_big) {
                (true, true) => {
                    for (child, size) in [(left, left_size), (right, right_size)] {
                        relabel[child] = next_label;
                        edges.push(CondensedEdge {
                            parent,
                            child: next_label,
                            lambda,
                            size,
                        });
                        next_label += 1;
                    }
                }
                (true, false) => {
                    relabel[left] = parent;
                    fall_out(right, &mut edges);
                }
                (false, true) => {
                    relabel[right] = parent;
                    fall_out(left, &mut edges);
                }
                (false, false) => {
                    fall_out(left, &mut edges);
                    fall_out(right, &mut edges);
                }
            }
        }
        edges
    }

    /// Excess-of-mass selection. Returns selected cluster ids, ascending.
    fn select_clusters(&self, condensed: &[CondensedEdge], n: usize) -> Vec<usize> {
        let n_clusters = condensed
            .iter()
            .map(|e| e.parent.max(e.child))
            .filter(|&id| id >= n)
            .max()
            .map_or(1, |max_id| max_id - n + 1);

        let mut birth = vec![0.0; n_clusters];
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); n_clusters];
        for e in condensed.iter().filter(|e| e.child >= n) {
            birth[e.child - n] = e.lambda;
            children[e.parent - n].push(e.child - n);
        }

        let mut stability = vec![0.0; n_clusters];
        for e in condensed {
            let c = e.parent - n;
            stability[c] += (e.lambda - birth[c]) * e.size as f64;
        }

        let mut is_cluster = vec![true; n_clusters];
        if !self.allow_single_cluster {
            is_cluster[0] = false;
        }
        let first = if self.allow_single_cluster { 0 } else { 1 };

        // Children always carry larger ids than their parent.
        for c in (first..n_clusters).rev() {
            let child_sum: f64 = children[c].iter().map(|&ch| stability[ch]).sum();
            if child_sum > stability[c] {
                is_cluster[c] = false;
                stability[c] = child_sum;
            } else {
                let mut queue: VecDeque<usize> = children[c].iter().copied().collect();
                while let Some(d) = queue.pop_front() {
                    is_cluster[d] = false;
                    queue.extend(children[d].iter().copied());
                }
            }
        }

        (0..n_clusters)
            .filter(|&c| is_cluster[c])
            .map(|c| c + n)
            .collect()
    }

    fn label_points(
        &self,
        condensed: &[CondensedEdge],
        selected: &[usize],
        n: usize,
    ) -> (Vec<i32>, Vec<f64>) {
        let root = n;
        let mut parent_of = HashMap::new();
        for e in condensed.iter().filter(|e| e.child >= n) {
            parent_of.insert(e.child, e.parent);
        }
        let root_max_lambda = condensed
            .iter()
            .filter(|e| e.parent == root)
            .map(|e| e.lambda)
            .fold(0.0, f64::max);

        let mut labels = vec![NOISE; n];
        let mut lambdas = vec![0.0; n];

        for e in condensed.iter().filter(|e| e.child < n) {
            let mut c = e.parent;
            let found = loop {
                if let Ok(pos) = selected.binary_search(&c) {
                    break Some(pos);
                }
                match parent_of.get(&c) {
                    Some(&p) => c = p,
                    None => break None,
                }
            };

            if let Some(pos) = found {
                if c == root && e.lambda < root_max_lambda {
                    continue;
                }
                labels[e.child] = pos as i32;
                lambdas[e.child] = e.lambda;
            }
        }

        let mut max_lambda = vec![0.0f64; selected.len()];
        for (i, &l) in labels.iter().enumerate() {
            if l != NOISE {
                let slot = &mut max_lambda[l as usize];
                *slot = slot.max(lambdas[i]);
            }
        }
        let probabilities = labels
            .iter()
            .zip(lambdas.iter())
            .map(|(&l, &lambda)| {
                if l == NOISE {
                    0.0
                } else {
                    let max = max_lambda[l as usize];
                    if max > 0.0 {
                        (lambda.min(max) / max).clamp(0.0, 1.0)
                    } else {
                        1.0
                    }
                }
            })
            .collect();

        (labels, probabilities)
    }
}

impl DensityClustering for Hdbscan {
    fn fit_precomputed(&self, dist: &DistanceMatrix) -> Result<Vec<i32>> {
        Ok(self.fit(dist)?.labels)
    }
}

fn lambda_of(distance: f64) -> f64 {
    if distance > 0.0 {
        (1.0 / distance).min(MAX_LAMBDA)
    } else {
        MAX_LAMBDA
    }
}

/// `node` and every node below it in breadth-first order.
fn descendants(merges: &[Merge], n: usize, node: usize) -> Vec<usize> {
    let mut out = Vec::new();
    let mut queue = VecDeque::from([node]);
    while let Some(id) = queue.pop_front() {
        out.push(id);
        if id >= n {
            let m = &merges[id - n];
            queue.push_back(m.cluster_a);
            queue.push_back(m.cluster_b);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FeatureMatrix;
    use crate::distance::MetricKind;
    use ndarray::Array2;
    use std::collections::HashSet;

    fn two_blobs_and_outlier() -> DistanceMatrix {
        let fm = FeatureMatrix::from_rows(&[
            vec![1.5, 2.2],
            vec![1.0, 1.1],
            vec![1.2, 1.4],
            vec![0.8, 1.0],
            vec![1.1, 1.0],
            vec![3.7, 4.0],
            vec![3.9, 3.9],
            vec![3.6, 4.1],
            vec![3.8, 3.9],
            vec![4.0, 4.1],
            vec![10.0, 10.0],
        ])
        .unwrap();
        DistanceMatrix::from_features(&fm, &MetricKind::Euclidean)
    }

    #[test]
    fn test_two_clusters_and_noise() {
        let fit = Hdbscan::new(5).with_min_samples(4).fit(&two_blobs_and_outlier()).unwrap();
        let labels = &fit.labels;

        assert_eq!(1, labels[..5].iter().collect::<HashSet<_>>().len());
        assert_eq!(1, labels[5..10].iter().collect::<HashSet<_>>().len());
        assert_ne!(labels[0], labels[5]);
        assert_ne!(labels[0], NOISE);
        assert_ne!(labels[5], NOISE);
        assert_eq!(NOISE, labels[10]);

        assert_eq!(fit.probabilities[10], 0.0);
        assert!(fit.probabilities[..10].iter().all(|&p| p > 0.0 && p <= 1.0));
        assert_eq!(fit.tree.n_merges(), 10);
    }

    #[test]
    fn test_identical_points_single_cluster() {
        let dist = DistanceMatrix::from_array(Array2::zeros((5, 5))).unwrap();

        let fit = Hdbscan::new(2)
            .with_min_samples(1)
            .with_allow_single_cluster(true)
            .fit(&dist)
            .unwrap();
        assert_eq!(fit.labels, vec![0; 5]);
        assert!(fit.probabilities.iter().all(|&p| p == 1.0));
    }

    #[test]
    fn test_block_structure() {
        // Two tight groups of three, far apart.
        let mut d = Array2::from_elem((6, 6), 0.9);
        for i in 0..6 {
            for j in 0..6 {
                if i == j {
                    d[[i, j]] = 0.0;
                } else if (i < 3) == (j < 3) {
                    d[[i, j]] = 0.01;
                }
            }
        }
        let dist = DistanceMatrix::from_array(d).unwrap();
        let labels = Hdbscan::new(2)
            .with_min_samples(1)
            .with_allow_single_cluster(true)
            .fit_precomputed(&dist)
            .unwrap();

        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[1], labels[2]);
        assert_eq!(labels[3], labels[4]);
        assert_eq!(labels[4], labels[5]);
        assert_ne!(labels[0], labels[3]);
        assert!(labels.iter().all(|&l| l != NOISE));
    }

    #[test]
    fn test_invalid_parameters() {
        let dist = two_blobs_and_outlier();
        assert!(matches!(Hdbscan::new(1).fit(&dist), Err(Error::InvalidInput(_))));
        assert!(matches!(Hdbscan::new(12).fit(&dist), Err(Error::InvalidInput(_))));
        assert!(Hdbscan::new(3).with_min_samples(0).fit(&dist).is_err());
    }
}
