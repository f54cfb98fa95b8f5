//! Merge sequences of agglomerative clustering.
//!
//! A dendrogram over `n` items is the ordered list of its `n − 1` binary
//! merges. Cluster labels follow the SciPy/MATLAB convention:
//! - leaves: `0..n`
//! - the cluster created by merge `i` gets id `n + i`

use crate::data::DistanceMatrix;
use crate::error::{Error, Result};
use kodama::{linkage as kodama_linkage, Method as KodamaMethod};
use serde::{Deserialize, Serialize};

/// A dendrogram representing hierarchical cluster merges.
///
/// Each merge combines two clusters into one, recording:
/// - Which clusters were merged
/// - The distance at which they merged
/// - The size of the resulting cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dendrogram {
    /// Merge history, in merge order.
    merges: Vec<Merge>,
    /// Number of original items.
    n_items: usize,
}

/// A single merge operation in the dendrogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Merge {
    /// First cluster being merged (index).
    pub cluster_a: usize,
    /// Second cluster being merged (index).
    pub cluster_b: usize,
    /// Distance/dissimilarity at which merge occurred.
    pub distance: f64,
    /// Size of resulting cluster.
    pub size: usize,
}

impl Dendrogram {
    /// Create a new dendrogram for n items.
    pub fn new(n_items: usize) -> Self {
        Self {
            merges: Vec::with_capacity(n_items.saturating_sub(1)),
            n_items,
        }
    }

    /// Record a merge operation.
    pub fn add_merge(&mut self, cluster_a: usize, cluster_b: usize, distance: f64, size: usize) {
        self.merges.push(Merge {
            cluster_a,
            cluster_b,
            distance,
            size,
        });
    }

    /// Single-linkage merge sequence over a distance matrix.
    ///
    /// Deterministic for a given matrix: kodama builds single linkage from a
    /// minimum spanning tree and emits merges in non-decreasing distance.
    pub fn single_linkage(dist: &DistanceMatrix) -> Self {
        let n = dist.n();
        let mut dendro = Dendrogram::new(n);
        if n < 2 {
            return dendro;
        }

        // Condensed dissimilarity matrix (upper triangle, row-major).
        // Length is N-choose-2.
        let mut condensed = dist.condensed();
        let dend = kodama_linkage(&mut condensed, n, KodamaMethod::Single);
        for step in dend.steps() {
            dendro.add_merge(step.cluster1, step.cluster2, step.dissimilarity, step.size);
        }
        dendro
    }

    /// Check that the merges form a binary tree spanning exactly `n` leaves.
    ///
    /// Every merge must reference two distinct, live clusters (a leaf or a
    /// cluster created by an earlier merge), and its recorded size must equal
    /// the sum of the merged clusters' sizes.
    pub fn validate(&self) -> Result<()> {
        let n = self.n_items;
        if n == 0 {
            return Err(Error::invalid("dendrogram has no items"));
        }
        if self.merges.len() != n - 1 {
            return Err(Error::invalid(format!(
                "dendrogram over {n} items has {} merges, expected {}",
                self.merges.len(),
                n - 1
            )));
        }

        // sizes[id] = Some(size) while the cluster is live.
        let mut sizes: Vec<Option<usize>> = vec![Some(1); n];
        sizes.resize(2 * n - 1, None);

        for (i, m) in self.merges.iter().enumerate() {
            if m.cluster_a == m.cluster_b {
                return Err(Error::invalid(format!(
                    "merge {i} joins cluster {} with itself",
                    m.cluster_a
                )));
            }
            let mut take = |id: usize| -> Result<usize> {
                if id >= n + i {
                    return Err(Error::invalid(format!(
                        "merge {i} references cluster {id} before it exists"
                    )));
                }
                sizes[id].take().ok_or_else(|| {
                    Error::invalid(format!("merge {i} reuses retired cluster {id}"))
                })
            };
            let combined = take(m.cluster_a)? + take(m.cluster_b)?;
            if combined != m.size {
                return Err(Error::invalid(format!(
                    "merge {i} records size {} but joins {combined} items",
                    m.size
                )));
            }
            sizes[n + i] = Some(m.size);
        }
        Ok(())
    }

    /// Whether merge distances never decrease along the sequence.
    pub fn is_monotonic(&self) -> bool {
        self.merges
            .windows(2)
            .all(|w| w[1].distance >= w[0].distance)
    }

    /// Number of original items.
    pub fn n_items(&self) -> usize {
        self.n_items
    }

    /// Number of merges recorded.
    pub fn n_merges(&self) -> usize {
        self.merges.len()
    }

    /// Iterate over merges.
    pub fn merges(&self) -> impl Iterator<Item = &Merge> {
        self.merges.iter()
    }

    /// Get the merge distances (for visualization).
    pub fn distances(&self) -> Vec<f64> {
        self.merges.iter().map(|m| m.distance).collect()
    }

    /// SciPy-style linkage rows: `[cluster_a, cluster_b, distance, size]`.
    pub fn linkage_rows(&self) -> Vec<[f64; 4]> {
        self.merges
            .iter()
            .map(|m| {
                [
                    m.cluster_a as f64,
                    m.cluster_b as f64,
                    m.distance,
                    m.size as f64,
                ]
            })
            .collect()
    }
}
