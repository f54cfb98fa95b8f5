//! Hierarchy scale matrices.
//!
//! For a hierarchy over `n` samples, `scale(i, j)` is the size of the
//! smallest cluster containing both `i` and `j`, divided by `n`; the
//! diagonal is `1/n`. It is the cophenetic matrix with merge *sizes* in place
//! of merge heights, so two hierarchies built on the same samples become
//! directly comparable cell by cell regardless of their distance scales.
//!
//! ```text
//!        6 (size 4)              0     1     2     3
//!       / \                0  [ .25   .50  1.0   1.0 ]
//!      4   5 (size 2)      1  [ .50   .25  1.0   1.0 ]
//!     / \ / \              2  [ 1.0   1.0  .25   .50 ]
//!    0  1 2  3             3  [ 1.0   1.0  .50   .25 ]
//! ```

use super::Dendrogram;
use crate::error::{Error, Result};
use ndarray::{Array2, ArrayView2};

/// Pairwise co-membership scale of one hierarchy. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleMatrix {
    data: Array2<f64>,
}

impl ScaleMatrix {
    /// Build the scale matrix of a merge sequence over `n` samples.
    ///
    /// Merges are consumed strictly in the given order; only the recorded
    /// sizes are used, never the merge distances. A sequence with decreasing
    /// distances still yields a well-defined matrix and is reported with a
    /// warning.
    ///
    /// Each unordered pair of leaves is written exactly once, at the merge
    /// where the two first become co-members, so the whole build is O(n²).
    pub fn from_dendrogram(dendro: &Dendrogram, n: usize) -> Result<Self> {
        if dendro.n_items() != n {
            return Err(Error::invalid(format!(
                "merge sequence spans {} items, expected {n}",
                dendro.n_items()
            )));
        }
        dendro.validate()?;
        if !dendro.is_monotonic() {
            log::warn!("merge sequence over {n} items has decreasing merge distances; scale follows merge order");
        }

        let n_f = n as f64;
        let mut data = Array2::zeros((n, n));

        // Arena keyed by cluster id; retired entries are taken and never touched again.
        let mut members: Vec<Option<Vec<usize>>> = (0..n).map(|i| Some(vec![i])).collect();
        members.resize(2 * n - 1, None);

        for (i, merge) in dendro.merges().enumerate() {
            // `validate` guarantees both ids are live.
            let a = members[merge.cluster_a].take().unwrap_or_default();
            let b = members[merge.cluster_b].take().unwrap_or_default();

            let s = merge.size as f64 / n_f;
            for &p in &a {
                for &q in &b {
                    data[[p, q]] = s;
                    data[[q, p]] = s;
                }
            }

            let mut joined = a;
            joined.extend(b);
            members[n + i] = Some(joined);
        }

        data.diag_mut().fill(1.0 / n_f);
        Ok(Self { data })
    }

    /// Number of samples.
    pub fn n(&self) -> usize {
        self.data.nrows()
    }

    /// Shape as (rows, cols).
    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Scale of the pair `(i, j)`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[[i, j]]
    }

    /// Underlying array.
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }
}
