//! Mutual reachability distances.
//!
//! Raw distances are smoothed by local density so that single linkage over
//! the result becomes sensitive to the neighbourhood parameter `k`:
//!
//! ```text
//! core_k(i)      = distance from i to its k-th nearest neighbour (self excluded)
//! mreach_k(i, j) = max(core_k(i), core_k(j), d(i, j))     for i ≠ j
//! mreach_k(i, i) = 0
//! ```
//!
//! Points in sparse regions get large core distances and are pushed away
//! from everything; dense regions are left untouched. Single linkage over
//! `mreach_k` is the hierarchy HDBSCAN condenses.
//!
//! # References
//!
//! Campello, Moulavi & Sander (2013). "Density-Based Clustering Based on
//! Hierarchical Density Estimates." PAKDD.

use crate::data::{DistanceMatrix, FeatureMatrix};
use crate::distance::Distance;
use crate::error::{Error, Result};
use ndarray::Array2;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Mutual reachability matrix of `features` for neighbourhood size `k`.
///
/// `k` larger than the number of other points is clamped to `n − 1`.
/// Fails with [`Error::InvalidInput`] if `k == 0`.
pub fn mutual_reachability<M: Distance + ?Sized>(
    features: &FeatureMatrix,
    k: usize,
    metric: &M,
) -> Result<DistanceMatrix> {
    let dist = DistanceMatrix::from_features(features, metric);
    mutual_reachability_from(&dist, k)
}

/// Mutual reachability over an existing distance matrix.
pub fn mutual_reachability_from(dist: &DistanceMatrix, k: usize) -> Result<DistanceMatrix> {
    let n = dist.n();
    let core = core_distances(dist, k)?;

    let mut data = Array2::zeros((n, n));
    for i in 0..n {
        for j in (i + 1)..n {
            let v = core[i].max(core[j]).max(dist.get(i, j));
            data[[i, j]] = v;
            data[[j, i]] = v;
        }
    }
    // Zero diagonal is exact: it is never written.
    Ok(DistanceMatrix::from_array_unchecked(data))
}

/// Distance from each point to its `k`-th nearest other point.
///
/// Ties do not matter: the k-th order statistic of a row is the same value
/// whichever tied neighbour occupies that rank.
pub fn core_distances(dist: &DistanceMatrix, k: usize) -> Result<Vec<f64>> {
    let n = dist.n();
    if k == 0 {
        return Err(Error::invalid("neighbourhood size k must be at least 1"));
    }
    if n < 2 {
        return Err(Error::invalid(format!(
            "core distances need at least 2 points, got {n}"
        )));
    }
    let k = k.min(n - 1);

    let core_of = |i: usize| -> f64 {
        let mut others: Vec<f64> = dist
            .row(i)
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(_, &d)| d)
            .collect();
        let (_, kth, _) = others.select_nth_unstable_by(k - 1, |a, b| a.total_cmp(b));
        *kth
    };

    #[cfg(feature = "parallel")]
    let core = (0..n).into_par_iter().map(core_of).collect();

    #[cfg(not(feature = "parallel"))]
    let core = (0..n).map(core_of).collect();

    Ok(core)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::MetricKind;
    use proptest::prelude::*;

    fn line() -> FeatureMatrix {
        FeatureMatrix::from_rows(&[vec![0.0], vec![1.0], vec![3.0], vec![7.0]]).unwrap()
    }

    #[test]
    fn test_core_distances() {
        let dm = DistanceMatrix::from_features(&line(), &MetricKind::Euclidean);
        assert_eq!(core_distances(&dm, 1).unwrap(), vec![1.0, 1.0, 2.0, 4.0]);
        assert_eq!(core_distances(&dm, 2).unwrap(), vec![3.0, 2.0, 3.0, 6.0]);
    }

    #[test]
    fn test_k_is_clamped() {
        let dm = DistanceMatrix::from_features(&line(), &MetricKind::Euclidean);
        assert_eq!(
            core_distances(&dm, 50).unwrap(),
            core_distances(&dm, 3).unwrap()
        );
    }

    #[test]
    fn test_k_zero_rejected() {
        assert!(matches!(
            mutual_reachability(&line(), 0, &MetricKind::Euclidean),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_known_matrix() {
        let mr = mutual_reachability(&line(), 2, &MetricKind::Euclidean).unwrap();
        // core = [3, 2, 3, 6]
        assert_eq!(mr.get(0, 1), 3.0);
        assert_eq!(mr.get(1, 2), 3.0);
        assert_eq!(mr.get(0, 3), 7.0);
        assert_eq!(mr.get(2, 3), 6.0);
        for i in 0..4 {
            assert_eq!(mr.get(i, i), 0.0);
        }
    }

    proptest! {
        #[test]
        fn mutual_reachability_invariants(
            rows in proptest::collection::vec(proptest::collection::vec(-50.0f64..50.0, 2), 2..30),
            k in 1usize..40,
        ) {
            let fm = FeatureMatrix::from_rows(&rows).unwrap();
            let raw = DistanceMatrix::from_features(&fm, &MetricKind::Euclidean);
            let mr = mutual_reachability_from(&raw, k).unwrap();
            let core = core_distances(&raw, k).unwrap();
            let n = mr.n();

            for i in 0..n {
                prop_assert_eq!(mr.get(i, i), 0.0);
                let mut row_max = 0.0f64;
                for j in 0..n {
                    prop_assert_eq!(mr.get(i, j), mr.get(j, i));
                    if i != j {
                        prop_assert!(mr.get(i, j) >= raw.get(i, j));
                        row_max = row_max.max(mr.get(i, j));
                    }
                }
                prop_assert!(core[i] <= row_max);
            }
        }
    }
}
