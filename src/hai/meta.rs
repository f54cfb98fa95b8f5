use super::HaiMatrix;
use crate::cluster::{DensityClustering, Hdbscan, NOISE};
use crate::data::DistanceMatrix;
use crate::error::Result;
use crate::hierarchy::Dendrogram;

/// Grouping of runs by the similarity of their hierarchies.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaClustering {
    /// Meta-cluster label per run, `-1` for unassigned.
    pub labels: Vec<i32>,
    /// Single-linkage merge sequence over the runs, for display.
    pub merges: Dendrogram,
}

/// Clusters runs on `1 − HAI` distances.
///
/// The default collaborator is [`Hdbscan`] with `min_cluster_size = 2`, one
/// neighbour for core distances and single-cluster results allowed, so a
/// sweep that agrees with itself everywhere collapses into one meta-cluster.
#[derive(Debug, Clone)]
pub struct MetaClusterer<C = Hdbscan> {
    clusterer: C,
}

impl Default for MetaClusterer<Hdbscan> {
    fn default() -> Self {
        Self::new(
            Hdbscan::new(2)
                .with_min_samples(1)
                .with_allow_single_cluster(true),
        )
    }
}

impl<C: DensityClustering> MetaClusterer<C> {
    /// Use `clusterer` for label assignment.
    pub fn new(clusterer: C) -> Self {
        Self { clusterer }
    }

    /// Label runs and build their merge sequence.
    ///
    /// Fewer than two runs cannot form a meta-cluster: every run is labelled
    /// `-1` and the merge sequence is empty.
    pub fn cluster(&self, hai: &HaiMatrix) -> Result<MetaClustering> {
        let k = hai.len();
        if k < 2 {
            return Ok(MetaClustering {
                labels: vec![NOISE; k],
                merges: Dendrogram::new(k),
            });
        }

        let dist = DistanceMatrix::from_array(hai.to_distance())?;
        let labels = self.clusterer.fit_precomputed(&dist)?;
        let merges = Dendrogram::single_linkage(&dist);

        let n_meta = labels
            .iter()
            .filter(|&&l| l != NOISE)
            .max()
            .map_or(0, |&l| l + 1);
        log::debug!("meta-clustered {k} runs into {n_meta} groups");

        Ok(MetaClustering { labels, merges })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn test_all_agreeing_runs_form_one_cluster() {
        let hai = HaiMatrix::from_array(Array2::ones((5, 5))).unwrap();
        let meta = MetaClusterer::default().cluster(&hai).unwrap();
        assert_eq!(meta.labels, vec![0; 5]);
        assert_eq!(meta.merges.n_merges(), 4);
        assert!(meta.merges.distances().iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_two_regimes() {
        let mut m = Array2::from_elem((6, 6), 0.1);
        for i in 0..6 {
            for j in 0..6 {
                if (i < 3) == (j < 3) {
                    m[[i, j]] = if i == j { 1.0 } else { 0.99 };
                }
            }
        }
        let hai = HaiMatrix::from_array(m).unwrap();
        let meta = MetaClusterer::default().cluster(&hai).unwrap();

        let l = &meta.labels;
        assert!(l.iter().all(|&x| x != NOISE));
        assert!(l[..3].iter().all(|&x| x == l[0]));
        assert!(l[3..].iter().all(|&x| x == l[3]));
        assert_ne!(l[0], l[3]);

        let last = meta.merges.merges().last().copied().unwrap();
        assert!((last.distance - 0.9).abs() < 1e-12);
        assert_eq!(last.size, 6);
    }

    #[test]
    fn test_single_run_is_unassigned() {
        let hai = HaiMatrix::from_array(array![[1.0]]).unwrap();
        let meta = MetaClusterer::default().cluster(&hai).unwrap();
        assert_eq!(meta.labels, vec![NOISE]);
        assert_eq!(meta.merges.n_merges(), 0);
    }

    #[test]
    fn test_custom_collaborator() {
        struct Everyone;
        impl DensityClustering for Everyone {
            fn fit_precomputed(&self, dist: &DistanceMatrix) -> Result<Vec<i32>> {
                Ok(vec![7; dist.n()])
            }
        }
        let hai = HaiMatrix::from_array(array![[1.0, 0.2], [0.2, 1.0]]).unwrap();
        let meta = MetaClusterer::new(Everyone).cluster(&hai).unwrap();
        assert_eq!(meta.labels, vec![7, 7]);
        assert_eq!(meta.merges.n_merges(), 1);
    }
}
