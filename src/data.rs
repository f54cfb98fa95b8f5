//! Input and distance matrices.
//!
//! [`FeatureMatrix`] is the read-only input of a whole analysis: `n` samples
//! by `d` numeric attributes, `n ≥ 2` and `d ≥ 1`. [`DistanceMatrix`] is a
//! square, symmetric, non-negative matrix with an exact-zero diagonal; it is
//! what the hierarchy and density collaborators consume.

use crate::distance::Distance;
use crate::error::{Error, Result};
use ndarray::{Array2, ArrayView1, ArrayView2};

/// Tolerance used when validating symmetry of externally supplied matrices.
pub const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// `n` ordered samples by `d` numeric attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    data: Array2<f64>,
}

impl FeatureMatrix {
    /// Wrap an `n × d` array.
    ///
    /// Fails with [`Error::InvalidInput`] if there are fewer than two rows,
    /// no columns, or any non-finite value.
    pub fn from_array(data: Array2<f64>) -> Result<Self> {
        let (n, d) = data.dim();
        if d == 0 {
            return Err(Error::invalid("feature matrix has no numeric columns"));
        }
        if n < 2 {
            return Err(Error::invalid(format!(
                "feature matrix needs at least 2 samples, got {n}"
            )));
        }
        if let Some(((i, j), _)) = data.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(Error::invalid(format!(
                "non-finite value at row {i}, column {j}"
            )));
        }
        Ok(Self { data })
    }

    /// Build from row vectors, which must all have the same length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let n = rows.len();
        let d = rows.first().map_or(0, Vec::len);
        let mut flat = Vec::with_capacity(n * d);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != d {
                return Err(Error::invalid(format!(
                    "row {i} has {} columns, expected {d}",
                    row.len()
                )));
            }
            flat.extend_from_slice(row);
        }
        let data = Array2::from_shape_vec((n, d), flat).map_err(|e| Error::invalid(e.to_string()))?;
        Self::from_array(data)
    }

    /// Build from a table of text cells, keeping only numeric columns.
    ///
    /// A column participates when every one of its cells parses as a finite
    /// number. Ragged tables are rejected.
    pub fn from_records<S: AsRef<str>>(records: &[Vec<S>]) -> Result<Self> {
        let width = records.first().map_or(0, Vec::len);
        if let Some(i) = records.iter().position(|r| r.len() != width) {
            return Err(Error::invalid(format!(
                "record {i} has {} cells, expected {width}",
                records[i].len()
            )));
        }

        let numeric: Vec<usize> = (0..width)
            .filter(|&c| {
                records.iter().all(|r| {
                    r[c].as_ref()
                        .trim()
                        .parse::<f64>()
                        .map(f64::is_finite)
                        .unwrap_or(false)
                })
            })
            .collect();
        if numeric.is_empty() {
            return Err(Error::invalid("the table contains no numeric columns"));
        }

        let rows: Vec<Vec<f64>> = records
            .iter()
            .map(|r| {
                numeric
                    .iter()
                    .map(|&c| r[c].as_ref().trim().parse::<f64>().unwrap_or(f64::NAN))
                    .collect()
            })
            .collect();
        Self::from_rows(&rows)
    }

    /// Number of samples.
    pub fn n_samples(&self) -> usize {
        self.data.nrows()
    }

    /// Number of attributes.
    pub fn n_features(&self) -> usize {
        self.data.ncols()
    }

    /// Row `i`.
    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.data.row(i)
    }

    /// Underlying array.
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }
}

/// Symmetric `n × n` matrix of non-negative distances with zero diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    data: Array2<f64>,
}

impl DistanceMatrix {
    /// Pairwise distances between the rows of `features`.
    ///
    /// Each unordered pair is evaluated once and mirrored, so the result is
    /// exactly symmetric.
    pub fn from_features<M: Distance + ?Sized>(features: &FeatureMatrix, metric: &M) -> Self {
        let n = features.n_samples();
        let mut data = Array2::zeros((n, n));
        for i in 0..n {
            for j in (i + 1)..n {
                let d = metric.distance(features.row(i), features.row(j)).max(0.0);
                data[[i, j]] = d;
                data[[j, i]] = d;
            }
        }
        Self { data }
    }

    /// Validate and wrap a precomputed matrix.
    ///
    /// Requires a square, finite, non-negative matrix with an exact-zero
    /// diagonal that is symmetric within [`SYMMETRY_TOLERANCE`].
    pub fn from_array(data: Array2<f64>) -> Result<Self> {
        let (rows, cols) = data.dim();
        if rows != cols {
            return Err(Error::DimensionMismatch {
                expected: (rows, rows),
                found: (rows, cols),
            });
        }
        if rows == 0 {
            return Err(Error::invalid("distance matrix is empty"));
        }
        for ((i, j), &v) in data.indexed_iter() {
            if !v.is_finite() || v < 0.0 {
                return Err(Error::invalid(format!(
                    "distance ({i}, {j}) = {v} is not a finite non-negative value"
                )));
            }
            if i == j && v != 0.0 {
                return Err(Error::invalid(format!("diagonal entry {i} is {v}, expected 0")));
            }
            if j > i && (v - data[[j, i]]).abs() > SYMMETRY_TOLERANCE {
                return Err(Error::invalid(format!(
                    "distance matrix is not symmetric at ({i}, {j})"
                )));
            }
        }
        Ok(Self { data })
    }

    /// Construct without validation; callers guarantee the invariants.
    pub(crate) fn from_array_unchecked(data: Array2<f64>) -> Self {
        Self { data }
    }

    /// Number of points.
    pub fn n(&self) -> usize {
        self.data.nrows()
    }

    /// Distance between `i` and `j`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[[i, j]]
    }

    /// Row `i`.
    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.data.row(i)
    }

    /// Underlying array.
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    /// Upper triangle in row-major order (length n·(n−1)/2), the layout
    /// linkage routines expect.
    pub fn condensed(&self) -> Vec<f64> {
        let n = self.n();
        let mut out = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n.saturating_sub(1) {
            for j in (i + 1)..n {
                out.push(self.data[[i, j]]);
            }
        }
        out
    }

    /// Consume into the underlying array.
    pub fn into_inner(self) -> Array2<f64> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::MetricKind;
    use ndarray::array;
    use proptest::prelude::*;

    #[test]
    fn test_feature_matrix_rejects_degenerate_shapes() {
        assert!(matches!(
            FeatureMatrix::from_rows(&[vec![1.0, 2.0]]),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            FeatureMatrix::from_rows(&[vec![], vec![]]),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            FeatureMatrix::from_rows(&[vec![1.0, 2.0], vec![1.0]]),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            FeatureMatrix::from_rows(&[vec![1.0], vec![f64::NAN]]),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_from_records_keeps_numeric_columns() {
        let records = vec![
            vec!["a", "1.0", "x", "3"],
            vec!["b", "2.5", "4", "4"],
            vec!["c", "-1", "y", "5"],
        ];
        let fm = FeatureMatrix::from_records(&records).unwrap();
        assert_eq!(fm.n_samples(), 3);
        assert_eq!(fm.n_features(), 2);
        assert_eq!(fm.row(1).to_vec(), vec![2.5, 4.0]);
    }

    #[test]
    fn test_from_records_without_numbers() {
        let records = vec![vec!["a", "b"], vec!["c", "d"]];
        assert!(matches!(
            FeatureMatrix::from_records(&records),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_condensed_layout() {
        let fm = FeatureMatrix::from_rows(&[vec![0.0], vec![1.0], vec![3.0]]).unwrap();
        let dm = DistanceMatrix::from_features(&fm, &MetricKind::Euclidean);
        assert_eq!(dm.condensed(), vec![1.0, 3.0, 2.0]);
    }

    #[test]
    fn test_from_array_validation() {
        assert!(DistanceMatrix::from_array(array![[0.0, 1.0], [1.0, 0.0]]).is_ok());
        assert!(matches!(
            DistanceMatrix::from_array(array![[0.1, 1.0], [1.0, 0.0]]),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            DistanceMatrix::from_array(array![[0.0, 1.0], [2.0, 0.0]]),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            DistanceMatrix::from_array(Array2::zeros((2, 3))),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    proptest! {
        #[test]
        fn pairwise_matrix_is_valid(
            rows in proptest::collection::vec(proptest::collection::vec(-100.0f64..100.0, 3), 2..25),
        ) {
            let fm = FeatureMatrix::from_rows(&rows).unwrap();
            for metric in [MetricKind::Euclidean, MetricKind::Manhattan, MetricKind::Angular] {
                let dm = DistanceMatrix::from_features(&fm, &metric);
                prop_assert!(DistanceMatrix::from_array(dm.view().to_owned()).is_ok());
            }
        }
    }
}
