use super::hai_score;
use crate::data::SYMMETRY_TOLERANCE;
use crate::error::{Error, Result};
use crate::hierarchy::{Dendrogram, ScaleMatrix};
use ndarray::{Array2, ArrayView2};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Symmetric `k × k` agreement matrix over `k` runs, unit diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct HaiMatrix {
    data: Array2<f64>,
}

impl HaiMatrix {
    /// Wrap a precomputed similarity matrix.
    ///
    /// Must be square and symmetric with every cell in `[0, 1]` and a unit
    /// diagonal.
    pub fn from_array(data: Array2<f64>) -> Result<Self> {
        let (rows, cols) = data.dim();
        if rows != cols {
            return Err(Error::DimensionMismatch {
                expected: (rows, rows),
                found: (rows, cols),
            });
        }
        if data.iter().any(|v| !(0.0..=1.0).contains(v)) {
            return Err(Error::invalid("HAI values must lie in [0, 1]"));
        }
        for i in 0..rows {
            if data[[i, i]] != 1.0 {
                return Err(Error::invalid(format!("HAI diagonal at {i} is not 1")));
            }
            for j in (i + 1)..rows {
                if (data[[i, j]] - data[[j, i]]).abs() > SYMMETRY_TOLERANCE {
                    return Err(Error::invalid(format!(
                        "HAI matrix is not symmetric at ({i}, {j})"
                    )));
                }
            }
        }
        Ok(Self { data })
    }

    /// Number of runs.
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    /// True if there are no runs.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Agreement of runs `i` and `j`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[[i, j]]
    }

    /// Underlying array.
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    /// `1 − hai`, clamped at 0, with an exact zero diagonal.
    pub fn to_distance(&self) -> Array2<f64> {
        let mut d = self.data.mapv(|v| (1.0 - v).max(0.0));
        d.diag_mut().fill(0.0);
        d
    }

    /// Row-major nested vectors, the wire form.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data.rows().into_iter().map(|r| r.to_vec()).collect()
    }

    /// Number of distinct values, compared bitwise.
    pub fn n_unique(&self) -> usize {
        let mut bits: Vec<u64> = self.data.iter().map(|v| v.to_bits()).collect();
        bits.sort_unstable();
        bits.dedup();
        bits.len()
    }
}

/// Assemble the HAI matrix of a batch of runs.
///
/// Rows and columns follow increasing parameter value; the returned vector
/// maps each position back to its parameter. All scale matrices are held at
/// once, so peak memory is `O(k · n²)`.
///
/// Fails with [`Error::NoValidHierarchies`] on an empty batch and
/// [`Error::InconsistentSampleCount`] if two runs disagree on `n`.
pub fn assemble<'a, I>(runs: I) -> Result<(HaiMatrix, Vec<usize>)>
where
    I: IntoIterator<Item = (usize, &'a Dendrogram)>,
{
    let mut runs: Vec<(usize, &Dendrogram)> = runs.into_iter().collect();
    if runs.is_empty() {
        return Err(Error::NoValidHierarchies);
    }
    runs.sort_by_key(|&(param, _)| param);

    let n = runs[0].1.n_merges() + 1;
    for &(param, tree) in &runs {
        let found = tree.n_merges() + 1;
        if found != n || tree.n_items() != n {
            return Err(Error::InconsistentSampleCount {
                param,
                expected: n,
                found: found.max(tree.n_items()),
            });
        }
    }

    let scale_of = |&(_, tree): &(usize, &Dendrogram)| ScaleMatrix::from_dendrogram(tree, n);

    #[cfg(feature = "parallel")]
    let scales: Vec<ScaleMatrix> = runs.par_iter().map(scale_of).collect::<Result<_>>()?;

    #[cfg(not(feature = "parallel"))]
    let scales: Vec<ScaleMatrix> = runs.iter().map(scale_of).collect::<Result<_>>()?;

    let k = scales.len();
    let pairs: Vec<(usize, usize)> = (0..k)
        .flat_map(|i| ((i + 1)..k).map(move |j| (i, j)))
        .collect();
    let score_of = |&(i, j): &(usize, usize)| hai_score(&scales[i], &scales[j]);

    #[cfg(feature = "parallel")]
    let scores: Vec<f64> = pairs.par_iter().map(score_of).collect::<Result<_>>()?;

    #[cfg(not(feature = "parallel"))]
    let scores: Vec<f64> = pairs.iter().map(score_of).collect::<Result<_>>()?;

    let mut data = Array2::from_elem((k, k), 1.0);
    for (&(i, j), &s) in pairs.iter().zip(&scores) {
        data[[i, j]] = s;
        data[[j, i]] = s;
    }
    log::debug!("assembled {k}x{k} HAI matrix over {n} samples");

    let params = runs.into_iter().map(|(param, _)| param).collect();
    Ok((HaiMatrix { data }, params))
}
