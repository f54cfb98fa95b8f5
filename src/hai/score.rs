use crate::error::{Error, Result};
use crate::hierarchy::ScaleMatrix;

/// Hierarchy Agreement Index of two scale matrices over the same samples.
///
/// ```text
/// HAI(D1, D2) = 1 − Σ_ij |D1[i,j] − D2[i,j]| / n²
/// ```
///
/// Every cell lies in `[1/n, 1]`, so the mean absolute difference is below 1
/// and the score stays in `[0, 1]`. Identical inputs score exactly 1.
pub fn hai_score(a: &ScaleMatrix, b: &ScaleMatrix) -> Result<f64> {
    if a.dim() != b.dim() {
        return Err(Error::DimensionMismatch {
            expected: a.dim(),
            found: b.dim(),
        });
    }
    let n = a.n();
    if n == 0 {
        return Ok(1.0);
    }

    let total: f64 = a
        .view()
        .iter()
        .zip(b.view().iter())
        .map(|(x, y)| (x - y).abs())
        .sum();

    Ok((1.0 - total / (n * n) as f64).clamp(0.0, 1.0))
}
