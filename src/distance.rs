//! Pairwise distance functions over feature rows.
//!
//! Everything downstream only needs a *valid distance*: symmetric,
//! non-negative, and zero on equal inputs. The triangle inequality is not
//! required, which is why [`MetricKind::Angular`] and [`MetricKind::Pearson`]
//! are admissible alongside the usual Minkowski family.
//!
//! | Metric | Formula |
//! |--------|---------|
//! | Euclidean | sqrt(Σ (aᵢ − bᵢ)²) |
//! | Manhattan | Σ \|aᵢ − bᵢ\| |
//! | Supremum | max \|aᵢ − bᵢ\| |
//! | Angular | arccos(cos(a, b)) / π |
//! | Pearson | 1 − corr(a, b) |
//!
//! Any closure `Fn(ArrayView1<f64>, ArrayView1<f64>) -> f64` also satisfies
//! [`Distance`], so callers can plug in their own measure.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Capability: a symmetric, zero-on-equal, non-negative distance.
pub trait Distance {
    /// Distance between two rows of equal length.
    fn distance(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64;
}

impl<F> Distance for F
where
    F: Fn(ArrayView1<'_, f64>, ArrayView1<'_, f64>) -> f64,
{
    fn distance(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
        self(a, b)
    }
}

/// Built-in metrics accepted by the sweep specification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// L2 distance.
    #[default]
    Euclidean,
    /// L1 distance.
    Manhattan,
    /// L∞ distance.
    #[serde(alias = "chebyshev")]
    Supremum,
    /// Normalised angle between the two vectors, in [0, 1].
    #[serde(alias = "cosine")]
    Angular,
    /// One minus the Pearson correlation, in [0, 2].
    Pearson,
}

impl MetricKind {
    /// Name as used on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            MetricKind::Euclidean => "euclidean",
            MetricKind::Manhattan => "manhattan",
            MetricKind::Supremum => "supremum",
            MetricKind::Angular => "angular",
            MetricKind::Pearson => "pearson",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Distance for MetricKind {
    fn distance(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
        match self {
            MetricKind::Euclidean => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f64>()
                .sqrt(),
            MetricKind::Manhattan => a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum(),
            MetricKind::Supremum => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| (x - y).abs())
                .fold(0.0, f64::max),
            MetricKind::Angular => angular(a, b),
            MetricKind::Pearson => pearson(a, b),
        }
    }
}

fn angular(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    if a == b {
        return 0.0;
    }
    let dot = a.dot(&b);
    let norm = a.dot(&a).sqrt() * b.dot(&b).sqrt();
    if norm <= f64::EPSILON {
        // Zero vector: no direction to compare.
        return 1.0;
    }
    (dot / norm).clamp(-1.0, 1.0).acos() / std::f64::consts::PI
}

fn pearson(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    if a == b {
        return 0.0;
    }
    let n = a.len() as f64;
    if n == 0.0 {
        return 0.0;
    }
    let mean_a = a.sum() / n;
    let mean_b = b.sum() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    let denom = (var_a * var_b).sqrt();
    if denom <= f64::EPSILON {
        // Constant row: correlation undefined, treat as uncorrelated.
        return 1.0;
    }
    (1.0 - cov / denom).clamp(0.0, 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    const ALL: [MetricKind; 5] = [
        MetricKind::Euclidean,
        MetricKind::Manhattan,
        MetricKind::Supremum,
        MetricKind::Angular,
        MetricKind::Pearson,
    ];

    #[test]
    fn test_known_values() {
        let a = array![0.0, 0.0];
        let b = array![3.0, 4.0];
        assert!((MetricKind::Euclidean.distance(a.view(), b.view()) - 5.0).abs() < 1e-12);
        assert!((MetricKind::Manhattan.distance(a.view(), b.view()) - 7.0).abs() < 1e-12);
        assert!((MetricKind::Supremum.distance(a.view(), b.view()) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_angular_orthogonal() {
        let a = array![1.0, 0.0];
        let b = array![0.0, 2.0];
        let d = MetricKind::Angular.distance(a.view(), b.view());
        assert!((d - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_anticorrelated() {
        let a = array![1.0, 2.0, 3.0];
        let b = array![3.0, 2.0, 1.0];
        let d = MetricKind::Pearson.distance(a.view(), b.view());
        assert!((d - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_on_equal_and_symmetric() {
        let a = array![1.5, -2.0, 0.25];
        let b = array![0.5, 4.0, 1.0];
        for m in ALL {
            assert_eq!(m.distance(a.view(), a.view()), 0.0, "{m}");
            assert_eq!(
                m.distance(a.view(), b.view()),
                m.distance(b.view(), a.view()),
                "{m}"
            );
            assert!(m.distance(a.view(), b.view()) >= 0.0, "{m}");
        }
    }

    #[test]
    fn test_custom_fn_is_a_distance() {
        fn hamming(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
            a.iter().zip(b.iter()).filter(|(x, y)| x != y).count() as f64
        }
        let a = array![1.0, 2.0, 3.0];
        let b = array![1.0, 0.0, 0.0];
        assert_eq!(hamming.distance(a.view(), b.view()), 2.0);
    }

    #[test]
    fn test_serde_names() {
        let m: MetricKind = serde_json::from_str("\"chebyshev\"").unwrap();
        assert_eq!(m, MetricKind::Supremum);
        assert_eq!(serde_json::to_string(&MetricKind::Pearson).unwrap(), "\"pearson\"");
    }
}
