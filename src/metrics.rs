//! External agreement between flat labelings.
//!
//! Used to score a run's flat labels against a known class assignment.
//! Labels are opaque: any `Copy + Eq + Hash` type works, and noise (`-1`)
//! is treated as one more label.
//!
//! | Metric | Range | Best | Properties |
//! |--------|-------|------|------------|
//! | [`ari`] | [-1, 1] | 1 | Adjusted Rand Index, chance-corrected |
//! | [`ami`] | [-1, 1] | 1 | Adjusted Mutual Information, chance-corrected |
//! | [`nmi`] | [0, 1] | 1 | Normalized Mutual Information, not adjusted |
//!
//! NMI rewards over-segmentation: splitting every point into its own
//! cluster still shares information with any truth. AMI subtracts the
//! mutual information expected by chance and scores such labelings near 0.
//!
//! ```rust
//! use hai_sweep::metrics::{ami, ari, nmi};
//!
//! let pred = [0, 0, 1, 1, -1, -1];
//! let truth = [0, 0, 1, 1, 2, 2];
//! assert!((ari(&pred, &truth) - 1.0).abs() < 1e-9);
//! assert!((ami(&pred, &truth) - 1.0).abs() < 1e-9);
//! assert!((nmi(&pred, &truth) - 1.0).abs() < 1e-9);
//! ```
//!
//! # References
//!
//! - Hubert & Arabie (1985). "Comparing partitions" (ARI)
//! - Strehl & Ghosh (2002). "Cluster ensembles" (NMI)
//! - Vinh, Epps & Bailey (2010). "Information theoretic measures for
//!   clusterings comparison" (AMI)

use std::collections::HashMap;
use std::hash::Hash;

/// Normalized Mutual Information between two labelings.
///
/// ```text
/// NMI(U, V) = 2 * I(U; V) / (H(U) + H(V))
/// ```
///
/// Returns 0 for empty or mismatched inputs, and 1 when both labelings are
/// constant.
pub fn nmi<T: Copy + Eq + Hash>(pred: &[T], truth: &[T]) -> f64 {
    if pred.len() != truth.len() || pred.is_empty() {
        return 0.0;
    }

    let n_f = pred.len() as f64;
    let joint = contingency(pred, truth);
    let p_pred = counts(pred);
    let p_truth = counts(truth);

    let h_pred = entropy(p_pred.values().copied(), n_f);
    let h_truth = entropy(p_truth.values().copied(), n_f);
    let mi = mutual_information(&joint, &p_pred, &p_truth, n_f);

    let denom = h_pred + h_truth;
    if denom > 0.0 {
        (2.0 * mi / denom).clamp(0.0, 1.0)
    } else {
        1.0
    }
}

/// Adjusted Mutual Information between two labelings.
///
/// ```text
/// AMI(U, V) = (I(U; V) − E[I]) / (mean(H(U), H(V)) − E[I])
/// ```
///
/// `E[I]` is the expected mutual information of two random labelings with
/// the same cluster sizes (hypergeometric model); the mean is arithmetic.
/// Returns 0 for empty or mismatched inputs and 1 when both labelings are
/// constant.
pub fn ami<T: Copy + Eq + Hash>(pred: &[T], truth: &[T]) -> f64 {
    if pred.len() != truth.len() || pred.is_empty() {
        return 0.0;
    }

    let n = pred.len();
    let n_f = n as f64;
    let joint = contingency(pred, truth);
    let p_pred = counts(pred);
    let p_truth = counts(truth);

    if p_pred.len() == 1 && p_truth.len() == 1 {
        return 1.0;
    }

    let h_pred = entropy(p_pred.values().copied(), n_f);
    let h_truth = entropy(p_truth.values().copied(), n_f);
    let mi = mutual_information(&joint, &p_pred, &p_truth, n_f);
    let emi = expected_mutual_information(&p_pred, &p_truth, n);

    let denom = (h_pred + h_truth) / 2.0 - emi;
    let denom = if denom < 0.0 {
        denom.min(-f64::EPSILON)
    } else {
        denom.max(f64::EPSILON)
    };
    (mi - emi) / denom
}

/// Adjusted Rand Index between two labelings.
///
/// 0 for chance-level agreement, 1 for identical partitions.
/// Returns 0 for empty or mismatched inputs.
pub fn ari<T: Copy + Eq + Hash>(pred: &[T], truth: &[T]) -> f64 {
    if pred.len() != truth.len() || pred.is_empty() {
        return 0.0;
    }

    let joint = contingency(pred, truth);
    let row_sums = counts(pred);
    let col_sums = counts(truth);

    let sum_comb_ij: f64 = joint.values().map(|&c| comb2(c) as f64).sum();
    let sum_comb_a: f64 = row_sums.values().map(|&a| comb2(a) as f64).sum();
    let sum_comb_b: f64 = col_sums.values().map(|&b| comb2(b) as f64).sum();
    let comb_n = comb2(pred.len()) as f64;
    if comb_n == 0.0 {
        return 1.0;
    }

    // ARI = (index - expected) / (max - expected)
    let expected = sum_comb_a * sum_comb_b / comb_n;
    let max_index = (sum_comb_a + sum_comb_b) / 2.0;

    let denom = max_index - expected;
    if denom.abs() < 1e-10 {
        return 1.0;
    }

    (sum_comb_ij - expected) / denom
}

fn mutual_information<T: Copy + Eq + Hash>(
    joint: &HashMap<(T, T), usize>,
    p_pred: &HashMap<T, usize>,
    p_truth: &HashMap<T, usize>,
    n: f64,
) -> f64 {
    let mut mi = 0.0;
    for (&(p, t), &count) in joint {
        let p_joint = count as f64 / n;
        let p_p = p_pred.get(&p).copied().unwrap_or(0) as f64 / n;
        let p_t = p_truth.get(&t).copied().unwrap_or(0) as f64 / n;
        if p_p > 0.0 && p_t > 0.0 {
            mi += p_joint * (p_joint / (p_p * p_t)).ln();
        }
    }
    mi.max(0.0)
}

/// Expected mutual information of two labelings with the given cluster
/// sizes, drawn uniformly among all labelings with those sizes.
fn expected_mutual_information<T>(
    p_pred: &HashMap<T, usize>,
    p_truth: &HashMap<T, usize>,
    n: usize,
) -> f64 {
    // ln(k!) for k in 0..=n
    let mut ln_fact = vec![0.0f64; n + 1];
    for k in 1..=n {
        ln_fact[k] = ln_fact[k - 1] + (k as f64).ln();
    }
    let n_f = n as f64;

    let mut emi = 0.0;
    for &a in p_pred.values() {
        for &b in p_truth.values() {
            let lo = (a + b).saturating_sub(n).max(1);
            let hi = a.min(b);
            // Terms that do not depend on n_ij.
            let fixed = ln_fact[a] + ln_fact[b] + ln_fact[n - a] + ln_fact[n - b] - ln_fact[n];
            for nij in lo..=hi {
                let nij_f = nij as f64;
                let ln_p = fixed
                    - ln_fact[nij]
                    - ln_fact[a - nij]
                    - ln_fact[b - nij]
                    - ln_fact[n + nij - a - b];
                emi += nij_f / n_f * (n_f * nij_f / (a as f64 * b as f64)).ln() * ln_p.exp();
            }
        }
    }
    emi
}

fn contingency<T: Copy + Eq + Hash>(pred: &[T], truth: &[T]) -> HashMap<(T, T), usize> {
    let mut table = HashMap::new();
    for (&p, &t) in pred.iter().zip(truth) {
        *table.entry((p, t)).or_insert(0) += 1;
    }
    table
}

fn counts<T: Copy + Eq + Hash>(labels: &[T]) -> HashMap<T, usize> {
    let mut out = HashMap::new();
    for &l in labels {
        *out.entry(l).or_insert(0) += 1;
    }
    out
}

fn entropy(counts: impl Iterator<Item = usize>, n: f64) -> f64 {
    counts
        .map(|c| {
            let p = c as f64 / n;
            if p > 0.0 {
                -p * p.ln()
            } else {
                0.0
            }
        })
        .sum()
}

fn comb2(n: usize) -> usize {
    if n < 2 {
        0
    } else {
        n * (n - 1) / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nmi_perfect() {
        let pred = [0, 0, 1, 1, 2, 2];
        let truth = [0, 0, 1, 1, 2, 2];
        assert!((nmi(&pred, &truth) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_nmi_permuted() {
        // Same partition, different names
        let pred = [1, 1, 0, 0, 2, 2];
        let truth = [0, 0, 1, 1, 2, 2];
        assert!((nmi(&pred, &truth) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_nmi_independent() {
        let pred = [0, 1, 0, 1];
        let truth = [0, 0, 1, 1];
        assert!(nmi(&pred, &truth) < 1e-9);
    }

    #[test]
    fn test_ami_singletons_score_zero() {
        // NMI gives 2/3 here; the chance correction removes all of it.
        let pred = [0, 1, 2, 3];
        let truth = [0, 0, 1, 1];
        assert!(ami(&pred, &truth).abs() < 1e-9);
        assert!((nmi(&pred, &truth) - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_ami_perfect_and_permuted() {
        let pred = [2, 2, 0, 0, 1, 1];
        let truth = [0, 0, 1, 1, 2, 2];
        assert!((ami(&pred, &truth) - 1.0).abs() < 1e-9);
        assert_eq!(ami(&[4, 4, 4], &[1, 1, 1]), 1.0);
    }

    #[test]
    fn test_ami_below_nmi_for_oversegmentation() {
        let pred = [0, 0, 1, 1, 2, 2, 3, 3];
        let truth = [0, 0, 0, 0, 1, 1, 1, 1];
        let a = ami(&pred, &truth);
        assert!(a < nmi(&pred, &truth));
        assert!(a > 0.0 && a < 1.0);
    }

    #[test]
    fn test_ari_perfect() {
        let pred = [0, 0, 1, 1];
        let truth = [0, 0, 1, 1];
        assert!((ari(&pred, &truth) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_ari_noise_is_a_label() {
        let pred = [-1, -1, 0, 0, 1, 1];
        let truth = [5, 5, 6, 6, 7, 7];
        assert!((ari(&pred, &truth) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_ari_disagreement_is_below_one() {
        let pred = [0, 0, 0, 1, 1, 1];
        let truth = [0, 0, 1, 1, 2, 2];
        let score = ari(&pred, &truth);
        assert!(score < 1.0);
        assert!(score > -1.0);
    }

    #[test]
    fn test_mismatched_lengths() {
        assert_eq!(ari(&[0, 1], &[0]), 0.0);
        assert_eq!(nmi::<i32>(&[], &[]), 0.0);
        assert_eq!(ami(&[0, 1, 2], &[0, 1]), 0.0);
    }
}
