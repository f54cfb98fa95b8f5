use super::HaiMatrix;
use crate::cluster::NOISE;
use std::collections::BTreeMap;

/// Most central run of each meta-cluster.
///
/// For every non-noise label, sums `1 − hai` from each member to the other
/// members and returns the member index with the smallest sum. Ties go to
/// the lowest index. Labels with no members never appear.
///
/// Labels beyond `hai.len()` are ignored.
pub fn medoids(hai: &HaiMatrix, labels: &[i32]) -> BTreeMap<i32, usize> {
    let mut members: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for (i, &label) in labels.iter().enumerate().take(hai.len()) {
        if label != NOISE {
            members.entry(label).or_default().push(i);
        }
    }

    members
        .into_iter()
        .filter_map(|(label, idx)| {
            let mut best: Option<(usize, f64)> = None;
            for &i in &idx {
                let total: f64 = idx.iter().map(|&j| (1.0 - hai.get(i, j)).max(0.0)).sum();
                if best.map_or(true, |(_, b)| total < b) {
                    best = Some((i, total));
                }
            }
            best.map(|(i, _)| (label, i))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_picks_minimum_row_sum() {
        // Run 1 is closest to both 0 and 2.
        let hai = HaiMatrix::from_array(array![
            [1.0, 0.9, 0.5, 0.0],
            [0.9, 1.0, 0.9, 0.0],
            [0.5, 0.9, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
        .unwrap();
        let m = medoids(&hai, &[0, 0, 0, -1]);
        assert_eq!(m.len(), 1);
        assert_eq!(m[&0], 1);
    }

    #[test]
    fn test_ties_take_first_index() {
        let hai = HaiMatrix::from_array(array![
            [1.0, 0.8, 0.1],
            [0.8, 1.0, 0.1],
            [0.1, 0.1, 1.0],
        ])
        .unwrap();
        let m = medoids(&hai, &[3, 3, 5]);
        assert_eq!(m[&3], 0);
        assert_eq!(m[&5], 2);
    }

    #[test]
    fn test_all_noise() {
        let hai = HaiMatrix::from_array(array![[1.0, 0.2], [0.2, 1.0]]).unwrap();
        assert!(medoids(&hai, &[-1, -1]).is_empty());
    }
}
