//! Distribution helpers used by histogram and comparison views.
//!
//! The dashboard uses `percentile_rank` for a player's gauge percentile and
//! exposes `histogram` / `pearson` over the active subset. Renderers may also
//! call them directly.

use serde::{Deserialize, Serialize};

/// Percentile rank of `value` within ascending `sorted_values`, in `[0, 100]`.
///
/// Rank is the left insertion point divided by `n - 1`, so the smallest value
/// ranks 0 and the largest ranks 100. With fewer than two values the rank is 0.
pub fn percentile_rank(sorted_values: &[f64], value: f64) -> f64 {
    let n = sorted_values.len();
    if n <= 1 || value.is_nan() {
        return 0.0;
    }
    let idx = sorted_values.partition_point(|&v| v < value);
    (idx as f64 / (n - 1) as f64 * 100.0).min(100.0)
}

/// One histogram bucket, `[x0, x1)` (the last bucket is closed).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub x0: f64,
    pub x1: f64,
    pub count: usize,
}

/// Equal-width histogram over the finite values.
///
/// Empty input or `bin_count == 0` gives no bins; identical values give a
/// single bin holding all of them.
pub fn histogram(values: &[f64], bin_count: usize) -> Vec<Bin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bin_count == 0 {
        return Vec::new();
    }

    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        return vec![Bin {
            x0: min,
            x1: max,
            count: finite.len(),
        }];
    }

    let width = (max - min) / bin_count as f64;
    let mut bins: Vec<Bin> = (0..bin_count)
        .map(|i| Bin {
            x0: min + width * i as f64,
            x1: if i + 1 == bin_count {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for v in finite {
        let idx = (((v - min) / width) as usize).min(bin_count - 1);
        bins[idx].count += 1;
    }
    bins
}

/// Pearson correlation of paired samples.
///
/// Pairs with a non-finite side are dropped. `None` for fewer than two pairs
/// or when either side has zero variance.
pub fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    let clean: Vec<(f64, f64)> = pairs
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    let n = clean.len();
    if n < 2 {
        return None;
    }

    let nf = n as f64;
    let mean_x = clean.iter().map(|p| p.0).sum::<f64>() / nf;
    let mean_y = clean.iter().map(|p| p.1).sum::<f64>() / nf;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &clean {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_rank() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile_rank(&sorted, 1.0), 0.0);
        assert_eq!(percentile_rank(&sorted, 3.0), 50.0);
        assert_eq!(percentile_rank(&sorted, 5.0), 100.0);
        // Above the max clamps to 100
        assert_eq!(percentile_rank(&sorted, 9.0), 100.0);
    }

    #[test]
    fn test_percentile_rank_ties_use_left_edge() {
        let sorted = [1.0, 2.0, 2.0, 2.0, 5.0];
        assert_eq!(percentile_rank(&sorted, 2.0), 25.0);
    }

    #[test]
    fn test_percentile_rank_degenerate() {
        assert_eq!(percentile_rank(&[], 3.0), 0.0);
        assert_eq!(percentile_rank(&[3.0], 3.0), 0.0);
    }

    #[test]
    fn test_histogram_counts_every_value() {
        let values = [0.0, 1.0, 2.5, 5.0, 7.5, 10.0, f64::NAN];
        let bins = histogram(&values, 4);
        assert_eq!(bins.len(), 4);
        assert_eq!(bins[0].x0, 0.0);
        assert_eq!(bins[3].x1, 10.0);
        let counts: Vec<usize> = bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![2, 1, 1, 2]);
    }

    #[test]
    fn test_histogram_degenerate() {
        assert!(histogram(&[], 5).is_empty());
        assert!(histogram(&[1.0], 0).is_empty());
        let single = histogram(&[4.0, 4.0, 4.0], 5);
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].count, 3);
    }

    #[test]
    fn test_pearson() {
        let perfect = [(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)];
        assert!((pearson(&perfect).unwrap() - 1.0).abs() < 1e-12);

        let inverse = [(1.0, 3.0), (2.0, 2.0), (3.0, 1.0)];
        assert!((pearson(&inverse).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_degenerate() {
        assert_eq!(pearson(&[(1.0, 1.0)]), None);
        assert_eq!(pearson(&[(1.0, 1.0), (1.0, 2.0)]), None);
        assert_eq!(pearson(&[(1.0, f64::NAN), (2.0, 3.0)]), None);
    }
}
