//! Statistical utilities
//! IQR outlier flagging and a seeded K-Means wrapper, both stateless and
//! re-run per invocation. Nothing here retains a trained model.

use rand::prelude::*;
use rand::rngs::StdRng;
use std::collections::HashSet;

/// Linearly interpolated quantile over an ascending-sorted slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = (sorted.len() - 1) as f64 * q;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = pos - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}

/// Flag rows whose value falls strictly outside `[Q1 - k*IQR, Q3 + k*IQR]`.
///
/// An all-constant column has IQR 0, the bounds collapse onto the constant
/// and nothing is flagged. NaN values are never flagged and are excluded
/// from the quartile computation.
pub fn flag_anomalies(values: &[f64], k: f64) -> Vec<bool> {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return vec![false; values.len()];
    }
    finite.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let q1 = quantile(&finite, 0.25);
    let q3 = quantile(&finite, 0.75);
    let iqr = q3 - q1;
    let lower = q1 - k * iqr;
    let upper = q3 + k * iqr;

    values.iter().map(|v| *v < lower || *v > upper).collect()
}

/// Result of a clustering request. `Skipped` carries a user-visible reason
/// so the hosting report can print a warning and move on.
#[derive(Debug, Clone)]
pub enum ClusterOutcome {
    Clustered(Vec<usize>),
    Skipped(String),
}

fn column_means(rows: &[Vec<f64>], cols: usize) -> Vec<f64> {
    (0..cols)
        .map(|c| {
            let finite: Vec<f64> = rows
                .iter()
                .map(|r| r[c])
                .filter(|v| v.is_finite())
                .collect();
            if finite.is_empty() {
                0.0
            } else {
                finite.iter().sum::<f64>() / finite.len() as f64
            }
        })
        .collect()
}

/// Mean-impute NaNs, then z-score standardize each column. Zero-variance
/// columns standardize to all zeros.
fn standardize(rows: &[Vec<f64>], cols: usize) -> Vec<Vec<f64>> {
    let means = column_means(rows, cols);
    let mut imputed: Vec<Vec<f64>> = rows
        .iter()
        .map(|r| {
            r.iter()
                .enumerate()
                .map(|(c, v)| if v.is_finite() { *v } else { means[c] })
                .collect()
        })
        .collect();

    for c in 0..cols {
        let mean = imputed.iter().map(|r| r[c]).sum::<f64>() / imputed.len() as f64;
        let variance =
            imputed.iter().map(|r| (r[c] - mean).powi(2)).sum::<f64>() / imputed.len() as f64;
        let std = variance.sqrt();
        for row in imputed.iter_mut() {
            row[c] = if std > 0.0 { (row[c] - mean) / std } else { 0.0 };
        }
    }
    imputed
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Seeded K-Means over a rectangular feature matrix.
///
/// Returns one label in `[0, n_clusters)` per input row; no rows are ever
/// dropped. Degenerate inputs (fewer than 2 feature columns, fewer
/// distinct rows than clusters, ragged rows) skip with a reason instead
/// of failing.
pub fn cluster_rows(features: &[Vec<f64>], n_clusters: usize, seed: u64) -> ClusterOutcome {
    if n_clusters == 0 {
        return ClusterOutcome::Skipped("cluster count must be at least 1".to_string());
    }
    if features.is_empty() {
        return ClusterOutcome::Skipped("no rows to cluster".to_string());
    }
    let cols = features[0].len();
    if cols < 2 {
        return ClusterOutcome::Skipped("fewer than 2 feature columns".to_string());
    }
    if features.iter().any(|r| r.len() != cols) {
        return ClusterOutcome::Skipped("feature rows have uneven lengths".to_string());
    }

    let scaled = standardize(features, cols);

    // Distinct standardized rows bound the number of separable clusters.
    let mut seen: HashSet<Vec<u64>> = HashSet::new();
    let mut distinct: Vec<usize> = Vec::new();
    for (i, row) in scaled.iter().enumerate() {
        let key: Vec<u64> = row.iter().map(|v| v.to_bits()).collect();
        if seen.insert(key) {
            distinct.push(i);
        }
    }
    if distinct.len() < n_clusters {
        return ClusterOutcome::Skipped(format!(
            "only {} distinct rows for {} clusters",
            distinct.len(),
            n_clusters
        ));
    }

    // Farthest-first init from a seeded starting point: reproducible, and
    // the centroids start spread instead of piled into one group.
    let mut rng = StdRng::seed_from_u64(seed);
    let first = distinct[rng.gen_range(0..distinct.len())];
    let mut centroids: Vec<Vec<f64>> = vec![scaled[first].clone()];
    while centroids.len() < n_clusters {
        let min_dist = |i: usize| {
            centroids
                .iter()
                .map(|c| squared_distance(&scaled[i], c))
                .fold(f64::INFINITY, f64::min)
        };
        let next = distinct
            .iter()
            .copied()
            .max_by(|&a, &b| {
                min_dist(a)
                    .partial_cmp(&min_dist(b))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(first);
        centroids.push(scaled[next].clone());
    }

    let mut labels = vec![0usize; scaled.len()];
    for _ in 0..100 {
        let mut changed = false;
        for (i, row) in scaled.iter().enumerate() {
            let mut best = 0;
            let mut best_dist = f64::INFINITY;
            for (c, centroid) in centroids.iter().enumerate() {
                let d = squared_distance(row, centroid);
                if d < best_dist {
                    best_dist = d;
                    best = c;
                }
            }
            if labels[i] != best {
                labels[i] = best;
                changed = true;
            }
        }
        if !changed {
            break;
        }

        for (c, centroid) in centroids.iter_mut().enumerate() {
            let members: Vec<&Vec<f64>> = scaled
                .iter()
                .zip(&labels)
                .filter(|(_, l)| **l == c)
                .map(|(r, _)| r)
                .collect();
            // An emptied cluster keeps its previous centroid.
            if members.is_empty() {
                continue;
            }
            for col in 0..cols {
                centroid[col] =
                    members.iter().map(|r| r[col]).sum::<f64>() / members.len() as f64;
            }
        }
    }

    ClusterOutcome::Clustered(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantiles_interpolate_linearly() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert!((quantile(&sorted, 0.5) - 2.5).abs() < 1e-9);
        let sorted = [1.0, 2.0, 3.0, 4.0, 100.0];
        assert!((quantile(&sorted, 0.25) - 2.0).abs() < 1e-9);
        assert!((quantile(&sorted, 0.75) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn constant_column_flags_nothing() {
        let flags = flag_anomalies(&[7.0; 12], 1.5);
        assert!(flags.iter().all(|f| !f));
    }

    #[test]
    fn clear_outlier_is_flagged() {
        // Q1 2, Q3 4, IQR 2 -> bounds [-1, 7]
        let flags = flag_anomalies(&[1.0, 2.0, 3.0, 4.0, 100.0], 1.5);
        assert_eq!(flags, vec![false, false, false, false, true]);
    }

    #[test]
    fn empty_input_flags_nothing() {
        assert!(flag_anomalies(&[], 1.5).is_empty());
    }

    #[test]
    fn nan_rows_are_never_flagged() {
        let flags = flag_anomalies(&[1.0, f64::NAN, 2.0, 3.0, 4.0, 100.0], 1.5);
        assert!(!flags[1]);
        assert!(flags[5]);
    }

    fn two_blobs() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.1],
            vec![0.1, 0.0],
            vec![0.2, 0.2],
            vec![10.0, 10.1],
            vec![10.1, 10.0],
            vec![10.2, 10.2],
        ]
    }

    #[test]
    fn separated_blobs_get_separate_labels() {
        let labels = match cluster_rows(&two_blobs(), 2, 42) {
            ClusterOutcome::Clustered(l) => l,
            ClusterOutcome::Skipped(reason) => panic!("skipped: {}", reason),
        };
        assert_eq!(labels.len(), 6);
        assert!(labels.iter().all(|l| *l < 2));
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[1], labels[2]);
        assert_eq!(labels[3], labels[4]);
        assert_eq!(labels[4], labels[5]);
        assert_ne!(labels[0], labels[3]);
    }

    #[test]
    fn same_seed_is_deterministic() {
        let a = match cluster_rows(&two_blobs(), 2, 7) {
            ClusterOutcome::Clustered(l) => l,
            ClusterOutcome::Skipped(reason) => panic!("skipped: {}", reason),
        };
        let b = match cluster_rows(&two_blobs(), 2, 7) {
            ClusterOutcome::Clustered(l) => l,
            ClusterOutcome::Skipped(reason) => panic!("skipped: {}", reason),
        };
        assert_eq!(a, b);
    }

    #[test]
    fn single_column_is_skipped() {
        let rows = vec![vec![1.0], vec![2.0], vec![3.0]];
        assert!(matches!(
            cluster_rows(&rows, 2, 42),
            ClusterOutcome::Skipped(_)
        ));
    }

    #[test]
    fn too_few_distinct_rows_is_skipped() {
        let rows = vec![vec![1.0, 2.0], vec![1.0, 2.0], vec![1.0, 2.0]];
        assert!(matches!(
            cluster_rows(&rows, 2, 42),
            ClusterOutcome::Skipped(_)
        ));
    }

    #[test]
    fn nan_features_are_imputed_not_dropped() {
        let mut rows = two_blobs();
        rows[0][1] = f64::NAN;
        let labels = match cluster_rows(&rows, 2, 42) {
            ClusterOutcome::Clustered(l) => l,
            ClusterOutcome::Skipped(reason) => panic!("skipped: {}", reason),
        };
        assert_eq!(labels.len(), rows.len());
    }
}
