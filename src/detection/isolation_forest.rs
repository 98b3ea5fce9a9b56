//! Isolation Forest anomaly detection

use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

use super::{AnomalyDetector, DetectError, Label};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Isolation Tree node
#[derive(Debug, Clone)]
pub enum IsolationTree {
    /// Internal node with split
    Internal {
        feature: usize,
        threshold: f64,
        /// values < threshold
        left: Box<IsolationTree>,
        /// values >= threshold
        right: Box<IsolationTree>,
    },
    /// External (leaf) node
    External {
        /// Number of training rows that reached this leaf
        size: usize,
    },
}

impl IsolationTree {
    /// Grow a tree over `indices` until isolation or `max_depth`
    pub fn build(
        x: &Array2<f64>,
        indices: &[usize],
        depth: usize,
        max_depth: usize,
        rng: &mut impl Rng,
    ) -> Self {
        let n_samples = indices.len();

        if depth >= max_depth || n_samples <= 1 {
            return IsolationTree::External { size: n_samples };
        }

        // Only features that still vary inside this node can split it
        let candidates: Vec<(usize, f64, f64)> = (0..x.ncols())
            .filter_map(|feature| {
                let (min, max) = indices.iter().fold(
                    (f64::INFINITY, f64::NEG_INFINITY),
                    |(lo, hi), &i| (lo.min(x[[i, feature]]), hi.max(x[[i, feature]])),
                );
                (max > min).then_some((feature, min, max))
            })
            .collect();

        if candidates.is_empty() {
            return IsolationTree::External { size: n_samples };
        }

        let (feature, min_val, max_val) = candidates[rng.gen_range(0..candidates.len())];
        // Interpolate instead of `gen_range`: `max_val - min_val` can overflow
        let u: f64 = rng.gen();
        let threshold = (min_val * (1.0 - u) + max_val * u).min(max_val);

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, feature]] < threshold);

        if left_indices.is_empty() || right_indices.is_empty() {
            return IsolationTree::External { size: n_samples };
        }

        let left = Box::new(Self::build(x, &left_indices, depth + 1, max_depth, rng));
        let right = Box::new(Self::build(x, &right_indices, depth + 1, max_depth, rng));

        IsolationTree::Internal {
            feature,
            threshold,
            left,
            right,
        }
    }

    /// Path length of a sample, leaf size adjusted
    pub fn path_length(&self, sample: ArrayView1<f64>) -> f64 {
        let mut node = self;
        let mut depth = 0usize;

        loop {
            match node {
                IsolationTree::External { size } => {
                    return depth as f64 + average_path_length(*size);
                }
                IsolationTree::Internal {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if sample[*feature] < *threshold { &**left } else { &**right };
                    depth += 1;
                }
            }
        }
    }
}

/// Average path length of an unsuccessful BST search over `n` items.
///
/// c(n) = 2 * H(n-1) - 2(n-1)/n, with H(i) ~ ln(i) + gamma
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n_f = n as f64;
            2.0 * ((n_f - 1.0).ln() + EULER_GAMMA) - 2.0 * (n_f - 1.0) / n_f
        }
    }
}

/// Linear-interpolated percentile, `q` in [0, 100]
fn percentile(values: &[f64], q: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (q / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;

    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

/// Isolation Forest anomaly detector
#[derive(Debug, Clone)]
pub struct IsolationForest {
    n_estimators: usize,
    max_samples: usize,
    contamination: f64,
    seed: u64,
    trees: Vec<IsolationTree>,
    /// Rows drawn per tree during the last fit
    sample_size: usize,
    threshold: Option<f64>,
}

impl IsolationForest {
    pub fn new() -> Self {
        Self {
            n_estimators: 100,
            max_samples: 256,
            contamination: 0.01,
            seed: 42,
            trees: Vec::new(),
            sample_size: 0,
            threshold: None,
        }
    }

    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n.max(1);
        self
    }

    pub fn with_max_samples(mut self, n: usize) -> Self {
        self.max_samples = n.max(1);
        self
    }

    pub fn with_contamination(mut self, c: f64) -> Self {
        self.contamination = c;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    fn compute_scores(&self, x: &Array2<f64>) -> Result<Vec<f64>, DetectError> {
        if self.trees.is_empty() {
            return Err(DetectError::NotFitted);
        }

        // A single-row fit has c(1) = 0; every row then scores 1.0
        let normalizer = average_path_length(self.sample_size).max(1.0);
        let n_trees = self.trees.len() as f64;

        Ok(x.rows()
            .into_iter()
            .map(|row| {
                let mean_path = self
                    .trees
                    .iter()
                    .map(|tree| tree.path_length(row))
                    .sum::<f64>()
                    / n_trees;

                // s(x, n) = 2^(-E[h(x)] / c(n))
                2.0_f64.powf(-mean_path / normalizer)
            })
            .collect())
    }
}

impl Default for IsolationForest {
    fn default() -> Self {
        Self::new()
    }
}

impl AnomalyDetector for IsolationForest {
    fn fit(&mut self, x: &Array2<f64>) -> Result<(), DetectError> {
        let (n_rows, n_cols) = x.dim();
        if n_rows == 0 || n_cols == 0 {
            return Err(DetectError::EmptyInput);
        }
        if !(self.contamination > 0.0 && self.contamination <= 0.5) {
            return Err(DetectError::InvalidContamination(self.contamination));
        }
        if let Some(((row, column), value)) = x.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(DetectError::NonFinite { row, column, value: *value });
        }

        let sample_size = self.max_samples.min(n_rows);
        let max_depth = (sample_size as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(self.seed);

        self.trees = (0..self.n_estimators)
            .map(|_| {
                let indices = index::sample(&mut rng, n_rows, sample_size).into_vec();
                IsolationTree::build(x, &indices, 0, max_depth, &mut rng)
            })
            .collect();
        self.sample_size = sample_size;

        let scores = self.compute_scores(x)?;
        let threshold = percentile(&scores, 100.0 * (1.0 - self.contamination));
        self.threshold = Some(threshold);

        tracing::debug!(
            "Isolation forest fitted: {} trees, {} rows/tree, depth <= {}, threshold {:.6}",
            self.trees.len(),
            sample_size,
            max_depth,
            threshold
        );

        Ok(())
    }

    fn score_samples(&self, x: &Array2<f64>) -> Result<Vec<f64>, DetectError> {
        self.compute_scores(x)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<Label>, DetectError> {
        let threshold = self.threshold.ok_or(DetectError::NotFitted)?;

        Ok(self
            .score_samples(x)?
            .into_iter()
            .map(|s| if s > threshold { Label::Threat } else { Label::Normal })
            .collect())
    }

    fn threshold(&self) -> Option<f64> {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clustered_with_outliers() -> Array2<f64> {
        let mut data = Vec::new();
        for i in 0..200 {
            data.push((i % 10) as f64);
            data.push(((i * 7) % 13) as f64);
        }
        data.extend_from_slice(&[500.0, 500.0]);
        data.extend_from_slice(&[-400.0, 350.0]);
        Array2::from_shape_vec((202, 2), data).unwrap()
    }

    #[test]
    fn test_isolation_forest_flags_planted_outliers() {
        let x = clustered_with_outliers();
        let mut forest = IsolationForest::new().with_contamination(0.01).with_seed(42);
        forest.fit(&x).unwrap();

        let scores = forest.score_samples(&x).unwrap();
        assert!(scores[200] > scores[0]);
        assert!(scores[201] > scores[0]);

        let labels = forest.predict(&x).unwrap();
        assert_eq!(labels.len(), 202);
        assert_eq!(labels[200], Label::Threat);
        assert_eq!(labels[201], Label::Threat);

        // 1% of 202 rows, plus at most one row sitting on the interpolation
        let threats = labels.iter().filter(|l| **l == Label::Threat).count();
        assert!(threats <= 3, "{} threats", threats);
    }

    #[test]
    fn test_same_seed_same_scores() {
        let x = clustered_with_outliers();

        let mut a = IsolationForest::new().with_seed(7);
        let mut b = IsolationForest::new().with_seed(7);
        a.fit(&x).unwrap();
        b.fit(&x).unwrap();

        assert_eq!(a.score_samples(&x).unwrap(), b.score_samples(&x).unwrap());
        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn test_tree_count_matches_estimators() {
        let x = clustered_with_outliers();
        let mut forest = IsolationForest::new().with_n_estimators(12);
        forest.fit(&x).unwrap();
        assert_eq!(forest.tree_count(), 12);
    }

    #[test]
    fn test_single_row_is_normal() {
        let x = Array2::from_shape_vec((1, 3), vec![1.0, 2.0, 3.0]).unwrap();
        let mut forest = IsolationForest::new();
        forest.fit(&x).unwrap();
        assert_eq!(forest.predict(&x).unwrap(), vec![Label::Normal]);
    }

    #[test]
    fn test_constant_matrix_flags_nothing() {
        let x = Array2::from_elem((50, 2), 3.0);
        let mut forest = IsolationForest::new().with_contamination(0.1);
        forest.fit(&x).unwrap();
        assert!(forest.predict(&x).unwrap().iter().all(|l| *l == Label::Normal));
    }

    #[test]
    fn test_extreme_finite_range_fits() {
        let x = Array2::from_shape_vec((4, 1), vec![1e308, -1e308, 0.0, 1.0]).unwrap();
        let mut forest = IsolationForest::new();
        forest.fit(&x).unwrap();

        let scores = forest.score_samples(&x).unwrap();
        assert!(scores.iter().all(|s| s.is_finite()));
        assert_eq!(forest.predict(&x).unwrap().len(), 4);
    }

    #[test]
    fn test_rejects_non_finite_input() {
        let x = Array2::from_shape_vec((2, 2), vec![1.0, f64::INFINITY, 2.0, 3.0]).unwrap();
        let err = IsolationForest::new().fit(&x).unwrap_err();
        assert!(matches!(err, DetectError::NonFinite { row: 0, column: 1, .. }));
    }

    #[test]
    fn test_rejects_bad_contamination() {
        let x = Array2::from_elem((4, 1), 1.0);
        let err = IsolationForest::new().with_contamination(0.9).fit(&x).unwrap_err();
        assert!(matches!(err, DetectError::InvalidContamination(_)));
    }

    #[test]
    fn test_predict_before_fit() {
        let x = Array2::from_elem((2, 1), 1.0);
        assert!(matches!(
            IsolationForest::new().predict(&x),
            Err(DetectError::NotFitted)
        ));
    }

    #[test]
    fn test_average_path_length() {
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        // 2 * (ln 255 + gamma) - 2 * 255 / 256
        let c = average_path_length(256);
        assert!((c - 10.2448).abs() < 1e-3, "{}", c);
    }

    #[test]
    fn test_percentile_interpolates() {
        let v = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(percentile(&v, 0.0), 1.0);
        assert_eq!(percentile(&v, 100.0), 4.0);
        assert!((percentile(&v, 50.0) - 2.5).abs() < 1e-12);
    }
}
