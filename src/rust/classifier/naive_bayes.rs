use std::collections::BTreeMap;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::error::ClassifierError;
use super::utils::log_sum_exp;
use super::vectorizer::SparseVector;

/// Multinomial naive Bayes over non-negative feature weights (TF-IDF here).
///
/// Classes are kept in sorted order; `predict` breaks ties toward the first one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultinomialNb {
    alpha: f64,
    classes: Vec<String>,
    class_count: Vec<usize>,
    class_log_prior: Array1<f64>,
    feature_log_prob: Array2<f64>,
}

impl MultinomialNb {
    /// Estimates class priors and per-class feature likelihoods with additive smoothing.
    ///
    /// # Errors
    /// - `ValidationError` if `alpha` is not a positive finite number
    /// - `BuildError` if `rows` and `labels` disagree in length or are empty
    pub fn fit(
        rows: &[SparseVector],
        labels: &[String],
        n_features: usize,
        alpha: f64,
    ) -> Result<Self, ClassifierError> {
        if !(alpha.is_finite() && alpha > 0.0) {
            return Err(ClassifierError::ValidationError(format!(
                "Smoothing alpha must be positive, got {}",
                alpha
            )));
        }
        if rows.len() != labels.len() {
            return Err(ClassifierError::BuildError(format!(
                "Found {} feature rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }
        if rows.is_empty() {
            return Err(ClassifierError::BuildError("Cannot fit on zero examples".into()));
        }

        let mut class_index: BTreeMap<&str, usize> = BTreeMap::new();
        for label in labels {
            class_index.entry(label.as_str()).or_insert(0);
        }
        let classes: Vec<String> = class_index.keys().map(|c| c.to_string()).collect();
        for (i, index) in class_index.values_mut().enumerate() {
            *index = i;
        }

        let n_classes = classes.len();
        let mut class_count = vec![0usize; n_classes];
        let mut feature_count = Array2::<f64>::zeros((n_classes, n_features));

        for (row, label) in rows.iter().zip(labels) {
            let c = class_index[label.as_str()];
            class_count[c] += 1;
            for &(j, weight) in row {
                if j >= n_features {
                    return Err(ClassifierError::BuildError(format!(
                        "Feature index {} out of range for {} features",
                        j, n_features
                    )));
                }
                feature_count[[c, j]] += weight;
            }
        }

        let smoothed = feature_count + alpha;
        let totals = smoothed.sum_axis(ndarray::Axis(1)).mapv(f64::ln);
        let mut feature_log_prob = smoothed.mapv(f64::ln);
        for (mut class_row, total) in feature_log_prob.rows_mut().into_iter().zip(totals.iter()) {
            class_row -= *total;
        }

        let n = rows.len() as f64;
        let class_log_prior = Array1::from_iter(class_count.iter().map(|&c| (c as f64 / n).ln()));

        Ok(Self {
            alpha,
            classes,
            class_count,
            class_log_prior,
            feature_log_prob,
        })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn class_count(&self) -> &[usize] {
        &self.class_count
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn n_features(&self) -> usize {
        self.feature_log_prob.ncols()
    }

    /// Unnormalized log posterior per class: `log P(c) + Σ_j x_j · log P(j | c)`.
    pub fn joint_log_likelihood(&self, row: &SparseVector) -> Result<Array1<f64>, ClassifierError> {
        let mut jll = self.class_log_prior.clone();
        for &(j, weight) in row {
            if j >= self.n_features() {
                return Err(ClassifierError::PredictionError(format!(
                    "Feature index {} out of range for {} features",
                    j,
                    self.n_features()
                )));
            }
            jll.scaled_add(weight, &self.feature_log_prob.column(j));
        }
        Ok(jll)
    }

    /// Posterior class probabilities, aligned with [`classes`](Self::classes).
    pub fn predict_proba(&self, row: &SparseVector) -> Result<Array1<f64>, ClassifierError> {
        let jll = self.joint_log_likelihood(row)?;
        let normalizer = log_sum_exp(&jll);
        Ok(jll.mapv(|v| (v - normalizer).exp()))
    }

    pub fn predict(&self, row: &SparseVector) -> Result<&str, ClassifierError> {
        let jll = self.joint_log_likelihood(row)?;
        let mut best = 0;
        for (i, &value) in jll.iter().enumerate() {
            if value > jll[best] {
                best = i;
            }
        }
        Ok(&self.classes[best])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn toy_model() -> MultinomialNb {
        let rows = vec![
            vec![(0, 1.0)],
            vec![(0, 0.8), (2, 0.6)],
            vec![(1, 1.0)],
            vec![(1, 0.6), (2, 0.8)],
        ];
        MultinomialNb::fit(&rows, &labels(&["food", "food", "travel", "travel"]), 3, 1.0).unwrap()
    }

    #[test]
    fn test_classes_are_sorted() {
        let model = toy_model();
        assert_eq!(model.classes(), &["food".to_string(), "travel".to_string()]);
        assert_eq!(model.class_count(), &[2, 2]);
    }

    #[test]
    fn test_feature_log_prob_rows_are_distributions() {
        let model = toy_model();
        for row in model.feature_log_prob.rows() {
            let total: f64 = row.iter().map(|v| v.exp()).sum();
            assert!((total - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_predict_follows_features() {
        let model = toy_model();
        assert_eq!(model.predict(&vec![(0, 1.0)]).unwrap(), "food");
        assert_eq!(model.predict(&vec![(1, 1.0)]).unwrap(), "travel");
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let model = toy_model();
        let proba = model.predict_proba(&vec![(0, 0.5), (1, 0.5)]).unwrap();
        assert!((proba.sum() - 1.0).abs() < 1e-12);
        assert!(proba.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }

    #[test]
    fn test_empty_row_ties_break_to_first_class() {
        let model = toy_model();
        assert_eq!(model.predict(&Vec::new()).unwrap(), "food");
    }

    #[test]
    fn test_fit_validation() {
        let rows = vec![vec![(0, 1.0)]];
        assert!(MultinomialNb::fit(&rows, &labels(&["a"]), 1, 0.0).is_err());
        assert!(MultinomialNb::fit(&rows, &labels(&["a", "b"]), 1, 1.0).is_err());
        assert!(MultinomialNb::fit(&rows, &labels(&["a"]), 0, 1.0).is_err());
        assert!(MultinomialNb::fit(&[], &[], 1, 1.0).is_err());
    }

    #[test]
    fn test_out_of_range_feature_at_prediction() {
        let model = toy_model();
        assert!(matches!(
            model.predict(&vec![(7, 1.0)]),
            Err(ClassifierError::PredictionError(_))
        ));
    }
}
