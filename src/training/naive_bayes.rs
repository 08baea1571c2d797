//! Gaussian Naive Bayes classifier
//!
//! Assumes per-feature conditional independence given the class, with each
//! continuous feature Gaussian-distributed. Per-class means and variances
//! come from a single Welford pass over the training rows; scoring works in
//! log space with a log-sum-exp normalization so small likelihoods do not
//! underflow.

use crate::error::{PersonaError, Result};
use crate::training::knn::argmax;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Variance floor added to every per-feature variance.
const VAR_SMOOTHING: f64 = 1e-9;

/// Gaussian Naive Bayes classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaussianNb {
    /// Class codes, sorted ascending; all per-class vectors index into this
    classes: Vec<i64>,
    /// `means[c][j]`: mean of feature j over training rows of class c
    means: Vec<Vec<f64>>,
    /// `variances[c][j]`: smoothed variance of feature j for class c
    variances: Vec<Vec<f64>>,
    /// Prior probability per class
    priors: Vec<f64>,
}

impl Default for GaussianNb {
    fn default() -> Self {
        Self::new()
    }
}

impl GaussianNb {
    pub fn new() -> Self {
        Self {
            classes: Vec::new(),
            means: Vec::new(),
            variances: Vec::new(),
            priors: Vec::new(),
        }
    }

    /// Fit per-class Gaussians and priors.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples == 0 {
            return Err(PersonaError::EmptyTrainingSet);
        }
        if n_samples != y.len() {
            return Err(PersonaError::Validation(format!(
                "feature rows ({}) and labels ({}) disagree",
                n_samples,
                y.len()
            )));
        }
        let n_features = x.ncols();

        let mut classes: Vec<i64> = y.iter().map(|&v| v as i64).collect();
        classes.sort();
        classes.dedup();

        let mut means = Vec::with_capacity(classes.len());
        let mut variances = Vec::with_capacity(classes.len());
        let mut priors = Vec::with_capacity(classes.len());

        for &class in &classes {
            let class_indices: Vec<usize> = y
                .iter()
                .enumerate()
                .filter(|(_, &yi)| yi as i64 == class)
                .map(|(i, _)| i)
                .collect();
            let n_class = class_indices.len();

            // Single-pass Welford for mean and variance per feature
            let mut feature_means = vec![0.0; n_features];
            let mut feature_m2 = vec![0.0; n_features];
            let mut count = 0usize;
            for &idx in &class_indices {
                count += 1;
                let row = x.row(idx);
                for (j, &val) in row.iter().enumerate() {
                    let delta = val - feature_means[j];
                    feature_means[j] += delta / count as f64;
                    let delta2 = val - feature_means[j];
                    feature_m2[j] += delta * delta2;
                }
            }
            let feature_vars: Vec<f64> = feature_m2
                .iter()
                .map(|&m2| (m2 / n_class as f64) + VAR_SMOOTHING)
                .collect();

            means.push(feature_means);
            variances.push(feature_vars);
            priors.push(n_class as f64 / n_samples as f64);
        }

        self.classes = classes;
        self.means = means;
        self.variances = variances;
        self.priors = priors;
        Ok(())
    }

    /// Class codes seen during fit, sorted ascending.
    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    /// Prior probability per class, in `classes()` order.
    pub fn priors(&self) -> &[f64] {
        &self.priors
    }

    /// Predict class labels.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        let labels = proba
            .rows()
            .into_iter()
            .map(|row| {
                let best = argmax(&row.to_vec());
                self.classes[best] as f64
            })
            .collect();
        Ok(labels)
    }

    /// Predict class probabilities.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let n_classes = self.classes.len();
        let mut proba = Array2::zeros((x.nrows(), n_classes));
        for (i, row) in x.rows().into_iter().enumerate() {
            let dist = self.proba_one(&row.to_vec())?;
            for (j, p) in dist.into_iter().enumerate() {
                proba[[i, j]] = p;
            }
        }
        Ok(proba)
    }

    /// Probability distribution over classes for a single feature vector.
    pub fn proba_one(&self, point: &[f64]) -> Result<Vec<f64>> {
        if self.classes.is_empty() {
            return Err(PersonaError::ModelNotFitted);
        }

        let mut log_probs: Vec<f64> = (0..self.classes.len())
            .map(|c| self.priors[c].ln() + self.log_likelihood(point, c))
            .collect();

        // log-sum-exp normalization
        let max_val = log_probs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let log_sum: f64 = log_probs
            .iter()
            .map(|&v| (v - max_val).exp())
            .sum::<f64>()
            .ln();
        for val in log_probs.iter_mut() {
            *val = (*val - max_val - log_sum).exp();
        }

        Ok(log_probs)
    }

    fn log_likelihood(&self, point: &[f64], class_idx: usize) -> f64 {
        let means = &self.means[class_idx];
        let vars = &self.variances[class_idx];

        point
            .iter()
            .zip(means.iter())
            .zip(vars.iter())
            .map(|((&xi, &mean), &var)| {
                // Log of the Gaussian PDF
                -0.5 * ((xi - mean).powi(2) / var + var.ln() + (2.0 * PI).ln())
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clustered_data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_vec(
            (10, 2),
            vec![
                -1.0, -1.0, -0.5, -0.5, 0.0, 0.0, -1.0, 0.0, 0.0, -1.0, // class 0
                4.0, 4.0, 4.5, 4.5, 5.0, 5.0, 4.0, 5.0, 5.0, 4.0, // class 1
            ],
        )
        .unwrap();
        let y = Array1::from_vec(vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        (x, y)
    }

    #[test]
    fn test_gaussian_nb_separable() {
        let (x, y) = clustered_data();
        let mut nb = GaussianNb::new();
        nb.fit(&x, &y).unwrap();

        let predictions = nb.predict(&x).unwrap();
        let correct = y
            .iter()
            .zip(predictions.iter())
            .filter(|(&yi, &pi)| (yi - pi).abs() < 0.5)
            .count();
        assert_eq!(correct, y.len());
    }

    #[test]
    fn test_proba_sums_to_one() {
        let (x, y) = clustered_data();
        let mut nb = GaussianNb::new();
        nb.fit(&x, &y).unwrap();

        let proba = nb.predict_proba(&x).unwrap();
        for row in proba.rows() {
            let sum: f64 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9, "probabilities sum to {sum}");
        }
    }

    #[test]
    fn test_balanced_priors() {
        let (x, y) = clustered_data();
        let mut nb = GaussianNb::new();
        nb.fit(&x, &y).unwrap();

        assert!((nb.priors()[0] - 0.5).abs() < 1e-12);
        assert!((nb.priors()[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_training_set() {
        let x = Array2::<f64>::zeros((0, 2));
        let y = Array1::<f64>::zeros(0);
        let mut nb = GaussianNb::new();
        assert!(matches!(nb.fit(&x, &y), Err(PersonaError::EmptyTrainingSet)));
    }

    #[test]
    fn test_not_fitted() {
        let nb = GaussianNb::new();
        assert!(matches!(
            nb.proba_one(&[1.0, 2.0]),
            Err(PersonaError::ModelNotFitted)
        ));
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (x, y) = clustered_data();
        let mut a = GaussianNb::new();
        let mut b = GaussianNb::new();
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        let pa = a.predict_proba(&x).unwrap();
        let pb = b.predict_proba(&x).unwrap();
        assert_eq!(pa, pb);
    }
}
