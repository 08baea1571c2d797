//! K-nearest-neighbor classifier
//!
//! Majority vote among the k closest training rows under Euclidean
//! distance, computed over the raw feature values. No scaling is applied:
//! the survey features share a comparable bounded range, and distances are
//! sensitive to any rescaling of individual features.

use crate::error::{PersonaError, Result};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Default neighbor count.
pub const DEFAULT_K: usize = 5;

/// K-nearest-neighbor classifier (Euclidean, uniform votes)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnClassifier {
    n_neighbors: usize,
    x_train: Option<Array2<f64>>,
    y_train: Option<Array1<f64>>,
    classes: Vec<i64>,
}

impl Default for KnnClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_K)
    }
}

impl KnnClassifier {
    pub fn new(n_neighbors: usize) -> Self {
        Self {
            n_neighbors,
            x_train: None,
            y_train: None,
            classes: Vec::new(),
        }
    }

    /// Fit the classifier (stores the training data).
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if x.nrows() == 0 {
            return Err(PersonaError::EmptyTrainingSet);
        }
        if x.nrows() != y.len() {
            return Err(PersonaError::Validation(format!(
                "feature rows ({}) and labels ({}) disagree",
                x.nrows(),
                y.len()
            )));
        }

        let mut classes: Vec<i64> = y.iter().map(|&v| v as i64).collect();
        classes.sort();
        classes.dedup();

        self.classes = classes;
        self.x_train = Some(x.clone());
        self.y_train = Some(y.clone());
        Ok(())
    }

    /// Class codes seen during fit, sorted ascending.
    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    /// Predict class labels, parallelized over query rows.
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

    /// Predict class probabilities as neighbor vote fractions.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let n_classes = self.classes.len();
        let probs: Vec<Vec<f64>> = (0..x.nrows())
            .into_par_iter()
            .map(|i| {
                let row = x.row(i).to_vec();
                self.proba_one(&row)
            })
            .collect::<Result<Vec<Vec<f64>>>>()?;

        let flat: Vec<f64> = probs.into_iter().flatten().collect();
        Array2::from_shape_vec((x.nrows(), n_classes), flat)
            .map_err(|e| PersonaError::DataError(e.to_string()))
    }

    /// Probability distribution over classes for a single feature vector.
    pub fn proba_one(&self, point: &[f64]) -> Result<Vec<f64>> {
        let x_train = self.x_train.as_ref().ok_or(PersonaError::ModelNotFitted)?;
        let y_train = self.y_train.as_ref().ok_or(PersonaError::ModelNotFitted)?;

        let neighbors = find_k_nearest(point, x_train, y_train, self.n_neighbors);

        let mut counts = vec![0.0; self.classes.len()];
        for &(_, label) in &neighbors {
            // classes is sorted, so the position lookup is exact
            if let Ok(idx) = self.classes.binary_search(&(label as i64)) {
                counts[idx] += 1.0;
            }
        }
        let total: f64 = counts.iter().sum();
        if total > 0.0 {
            counts.iter_mut().for_each(|c| *c /= total);
        }
        Ok(counts)
    }
}

/// Pick the index of the largest value; ties resolve to the lowest index,
/// keeping predictions deterministic.
pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Max-heap entry for partial sort (keeps the k smallest distances)
#[derive(PartialEq)]
struct DistLabel(f64, f64);

impl Eq for DistLabel {}
impl PartialOrd for DistLabel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}
impl Ord for DistLabel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or(Ordering::Equal)
    }
}

/// Find the k nearest training rows with a bounded max-heap,
/// O(n log k) instead of O(n log n).
fn find_k_nearest(
    point: &[f64],
    x_train: &Array2<f64>,
    y_train: &Array1<f64>,
    k: usize,
) -> Vec<(f64, f64)> {
    let mut heap = BinaryHeap::with_capacity(k + 1);

    for (i, row) in x_train.rows().into_iter().enumerate() {
        let dist = euclidean(&row.to_vec(), point);
        if heap.len() < k {
            heap.push(DistLabel(dist, y_train[i]));
        } else if let Some(top) = heap.peek() {
            if dist < top.0 {
                heap.pop();
                heap.push(DistLabel(dist, y_train[i]));
            }
        }
    }

    heap.into_iter().map(|dl| (dl.0, dl.1)).collect()
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(ai, bi)| {
            let d = ai - bi;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable_data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_vec(
            (10, 2),
            vec![
                1.0, 1.0, 1.5, 1.5, 2.0, 2.0, 1.0, 2.0, 2.0, 1.0, // class 0
                8.0, 8.0, 8.5, 8.5, 9.0, 9.0, 8.0, 9.0, 9.0, 8.0, // class 1
            ],
        )
        .unwrap();
        let y = Array1::from_vec(vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        (x, y)
    }

    #[test]
    fn test_knn_separable() {
        let (x, y) = separable_data();
        let mut knn = KnnClassifier::new(3);
        knn.fit(&x, &y).unwrap();

        let predictions = knn.predict(&x).unwrap();
        let correct = y
            .iter()
            .zip(predictions.iter())
            .filter(|(&yi, &pi)| (yi - pi).abs() < 0.5)
            .count();
        assert_eq!(correct, y.len());
    }

    #[test]
    fn test_knn_proba_sums_to_one() {
        let (x, y) = separable_data();
        let mut knn = KnnClassifier::new(5);
        knn.fit(&x, &y).unwrap();

        let proba = knn.predict_proba(&x).unwrap();
        for row in proba.rows() {
            let sum: f64 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_knn_empty_training_set() {
        let x = Array2::<f64>::zeros((0, 2));
        let y = Array1::<f64>::zeros(0);
        let mut knn = KnnClassifier::default();
        assert!(matches!(
            knn.fit(&x, &y),
            Err(PersonaError::EmptyTrainingSet)
        ));
    }

    #[test]
    fn test_knn_not_fitted() {
        let knn = KnnClassifier::default();
        assert!(matches!(
            knn.proba_one(&[1.0, 2.0]),
            Err(PersonaError::ModelNotFitted)
        ));
    }

    #[test]
    fn test_euclidean() {
        assert!((euclidean(&[0.0, 0.0], &[3.0, 4.0]) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_argmax_prefers_lowest_index_on_tie() {
        assert_eq!(argmax(&[0.5, 0.5]), 0);
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), 1);
    }
}
