//! Deterministic train/evaluation splitting
//!
//! A seeded permutation of the row indices, sliced by the training
//! fraction. Identical `(n_rows, fraction, seed)` always yields the
//! identical partition, so evaluation numbers are stable across reruns.

use crate::error::{PersonaError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default fraction of rows assigned to training.
pub const TRAIN_FRACTION: f64 = 0.8;

/// Default shuffling seed.
pub const SPLIT_SEED: u64 = 42;

/// Disjoint train/evaluation row indices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub eval: Vec<usize>,
}

impl SplitIndices {
    /// Materialize the two subsets of a feature matrix and label vector.
    pub fn take(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
    ) -> (Array2<f64>, Array1<f64>, Array2<f64>, Array1<f64>) {
        let x_train = x.select(Axis(0), &self.train);
        let y_train = y.select(Axis(0), &self.train);
        let x_eval = x.select(Axis(0), &self.eval);
        let y_eval = y.select(Axis(0), &self.eval);
        (x_train, y_train, x_eval, y_eval)
    }
}

/// Partition `0..n_rows` into training and evaluation index sets.
///
/// The permutation is drawn from `ChaCha8Rng::seed_from_u64(seed)`; the
/// first `floor(n_rows * train_fraction)` permuted indices train, the rest
/// evaluate.
pub fn train_eval_split(n_rows: usize, train_fraction: f64, seed: u64) -> Result<SplitIndices> {
    if !(0.0..1.0).contains(&train_fraction) || train_fraction == 0.0 {
        return Err(PersonaError::Validation(format!(
            "train_fraction must be in (0, 1), got {train_fraction}"
        )));
    }

    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train_size = (n_rows as f64 * train_fraction) as usize;
    if train_size == 0 {
        return Err(PersonaError::EmptyTrainingSet);
    }

    let eval = indices.split_off(train_size);
    debug!(train = indices.len(), eval = eval.len(), seed, "split computed");

    Ok(SplitIndices {
        train: indices,
        eval,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_split_is_disjoint_and_complete() {
        let split = train_eval_split(100, TRAIN_FRACTION, SPLIT_SEED).unwrap();
        let train: HashSet<usize> = split.train.iter().copied().collect();
        let eval: HashSet<usize> = split.eval.iter().copied().collect();

        assert!(train.is_disjoint(&eval));
        let union: HashSet<usize> = train.union(&eval).copied().collect();
        assert_eq!(union, (0..100).collect());
    }

    #[test]
    fn test_split_sizes_follow_fraction() {
        let split = train_eval_split(10, 0.8, 42).unwrap();
        assert_eq!(split.train.len(), 8);
        assert_eq!(split.eval.len(), 2);
    }

    #[test]
    fn test_split_is_deterministic() {
        let a = train_eval_split(10, 0.8, 42).unwrap();
        let b = train_eval_split(10, 0.8, 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seed_differs() {
        let a = train_eval_split(100, 0.8, 42).unwrap();
        let b = train_eval_split(100, 0.8, 43).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_degenerate_split() {
        assert!(matches!(
            train_eval_split(0, 0.8, 42),
            Err(PersonaError::EmptyTrainingSet)
        ));
        assert!(matches!(
            train_eval_split(10, 0.0, 42),
            Err(PersonaError::Validation(_))
        ));
        assert!(matches!(
            train_eval_split(10, 1.0, 42),
            Err(PersonaError::Validation(_))
        ));
    }

    #[test]
    fn test_take_materializes_subsets() {
        let x = Array2::from_shape_fn((10, 2), |(r, c)| (r * 2 + c) as f64);
        let y = Array1::from_shape_fn(10, |i| i as f64);
        let split = train_eval_split(10, 0.8, 42).unwrap();

        let (x_train, y_train, x_eval, y_eval) = split.take(&x, &y);
        assert_eq!(x_train.nrows(), 8);
        assert_eq!(x_eval.nrows(), 2);
        assert_eq!(y_train.len(), 8);
        assert_eq!(y_eval.len(), 2);

        for (pos, &row) in split.train.iter().enumerate() {
            assert_eq!(y_train[pos], row as f64);
            assert_eq!(x_train[[pos, 0]], (row * 2) as f64);
        }
    }
}
