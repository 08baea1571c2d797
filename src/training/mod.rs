//! Model training module
//!
//! Deterministic train/evaluation splitting, the two classification
//! algorithms (k-nearest-neighbors and Gaussian Naive Bayes), and the
//! evaluation metrics computed over the held-out subset.

pub mod knn;
pub mod metrics;
pub mod naive_bayes;
pub mod split;
mod trainer;

pub use knn::{KnnClassifier, DEFAULT_K};
pub use metrics::{evaluate, AveragedMetrics, ClassMetrics, EvaluationReport};
pub use naive_bayes::GaussianNb;
pub use split::{train_eval_split, SplitIndices, SPLIT_SEED, TRAIN_FRACTION};
pub use trainer::{train, train_gaussian, train_neighbor, ModelKind, TrainedClassifier};
