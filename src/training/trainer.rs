//! Model training and the trained-classifier variants
//!
//! The two supported algorithms are resolved once at training time into a
//! [`TrainedClassifier`] variant with a uniform prediction surface; callers
//! never re-dispatch on a model name per prediction.

use crate::error::{PersonaError, Result};
use crate::training::knn::{KnnClassifier, DEFAULT_K};
use crate::training::naive_bayes::GaussianNb;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Which classification algorithm to train
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    /// k-nearest-neighbor, k = 5
    Neighbor,
    /// Gaussian Naive Bayes
    Gaussian,
}

impl ModelKind {
    pub const ALL: [ModelKind; 2] = [ModelKind::Neighbor, ModelKind::Gaussian];

    /// Human-readable algorithm name.
    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::Neighbor => "k-nearest-neighbors",
            ModelKind::Gaussian => "gaussian-naive-bayes",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = PersonaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "neighbor" | "knn" | "k-nearest-neighbors" => Ok(ModelKind::Neighbor),
            "gaussian" | "naive-bayes" | "gaussian-naive-bayes" => Ok(ModelKind::Gaussian),
            other => Err(PersonaError::Validation(format!(
                "unknown model kind '{other}'"
            ))),
        }
    }
}

/// A fitted classifier: label codes in, predictions and class
/// probabilities out. Read-only after training.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrainedClassifier {
    Neighbor(KnnClassifier),
    Gaussian(GaussianNb),
}

impl TrainedClassifier {
    /// Which algorithm this classifier was trained with.
    pub fn kind(&self) -> ModelKind {
        match self {
            TrainedClassifier::Neighbor(_) => ModelKind::Neighbor,
            TrainedClassifier::Gaussian(_) => ModelKind::Gaussian,
        }
    }

    /// Class codes seen during fit, sorted ascending.
    pub fn classes(&self) -> &[i64] {
        match self {
            TrainedClassifier::Neighbor(m) => m.classes(),
            TrainedClassifier::Gaussian(m) => m.classes(),
        }
    }

    /// Predict a label per query row.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            TrainedClassifier::Neighbor(m) => m.predict(x),
            TrainedClassifier::Gaussian(m) => m.predict(x),
        }
    }

    /// Probability distribution per query row, columns in `classes()` order.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        match self {
            TrainedClassifier::Neighbor(m) => m.predict_proba(x),
            TrainedClassifier::Gaussian(m) => m.predict_proba(x),
        }
    }

    /// Probability distribution for a single feature vector.
    pub fn proba_one(&self, point: &[f64]) -> Result<Vec<f64>> {
        match self {
            TrainedClassifier::Neighbor(m) => m.proba_one(point),
            TrainedClassifier::Gaussian(m) => m.proba_one(point),
        }
    }
}

/// Train a classifier of the requested kind on the training subset.
pub fn train(kind: ModelKind, x: &Array2<f64>, y: &Array1<f64>) -> Result<TrainedClassifier> {
    let classifier = match kind {
        ModelKind::Neighbor => {
            let mut model = KnnClassifier::new(DEFAULT_K);
            model.fit(x, y)?;
            TrainedClassifier::Neighbor(model)
        }
        ModelKind::Gaussian => {
            let mut model = GaussianNb::new();
            model.fit(x, y)?;
            TrainedClassifier::Gaussian(model)
        }
    };
    info!(model = %kind, rows = x.nrows(), "classifier trained");
    Ok(classifier)
}

/// Train the k-nearest-neighbor classifier.
pub fn train_neighbor(x: &Array2<f64>, y: &Array1<f64>) -> Result<TrainedClassifier> {
    train(ModelKind::Neighbor, x, y)
}

/// Train the Gaussian Naive Bayes classifier.
pub fn train_gaussian(x: &Array2<f64>, y: &Array1<f64>) -> Result<TrainedClassifier> {
    train(ModelKind::Gaussian, x, y)
}
