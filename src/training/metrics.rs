//! Classification evaluation metrics
//!
//! Accuracy, per-class precision/recall/F1 with supports, macro and
//! weighted averages, and the k-by-k confusion matrix. Computation is pure:
//! the same predictions and truth always produce the same report.

use crate::error::{PersonaError, Result};
use crate::training::TrainedClassifier;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Precision/recall/F1 and support for one class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub class: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Averaged precision/recall/F1 across classes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AveragedMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Full evaluation report for one trained classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Fraction of correct predictions
    pub accuracy: f64,
    /// Per-class metrics, in label-code order
    pub per_class: Vec<ClassMetrics>,
    /// Unweighted mean over classes
    pub macro_avg: AveragedMetrics,
    /// Support-weighted mean over classes
    pub weighted_avg: AveragedMetrics,
    /// `confusion[i][j]`: rows with true class i predicted as class j
    pub confusion: Vec<Vec<usize>>,
    /// Number of evaluated rows
    pub n_rows: usize,
}

impl EvaluationReport {
    /// Compute a report from true and predicted label codes.
    ///
    /// `classes` supplies the decoded name per label code and fixes the
    /// confusion-matrix dimensions. F1 is defined as 0 when precision and
    /// recall are both 0.
    pub fn compute(
        y_true: &Array1<f64>,
        y_pred: &Array1<f64>,
        classes: &[String],
    ) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(PersonaError::Validation(format!(
                "true labels ({}) and predictions ({}) disagree",
                y_true.len(),
                y_pred.len()
            )));
        }
        let n_rows = y_true.len();
        let k = classes.len();

        let mut confusion = vec![vec![0usize; k]; k];
        let mut correct = 0usize;
        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            let ti = t as usize;
            let pi = p as usize;
            if ti >= k || pi >= k {
                return Err(PersonaError::InvalidCode {
                    code: t.max(p) as i64,
                    n_classes: k,
                });
            }
            confusion[ti][pi] += 1;
            if ti == pi {
                correct += 1;
            }
        }

        let accuracy = if n_rows > 0 {
            correct as f64 / n_rows as f64
        } else {
            0.0
        };

        let per_class: Vec<ClassMetrics> = (0..k)
            .map(|c| {
                let tp = confusion[c][c];
                let predicted: usize = (0..k).map(|i| confusion[i][c]).sum();
                let actual: usize = confusion[c].iter().sum();

                let precision = ratio(tp, predicted);
                let recall = ratio(tp, actual);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };

                ClassMetrics {
                    class: classes[c].clone(),
                    precision,
                    recall,
                    f1,
                    support: actual,
                }
            })
            .collect();

        let macro_avg = AveragedMetrics {
            precision: mean(per_class.iter().map(|m| m.precision)),
            recall: mean(per_class.iter().map(|m| m.recall)),
            f1: mean(per_class.iter().map(|m| m.f1)),
        };
        let total_support: usize = per_class.iter().map(|m| m.support).sum();
        let weighted = |f: fn(&ClassMetrics) -> f64| {
            if total_support == 0 {
                0.0
            } else {
                per_class
                    .iter()
                    .map(|m| f(m) * m.support as f64)
                    .sum::<f64>()
                    / total_support as f64
            }
        };
        let weighted_avg = AveragedMetrics {
            precision: weighted(|m| m.precision),
            recall: weighted(|m| m.recall),
            f1: weighted(|m| m.f1),
        };

        Ok(Self {
            accuracy,
            per_class,
            macro_avg,
            weighted_avg,
            confusion,
            n_rows,
        })
    }
}

/// Run a trained classifier over the evaluation subset and report.
pub fn evaluate(
    classifier: &TrainedClassifier,
    x_eval: &Array2<f64>,
    y_eval: &Array1<f64>,
    classes: &[String],
) -> Result<EvaluationReport> {
    let y_pred = classifier.predict(x_eval)?;
    let report = EvaluationReport::compute(y_eval, &y_pred, classes)?;
    info!(
        model = %classifier.kind(),
        accuracy = report.accuracy,
        rows = report.n_rows,
        "evaluation complete"
    );
    Ok(report)
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let collected: Vec<f64> = values.collect();
    if collected.is_empty() {
        0.0
    } else {
        collected.iter().sum::<f64>() / collected.len() as f64
    }
}
