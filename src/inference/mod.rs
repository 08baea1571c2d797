//! Single-vector inference
//!
//! The one path exercised repeatedly within a session: a user-submitted
//! feature vector against one of the trained classifiers. Calls are
//! side-effect free and safe to run concurrently; the classifier is only
//! read.

use crate::data::FEATURE_COLUMNS;
use crate::error::{PersonaError, Result};
use crate::training::knn::argmax;
use crate::training::TrainedClassifier;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Predicted label code with the probability mass behind it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label_code: i64,
    pub confidence: f64,
}

/// Decoded prediction for the presentation boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub label: String,
    pub confidence: f64,
}

/// Raw survey answers as collected by the presentation layer.
///
/// Field order matches the canonical feature-column order; the Yes/No
/// answers encode to 1/0, exactly the codes the fitted flag codecs assign
/// (`No` = 0, `Yes` = 1 under sorted-category fitting).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyForm {
    /// Hours spent alone per day (0-11)
    pub time_alone: u8,
    /// Has stage fright
    pub stage_fear: bool,
    /// Social event attendance (0-10)
    pub social_events: u8,
    /// Outings per week (0-7)
    pub going_outside: u8,
    /// Feels drained after socializing
    pub drained_after_socializing: bool,
    /// Close friend count (0-15)
    pub friends_circle: u8,
    /// Social media post frequency (0-10)
    pub post_frequency: u8,
}

impl SurveyForm {
    /// Lay the answers out in the canonical feature order.
    pub fn to_feature_vector(&self) -> [f64; 7] {
        [
            f64::from(self.time_alone),
            if self.stage_fear { 1.0 } else { 0.0 },
            f64::from(self.social_events),
            f64::from(self.going_outside),
            if self.drained_after_socializing { 1.0 } else { 0.0 },
            f64::from(self.friends_circle),
            f64::from(self.post_frequency),
        ]
    }
}

/// Predict the label for a single feature vector.
///
/// The vector must have exactly one value per canonical feature column, in
/// canonical order. Returns the argmax class and its probability mass.
pub fn predict(classifier: &TrainedClassifier, features: &[f64]) -> Result<Prediction> {
    if features.len() != FEATURE_COLUMNS.len() {
        warn!(
            expected = FEATURE_COLUMNS.len(),
            actual = features.len(),
            "rejecting malformed feature vector"
        );
        return Err(PersonaError::FeatureShape {
            expected: FEATURE_COLUMNS.len(),
            actual: features.len(),
        });
    }

    let proba = classifier.proba_one(features)?;
    let best = argmax(&proba);
    Ok(Prediction {
        label_code: classifier.classes()[best],
        confidence: proba[best],
    })
}
