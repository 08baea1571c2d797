//! persona-predict - Personality trait prediction pipeline
//!
//! Predicts a binary personality trait (Introvert/Extrovert) from seven
//! self-reported behavioral indicators, with two classical classifiers
//! trained once per session.
//!
//! # Modules
//!
//! - [`data`] - Dataset loading, normalization, categorical codecs
//! - [`training`] - Train/eval splitting, KNN and Gaussian NB, evaluation
//! - [`inference`] - Single-vector prediction for user submissions
//! - [`session`] - At-most-once pipeline bootstrap and artifact cache
//!
//! The presentation layer consumes the crate through [`session::Session`]:
//! bootstrap once, read the cached dataset/reports for display, call
//! [`session::Session::predict_form`] per submission.

// Core error handling
pub mod error;

// Core pipeline modules
pub mod data;
pub mod inference;
pub mod session;
pub mod training;

pub use error::{PersonaError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{PersonaError, Result};

    // Data
    pub use crate::data::{
        DatasetLoader, FeatureSummary, LabelCodec, LabelCodecs, NormalizedDataset,
        FEATURE_COLUMNS, TARGET_COLUMN,
    };

    // Training
    pub use crate::training::{
        evaluate, train, train_eval_split, train_gaussian, train_neighbor, EvaluationReport,
        GaussianNb, KnnClassifier, ModelKind, SplitIndices, TrainedClassifier, SPLIT_SEED,
        TRAIN_FRACTION,
    };

    // Inference
    pub use crate::inference::{predict, Prediction, SurveyForm, Verdict};

    // Session
    pub use crate::session::{Session, SessionCache};
}
