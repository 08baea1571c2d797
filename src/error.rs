//! Error types for the persona-predict pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PersonaError>;

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum PersonaError {
    /// An expected raw dataset column is absent. Fatal: aborts initialization.
    #[error("Schema mismatch: missing column '{missing}'")]
    SchemaMismatch { missing: String },

    /// A categorical value was not seen when the codec was fitted.
    #[error("Unknown category: '{0}'")]
    UnknownCategory(String),

    /// A label code is outside the codec's fitted range.
    #[error("Invalid label code {code} (codec has {n_classes} classes)")]
    InvalidCode { code: i64, n_classes: usize },

    /// A fit or split operation was handed zero training rows.
    #[error("Empty training set")]
    EmptyTrainingSet,

    /// An inference feature vector has the wrong number of fields.
    /// Recoverable: local to a single prediction call.
    #[error("Feature shape mismatch: expected {expected} fields, got {actual}")]
    FeatureShape { expected: usize, actual: usize },

    #[error("Data error: {0}")]
    DataError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Model not fitted")]
    ModelNotFitted,
}

impl From<polars::error::PolarsError> for PersonaError {
    fn from(err: polars::error::PolarsError) -> Self {
        PersonaError::DataError(err.to_string())
    }
}
