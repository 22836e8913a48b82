//! Ошибки библиотеки

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MlError {
    #[error("Empty dataset")]
    EmptyDataset,

    #[error("Column '{0}' has no observed values")]
    EmptyColumn(String),

    #[error("Unknown category '{value}' in column '{feature}'")]
    UnknownCategory { feature: String, value: String },

    #[error("Unknown class label: {0}")]
    UnknownLabel(String),

    #[error("Unknown class code: {0}")]
    UnknownCode(usize),

    #[error("Missing target value in row {0}")]
    MissingTarget(usize),

    #[error("Feature mismatch: expected {expected} columns, got {got}")]
    FeatureMismatch { expected: usize, got: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Model fitting failed: {0}")]
    Model(String),
}

pub type Result<T> = std::result::Result<T, MlError>;
