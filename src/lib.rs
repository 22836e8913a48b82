//! Obesity DX - поддержка диагностики уровня ожирения

pub mod config;
pub mod data;
pub mod error;
pub mod labels;
pub mod models;
pub mod predictor;
pub mod preprocessing;
pub mod training;
pub mod types;
pub mod web;

pub use error::{MlError, Result};
pub use types::*;
pub use models::{Classifier, ModelSpec, Pipeline, TrainedModel, TrainedPipeline};
pub use preprocessing::{FittedPreprocessor, LabelEncoder, Preprocessor, PreprocessorConfig};
pub use training::{run_tournament, save_artifacts, TournamentConfig, TrainingMode, TrainingOutcome};

// Re-export для удобства
pub use predictor::Predictor;
pub use web::{build_router, AppState};
