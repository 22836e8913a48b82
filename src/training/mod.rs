//! Обучение: метрики, турнир моделей, артефакты

pub mod artifacts;
pub mod metrics;
pub mod selection;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use artifacts::{load_label_encoder, load_model, save_artifacts, ArtifactPaths, ModelArtifact, TrainingReport};
pub use metrics::{accuracy, confusion_matrix, f1_weighted, ClassMetrics, ClassificationReport};
pub use selection::{cross_validate, run_tournament, select_best, CvResult, FoldScore, TournamentConfig, TrainingOutcome};

/// Режим модели: диагностический учитывает вес, превентивный - нет.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TrainingMode {
    #[default]
    Diagnostic,
    Preventive,
}

impl TrainingMode {
    pub fn include_weight(self) -> bool {
        matches!(self, TrainingMode::Diagnostic)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TrainingMode::Diagnostic => "diagnostic",
            TrainingMode::Preventive => "preventive",
        }
    }
}

impl fmt::Display for TrainingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
