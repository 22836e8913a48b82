//! Инференс: загрузка артефактов и предсказание для одного пациента

use std::path::{Path, PathBuf};

use crate::error::{MlError, Result};
use crate::labels::{advice_for, display_label};
use crate::preprocessing::LabelEncoder;
use crate::training::artifacts::{model_file_name, LABEL_ENCODER_FILE};
use crate::training::{load_label_encoder, load_model, ModelArtifact, TrainingMode};
use crate::types::{PatientRecord, PredictionOutput};

pub struct Predictor {
    artifact: ModelArtifact,
    label_encoder: LabelEncoder,
}

impl Predictor {
    pub fn new(artifact: ModelArtifact, label_encoder: LabelEncoder) -> Self {
        Self {
            artifact,
            label_encoder,
        }
    }

    /// Загружает диагностическую модель. Если в каталоге её нет, пробует `../models`.
    pub fn load(models_dir: &Path) -> Result<Self> {
        let model_name = model_file_name(TrainingMode::Diagnostic);

        let dir = [models_dir.to_path_buf(), PathBuf::from("../models")]
            .into_iter()
            .find(|dir| dir.join(&model_name).exists())
            .ok_or_else(|| MlError::ArtifactNotFound(models_dir.join(&model_name).display().to_string()))?;

        let artifact = load_model(&dir.join(&model_name))?;
        let label_encoder = load_label_encoder(&dir.join(LABEL_ENCODER_FILE))?;

        tracing::info!(
            "Loaded {} ({} mode, CV F1 {:.4}, trained {}) from {}",
            artifact.model_name,
            artifact.mode,
            artifact.cv_f1,
            artifact.trained_at,
            dir.display()
        );

        Ok(Self::new(artifact, label_encoder))
    }

    pub fn model_name(&self) -> &str {
        &self.artifact.model_name
    }

    pub fn predict(&self, record: &PatientRecord) -> Result<PredictionOutput> {
        let encoded = self.artifact.pipeline.predict(std::slice::from_ref(record))?;
        let label = self
            .label_encoder
            .inverse_transform(&encoded)?
            .into_iter()
            .next()
            .ok_or(MlError::EmptyDataset)?;

        Ok(PredictionOutput {
            level: label.parse().ok(),
            display_label: display_label(&label),
            advice: advice_for(&label),
            model: self.artifact.model_name.clone(),
            label,
        })
    }
}
