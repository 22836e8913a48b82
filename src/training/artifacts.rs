//! Сохранение и загрузка обученных артефактов (JSON)

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::metrics::ClassificationReport;
use super::selection::{CvResult, TrainingOutcome};
use super::TrainingMode;
use crate::error::{MlError, Result};
use crate::models::TrainedPipeline;
use crate::preprocessing::LabelEncoder;

pub const LABEL_ENCODER_FILE: &str = "label_encoder.json";

pub fn model_file_name(mode: TrainingMode) -> String {
    format!("best_model_{mode}.json")
}

pub fn report_file_name(mode: TrainingMode) -> String {
    format!("training_report_{mode}.json")
}

/// Обученный пайплайн вместе с метаданными отбора.
#[derive(Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model_name: String,
    pub mode: TrainingMode,
    pub cv_f1: f64,
    pub cv_accuracy: f64,
    pub trained_at: DateTime<Utc>,
    pub pipeline: TrainedPipeline,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub mode: TrainingMode,
    pub best_model: String,
    pub cv_results: Vec<CvResult>,
    pub test: ClassificationReport,
    pub trained_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub label_encoder: PathBuf,
    pub report: PathBuf,
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(MlError::ArtifactNotFound(path.display().to_string()));
    }
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Пишет модель, кодировщик меток и отчёт; каталог создаётся при необходимости.
pub fn save_artifacts(dir: &Path, outcome: TrainingOutcome) -> Result<ArtifactPaths> {
    std::fs::create_dir_all(dir)?;

    let trained_at = Utc::now();
    let best = outcome.best_result().clone();
    let paths = ArtifactPaths {
        model: dir.join(model_file_name(outcome.mode)),
        label_encoder: dir.join(LABEL_ENCODER_FILE),
        report: dir.join(report_file_name(outcome.mode)),
    };

    let report = TrainingReport {
        mode: outcome.mode,
        best_model: best.model.clone(),
        cv_results: outcome.cv_results,
        test: outcome.test_report,
        trained_at,
    };
    write_json(&paths.report, &report)?;
    write_json(&paths.label_encoder, &outcome.label_encoder)?;

    let artifact = ModelArtifact {
        model_name: best.model,
        mode: outcome.mode,
        cv_f1: best.mean_f1,
        cv_accuracy: best.mean_accuracy,
        trained_at,
        pipeline: outcome.pipeline,
    };
    write_json(&paths.model, &artifact)?;

    tracing::info!("Artifacts saved to {}", dir.display());
    Ok(paths)
}

pub fn load_model(path: &Path) -> Result<ModelArtifact> {
    read_json(path)
}

pub fn load_label_encoder(path: &Path) -> Result<LabelEncoder> {
    read_json(path)
}
