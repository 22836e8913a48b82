//! Кросс-валидация и турнир моделей

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::metrics::{accuracy, f1_weighted, ClassificationReport};
use super::TrainingMode;
use crate::data::{train_test_split, StratifiedKFold};
use crate::error::{MlError, Result};
use crate::models::{ModelSpec, Pipeline, TrainedPipeline};
use crate::preprocessing::{LabelEncoder, PreprocessorConfig};
use crate::types::{LabeledRecord, PatientRecord};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoldScore {
    pub f1_weighted: f64,
    pub accuracy: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvResult {
    pub model: String,
    pub folds: Vec<FoldScore>,
    pub mean_f1: f64,
    pub mean_accuracy: f64,
}

fn subset<T: Clone>(items: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| items[i].clone()).collect()
}

fn subset_targets(targets: &Array1<usize>, indices: &[usize]) -> Array1<usize> {
    indices.iter().map(|&i| targets[i]).collect()
}

/// Каждый фолд: пайплайн обучается на train-индексах, оценивается на валидационных.
pub fn cross_validate(
    pipeline: &Pipeline,
    records: &[PatientRecord],
    targets: &Array1<usize>,
    n_classes: usize,
    folds: &[(Vec<usize>, Vec<usize>)],
) -> Result<CvResult> {
    if folds.is_empty() {
        return Err(MlError::InvalidParameter("no folds to evaluate".to_string()));
    }

    let mut scores = Vec::with_capacity(folds.len());
    for (k, (train_idx, valid_idx)) in folds.iter().enumerate() {
        let trained = pipeline.fit(
            &subset(records, train_idx),
            &subset_targets(targets, train_idx),
            n_classes,
        )?;

        let y_valid = subset_targets(targets, valid_idx);
        let y_pred = trained.predict(&subset(records, valid_idx))?;

        let score = FoldScore {
            f1_weighted: f1_weighted(&y_valid, &y_pred, n_classes),
            accuracy: accuracy(&y_valid, &y_pred),
        };
        tracing::debug!(
            "{} fold {}: f1={:.4} acc={:.4}",
            pipeline.name(),
            k + 1,
            score.f1_weighted,
            score.accuracy
        );
        scores.push(score);
    }

    let n = scores.len() as f64;
    Ok(CvResult {
        model: pipeline.name().to_string(),
        mean_f1: scores.iter().map(|s| s.f1_weighted).sum::<f64>() / n,
        mean_accuracy: scores.iter().map(|s| s.accuracy).sum::<f64>() / n,
        folds: scores,
    })
}

/// Индекс победителя: строго лучший средний F1, при равенстве - более ранний кандидат.
pub fn select_best(results: &[CvResult]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, result) in results.iter().enumerate() {
        if best.map_or(true, |b| result.mean_f1 > results[b].mean_f1) {
            best = Some(i);
        }
    }
    best
}

#[derive(Debug, Clone)]
pub struct TournamentConfig {
    pub mode: TrainingMode,
    pub test_size: f64,
    pub n_splits: usize,
    pub seed: u64,
    pub candidates: Vec<ModelSpec>,
}

impl TournamentConfig {
    pub fn new(mode: TrainingMode) -> Self {
        Self {
            mode,
            test_size: 0.2,
            n_splits: 5,
            seed: 42,
            candidates: ModelSpec::candidates(42),
        }
    }
}

/// Результат обучения: победитель, обученный на всей обучающей части.
pub struct TrainingOutcome {
    pub mode: TrainingMode,
    pub pipeline: TrainedPipeline,
    pub label_encoder: LabelEncoder,
    pub cv_results: Vec<CvResult>,
    pub best: usize,
    pub test_report: ClassificationReport,
}

impl TrainingOutcome {
    pub fn best_result(&self) -> &CvResult {
        &self.cv_results[self.best]
    }
}

/// Полный цикл: кодирование меток, стратифицированный split,
/// кросс-валидация кандидатов, дообучение победителя и оценка на тесте.
pub fn run_tournament(dataset: &[LabeledRecord], config: &TournamentConfig) -> Result<TrainingOutcome> {
    if dataset.is_empty() {
        return Err(MlError::EmptyDataset);
    }
    if config.candidates.is_empty() {
        return Err(MlError::InvalidParameter("no candidate models".to_string()));
    }

    let records: Vec<PatientRecord> = dataset.iter().map(|r| r.record.clone()).collect();
    let labels: Vec<&str> = dataset.iter().map(|r| r.target.as_str()).collect();

    let label_encoder = LabelEncoder::fit(&labels)?;
    let targets = label_encoder.transform(&labels)?;
    let n_classes = label_encoder.n_classes();
    tracing::info!("{} rows, {} classes", records.len(), n_classes);

    let targets_vec = targets.to_vec();
    let (train_idx, test_idx) = train_test_split(&targets_vec, config.test_size, config.seed)?;
    let train_records = subset(&records, &train_idx);
    let train_targets = subset_targets(&targets, &train_idx);
    let test_records = subset(&records, &test_idx);
    let test_targets = subset_targets(&targets, &test_idx);

    let folds = StratifiedKFold::new(config.n_splits, true, config.seed)
        .split(&train_targets.to_vec())?;

    let preprocessor = PreprocessorConfig {
        include_weight: config.mode.include_weight(),
    };

    let mut cv_results = Vec::with_capacity(config.candidates.len());
    for spec in &config.candidates {
        let pipeline = Pipeline::new(preprocessor, spec.clone());
        let result = cross_validate(&pipeline, &train_records, &train_targets, n_classes, &folds)?;
        tracing::info!(
            "{}: mean F1 {:.4}, mean accuracy {:.4}",
            result.model,
            result.mean_f1,
            result.mean_accuracy
        );
        cv_results.push(result);
    }

    let best = select_best(&cv_results).ok_or(MlError::EmptyDataset)?;
    let winner = Pipeline::new(preprocessor, config.candidates[best].clone());
    tracing::info!("Best model ({}): {}", config.mode, winner.name());

    let trained = winner.fit(&train_records, &train_targets, n_classes)?;
    let test_pred = trained.predict(&test_records)?;
    let test_report = ClassificationReport::new(&test_targets, &test_pred, label_encoder.classes());
    tracing::info!("Test accuracy: {:.4}", test_report.accuracy);

    Ok(TrainingOutcome {
        mode: config.mode,
        pipeline: trained,
        label_encoder,
        cv_results,
        best,
        test_report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(model: &str, mean_f1: f64) -> CvResult {
        CvResult {
            model: model.to_string(),
            folds: Vec::new(),
            mean_f1,
            mean_accuracy: 0.0,
        }
    }

    #[test]
    fn best_requires_strict_improvement() {
        let results = vec![result("a", 0.7), result("b", 0.9), result("c", 0.9)];
        assert_eq!(select_best(&results), Some(1));
    }

    #[test]
    fn zero_scores_still_select_a_model() {
        let results = vec![result("a", 0.0), result("b", 0.0)];
        assert_eq!(select_best(&results), Some(0));
        assert_eq!(select_best(&[]), None);
    }
}
