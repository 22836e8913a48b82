//! Общие помощники интеграционных тестов

#![allow(dead_code)]

use obesity_dx::data::generate;
use obesity_dx::models::{ForestParams, LogisticParams, ModelSpec, SvmParams};
use obesity_dx::{run_tournament, save_artifacts, TournamentConfig, TrainingMode};
use tempfile::TempDir;

/// Облегчённые кандидаты: тот же порядок, меньше итераций.
pub fn quick_candidates(seed: u64) -> Vec<ModelSpec> {
    vec![
        ModelSpec::LogisticRegression(LogisticParams {
            max_iter: 300,
            ..LogisticParams::default()
        }),
        ModelSpec::RandomForest(ForestParams {
            n_estimators: 15,
            seed,
            ..ForestParams::default()
        }),
        ModelSpec::Svm(SvmParams {
            n_components: 80,
            epochs: 10,
            seed,
            ..SvmParams::default()
        }),
    ]
}

pub fn quick_config(mode: TrainingMode) -> TournamentConfig {
    TournamentConfig {
        n_splits: 3,
        candidates: quick_candidates(42),
        ..TournamentConfig::new(mode)
    }
}

/// Обучает диагностическую модель на синтетике и сохраняет артефакты во временный каталог.
pub fn trained_models_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let dataset = generate(600, 7);
    let outcome = run_tournament(&dataset, &quick_config(TrainingMode::Diagnostic)).unwrap();
    save_artifacts(dir.path(), outcome).unwrap();
    dir
}
