//! Конфигурация бинарников: аргументы командной строки и переменные окружения

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::data::synthetic::{DEFAULT_SAMPLES, DEFAULT_SEED};
use crate::training::TrainingMode;

/// Веб-сервис с формой диагностики.
#[derive(Debug, Clone, Parser)]
#[command(name = "obesity-dx-server", version, about)]
pub struct ServerConfig {
    /// Адрес для входящих соединений
    #[arg(long, env = "OBESITY_DX_BIND", default_value = "0.0.0.0:8000")]
    pub bind: SocketAddr,

    /// Каталог с обученными артефактами
    #[arg(long, env = "OBESITY_DX_MODELS_DIR", default_value = "models")]
    pub models_dir: PathBuf,
}

/// Обучение и отбор модели.
#[derive(Debug, Clone, Parser)]
#[command(name = "obesity-dx-train", version, about)]
pub struct TrainConfig {
    /// CSV с колонкой NObeyesdad
    #[arg(long, env = "OBESITY_DX_DATA", default_value = "data/obesity.csv")]
    pub data: PathBuf,

    #[arg(long, env = "OBESITY_DX_MODELS_DIR", default_value = "models")]
    pub models_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = TrainingMode::Diagnostic)]
    pub mode: TrainingMode,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Доля тестовой выборки
    #[arg(long, default_value_t = 0.2)]
    pub test_size: f64,

    /// Количество фолдов кросс-валидации
    #[arg(long, default_value_t = 5)]
    pub folds: usize,
}

/// Генерация синтетического датасета.
#[derive(Debug, Clone, Parser)]
#[command(name = "obesity-dx-generate", version, about)]
pub struct GenerateConfig {
    #[arg(long, env = "OBESITY_DX_DATA", default_value = "data/obesity.csv")]
    pub output: PathBuf,

    #[arg(long, default_value_t = DEFAULT_SAMPLES)]
    pub samples: usize,

    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_defaults() {
        let config = ServerConfig::parse_from(["obesity-dx-server"]);
        assert_eq!(config.bind.port(), 8000);
        assert_eq!(config.models_dir, PathBuf::from("models"));
    }

    #[test]
    fn train_flags() {
        let config = TrainConfig::parse_from([
            "obesity-dx-train",
            "--mode",
            "preventive",
            "--folds",
            "3",
            "--data",
            "x.csv",
        ]);
        assert_eq!(config.mode, TrainingMode::Preventive);
        assert_eq!(config.folds, 3);
        assert_eq!(config.data, PathBuf::from("x.csv"));
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn clap_definitions_are_consistent() {
        use clap::CommandFactory;
        ServerConfig::command().debug_assert();
        TrainConfig::command().debug_assert();
        GenerateConfig::command().debug_assert();
    }
}
