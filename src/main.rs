/// Веб-сервис диагностики уровня ожирения

use anyhow::Context;
use clap::Parser;

use obesity_dx::config::ServerConfig;
use obesity_dx::{build_router, AppState, Predictor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Инициализация логирования
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::parse();

    // Без модели сервис всё равно стартует и показывает ошибку на странице
    let state = match Predictor::load(&config.models_dir) {
        Ok(predictor) => AppState::ready(predictor),
        Err(e) => {
            tracing::error!("Failed to load model artifacts: {}", e);
            AppState::unavailable(e)
        }
    };

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!("Server listening on http://{}", config.bind);
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
