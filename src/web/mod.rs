//! HTTP сервис: форма диагностики и JSON API

pub mod form;

use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, State},
    http::{Method, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Form, Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::MlError;
use crate::predictor::Predictor;
use crate::types::PredictionOutput;

pub use form::{render_page, Notice, PatientForm};

#[derive(Clone, Default)]
pub struct AppState {
    predictor: Option<Arc<Predictor>>,
    load_error: Option<String>,
}

impl AppState {
    pub fn ready(predictor: Predictor) -> Self {
        Self {
            predictor: Some(Arc::new(predictor)),
            load_error: None,
        }
    }

    /// Сервис без модели: страницы показывают ошибку, API отвечает 503.
    pub fn unavailable(error: impl ToString) -> Self {
        Self {
            predictor: None,
            load_error: Some(error.to_string()),
        }
    }

    pub fn model_loaded(&self) -> bool {
        self.predictor.is_some()
    }

    fn unavailable_message(&self) -> String {
        self.load_error
            .clone()
            .unwrap_or_else(|| "model is not loaded".to_string())
    }
}

/// Ошибки JSON API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Prediction error: {0}")]
    Prediction(#[from] MlError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Prediction(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict_form))
        .route("/api/predict", post(predict_api))
        .route("/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> Html<String> {
    let notice = (!state.model_loaded()).then(|| Notice::ModelUnavailable(state.unavailable_message()));
    Html(render_page(&PatientForm::default(), notice.as_ref()))
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "model_loaded": state.model_loaded() }))
}

fn run_prediction(state: &AppState, form: &PatientForm) -> Result<PredictionOutput, ApiError> {
    let record = form
        .validate()
        .map_err(|e| ApiError::InvalidInput(e.to_string()))?;
    let predictor = state
        .predictor
        .as_ref()
        .ok_or_else(|| ApiError::ModelUnavailable(state.unavailable_message()))?;

    let output = predictor.predict(&record)?;
    tracing::info!("Predicted {} with {}", output.label, output.model);
    Ok(output)
}

async fn predict_form(
    State(state): State<AppState>,
    form: Result<Form<PatientForm>, FormRejection>,
) -> (StatusCode, Html<String>) {
    // Неразбираемое тело формы показывается на той же странице, что и ошибки диапазонов
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::debug!("Rejected form body: {}", rejection);
            let notice = Notice::InvalidInput(rejection.body_text());
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(render_page(&PatientForm::default(), Some(&notice))),
            );
        }
    };

    let (status, notice) = match run_prediction(&state, &form) {
        Ok(output) => (StatusCode::OK, Notice::Prediction(output)),
        Err(ApiError::InvalidInput(message)) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Notice::InvalidInput(message))
        }
        Err(ApiError::ModelUnavailable(message)) => {
            (StatusCode::SERVICE_UNAVAILABLE, Notice::ModelUnavailable(message))
        }
        Err(ApiError::Prediction(e)) => {
            tracing::error!("Prediction failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Notice::Failure(e.to_string()))
        }
    };

    (status, Html(render_page(&form, Some(&notice))))
}

async fn predict_api(
    State(state): State<AppState>,
    Json(form): Json<PatientForm>,
) -> Result<Json<PredictionOutput>, ApiError> {
    run_prediction(&state, &form).map(Json)
}
