//! HTTP API for classification, health checks and Prometheus metrics

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use ctg_core::{
    health::ComponentStatus, render_metrics, BatchPredictionRequest, BatchPredictionResponse,
    ErrorResponse, PipelineError, PredictionRequest, PredictionService,
};
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: PredictionService,
}

impl AppState {
    pub fn new(service: PredictionService) -> Self {
        Self { service }
    }
}

/// Error returned by handlers, rendered as `{"error": kind, "detail": message}`
#[derive(Debug)]
pub enum ApiError {
    Pipeline(PipelineError),
    /// Request body could not be decoded
    Rejected(String),
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Pipeline(PipelineError::Validation(_)) | ApiError::Rejected(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Pipeline(PipelineError::ModelNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Pipeline(PipelineError::ModelLoadFailure { .. }) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Pipeline(PipelineError::InferenceFailure { .. }) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Pipeline(e) => e.kind(),
            ApiError::Rejected(_) => "validation_error",
            ApiError::Internal(_) => "internal_error",
        }
    }

    fn detail(&self) -> String {
        match self {
            ApiError::Pipeline(e) => e.to_string(),
            ApiError::Rejected(detail) | ApiError::Internal(detail) => detail.clone(),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        ApiError::Pipeline(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.kind().to_string(),
            detail: self.detail(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

/// Run a blocking pipeline call off the async executor
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, PipelineError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            error!(error = %e, "Prediction task failed");
            ApiError::Internal(format!("prediction task failed: {}", e))
        })?
        .map_err(ApiError::from)
}

/// Health check response - returns 200 if any model is usable, 503 otherwise
async fn health(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let service = state.service.clone();
    // May load models that were never requested
    let health = run_blocking(move || Ok(service.health())).await?;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Degraded => StatusCode::OK, // Still operational
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    Ok((status_code, Json(health)))
}

async fn models(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.service.models()))
}

async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let service = state.service.clone();

    let result = run_blocking(move || {
        service.predict(&request.features, request.model_name.as_deref())
    })
    .await?;

    Ok((StatusCode::OK, Json(result)))
}

async fn predict_batch(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BatchPredictionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let service = state.service.clone();

    let predictions = run_blocking(move || {
        service.predict_batch(&request.features_list, request.model_name.as_deref())
    })
    .await?;

    Ok((StatusCode::OK, Json(BatchPredictionResponse { predictions })))
}

/// Prometheus metrics endpoint
async fn metrics() -> Result<impl IntoResponse, ApiError> {
    let body = render_metrics().map_err(|e| ApiError::Internal(format!("{:#}", e)))?;

    Ok((
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        body,
    ))
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/models", get(models))
        .route("/predict", post(predict))
        .route("/predict/batch", post(predict_batch))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server, returning once `shutdown` resolves and in-flight
/// requests have finished
pub async fn serve(
    port: u16,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
