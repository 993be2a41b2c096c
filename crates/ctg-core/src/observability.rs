//! Observability infrastructure for the prediction service
//!
//! Provides:
//! - Prometheus metrics (request latency, outcomes, batch sizes, loaded models)
//! - Structured JSON logging with tracing

use crate::models::{HealthStatus, ModelName};
use prometheus::{
    register_histogram, register_histogram_vec, register_int_counter_vec, register_int_gauge,
    Encoder, Histogram, HistogramVec, IntCounterVec, IntGauge, TextEncoder,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for request latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

const BATCH_SIZE_BUCKETS: &[f64] = &[1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 1000.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ServiceMetricsInner> = OnceLock::new();

struct ServiceMetricsInner {
    prediction_latency_seconds: HistogramVec,
    predictions_total: IntCounterVec,
    prediction_errors_total: IntCounterVec,
    batch_size: Histogram,
    models_loaded: IntGauge,
}

impl ServiceMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram_vec!(
                "fetal_health_prediction_latency_seconds",
                "Time spent serving a prediction request",
                &["endpoint"],
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_total: register_int_counter_vec!(
                "fetal_health_predictions_total",
                "Total number of classified feature vectors",
                &["model", "health_status"]
            )
            .expect("Failed to register predictions_total"),

            prediction_errors_total: register_int_counter_vec!(
                "fetal_health_prediction_errors_total",
                "Total number of failed prediction requests",
                &["kind"]
            )
            .expect("Failed to register prediction_errors_total"),

            batch_size: register_histogram!(
                "fetal_health_batch_size",
                "Number of feature vectors per batch request",
                BATCH_SIZE_BUCKETS.to_vec()
            )
            .expect("Failed to register batch_size"),

            models_loaded: register_int_gauge!(
                "fetal_health_models_loaded",
                "Number of models currently loaded and usable"
            )
            .expect("Failed to register models_loaded"),
        }
    }
}

/// Request kind used as the latency label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Single,
    Batch,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Single => "predict",
            Endpoint::Batch => "predict_batch",
        }
    }
}

/// Service metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics instance; clones share the
/// same underlying metrics.
#[derive(Clone)]
pub struct ServiceMetrics {
    inner: &'static ServiceMetricsInner,
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceMetrics {
    /// Create a handle, registering the global metrics on first call
    pub fn new() -> Self {
        Self {
            inner: GLOBAL_METRICS.get_or_init(ServiceMetricsInner::new),
        }
    }

    pub fn observe_latency(&self, endpoint: Endpoint, duration_secs: f64) {
        self.inner
            .prediction_latency_seconds
            .with_label_values(&[endpoint.as_str()])
            .observe(duration_secs);
    }

    pub fn inc_prediction(&self, model: ModelName, status: HealthStatus) {
        self.inner
            .predictions_total
            .with_label_values(&[model.as_str(), status.as_str()])
            .inc();
    }

    pub fn inc_error(&self, kind: &str) {
        self.inner
            .prediction_errors_total
            .with_label_values(&[kind])
            .inc();
    }

    pub fn observe_batch_size(&self, size: usize) {
        self.inner.batch_size.observe(size as f64);
    }

    pub fn set_models_loaded(&self, count: usize) {
        self.inner.models_loaded.set(count as i64);
    }
}

/// Render the default registry in the Prometheus text format
pub fn render_metrics() -> anyhow::Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Structured logger for service events
///
/// Provides consistent JSON-formatted logging for requests and lifecycle
/// events.
#[derive(Clone)]
pub struct StructuredLogger {
    service_name: String,
}

impl StructuredLogger {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    /// Log a single prediction
    pub fn log_prediction(
        &self,
        model: ModelName,
        health_status: HealthStatus,
        confidence: Option<f64>,
        elapsed_ms: f64,
    ) {
        info!(
            event = "prediction_served",
            service = %self.service_name,
            model = %model,
            health_status = %health_status,
            confidence = ?confidence,
            elapsed_ms = elapsed_ms,
            "Served prediction"
        );
    }

    /// Log a batch prediction
    pub fn log_batch(&self, model: ModelName, size: usize, elapsed_ms: f64) {
        info!(
            event = "batch_served",
            service = %self.service_name,
            model = %model,
            batch_size = size,
            elapsed_ms = elapsed_ms,
            "Served batch prediction"
        );
    }

    /// Log a rejected or failed request
    pub fn log_failure(&self, kind: &str, detail: &str) {
        warn!(
            event = "prediction_failed",
            service = %self.service_name,
            kind = %kind,
            detail = %detail,
            "Prediction request failed"
        );
    }

    /// Log service startup
    pub fn log_startup(&self, version: &str, port: u16, models_loaded: usize) {
        info!(
            event = "service_started",
            service = %self.service_name,
            version = %version,
            port = port,
            models_loaded = models_loaded,
            "Fetal health service started"
        );
    }

    /// Log service shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            service = %self.service_name,
            reason = %reason,
            "Fetal health service shutting down"
        );
    }
}
