//! Prediction service facade
//!
//! Ties the registry, preprocessor and observability together. Every request
//! follows the same path: validate the model name, check the batch size,
//! resolve the model, project to canonical order, standardize, classify.

use crate::error::{PipelineError, PipelineResult};
use crate::health::HealthResponse;
use crate::models::{validate_model_name, FeatureVector, ModelInfo, ModelName, PredictionResult};
use crate::observability::{Endpoint, ServiceMetrics, StructuredLogger};
use crate::predictor::{classify, classify_batch, project_batch, Preprocessor};
use crate::registry::{LoadedModel, ModelRegistry};
use std::sync::Arc;
use std::time::Instant;

pub const SERVICE_NAME: &str = "fetal-health-api";

/// Entry point for classification requests
#[derive(Clone)]
pub struct PredictionService {
    registry: Arc<ModelRegistry>,
    preprocessor: Arc<Preprocessor>,
    metrics: ServiceMetrics,
    logger: StructuredLogger,
}

impl PredictionService {
    pub fn new(registry: Arc<ModelRegistry>, preprocessor: Preprocessor) -> Self {
        Self {
            registry,
            preprocessor: Arc::new(preprocessor),
            metrics: ServiceMetrics::new(),
            logger: StructuredLogger::new(SERVICE_NAME),
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    pub fn logger(&self) -> &StructuredLogger {
        &self.logger
    }

    /// Classify one feature vector
    pub fn predict(
        &self,
        features: &FeatureVector,
        model_name: Option<&str>,
    ) -> PipelineResult<PredictionResult> {
        let start = Instant::now();
        let outcome = validate_model_name(model_name)
            .and_then(|name| self.resolve(name))
            .and_then(|model| {
                let rows = self
                    .preprocessor
                    .standardize(&project_batch(std::slice::from_ref(features)));
                classify(&model, &rows[0])
            });
        let elapsed = start.elapsed();
        self.metrics
            .observe_latency(Endpoint::Single, elapsed.as_secs_f64());

        match &outcome {
            Ok(result) => {
                self.metrics
                    .inc_prediction(result.model_used, result.health_status);
                self.logger.log_prediction(
                    result.model_used,
                    result.health_status,
                    result.confidence,
                    elapsed.as_secs_f64() * 1000.0,
                );
            }
            Err(e) => self.record_failure(e),
        }
        outcome
    }

    /// Classify a batch; result `i` corresponds to `features[i]`
    pub fn predict_batch(
        &self,
        features: &[FeatureVector],
        model_name: Option<&str>,
    ) -> PipelineResult<Vec<PredictionResult>> {
        let start = Instant::now();
        let outcome = validate_model_name(model_name).and_then(|name| {
            crate::predictor::check_batch_size(features.len())?;
            let model = self.resolve(name)?;
            let rows = self.preprocessor.standardize(&project_batch(features));
            classify_batch(&model, &rows)
        });
        let elapsed = start.elapsed();
        self.metrics
            .observe_latency(Endpoint::Batch, elapsed.as_secs_f64());

        match &outcome {
            Ok(results) => {
                self.metrics.observe_batch_size(results.len());
                for result in results {
                    self.metrics
                        .inc_prediction(result.model_used, result.health_status);
                }
                if let Some(first) = results.first() {
                    self.logger.log_batch(
                        first.model_used,
                        results.len(),
                        elapsed.as_secs_f64() * 1000.0,
                    );
                }
            }
            Err(e) => self.record_failure(e),
        }
        outcome
    }

    /// Report health after resolving every registered model, so slots that
    /// were never requested count by whether they can load
    pub fn health(&self) -> HealthResponse {
        self.preload();
        HealthResponse::from_registry(&self.registry)
    }

    pub fn models(&self) -> Vec<ModelInfo> {
        self.registry.model_info()
    }

    /// Eagerly load every registered model, returning the failures
    pub fn preload(&self) -> Vec<(ModelName, PipelineError)> {
        let failures = self.registry.preload();
        self.metrics
            .set_models_loaded(self.registry.list_loaded().len());
        failures
    }

    fn resolve(&self, name: ModelName) -> PipelineResult<Arc<LoadedModel>> {
        let model = self.registry.resolve(name);
        self.metrics
            .set_models_loaded(self.registry.list_loaded().len());
        model
    }

    fn record_failure(&self, error: &PipelineError) {
        self.metrics.inc_error(error.kind());
        self.logger.log_failure(error.kind(), &error.to_string());
    }
}
