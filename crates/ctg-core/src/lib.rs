//! Fetal health classification library
//!
//! This crate provides the core functionality for:
//! - Canonical CTG feature ordering
//! - Standardization and ML-based classification
//! - Model registry with load-once caching
//! - Health checks and observability

pub mod error;
pub mod health;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod registry;
pub mod service;

#[cfg(test)]
mod test_support;

pub use error::{PipelineError, PipelineResult};
pub use health::{ComponentStatus, HealthResponse};
pub use models::*;
pub use observability::{render_metrics, ServiceMetrics, StructuredLogger};
pub use registry::{LoadedModel, ModelLoader, ModelRegistry, ModelSpec};
pub use service::PredictionService;
