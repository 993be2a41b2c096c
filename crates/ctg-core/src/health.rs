//! Service health reporting
//!
//! Health is derived from the model registry: the service is healthy when
//! every registered model is usable, degraded when only some are, and
//! unhealthy when none can serve predictions.

use crate::models::ModelName;
use crate::registry::ModelRegistry;
use serde::{Deserialize, Serialize};

/// Health status of the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    /// Every registered model is loaded
    Healthy,
    /// Some models failed to load
    Degraded,
    /// No model can serve predictions
    Unhealthy,
}

impl ComponentStatus {
    /// Returns true if at least one model can serve predictions
    pub fn is_operational(&self) -> bool {
        matches!(self, ComponentStatus::Healthy | ComponentStatus::Degraded)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentStatus::Healthy => "healthy",
            ComponentStatus::Degraded => "degraded",
            ComponentStatus::Unhealthy => "unhealthy",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ComponentStatus::Healthy => "All systems operational",
            ComponentStatus::Degraded => "Some models failed to load",
            ComponentStatus::Unhealthy => "No models loaded",
        }
    }
}

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub message: String,
    pub models_loaded: Vec<ModelName>,
}

impl HealthResponse {
    /// Compute overall status from loaded and registered counts
    pub fn compute_status(loaded: usize, registered: usize) -> ComponentStatus {
        if loaded == 0 {
            ComponentStatus::Unhealthy
        } else if loaded < registered {
            ComponentStatus::Degraded
        } else {
            ComponentStatus::Healthy
        }
    }

    pub fn from_registry(registry: &ModelRegistry) -> Self {
        let loaded = registry.list_loaded();
        let status = Self::compute_status(loaded.len(), registry.registered().len());
        Self {
            status,
            message: status.message().to_string(),
            models_loaded: loaded.into_iter().collect(),
        }
    }
}
