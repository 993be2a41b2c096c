//! Single-vector classification

use super::output::{confidence_from, decode_status};
use crate::error::{PipelineError, PipelineResult};
use crate::models::{FeatureRow, PredictionResult};
use crate::registry::LoadedModel;

/// Invoke `model` on one standardized row and decode the result
pub fn classify(model: &LoadedModel, row: &FeatureRow) -> PipelineResult<PredictionResult> {
    let raw = model
        .predict(row)
        .map_err(|e| PipelineError::inference(model.name(), &e))?;

    Ok(PredictionResult {
        prediction_code: raw.code,
        health_status: decode_status(raw.code),
        model_used: model.name(),
        confidence: confidence_from(raw.probabilities.as_deref()),
    })
}
