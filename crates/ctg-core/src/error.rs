//! Error taxonomy of the prediction pipeline

use thiserror::Error;

/// Errors surfaced by the prediction pipeline.
///
/// None of these are retried inside the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Bad request content: unknown model name, empty batch, malformed vector
    #[error("{0}")]
    Validation(String),

    /// The name is well formed but no artifact is registered for it
    #[error("model '{0}' is not registered")]
    ModelNotFound(String),

    /// The artifact could not be read or deserialized. Cached for the
    /// lifetime of the registry.
    #[error("model '{model}' failed to load: {reason}")]
    ModelLoadFailure { model: String, reason: String },

    /// The model itself raised during prediction
    #[error("inference with model '{model}' failed: {reason}")]
    InferenceFailure { model: String, reason: String },
}

impl PipelineError {
    /// Stable machine readable kind, used in HTTP bodies and metric labels
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Validation(_) => "validation_error",
            PipelineError::ModelNotFound(_) => "model_not_found",
            PipelineError::ModelLoadFailure { .. } => "model_load_failure",
            PipelineError::InferenceFailure { .. } => "inference_failure",
        }
    }

    pub(crate) fn inference(model: impl ToString, cause: &anyhow::Error) -> Self {
        PipelineError::InferenceFailure {
            model: model.to_string(),
            reason: format!("{:#}", cause),
        }
    }
}

/// Result alias used throughout the pipeline
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_are_stable() {
        assert_eq!(PipelineError::Validation("x".into()).kind(), "validation_error");
        assert_eq!(PipelineError::ModelNotFound("x".into()).kind(), "model_not_found");
        assert_eq!(
            PipelineError::ModelLoadFailure {
                model: "x".into(),
                reason: "y".into()
            }
            .kind(),
            "model_load_failure"
        );
        assert_eq!(
            PipelineError::InferenceFailure {
                model: "x".into(),
                reason: "y".into()
            }
            .kind(),
            "inference_failure"
        );
    }

    #[test]
    fn test_inference_keeps_cause_chain() {
        let cause = anyhow::anyhow!("shape mismatch").context("Failed to run model");
        let err = PipelineError::inference("decision_tree", &cause);
        let text = err.to_string();
        assert!(text.contains("decision_tree"));
        assert!(text.contains("Failed to run model"));
        assert!(text.contains("shape mismatch"));
    }
}
