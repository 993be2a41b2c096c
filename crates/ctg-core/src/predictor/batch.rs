//! Batch classification
//!
//! Items are classified one at a time, in input order. A batch is
//! all-or-nothing: the first failing item aborts the call, so callers never
//! see a result list shorter than their input.

use super::classify::classify;
use crate::error::{PipelineError, PipelineResult};
use crate::models::{FeatureRow, HealthStatus, PredictionResult};
use crate::registry::LoadedModel;
use serde::{Deserialize, Serialize};

/// Smallest accepted batch
pub const MIN_BATCH_SIZE: usize = 1;

/// Reject batches below the minimum size
pub(crate) fn check_batch_size(len: usize) -> PipelineResult<()> {
    if len < MIN_BATCH_SIZE {
        return Err(PipelineError::Validation(format!(
            "features_list must contain at least {} item",
            MIN_BATCH_SIZE
        )));
    }
    Ok(())
}

/// Classify every row; result `i` corresponds to row `i`
pub fn classify_batch(
    model: &LoadedModel,
    rows: &[FeatureRow],
) -> PipelineResult<Vec<PredictionResult>> {
    check_batch_size(rows.len())?;

    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            classify(model, row).map_err(|e| match e {
                PipelineError::InferenceFailure { model, reason } => {
                    PipelineError::InferenceFailure {
                        model,
                        reason: format!("item {}: {}", index, reason),
                    }
                }
                other => other,
            })
        })
        .collect()
}

/// Count of one label within a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelSummary {
    pub health_status: HealthStatus,
    pub count: usize,
    pub percentage: f64,
}

/// Per-label counts and percentages, in Normal/Suspect/Pathological/Unknown
/// order. Labels that do not occur are omitted.
pub fn summarize(results: &[PredictionResult]) -> Vec<LabelSummary> {
    if results.is_empty() {
        return Vec::new();
    }
    let total = results.len() as f64;

    HealthStatus::ALL
        .iter()
        .filter_map(|status| {
            let count = results
                .iter()
                .filter(|r| r.health_status == *status)
                .count();
            (count > 0).then(|| LabelSummary {
                health_status: *status,
                count,
                percentage: count as f64 / total * 100.0,
            })
        })
        .collect()
}
