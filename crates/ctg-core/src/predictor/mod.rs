//! ML prediction engine

mod batch;
mod classify;
mod features;
mod inference;
mod output;
mod preprocess;

pub(crate) use batch::check_batch_size;
pub use batch::{classify_batch, summarize, LabelSummary, MIN_BATCH_SIZE};
pub use classify::classify;
pub use features::{project_batch, to_ordered_sequence, ACTIVE_EXEMPLAR, NORMAL_EXEMPLAR};
pub use inference::{OnnxClassifier, OnnxLoader};
pub use output::{confidence_from, decode_status};
pub use preprocess::{Preprocessor, StandardizationPolicy, StandardizationStats};

use anyhow::Result;

/// Raw output of one model invocation
#[derive(Debug, Clone, PartialEq)]
pub struct RawPrediction {
    /// Predicted class code as produced by the model
    pub code: f64,
    /// Per-class probabilities, when the model exposes them
    pub probabilities: Option<Vec<f64>>,
}

/// Trait for classifier implementations.
///
/// Each artifact format is an adapter implementing this trait, so the
/// pipeline never depends on a specific serialization scheme.
pub trait Classifier: Send + Sync {
    /// Classify one standardized row in canonical column order
    fn predict(&self, row: &[f64]) -> Result<RawPrediction>;

    /// Whether `predict` fills in class probabilities
    fn has_probabilities(&self) -> bool;
}
