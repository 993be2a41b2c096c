//! Decoding of raw model outputs
//!
//! Maps numeric class codes to health labels and derives a confidence score
//! from class probabilities.

use crate::models::HealthStatus;

/// Decode a numeric class code. Codes outside the known set are `Unknown`.
pub fn decode_status(code: f64) -> HealthStatus {
    if code == 1.0 {
        HealthStatus::Normal
    } else if code == 2.0 {
        HealthStatus::Suspect
    } else if code == 3.0 {
        HealthStatus::Pathological
    } else {
        HealthStatus::Unknown
    }
}

/// Confidence is the largest class probability, clamped to [0, 1].
///
/// Returns `None` when the model exposes no probabilities or none of them is
/// finite.
pub fn confidence_from(probabilities: Option<&[f64]>) -> Option<f64> {
    probabilities?
        .iter()
        .copied()
        .filter(|p| p.is_finite())
        .reduce(f64::max)
        .map(|p| p.clamp(0.0, 1.0))
}
