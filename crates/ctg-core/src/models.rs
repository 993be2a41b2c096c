//! Core data models for the fetal health classifier

use crate::error::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of CTG features every model was trained on
pub const NUM_FEATURES: usize = 21;

/// A feature vector projected into canonical model order
pub type FeatureRow = [f64; NUM_FEATURES];

/// Declares the feature record, its field names and both projections from a
/// single field list, so the column order cannot drift between them.
macro_rules! ctg_features {
    ($( $(#[$doc:meta])* $field:ident ),+ $(,)?) => {
        /// Cardiotocography features for a single exam
        #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
        pub struct FeatureVector {
            $( $(#[$doc])* pub $field: f64, )+
        }

        /// Feature names in the column order used at training time.
        /// Changing this order is a breaking change for every model artifact.
        pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [$( stringify!($field) ),+];

        impl FeatureVector {
            /// Project into the canonical column order
            pub fn to_ordered_sequence(&self) -> FeatureRow {
                [$( self.$field ),+]
            }

            /// Rebuild a vector from a row in canonical column order
            pub fn from_ordered_sequence(row: FeatureRow) -> Self {
                let [$( $field ),+] = row;
                Self { $( $field ),+ }
            }
        }
    };
}

ctg_features! {
    /// Baseline fetal heart rate (beats per minute)
    baseline_value,
    /// Accelerations per second
    accelerations,
    /// Fetal movements per second
    fetal_movement,
    /// Uterine contractions per second
    uterine_contractions,
    /// Light decelerations per second
    light_decelerations,
    /// Severe decelerations per second
    severe_decelerations,
    /// Prolonged decelerations per second
    prolongued_decelerations,
    /// Percentage of time with abnormal short term variability
    abnormal_short_term_variability,
    mean_value_of_short_term_variability,
    /// Percentage of time with abnormal long term variability
    percentage_of_time_with_abnormal_long_term_variability,
    mean_value_of_long_term_variability,
    /// Width of the FHR histogram
    histogram_width,
    histogram_min,
    histogram_max,
    histogram_number_of_peaks,
    histogram_number_of_zeroes,
    histogram_mode,
    histogram_mean,
    histogram_median,
    histogram_variance,
    histogram_tendency,
}

/// Identifier of a pre-trained classifier
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ModelName {
    DecisionTree,
    #[default]
    GradientBoosting,
}

impl ModelName {
    /// Every model the service knows about
    pub const ALL: [ModelName; 2] = [ModelName::DecisionTree, ModelName::GradientBoosting];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelName::DecisionTree => "decision_tree",
            ModelName::GradientBoosting => "gradient_boosting",
        }
    }

    /// Algorithm family reported by `GET /models`
    pub fn algorithm(&self) -> &'static str {
        match self {
            ModelName::DecisionTree => "DecisionTreeClassifier",
            ModelName::GradientBoosting => "GradientBoostingClassifier",
        }
    }

    /// File name of the exported artifact inside the models directory
    pub fn artifact_file_name(&self) -> &'static str {
        match self {
            ModelName::DecisionTree => "decision_tree_model.onnx",
            ModelName::GradientBoosting => "gradient_boosting_model.onnx",
        }
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelName {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = ModelName::ALL.iter().map(ModelName::as_str).collect();
                PipelineError::Validation(format!(
                    "model_name must be one of [{}], got '{}'",
                    valid.join(", "),
                    s
                ))
            })
    }
}

/// Validate a requested model name.
///
/// This is the only place the closed set is checked; both the HTTP layer and
/// the prediction service go through it. A missing name selects the default
/// model.
pub fn validate_model_name(name: Option<&str>) -> PipelineResult<ModelName> {
    match name {
        None => Ok(ModelName::default()),
        Some(name) => name.parse(),
    }
}

/// Decoded fetal health class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthStatus {
    Normal,
    Suspect,
    Pathological,
    Unknown,
}

impl HealthStatus {
    /// Display order used in summaries
    pub const ALL: [HealthStatus; 4] = [
        HealthStatus::Normal,
        HealthStatus::Suspect,
        HealthStatus::Pathological,
        HealthStatus::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Normal => "Normal",
            HealthStatus::Suspect => "Suspect",
            HealthStatus::Pathological => "Pathological",
            HealthStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying one feature vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction_code: f64,
    pub health_status: HealthStatus,
    pub model_used: ModelName,
    /// Maximum class probability, `None` when the model has no probability output
    pub confidence: Option<f64>,
}

/// Body of `POST /predict`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub features: FeatureVector,
    #[serde(default)]
    pub model_name: Option<String>,
}

/// Body of `POST /predict/batch`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPredictionRequest {
    pub features_list: Vec<FeatureVector>,
    #[serde(default)]
    pub model_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPredictionResponse {
    pub predictions: Vec<PredictionResult>,
}

/// Entry of `GET /models`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: ModelName,
    #[serde(rename = "type")]
    pub model_type: String,
    pub loaded: bool,
    pub file_path: String,
}

/// Error body returned by the HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub detail: String,
}
