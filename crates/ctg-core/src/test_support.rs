//! Fake classifiers shared by unit tests

use crate::models::ModelName;
use crate::predictor::{Classifier, RawPrediction};
use crate::registry::LoadedModel;
use anyhow::Result;

/// Returns a fixed code, with optional probabilities
pub struct FixedClassifier {
    pub code: f64,
    pub probabilities: Option<Vec<f64>>,
}

impl Classifier for FixedClassifier {
    fn predict(&self, _row: &[f64]) -> Result<RawPrediction> {
        Ok(RawPrediction {
            code: self.code,
            probabilities: self.probabilities.clone(),
        })
    }

    fn has_probabilities(&self) -> bool {
        self.probabilities.is_some()
    }
}

/// Echoes the first column back as the class code
pub struct EchoClassifier;

impl Classifier for EchoClassifier {
    fn predict(&self, row: &[f64]) -> Result<RawPrediction> {
        Ok(RawPrediction {
            code: row[0],
            probabilities: None,
        })
    }

    fn has_probabilities(&self) -> bool {
        false
    }
}

/// Fails whenever the first column is negative
pub struct FailOnNegative;

impl Classifier for FailOnNegative {
    fn predict(&self, row: &[f64]) -> Result<RawPrediction> {
        if row[0] < 0.0 {
            anyhow::bail!("internal numeric error");
        }
        Ok(RawPrediction {
            code: 1.0,
            probabilities: Some(vec![0.9, 0.05, 0.05]),
        })
    }

    fn has_probabilities(&self) -> bool {
        true
    }
}

pub fn model(name: ModelName, classifier: impl Classifier + 'static) -> LoadedModel {
    LoadedModel::in_memory(name, Box::new(classifier))
}
