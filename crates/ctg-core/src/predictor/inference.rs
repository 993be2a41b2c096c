//! ONNX inference using tract
//!
//! Runs scikit-learn classifiers exported to ONNX (with `zipmap=False`).
//! Output 0 holds the predicted label; an optional output 1 holds the
//! `[1, n_classes]` probability tensor.

use super::{Classifier, RawPrediction};
use crate::models::NUM_FEATURES;
use crate::registry::{ModelLoader, ModelSpec};
use anyhow::{Context, Result};
use std::time::Instant;
use tract_onnx::prelude::*;
use tracing::{debug, warn};

/// Maximum inference latency before warning
const MAX_INFERENCE_MS: u128 = 5;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX-based classifier using tract for lightweight inference
pub struct OnnxClassifier {
    plan: TractModel,
    output_count: usize,
}

impl OnnxClassifier {
    /// Parse and optimize an ONNX graph from bytes
    pub fn from_bytes(model_bytes: &[u8]) -> Result<Self> {
        let optimized = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .context("Failed to parse ONNX model")?
            .with_input_fact(0, f32::fact([1, NUM_FEATURES]).into())
            .context("Failed to set input shape")?
            .into_optimized()
            .context("Failed to optimize model")?;

        let output_count = optimized.outputs.len();
        if output_count == 0 {
            anyhow::bail!("ONNX model declares no outputs");
        }

        let plan = optimized
            .into_runnable()
            .context("Failed to create runnable model")?;

        Ok(Self { plan, output_count })
    }

    /// Convert a standardized row to the model's f32 input tensor
    fn row_to_tensor(row: &[f64]) -> Result<Tensor> {
        if row.len() != NUM_FEATURES {
            anyhow::bail!("Input has {} features, expected {}", row.len(), NUM_FEATURES);
        }
        let data: Vec<f32> = row.iter().map(|v| *v as f32).collect();
        let array = tract_ndarray::Array2::from_shape_vec((1, NUM_FEATURES), data)
            .context("Failed to shape input tensor")?;
        Ok(array.into())
    }
}

/// Read every element of an output tensor as f64, whatever its numeric type
fn tensor_values(tensor: &Tensor) -> Result<Vec<f64>> {
    let cast = tensor
        .cast_to::<f64>()
        .context("Model output is not numeric")?;
    Ok(cast.as_slice::<f64>()?.to_vec())
}

impl Classifier for OnnxClassifier {
    fn predict(&self, row: &[f64]) -> Result<RawPrediction> {
        let start = Instant::now();
        let input = Self::row_to_tensor(row)?;

        let outputs = self.plan.run(tvec!(input.into()))?;
        let label = outputs.first().context("No label output from model")?;
        let code = *tensor_values(label)?
            .first()
            .context("Label output is empty")?;

        let probabilities = outputs
            .get(1)
            .map(|probs| tensor_values(probs))
            .transpose()?;

        let elapsed = start.elapsed();
        if elapsed.as_millis() > MAX_INFERENCE_MS {
            warn!(
                elapsed_ms = elapsed.as_millis(),
                "Inference exceeded {}ms target", MAX_INFERENCE_MS
            );
        } else {
            debug!(elapsed_us = elapsed.as_micros(), "Inference completed");
        }

        Ok(RawPrediction { code, probabilities })
    }

    fn has_probabilities(&self) -> bool {
        self.output_count > 1
    }
}

/// Loads artifacts as ONNX graphs
#[derive(Debug, Default, Clone, Copy)]
pub struct OnnxLoader;

impl OnnxLoader {
    pub fn new() -> Self {
        Self
    }
}

impl ModelLoader for OnnxLoader {
    fn load(&self, spec: &ModelSpec, bytes: &[u8]) -> Result<Box<dyn Classifier>> {
        let classifier = OnnxClassifier::from_bytes(bytes)
            .with_context(|| format!("Failed to load {} from {:?}", spec.name, spec.file_path))?;
        Ok(Box::new(classifier))
    }
}
