//! Standardization of feature rows before inference
//!
//! Two policies are supported:
//! - `training`: reuse the mean/scale persisted from the training-time scaler.
//!   A row's standardized value never depends on the rest of the batch.
//! - `batch`: recompute per-column mean and population standard deviation
//!   across the rows being processed.
//!
//! In both policies a column whose scale is zero or not a positive finite
//! number is left unscaled, i.e. the value becomes `x - mean`. Under the
//! `batch` policy a single row is zero-variance in every column, so it
//! standardizes to all zeros.

use crate::models::{FeatureRow, NUM_FEATURES};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Standardization policy selected by configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardizationPolicy {
    #[default]
    Training,
    Batch,
}

impl StandardizationPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            StandardizationPolicy::Training => "training",
            StandardizationPolicy::Batch => "batch",
        }
    }
}

/// Per-column statistics of a fitted standard scaler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardizationStats {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardizationStats {
    /// Fit statistics on a set of rows (population standard deviation)
    pub fn fit(rows: &[FeatureRow]) -> Self {
        if rows.is_empty() {
            return Self {
                mean: vec![0.0; NUM_FEATURES],
                scale: vec![1.0; NUM_FEATURES],
            };
        }

        let n = rows.len() as f64;
        let mut mean = vec![0.0; NUM_FEATURES];
        for row in rows {
            for (acc, value) in mean.iter_mut().zip(row.iter()) {
                *acc += value;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut scale = vec![0.0; NUM_FEATURES];
        for row in rows {
            for ((acc, value), m) in scale.iter_mut().zip(row.iter()).zip(mean.iter()) {
                *acc += (value - m).powi(2);
            }
        }
        scale.iter_mut().for_each(|s| *s = (*s / n).sqrt());

        Self { mean, scale }
    }

    /// Load statistics exported from the training pipeline as
    /// `{"mean": [...], "scale": [...]}`
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scaler statistics {:?}", path))?;
        let stats: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse scaler statistics {:?}", path))?;
        stats.validate()?;
        Ok(stats)
    }

    /// Check that both arrays cover every feature column
    pub fn validate(&self) -> Result<()> {
        if self.mean.len() != NUM_FEATURES || self.scale.len() != NUM_FEATURES {
            anyhow::bail!(
                "Scaler statistics have {} means and {} scales, expected {}",
                self.mean.len(),
                self.scale.len(),
                NUM_FEATURES
            );
        }
        if self.mean.iter().any(|m| !m.is_finite()) {
            anyhow::bail!("Scaler statistics contain a non-finite mean");
        }
        Ok(())
    }

    fn apply(&self, row: &FeatureRow) -> FeatureRow {
        std::array::from_fn(|j| (row[j] - self.mean[j]) / effective_scale(self.scale[j]))
    }
}

/// Zero-variance fallback: leave the column unscaled
fn effective_scale(scale: f64) -> f64 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}

/// Applies standardization to projected feature rows
#[derive(Debug, Clone)]
pub enum Preprocessor {
    /// Reuse training-time statistics
    Training(StandardizationStats),
    /// Recompute statistics across each call's rows
    BatchRelative,
}

impl Preprocessor {
    /// Build a preprocessor using persisted training statistics
    pub fn with_training_stats(stats: StandardizationStats) -> Result<Self> {
        stats.validate()?;
        Ok(Preprocessor::Training(stats))
    }

    pub fn policy(&self) -> StandardizationPolicy {
        match self {
            Preprocessor::Training(_) => StandardizationPolicy::Training,
            Preprocessor::BatchRelative => StandardizationPolicy::Batch,
        }
    }

    /// Standardize a batch of rows, preserving order
    pub fn standardize(&self, rows: &[FeatureRow]) -> Vec<FeatureRow> {
        match self {
            Preprocessor::Training(stats) => rows.iter().map(|row| stats.apply(row)).collect(),
            Preprocessor::BatchRelative => {
                let stats = StandardizationStats::fit(rows);
                rows.iter().map(|row| stats.apply(row)).collect()
            }
        }
    }
}
