//! Service configuration
//!
//! Sources, lowest precedence first: built-in defaults, an optional file named
//! by `FETAL_CONFIG`, then `FETAL_*` environment variables.

use anyhow::{Context, Result};
use ctg_core::predictor::{Preprocessor, StandardizationPolicy, StandardizationStats};
use ctg_core::{ModelName, ModelSpec};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "FETAL";
const CONFIG_FILE_VAR: &str = "FETAL_CONFIG";
const SCALER_FILE_NAME: &str = "scaler.json";

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// HTTP listen port
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Directory holding the model artifacts
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,

    #[serde(default)]
    pub standardization: StandardizationPolicy,

    /// Scaler statistics; defaults to `<models_dir>/scaler.json`
    #[serde(default)]
    pub scaler_path: Option<PathBuf>,

    /// Load every model at startup instead of on first use
    #[serde(default = "default_eager_load")]
    pub eager_load: bool,

    #[serde(default)]
    pub decision_tree_sha256: Option<String>,

    #[serde(default)]
    pub gradient_boosting_sha256: Option<String>,
}

fn default_api_port() -> u16 {
    8000
}

fn default_models_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_eager_load() -> bool {
    true
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            models_dir: default_models_dir(),
            standardization: StandardizationPolicy::default(),
            scaler_path: None,
            eager_load: default_eager_load(),
            decision_tree_sha256: None,
            gradient_boosting_sha256: None,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from the process environment and optional config file
    pub fn load() -> Result<Self> {
        let file = std::env::var_os(CONFIG_FILE_VAR).map(PathBuf::from);
        Self::load_from(file.as_deref(), None)
    }

    /// Load from an optional file plus environment variables. `env` replaces
    /// the process environment when given.
    pub fn load_from(file: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let environment = config::Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .source(env);

        let config = builder
            .add_source(environment)
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.scaler_path
            .clone()
            .unwrap_or_else(|| self.models_dir.join(SCALER_FILE_NAME))
    }

    fn expected_sha256(&self, name: ModelName) -> Option<&String> {
        match name {
            ModelName::DecisionTree => self.decision_tree_sha256.as_ref(),
            ModelName::GradientBoosting => self.gradient_boosting_sha256.as_ref(),
        }
    }

    /// Artifact locations for every known model
    pub fn model_specs(&self) -> Vec<ModelSpec> {
        ModelName::ALL
            .iter()
            .map(|name| {
                let spec = ModelSpec::in_dir(*name, &self.models_dir);
                match self.expected_sha256(*name) {
                    Some(sha) => spec.with_checksum(sha.clone()),
                    None => spec,
                }
            })
            .collect()
    }

    /// Build the preprocessor for the configured standardization policy
    pub fn build_preprocessor(&self) -> Result<Preprocessor> {
        match self.standardization {
            StandardizationPolicy::Training => {
                let path = self.scaler_path();
                let stats = StandardizationStats::from_json_file(&path)?;
                Preprocessor::with_training_stats(stats)
                    .with_context(|| format!("Invalid scaler statistics in {:?}", path))
            }
            StandardizationPolicy::Batch => Ok(Preprocessor::BatchRelative),
        }
    }
}
