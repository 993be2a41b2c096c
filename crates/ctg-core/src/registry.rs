//! Model registry
//!
//! Loads each named artifact at most once and shares it read-only afterwards.
//! Every registered name has its own `OnceLock`, which is both the load guard
//! (concurrent first resolutions block on a single load) and the cache. A
//! failed load is cached as well: later resolutions get the same error
//! without touching the disk.

use crate::error::{PipelineError, PipelineResult};
use crate::models::{ModelInfo, ModelName};
use crate::predictor::{Classifier, RawPrediction};
use anyhow::Result;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

/// Turns artifact bytes into a usable classifier
pub trait ModelLoader: Send + Sync {
    fn load(&self, spec: &ModelSpec, bytes: &[u8]) -> Result<Box<dyn Classifier>>;
}

/// Where a model's artifact lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub name: ModelName,
    pub file_path: PathBuf,
    /// Expected hex SHA-256 of the artifact, checked before deserialization
    pub expected_sha256: Option<String>,
}

impl ModelSpec {
    /// Spec for the default artifact file name inside `dir`
    pub fn in_dir(name: ModelName, dir: &Path) -> Self {
        Self {
            name,
            file_path: dir.join(name.artifact_file_name()),
            expected_sha256: None,
        }
    }

    pub fn with_checksum(mut self, sha256: impl Into<String>) -> Self {
        self.expected_sha256 = Some(sha256.into());
        self
    }
}

/// A deserialized model bound to its name.
///
/// Immutable once built; callers only get to invoke it.
pub struct LoadedModel {
    name: ModelName,
    file_path: PathBuf,
    sha256: String,
    loaded_at: i64,
    classifier: Box<dyn Classifier>,
}

impl LoadedModel {
    pub fn name(&self) -> ModelName {
        self.name
    }

    /// Algorithm family label
    pub fn algorithm(&self) -> &'static str {
        self.name.algorithm()
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Hex SHA-256 of the artifact bytes
    pub fn sha256(&self) -> &str {
        &self.sha256
    }

    /// Unix timestamp of the load
    pub fn loaded_at(&self) -> i64 {
        self.loaded_at
    }

    pub fn has_probabilities(&self) -> bool {
        self.classifier.has_probabilities()
    }

    /// Run the classifier on one standardized row
    pub fn predict(&self, row: &[f64]) -> Result<RawPrediction> {
        self.classifier.predict(row)
    }

    #[cfg(test)]
    pub(crate) fn in_memory(name: ModelName, classifier: Box<dyn Classifier>) -> Self {
        Self {
            name,
            file_path: PathBuf::from(name.artifact_file_name()),
            sha256: String::new(),
            loaded_at: 0,
            classifier,
        }
    }
}

impl fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModel")
            .field("name", &self.name)
            .field("file_path", &self.file_path)
            .field("sha256", &self.sha256)
            .field("loaded_at", &self.loaded_at)
            .finish_non_exhaustive()
    }
}

struct Slot {
    spec: ModelSpec,
    cell: OnceLock<PipelineResult<Arc<LoadedModel>>>,
}

/// Registry of named models, loaded on first use or eagerly via [`ModelRegistry::preload`]
pub struct ModelRegistry {
    slots: BTreeMap<ModelName, Slot>,
    loader: Arc<dyn ModelLoader>,
}

impl ModelRegistry {
    /// Register the given artifacts. Nothing is read until resolution.
    pub fn new(specs: impl IntoIterator<Item = ModelSpec>, loader: Arc<dyn ModelLoader>) -> Self {
        let slots = specs
            .into_iter()
            .map(|spec| {
                (
                    spec.name,
                    Slot {
                        spec,
                        cell: OnceLock::new(),
                    },
                )
            })
            .collect();
        Self { slots, loader }
    }

    /// Register every known model under its default file name in `dir`
    pub fn from_dir(dir: &Path, loader: Arc<dyn ModelLoader>) -> Self {
        Self::new(
            ModelName::ALL.iter().map(|name| ModelSpec::in_dir(*name, dir)),
            loader,
        )
    }

    /// Resolve a model, loading it on first use
    pub fn resolve(&self, name: ModelName) -> PipelineResult<Arc<LoadedModel>> {
        let slot = self
            .slots
            .get(&name)
            .ok_or_else(|| PipelineError::ModelNotFound(name.to_string()))?;
        slot.cell.get_or_init(|| self.load_slot(&slot.spec)).clone()
    }

    /// Resolve by raw name; names outside the closed set are not found
    pub fn resolve_by_name(&self, name: &str) -> PipelineResult<Arc<LoadedModel>> {
        let name: ModelName = name
            .parse()
            .map_err(|_| PipelineError::ModelNotFound(name.to_string()))?;
        self.resolve(name)
    }

    /// Names of models that are loaded and usable
    pub fn list_loaded(&self) -> BTreeSet<ModelName> {
        self.slots
            .iter()
            .filter(|(_, slot)| matches!(slot.cell.get(), Some(Ok(_))))
            .map(|(name, _)| *name)
            .collect()
    }

    /// Names of every registered model, loaded or not
    pub fn registered(&self) -> BTreeSet<ModelName> {
        self.slots.keys().copied().collect()
    }

    /// Description of every registered model
    pub fn model_info(&self) -> Vec<ModelInfo> {
        self.slots
            .iter()
            .map(|(name, slot)| ModelInfo {
                name: *name,
                model_type: name.algorithm().to_string(),
                loaded: matches!(slot.cell.get(), Some(Ok(_))),
                file_path: slot.spec.file_path.display().to_string(),
            })
            .collect()
    }

    /// Eagerly resolve every registered model, returning the failures
    pub fn preload(&self) -> Vec<(ModelName, PipelineError)> {
        self.slots
            .keys()
            .filter_map(|name| self.resolve(*name).err().map(|e| (*name, e)))
            .collect()
    }

    fn load_slot(&self, spec: &ModelSpec) -> PipelineResult<Arc<LoadedModel>> {
        let load_failure = |reason: String| {
            warn!(
                event = "model_load_failed",
                model = %spec.name,
                file_path = ?spec.file_path,
                reason = %reason,
                "Model failed to load and will stay unavailable"
            );
            PipelineError::ModelLoadFailure {
                model: spec.name.to_string(),
                reason,
            }
        };

        let bytes = std::fs::read(&spec.file_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                load_failure(format!("model file not found: {}", spec.file_path.display()))
            } else {
                load_failure(format!(
                    "failed to read {}: {}",
                    spec.file_path.display(),
                    e
                ))
            }
        })?;

        let sha256 = hex::encode(Sha256::digest(&bytes));
        if let Some(expected) = &spec.expected_sha256 {
            if !expected.eq_ignore_ascii_case(&sha256) {
                return Err(load_failure(format!(
                    "checksum mismatch: expected {}, got {}",
                    expected, sha256
                )));
            }
        }

        let classifier = self
            .loader
            .load(spec, &bytes)
            .map_err(|e| load_failure(format!("{:#}", e)))?;

        info!(
            event = "model_loaded",
            model = %spec.name,
            algorithm = spec.name.algorithm(),
            file_path = ?spec.file_path,
            sha256 = %sha256,
            size_bytes = bytes.len(),
            probabilities = classifier.has_probabilities(),
            "Model loaded"
        );

        Ok(Arc::new(LoadedModel {
            name: spec.name,
            file_path: spec.file_path.clone(),
            sha256,
            loaded_at: chrono::Utc::now().timestamp(),
            classifier,
        }))
    }
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("registered", &self.registered())
            .field("loaded", &self.list_loaded())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ConstClassifier(f64);

    impl Classifier for ConstClassifier {
        fn predict(&self, _row: &[f64]) -> Result<RawPrediction> {
            Ok(RawPrediction {
                code: self.0,
                probabilities: None,
            })
        }

        fn has_probabilities(&self) -> bool {
            false
        }
    }

    /// Accepts any file whose content is "ok", counting calls
    #[derive(Default)]
    struct CountingLoader {
        calls: AtomicUsize,
    }

    impl ModelLoader for CountingLoader {
        fn load(&self, _spec: &ModelSpec, bytes: &[u8]) -> Result<Box<dyn Classifier>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if bytes != b"ok" {
                anyhow::bail!("corrupt artifact");
            }
            Ok(Box::new(ConstClassifier(1.0)))
        }
    }

    fn write_artifact(dir: &Path, name: ModelName, content: &[u8]) {
        std::fs::write(dir.join(name.artifact_file_name()), content).unwrap();
    }

    fn setup() -> (tempfile::TempDir, Arc<CountingLoader>, ModelRegistry) {
        let dir = tempfile::tempdir().unwrap();
        let loader = Arc::new(CountingLoader::default());
        let registry = ModelRegistry::from_dir(dir.path(), loader.clone());
        (dir, loader, registry)
    }

    #[test]
    fn test_nothing_loaded_initially() {
        let (_dir, loader, registry) = setup();
        assert!(registry.list_loaded().is_empty());
        assert_eq!(registry.registered().len(), 2);
        assert_eq!(loader.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let (dir, loader, registry) = setup();
        write_artifact(dir.path(), ModelName::GradientBoosting, b"ok");

        let first = registry.resolve(ModelName::GradientBoosting).unwrap();
        let second = registry.resolve(ModelName::GradientBoosting).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.algorithm(), "GradientBoostingClassifier");
        assert_eq!(first.sha256(), hex::encode(Sha256::digest(b"ok")));
        assert_eq!(
            registry.list_loaded(),
            BTreeSet::from([ModelName::GradientBoosting])
        );
    }

    #[test]
    fn test_missing_artifact_is_permanent_failure() {
        let (dir, loader, registry) = setup();

        let err = registry.resolve(ModelName::DecisionTree).unwrap_err();
        assert_eq!(err.kind(), "model_load_failure");
        assert!(err.to_string().contains("not found"));

        // The file appearing later does not trigger a reload
        write_artifact(dir.path(), ModelName::DecisionTree, b"ok");
        let again = registry.resolve(ModelName::DecisionTree).unwrap_err();
        assert_eq!(err, again);
        assert_eq!(loader.calls.load(Ordering::SeqCst), 0);
        assert!(registry.list_loaded().is_empty());
    }

    #[test]
    fn test_corrupt_artifact_is_not_retried() {
        let (dir, loader, registry) = setup();
        write_artifact(dir.path(), ModelName::DecisionTree, b"garbage");

        for _ in 0..3 {
            let err = registry.resolve(ModelName::DecisionTree).unwrap_err();
            assert!(err.to_string().contains("corrupt artifact"));
        }
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unregistered_name_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ModelRegistry::new(
            [ModelSpec::in_dir(ModelName::DecisionTree, dir.path())],
            Arc::new(CountingLoader::default()),
        );

        let err = registry.resolve(ModelName::GradientBoosting).unwrap_err();
        assert_eq!(err, PipelineError::ModelNotFound("gradient_boosting".into()));

        let err = registry.resolve_by_name("random_forest").unwrap_err();
        assert_eq!(err.kind(), "model_not_found");
    }

    #[test]
    fn test_checksum_mismatch_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), ModelName::DecisionTree, b"ok");
        let good = hex::encode(Sha256::digest(b"ok"));

        let registry = ModelRegistry::new(
            [
                ModelSpec::in_dir(ModelName::DecisionTree, dir.path()).with_checksum(good.to_uppercase()),
                ModelSpec::in_dir(ModelName::GradientBoosting, dir.path()).with_checksum("00ff"),
            ],
            Arc::new(CountingLoader::default()),
        );
        write_artifact(dir.path(), ModelName::GradientBoosting, b"ok");

        assert!(registry.resolve(ModelName::DecisionTree).is_ok());
        let err = registry.resolve(ModelName::GradientBoosting).unwrap_err();
        assert!(err.to_string().contains("checksum mismatch"));
    }

    #[test]
    fn test_concurrent_first_resolution_loads_once() {
        let (dir, loader, registry) = setup();
        write_artifact(dir.path(), ModelName::GradientBoosting, b"ok");

        let models: Vec<Arc<LoadedModel>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| registry.resolve(ModelName::GradientBoosting).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
        assert!(models.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn test_preload_and_model_info() {
        let (dir, _loader, registry) = setup();
        write_artifact(dir.path(), ModelName::GradientBoosting, b"ok");

        let failures = registry.preload();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, ModelName::DecisionTree);

        let info = registry.model_info();
        assert_eq!(info.len(), 2);
        let gb = info
            .iter()
            .find(|m| m.name == ModelName::GradientBoosting)
            .unwrap();
        assert!(gb.loaded);
        assert!(gb.file_path.ends_with("gradient_boosting_model.onnx"));
        let dt = info.iter().find(|m| m.name == ModelName::DecisionTree).unwrap();
        assert!(!dt.loaded);
        assert_eq!(dt.model_type, "DecisionTreeClassifier");
    }

    #[test]
    fn test_loaded_model_invokes_classifier() {
        let (dir, _loader, registry) = setup();
        write_artifact(dir.path(), ModelName::GradientBoosting, b"ok");
        let model = registry.resolve_by_name("gradient_boosting").unwrap();
        assert_eq!(model.predict(&[0.0; 21]).unwrap().code, 1.0);
        assert!(!model.has_probabilities());
    }
}
