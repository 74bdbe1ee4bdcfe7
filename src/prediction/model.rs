use once_cell::sync::OnceCell;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Failed to read model artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse model artifact: {0}")]
    Parse(String),
    #[error("Missing feature '{0}' in input record")]
    MissingFeature(String),
    #[error("Feature '{feature}' expects a {expected} value")]
    TypeMismatch {
        feature: String,
        expected: &'static str,
    },
    #[error("Unknown category '{value}' for feature '{feature}'")]
    UnknownCategory { feature: String, value: String },
    #[error("Unexpected feature '{0}' in input record")]
    UnexpectedFeature(String),
    #[error("No model artifact configured")]
    NotConfigured,
    #[error("Model failure: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl FeatureValue {
    fn as_number(&self) -> Option<f64> {
        match self {
            FeatureValue::Integer(v) => Some(*v as f64),
            FeatureValue::Float(v) => Some(*v),
            FeatureValue::Text(_) => None,
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Integer(v) => write!(f, "{v}"),
            FeatureValue::Float(v) => write!(f, "{v}"),
            FeatureValue::Text(v) => f.write_str(v),
        }
    }
}

impl Serialize for FeatureValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FeatureValue::Integer(v) => serializer.serialize_i64(*v),
            FeatureValue::Float(v) => serializer.serialize_f64(*v),
            FeatureValue::Text(v) => serializer.serialize_str(v),
        }
    }
}

/// A single input row for the model: named features in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelRecord {
    fields: Vec<(String, FeatureValue)>,
}

impl ModelRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name`, replacing an earlier value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: FeatureValue) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }
}

impl Serialize for ModelRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// The external model capability: one record in, one salary estimate out.
/// Implementations are shared read-only across requests.
pub trait SalaryModel: Send + Sync {
    fn predict(&self, record: &ModelRecord) -> Result<f64, ModelError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    #[default]
    Error,
    Ignore,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureTerm {
    Numeric {
        name: String,
        coefficient: f64,
    },
    OneHot {
        name: String,
        categories: HashMap<String, f64>,
        #[serde(default)]
        handle_unknown: HandleUnknown,
    },
}

impl FeatureTerm {
    pub fn name(&self) -> &str {
        match self {
            FeatureTerm::Numeric { name, .. } | FeatureTerm::OneHot { name, .. } => name,
        }
    }

    fn contribution(&self, value: &FeatureValue) -> Result<f64, ModelError> {
        match self {
            FeatureTerm::Numeric { name, coefficient } => value
                .as_number()
                .map(|x| x * coefficient)
                .ok_or_else(|| ModelError::TypeMismatch {
                    feature: name.clone(),
                    expected: "numeric",
                }),
            FeatureTerm::OneHot {
                name,
                categories,
                handle_unknown,
            } => {
                let FeatureValue::Text(label) = value else {
                    return Err(ModelError::TypeMismatch {
                        feature: name.clone(),
                        expected: "categorical",
                    });
                };
                match (categories.get(label), handle_unknown) {
                    (Some(weight), _) => Ok(*weight),
                    (None, HandleUnknown::Ignore) => Ok(0.0),
                    (None, HandleUnknown::Error) => Err(ModelError::UnknownCategory {
                        feature: name.clone(),
                        value: label.clone(),
                    }),
                }
            }
        }
    }
}

/// A fitted one-hot + linear regression pipeline exported to JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearPipelineArtifact {
    pub intercept: f64,
    pub features: Vec<FeatureTerm>,
}

impl LinearPipelineArtifact {
    fn check(&self) -> Result<(), ModelError> {
        if self.features.is_empty() {
            return Err(ModelError::Parse("artifact declares no features".to_string()));
        }
        if !self.intercept.is_finite() {
            return Err(ModelError::Parse("intercept is not finite".to_string()));
        }
        let mut seen = HashSet::new();
        for term in &self.features {
            if !seen.insert(term.name()) {
                return Err(ModelError::Parse(format!("duplicate feature '{}'", term.name())));
            }
            let finite = match term {
                FeatureTerm::Numeric { coefficient, .. } => coefficient.is_finite(),
                FeatureTerm::OneHot { categories, .. } => categories.values().all(|w| w.is_finite()),
            };
            if !finite {
                return Err(ModelError::Parse(format!(
                    "feature '{}' has a non-finite weight",
                    term.name()
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct LinearPipelineModel {
    artifact: LinearPipelineArtifact,
}

impl LinearPipelineModel {
    pub fn new(artifact: LinearPipelineArtifact) -> Result<Self, ModelError> {
        artifact.check()?;
        Ok(Self { artifact })
    }

    pub fn from_json_str(json: &str) -> Result<Self, ModelError> {
        let artifact: LinearPipelineArtifact =
            serde_json::from_str(json).map_err(|e| ModelError::Parse(e.to_string()))?;
        Self::new(artifact)
    }

    pub fn from_path(path: &Path) -> Result<Self, ModelError> {
        let json = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.artifact.features.iter().map(FeatureTerm::name)
    }
}

impl SalaryModel for LinearPipelineModel {
    fn predict(&self, record: &ModelRecord) -> Result<f64, ModelError> {
        if let Some(extra) = record
            .names()
            .find(|name| !self.artifact.features.iter().any(|t| t.name() == *name))
        {
            return Err(ModelError::UnexpectedFeature(extra.to_string()));
        }

        let mut total = self.artifact.intercept;
        for term in &self.artifact.features {
            let value = record
                .get(term.name())
                .ok_or_else(|| ModelError::MissingFeature(term.name().to_string()))?;
            total += term.contribution(value)?;
        }
        Ok(total)
    }
}

/// Loads the model on first use and hands out the same read-only handle
/// afterwards. A failed load leaves the cell empty so a later call retries.
pub struct ModelProvider {
    artifact_path: Option<PathBuf>,
    model: OnceCell<Arc<dyn SalaryModel>>,
    load_attempts: AtomicUsize,
}

impl ModelProvider {
    pub fn from_artifact(path: impl Into<PathBuf>) -> Self {
        Self {
            artifact_path: Some(path.into()),
            model: OnceCell::new(),
            load_attempts: AtomicUsize::new(0),
        }
    }

    pub fn with_model(model: Arc<dyn SalaryModel>) -> Self {
        Self {
            artifact_path: None,
            model: OnceCell::with_value(model),
            load_attempts: AtomicUsize::new(0),
        }
    }

    /// How many times the artifact has been read from storage.
    pub fn load_attempts(&self) -> usize {
        self.load_attempts.load(Ordering::Relaxed)
    }

    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    pub fn get(&self) -> Result<Arc<dyn SalaryModel>, ModelError> {
        self.model
            .get_or_try_init(|| {
                let path = self.artifact_path.as_deref().ok_or(ModelError::NotConfigured)?;
                self.load_attempts.fetch_add(1, Ordering::Relaxed);
                info!(path = %path.display(), "Loading model artifact.");
                match LinearPipelineModel::from_path(path) {
                    Ok(model) => {
                        info!(
                            path = %path.display(),
                            features = model.feature_names().count(),
                            "Model artifact loaded."
                        );
                        Ok(Arc::new(model) as Arc<dyn SalaryModel>)
                    }
                    Err(e) => {
                        error!(path = %path.display(), error = %e, "Failed to load model artifact.");
                        Err(e)
                    }
                }
            })
            .cloned()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    pub(crate) const SAMPLE_ARTIFACT: &str = include_str!("../../fixtures/salary_model_final.json");

    fn record(department: &str) -> ModelRecord {
        let mut record = ModelRecord::new();
        record.insert("Years", FeatureValue::Integer(1));
        record.insert("Job Rate", FeatureValue::Float(3.0));
        record.insert("Overtime Hours", FeatureValue::Integer(20));
        record.insert("Department", FeatureValue::Text(department.to_string()));
        record.insert("Country", FeatureValue::Text("Egypt".to_string()));
        record
    }

    #[test]
    fn test_linear_pipeline_prediction() {
        let model = LinearPipelineModel::from_json_str(SAMPLE_ARTIFACT).unwrap();
        let salary = model.predict(&record("Manufacturing")).unwrap();
        // 1500 + 120 + 751.5 + 80 - 95 + 0
        assert!((salary - 2356.5).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_category_is_an_error_by_default() {
        let model = LinearPipelineModel::from_json_str(SAMPLE_ARTIFACT).unwrap();
        let err = model.predict(&record("Finance")).unwrap_err();
        assert!(matches!(err, ModelError::UnknownCategory { ref value, .. } if value == "Finance"));
    }

    #[test]
    fn test_unknown_category_ignored_when_requested() {
        let mut artifact: LinearPipelineArtifact = serde_json::from_str(SAMPLE_ARTIFACT).unwrap();
        for term in &mut artifact.features {
            if let FeatureTerm::OneHot { handle_unknown, .. } = term {
                *handle_unknown = HandleUnknown::Ignore;
            }
        }
        let model = LinearPipelineModel::new(artifact).unwrap();
        let salary = model.predict(&record("Finance")).unwrap();
        assert!((salary - 2451.5).abs() < 1e-9);
    }

    #[test]
    fn test_schema_mismatches() {
        let model = LinearPipelineModel::from_json_str(SAMPLE_ARTIFACT).unwrap();

        let full = record("Manufacturing");
        let missing = ModelRecord {
            fields: full.fields.into_iter().filter(|(n, _)| n != "Country").collect(),
        };
        assert!(matches!(model.predict(&missing), Err(ModelError::MissingFeature(f)) if f == "Country"));

        let mut extra = record("Manufacturing");
        extra.insert("Age", FeatureValue::Integer(30));
        assert!(matches!(model.predict(&extra), Err(ModelError::UnexpectedFeature(f)) if f == "Age"));

        let mut wrong_type = record("Manufacturing");
        wrong_type.insert("Years", FeatureValue::Text("one".to_string()));
        assert!(matches!(
            model.predict(&wrong_type),
            Err(ModelError::TypeMismatch { expected: "numeric", .. })
        ));
    }

    #[test]
    fn test_invalid_artifacts_are_rejected() {
        assert!(matches!(
            LinearPipelineModel::from_json_str("not json"),
            Err(ModelError::Parse(_))
        ));
        assert!(matches!(
            LinearPipelineModel::from_json_str(r#"{ "intercept": 1.0, "features": [] }"#),
            Err(ModelError::Parse(_))
        ));
        let duplicate = r#"{ "intercept": 1.0, "features": [
            { "kind": "numeric", "name": "Years", "coefficient": 1.0 },
            { "kind": "numeric", "name": "Years", "coefficient": 2.0 } ] }"#;
        let err = LinearPipelineModel::from_json_str(duplicate).unwrap_err();
        assert_eq!(err.to_string(), "Failed to parse model artifact: duplicate feature 'Years'");
    }

    #[test]
    fn test_record_serializes_as_object() {
        let json = serde_json::to_value(record("Manufacturing")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "Years": 1,
                "Job Rate": 3.0,
                "Overtime Hours": 20,
                "Department": "Manufacturing",
                "Country": "Egypt"
            })
        );
    }

    #[test]
    fn test_provider_loads_once_and_caches() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE_ARTIFACT.as_bytes()).unwrap();
        let provider = ModelProvider::from_artifact(file.path());

        assert!(!provider.is_loaded());
        let first = provider.get().unwrap();
        assert!(provider.is_loaded());
        assert_eq!(provider.load_attempts(), 1);

        // The cached handle survives the artifact disappearing.
        let path = file.path().to_path_buf();
        drop(file);
        assert!(!path.exists());
        let second = provider.get().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(provider.load_attempts(), 1);
    }

    #[test]
    fn test_provider_reports_missing_artifact_without_caching() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("salary_model_final.json");
        let provider = ModelProvider::from_artifact(&path);

        assert!(matches!(provider.get(), Err(ModelError::Io { .. })));
        assert!(!provider.is_loaded());

        fs::write(&path, SAMPLE_ARTIFACT).unwrap();
        assert!(provider.get().is_ok());
        assert!(provider.is_loaded());
        assert_eq!(provider.load_attempts(), 2);
    }

    #[test]
    fn test_provider_without_source_is_not_configured() {
        let provider = ModelProvider {
            artifact_path: None,
            model: OnceCell::new(),
            load_attempts: AtomicUsize::new(0),
        };
        assert!(matches!(provider.get(), Err(ModelError::NotConfigured)));
        assert_eq!(provider.load_attempts(), 0);
    }
}
