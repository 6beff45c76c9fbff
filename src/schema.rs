use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::info;
use ndarray::Array1;
use serde::Deserialize;

use crate::artifact_store::ArtifactKind;
use crate::pipeline::PipelineError;

/// Reserved column name for the output label encoder inside the encoders
/// artifact.
pub const DOSHA_COLUMN: &str = "Dosha";

/// A fixed bidirectional mapping between a category string and its integer
/// code, built at training time.
///
/// The code of a category is its index in the training-time class list.
/// Encoding an unseen category or decoding an unseen code yields `None`;
/// callers surface that as an error rather than substituting a default.
///
/// # Example
/// ```
/// use tridosha::CategoryEncoder;
///
/// let encoder = CategoryEncoder::new(vec![
///     "Large".to_string(),
///     "Medium".to_string(),
///     "Thin".to_string(),
/// ]).unwrap();
/// assert_eq!(encoder.encode("Thin"), Some(2));
/// assert_eq!(encoder.decode(0), Some("Large"));
/// assert_eq!(encoder.encode("Gigantic"), None);
/// ```
#[derive(Debug, Clone)]
pub struct CategoryEncoder {
    classes: Vec<String>,
    codes: HashMap<String, usize>,
}

impl CategoryEncoder {
    /// Builds an encoder from the training-time class list. The list must be
    /// non-empty and free of duplicates and empty strings.
    pub fn new(classes: Vec<String>) -> Result<Self, PipelineError> {
        if classes.is_empty() {
            return Err(PipelineError::SchemaLoad(
                "encoder class list cannot be empty".to_string(),
            ));
        }
        let mut codes = HashMap::with_capacity(classes.len());
        for (code, class) in classes.iter().enumerate() {
            if class.is_empty() {
                return Err(PipelineError::SchemaLoad(
                    "encoder class name cannot be empty".to_string(),
                ));
            }
            if codes.insert(class.clone(), code).is_some() {
                return Err(PipelineError::SchemaLoad(format!(
                    "duplicate encoder class '{}'",
                    class
                )));
            }
        }
        Ok(Self { classes, codes })
    }

    pub fn encode(&self, category: &str) -> Option<usize> {
        self.codes.get(category).copied()
    }

    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(|s| s.as_str())
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// A fitted per-column standard transform: `(x - mean) / scale`.
///
/// The parameters are fixed at training time and are never refit at
/// inference time.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, PipelineError> {
        if mean.len() != scale.len() {
            return Err(PipelineError::SchemaLoad(format!(
                "scaler mean/scale length mismatch: {} vs {}",
                mean.len(),
                scale.len()
            )));
        }
        if mean.is_empty() {
            return Err(PipelineError::SchemaLoad(
                "scaler parameters cannot be empty".to_string(),
            ));
        }
        if let Some(pos) = scale.iter().position(|s| !s.is_finite() || *s == 0.0) {
            return Err(PipelineError::SchemaLoad(format!(
                "scaler column {} has invalid scale {}",
                pos, scale[pos]
            )));
        }
        Ok(Self {
            mean: Array1::from_vec(mean),
            scale: Array1::from_vec(scale),
        })
    }

    /// Applies the fitted transform to a vector in trained column order.
    pub fn transform(&self, features: &Array1<f64>) -> Result<Array1<f64>, PipelineError> {
        if features.len() != self.mean.len() {
            return Err(PipelineError::Inference(format!(
                "scaler expects {} columns, got {}",
                self.mean.len(),
                features.len()
            )));
        }
        Ok((features - &self.mean) / &self.scale)
    }

    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct EncoderSpec {
    classes: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ScalerFile {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

/// The immutable artifacts produced by prior training: feature order,
/// per-feature encoders, the fitted scaler, and an optional label encoder.
///
/// Loaded exactly once before any inference request is served, then shared
/// read-only (typically behind an `Arc`) for the process lifetime. Any
/// structural inconsistency is a startup-fatal `SchemaLoad` error, never a
/// per-request one.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    feature_names: Vec<String>,
    encoders: HashMap<String, CategoryEncoder>,
    scaler: StandardScaler,
    dosha_encoder: Option<CategoryEncoder>,
}

impl SchemaRegistry {
    /// Loads the registry from `feature_names.json`, `encoders.json` and
    /// `scaler.json` inside `dir`, validating structural consistency.
    pub fn load(dir: &Path) -> Result<Self, PipelineError> {
        let feature_names: Vec<String> =
            serde_json::from_str(&read_artifact(dir, ArtifactKind::FeatureNames)?)?;

        let encoder_specs: HashMap<String, EncoderSpec> =
            serde_json::from_str(&read_artifact(dir, ArtifactKind::Encoders)?)?;
        let mut encoders = HashMap::with_capacity(encoder_specs.len());
        let mut dosha_encoder = None;
        for (column, spec) in encoder_specs {
            let encoder = CategoryEncoder::new(spec.classes).map_err(|e| {
                PipelineError::SchemaLoad(format!("encoder for column '{}': {}", column, e))
            })?;
            if column == DOSHA_COLUMN {
                dosha_encoder = Some(encoder);
            } else {
                encoders.insert(column, encoder);
            }
        }

        let scaler_file: ScalerFile =
            serde_json::from_str(&read_artifact(dir, ArtifactKind::Scaler)?)?;
        let scaler = StandardScaler::new(scaler_file.mean, scaler_file.scale)?;

        let registry = Self::from_parts(feature_names, encoders, scaler, dosha_encoder)?;
        info!(
            "Schema registry loaded from {:?}: {} features, label encoder: {}",
            dir,
            registry.feature_count(),
            registry.dosha_encoder.is_some()
        );
        Ok(registry)
    }

    /// Assembles a registry from already-constructed parts, applying the same
    /// fail-fast validation as `load`.
    pub fn from_parts(
        feature_names: Vec<String>,
        encoders: HashMap<String, CategoryEncoder>,
        scaler: StandardScaler,
        dosha_encoder: Option<CategoryEncoder>,
    ) -> Result<Self, PipelineError> {
        let registry = Self {
            feature_names,
            encoders,
            scaler,
            dosha_encoder,
        };
        registry.validate()?;
        Ok(registry)
    }

    fn validate(&self) -> Result<(), PipelineError> {
        if self.feature_names.is_empty() {
            return Err(PipelineError::SchemaLoad(
                "trained feature list is empty".to_string(),
            ));
        }
        let mut seen = HashMap::new();
        for name in &self.feature_names {
            if name.is_empty() {
                return Err(PipelineError::SchemaLoad(
                    "trained feature name cannot be empty".to_string(),
                ));
            }
            if seen.insert(name.as_str(), ()).is_some() {
                return Err(PipelineError::SchemaLoad(format!(
                    "duplicate trained feature name '{}'",
                    name
                )));
            }
        }
        for name in &self.feature_names {
            if !self.encoders.contains_key(name) {
                return Err(PipelineError::SchemaLoad(format!(
                    "no encoder registered for trained feature '{}'",
                    name
                )));
            }
        }
        for column in self.encoders.keys() {
            if !seen.contains_key(column.as_str()) {
                return Err(PipelineError::SchemaLoad(format!(
                    "encoder references unknown feature '{}'",
                    column
                )));
            }
        }
        if self.scaler.len() != self.feature_names.len() {
            return Err(PipelineError::SchemaLoad(format!(
                "scaler covers {} columns but schema has {} features",
                self.scaler.len(),
                self.feature_names.len()
            )));
        }
        Ok(())
    }

    /// The exact column order the model expects. Fixed at training time.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn feature_count(&self) -> usize {
        self.feature_names.len()
    }

    pub fn encoder(&self, feature: &str) -> Option<&CategoryEncoder> {
        self.encoders.get(feature)
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn dosha_encoder(&self) -> Option<&CategoryEncoder> {
        self.dosha_encoder.as_ref()
    }
}

fn read_artifact(dir: &Path, kind: ArtifactKind) -> Result<String, PipelineError> {
    let path = dir.join(kind.file_name());
    fs::read_to_string(&path).map_err(|e| {
        PipelineError::SchemaLoad(format!("failed to read {:?}: {}", path, e))
    })
}
