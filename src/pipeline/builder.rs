use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::info;

use super::error::PipelineError;
use super::predictor::DoshaPredictor;
use super::reconcile::ReconcilerConfig;
use crate::artifact_store::{ArtifactStore, BundleInfo};
use crate::model::RandomForest;
use crate::recommend::{builtin_recommendations, Dosha, RecommendationBundle};
use crate::schema::SchemaRegistry;

/// A builder for constructing a DoshaPredictor with a fluent interface.
///
/// Exactly one artifact source must be set before `build`: a directory of
/// exported artifact files, a downloaded store bundle, or in-memory
/// components.
#[derive(Debug, Default)]
pub struct PredictorBuilder {
    artifact_dir: Option<PathBuf>,
    registry: Option<SchemaRegistry>,
    model: Option<RandomForest>,
    recommendations: Option<HashMap<Dosha, RecommendationBundle>>,
    reconciler: ReconcilerConfig,
}

impl PredictorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the reconciler configuration (similarity cutoff).
    pub fn with_reconciler_config(mut self, config: ReconcilerConfig) -> Self {
        self.reconciler = config;
        self
    }

    /// Replaces the built-in recommendation table.
    pub fn with_recommendations(
        mut self,
        recommendations: HashMap<Dosha, RecommendationBundle>,
    ) -> Self {
        self.recommendations = Some(recommendations);
        self
    }

    /// Loads the schema registry and the trained model from a directory of
    /// artifact files.
    ///
    /// # Errors
    /// * `SchemaLoad` if an artifact source is already set, the directory
    ///   does not exist, any artifact is missing or malformed, or the loaded
    ///   artifacts are structurally inconsistent
    pub fn with_artifact_dir(mut self, dir: impl AsRef<Path>) -> Result<Self, PipelineError> {
        if self.registry.is_some() || self.model.is_some() {
            return Err(PipelineError::SchemaLoad(
                "artifact source already set".to_string(),
            ));
        }
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(PipelineError::SchemaLoad(format!(
                "artifact directory not found: {:?}",
                dir
            )));
        }

        let registry = SchemaRegistry::load(dir)?;
        let model = RandomForest::load(dir)?;
        info!("Artifacts loaded from {:?}", dir);

        self.artifact_dir = Some(dir.to_path_buf());
        self.registry = Some(registry);
        self.model = Some(model);
        Ok(self)
    }

    /// Loads a bundle that has already been downloaded into an artifact
    /// store.
    ///
    /// # Errors
    /// * `SchemaLoad` if the bundle is not downloaded (download it first
    ///   using `ArtifactStore::download_bundle`) or its artifacts fail to
    ///   load
    pub fn with_bundle(
        self,
        store: &ArtifactStore,
        bundle: &BundleInfo,
    ) -> Result<Self, PipelineError> {
        if !store.is_bundle_downloaded(bundle) {
            return Err(PipelineError::SchemaLoad(format!(
                "Bundle '{}' is not downloaded. Please download it first using ArtifactStore::download_bundle()",
                bundle.name
            )));
        }
        self.with_artifact_dir(store.bundle_dir(&bundle.name))
    }

    /// Loads the built-in bundle from the default artifact store location.
    pub fn with_default_artifacts(self) -> Result<Self, PipelineError> {
        let store = ArtifactStore::new_default().map_err(|e| {
            PipelineError::SchemaLoad(format!("failed to open artifact store: {}", e))
        })?;
        self.with_bundle(&store, &BundleInfo::questionnaire_v1())
    }

    /// Uses an already-constructed registry and model, bypassing artifact
    /// files entirely.
    pub fn with_components(
        mut self,
        registry: SchemaRegistry,
        model: RandomForest,
    ) -> Result<Self, PipelineError> {
        if self.registry.is_some() || self.model.is_some() {
            return Err(PipelineError::SchemaLoad(
                "artifact source already set".to_string(),
            ));
        }
        self.registry = Some(registry);
        self.model = Some(model);
        Ok(self)
    }

    /// Builds and returns the final DoshaPredictor instance.
    ///
    /// Cross-validates the loaded artifacts before assembling: the model
    /// must cover exactly the registry's feature count, the label encoder
    /// (when present) must cover the model's classes, and the reconciler
    /// cutoff must be a valid similarity.
    ///
    /// # Errors
    /// * `SchemaLoad` if no artifact source was set or the artifacts are
    ///   mutually inconsistent
    /// * `Validation` if the reconciler cutoff is outside `0.0..=1.0`
    pub fn build(self) -> Result<DoshaPredictor, PipelineError> {
        let registry = self.registry.ok_or_else(|| {
            PipelineError::SchemaLoad("no artifacts loaded; set an artifact source first".into())
        })?;
        let model = self.model.ok_or_else(|| {
            PipelineError::SchemaLoad("no model loaded; set an artifact source first".into())
        })?;

        if model.n_features() != registry.feature_count() {
            return Err(PipelineError::SchemaLoad(format!(
                "model expects {} features but the schema has {}",
                model.n_features(),
                registry.feature_count()
            )));
        }
        if let Some(encoder) = registry.dosha_encoder() {
            if encoder.len() != model.n_classes() {
                return Err(PipelineError::SchemaLoad(format!(
                    "label encoder has {} classes but the model predicts {}",
                    encoder.len(),
                    model.n_classes()
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.reconciler.similarity_cutoff) {
            return Err(PipelineError::Validation(format!(
                "similarity cutoff must be within 0.0..=1.0, got {}",
                self.reconciler.similarity_cutoff
            )));
        }

        let recommendations = self
            .recommendations
            .unwrap_or_else(|| builtin_recommendations().clone());

        info!(
            "Predictor ready: {} features, {} trees",
            registry.feature_count(),
            model.tree_count()
        );

        Ok(DoshaPredictor {
            artifact_dir: self.artifact_dir,
            registry: Arc::new(registry),
            model: Arc::new(model),
            recommendations: Arc::new(recommendations),
            reconciler: self.reconciler,
        })
    }
}
