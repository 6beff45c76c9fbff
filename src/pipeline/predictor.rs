use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use log::info;

use super::encode::encode_and_scale;
use super::error::PipelineError;
use super::reconcile::{align_record, ReconcilerConfig};
use super::scorer;
use crate::attributes::AttributeRecord;
use crate::model::RandomForest;
use crate::recommend::{Dosha, DoshaScores, RecommendationBundle};
use crate::schema::SchemaRegistry;

/// The outcome of one classifier prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// The decoded category label. When no label encoder is registered this
    /// is the raw class code rendered as text.
    pub label: String,
    /// The label parsed as a dosha, when it is one.
    pub dosha: Option<Dosha>,
    /// Rule-based tally over the raw record, carried as a diagnostic
    /// overlay next to the model's label.
    pub rule_scores: DoshaScores,
}

/// A prediction together with the recommendation bundle for its label.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub prediction: Prediction,
    pub recommendations: RecommendationBundle,
}

/// A thread-safe dosha classifier over trained questionnaire artifacts.
///
/// # Thread Safety
///
/// This type is automatically `Send + Sync` because all of its fields are
/// thread-safe: the registry, model and recommendation table are immutable
/// behind `Arc`, and the reconciler configuration is plain data. A predictor
/// can be shared across threads without locking.
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use std::sync::Arc;
/// use std::thread;
/// use tridosha::{AttributeRecord, DoshaPredictor};
///
/// let predictor = Arc::new(
///     DoshaPredictor::builder()
///         .with_artifact_dir("artifacts/questionnaire-v1")?
///         .build()?,
/// );
///
/// let mut handles = vec![];
/// for _ in 0..3 {
///     let predictor = Arc::clone(&predictor);
///     handles.push(thread::spawn(move || {
///         let mut record = AttributeRecord::new();
///         record.insert("Body Frame", "Thin");
///         let _ = predictor.predict(&record);
///     }));
/// }
/// for handle in handles {
///     handle.join().unwrap();
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DoshaPredictor {
    pub artifact_dir: Option<PathBuf>,
    pub registry: Arc<SchemaRegistry>,
    pub model: Arc<RandomForest>,
    pub recommendations: Arc<HashMap<Dosha, RecommendationBundle>>,
    pub reconciler: ReconcilerConfig,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<DoshaPredictor>();
    }
};

impl DoshaPredictor {
    /// Creates a new PredictorBuilder for fluent construction
    pub fn builder() -> super::builder::PredictorBuilder {
        super::builder::PredictorBuilder::new()
    }

    /// Returns information about the predictor's current state
    pub fn info(&self) -> super::PredictorInfo {
        super::PredictorInfo {
            artifact_dir: self.artifact_dir.clone(),
            num_features: self.registry.feature_count(),
            feature_names: self.registry.feature_names().to_vec(),
            class_labels: match self.registry.dosha_encoder() {
                Some(encoder) => encoder.classes().to_vec(),
                None => (0..self.model.n_classes()).map(|c| c.to_string()).collect(),
            },
            tree_count: self.model.tree_count(),
        }
    }

    /// Classifies one questionnaire record.
    ///
    /// The record's keys are reconciled against the trained feature names,
    /// encoded and scaled with the registered artifacts, and fed to the
    /// trained model; the numeric class is decoded back to its label. The
    /// whole path is deterministic: identical input yields identical output.
    ///
    /// # Errors
    /// * `Validation` if the record is empty
    /// * `UnknownCategory` if a value is outside a feature's training
    ///   vocabulary
    /// * `IncompleteFeature` if a trained feature is still unresolved after
    ///   reconciliation
    /// * `Inference` on dimensionality or label-decode failure
    pub fn predict(&self, record: &AttributeRecord) -> Result<Prediction, PipelineError> {
        if record.is_empty() {
            return Err(PipelineError::Validation(
                "Input record cannot be empty".into(),
            ));
        }

        let reconciliation = align_record(record, self.registry.feature_names(), &self.reconciler);
        if reconciliation.was_renamed() {
            info!("Applied {} column rename(s)", reconciliation.renames.len());
        }

        let vector = encode_and_scale(&reconciliation.record, &self.registry)?;
        if vector.len() != self.registry.feature_count() {
            return Err(PipelineError::Inference(format!(
                "feature vector has {} columns, schema expects {}",
                vector.len(),
                self.registry.feature_count()
            )));
        }

        let code = self.model.predict(&vector)?;
        let label = match self.registry.dosha_encoder() {
            Some(encoder) => encoder
                .decode(code)
                .ok_or_else(|| {
                    PipelineError::Inference(format!(
                        "model predicted class {} but the label encoder has {} classes",
                        code,
                        encoder.len()
                    ))
                })?
                .to_string(),
            None => code.to_string(),
        };

        Ok(Prediction {
            dosha: Dosha::from_label(&label),
            rule_scores: scorer::score_record(record),
            label,
        })
    }

    /// `predict` plus the recommendation lookup for the predicted label. A
    /// label with no registered bundle yields an empty bundle.
    pub fn assess(&self, record: &AttributeRecord) -> Result<Assessment, PipelineError> {
        let prediction = self.predict(record)?;
        let recommendations = prediction
            .dosha
            .and_then(|dosha| self.recommendations.get(&dosha))
            .cloned()
            .unwrap_or_default();
        Ok(Assessment { prediction, recommendations })
    }

    /// The standalone model-free path: rule-based tally and majority label
    /// over the raw record.
    pub fn rule_based_dosha(&self, record: &AttributeRecord) -> (Dosha, DoshaScores) {
        scorer::rule_based_dosha(record)
    }

    /// The recommendation bundle registered for a dosha, if any.
    pub fn recommendations(&self, dosha: Dosha) -> Option<&RecommendationBundle> {
        self.recommendations.get(&dosha)
    }
}
