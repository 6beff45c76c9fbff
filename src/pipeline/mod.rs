use std::path::PathBuf;

mod encode;
mod error;
mod predictor;
mod reconcile;
mod scorer;
mod utils;
pub mod builder;

pub use builder::PredictorBuilder;
pub use error::PipelineError;
pub use predictor::{Assessment, DoshaPredictor, Prediction};
pub use reconcile::{align_record, Reconciliation, ReconcilerConfig, DEFAULT_SIMILARITY_CUTOFF};
pub use scorer::{rule_based_dosha, score_record};

/// Information about the current state and configuration of a predictor
#[derive(Debug, Clone)]
pub struct PredictorInfo {
    /// Directory the artifacts were loaded from, when file-backed
    pub artifact_dir: Option<PathBuf>,
    /// Number of trained features the schema covers
    pub num_features: usize,
    /// Trained feature names, in model column order
    pub feature_names: Vec<String>,
    /// Output labels, in class-code order
    pub class_labels: Vec<String>,
    /// Number of trees in the loaded forest
    pub tree_count: usize,
}
