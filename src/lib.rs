//! A thread-safe dosha classifier that aligns free-form questionnaire
//! records against a trained feature schema and predicts one of the three
//! constitutional categories (Vata, Pitta, Kapha).
//!
//! # Basic Usage
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use tridosha::{AttributeRecord, Attribute, DoshaPredictor};
//!
//! let predictor = DoshaPredictor::builder()
//!     .with_artifact_dir("artifacts/questionnaire-v1")?
//!     .build()?;
//!
//! let mut record = AttributeRecord::new();
//! for attribute in Attribute::ALL {
//!     record.insert(attribute.canonical_name(), attribute.domain()[0]);
//! }
//!
//! let assessment = predictor.assess(&record)?;
//! println!("Predicted dosha: {}", assessment.prediction.label);
//! for item in &assessment.recommendations.food_recommended {
//!     println!("  favor: {}", item);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Input keys do not need to match the trained column names exactly: the
//! reconciler renames near-miss keys (for example `hair_type` against the
//! trained `Type of Hair`) before encoding, and every rename is reported on
//! the reconciliation result.
//!
//! # Thread Safety
//!
//! The predictor is immutable after construction and can be shared across
//! threads using `Arc`:
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use std::thread;
//! use tridosha::{AttributeRecord, DoshaPredictor};
//!
//! let predictor = Arc::new(
//!     DoshaPredictor::builder()
//!         .with_artifact_dir("artifacts/questionnaire-v1")?
//!         .build()?,
//! );
//!
//! let mut handles = vec![];
//! for _ in 0..3 {
//!     let predictor = Arc::clone(&predictor);
//!     handles.push(thread::spawn(move || {
//!         let mut record = AttributeRecord::new();
//!         record.insert("Body Frame", "Thin");
//!         let _ = predictor.predict(&record);
//!     }));
//! }
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! # Ok(())
//! # }
//! ```

pub mod artifact_store;
pub mod attributes;
pub mod model;
pub mod pipeline;
pub mod recommend;
pub mod schema;

pub use artifact_store::{ArtifactError, ArtifactKind, ArtifactSpec, ArtifactStore, BundleInfo};
pub use attributes::{Attribute, AttributeRecord, ATTRIBUTE_COUNT};
pub use model::{DecisionTree, RandomForest, TreeNode};
pub use pipeline::{
    align_record, rule_based_dosha, score_record, Assessment, DoshaPredictor, PipelineError,
    Prediction, PredictorBuilder, PredictorInfo, Reconciliation, ReconcilerConfig,
    DEFAULT_SIMILARITY_CUTOFF,
};
pub use recommend::{builtin_recommendations, Dosha, DoshaScores, RecommendationBundle};
pub use schema::{CategoryEncoder, SchemaRegistry, StandardScaler, DOSHA_COLUMN};

pub fn init_logger() {
    env_logger::init();
}
