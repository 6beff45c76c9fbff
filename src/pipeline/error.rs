use std::fmt;

/// Represents the different types of errors that can occur in the inference
/// pipeline.
///
/// `SchemaLoad` is startup-fatal: a predictor is never constructed over a
/// partially loaded registry. The remaining variants are per-request and
/// carry the offending feature name where one exists.
#[derive(Debug)]
pub enum PipelineError {
    /// A trained artifact is missing, malformed, or structurally inconsistent
    SchemaLoad(String),
    /// An input value was never seen during training for this feature
    UnknownCategory { feature: String, value: String },
    /// A required feature is still unresolved after reconciliation
    IncompleteFeature(String),
    /// Dimensionality or model invocation failure
    Inference(String),
    /// Error occurred due to invalid input parameters
    Validation(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SchemaLoad(msg) => write!(f, "Schema load error: {}", msg),
            Self::UnknownCategory { feature, value } => write!(
                f,
                "Unknown category '{}' for feature '{}': value was not in the training vocabulary",
                value, feature
            ),
            Self::IncompleteFeature(feature) => write!(
                f,
                "Incomplete feature '{}': no value present after reconciliation",
                feature
            ),
            Self::Inference(msg) => write!(f, "Inference error: {}", msg),
            Self::Validation(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::SchemaLoad(err.to_string())
    }
}
