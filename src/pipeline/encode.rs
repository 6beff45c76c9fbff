use ndarray::Array1;

use super::error::PipelineError;
use crate::attributes::AttributeRecord;
use crate::schema::SchemaRegistry;

/// Encodes a reconciled record into an unscaled numeric vector in trained
/// column order.
///
/// Values are replaced by their training-time codes; a value outside the
/// training vocabulary is an `UnknownCategory` error, never silently mapped
/// to a default. Features still absent after reconciliation are carried as an
/// explicit missing marker (not zero) and rejected with `IncompleteFeature`
/// before any numeric stage can see them, since the fitted scaler cannot
/// tolerate missing columns.
pub(crate) fn encode_record(
    record: &AttributeRecord,
    registry: &SchemaRegistry,
) -> Result<Array1<f64>, PipelineError> {
    let mut codes: Vec<Option<f64>> = Vec::with_capacity(registry.feature_count());
    for feature in registry.feature_names() {
        match record.get(feature) {
            Some(value) => {
                let encoder = registry.encoder(feature).ok_or_else(|| {
                    PipelineError::Inference(format!(
                        "no encoder registered for feature '{}'",
                        feature
                    ))
                })?;
                let code = encoder.encode(value).ok_or_else(|| {
                    PipelineError::UnknownCategory {
                        feature: feature.clone(),
                        value: value.to_string(),
                    }
                })?;
                codes.push(Some(code as f64));
            }
            None => codes.push(None),
        }
    }

    if let Some(index) = codes.iter().position(|c| c.is_none()) {
        return Err(PipelineError::IncompleteFeature(
            registry.feature_names()[index].clone(),
        ));
    }

    Ok(Array1::from_iter(codes.into_iter().flatten()))
}

/// Full feature stage: encode in trained order, then apply the fitted
/// scaler. The output length always equals the trained feature count.
pub(crate) fn encode_and_scale(
    record: &AttributeRecord,
    registry: &SchemaRegistry,
) -> Result<Array1<f64>, PipelineError> {
    let encoded = encode_record(record, registry)?;
    registry.scaler().transform(&encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::attributes::AttributeRecord;
    use crate::schema::{CategoryEncoder, StandardScaler};

    fn encoder(classes: &[&str]) -> CategoryEncoder {
        CategoryEncoder::new(classes.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    fn registry() -> SchemaRegistry {
        let mut encoders = HashMap::new();
        encoders.insert("Body Frame".to_string(), encoder(&["Large", "Medium", "Thin"]));
        encoders.insert("Memory".to_string(), encoder(&["Excellent", "Good", "Poor"]));
        SchemaRegistry::from_parts(
            vec!["Body Frame".to_string(), "Memory".to_string()],
            encoders,
            StandardScaler::new(vec![1.0, 1.0], vec![0.5, 0.5]).unwrap(),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_encodes_in_trained_order() {
        let registry = registry();
        // Insertion order differs from trained order on purpose.
        let mut record = AttributeRecord::new();
        record.insert("Memory", "Poor");
        record.insert("Body Frame", "Thin");

        let encoded = encode_record(&record, &registry).unwrap();
        assert_eq!(encoded.to_vec(), vec![2.0, 2.0]);
    }

    #[test]
    fn test_scaling_applies_fitted_parameters() {
        let registry = registry();
        let mut record = AttributeRecord::new();
        record.insert("Body Frame", "Large");
        record.insert("Memory", "Poor");

        let scaled = encode_and_scale(&record, &registry).unwrap();
        assert_eq!(scaled.to_vec(), vec![-2.0, 2.0]);
    }

    #[test]
    fn test_unknown_category_names_the_feature() {
        let registry = registry();
        let mut record = AttributeRecord::new();
        record.insert("Body Frame", "Gigantic");
        record.insert("Memory", "Poor");

        match encode_record(&record, &registry) {
            Err(PipelineError::UnknownCategory { feature, value }) => {
                assert_eq!(feature, "Body Frame");
                assert_eq!(value, "Gigantic");
            }
            other => panic!("expected UnknownCategory, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_feature_names_the_feature() {
        let registry = registry();
        let mut record = AttributeRecord::new();
        record.insert("Body Frame", "Thin");

        match encode_record(&record, &registry) {
            Err(PipelineError::IncompleteFeature(feature)) => assert_eq!(feature, "Memory"),
            other => panic!("expected IncompleteFeature, got {:?}", other),
        }
    }

    #[test]
    fn test_extra_keys_are_dropped_at_reindex() {
        let registry = registry();
        let mut record = AttributeRecord::new();
        record.insert("Body Frame", "Thin");
        record.insert("Memory", "Good");
        record.insert("Shoe Size", "44");

        let encoded = encode_record(&record, &registry).unwrap();
        assert_eq!(encoded.len(), 2);
    }
}
