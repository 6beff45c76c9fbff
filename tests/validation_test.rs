use std::collections::HashMap;

use tridosha::{
    Attribute, AttributeRecord, CategoryEncoder, DecisionTree, Dosha, DoshaPredictor,
    PipelineError, RandomForest, RecommendationBundle, ReconcilerConfig, SchemaRegistry,
    StandardScaler, TreeNode,
};

fn test_registry() -> SchemaRegistry {
    let feature_names: Vec<String> = Attribute::ALL
        .iter()
        .map(|a| a.canonical_name().to_string())
        .collect();
    let mut encoders = HashMap::new();
    for attribute in Attribute::ALL {
        let mut classes: Vec<String> = attribute.domain().iter().map(|s| s.to_string()).collect();
        classes.sort();
        encoders.insert(
            attribute.canonical_name().to_string(),
            CategoryEncoder::new(classes).unwrap(),
        );
    }
    let dosha_encoder = CategoryEncoder::new(vec![
        "Kapha".to_string(),
        "Pitta".to_string(),
        "Vata".to_string(),
    ])
    .unwrap();
    SchemaRegistry::from_parts(
        feature_names,
        encoders,
        StandardScaler::new(vec![1.0; 22], vec![0.5; 22]).unwrap(),
        Some(dosha_encoder),
    )
    .unwrap()
}

fn leaf_model(class: usize) -> RandomForest {
    RandomForest::new(
        22,
        3,
        vec![DecisionTree { nodes: vec![TreeNode::Leaf { class }] }],
    )
    .unwrap()
}

fn full_record(dosha: Dosha) -> AttributeRecord {
    let mut record = AttributeRecord::new();
    for attribute in Attribute::ALL {
        record.insert(attribute.canonical_name(), attribute.domain()[dosha.index()]);
    }
    record
}

#[test]
fn test_empty_record_is_a_validation_error() {
    let predictor = DoshaPredictor::builder()
        .with_components(test_registry(), leaf_model(0))
        .unwrap()
        .build()
        .unwrap();

    let result = predictor.predict(&AttributeRecord::new());
    assert!(matches!(result, Err(PipelineError::Validation(_))));
}

#[test]
fn test_build_without_artifacts_fails() {
    let result = DoshaPredictor::builder().build();
    assert!(matches!(result, Err(PipelineError::SchemaLoad(_))));
}

#[test]
fn test_cutoff_outside_unit_range_fails() {
    for cutoff in [-0.1, 1.5] {
        let result = DoshaPredictor::builder()
            .with_components(test_registry(), leaf_model(0))
            .unwrap()
            .with_reconciler_config(ReconcilerConfig { similarity_cutoff: cutoff })
            .build();
        assert!(matches!(result, Err(PipelineError::Validation(_))));
    }
}

#[test]
fn test_strict_cutoff_rejects_renames() {
    let predictor = DoshaPredictor::builder()
        .with_components(test_registry(), leaf_model(0))
        .unwrap()
        .with_reconciler_config(ReconcilerConfig { similarity_cutoff: 0.99 })
        .build()
        .unwrap();

    let record = full_record(Dosha::Vata);
    let value = record.get("Type of Hair").unwrap().to_string();
    let mut drifted = AttributeRecord::new();
    for (key, val) in record.iter() {
        if key != "Type of Hair" {
            drifted.insert(key, val);
        }
    }
    drifted.insert("hair_type", value);

    // "hair_type" scores well below 0.99 against "Type of Hair", so the
    // feature stays missing and encoding reports it.
    match predictor.predict(&drifted) {
        Err(PipelineError::IncompleteFeature(feature)) => assert_eq!(feature, "Type of Hair"),
        other => panic!("expected IncompleteFeature, got {:?}", other),
    }
}

#[test]
fn test_custom_recommendations_are_used() {
    let mut table = HashMap::new();
    table.insert(
        Dosha::Vata,
        RecommendationBundle {
            food_recommended: vec!["warm oats".to_string()],
            food_avoid: vec!["iced drinks".to_string()],
            exercise: vec!["walking".to_string()],
            lifestyle: vec!["early nights".to_string()],
        },
    );

    // Leaf class 2 decodes to "Vata" under the alphabetical label encoder.
    let predictor = DoshaPredictor::builder()
        .with_components(test_registry(), leaf_model(2))
        .unwrap()
        .with_recommendations(table)
        .build()
        .unwrap();

    let assessment = predictor.assess(&full_record(Dosha::Vata)).unwrap();
    assert_eq!(assessment.prediction.label, "Vata");
    assert_eq!(assessment.recommendations.food_recommended, vec!["warm oats"]);
}

#[test]
fn test_rule_based_path_is_model_free() {
    let predictor = DoshaPredictor::builder()
        .with_components(test_registry(), leaf_model(0))
        .unwrap()
        .build()
        .unwrap();

    // The model always answers Kapha (class 0), but the rule-based path
    // still recovers Vata from the raw record.
    let record = full_record(Dosha::Vata);
    let prediction = predictor.predict(&record).unwrap();
    assert_eq!(prediction.label, "Kapha");

    let (rule_label, scores) = predictor.rule_based_dosha(&record);
    assert_eq!(rule_label, Dosha::Vata);
    assert_eq!(scores.vata, 22);
    assert_eq!(prediction.rule_scores, scores);
}
