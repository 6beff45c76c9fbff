use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use env_logger;
use log::info;
use tridosha::{
    Attribute, AttributeRecord, ArtifactStore, BundleInfo, Dosha, DoshaPredictor,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON file containing one attribute record to classify; when omitted,
    /// a built-in set of demo records is classified instead
    input: Option<PathBuf>,

    /// Directory containing exported artifact files (skips the store)
    #[arg(short, long)]
    artifacts: Option<PathBuf>,

    /// Force a fresh download of the artifact bundle
    #[arg(short, long)]
    fresh: bool,
}

async fn ensure_artifacts(fresh: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let store = ArtifactStore::new_default()?;
    let bundle = BundleInfo::questionnaire_v1();

    if fresh {
        info!("Fresh download requested - removing any existing artifact files...");
        store.remove_bundle(&bundle)?;
    }

    store.ensure_downloaded(&bundle).await?;
    Ok(store.bundle_dir(&bundle.name))
}

fn record_from_file(path: &PathBuf) -> Result<AttributeRecord, Box<dyn std::error::Error>> {
    let raw = fs::read_to_string(path)?;
    let record: AttributeRecord = serde_json::from_str(&raw)?;
    Ok(record)
}

fn demo_record(dosha: Dosha) -> AttributeRecord {
    let mut record = AttributeRecord::new();
    for attribute in Attribute::ALL {
        record.insert(attribute.canonical_name(), attribute.domain()[dosha.index()]);
    }
    record
}

/// A demo record with drifted column names, exercising the reconciler the
/// way an older form version would.
fn drifted_demo_record() -> AttributeRecord {
    let mut drifted = AttributeRecord::new();
    for (key, value) in demo_record(Dosha::Pitta).iter() {
        drifted.insert(key.to_lowercase().replace(' ', "_"), value);
    }
    drifted
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    info!("=== Starting Dosha Classifier Demo ===");

    let artifact_dir = match &args.artifacts {
        Some(dir) => dir.clone(),
        None => ensure_artifacts(args.fresh).await?,
    };

    let start_time = Instant::now();
    info!("Building predictor from {:?}...", artifact_dir);

    let predictor = DoshaPredictor::builder()
        .with_artifact_dir(&artifact_dir)?
        .build()?;

    let build_time = start_time.elapsed();
    info!("=== Predictor Built Successfully (took {:.2?}) ===\n", build_time);

    let records: Vec<(String, AttributeRecord)> = match &args.input {
        Some(path) => vec![(format!("{:?}", path), record_from_file(path)?)],
        None => vec![
            ("vata-leaning demo".to_string(), demo_record(Dosha::Vata)),
            ("pitta-leaning demo".to_string(), demo_record(Dosha::Pitta)),
            ("kapha-leaning demo".to_string(), demo_record(Dosha::Kapha)),
            ("drifted column names demo".to_string(), drifted_demo_record()),
        ],
    };

    info!("=== Running Classifications ({} records) ===\n", records.len());
    let classify_start = Instant::now();

    for (index, (name, record)) in records.iter().enumerate() {
        info!(
            "\nRecord {}/{} (elapsed: {:.2?}): {}",
            index + 1,
            records.len(),
            classify_start.elapsed(),
            name
        );
        process_record(&predictor, record)?;
    }

    let total_time = start_time.elapsed();
    let classify_time = classify_start.elapsed();

    info!("\n=== Demo Complete ===");
    info!("Total time: {:.2?}", total_time);
    info!("Build time: {:.2?}", build_time);
    info!("Classification time: {:.2?}", classify_time);
    info!(
        "Average time per classification: {:.2?}",
        classify_time / records.len() as u32
    );

    Ok(())
}

fn process_record(
    predictor: &DoshaPredictor,
    record: &AttributeRecord,
) -> Result<(), Box<dyn std::error::Error>> {
    match predictor.assess(record) {
        Ok(assessment) => {
            let prediction = &assessment.prediction;
            println!("\nResults:");
            println!("  Predicted dosha: {}", prediction.label);
            println!(
                "  Rule-based tallies (Vata/Pitta/Kapha): {}",
                prediction.rule_scores
            );
            println!("  Foods to favor:");
            for item in &assessment.recommendations.food_recommended {
                println!("    - {}", item);
            }
            println!("  Foods to avoid:");
            for item in &assessment.recommendations.food_avoid {
                println!("    - {}", item);
            }
            println!("  Exercise:");
            for item in &assessment.recommendations.exercise {
                println!("    - {}", item);
            }
            println!("  Lifestyle:");
            for item in &assessment.recommendations.lifestyle {
                println!("    - {}", item);
            }
        }
        Err(e) => {
            eprintln!("\nError processing record: {}", e);
            eprintln!("Consider:");
            eprintln!("  - Checking that the record is not empty");
            eprintln!("  - Using values from each attribute's documented domain");
            eprintln!("  - Keeping column names close to the trained feature names");
            return Err(e.into());
        }
    }

    Ok(())
}
