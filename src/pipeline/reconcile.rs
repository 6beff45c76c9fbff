use log::{info, warn};

use super::utils::key_similarity;
use crate::attributes::AttributeRecord;

/// Default minimum normalized similarity for a fuzzy rename.
pub const DEFAULT_SIMILARITY_CUTOFF: f64 = 0.6;

/// Tunable constants of the reconciler.
///
/// The cutoff is compared against a normalized 0-1 similarity between column
/// names (lowercased, separator-folded). When several candidates tie at the
/// best score, the first one encountered in input order wins; a candidate is
/// consumed by at most one rename.
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    pub similarity_cutoff: f64,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self { similarity_cutoff: DEFAULT_SIMILARITY_CUTOFF }
    }
}

/// The outcome of aligning a record against the trained feature names: the
/// renamed record plus the renames that were applied, for logging and audit.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub record: AttributeRecord,
    /// `(input key, trained name)` pairs, in the order they were applied.
    pub renames: Vec<(String, String)>,
}

impl Reconciliation {
    pub fn was_renamed(&self) -> bool {
        !self.renames.is_empty()
    }
}

/// Aligns a record's keys to the trained feature names: exact matches are
/// kept as-is, and each missing trained name is filled by the best-scoring
/// unmatched input key at or above the configured cutoff.
///
/// Missing names are processed in trained order. Unmatched names stay
/// missing; this is a soft fail aimed at near-miss typos, and the encoder
/// surfaces any still-missing feature later.
pub fn align_record(
    record: &AttributeRecord,
    trained_features: &[String],
    config: &ReconcilerConfig,
) -> Reconciliation {
    let missing: Vec<&String> = trained_features
        .iter()
        .filter(|f| !record.contains_key(f.as_str()))
        .collect();
    let extra: Vec<String> = record
        .keys()
        .filter(|k| !trained_features.iter().any(|f| f.as_str() == *k))
        .map(|k| k.to_string())
        .collect();

    if missing.is_empty() && extra.is_empty() {
        return Reconciliation { record: record.clone(), renames: Vec::new() };
    }

    if !missing.is_empty() {
        warn!(
            "Column name mismatch detected ({} missing, {} unrecognized), attempting automatic correction",
            missing.len(),
            extra.len()
        );
    }

    let mut aligned = record.clone();
    let mut renames = Vec::new();
    let mut consumed = vec![false; extra.len()];

    for target in missing {
        let mut best: Option<(usize, f64)> = None;
        for (index, candidate) in extra.iter().enumerate() {
            if consumed[index] {
                continue;
            }
            let score = key_similarity(candidate, target);
            // Strictly-greater keeps the first-encountered candidate on ties.
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((index, score));
            }
        }
        match best {
            Some((index, score)) if score >= config.similarity_cutoff => {
                consumed[index] = true;
                aligned.rename_key(&extra[index], target);
                info!(
                    "Renamed input column '{}' -> '{}' (similarity {:.2})",
                    extra[index], target, score
                );
                renames.push((extra[index].clone(), target.clone()));
            }
            _ => {
                warn!("No close match for trained feature '{}'", target);
            }
        }
    }

    Reconciliation { record: aligned, renames }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trained(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_aligned_input_is_returned_unchanged() {
        let mut record = AttributeRecord::new();
        record.insert("Body Frame", "Thin");
        record.insert("Memory", "Poor");
        let features = trained(&["Body Frame", "Memory"]);

        let result = align_record(&record, &features, &ReconcilerConfig::default());
        assert_eq!(result.record, record);
        assert!(!result.was_renamed());
    }

    #[test]
    fn test_drifted_key_is_renamed() {
        let mut record = AttributeRecord::new();
        record.insert("hair_type", "Dry");
        let features = trained(&["Type of Hair"]);

        let result = align_record(&record, &features, &ReconcilerConfig::default());
        assert_eq!(result.record.get("Type of Hair"), Some("Dry"));
        assert_eq!(
            result.renames,
            vec![("hair_type".to_string(), "Type of Hair".to_string())]
        );
    }

    #[test]
    fn test_cutoff_is_honored() {
        let mut record = AttributeRecord::new();
        record.insert("hair_type", "Dry");
        let features = trained(&["Type of Hair"]);
        let config = ReconcilerConfig { similarity_cutoff: 0.99 };

        let result = align_record(&record, &features, &config);
        assert!(!result.was_renamed());
        assert!(result.record.contains_key("hair_type"));
    }

    #[test]
    fn test_no_candidate_leaves_feature_missing() {
        let mut record = AttributeRecord::new();
        record.insert("Body Frame", "Thin");
        let features = trained(&["Body Frame", "Memory"]);

        let result = align_record(&record, &features, &ReconcilerConfig::default());
        assert!(!result.record.contains_key("Memory"));
        assert!(!result.was_renamed());
    }

    #[test]
    fn test_rename_is_injective() {
        // One plausible candidate for two missing names: it may be consumed
        // only once, by the first missing name in trained order.
        let mut record = AttributeRecord::new();
        record.insert("body_frame", "Thin");
        let features = trained(&["Body Frame", "Body Weight"]);

        let result = align_record(&record, &features, &ReconcilerConfig::default());
        assert_eq!(
            result.renames,
            vec![("body_frame".to_string(), "Body Frame".to_string())]
        );
        assert!(result.record.contains_key("Body Frame"));
        assert!(!result.record.contains_key("Body Weight"));
    }

    #[test]
    fn test_tied_candidates_keep_first_encountered() {
        let mut record = AttributeRecord::new();
        record.insert("mood1", "Stable");
        record.insert("mood2", "Intense");
        let features = trained(&["Mood"]);

        let result = align_record(&record, &features, &ReconcilerConfig::default());
        assert_eq!(result.renames, vec![("mood1".to_string(), "Mood".to_string())]);
        assert_eq!(result.record.get("Mood"), Some("Stable"));
        assert!(result.record.contains_key("mood2"));
    }

    #[test]
    fn test_empty_record_yields_no_renames() {
        let record = AttributeRecord::new();
        let features = trained(&["Body Frame"]);
        let result = align_record(&record, &features, &ReconcilerConfig::default());
        assert!(result.record.is_empty());
        assert!(!result.was_renamed());
    }
}
