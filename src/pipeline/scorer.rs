use crate::attributes::{Attribute, AttributeRecord};
use crate::recommend::{Dosha, DoshaScores};

/// Tallies attribute matches against the three fixed indicator vectors.
///
/// Works on the raw, pre-reconciliation record and is entirely independent
/// of the schema registry and the classifier: each of the 22 slots is looked
/// up by canonical name and compared by exact string match. Slots that are
/// absent or match no indicator contribute nothing.
pub fn score_record(record: &AttributeRecord) -> DoshaScores {
    let mut scores = DoshaScores::default();
    for attribute in Attribute::ALL {
        if let Some(value) = record.get(attribute.canonical_name()) {
            let domain = attribute.domain();
            for dosha in Dosha::ALL {
                if value == domain[dosha.index()] {
                    scores.add(dosha, 1);
                }
            }
        }
    }
    scores
}

/// The model-free prediction path: the rule-based tally and its majority
/// label (ties resolve in Vata, Pitta, Kapha priority order).
pub fn rule_based_dosha(record: &AttributeRecord) -> (Dosha, DoshaScores) {
    let scores = score_record(record);
    (scores.dominant(), scores)
}
