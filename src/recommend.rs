use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// One of the three constitutional categories the classifier predicts.
///
/// The declaration order is the canonical priority order used to break ties
/// in the rule-based scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dosha {
    Vata,
    Pitta,
    Kapha,
}

impl Dosha {
    /// All doshas in priority order.
    pub const ALL: [Dosha; 3] = [Dosha::Vata, Dosha::Pitta, Dosha::Kapha];

    pub fn as_str(self) -> &'static str {
        match self {
            Dosha::Vata => "Vata",
            Dosha::Pitta => "Pitta",
            Dosha::Kapha => "Kapha",
        }
    }

    /// Index into `[vata, pitta, kapha]`-ordered sequences such as
    /// attribute domains.
    pub fn index(self) -> usize {
        match self {
            Dosha::Vata => 0,
            Dosha::Pitta => 1,
            Dosha::Kapha => 2,
        }
    }

    /// Parses a decoded label, ignoring ASCII case. Returns `None` for
    /// anything that is not one of the three dosha names.
    pub fn from_label(label: &str) -> Option<Dosha> {
        Dosha::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for Dosha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-category tallies produced by the rule-based scorer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DoshaScores {
    pub vata: u32,
    pub pitta: u32,
    pub kapha: u32,
}

impl DoshaScores {
    pub fn get(&self, dosha: Dosha) -> u32 {
        match dosha {
            Dosha::Vata => self.vata,
            Dosha::Pitta => self.pitta,
            Dosha::Kapha => self.kapha,
        }
    }

    pub fn add(&mut self, dosha: Dosha, count: u32) {
        match dosha {
            Dosha::Vata => self.vata += count,
            Dosha::Pitta => self.pitta += count,
            Dosha::Kapha => self.kapha += count,
        }
    }

    /// The category with the highest tally. Ties resolve to the first
    /// category reaching the maximum in priority order (Vata, Pitta, Kapha).
    pub fn dominant(&self) -> Dosha {
        let mut best = Dosha::Vata;
        for dosha in Dosha::ALL {
            if self.get(dosha) > self.get(best) {
                best = dosha;
            }
        }
        best
    }
}

impl fmt::Display for DoshaScores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.vata, self.pitta, self.kapha)
    }
}

/// Category-specific guidance returned alongside a prediction. Static
/// reference data, not derived by the inference pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationBundle {
    pub food_recommended: Vec<String>,
    pub food_avoid: Vec<String>,
    pub exercise: Vec<String>,
    pub lifestyle: Vec<String>,
}

impl RecommendationBundle {
    fn new(
        food_recommended: &[&str],
        food_avoid: &[&str],
        exercise: &[&str],
        lifestyle: &[&str],
    ) -> Self {
        let to_owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            food_recommended: to_owned(food_recommended),
            food_avoid: to_owned(food_avoid),
            exercise: to_owned(exercise),
            lifestyle: to_owned(lifestyle),
        }
    }
}

lazy_static! {
    static ref BUILTIN_RECOMMENDATIONS: HashMap<Dosha, RecommendationBundle> = {
        let mut table = HashMap::new();
        table.insert(
            Dosha::Vata,
            RecommendationBundle::new(
                &[
                    "Warm, cooked, and oily foods",
                    "Sweet fruits like bananas and mangoes",
                    "Soups and stews",
                ],
                &["Cold and raw foods", "Caffeine", "Dried fruits and beans"],
                &["Gentle yoga", "Tai chi", "Walking or light jogging"],
                &[
                    "Maintain a regular routine",
                    "Keep warm and stay grounded",
                    "Avoid overstimulation",
                ],
            ),
        );
        table.insert(
            Dosha::Pitta,
            RecommendationBundle::new(
                &[
                    "Cool and fresh foods",
                    "Sweet fruits like melons and grapes",
                    "Leafy greens and cucumbers",
                ],
                &[
                    "Spicy, fried, and oily foods",
                    "Alcohol and caffeine",
                    "Fermented foods",
                ],
                &["Swimming", "Evening walks", "Cooling yoga postures"],
                &[
                    "Stay cool physically and emotionally",
                    "Practice meditation or pranayama",
                    "Avoid overwork",
                ],
            ),
        );
        table.insert(
            Dosha::Kapha,
            RecommendationBundle::new(
                &[
                    "Light and warm foods",
                    "Spices like ginger and black pepper",
                    "Bitter and astringent vegetables",
                ],
                &["Heavy, oily, or cold foods", "Dairy and sweets", "Fried foods"],
                &["Jogging, cycling, or dancing", "Intense cardio", "Dynamic yoga"],
                &[
                    "Stay active and motivated",
                    "Avoid oversleeping",
                    "Engage in stimulating activities",
                ],
            ),
        );
        table
    };
}

/// The built-in recommendation table. Callers may supply their own table via
/// `PredictorBuilder::with_recommendations`.
pub fn builtin_recommendations() -> &'static HashMap<Dosha, RecommendationBundle> {
    &BUILTIN_RECOMMENDATIONS
}
