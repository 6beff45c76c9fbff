use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of questionnaire slots the trained schema covers.
pub const ATTRIBUTE_COUNT: usize = 22;

/// The 22 body/behavior attributes of the dosha questionnaire.
///
/// Each attribute carries its canonical trained column name and a closed
/// three-value domain. The domain is ordered `[vata, pitta, kapha]`: position
/// `i` is the indicator value for the dosha with priority index `i`, which is
/// also what the rule-based scorer tallies against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    BodyFrame,
    TypeOfHair,
    ColorOfHair,
    SkinComplexion,
    BodyWeight,
    Nails,
    TeethSizeAndColor,
    WorkPace,
    MentalActivity,
    Memory,
    SleepPattern,
    WeatherConditions,
    ReactionUnderAdversity,
    Mood,
    EatingHabit,
    Hunger,
    BodyTemperature,
    Joints,
    Nature,
    BodyEnergy,
    VoiceQuality,
    BodyOdor,
}

impl Attribute {
    /// All attributes in canonical questionnaire order. This is also the
    /// column order the bundled training pipeline exports.
    pub const ALL: [Attribute; ATTRIBUTE_COUNT] = [
        Attribute::BodyFrame,
        Attribute::TypeOfHair,
        Attribute::ColorOfHair,
        Attribute::SkinComplexion,
        Attribute::BodyWeight,
        Attribute::Nails,
        Attribute::TeethSizeAndColor,
        Attribute::WorkPace,
        Attribute::MentalActivity,
        Attribute::Memory,
        Attribute::SleepPattern,
        Attribute::WeatherConditions,
        Attribute::ReactionUnderAdversity,
        Attribute::Mood,
        Attribute::EatingHabit,
        Attribute::Hunger,
        Attribute::BodyTemperature,
        Attribute::Joints,
        Attribute::Nature,
        Attribute::BodyEnergy,
        Attribute::VoiceQuality,
        Attribute::BodyOdor,
    ];

    /// The column name used at training time.
    pub fn canonical_name(self) -> &'static str {
        match self {
            Attribute::BodyFrame => "Body Frame",
            Attribute::TypeOfHair => "Type of Hair",
            Attribute::ColorOfHair => "Color of Hair",
            Attribute::SkinComplexion => "Skin Complexion",
            Attribute::BodyWeight => "Body Weight",
            Attribute::Nails => "Nails",
            Attribute::TeethSizeAndColor => "Size and Color of the Teeth",
            Attribute::WorkPace => "Pace of Performing Work",
            Attribute::MentalActivity => "Mental Activity",
            Attribute::Memory => "Memory",
            Attribute::SleepPattern => "Sleep Pattern",
            Attribute::WeatherConditions => "Weather Conditions",
            Attribute::ReactionUnderAdversity => "Reaction under Adverse Situations",
            Attribute::Mood => "Mood",
            Attribute::EatingHabit => "Eating Habit",
            Attribute::Hunger => "Hunger",
            Attribute::BodyTemperature => "Body Temperature",
            Attribute::Joints => "Joints",
            Attribute::Nature => "Nature",
            Attribute::BodyEnergy => "Body Energy",
            Attribute::VoiceQuality => "Quality of Voice",
            Attribute::BodyOdor => "Body Odor",
        }
    }

    /// The closed value domain, ordered `[vata, pitta, kapha]`.
    pub fn domain(self) -> [&'static str; 3] {
        match self {
            Attribute::BodyFrame => ["Thin", "Medium", "Large"],
            Attribute::TypeOfHair => ["Dry", "Oily", "Thick"],
            Attribute::ColorOfHair => ["Dark", "Reddish", "Light"],
            Attribute::SkinComplexion => ["Dry", "Sensitive", "Oily"],
            Attribute::BodyWeight => ["Light", "Moderate", "Heavy"],
            Attribute::Nails => ["Brittle", "Flexible", "Strong"],
            Attribute::TeethSizeAndColor => ["Small", "Medium", "Large"],
            Attribute::WorkPace => ["Fast", "Moderate", "Slow"],
            Attribute::MentalActivity => ["Quick", "Sharp", "Calm"],
            Attribute::Memory => ["Poor", "Good", "Excellent"],
            Attribute::SleepPattern => ["Light", "Moderate", "Deep"],
            Attribute::WeatherConditions => ["Cold", "Hot", "Humid"],
            Attribute::ReactionUnderAdversity => ["Anxious", "Angry", "Calm"],
            Attribute::Mood => ["Changeable", "Intense", "Stable"],
            Attribute::EatingHabit => ["Irregular", "Regular", "Slow"],
            Attribute::Hunger => ["Variable", "Strong", "Mild"],
            Attribute::BodyTemperature => ["Cold", "Hot", "Cool"],
            Attribute::Joints => ["Cracking", "Loose", "Stiff"],
            Attribute::Nature => ["Nervous", "Ambitious", "Easygoing"],
            Attribute::BodyEnergy => ["Low", "Moderate", "High"],
            Attribute::VoiceQuality => ["Hoarse", "Sharp", "Soft"],
            Attribute::BodyOdor => ["None", "Strong", "Mild"],
        }
    }

    /// Whether `value` belongs to this attribute's domain.
    pub fn is_in_domain(self, value: &str) -> bool {
        self.domain().contains(&value)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// A single questionnaire submission: attribute name to categorical value,
/// in insertion order.
///
/// Keys are free-form and may not match the trained column names; the
/// reconciler aligns them before encoding. Insertion order is preserved so
/// reconciliation tie-breaks are deterministic.
///
/// # Example
/// ```
/// use tridosha::AttributeRecord;
///
/// let mut record = AttributeRecord::new();
/// record.insert("Body Frame", "Thin");
/// record.insert("Memory", "Poor");
/// assert_eq!(record.get("Body Frame"), Some("Thin"));
/// assert_eq!(record.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeRecord {
    entries: Vec<(String, String)>,
}

impl AttributeRecord {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Inserts a value, replacing any existing value for the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Renames `from` to `to`, keeping the entry's position. Returns false if
    /// `from` is absent.
    pub fn rename_key(&mut self, from: &str, to: &str) -> bool {
        match self.entries.iter_mut().find(|(k, _)| k == from) {
            Some(entry) => {
                entry.0 = to.to_string();
                true
            }
            None => false,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for AttributeRecord {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut record = AttributeRecord::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

impl Serialize for AttributeRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AttributeRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = AttributeRecord;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of attribute names to categorical values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut record = AttributeRecord::new();
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    record.insert(key, value);
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}
