// 🐕 Breed Records - the dataset entries the curator corrects
// Only the fields the correction stages read or write are typed.
// Everything else in a record rides along untouched.

use anyhow::{bail, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// SIZE BAND
// ============================================================================

/// Canonical adult body size. Ordered: Toy < Small < Medium < Large < Giant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SizeBand {
    Toy,
    Small,
    Medium,
    Large,
    Giant,
}

impl SizeBand {
    /// Every band, lightest first
    pub const ALL: [SizeBand; 5] = [
        SizeBand::Toy,
        SizeBand::Small,
        SizeBand::Medium,
        SizeBand::Large,
        SizeBand::Giant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SizeBand::Toy => "Toy",
            SizeBand::Small => "Small",
            SizeBand::Medium => "Medium",
            SizeBand::Large => "Large",
            SizeBand::Giant => "Giant",
        }
    }

    /// Human-readable weight standard for the band (upper bound of the range)
    pub fn weight_standard(&self) -> &'static str {
        match self {
            SizeBand::Toy => "under 12 pounds",
            SizeBand::Small => "12-24 pounds",
            SizeBand::Medium => "25-59 pounds",
            SizeBand::Large => "60-99 pounds",
            SizeBand::Giant => "100+ pounds",
        }
    }
}

impl fmt::Display for SizeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeBand {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "Toy" => Ok(SizeBand::Toy),
            "Small" => Ok(SizeBand::Small),
            "Medium" => Ok(SizeBand::Medium),
            "Large" => Ok(SizeBand::Large),
            "Giant" => Ok(SizeBand::Giant),
            other => bail!(
                "Unknown size band: {:?} (expected Toy, Small, Medium, Large or Giant)",
                other
            ),
        }
    }
}

// ============================================================================
// BREED RECORD
// ============================================================================

/// One breed entry from the seed dataset.
///
/// `breed` is the display name and the only identity a record has. Duplicate
/// names are legal and are never merged.
///
/// The optional typed fields are three-state: `None` when the key is absent,
/// `Some(None)` for an explicit `null`, `Some(Some(_))` for a value. A
/// snapshot saved without changes keeps every key it was loaded with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreedRecord {
    pub breed: String,

    pub size: SizeBand,

    /// Free text; may be absent or null
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,

    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_filename: Option<Option<String>>,

    /// 1-10, higher = more commonly found in shelters
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub shelter_availability_score: Option<Option<u8>>,

    /// Fields the curator does not own (temperament, energy level, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Present key: `null` → `Some(None)`, value → `Some(Some(v))`.
/// Absent keys never reach this; `default` leaves them `None`.
fn nullable<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl BreedRecord {
    pub fn new(breed: &str, size: SizeBand) -> Self {
        BreedRecord {
            breed: breed.to_string(),
            size,
            description: None,
            image_filename: None,
            shelter_availability_score: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Builder pattern: add description
    pub fn with_description(mut self, description: &str) -> Self {
        self.set_description(description);
        self
    }

    /// Builder pattern: add image filename
    pub fn with_image(mut self, filename: &str) -> Self {
        self.set_image_filename(filename);
        self
    }

    /// Description text, empty when missing or null
    pub fn description(&self) -> &str {
        self.description.as_ref().and_then(|d| d.as_deref()).unwrap_or("")
    }

    pub fn image_filename(&self) -> Option<&str> {
        self.image_filename.as_ref().and_then(|f| f.as_deref())
    }

    pub fn shelter_availability_score(&self) -> Option<u8> {
        self.shelter_availability_score.flatten()
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = Some(Some(description.to_string()));
    }

    pub fn set_image_filename(&mut self, filename: &str) {
        self.image_filename = Some(Some(filename.to_string()));
    }

    pub fn set_shelter_availability_score(&mut self, score: u8) {
        self.shelter_availability_score = Some(Some(score));
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_band_order() {
        assert!(SizeBand::Toy < SizeBand::Small);
        assert!(SizeBand::Small < SizeBand::Medium);
        assert!(SizeBand::Medium < SizeBand::Large);
        assert!(SizeBand::Large < SizeBand::Giant);
    }

    #[test]
    fn test_size_band_parse() {
        assert_eq!("Medium".parse::<SizeBand>().unwrap(), SizeBand::Medium);
        assert_eq!(" Giant ".parse::<SizeBand>().unwrap(), SizeBand::Giant);
        assert!("medium".parse::<SizeBand>().is_err());
        assert!("Huge".parse::<SizeBand>().is_err());
    }

    #[test]
    fn test_record_keeps_unknown_fields() {
        let json = r#"{
            "breed": "Beagle",
            "size": "Small",
            "energy_level": "High",
            "good_with_kids": true,
            "description": "A merry hound."
        }"#;

        let record: BreedRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.breed, "Beagle");
        assert_eq!(record.size, SizeBand::Small);
        assert_eq!(record.description(), "A merry hound.");
        assert_eq!(record.extra["energy_level"], "High");
        assert_eq!(record.extra["good_with_kids"], true);

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["energy_level"], "High");
        assert!(back.get("image_filename").is_none());
    }

    #[test]
    fn test_missing_description_reads_as_empty() {
        let record: BreedRecord =
            serde_json::from_str(r#"{"breed": "Akita", "size": "Large"}"#).unwrap();

        assert_eq!(record.description, None);
        assert_eq!(record.description(), "");
    }

    #[test]
    fn test_null_fields_stay_null() {
        let json = r#"{"breed": "Akita", "size": "Large", "description": null, "image_filename": null, "shelter_availability_score": null}"#;
        let record: BreedRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.description, Some(None));
        assert_eq!(record.description(), "");
        assert_eq!(record.image_filename(), None);
        assert_eq!(record.shelter_availability_score(), None);
        assert!(record.extra.is_empty());

        let back = serde_json::to_value(&record).unwrap();
        assert!(back["description"].is_null());
        assert!(back["image_filename"].is_null());
        assert!(back["shelter_availability_score"].is_null());
        assert_eq!(back.as_object().unwrap().len(), 5);
    }

    #[test]
    fn test_setters_replace_null() {
        let mut record: BreedRecord =
            serde_json::from_str(r#"{"breed": "Akita", "size": "Large", "image_filename": null}"#)
                .unwrap();

        record.set_image_filename("akita.png");
        record.set_shelter_availability_score(4);

        assert_eq!(record.image_filename(), Some("akita.png"));
        assert_eq!(record.shelter_availability_score(), Some(4));
        assert_eq!(record.description, None);
    }

    #[test]
    fn test_unknown_size_rejected() {
        let result = serde_json::from_str::<BreedRecord>(r#"{"breed": "Akita", "size": "Huge"}"#);
        assert!(result.is_err());
    }
}
