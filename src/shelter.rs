// 🏠 Shelter Availability - how often a breed turns up in shelters (1-10)

use crate::knowledge::BreedTable;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SHELTER_SCORE: u8 = 5;

/// On-disk entry: `{"breed": "beagle", "score": 9}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub breed: String,
    pub score: u8,
}

/// Scores breeds by name with the fallback chain:
/// exact → doodle/poo/mix → terrier → yorkie → partial table match → default
#[derive(Debug, Clone)]
pub struct ShelterScorer {
    table: BreedTable<u8>,
    default_score: u8,
}

impl ShelterScorer {
    /// Keys are lower-cased and trimmed before they enter the table
    pub fn new(entries: &[ScoreEntry], default_score: u8) -> Self {
        let table = BreedTable::from_entries(
            entries
                .iter()
                .map(|e| (normalize_breed_key(&e.breed), e.score)),
        );

        ShelterScorer {
            table,
            default_score,
        }
    }

    pub fn table(&self) -> &BreedTable<u8> {
        &self.table
    }

    pub fn score(&self, breed: &str) -> u8 {
        let name = normalize_breed_key(breed);

        if let Some(score) = self.table.get(&name) {
            return *score;
        }

        if ["doodle", "poo", "mix"].iter().any(|k| name.contains(k)) {
            return 9;
        }

        if name.contains("terrier") {
            return 8;
        }

        if ["yorkie", "yorkshire", "york"].iter().any(|k| name.contains(k)) {
            return 9;
        }

        self.table
            .iter()
            .find(|(key, _)| name.contains(key) || key.contains(name.as_str()))
            .map(|(_, score)| *score)
            .unwrap_or(self.default_score)
    }
}

fn normalize_breed_key(breed: &str) -> String {
    breed.trim().to_lowercase()
}
