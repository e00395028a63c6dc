// 📏 Size Classification - weight range (or breed knowledge) → size band
//
// Weight wins whenever the description carries one. Only without a weight
// is the knowledge table consulted, and a breed it does not know keeps the
// size it already has.

use crate::breed::{BreedRecord, SizeBand};
use crate::knowledge::BreedKnowledgeTable;
use crate::weight::{extract_weight_match, WeightPattern, WeightRange};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Exclusive upper bounds (pounds) for every band but Giant
pub const SIZE_THRESHOLDS: [(u32, SizeBand); 4] = [
    (12, SizeBand::Toy),
    (25, SizeBand::Small),
    (60, SizeBand::Medium),
    (100, SizeBand::Large),
];

/// Band for a single weight in pounds
pub fn size_for_weight(pounds: u32) -> SizeBand {
    SIZE_THRESHOLDS
        .iter()
        .find(|(limit, _)| pounds < *limit)
        .map(|(_, band)| *band)
        .unwrap_or(SizeBand::Giant)
}

/// Band for a range: the heavier end decides
pub fn size_for_range(range: WeightRange) -> SizeBand {
    size_for_weight(range.max())
}

// ============================================================================
// CLASSIFICATION RESULT
// ============================================================================

/// Where a classification came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeBasis {
    Weight(WeightRange),
    Knowledge,
    Retained,
}

impl SizeBasis {
    pub fn describe(&self) -> String {
        match self {
            SizeBasis::Weight(range) => format!("weight {}", range),
            SizeBasis::Knowledge => "breed knowledge".to_string(),
            SizeBasis::Retained => "no weight info, breed unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub size: SizeBand,
    /// `size != current size`; reporting only
    pub changed: bool,
    pub basis: SizeBasis,
}

// ============================================================================
// SIZE CLASSIFIER
// ============================================================================

#[derive(Debug, Clone)]
pub struct SizeClassifier {
    knowledge: BreedKnowledgeTable,
}

impl SizeClassifier {
    pub fn new(knowledge: BreedKnowledgeTable) -> Self {
        SizeClassifier { knowledge }
    }

    pub fn knowledge(&self) -> &BreedKnowledgeTable {
        &self.knowledge
    }

    /// Classify one breed. Total: every input yields a band.
    pub fn classify(
        &self,
        breed: &str,
        weight: Option<WeightRange>,
        current: SizeBand,
    ) -> Classification {
        let (size, basis) = match weight {
            Some(range) => (size_for_range(range), SizeBasis::Weight(range)),
            None => match self.knowledge.get(breed) {
                Some(size) => (*size, SizeBasis::Knowledge),
                None => (current, SizeBasis::Retained),
            },
        };

        Classification {
            size,
            changed: size != current,
            basis,
        }
    }

    /// Extract, classify and overwrite `size` for every record, in order.
    pub fn apply(&self, records: &mut [BreedRecord]) -> Vec<SizeDecision> {
        records
            .iter_mut()
            .enumerate()
            .map(|(index, record)| {
                let found = extract_weight_match(record.description());
                let classification =
                    self.classify(&record.breed, found.map(|m| m.range), record.size);

                let decision = SizeDecision {
                    index,
                    breed: record.breed.clone(),
                    old_size: record.size,
                    classification,
                    pattern: found.map(|m| m.pattern),
                };

                debug!(
                    breed = %record.breed,
                    old = %record.size,
                    new = %classification.size,
                    basis = %classification.basis.describe(),
                    "size decision"
                );

                if classification.changed {
                    record.size = classification.size;
                }

                decision
            })
            .collect()
    }
}

impl Default for SizeClassifier {
    fn default() -> Self {
        Self::new(BreedKnowledgeTable::builtin())
    }
}

/// Outcome for one record of a batch size pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeDecision {
    /// Position in the collection (breed names are not unique)
    pub index: usize,
    pub breed: String,
    pub old_size: SizeBand,
    pub classification: Classification,
    pub pattern: Option<WeightPattern>,
}

impl SizeDecision {
    pub fn summary(&self) -> String {
        let new_size = self.classification.size;
        match (self.classification.changed, self.classification.basis) {
            (true, basis) => format!(
                "{}: {} → {} ({})",
                self.breed,
                self.old_size,
                new_size,
                basis.describe()
            ),
            (false, SizeBasis::Retained) => format!(
                "{}: keeping existing size ({}) - no weight info found",
                self.breed, new_size
            ),
            (false, basis) => format!(
                "{}: already correct ({}) - {}",
                self.breed,
                new_size,
                basis.describe()
            ),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::BreedTable;
    use crate::weight::extract_weight;

    fn classifier() -> SizeClassifier {
        SizeClassifier::new(BreedTable::from_entries(vec![
            ("Chihuahua", SizeBand::Toy),
            ("Great Dane", SizeBand::Giant),
        ]))
    }

    #[test]
    fn test_threshold_boundaries() {
        assert_eq!(size_for_weight(0), SizeBand::Toy);
        assert_eq!(size_for_weight(11), SizeBand::Toy);
        assert_eq!(size_for_weight(12), SizeBand::Small);
        assert_eq!(size_for_weight(24), SizeBand::Small);
        assert_eq!(size_for_weight(25), SizeBand::Medium);
        assert_eq!(size_for_weight(59), SizeBand::Medium);
        assert_eq!(size_for_weight(60), SizeBand::Large);
        assert_eq!(size_for_weight(99), SizeBand::Large);
        assert_eq!(size_for_weight(100), SizeBand::Giant);
        assert_eq!(size_for_weight(u32::MAX), SizeBand::Giant);
    }

    #[test]
    fn test_upper_bound_decides() {
        assert_eq!(size_for_range(WeightRange::new(8, 12)), SizeBand::Small);
        assert_eq!(size_for_range(WeightRange::new(45, 70)), SizeBand::Large);
        assert_eq!(size_for_range(WeightRange::new(70, 45)), SizeBand::Large);
    }

    #[test]
    fn test_weight_beats_knowledge() {
        // Great Dane is Giant in the table, but a 20 lb description wins
        let result = classifier().classify(
            "Great Dane",
            Some(WeightRange::new(15, 20)),
            SizeBand::Giant,
        );

        assert_eq!(result.size, SizeBand::Small);
        assert!(result.changed);
        assert_eq!(result.basis, SizeBasis::Weight(WeightRange::new(15, 20)));
    }

    #[test]
    fn test_oversized_weight_is_giant() {
        let weight = extract_weight("This giant weighs 5000000000 pounds.");
        let result = classifier().classify("Mystery", weight, SizeBand::Small);

        assert_eq!(result.size, SizeBand::Giant);
        assert!(result.changed);
    }

    #[test]
    fn test_unknown_breed_without_weight_is_retained() {
        let classifier = classifier();

        for current in SizeBand::ALL {
            let result = classifier.classify("Mystery Mutt", None, current);
            assert_eq!(result.size, current);
            assert!(!result.changed);
            assert_eq!(result.basis, SizeBasis::Retained);
        }
    }

    #[test]
    fn test_classify_is_idempotent() {
        let classifier = classifier();
        let cases = [
            ("Chihuahua", None, SizeBand::Large),
            ("Mystery Mutt", Some(WeightRange::new(25, 30)), SizeBand::Small),
            ("Great Dane", None, SizeBand::Medium),
        ];

        for (breed, weight, current) in cases {
            let first = classifier.classify(breed, weight, current);
            let second = classifier.classify(breed, weight, first.size);
            assert_eq!(second.size, first.size);
            assert!(!second.changed);
        }
    }

    #[test]
    fn test_scenario_weight_in_lbs() {
        let weight = extract_weight("This loyal dog weighs 25-30 lbs and stands 18 inches tall.");
        assert_eq!(weight, Some(WeightRange::new(25, 30)));

        let result = classifier().classify("Some Dog", weight, SizeBand::Small);
        assert_eq!(result.size, SizeBand::Medium);
        assert!(result.changed);
    }

    #[test]
    fn test_scenario_empty_description_uses_knowledge() {
        let weight = extract_weight("");
        assert_eq!(weight, None);

        let result = classifier().classify("Chihuahua", weight, SizeBand::Small);
        assert_eq!(result.size, SizeBand::Toy);
        assert!(result.changed);
        assert_eq!(result.basis, SizeBasis::Knowledge);
    }

    #[test]
    fn test_apply_batch() {
        let mut records = vec![
            BreedRecord::new("Chihuahua", SizeBand::Small),
            BreedRecord::new("Labrador Retriever", SizeBand::Medium)
                .with_description("Labs typically weigh 55-80 pounds."),
            BreedRecord::new("Mystery Mutt", SizeBand::Medium).with_description("Sweet."),
            BreedRecord::new("Beagle", SizeBand::Small).with_description("About 20 lbs."),
        ];

        let decisions = classifier().apply(&mut records);

        assert_eq!(decisions.len(), 4);
        assert_eq!(records[0].size, SizeBand::Toy);
        assert_eq!(records[1].size, SizeBand::Large);
        assert_eq!(records[2].size, SizeBand::Medium);
        assert_eq!(records[3].size, SizeBand::Small);

        let changed: Vec<usize> = decisions
            .iter()
            .filter(|d| d.classification.changed)
            .map(|d| d.index)
            .collect();
        assert_eq!(changed, vec![0, 1]);
        assert_eq!(decisions[1].pattern, Some(WeightPattern::WeighsPoundsRange));
        assert_eq!(decisions[0].pattern, None);

        // Second pass changes nothing
        let again = classifier().apply(&mut records);
        assert!(again.iter().all(|d| !d.classification.changed));
    }

    #[test]
    fn test_decision_summary() {
        let mut records = vec![BreedRecord::new("Mystery Mutt", SizeBand::Medium)];
        let decisions = classifier().apply(&mut records);

        assert_eq!(
            decisions[0].summary(),
            "Mystery Mutt: keeping existing size (Medium) - no weight info found"
        );
    }
}
