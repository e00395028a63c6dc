// 📚 Breed Knowledge - breed name → value lookup tables
//
// Curated tables historically carried the same breed twice with different
// values. Tables here are built from entry lists so those contradictions are
// visible: identical repeats collapse, contradictory ones are pulled out of
// the table and kept as conflicts. A conflicting breed is never looked up.

use crate::breed::SizeBand;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::warn;

// ============================================================================
// BREED TABLE
// ============================================================================

/// A breed that was given more than one distinct value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConflict<T> {
    pub breed: String,
    /// Distinct values, in the order they first appeared
    pub values: Vec<T>,
}

/// Exact-match, case-sensitive breed table that preserves entry order
#[derive(Debug, Clone)]
pub struct BreedTable<T> {
    order: Vec<String>,
    entries: HashMap<String, T>,
    conflicts: Vec<TableConflict<T>>,
}

impl<T: Clone + PartialEq> BreedTable<T> {
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
    {
        let mut seen_order: Vec<String> = Vec::new();
        let mut seen: HashMap<String, Vec<T>> = HashMap::new();

        for (breed, value) in entries {
            let breed = breed.into();
            let values = seen.entry(breed.clone()).or_insert_with(|| {
                seen_order.push(breed.clone());
                Vec::new()
            });
            if !values.contains(&value) {
                values.push(value);
            }
        }

        let mut order = Vec::new();
        let mut table = HashMap::new();
        let mut conflicts = Vec::new();

        for breed in seen_order {
            let Some(mut values) = seen.remove(&breed) else {
                continue;
            };
            if values.len() == 1 {
                if let Some(value) = values.pop() {
                    order.push(breed.clone());
                    table.insert(breed, value);
                }
            } else {
                conflicts.push(TableConflict { breed, values });
            }
        }

        BreedTable {
            order,
            entries: table,
            conflicts,
        }
    }

    pub fn get(&self, breed: &str) -> Option<&T> {
        self.entries.get(breed)
    }

    pub fn contains(&self, breed: &str) -> bool {
        self.entries.contains_key(breed)
    }

    /// Entries in the order they were first listed
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.order
            .iter()
            .filter_map(|breed| self.entries.get(breed).map(|v| (breed.as_str(), v)))
    }

    pub fn breeds(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn conflicts(&self) -> &[TableConflict<T>] {
        &self.conflicts
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Clone + PartialEq + fmt::Display> BreedTable<T> {
    /// Log every conflict once, tagged with the table's name
    pub fn warn_conflicts(&self, table: &str) {
        for conflict in &self.conflicts {
            let values: Vec<String> = conflict.values.iter().map(|v| v.to_string()).collect();
            warn!(
                table,
                breed = %conflict.breed,
                values = %values.join(" / "),
                "contradictory entries, breed left out of table"
            );
        }
    }
}

// ============================================================================
// KNOWLEDGE TABLE
// ============================================================================

/// Breed → size fallback used only when a description carries no weight
pub type BreedKnowledgeTable = BreedTable<SizeBand>;

/// On-disk entry: `{"breed": "Chihuahua", "size": "Toy"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeEntry {
    pub breed: String,
    pub size: SizeBand,
}

impl BreedTable<SizeBand> {
    /// Load a knowledge table from a JSON array of `SizeEntry`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read knowledge file: {:?}", path.as_ref()))?;

        let entries: Vec<SizeEntry> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse knowledge JSON: {:?}", path.as_ref()))?;

        Ok(Self::from_size_entries(&entries))
    }

    pub fn from_size_entries(entries: &[SizeEntry]) -> Self {
        BreedTable::from_entries(entries.iter().map(|e| (e.breed.clone(), e.size)))
    }

    /// Built-in breed knowledge
    pub fn builtin() -> Self {
        BreedTable::from_entries(BUILTIN_KNOWLEDGE.iter().copied())
    }
}

use SizeBand::{Giant, Large, Medium, Small, Toy};

const BUILTIN_KNOWLEDGE: &[(&str, SizeBand)] = &[
    // Toy (under 12 lbs)
    ("Chihuahua", Toy),
    ("Yorkshire Terrier", Toy),
    ("Maltese", Toy),
    ("Pomeranian", Toy),
    ("Papillon", Toy),
    ("Pekingese", Toy),
    ("Japanese Chin", Toy),
    ("Toy Fox Terrier", Toy),
    ("Toy Manchester Terrier", Toy),
    ("Norwich Terrier", Toy),
    ("Norfolk Terrier", Toy),
    ("Silky Terrier", Toy),
    ("Cairn Terrier", Toy),
    ("Dandie Dinmont Terrier", Toy),
    ("Miniature Pinscher", Toy),
    ("Affenpinscher", Toy),
    ("Brussels Griffon", Toy),
    ("Italian Greyhound", Toy),
    ("Havanese", Toy),
    ("Bichon Frise", Toy),
    ("Chinese Crested", Toy),
    ("Miniature Poodle", Toy),
    // Small (12-25 lbs)
    ("Boston Terrier", Small),
    ("French Bulldog", Small),
    ("Beagle", Small),
    ("Dachshund", Small),
    ("Miniature Schnauzer", Small),
    ("Jack Russell Terrier", Small),
    ("Scottish Terrier", Small),
    ("West Highland White Terrier", Small),
    ("Manchester Terrier", Small),
    ("Rat Terrier", Small),
    ("Lakeland Terrier", Small),
    ("Sealyham Terrier", Small),
    ("Smooth Fox Terrier", Small),
    ("Cocker Spaniel", Small),
    ("Cavalier King Charles Spaniel", Small),
    ("Shetland Sheepdog", Small),
    ("Pembroke Welsh Corgi", Small),
    ("Cardigan Welsh Corgi", Small),
    ("Bolognese", Small),
    ("Puggle", Small),
    ("Yorkipoo", Small),
    ("Maltipoo", Small),
    ("Cockapoo", Small),
    ("Cavapoo", Small),
    ("Chiweenie", Small),
    // Medium (25-60 lbs)
    ("Bulldog", Medium),
    ("English Bulldog", Medium),
    ("Staffordshire Bull Terrier", Medium),
    ("Miniature Bull Terrier", Medium),
    ("German Shepherd", Medium),
    ("Golden Retriever", Medium),
    ("Labrador Retriever", Medium),
    ("Border Collie", Medium),
    ("Australian Shepherd", Medium),
    ("Boxer", Medium),
    ("Poodle", Medium),
    ("Rottweiler", Medium),
    ("Doberman Pinscher", Medium),
    ("Akita", Medium),
    ("Siberian Husky", Medium),
    ("Alaskan Malamute", Medium),
    ("Samoyed", Medium),
    ("Chow Chow", Medium),
    ("Shar Pei", Medium),
    ("Bernese Mountain Dog", Medium),
    ("Collie", Medium),
    ("Rhodesian Ridgeback", Medium),
    ("Dalmatian", Medium),
    ("Vizsla", Medium),
    ("Weimaraner", Medium),
    ("Pointer", Medium),
    ("English Setter", Medium),
    ("Irish Setter", Medium),
    ("Gordon Setter", Medium),
    ("Brittany", Medium),
    ("English Springer Spaniel", Medium),
    ("English Cocker Spaniel", Medium),
    ("Field Spaniel", Medium),
    ("Welsh Springer Spaniel", Medium),
    ("Clumber Spaniel", Medium),
    ("Sussex Spaniel", Medium),
    ("Irish Water Spaniel", Medium),
    ("German Shorthaired Pointer", Medium),
    ("German Wirehaired Pointer", Medium),
    ("Basset Hound", Medium),
    ("Newfoundland", Medium),
    ("Saint Bernard", Medium),
    ("Mastiff", Medium),
    ("Neapolitan Mastiff", Medium),
    ("Tibetan Mastiff", Medium),
    ("Cane Corso", Medium),
    ("Boerboel", Medium),
    ("Belgian Malinois", Medium),
    ("Belgian Sheepdog", Medium),
    ("Belgian Tervuren", Medium),
    ("Belgian Laekenois", Medium),
    ("Dutch Shepherd", Medium),
    ("Briard", Medium),
    ("Beauceron", Medium),
    ("Berger Picard", Medium),
    ("Polish Lowland Sheepdog", Medium),
    ("Old English Sheepdog", Medium),
    ("Greater Swiss Mountain Dog", Medium),
    ("Leonberger", Medium),
    ("Spanish Mastiff", Medium),
    ("Goldendoodle", Medium),
    ("Labradoodle", Medium),
    ("Aussiedoodle", Medium),
    ("Schnoodle", Medium),
    ("Pitsky", Medium),
    // Large (60+ lbs)
    ("American Bulldog", Large),
    ("Alapaha Blue Blood Bulldog", Large),
    ("American Pit Bull Terrier", Large),
    ("American Staffordshire Terrier", Large),
    ("Black Russian Terrier", Large),
    ("Giant Schnauzer", Large),
    ("Standard Schnauzer", Large),
    ("Airedale Terrier", Large),
    ("Bull Terrier", Large),
    ("Standard Bull Terrier", Large),
    ("American Foxhound", Large),
    ("English Foxhound", Large),
    ("Treeing Walker Coonhound", Large),
    ("Bluetick Coonhound", Large),
    ("Redbone Coonhound", Large),
    ("Plott Hound", Large),
    ("Black and Tan Coonhound", Large),
    ("Bloodhound", Large),
    ("Harrier", Large),
    ("Otterhound", Large),
    ("Petit Basset Griffon Vendéen", Large),
    ("Basset Fauve de Bretagne", Large),
    ("Grand Basset Griffon Vendéen", Large),
    ("Basset Artésien Normand", Large),
    ("Basset Bleu de Gascogne", Large),
    // Giant (100+ lbs)
    ("Great Dane", Giant),
    ("Irish Wolfhound", Giant),
    ("Scottish Deerhound", Giant),
];

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_lookup() {
        let table = BreedKnowledgeTable::builtin();

        assert_eq!(table.get("Chihuahua"), Some(&SizeBand::Toy));
        assert_eq!(table.get("Great Dane"), Some(&SizeBand::Giant));
        assert_eq!(table.get("Basset Hound"), Some(&SizeBand::Medium));
        assert!(table.conflicts().is_empty());
    }

    #[test]
    fn test_lookup_is_exact() {
        let table = BreedKnowledgeTable::builtin();

        assert!(table.contains("Beagle"));
        assert!(!table.contains("beagle"));
        assert!(!table.contains("Beagle "));
    }

    #[test]
    fn test_identical_duplicates_collapse() {
        let table = BreedTable::from_entries(vec![
            ("Border Collie", SizeBand::Medium),
            ("Collie", SizeBand::Medium),
            ("Border Collie", SizeBand::Medium),
        ]);

        assert_eq!(table.len(), 2);
        assert!(table.conflicts().is_empty());
        assert_eq!(table.breeds().collect::<Vec<_>>(), vec!["Border Collie", "Collie"]);
    }

    #[test]
    fn test_contradictions_are_pulled_out() {
        let table = BreedTable::from_entries(vec![
            ("Beagle", SizeBand::Small),
            ("Boxer", SizeBand::Medium),
            ("Beagle", SizeBand::Large),
            ("Beagle", SizeBand::Small),
        ]);

        assert_eq!(table.get("Beagle"), None);
        assert_eq!(table.get("Boxer"), Some(&SizeBand::Medium));
        assert_eq!(
            table.conflicts(),
            &[TableConflict {
                breed: "Beagle".to_string(),
                values: vec![SizeBand::Small, SizeBand::Large],
            }]
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"breed": "Basset Hound", "size": "Large"}},
                {{"breed": "Basset Hound", "size": "Medium"}},
                {{"breed": "Pug", "size": "Small"}}
            ]"#
        )
        .unwrap();

        let table = BreedKnowledgeTable::from_file(file.path()).unwrap();

        assert_eq!(table.get("Pug"), Some(&SizeBand::Small));
        assert!(!table.contains("Basset Hound"));
        assert_eq!(table.conflicts().len(), 1);
    }

    #[test]
    fn test_load_rejects_bad_size() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"breed": "Pug", "size": "Tiny"}}]"#).unwrap();

        assert!(BreedKnowledgeTable::from_file(file.path()).is_err());
    }
}
