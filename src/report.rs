// 📋 Run Report - what a correction run changed and why
// Advisory output only; nothing reads it back.

use crate::breed::{BreedRecord, SizeBand};
use crate::knowledge::BreedTable;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::fs;
use std::path::Path;

// ============================================================================
// RECORD CHANGE
// ============================================================================

/// One field rewritten by one stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordChange {
    pub stage: String,
    /// Position in the collection
    pub index: usize,
    pub breed: String,
    pub field: String,
    pub old: String,
    pub new: String,
    pub reason: String,
}

impl RecordChange {
    pub fn summary(&self) -> String {
        if self.field == "description" {
            format!("{}: description replaced ({})", self.breed, self.reason)
        } else {
            format!(
                "{}: {} {} → {} ({})",
                self.breed, self.field, self.old, self.new, self.reason
            )
        }
    }
}

// ============================================================================
// CONFLICTS
// ============================================================================

/// A contradictory table entry, stringified for reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictSummary {
    pub table: String,
    pub breed: String,
    pub values: Vec<String>,
}

impl ConflictSummary {
    pub fn from_table<T>(table_name: &str, table: &BreedTable<T>) -> Vec<ConflictSummary>
    where
        T: Clone + PartialEq + fmt::Display,
    {
        table
            .conflicts()
            .iter()
            .map(|c| ConflictSummary {
                table: table_name.to_string(),
                breed: c.breed.clone(),
                values: c.values.iter().map(|v| v.to_string()).collect(),
            })
            .collect()
    }
}

// ============================================================================
// SIZE HISTOGRAM
// ============================================================================

/// Record count per band; every band present, zero counts included
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeHistogram(BTreeMap<SizeBand, usize>);

impl SizeHistogram {
    pub fn from_records(records: &[BreedRecord]) -> Self {
        let mut counts: BTreeMap<SizeBand, usize> =
            SizeBand::ALL.iter().map(|band| (*band, 0)).collect();

        for record in records {
            *counts.entry(record.size).or_insert(0) += 1;
        }

        SizeHistogram(counts)
    }

    pub fn count(&self, band: SizeBand) -> usize {
        self.0.get(&band).copied().unwrap_or(0)
    }

    /// Lightest band first
    pub fn iter(&self) -> impl Iterator<Item = (SizeBand, usize)> + '_ {
        self.0.iter().map(|(band, count)| (*band, *count))
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }
}

// ============================================================================
// MARKDOWN
// ============================================================================

/// Text safe inside a markdown table cell: `|` escaped, line breaks flattened
pub fn markdown_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

// ============================================================================
// RUN REPORT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageCount {
    pub stage: String,
    pub changes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub record_count: usize,
    pub stage_counts: Vec<StageCount>,
    pub changes: Vec<RecordChange>,
    pub conflicts: Vec<ConflictSummary>,
    pub histogram: SizeHistogram,
    /// SHA-256 of the written snapshot, once saved
    pub output_fingerprint: Option<String>,
}

impl RunReport {
    pub fn new(records: &[BreedRecord]) -> Self {
        RunReport {
            run_id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            record_count: records.len(),
            stage_counts: Vec::new(),
            changes: Vec::new(),
            conflicts: Vec::new(),
            histogram: SizeHistogram::from_records(records),
            output_fingerprint: None,
        }
    }

    pub fn total_changes(&self) -> usize {
        self.changes.len()
    }

    pub fn changes_for<'a>(&'a self, stage: &'a str) -> impl Iterator<Item = &'a RecordChange> {
        self.changes.iter().filter(move |c| c.stage == stage)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} records, {} changes across {} stages, {} table conflicts",
            self.record_count,
            self.total_changes(),
            self.stage_counts.len(),
            self.conflicts.len()
        )
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::new();

        // Writing into a String cannot fail
        let _ = writeln!(out, "# Breed Curation Report\n");
        let _ = writeln!(out, "**Run**: {}", self.run_id);
        let _ = writeln!(out, "**Started**: {}", self.started_at.to_rfc3339());
        let _ = writeln!(out, "**Records**: {}", self.record_count);
        let _ = writeln!(out, "**Changes**: {}", self.total_changes());
        if let Some(fingerprint) = &self.output_fingerprint {
            let _ = writeln!(out, "**Output SHA-256**: `{}`", fingerprint);
        }

        let _ = writeln!(out, "\n## Stages\n");
        let _ = writeln!(out, "| Stage | Changes |");
        let _ = writeln!(out, "|-------|---------|");
        for stage in &self.stage_counts {
            let _ = writeln!(out, "| {} | {} |", markdown_cell(&stage.stage), stage.changes);
        }

        let _ = writeln!(out, "\n## Size Distribution\n");
        let _ = writeln!(out, "| Size | Breeds |");
        let _ = writeln!(out, "|------|--------|");
        for (band, count) in self.histogram.iter() {
            let _ = writeln!(out, "| {} | {} |", band, count);
        }

        if !self.conflicts.is_empty() {
            let _ = writeln!(out, "\n## Table Conflicts (left unresolved)\n");
            let _ = writeln!(out, "| Table | Breed | Values |");
            let _ = writeln!(out, "|-------|-------|--------|");
            for conflict in &self.conflicts {
                let _ = writeln!(
                    out,
                    "| {} | {} | {} |",
                    markdown_cell(&conflict.table),
                    markdown_cell(&conflict.breed),
                    markdown_cell(&conflict.values.join(" / "))
                );
            }
        }

        if !self.changes.is_empty() {
            let _ = writeln!(out, "\n## Changes\n");
            let _ = writeln!(out, "| Stage | Breed | Field | Old | New | Reason |");
            let _ = writeln!(out, "|-------|-------|-------|-----|-----|--------|");
            for change in &self.changes {
                let (old, new) = if change.field == "description" {
                    ("…".to_string(), "…".to_string())
                } else {
                    (markdown_cell(&change.old), markdown_cell(&change.new))
                };
                let _ = writeln!(
                    out,
                    "| {} | {} | {} | {} | {} | {} |",
                    markdown_cell(&change.stage),
                    markdown_cell(&change.breed),
                    change.field,
                    old,
                    new,
                    markdown_cell(&change.reason)
                );
            }
        }

        out
    }

    pub fn write_markdown<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path.as_ref(), self.to_markdown())
            .with_context(|| format!("Failed to write report: {:?}", path.as_ref()))
    }

    pub fn write_changes_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(path.as_ref())
            .with_context(|| format!("Failed to create CSV file: {:?}", path.as_ref()))?;

        for change in &self.changes {
            writer
                .serialize(change)
                .context("Failed to serialize change row")?;
        }

        writer.flush().context("Failed to flush CSV file")?;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> RunReport {
        let records = vec![
            BreedRecord::new("Chihuahua", SizeBand::Toy),
            BreedRecord::new("Beagle", SizeBand::Small),
            BreedRecord::new("Boxer", SizeBand::Large),
        ];

        let mut report = RunReport::new(&records);
        report.stage_counts.push(StageCount {
            stage: "weight-sizes".to_string(),
            changes: 1,
        });
        report.changes.push(RecordChange {
            stage: "weight-sizes".to_string(),
            index: 2,
            breed: "Boxer".to_string(),
            field: "size".to_string(),
            old: "Medium".to_string(),
            new: "Large".to_string(),
            reason: "weight 50-80 lbs".to_string(),
        });
        report
    }

    #[test]
    fn test_histogram_lists_every_band() {
        let histogram = SizeHistogram::from_records(&[
            BreedRecord::new("Beagle", SizeBand::Small),
            BreedRecord::new("Beagle", SizeBand::Small),
            BreedRecord::new("Great Dane", SizeBand::Giant),
        ]);

        let bands: Vec<(SizeBand, usize)> = histogram.iter().collect();
        assert_eq!(
            bands,
            vec![
                (SizeBand::Toy, 0),
                (SizeBand::Small, 2),
                (SizeBand::Medium, 0),
                (SizeBand::Large, 0),
                (SizeBand::Giant, 1),
            ]
        );
        assert_eq!(histogram.total(), 3);
    }

    #[test]
    fn test_report_markdown() {
        let report = sample_report();
        let markdown = report.to_markdown();

        assert!(markdown.starts_with("# Breed Curation Report"));
        assert!(markdown.contains("| weight-sizes | 1 |"));
        assert!(markdown.contains("| Giant | 0 |"));
        assert!(markdown.contains("| weight-sizes | Boxer | size | Medium | Large | weight 50-80 lbs |"));
        assert!(!markdown.contains("Table Conflicts"));
    }

    #[test]
    fn test_markdown_escapes_pipes() {
        let mut report = sample_report();
        report.changes[0].breed = "Boxer | Mix".to_string();
        report.changes[0].reason = "line one\nline two".to_string();

        let markdown = report.to_markdown();

        assert!(markdown.contains("| weight-sizes | Boxer \\| Mix | size | Medium | Large | line one line two |"));
        assert_eq!(markdown_cell("a|b"), "a\\|b");
    }

    #[test]
    fn test_changes_for_stage() {
        let report = sample_report();

        assert_eq!(report.changes_for("weight-sizes").count(), 1);
        assert_eq!(report.changes_for("image-extensions").count(), 0);
        assert_eq!(report.summary(), "3 records, 1 changes across 1 stages, 0 table conflicts");
    }

    #[test]
    fn test_changes_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("changes.csv");

        sample_report().write_changes_csv(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("stage,index,breed,field,old,new,reason"));
        assert_eq!(
            lines.next(),
            Some("weight-sizes,2,Boxer,size,Medium,Large,weight 50-80 lbs")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_conflict_summary_from_table() {
        let table = BreedTable::from_entries(vec![
            ("Beagle", SizeBand::Small),
            ("Beagle", SizeBand::Large),
        ]);

        let conflicts = ConflictSummary::from_table("knowledge", &table);

        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].table, "knowledge");
        assert_eq!(conflicts[0].values, vec!["Small", "Large"]);
    }
}
