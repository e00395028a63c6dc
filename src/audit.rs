// ✅ Breed Audit - read-only checks over descriptions, sizes and images
//
// Each check produces a ValidationResult; failures also become AuditIssues
// with a recommendation. Nothing here mutates a record.

use crate::breed::{BreedRecord, SizeBand};
use crate::report::markdown_cell;
use crate::size::size_for_range;
use crate::weight::extract_weight;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

// ============================================================================
// VALIDATION RESULT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub passed: bool,
    pub rule_name: String,
    pub field: String,
    pub message: String,
    pub severity: Severity,
}

impl ValidationResult {
    pub fn pass(rule_name: &str, field: &str, message: &str) -> Self {
        ValidationResult {
            passed: true,
            rule_name: rule_name.to_string(),
            field: field.to_string(),
            message: message.to_string(),
            severity: Severity::Info,
        }
    }

    pub fn fail(rule_name: &str, field: &str, message: &str, severity: Severity) -> Self {
        ValidationResult {
            passed: false,
            rule_name: rule_name.to_string(),
            field: field.to_string(),
            message: message.to_string(),
            severity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Critical, // Record is unusable as seed data
    Warning,  // Record is probably wrong
    Info,     // Record is usable but could be improved
}

// ============================================================================
// AUDIT REPORT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditIssue {
    pub severity: Severity,
    pub rule_name: String,
    pub field: String,
    pub issue: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub breed: String,
    pub validations: Vec<ValidationResult>,
    pub issues: Vec<AuditIssue>,
    pub passed_count: usize,
    pub failed_count: usize,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        self.issues
            .iter()
            .any(|i| matches!(i.severity, Severity::Critical | Severity::Warning))
    }

    pub fn has_issue(&self, rule_name: &str) -> bool {
        self.issues.iter().any(|i| i.rule_name == rule_name)
    }
}

// ============================================================================
// IMAGE CATALOG
// ============================================================================

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Normalized stems of the image files that actually exist
#[derive(Debug, Clone, Default)]
pub struct ImageCatalog {
    names: HashSet<String>,
}

impl ImageCatalog {
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let entries = fs::read_dir(dir.as_ref())
            .with_context(|| format!("Failed to read images directory: {:?}", dir.as_ref()))?;

        let mut names = HashSet::new();
        for entry in entries {
            let path = entry.context("Failed to read directory entry")?.path();
            let is_image = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
                .unwrap_or(false);

            if is_image {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    names.insert(normalize_image_name(name));
                }
            }
        }

        Ok(ImageCatalog { names })
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ImageCatalog {
            names: names
                .into_iter()
                .map(|n| normalize_image_name(n.as_ref()))
                .collect(),
        }
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.names.contains(&normalize_image_name(filename))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// `German_Shepherd-Dog.PNG` → `german shepherd dog`
pub fn normalize_image_name(filename: &str) -> String {
    let lower = filename.trim().to_lowercase();
    let stem = IMAGE_EXTENSIONS
        .iter()
        .find_map(|ext| lower.strip_suffix(&format!(".{}", ext)).map(str::to_string))
        .unwrap_or(lower);

    stem.replace(['_', '-'], " ")
}

// ============================================================================
// BREED AUDITOR
// ============================================================================

pub struct BreedAuditor {
    /// Breed names a description might mention instead of its own, longest first
    known_breeds: Vec<String>,

    images: Option<ImageCatalog>,
}

impl BreedAuditor {
    pub fn new<I, S>(known_breeds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut known: Vec<String> = known_breeds.into_iter().map(Into::into).collect();
        known.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        known.dedup();

        BreedAuditor {
            known_breeds: known,
            images: None,
        }
    }

    /// Also check that each record's image exists
    pub fn with_images(mut self, images: ImageCatalog) -> Self {
        self.images = Some(images);
        self
    }

    pub fn audit(&self, record: &BreedRecord) -> AuditReport {
        let checks = [
            (
                self.validate_description(record),
                "Add a description for the breed",
            ),
            (
                self.validate_breed_mention(record),
                "Check the description belongs to this breed",
            ),
            (
                self.validate_size_weight(record),
                "Reconcile the stored size with the weight in the description",
            ),
            (
                self.validate_image(record),
                "Add the image asset or fix image_filename",
            ),
        ];

        let mut validations = Vec::new();
        let mut issues = Vec::new();

        for (result, recommendation) in checks {
            if !result.passed {
                issues.push(AuditIssue {
                    severity: result.severity,
                    rule_name: result.rule_name.clone(),
                    field: result.field.clone(),
                    issue: result.message.clone(),
                    recommendation: recommendation.to_string(),
                });
            }
            validations.push(result);
        }

        let passed_count = validations.iter().filter(|v| v.passed).count();
        let failed_count = validations.len() - passed_count;

        AuditReport {
            breed: record.breed.clone(),
            validations,
            issues,
            passed_count,
            failed_count,
        }
    }

    pub fn audit_batch(&self, records: &[BreedRecord]) -> Vec<AuditReport> {
        records.iter().map(|r| self.audit(r)).collect()
    }

    pub fn batch_summary(&self, reports: &[AuditReport]) -> AuditSummary {
        let count_rule = |rule: &str| reports.iter().filter(|r| r.has_issue(rule)).count();

        AuditSummary {
            total_breeds: reports.len(),
            clean_count: reports.iter().filter(|r| r.is_clean()).count(),
            needs_review_count: reports.iter().filter(|r| r.has_warnings()).count(),
            empty_descriptions: count_rule("description_empty"),
            wrong_breed_descriptions: count_rule("description_mentions_other_breed"),
            size_mismatches: count_rule("size_weight_mismatch"),
            missing_images: count_rule("image_missing"),
        }
    }

    // ========================================================================
    // VALIDATION RULES
    // ========================================================================

    fn validate_description(&self, record: &BreedRecord) -> ValidationResult {
        if record.description().trim().is_empty() {
            return ValidationResult::fail(
                "description_empty",
                "description",
                "Description is empty",
                Severity::Warning,
            );
        }

        ValidationResult::pass("description_present", "description", "Description present")
    }

    fn validate_breed_mention(&self, record: &BreedRecord) -> ValidationResult {
        let description = record.description();
        if description.is_empty() || description.contains(&record.breed) {
            return ValidationResult::pass(
                "description_matches_breed",
                "description",
                "Description names its own breed or is empty",
            );
        }

        let other = self
            .known_breeds
            .iter()
            .find(|b| **b != record.breed && description.contains(b.as_str()));

        match other {
            Some(other) => ValidationResult::fail(
                "description_mentions_other_breed",
                "description",
                &format!("Description talks about {} instead", other),
                Severity::Warning,
            ),
            None => ValidationResult::fail(
                "description_missing_breed_name",
                "description",
                "Description does not mention the breed by name",
                Severity::Info,
            ),
        }
    }

    fn validate_size_weight(&self, record: &BreedRecord) -> ValidationResult {
        let Some(range) = extract_weight(record.description()) else {
            return ValidationResult::pass("size_no_weight", "size", "No weight in description");
        };

        let by_weight: SizeBand = size_for_range(range);
        if by_weight != record.size {
            return ValidationResult::fail(
                "size_weight_mismatch",
                "size",
                &format!(
                    "Stored size {} but described weight {} means {}",
                    record.size, range, by_weight
                ),
                Severity::Warning,
            );
        }

        ValidationResult::pass(
            "size_matches_weight",
            "size",
            &format!("Size {} matches weight {}", record.size, range),
        )
    }

    fn validate_image(&self, record: &BreedRecord) -> ValidationResult {
        let filename = match record.image_filename() {
            Some(f) if !f.trim().is_empty() => f,
            _ => {
                return ValidationResult::fail(
                    "image_missing",
                    "image_filename",
                    "No image filename",
                    Severity::Warning,
                )
            }
        };

        match &self.images {
            Some(images) if !images.contains(filename) => ValidationResult::fail(
                "image_missing",
                "image_filename",
                &format!("No image file found for {}", filename),
                Severity::Warning,
            ),
            _ => ValidationResult::pass("image_present", "image_filename", "Image present"),
        }
    }
}

// ============================================================================
// AUDIT SUMMARY
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSummary {
    pub total_breeds: usize,
    pub clean_count: usize,
    pub needs_review_count: usize,
    pub empty_descriptions: usize,
    pub wrong_breed_descriptions: usize,
    pub size_mismatches: usize,
    pub missing_images: usize,
}

impl AuditSummary {
    pub fn summary(&self) -> String {
        format!(
            "{} breeds: {} clean, {} need review | {} empty descriptions, {} wrong-breed descriptions, {} size mismatches, {} missing images",
            self.total_breeds,
            self.clean_count,
            self.needs_review_count,
            self.empty_descriptions,
            self.wrong_breed_descriptions,
            self.size_mismatches,
            self.missing_images
        )
    }
}

/// Markdown rendering of an audit run
pub fn audit_markdown(summary: &AuditSummary, reports: &[AuditReport]) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# Breed Audit Report\n");
    let _ = writeln!(out, "**Total Breeds Audited**: {}", summary.total_breeds);
    let _ = writeln!(out, "**Clean**: {}", summary.clean_count);
    let _ = writeln!(out, "**Need Review**: {}\n", summary.needs_review_count);

    let flagged: Vec<&AuditReport> = reports.iter().filter(|r| !r.is_clean()).collect();
    if !flagged.is_empty() {
        let _ = writeln!(out, "## Issues\n");
        let _ = writeln!(out, "| Breed | Severity | Rule | Details |");
        let _ = writeln!(out, "|-------|----------|------|---------|");
        for report in flagged {
            for issue in &report.issues {
                let _ = writeln!(
                    out,
                    "| {} | {:?} | {} | {} |",
                    markdown_cell(&report.breed),
                    issue.severity,
                    issue.rule_name,
                    markdown_cell(&issue.issue)
                );
            }
        }
    }

    out
}

// ============================================================================
// TESTS
// ============================================================================
