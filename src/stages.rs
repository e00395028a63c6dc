// 🔧 Correction Stages - Rules as Data
// One ordered list of named stages, applied in sequence to one in-memory
// collection. Stage definitions live in JSON so curation tables are data.

use crate::breed::{BreedRecord, SizeBand};
use crate::knowledge::{BreedKnowledgeTable, BreedTable, SizeEntry};
use crate::report::{ConflictSummary, RecordChange, RunReport, SizeHistogram, StageCount};
use crate::shelter::{ScoreEntry, ShelterScorer, DEFAULT_SHELTER_SCORE};
use crate::size::{SizeBasis, SizeClassifier};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Pipeline shipped with the crate
const BUILTIN_PIPELINE: &str = include_str!("../data/pipeline.json");

// ============================================================================
// STAGE DEFINITIONS (serialized form)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDefinition {
    pub stages: Vec<StageDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDefinition {
    /// Unique stage name, used in logs and reports
    pub name: String,

    /// Notes about where the table came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(flatten)]
    pub kind: StageKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageKind {
    SizeOverrides {
        sizes: Vec<SizeEntry>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name_rule: Option<NameRule>,
    },
    DescriptionOverrides {
        descriptions: Vec<DescriptionEntry>,
    },
    ImageExtension {
        from: String,
        to: String,
    },
    ShelterScores {
        scores: Vec<ScoreEntry>,
        #[serde(default = "default_shelter_score")]
        default_score: u8,
    },
    WeightSizes {},
}

fn default_shelter_score() -> u8 {
    DEFAULT_SHELTER_SCORE
}

/// Catch-all for breeds a size table does not list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameRule {
    /// Case-sensitive substring of the breed name
    pub contains: String,
    pub when_size: SizeBand,
    pub set_size: SizeBand,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptionEntry {
    pub breed: String,
    pub description: String,
}

// ============================================================================
// STAGE TRAIT
// ============================================================================

/// A named, in-place correction over the whole collection.
///
/// Stages append one `RecordChange` per field they actually rewrite; a
/// record already holding the target value is not a change.
pub trait CorrectionStage {
    fn name(&self) -> &str;

    fn apply(&self, records: &mut [BreedRecord], changes: &mut Vec<RecordChange>);

    /// Contradictory entries dropped from this stage's tables
    fn conflicts(&self) -> Vec<ConflictSummary> {
        Vec::new()
    }
}

fn change(
    stage: &str,
    index: usize,
    record: &BreedRecord,
    field: &str,
    old: String,
    new: String,
    reason: String,
) -> RecordChange {
    RecordChange {
        stage: stage.to_string(),
        index,
        breed: record.breed.clone(),
        field: field.to_string(),
        old,
        new,
        reason,
    }
}

// ============================================================================
// SIZE OVERRIDES
// ============================================================================

pub struct SizeOverrideStage {
    name: String,
    sizes: BreedTable<SizeBand>,
    name_rule: Option<NameRule>,
}

impl SizeOverrideStage {
    pub fn new(name: &str, sizes: &[SizeEntry], name_rule: Option<NameRule>) -> Self {
        SizeOverrideStage {
            name: name.to_string(),
            sizes: BreedKnowledgeTable::from_size_entries(sizes),
            name_rule,
        }
    }
}

impl CorrectionStage for SizeOverrideStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, records: &mut [BreedRecord], changes: &mut Vec<RecordChange>) {
        for (index, record) in records.iter_mut().enumerate() {
            // Conflicting breeds are out of the table but still "listed"
            let listed = self.sizes.contains(&record.breed)
                || self
                    .sizes
                    .conflicts()
                    .iter()
                    .any(|c| c.breed == record.breed);

            let target = if let Some(size) = self.sizes.get(&record.breed) {
                Some((*size, "curated size table".to_string()))
            } else {
                match &self.name_rule {
                    Some(rule)
                        if !listed
                            && record.breed.contains(&rule.contains)
                            && record.size == rule.when_size =>
                    {
                        Some((rule.set_size, format!("{} breed", rule.contains)))
                    }
                    _ => None,
                }
            };

            if let Some((size, reason)) = target {
                if size != record.size {
                    changes.push(change(
                        &self.name,
                        index,
                        record,
                        "size",
                        record.size.to_string(),
                        size.to_string(),
                        reason,
                    ));
                    record.size = size;
                }
            }
        }
    }

    fn conflicts(&self) -> Vec<ConflictSummary> {
        ConflictSummary::from_table(&self.name, &self.sizes)
    }
}

// ============================================================================
// DESCRIPTION OVERRIDES
// ============================================================================

pub struct DescriptionOverrideStage {
    name: String,
    descriptions: BreedTable<String>,
}

impl DescriptionOverrideStage {
    pub fn new(name: &str, entries: &[DescriptionEntry]) -> Self {
        DescriptionOverrideStage {
            name: name.to_string(),
            descriptions: BreedTable::from_entries(
                entries
                    .iter()
                    .map(|e| (e.breed.clone(), e.description.clone())),
            ),
        }
    }
}

impl CorrectionStage for DescriptionOverrideStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, records: &mut [BreedRecord], changes: &mut Vec<RecordChange>) {
        for (index, record) in records.iter_mut().enumerate() {
            let Some(description) = self.descriptions.get(&record.breed) else {
                continue;
            };
            if record.description() == description {
                continue;
            }

            changes.push(change(
                &self.name,
                index,
                record,
                "description",
                record.description().to_string(),
                description.clone(),
                "curated description".to_string(),
            ));
            record.set_description(description);
        }
    }

    fn conflicts(&self) -> Vec<ConflictSummary> {
        ConflictSummary::from_table(&self.name, &self.descriptions)
    }
}

// ============================================================================
// IMAGE EXTENSION
// ============================================================================

pub struct ImageExtensionStage {
    name: String,
    from: String,
    to: String,
}

impl ImageExtensionStage {
    pub fn new(name: &str, from: &str, to: &str) -> Self {
        ImageExtensionStage {
            name: name.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

impl CorrectionStage for ImageExtensionStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, records: &mut [BreedRecord], changes: &mut Vec<RecordChange>) {
        for (index, record) in records.iter_mut().enumerate() {
            let Some(filename) = record.image_filename().filter(|f| !f.is_empty())
            else {
                debug!(breed = %record.breed, "no image filename");
                continue;
            };
            let Some(stem) = filename.strip_suffix(self.from.as_str()) else {
                continue;
            };

            let renamed = format!("{}{}", stem, self.to);
            if renamed == filename {
                continue;
            }
            changes.push(change(
                &self.name,
                index,
                record,
                "image_filename",
                filename.to_string(),
                renamed.clone(),
                format!("{} → {}", self.from, self.to),
            ));
            record.set_image_filename(&renamed);
        }
    }
}

// ============================================================================
// SHELTER SCORES
// ============================================================================

pub struct ShelterScoreStage {
    name: String,
    scorer: ShelterScorer,
}

impl ShelterScoreStage {
    pub fn new(name: &str, scorer: ShelterScorer) -> Self {
        ShelterScoreStage {
            name: name.to_string(),
            scorer,
        }
    }
}

impl CorrectionStage for ShelterScoreStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, records: &mut [BreedRecord], changes: &mut Vec<RecordChange>) {
        for (index, record) in records.iter_mut().enumerate() {
            let score = self.scorer.score(&record.breed);
            if record.shelter_availability_score() == Some(score) {
                continue;
            }

            let old = record
                .shelter_availability_score()
                .map(|s| s.to_string())
                .unwrap_or_default();
            changes.push(change(
                &self.name,
                index,
                record,
                "shelter_availability_score",
                old,
                score.to_string(),
                "shelter availability".to_string(),
            ));
            record.set_shelter_availability_score(score);
        }
    }

    fn conflicts(&self) -> Vec<ConflictSummary> {
        ConflictSummary::from_table(&self.name, self.scorer.table())
    }
}

// ============================================================================
// WEIGHT SIZES
// ============================================================================

/// Weight-driven size classification with breed-knowledge fallback
pub struct WeightSizeStage {
    name: String,
    classifier: SizeClassifier,
}

impl WeightSizeStage {
    pub fn new(name: &str, classifier: SizeClassifier) -> Self {
        WeightSizeStage {
            name: name.to_string(),
            classifier,
        }
    }
}

impl CorrectionStage for WeightSizeStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, records: &mut [BreedRecord], changes: &mut Vec<RecordChange>) {
        for decision in self.classifier.apply(records) {
            if !decision.classification.changed {
                continue;
            }

            let reason = match (decision.classification.basis, decision.pattern) {
                (SizeBasis::Weight(range), Some(pattern)) => {
                    format!("weight {} ({})", range, pattern.label())
                }
                (basis, _) => basis.describe(),
            };

            changes.push(RecordChange {
                stage: self.name.clone(),
                index: decision.index,
                breed: decision.breed,
                field: "size".to_string(),
                old: decision.old_size.to_string(),
                new: decision.classification.size.to_string(),
                reason,
            });
        }
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

pub struct CorrectionPipeline {
    stages: Vec<Box<dyn CorrectionStage>>,
    knowledge_conflicts: Vec<ConflictSummary>,
}

impl CorrectionPipeline {
    /// Pipeline shipped in `data/pipeline.json`
    pub fn builtin(knowledge: &BreedKnowledgeTable) -> Result<Self> {
        Self::from_json(BUILTIN_PIPELINE, knowledge).context("Built-in pipeline is invalid")
    }

    /// Load stage definitions from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P, knowledge: &BreedKnowledgeTable) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read pipeline file: {:?}", path.as_ref()))?;

        Self::from_json(&content, knowledge)
            .with_context(|| format!("Invalid pipeline file: {:?}", path.as_ref()))
    }

    pub fn from_json(json: &str, knowledge: &BreedKnowledgeTable) -> Result<Self> {
        let definition: PipelineDefinition =
            serde_json::from_str(json).context("Failed to parse pipeline JSON")?;

        Self::from_definitions(definition.stages, knowledge)
    }

    pub fn from_definitions(
        definitions: Vec<StageDefinition>,
        knowledge: &BreedKnowledgeTable,
    ) -> Result<Self> {
        let mut names = HashSet::new();
        let mut stages: Vec<Box<dyn CorrectionStage>> = Vec::new();

        for definition in definitions {
            let name = definition.name.trim();
            if name.is_empty() {
                bail!("Stage name must not be empty");
            }
            if !names.insert(name.to_string()) {
                bail!("Duplicate stage name: {}", name);
            }

            let stage: Box<dyn CorrectionStage> = match definition.kind {
                StageKind::SizeOverrides { sizes, name_rule } => {
                    Box::new(SizeOverrideStage::new(name, &sizes, name_rule))
                }
                StageKind::DescriptionOverrides { descriptions } => {
                    Box::new(DescriptionOverrideStage::new(name, &descriptions))
                }
                StageKind::ImageExtension { from, to } => {
                    if from.is_empty() {
                        bail!("Stage {}: image extension 'from' must not be empty", name);
                    }
                    if to.ends_with(from.as_str()) {
                        bail!(
                            "Stage {}: image extension 'to' ({}) must not end with 'from' ({})",
                            name,
                            to,
                            from
                        );
                    }
                    Box::new(ImageExtensionStage::new(name, &from, &to))
                }
                StageKind::ShelterScores {
                    scores,
                    default_score,
                } => {
                    if let Some(bad) = scores
                        .iter()
                        .find(|s| !(1..=10).contains(&s.score))
                    {
                        bail!(
                            "Stage {}: shelter score for {} must be 1-10, got {}",
                            name,
                            bad.breed,
                            bad.score
                        );
                    }
                    if !(1..=10).contains(&default_score) {
                        bail!("Stage {}: default shelter score must be 1-10", name);
                    }
                    Box::new(ShelterScoreStage::new(
                        name,
                        ShelterScorer::new(&scores, default_score),
                    ))
                }
                StageKind::WeightSizes {} => Box::new(WeightSizeStage::new(
                    name,
                    SizeClassifier::new(knowledge.clone()),
                )),
            };

            stages.push(stage);
        }

        Ok(CorrectionPipeline {
            stages,
            knowledge_conflicts: ConflictSummary::from_table("knowledge", knowledge),
        })
    }

    /// Just the weight-driven size pass
    pub fn weight_only(knowledge: &BreedKnowledgeTable) -> Self {
        CorrectionPipeline {
            stages: vec![Box::new(WeightSizeStage::new(
                "weight-sizes",
                SizeClassifier::new(knowledge.clone()),
            ))],
            knowledge_conflicts: ConflictSummary::from_table("knowledge", knowledge),
        }
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage in order over one collection
    pub fn run(&self, records: &mut [BreedRecord]) -> RunReport {
        let mut report = RunReport::new(records);
        report.conflicts.extend(self.knowledge_conflicts.iter().cloned());

        for stage in &self.stages {
            let before = report.changes.len();
            stage.apply(records, &mut report.changes);
            let changed = report.changes.len() - before;

            info!(stage = stage.name(), changes = changed, "stage applied");

            report.stage_counts.push(StageCount {
                stage: stage.name().to_string(),
                changes: changed,
            });
            report.conflicts.extend(stage.conflicts());
        }

        report.histogram = SizeHistogram::from_records(records);
        report
    }
}

// ============================================================================
// TESTS
// ============================================================================
