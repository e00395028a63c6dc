// Breed Curator - Core Library
// Exposes all modules for use in the CLI and tests

pub mod breed;      // Data model: records + size bands
pub mod weight;     // Weight extraction from descriptions
pub mod knowledge;  // Breed-keyed tables with conflict detection
pub mod size;       // Weight → size band classification
pub mod shelter;    // Shelter availability scoring
pub mod stages;     // Ordered correction pipeline
pub mod store;      // Snapshot load/save
pub mod report;     // Run report rendering
pub mod audit;      // Read-only record audit
pub mod config;     // Run configuration

// Re-export commonly used types
pub use breed::{BreedRecord, SizeBand};
pub use weight::{extract_weight, extract_weight_match, WeightMatch, WeightPattern, WeightRange};
pub use knowledge::{BreedKnowledgeTable, BreedTable, SizeEntry, TableConflict};
pub use size::{
    size_for_range, size_for_weight, Classification, SizeBasis, SizeClassifier, SizeDecision,
};
pub use shelter::{ScoreEntry, ShelterScorer, DEFAULT_SHELTER_SCORE};
pub use stages::{
    CorrectionPipeline, CorrectionStage, PipelineDefinition, StageDefinition, StageKind,
};
pub use store::{derive_output_path, ensure_distinct, fingerprint, load_breeds, save_breeds};
pub use report::{ConflictSummary, RecordChange, RunReport, SizeHistogram};
pub use audit::{
    audit_markdown, AuditIssue, AuditReport, AuditSummary, BreedAuditor, ImageCatalog, Severity,
};
pub use config::CurateConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
