// ⚙️ Run Configuration - where a curation run reads and writes
//
// A JSON file of optional paths. CLI flags are merged on top; anything
// still unset falls back to the built-in pipeline and knowledge table.

use crate::knowledge::BreedKnowledgeTable;
use crate::stages::CorrectionPipeline;
use crate::store::{derive_output_path, ensure_distinct};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_OUTPUT_SUFFIX: &str = "_curated";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CurateConfig {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub pipeline: Option<PathBuf>,
    pub knowledge: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub changes_csv: Option<PathBuf>,
    pub images_dir: Option<PathBuf>,

    /// Inserted before the extension when no output path is given
    pub output_suffix: String,
}

impl Default for CurateConfig {
    fn default() -> Self {
        CurateConfig {
            input: None,
            output: None,
            pipeline: None,
            knowledge: None,
            report: None,
            changes_csv: None,
            images_dir: None,
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
        }
    }
}

impl CurateConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config JSON: {:?}", path.as_ref()))
    }

    /// Overlay `other` on self; any field `other` sets wins
    pub fn merge(self, other: CurateConfig) -> CurateConfig {
        CurateConfig {
            input: other.input.or(self.input),
            output: other.output.or(self.output),
            pipeline: other.pipeline.or(self.pipeline),
            knowledge: other.knowledge.or(self.knowledge),
            report: other.report.or(self.report),
            changes_csv: other.changes_csv.or(self.changes_csv),
            images_dir: other.images_dir.or(self.images_dir),
            output_suffix: if other.output_suffix != DEFAULT_OUTPUT_SUFFIX {
                other.output_suffix
            } else {
                self.output_suffix
            },
        }
    }

    pub fn input(&self) -> Result<&Path> {
        self.input
            .as_deref()
            .context("No input file given (use --input or set \"input\" in the config)")
    }

    /// Explicit output, or the input with the suffix inserted. Never the input.
    pub fn resolved_output(&self) -> Result<PathBuf> {
        let input = self.input()?;
        let output = match &self.output {
            Some(output) => output.clone(),
            None => derive_output_path(input, &self.output_suffix),
        };

        ensure_distinct(input, &output)?;
        Ok(output)
    }

    pub fn load_knowledge(&self) -> Result<BreedKnowledgeTable> {
        let knowledge = match &self.knowledge {
            Some(path) => {
                info!(path = ?path, "loading knowledge table");
                BreedKnowledgeTable::from_file(path)?
            }
            None => BreedKnowledgeTable::builtin(),
        };

        knowledge.warn_conflicts("knowledge");
        Ok(knowledge)
    }

    pub fn load_pipeline(&self, knowledge: &BreedKnowledgeTable) -> Result<CorrectionPipeline> {
        match &self.pipeline {
            Some(path) => {
                info!(path = ?path, "loading pipeline");
                CorrectionPipeline::from_file(path, knowledge)
            }
            None => CorrectionPipeline::builtin(knowledge),
        }
    }
}
