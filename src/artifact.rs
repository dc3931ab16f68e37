//! Core data model: artifacts and per-file extraction results.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One extracted, classified unit of content destined for its own output file.
///
/// Artifacts are immutable value objects once a strategy emits them. Merging
/// produces a new artifact rather than mutating its inputs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Artifact {
    /// The extracted text. Strategies never emit an artifact with empty content.
    pub content: String,
    /// What was extracted: "class", "function", "module-config", "fenced-block", ...
    /// Open-ended, strategy-defined.
    pub kind: String,
    /// Optional logical grouping (package/module name). Empty means none.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    /// Proposed output filename (stem + extension). Empty means the writer
    /// synthesizes one.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub suggested_name: String,
    /// Content language/format tag, used to pick a default extension.
    pub format: String,
    /// External symbols the artifact depends on, in order of first appearance.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
    /// Auxiliary annotations carried through for downstream consumers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Auxiliary modifiers carried through for downstream consumers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub qualifiers: Vec<String>,
}

impl Artifact {
    /// Create an artifact with the three mandatory fields set.
    pub fn new(kind: &str, content: String, format: &str) -> Self {
        Self {
            content,
            kind: kind.to_string(),
            format: format.to_string(),
            ..Self::default()
        }
    }
}

/// Remove duplicates from a list while preserving order of first appearance.
pub fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items.into_iter().filter(|i| seen.insert(i.clone())).collect()
}

/// The outcome of extracting one input file.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// The input file this result belongs to.
    pub source_path: PathBuf,
    /// Name of the strategy that produced the artifacts.
    pub strategy_name: String,
    /// Artifacts in strategy emission order.
    pub artifacts: Vec<Artifact>,
    /// Paths written for this file. Empty in dry-run mode or when writing
    /// failed per-artifact.
    pub written_paths: Vec<PathBuf>,
}

impl ExtractionResult {
    /// Number of artifacts extracted from this file.
    pub fn artifact_count(&self) -> usize {
        self.artifacts.len()
    }

    /// Number of files written for this file.
    pub fn written_count(&self) -> usize {
        self.written_paths.len()
    }
}
