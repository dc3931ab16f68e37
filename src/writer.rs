//! Artifact writer: output naming, sanitization, and persistence.

use std::fs;
use std::path::{Path, PathBuf};

use phf::phf_map;

use crate::artifact::Artifact;

/// Default output extension per format tag, for artifacts whose suggested
/// name carries none.
static DEFAULT_EXTENSIONS: phf::Map<&'static str, &'static str> = phf_map! {
    "java" => ".java",
    "go" => ".go",
    "python" => ".py",
    "javascript" => ".js",
    "typescript" => ".ts",
    "rust" => ".rs",
    "dart" => ".dart",
    "json" => ".json",
    "xml" => ".xml",
    "yaml" => ".yaml",
    "toml" => ".toml",
    "ini" => ".ini",
    "properties" => ".properties",
    "sh" => ".sh",
    "html" => ".html",
    "css" => ".css",
    "sql" => ".sql",
    "text" => ".txt",
};

fn default_extension(format: &str) -> &'static str {
    DEFAULT_EXTENSIONS.get(format).copied().unwrap_or(".txt")
}

/// Persists artifacts under an output directory.
///
/// In dry-run mode every path is still computed (see [`planned_paths`])
/// but nothing touches the filesystem and no written paths are reported.
///
/// [`planned_paths`]: ArtifactWriter::planned_paths
pub struct ArtifactWriter {
    output_dir: PathBuf,
    dry_run: bool,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            output_dir: output_dir.into(),
            dry_run,
        }
    }

    /// Write every artifact, create-or-truncate. Collisions are
    /// last-write-wins; enable merging upstream to coalesce instead.
    /// Per-artifact failures are logged and skipped, never fatal.
    pub fn write_all(&self, source: &Path, artifacts: &[Artifact]) -> Vec<PathBuf> {
        if self.dry_run {
            return Vec::new();
        }
        let mut written = Vec::new();
        for (index, artifact) in artifacts.iter().enumerate() {
            let path = self.resolve_path(source, artifact, index + 1);
            if let Err(err) = write_file(&path, &artifact.content) {
                eprintln!("Warning: failed to write {}: {}", path.display(), err);
                continue;
            }
            written.push(path);
        }
        written
    }

    /// The paths `write_all` would produce, without writing.
    pub fn planned_paths(&self, source: &Path, artifacts: &[Artifact]) -> Vec<PathBuf> {
        artifacts
            .iter()
            .enumerate()
            .map(|(index, artifact)| self.resolve_path(source, artifact, index + 1))
            .collect()
    }

    /// Map one artifact to its output path.
    fn resolve_path(&self, source: &Path, artifact: &Artifact, ordinal: usize) -> PathBuf {
        self.output_dir.join(output_name(source, artifact, ordinal))
    }
}

/// The output-relative name an artifact will be persisted under: the
/// sanitized suggested name, with a default extension appended when it has
/// none, or `{stem}_{kind}_{ordinal}{ext}` synthesized from the source file
/// when no name was suggested. `ordinal` is the artifact's 1-based position
/// within its source file.
///
/// This is the artifact's output identity; the merge policy groups on it.
pub(crate) fn output_name(source: &Path, artifact: &Artifact, ordinal: usize) -> String {
    let name = sanitize_name(&artifact.suggested_name);
    if name.is_empty() {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "artifact".to_string());
        format!(
            "{}_{}_{}{}",
            stem,
            artifact.kind,
            ordinal,
            default_extension(&artifact.format)
        )
    } else if !last_component_has_extension(&name) {
        format!("{}{}", name, default_extension(&artifact.format))
    } else {
        name
    }
}

fn last_component_has_extension(name: &str) -> bool {
    name.rsplit('/')
        .next()
        .map(|c| c.contains('.'))
        .unwrap_or(false)
}

fn write_file(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
}

/// Strip traversal components and reserved filesystem characters while
/// preserving nested `/` separators.
fn sanitize_name(name: &str) -> String {
    let mut parts = Vec::new();
    for component in name.split(['/', '\\']) {
        let cleaned: String = component
            .chars()
            .filter(|c| !matches!(c, ':' | '*' | '?' | '"' | '<' | '>' | '|') && !c.is_control())
            .collect();
        let cleaned = cleaned.trim();
        if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
            continue;
        }
        parts.push(cleaned.to_string());
    }
    parts.join("/")
}
