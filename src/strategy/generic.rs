//! Universal fallback strategy: fenced code blocks, key-value blocks,
//! bracketed object blocks, tag-delimited blocks, config sections, and an
//! as-is artifact for anything else. Accepts every file.

use regex::Regex;

use crate::artifact::Artifact;

use super::ExtractionStrategy;

struct GenericPatterns {
    fenced_block: Regex,
    key_value_block: Regex,
    object_block: Regex,
    markup_block: Regex,
    ini_section: Regex,
}

impl GenericPatterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            fenced_block: Regex::new(r"```(\w+)\n((?s:.*?))```")?,
            // A key with a scalar value or an indented continuation block.
            key_value_block: Regex::new(
                r"(?:^|\n)([\w-]+:\s*(?:[^\n]+|(?:\n(?:  |\t)+[^\n]+)+))",
            )?,
            object_block: Regex::new(r"\{(?s:.*?)\}")?,
            markup_block: Regex::new(r"<\w+[^>]*>(?s:.*?)</\w+>")?,
            ini_section: Regex::new(r"(?m)^\[[^\]\n]+\]\n(?:[^\[\n][^\n]*\n?)*")?,
        })
    }
}

/// Last-resort strategy: never rejects a file, never yields zero artifacts
/// for non-blank content.
pub struct GenericStrategy {
    patterns: Option<GenericPatterns>,
}

impl GenericStrategy {
    pub fn new() -> Self {
        Self { patterns: None }
    }

    /// Guess an output identity for content with no recognizable blocks.
    fn sniff_file_type(content: &str) -> (&'static str, &'static str) {
        let trimmed = content.trim();
        if trimmed.starts_with('{') && trimmed.ends_with('}') {
            return ("data.json", "json");
        }
        if trimmed.contains("<?xml") {
            return ("data.xml", "xml");
        }
        if trimmed.contains("---") && (trimmed.contains(": ") || trimmed.contains("- ")) {
            return ("data.yaml", "yaml");
        }
        if trimmed.contains('[') && trimmed.contains(']') && trimmed.contains('=') {
            return ("config.ini", "ini");
        }
        ("content.txt", "text")
    }
}

impl Default for GenericStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionStrategy for GenericStrategy {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[
            ".txt", ".md", ".rst", ".yml", ".yaml", ".xml", ".json", ".ini", ".cfg", ".conf",
        ]
    }

    fn prepare(&mut self) -> anyhow::Result<()> {
        self.patterns = Some(GenericPatterns::compile()?);
        Ok(())
    }

    fn dispose(&mut self) {
        self.patterns = None;
    }

    fn handles(&self, _filename: &str) -> bool {
        true
    }

    fn extract(&self, content: &str) -> Vec<Artifact> {
        let Some(p) = &self.patterns else {
            return Vec::new();
        };
        let mut artifacts = Vec::new();

        for caps in p.fenced_block.captures_iter(content) {
            let language = caps[1].to_lowercase();
            let code = caps[2].to_string();
            if code.trim().is_empty() {
                continue;
            }
            artifacts.push(Artifact {
                content: code,
                kind: "fenced-block".to_string(),
                suggested_name: format!("code.{}", language),
                format: language,
                ..Artifact::default()
            });
        }

        for caps in p.key_value_block.captures_iter(content) {
            artifacts.push(Artifact {
                content: caps[1].to_string(),
                kind: "key-value-block".to_string(),
                suggested_name: "config.yaml".to_string(),
                format: "yaml".to_string(),
                ..Artifact::default()
            });
        }

        for m in p.object_block.find_iter(content) {
            artifacts.push(Artifact {
                content: m.as_str().to_string(),
                kind: "object-block".to_string(),
                suggested_name: "config.json".to_string(),
                format: "json".to_string(),
                ..Artifact::default()
            });
        }

        for m in p.markup_block.find_iter(content) {
            artifacts.push(Artifact {
                content: m.as_str().to_string(),
                kind: "markup-block".to_string(),
                suggested_name: "config.xml".to_string(),
                format: "xml".to_string(),
                ..Artifact::default()
            });
        }

        for m in p.ini_section.find_iter(content) {
            artifacts.push(Artifact {
                content: m.as_str().to_string(),
                kind: "config-section".to_string(),
                suggested_name: "config.ini".to_string(),
                format: "ini".to_string(),
                ..Artifact::default()
            });
        }

        // No recognizable blocks: pass the whole content through as-is.
        if artifacts.is_empty() && !content.trim().is_empty() {
            let (name, format) = Self::sniff_file_type(content);
            artifacts.push(Artifact {
                content: content.to_string(),
                kind: "document".to_string(),
                suggested_name: name.to_string(),
                format: format.to_string(),
                ..Artifact::default()
            });
        }

        artifacts
    }
}
