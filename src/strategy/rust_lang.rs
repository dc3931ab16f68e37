//! Brace-and-keyword strategy with module/ownership constructs:
//! module/struct/enum/trait/function/impl declarations and package
//! manifests.

use regex::Regex;

use crate::artifact::{dedup_preserving_order, Artifact};

use super::{balanced_block, ExtractionStrategy};

const VIS: &str = r"(?:pub(?:\([^)]*\))?\s+)";

struct RustPatterns {
    use_decl: Regex,
    attribute: Regex,
    mod_decl: Regex,
    struct_decl: Regex,
    enum_decl: Regex,
    trait_decl: Regex,
    fn_decl: Regex,
    impl_decl: Regex,
    macro_decl: Regex,
}

impl RustPatterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            use_decl: Regex::new(r"(?m)^use\s+([\w:]+(?:::\{[^}]*\})?(?:\s+as\s+\w+)?)\s*;")?,
            attribute: Regex::new(r"(?m)^#\[(\w[\w:]*(?:\([^\]]*\))?)\]")?,
            mod_decl: Regex::new(&format!(r"(?m)^{VIS}?mod\s+(\w+)\s*\{{"))?,
            struct_decl: Regex::new(&format!(r"(?m)^{VIS}?struct\s+(\w+)"))?,
            enum_decl: Regex::new(&format!(r"(?m)^{VIS}?enum\s+(\w+)"))?,
            trait_decl: Regex::new(&format!(r"(?m)^{VIS}?trait\s+(\w+)"))?,
            fn_decl: Regex::new(&format!(
                r"(?m)^{VIS}?(?:async\s+)?(?:unsafe\s+)?fn\s+(\w+)"
            ))?,
            impl_decl: Regex::new(r"(?m)^impl(?:<[^>]+>)?\s+([\w:]+)")?,
            macro_decl: Regex::new(r"(?m)^macro_rules!\s+(\w+)\s*\{")?,
        })
    }
}

/// Extracts Rust items and package manifests from mixed text.
pub struct RustStrategy {
    patterns: Option<RustPatterns>,
}

impl RustStrategy {
    pub fn new() -> Self {
        Self { patterns: None }
    }

    fn push_item(
        artifacts: &mut Vec<Artifact>,
        kind: &str,
        name: &str,
        decl: String,
        references: &[String],
        tags: &[String],
    ) {
        let public = decl.trim_start().starts_with("pub");
        artifacts.push(Artifact {
            content: decl,
            kind: kind.to_string(),
            suggested_name: format!("{}.rs", name),
            format: "rust".to_string(),
            references: references.to_vec(),
            tags: tags.to_vec(),
            qualifiers: if public { vec!["pub".to_string()] } else { vec![] },
            ..Artifact::default()
        });
    }
}

impl Default for RustStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionStrategy for RustStrategy {
    fn name(&self) -> &'static str {
        "rust"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".rs"]
    }

    fn prepare(&mut self) -> anyhow::Result<()> {
        self.patterns = Some(RustPatterns::compile()?);
        Ok(())
    }

    fn dispose(&mut self) {
        self.patterns = None;
    }

    fn handles(&self, filename: &str) -> bool {
        let lower = filename.to_lowercase();
        lower.ends_with(".rs") || lower.ends_with("cargo.toml")
    }

    fn extract(&self, content: &str) -> Vec<Artifact> {
        let Some(p) = &self.patterns else {
            return Vec::new();
        };
        let mut artifacts = Vec::new();

        let references = dedup_preserving_order(
            p.use_decl
                .captures_iter(content)
                .map(|c| c[1].to_string())
                .collect(),
        );
        let tags = dedup_preserving_order(
            p.attribute
                .captures_iter(content)
                .map(|c| c[1].to_string())
                .collect(),
        );

        for caps in p.mod_decl.captures_iter(content) {
            let name = &caps[1];
            let anchor = format!(r"{VIS}?mod\s+{}\s*", regex::escape(name));
            let decl = balanced_block(content, &anchor)
                .unwrap_or_else(|| format!("mod {} {{\n}}", name));
            Self::push_item(&mut artifacts, "module", name, decl, &references, &tags);
        }

        for caps in p.struct_decl.captures_iter(content) {
            let name = &caps[1];
            let anchor = format!(r"{VIS}?struct\s+{}(?:<[^>{{;]*>)?[^{{;\n]*", regex::escape(name));
            // Unit and tuple structs have no brace body; keep the single line.
            let decl = balanced_block(content, &anchor).unwrap_or_else(|| {
                Regex::new(&format!(r"(?m)^{VIS}?struct\s+{}[^\n]*", regex::escape(name)))
                    .ok()
                    .and_then(|re| re.find(content).map(|m| m.as_str().to_string()))
                    .unwrap_or_else(|| format!("struct {};", name))
            });
            Self::push_item(&mut artifacts, "struct", name, decl, &references, &tags);
        }

        for caps in p.enum_decl.captures_iter(content) {
            let name = &caps[1];
            let anchor = format!(r"{VIS}?enum\s+{}(?:<[^>{{]*>)?\s*", regex::escape(name));
            let decl = balanced_block(content, &anchor)
                .unwrap_or_else(|| format!("enum {} {{\n}}", name));
            Self::push_item(&mut artifacts, "enum", name, decl, &references, &tags);
        }

        for caps in p.trait_decl.captures_iter(content) {
            let name = &caps[1];
            let anchor = format!(r"{VIS}?trait\s+{}(?:<[^>{{]*>)?[^{{\n]*", regex::escape(name));
            let decl = balanced_block(content, &anchor)
                .unwrap_or_else(|| format!("trait {} {{\n}}", name));
            Self::push_item(&mut artifacts, "trait", name, decl, &references, &tags);
        }

        for caps in p.fn_decl.captures_iter(content) {
            let name = &caps[1];
            let anchor = format!(
                r"{VIS}?(?:async\s+)?(?:unsafe\s+)?fn\s+{}(?:<[^>{{]*>)?\([^)]*\)[^{{;\n]*",
                regex::escape(name)
            );
            let decl = balanced_block(content, &anchor)
                .unwrap_or_else(|| format!("fn {}() {{\n}}", name));
            Self::push_item(&mut artifacts, "function", name, decl, &references, &tags);
        }

        for caps in p.impl_decl.captures_iter(content) {
            let name = &caps[1];
            let anchor = format!(r"impl(?:<[^>]+>)?\s+{}[^{{\n]*", regex::escape(name));
            let decl = balanced_block(content, &anchor)
                .unwrap_or_else(|| format!("impl {} {{\n}}", name));
            Self::push_item(
                &mut artifacts,
                "impl",
                &format!("{}_impl", name),
                decl,
                &references,
                &tags,
            );
        }

        for caps in p.macro_decl.captures_iter(content) {
            let name = &caps[1];
            let anchor = format!(r"macro_rules!\s+{}\s*", regex::escape(name));
            let decl = balanced_block(content, &anchor)
                .unwrap_or_else(|| format!("macro_rules! {} {{\n}}", name));
            Self::push_item(&mut artifacts, "macro", name, decl, &references, &tags);
        }

        // Package manifest pasted into the text.
        if let Some(offset) = content.find("[package]") {
            artifacts.push(Artifact {
                content: format!("{}\n", content[offset..].trim_end()),
                kind: "package-manifest".to_string(),
                suggested_name: "Cargo.toml".to_string(),
                format: "toml".to_string(),
                ..Artifact::default()
            });
        }

        artifacts
    }
}
