//! Curly-brace systems-language strategy: package/import/struct/interface/
//! function declarations and module manifests.

use regex::Regex;

use crate::artifact::{dedup_preserving_order, Artifact};

use super::{balanced_block, ExtractionStrategy};

struct GoPatterns {
    package: Regex,
    import_single: Regex,
    import_block: Regex,
    struct_decl: Regex,
    interface_decl: Regex,
    func_decl: Regex,
    method_decl: Regex,
    const_block: Regex,
    module_decl: Regex,
}

impl GoPatterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            package: Regex::new(r"(?m)^package\s+(\w+)")?,
            import_single: Regex::new(r#"(?m)^import\s+"([^"]+)""#)?,
            import_block: Regex::new(r"(?m)^import\s*\(([^)]+)\)")?,
            struct_decl: Regex::new(r"(?m)^type\s+(\w+)\s+struct\s*\{")?,
            interface_decl: Regex::new(r"(?m)^type\s+(\w+)\s+interface\s*\{")?,
            func_decl: Regex::new(r"(?m)^func\s+(\w+)\s*\(")?,
            method_decl: Regex::new(r"(?m)^func\s+\(([^)]+)\)\s+(\w+)\s*\(")?,
            const_block: Regex::new(r"(?m)^const\s*\(([^)]*)\)")?,
            module_decl: Regex::new(r"(?m)^module\s+(\S+)")?,
        })
    }
}

/// Extracts Go declarations and module manifests from mixed text.
pub struct GoStrategy {
    patterns: Option<GoPatterns>,
}

impl GoStrategy {
    pub fn new() -> Self {
        Self { patterns: None }
    }

    fn collect_imports(&self, p: &GoPatterns, content: &str) -> Vec<String> {
        let mut imports = Vec::new();
        for caps in p.import_single.captures_iter(content) {
            imports.push(caps[1].to_string());
        }
        if let Some(caps) = p.import_block.captures(content) {
            for line in caps[1].lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with("//") {
                    continue;
                }
                // Path is the first quoted segment; aliases keep their path.
                if let Some(path) = line.split('"').nth(1) {
                    imports.push(path.to_string());
                }
            }
        }
        dedup_preserving_order(imports)
    }
}

impl Default for GoStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionStrategy for GoStrategy {
    fn name(&self) -> &'static str {
        "go"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".go", ".mod"]
    }

    fn prepare(&mut self) -> anyhow::Result<()> {
        self.patterns = Some(GoPatterns::compile()?);
        Ok(())
    }

    fn dispose(&mut self) {
        self.patterns = None;
    }

    fn handles(&self, filename: &str) -> bool {
        let lower = filename.to_lowercase();
        lower.ends_with(".go") || lower.ends_with("go.mod") || lower.ends_with("go.sum")
    }

    fn extract(&self, content: &str) -> Vec<Artifact> {
        let Some(p) = &self.patterns else {
            return Vec::new();
        };
        let mut artifacts = Vec::new();

        let package = p
            .package
            .captures(content)
            .map(|c| c[1].to_string())
            .unwrap_or_default();
        let imports = self.collect_imports(p, content);

        for caps in p.struct_decl.captures_iter(content) {
            let name = &caps[1];
            let anchor = format!(r"type\s+{}\s+struct\s*", regex::escape(name));
            let decl = balanced_block(content, &anchor)
                .unwrap_or_else(|| format!("type {} struct {{\n}}", name));
            artifacts.push(Artifact {
                content: decl,
                kind: "struct".to_string(),
                namespace: package.clone(),
                suggested_name: format!("{}.go", name),
                format: "go".to_string(),
                references: imports.clone(),
                ..Artifact::default()
            });
        }

        for caps in p.interface_decl.captures_iter(content) {
            let name = &caps[1];
            let anchor = format!(r"type\s+{}\s+interface\s*", regex::escape(name));
            let decl = balanced_block(content, &anchor)
                .unwrap_or_else(|| format!("type {} interface {{\n}}", name));
            artifacts.push(Artifact {
                content: decl,
                kind: "interface".to_string(),
                namespace: package.clone(),
                suggested_name: format!("{}.go", name),
                format: "go".to_string(),
                references: imports.clone(),
                ..Artifact::default()
            });
        }

        for caps in p.func_decl.captures_iter(content) {
            let name = &caps[1];
            let anchor = format!(
                r"func\s+{}\s*\([^)]*\)(?:\s*\([^)]*\)|\s*[\w\[\]*.]+)?\s*",
                regex::escape(name)
            );
            let decl = balanced_block(content, &anchor)
                .unwrap_or_else(|| format!("func {}() {{\n}}", name));
            artifacts.push(Artifact {
                content: decl,
                kind: "function".to_string(),
                namespace: package.clone(),
                suggested_name: format!("{}.go", name),
                format: "go".to_string(),
                references: imports.clone(),
                ..Artifact::default()
            });
        }

        for caps in p.method_decl.captures_iter(content) {
            let receiver = caps[1].trim().to_string();
            let name = &caps[2];
            let anchor = format!(
                r"func\s+\([^)]+\)\s+{}\s*\([^)]*\)(?:\s*\([^)]*\)|\s*[\w\[\]*.]+)?\s*",
                regex::escape(name)
            );
            let decl = balanced_block(content, &anchor)
                .unwrap_or_else(|| format!("func ({}) {}() {{\n}}", receiver, name));
            artifacts.push(Artifact {
                content: decl,
                kind: "method".to_string(),
                namespace: package.clone(),
                suggested_name: format!("{}.go", name),
                format: "go".to_string(),
                references: imports.clone(),
                qualifiers: vec![receiver],
                ..Artifact::default()
            });
        }

        if let Some(m) = p.const_block.find(content) {
            artifacts.push(Artifact {
                content: m.as_str().to_string(),
                kind: "constant".to_string(),
                namespace: package.clone(),
                suggested_name: "constants.go".to_string(),
                format: "go".to_string(),
                references: imports,
                ..Artifact::default()
            });
        }

        // A module manifest pasted into the text: module directive present
        // but no package clause (a .go file always has one).
        if package.is_empty() {
            if let Some(caps) = p.module_decl.captures(content) {
                artifacts.push(Artifact {
                    content: format!("{}\n", content.trim_end()),
                    kind: "module-manifest".to_string(),
                    namespace: caps[1].to_string(),
                    suggested_name: "go.mod".to_string(),
                    format: "text".to_string(),
                    ..Artifact::default()
                });
            }
        }

        artifacts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepared() -> GoStrategy {
        let mut s = GoStrategy::new();
        s.prepare().unwrap();
        s
    }

    #[test]
    fn test_extract_struct_function_and_method() {
        let s = prepared();
        let content = r#"package store

import (
    "fmt"
    "sync"
)

type Cache struct {
    mu sync.Mutex
    items map[string]string
}

func NewCache() *Cache {
    return &Cache{items: map[string]string{}}
}

func (c *Cache) Get(key string) string {
    return c.items[key]
}
"#;
        let artifacts = s.extract(content);
        let kinds: Vec<&str> = artifacts.iter().map(|a| a.kind.as_str()).collect();
        assert_eq!(kinds, vec!["struct", "function", "method"]);
        assert!(artifacts[0].content.contains("mu sync.Mutex"));
        assert_eq!(artifacts[0].namespace, "store");
        assert_eq!(artifacts[0].references, vec!["fmt", "sync"]);
        assert!(artifacts[2].qualifiers[0].contains("Cache"));
    }

    #[test]
    fn test_function_skeleton_when_rescan_misses() {
        let s = prepared();
        // The coarse scan sees the name but there is no balanced body.
        let artifacts = s.extract("func Orphan(\n");
        assert_eq!(artifacts.len(), 1);
        assert!(artifacts[0].content.contains("Orphan"));
    }

    #[test]
    fn test_module_manifest_detected_without_package_clause() {
        let s = prepared();
        let content = "module github.com/acme/widget\n\ngo 1.22\n\nrequire github.com/pkg/errors v0.9.1\n";
        let artifacts = s.extract(content);
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].kind, "module-manifest");
        assert_eq!(artifacts[0].suggested_name, "go.mod");
        assert_eq!(artifacts[0].namespace, "github.com/acme/widget");
    }

    #[test]
    fn test_unmatched_input_yields_nothing() {
        let s = prepared();
        assert!(s.extract("no go code here at all").is_empty());
    }
}
