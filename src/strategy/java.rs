//! Structural-class strategy for brace-delimited, C-family grammar:
//! classes, interfaces, enums, annotation types, build manifests.

use regex::Regex;

use crate::artifact::{dedup_preserving_order, Artifact};

use super::{balanced_block, ExtractionStrategy};

const MODIFIERS: &str = r"(?:(?:public|protected|private|abstract|final|static|sealed)\s+)";

struct JavaPatterns {
    package: Regex,
    import: Regex,
    annotation: Regex,
    type_decl: Regex,
    maven_pom: Regex,
    property_line: Regex,
}

impl JavaPatterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            package: Regex::new(r"(?m)^\s*package\s+([\w.]+)\s*;")?,
            import: Regex::new(r"(?m)^\s*import\s+(?:static\s+)?([\w.*]+)\s*;")?,
            annotation: Regex::new(r"@(\w+)")?,
            // Coarse scan: modifiers, keyword, name. The balanced body is
            // recovered by a name-anchored re-scan.
            type_decl: Regex::new(&format!(
                r"(?m)^[ \t]*({MODIFIERS}*)(class|interface|enum|@interface)\s+(\w+)"
            ))?,
            maven_pom: Regex::new(r"(?s)<project[^>]*>.*?</project>")?,
            property_line: Regex::new(r"(?m)^([\w][\w.-]*)\s*[=:]\s*(\S[^\n]*)$")?,
        })
    }
}

/// Extracts Java types and build configuration from mixed text.
pub struct JavaStrategy {
    patterns: Option<JavaPatterns>,
}

impl JavaStrategy {
    pub fn new() -> Self {
        Self { patterns: None }
    }
}

impl Default for JavaStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionStrategy for JavaStrategy {
    fn name(&self) -> &'static str {
        "java"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".java", ".jar"]
    }

    fn prepare(&mut self) -> anyhow::Result<()> {
        self.patterns = Some(JavaPatterns::compile()?);
        Ok(())
    }

    fn dispose(&mut self) {
        self.patterns = None;
    }

    fn handles(&self, filename: &str) -> bool {
        let lower = filename.to_lowercase();
        lower.ends_with(".java") || lower.contains("pom.xml")
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

        let imports = dedup_preserving_order(
            p.import
                .captures_iter(content)
                .map(|c| c[1].to_string())
                .collect(),
        );

        let annotations = dedup_preserving_order(
            p.annotation
                .captures_iter(content)
                .map(|c| c[1].to_string())
                .collect(),
        );

        for caps in p.type_decl.captures_iter(content) {
            let modifiers: Vec<String> = caps[1].split_whitespace().map(str::to_string).collect();
            let keyword = &caps[2];
            let name = &caps[3];

            let kind = match keyword {
                "interface" => "interface",
                "enum" => "enum",
                "@interface" => "annotation",
                _ => "class",
            };

            // Name-anchored re-scan for the complete balanced body.
            let anchor = format!(
                r"{MODIFIERS}*{}\s+{}\b(?:<[^>{{]*>)?(?:\s+extends\s+[\w.,<>\s]+?)?(?:\s+implements\s+[^{{]+?)?\s*",
                regex::escape(keyword),
                regex::escape(name)
            );
            let decl = balanced_block(content, &anchor)
                .unwrap_or_else(|| format!("public {} {} {{\n}}", keyword, name));

            artifacts.push(Artifact {
                content: render_unit(&package, &imports, &decl),
                kind: kind.to_string(),
                namespace: package.clone(),
                suggested_name: format!("{}.java", name),
                format: "java".to_string(),
                references: imports.clone(),
                tags: annotations.clone(),
                qualifiers: modifiers,
            });
        }

        // Build manifest embedded in the text.
        if content.contains("<project") {
            if let Some(m) = p.maven_pom.find(content) {
                artifacts.push(Artifact {
                    content: m.as_str().to_string(),
                    kind: "build-manifest".to_string(),
                    suggested_name: "pom.xml".to_string(),
                    format: "xml".to_string(),
                    ..Artifact::default()
                });
            }
        }

        // Property sections (key=value / key: value lines).
        if artifacts.is_empty() {
            let props: String = p
                .property_line
                .captures_iter(content)
                .map(|c| format!("{}={}\n", &c[1], &c[2]))
                .collect();
            if !props.is_empty() {
                artifacts.push(Artifact {
                    content: props,
                    kind: "module-config".to_string(),
                    suggested_name: "application.properties".to_string(),
                    format: "properties".to_string(),
                    ..Artifact::default()
                });
            }
        }

        artifacts
    }
}

/// Reassemble a self-contained compilation unit around a declaration.
fn render_unit(package: &str, imports: &[String], decl: &str) -> String {
    let mut out = String::new();
    if !package.is_empty() {
        out.push_str(&format!("package {};\n\n", package));
    }
    for imp in imports {
        out.push_str(&format!("import {};\n", imp));
    }
    if !imports.is_empty() {
        out.push('\n');
    }
    out.push_str(decl);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepared() -> JavaStrategy {
        let mut s = JavaStrategy::new();
        s.prepare().unwrap();
        s
    }

    #[test]
    fn test_extract_class_with_package_and_imports() {
        let s = prepared();
        let content = r#"
package com.example.app;

import java.util.List;
import java.util.Map;

public class OrderService {
    private List<String> items;

    public void add(String item) {
        items.add(item);
    }
}
"#;
        let artifacts = s.extract(content);
        assert_eq!(artifacts.len(), 1);
        let a = &artifacts[0];
        assert_eq!(a.kind, "class");
        assert_eq!(a.namespace, "com.example.app");
        assert_eq!(a.suggested_name, "OrderService.java");
        assert!(a.content.contains("class OrderService"));
        assert!(a.content.contains("package com.example.app;"));
        assert_eq!(a.references, vec!["java.util.List", "java.util.Map"]);
        assert_eq!(a.qualifiers, vec!["public"]);
        // One level of nesting: the method body survives.
        assert!(a.content.contains("items.add(item);"));
    }

    #[test]
    fn test_extract_interface_and_enum() {
        let s = prepared();
        let content = "public interface Repo {\n    void save();\n}\n\nenum Color { RED, GREEN }\n";
        let artifacts = s.extract(content);
        let kinds: Vec<&str> = artifacts.iter().map(|a| a.kind.as_str()).collect();
        assert_eq!(kinds, vec!["interface", "enum"]);
        assert_eq!(artifacts[1].suggested_name, "Color.java");
    }

    #[test]
    fn test_skeleton_when_body_not_found() {
        let s = prepared();
        // Declaration without a brace-delimited body: the coarse scan fires,
        // the re-scan misses, and a skeleton keeps the name in the inventory.
        let artifacts = s.extract("public class Ghost");
        assert_eq!(artifacts.len(), 1);
        assert!(artifacts[0].content.contains("class Ghost"));
        assert!(!artifacts[0].content.is_empty());
    }

    #[test]
    fn test_unmatched_input_yields_nothing() {
        let s = prepared();
        assert!(s.extract("just a plain sentence").is_empty());
    }

    #[test]
    fn test_extract_is_idempotent() {
        let s = prepared();
        let content = "public class A {\n    int x;\n}\n";
        assert_eq!(s.extract(content), s.extract(content));
    }
}
