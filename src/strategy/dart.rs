//! Widget-toolkit strategy: classes, mixins, widget subclasses,
//! top-level functions, and pubspec manifests.

use regex::Regex;

use crate::artifact::{dedup_preserving_order, Artifact};

use super::{balanced_block, ExtractionStrategy};

struct DartPatterns {
    import: Regex,
    class_decl: Regex,
    mixin_decl: Regex,
    func_decl: Regex,
    pubspec_name: Regex,
}

impl DartPatterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            import: Regex::new(r#"(?m)^import\s+'([^']+)'\s*(?:as\s+\w+\s*)?;"#)?,
            class_decl: Regex::new(
                r"(?m)^(?:abstract\s+)?class\s+(\w+)(?:\s+extends\s+([\w<>]+))?",
            )?,
            mixin_decl: Regex::new(r"(?m)^mixin\s+(\w+)")?,
            func_decl: Regex::new(
                r"(?m)^(?:void|int|double|String|bool|Widget|Future<[^>\n]*>)\s+(\w+)\s*\(",
            )?,
            pubspec_name: Regex::new(r"(?m)^name:\s*(\S+)")?,
        })
    }
}

/// Extracts Dart classes, widgets, and pubspec manifests from mixed text.
pub struct DartStrategy {
    patterns: Option<DartPatterns>,
}

impl DartStrategy {
    pub fn new() -> Self {
        Self { patterns: None }
    }
}

impl Default for DartStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionStrategy for DartStrategy {
    fn name(&self) -> &'static str {
        "dart"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".dart"]
    }

    fn prepare(&mut self) -> anyhow::Result<()> {
        self.patterns = Some(DartPatterns::compile()?);
        Ok(())
    }

    fn dispose(&mut self) {
        self.patterns = None;
    }

    fn handles(&self, filename: &str) -> bool {
        let lower = filename.to_lowercase();
        lower.ends_with(".dart") || lower.ends_with("pubspec.yaml")
    }

    fn extract(&self, content: &str) -> Vec<Artifact> {
        let Some(p) = &self.patterns else {
            return Vec::new();
        };
        let mut artifacts = Vec::new();

        let imports = dedup_preserving_order(
            p.import
                .captures_iter(content)
                .map(|c| c[1].to_string())
                .collect(),
        );

        for caps in p.class_decl.captures_iter(content) {
            let name = &caps[1];
            let superclass = caps.get(2).map(|m| m.as_str().to_string());
            // Framework widget subclasses are their own kind.
            let kind = match superclass.as_deref() {
                Some("StatelessWidget") | Some("StatefulWidget") => "widget",
                _ => "class",
            };
            let anchor = format!(
                r"(?:abstract\s+)?class\s+{}(?:\s+extends\s+[\w<>]+)?(?:\s+with\s+[\w,\s]+?)?(?:\s+implements\s+[\w,\s]+?)?\s*",
                regex::escape(name)
            );
            let decl = balanced_block(content, &anchor)
                .unwrap_or_else(|| format!("class {} {{\n}}", name));
            artifacts.push(Artifact {
                content: decl,
                kind: kind.to_string(),
                suggested_name: format!("{}.dart", name),
                format: "dart".to_string(),
                references: imports.clone(),
                qualifiers: superclass.into_iter().collect(),
                ..Artifact::default()
            });
        }

        for caps in p.mixin_decl.captures_iter(content) {
            let name = &caps[1];
            let anchor = format!(r"mixin\s+{}(?:\s+on\s+[\w,\s]+?)?\s*", regex::escape(name));
            let decl = balanced_block(content, &anchor)
                .unwrap_or_else(|| format!("mixin {} {{\n}}", name));
            artifacts.push(Artifact {
                content: decl,
                kind: "mixin".to_string(),
                suggested_name: format!("{}.dart", name),
                format: "dart".to_string(),
                references: imports.clone(),
                ..Artifact::default()
            });
        }

        for caps in p.func_decl.captures_iter(content) {
            let name = &caps[1];
            let anchor = format!(
                r"(?:void|int|double|String|bool|Widget|Future<[^>\n]*>)\s+{}\s*\([^)]*\)\s*(?:async\s*)?",
                regex::escape(name)
            );
            let decl = balanced_block(content, &anchor)
                .unwrap_or_else(|| format!("void {}() {{\n}}", name));
            artifacts.push(Artifact {
                content: decl,
                kind: "function".to_string(),
                suggested_name: format!("{}.dart", name),
                format: "dart".to_string(),
                references: imports.clone(),
                ..Artifact::default()
            });
        }

        // Pubspec manifest pasted into the text: a name plus a dependency
        // table, with no Dart declarations alongside.
        if artifacts.is_empty() && content.contains("dependencies:") {
            if let Some(caps) = p.pubspec_name.captures(content) {
                artifacts.push(Artifact {
                    content: format!("{}\n", content.trim_end()),
                    kind: "package-manifest".to_string(),
                    namespace: caps[1].to_string(),
                    suggested_name: "pubspec.yaml".to_string(),
                    format: "yaml".to_string(),
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

    fn prepared() -> DartStrategy {
        let mut s = DartStrategy::new();
        s.prepare().unwrap();
        s
    }

    #[test]
    fn test_extract_widget_subclass() {
        let s = prepared();
        let content = "import 'package:flutter/material.dart';\n\nclass HomePage extends StatelessWidget {\n  final String title;\n}\n";
        let artifacts = s.extract(content);
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].kind, "widget");
        assert_eq!(artifacts[0].suggested_name, "HomePage.dart");
        assert_eq!(artifacts[0].qualifiers, vec!["StatelessWidget"]);
        assert_eq!(artifacts[0].references, vec!["package:flutter/material.dart"]);
    }

    #[test]
    fn test_extract_class_mixin_and_function() {
        let s = prepared();
        let content = "class Store {\n  int count = 0;\n}\n\nmixin Logging {\n  void log() {}\n}\n\nvoid main() {\n  print('hi');\n}\n";
        let artifacts = s.extract(content);
        let kinds: Vec<&str> = artifacts.iter().map(|a| a.kind.as_str()).collect();
        assert_eq!(kinds, vec!["class", "mixin", "function"]);
        assert!(artifacts[2].content.contains("print('hi');"));
    }

    #[test]
    fn test_pubspec_manifest_detected() {
        let s = prepared();
        let content = "name: my_app\nversion: 1.0.0\n\ndependencies:\n  flutter:\n    sdk: flutter\n";
        let artifacts = s.extract(content);
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].kind, "package-manifest");
        assert_eq!(artifacts[0].suggested_name, "pubspec.yaml");
        assert_eq!(artifacts[0].namespace, "my_app");
    }

    #[test]
    fn test_unmatched_input_yields_nothing() {
        let s = prepared();
        assert!(s.extract("no dart constructs present").is_empty());
    }
}
