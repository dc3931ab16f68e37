//! Dynamic scripting/markup strategy: import/export/class/function/component
//! patterns and framework configuration files.

use regex::Regex;

use crate::artifact::{dedup_preserving_order, Artifact};

use super::{balanced_block, ExtractionStrategy};

struct JsPatterns {
    import_from: Regex,
    require_call: Regex,
    class_decl: Regex,
    func_decl: Regex,
    arrow_decl: Regex,
    component_decl: Regex,
}

impl JsPatterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            import_from: Regex::new(
                r#"(?m)^import\s+(?:[\w$*{},\s]+from\s+)?['"]([^'"]+)['"]"#,
            )?,
            require_call: Regex::new(r#"require\(\s*['"]([^'"]+)['"]\s*\)"#)?,
            class_decl: Regex::new(r"(?m)^(?:export\s+)?(?:default\s+)?class\s+(\w+)")?,
            func_decl: Regex::new(
                r"(?m)^(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s+(\w+)\s*\(",
            )?,
            arrow_decl: Regex::new(
                r"(?m)^(?:export\s+)?(?:const|let|var)\s+(\w+)\s*=\s*(?:async\s+)?\([^)\n]*\)\s*=>",
            )?,
            // A function that immediately renders markup.
            component_decl: Regex::new(
                r"(?m)^(?:export\s+)?(?:default\s+)?function\s+(\w+)\s*\([^)\n]*\)\s*\{[^{}]*return\s*\(\s*<",
            )?,
        })
    }
}

/// Extracts JavaScript/TypeScript declarations and framework config files.
pub struct JavaScriptStrategy {
    patterns: Option<JsPatterns>,
}

impl JavaScriptStrategy {
    pub fn new() -> Self {
        Self { patterns: None }
    }
}

impl Default for JavaScriptStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionStrategy for JavaScriptStrategy {
    fn name(&self) -> &'static str {
        "javascript"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".js", ".jsx", ".ts", ".tsx", ".mjs", ".cjs"]
    }

    fn prepare(&mut self) -> anyhow::Result<()> {
        self.patterns = Some(JsPatterns::compile()?);
        Ok(())
    }

    fn dispose(&mut self) {
        self.patterns = None;
    }

    fn handles(&self, filename: &str) -> bool {
        let lower = filename.to_lowercase();
        self.extensions().iter().any(|e| lower.ends_with(e)) || lower.ends_with("package.json")
    }

    fn extract(&self, content: &str) -> Vec<Artifact> {
        let Some(p) = &self.patterns else {
            return Vec::new();
        };
        let mut artifacts = Vec::new();

        let mut imports: Vec<String> = p
            .import_from
            .captures_iter(content)
            .map(|c| c[1].to_string())
            .collect();
        imports.extend(p.require_call.captures_iter(content).map(|c| c[1].to_string()));
        let imports = dedup_preserving_order(imports);

        for caps in p.class_decl.captures_iter(content) {
            let name = &caps[1];
            let exported = caps[0].trim_start().starts_with("export");
            let anchor = format!(
                r"(?:export\s+)?(?:default\s+)?class\s+{}(?:\s+extends\s+[\w.]+)?\s*",
                regex::escape(name)
            );
            let decl = balanced_block(content, &anchor)
                .unwrap_or_else(|| format!("class {} {{\n}}", name));
            artifacts.push(Artifact {
                content: decl,
                kind: "class".to_string(),
                suggested_name: format!("{}.js", name),
                format: "javascript".to_string(),
                references: imports.clone(),
                qualifiers: if exported { vec!["export".to_string()] } else { vec![] },
                ..Artifact::default()
            });
        }

        for caps in p.func_decl.captures_iter(content) {
            let name = &caps[1];
            let exported = caps[0].trim_start().starts_with("export");
            let anchor = format!(
                r"(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s+{}\s*\([^)]*\)\s*",
                regex::escape(name)
            );
            let decl = balanced_block(content, &anchor)
                .unwrap_or_else(|| format!("function {}() {{\n}}", name));
            artifacts.push(Artifact {
                content: decl,
                kind: "function".to_string(),
                suggested_name: format!("{}.js", name),
                format: "javascript".to_string(),
                references: imports.clone(),
                qualifiers: if exported { vec!["export".to_string()] } else { vec![] },
                ..Artifact::default()
            });
        }

        for caps in p.arrow_decl.captures_iter(content) {
            let name = &caps[1];
            let anchor = format!(
                r"(?:export\s+)?(?:const|let|var)\s+{}\s*=\s*(?:async\s+)?\([^)]*\)\s*=>\s*",
                regex::escape(name)
            );
            let decl = balanced_block(content, &anchor)
                .unwrap_or_else(|| format!("const {} = () => {{\n}};", name));
            artifacts.push(Artifact {
                content: decl,
                kind: "arrow-function".to_string(),
                suggested_name: format!("{}.js", name),
                format: "javascript".to_string(),
                references: imports.clone(),
                ..Artifact::default()
            });
        }

        // Components render markup; they are emitted in addition to their
        // plain-function artifact, under a markup extension.
        for caps in p.component_decl.captures_iter(content) {
            let name = &caps[1];
            let anchor = format!(
                r"(?:export\s+)?(?:default\s+)?function\s+{}\s*\([^)]*\)\s*",
                regex::escape(name)
            );
            let decl = balanced_block(content, &anchor)
                .unwrap_or_else(|| format!("function {}() {{\n    return null;\n}}", name));
            artifacts.push(Artifact {
                content: decl,
                kind: "component".to_string(),
                suggested_name: format!("{}.jsx", name),
                format: "javascript".to_string(),
                references: imports.clone(),
                ..Artifact::default()
            });
        }

        // Framework package manifest pasted into the text.
        if content.contains(r#""name""#) && content.contains(r#""version""#) {
            if let (Some(start), Some(end)) = (content.find('{'), content.rfind('}')) {
                if end > start {
                    let json = &content[start..=end];
                    artifacts.push(Artifact {
                        content: json.to_string(),
                        kind: "module-config".to_string(),
                        suggested_name: "package.json".to_string(),
                        format: "json".to_string(),
                        ..Artifact::default()
                    });
                }
            }
        }

        artifacts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepared() -> JavaScriptStrategy {
        let mut s = JavaScriptStrategy::new();
        s.prepare().unwrap();
        s
    }

    #[test]
    fn test_extract_class_and_imports() {
        let s = prepared();
        let content = "import React from 'react';\nconst fs = require('fs');\n\nexport class Widget {\n    render() { return 1; }\n}\n";
        let artifacts = s.extract(content);
        let class = artifacts.iter().find(|a| a.kind == "class").unwrap();
        assert_eq!(class.suggested_name, "Widget.js");
        assert!(class.content.contains("render() { return 1; }"));
        assert_eq!(class.references, vec!["react", "fs"]);
        assert_eq!(class.qualifiers, vec!["export"]);
    }

    #[test]
    fn test_extract_function_and_arrow_function() {
        let s = prepared();
        let content = "function greet(name) {\n    return name;\n}\n\nexport const sum = (a, b) => {\n    return a + b;\n};\n";
        let artifacts = s.extract(content);
        let kinds: Vec<&str> = artifacts.iter().map(|a| a.kind.as_str()).collect();
        assert_eq!(kinds, vec!["function", "arrow-function"]);
        assert!(artifacts[1].content.contains("a + b"));
    }

    #[test]
    fn test_component_emitted_with_markup_extension() {
        let s = prepared();
        let content = "function App() {\n    return (\n        <div>hello</div>\n    );\n}\n";
        let artifacts = s.extract(content);
        let component = artifacts.iter().find(|a| a.kind == "component").unwrap();
        assert_eq!(component.suggested_name, "App.jsx");
    }

    #[test]
    fn test_package_manifest_detected() {
        let s = prepared();
        let content = "{\n  \"name\": \"demo\",\n  \"version\": \"1.0.0\"\n}\n";
        let artifacts = s.extract(content);
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].kind, "module-config");
        assert_eq!(artifacts[0].suggested_name, "package.json");
    }

    #[test]
    fn test_unmatched_input_yields_nothing() {
        let s = prepared();
        assert!(s.extract("plain prose, nothing else").is_empty());
    }
}
