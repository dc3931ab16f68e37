//! Indentation-delimited strategy: class/def blocks, decorators,
//! dependency manifests.

use regex::Regex;

use crate::artifact::{dedup_preserving_order, Artifact};

use super::ExtractionStrategy;

/// Regex fragment matching an indented suite: indented lines and blank
/// lines up to the next top-level statement. Trailing blanks are trimmed
/// after matching.
const INDENT_SUITE: &str = r"(?:(?:[ \t]+[^\n]*)?\n)*";

struct PythonPatterns {
    import: Regex,
    decorator: Regex,
    class_decl: Regex,
    func_decl: Regex,
    async_func_decl: Regex,
    requirement_line: Regex,
    setup_call: Regex,
}

impl PythonPatterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            import: Regex::new(r"(?m)^(?:from\s+([\w.]+)\s+import|import\s+([\w.]+))")?,
            decorator: Regex::new(r"(?m)^\s*@([\w.]+)")?,
            class_decl: Regex::new(r"(?m)^class\s+(\w+)")?,
            func_decl: Regex::new(r"(?m)^def\s+(\w+)")?,
            async_func_decl: Regex::new(r"(?m)^async\s+def\s+(\w+)")?,
            requirement_line: Regex::new(
                r"(?m)^([A-Za-z0-9][A-Za-z0-9._-]*)(?:\[[^\]\n]+\])?\s*(?:[<>=!~]=?|===)\s*[\w.,*]+\s*$",
            )?,
            setup_call: Regex::new(
                r"(?s)from\s+setuptools\s+import[^\n]*\n.*?setup\((?:[^()]|\([^()]*\))*\)",
            )?,
        })
    }
}

/// Extracts Python classes, functions, and packaging files from mixed text.
pub struct PythonStrategy {
    patterns: Option<PythonPatterns>,
}

impl PythonStrategy {
    pub fn new() -> Self {
        Self { patterns: None }
    }

    /// Recover the complete indentation-balanced suite for a declaration,
    /// or `None` if the name-anchored re-scan misses.
    fn indent_block(content: &str, anchor: &str) -> Option<String> {
        let pattern = format!(r"(?m)^{}[^\n]*\n{}", anchor, INDENT_SUITE);
        let re = Regex::new(&pattern).ok()?;
        re.find(content)
            .map(|m| format!("{}\n", m.as_str().trim_end()))
    }
}

impl Default for PythonStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionStrategy for PythonStrategy {
    fn name(&self) -> &'static str {
        "python"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".py", ".pyw"]
    }

    fn prepare(&mut self) -> anyhow::Result<()> {
        self.patterns = Some(PythonPatterns::compile()?);
        Ok(())
    }

    fn dispose(&mut self) {
        self.patterns = None;
    }

    fn handles(&self, filename: &str) -> bool {
        let lower = filename.to_lowercase();
        lower.ends_with(".py")
            || lower.ends_with(".pyw")
            || lower.ends_with("requirements.txt")
            || lower == "setup.py"
    }

    fn extract(&self, content: &str) -> Vec<Artifact> {
        let Some(p) = &self.patterns else {
            return Vec::new();
        };
        let mut artifacts = Vec::new();

        let imports = dedup_preserving_order(
            p.import
                .captures_iter(content)
                .filter_map(|c| {
                    c.get(1)
                        .or_else(|| c.get(2))
                        .map(|m| m.as_str().to_string())
                })
                .collect(),
        );

        let decorators = dedup_preserving_order(
            p.decorator
                .captures_iter(content)
                .map(|c| c[1].to_string())
                .collect(),
        );

        for caps in p.class_decl.captures_iter(content) {
            let name = &caps[1];
            let anchor = format!(r"class\s+{}(?:\([^)\n]*\))?\s*:", regex::escape(name));
            let body = Self::indent_block(content, &anchor)
                .unwrap_or_else(|| format!("class {}:\n    pass\n", name));
            artifacts.push(Artifact {
                content: body,
                kind: "class".to_string(),
                suggested_name: format!("{}.py", name),
                format: "python".to_string(),
                references: imports.clone(),
                tags: decorators.clone(),
                ..Artifact::default()
            });
        }

        for caps in p.func_decl.captures_iter(content) {
            let name = &caps[1];
            let anchor = format!(
                r"def\s+{}\s*\([^)\n]*\)(?:\s*->\s*[^:\n]+)?\s*:",
                regex::escape(name)
            );
            let body = Self::indent_block(content, &anchor)
                .unwrap_or_else(|| format!("def {}():\n    pass\n", name));
            artifacts.push(Artifact {
                content: body,
                kind: "function".to_string(),
                suggested_name: format!("{}.py", name),
                format: "python".to_string(),
                references: imports.clone(),
                tags: decorators.clone(),
                ..Artifact::default()
            });
        }

        for caps in p.async_func_decl.captures_iter(content) {
            let name = &caps[1];
            let anchor = format!(
                r"async\s+def\s+{}\s*\([^)\n]*\)(?:\s*->\s*[^:\n]+)?\s*:",
                regex::escape(name)
            );
            let body = Self::indent_block(content, &anchor)
                .unwrap_or_else(|| format!("async def {}():\n    pass\n", name));
            artifacts.push(Artifact {
                content: body,
                kind: "async-function".to_string(),
                suggested_name: format!("{}.py", name),
                format: "python".to_string(),
                references: imports.clone(),
                tags: decorators.clone(),
                ..Artifact::default()
            });
        }

        // Dependency manifest lines (name==version style).
        let requirements: String = p
            .requirement_line
            .find_iter(content)
            .map(|m| format!("{}\n", m.as_str().trim()))
            .collect();
        if !requirements.is_empty() {
            artifacts.push(Artifact {
                content: requirements,
                kind: "dependency-manifest".to_string(),
                suggested_name: "requirements.txt".to_string(),
                format: "text".to_string(),
                ..Artifact::default()
            });
        }

        // Packaging script.
        if let Some(m) = p.setup_call.find(content) {
            artifacts.push(Artifact {
                content: format!("{}\n", m.as_str()),
                kind: "module-config".to_string(),
                suggested_name: "setup.py".to_string(),
                format: "python".to_string(),
                ..Artifact::default()
            });
        }

        artifacts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepared() -> PythonStrategy {
        let mut s = PythonStrategy::new();
        s.prepare().unwrap();
        s
    }

    #[test]
    fn test_extract_class_with_indented_body() {
        let s = prepared();
        let content = "import os\n\nclass Loader:\n    def load(self):\n        return os.getcwd()\n\nprint('done')\n";
        let artifacts = s.extract(content);
        let class = artifacts.iter().find(|a| a.kind == "class").unwrap();
        assert_eq!(class.suggested_name, "Loader.py");
        assert!(class.content.contains("def load(self):"));
        // The trailing top-level statement is not part of the suite.
        assert!(!class.content.contains("print('done')"));
        assert_eq!(class.references, vec!["os"]);
    }

    #[test]
    fn test_extract_functions_and_async_functions() {
        let s = prepared();
        let content = "def fetch(url):\n    return url\n\nasync def poll():\n    pass\n";
        let artifacts = s.extract(content);
        let kinds: Vec<&str> = artifacts.iter().map(|a| a.kind.as_str()).collect();
        assert_eq!(kinds, vec!["function", "async-function"]);
        assert!(artifacts[0].content.contains("return url"));
    }

    #[test]
    fn test_decorators_become_tags() {
        let s = prepared();
        let content = "@app.route\ndef index():\n    pass\n";
        let artifacts = s.extract(content);
        assert_eq!(artifacts[0].tags, vec!["app.route"]);
    }

    #[test]
    fn test_requirements_lines_collected() {
        let s = prepared();
        let content = "requests==2.31.0\nflask>=2.0\nnot a requirement line\n";
        let artifacts = s.extract(content);
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].kind, "dependency-manifest");
        assert_eq!(artifacts[0].content, "requests==2.31.0\nflask>=2.0\n");
    }

    #[test]
    fn test_unmatched_input_yields_nothing() {
        let s = prepared();
        assert!(s.extract("nothing pythonic here").is_empty());
    }
}
