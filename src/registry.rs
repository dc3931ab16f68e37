//! Strategy registry: owns the set of available strategies and resolves
//! which one applies to a given file.
//!
//! Resolution precedence: explicit language override, then claimed file
//! extension, then a `handles()` sweep in registration order. The universal
//! fallback registers last with an always-true `handles()`, so a non-empty
//! registry with the built-in set always resolves.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::EngineError;
use crate::strategy::{ExtractionStrategy, PreparedStrategy, StrategyFactory};

struct Entry {
    /// Unprepared instance kept for metadata queries (name, extensions,
    /// filename sniffing). Never used for extraction.
    probe: Box<dyn ExtractionStrategy>,
    factory: StrategyFactory,
}

/// Name and claimed extensions of one registered strategy.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyInfo {
    pub name: &'static str,
    pub extensions: Vec<&'static str>,
}

/// Lookup structure mapping name, extension, or filename sniff to a
/// strategy factory.
///
/// Resolution hands out a freshly prepared instance per call, so no
/// strategy instance is ever shared between workers.
#[derive(Default)]
pub struct StrategyRegistry {
    entries: Vec<Entry>,
    by_name: HashMap<String, usize>,
    by_extension: HashMap<String, usize>,
    // Language ids currently coincide with strategy names, but the table
    // stays separate from `by_name` so the two can diverge.
    by_language: HashMap<String, usize>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-loaded with every built-in strategy.
    pub fn with_builtin() -> Result<Self, EngineError> {
        let mut registry = Self::new();
        crate::strategy::register_builtin(&mut registry)?;
        Ok(registry)
    }

    /// Register a strategy factory.
    ///
    /// A probe instance is prepared immediately so a broken strategy fails
    /// here, before any file is processed, rather than mid-batch. Extension
    /// claims are lowercased; a later registration takes over an extension
    /// already claimed.
    pub fn register(&mut self, factory: StrategyFactory) -> Result<(), EngineError> {
        let mut probe = factory();
        let name = probe.name();
        let name_key = name.to_lowercase();

        if self.by_name.contains_key(&name_key) {
            return Err(EngineError::DuplicateRegistration(name.to_string()));
        }

        if let Err(err) = probe.prepare() {
            return Err(EngineError::PluginInit {
                name: name.to_string(),
                reason: err.to_string(),
            });
        }
        probe.dispose();

        let index = self.entries.len();
        self.by_name.insert(name_key.clone(), index);
        self.by_language.insert(name_key, index);
        for ext in probe.extensions() {
            self.by_extension.insert(ext.to_lowercase(), index);
        }
        self.entries.push(Entry { probe, factory });
        Ok(())
    }

    /// Number of registered strategies.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Name and extension claims of every strategy, sorted by name for
    /// deterministic listing output.
    pub fn list(&self) -> Vec<StrategyInfo> {
        let mut infos: Vec<StrategyInfo> = self
            .entries
            .iter()
            .map(|e| StrategyInfo {
                name: e.probe.name(),
                extensions: e.probe.extensions().to_vec(),
            })
            .collect();
        infos.sort_by_key(|i| i.name);
        infos
    }

    /// Resolve the strategy for `filename` and hand back a fresh prepared
    /// instance.
    ///
    /// An explicit `language` override wins when it names a registered
    /// strategy; an unknown override skips the extension table and goes
    /// straight to the filename sweep. With no override, the claimed
    /// extension decides, then `handles()` in registration order.
    pub fn resolve(
        &self,
        filename: &str,
        language: Option<&str>,
    ) -> Result<PreparedStrategy, EngineError> {
        if let Some(lang) = language {
            if let Some(&index) = self.by_language.get(&lang.to_lowercase()) {
                return self.instantiate(index);
            }
            // Unknown override: the extension table is not consulted.
            return self.sniff(filename);
        }

        if let Some(ext) = extension_of(filename) {
            if let Some(&index) = self.by_extension.get(&ext) {
                return self.instantiate(index);
            }
        }

        self.sniff(filename)
    }

    fn sniff(&self, filename: &str) -> Result<PreparedStrategy, EngineError> {
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.probe.handles(filename) {
                return self.instantiate(index);
            }
        }
        Err(EngineError::NoStrategy(filename.to_string()))
    }

    fn instantiate(&self, index: usize) -> Result<PreparedStrategy, EngineError> {
        let entry = &self.entries[index];
        PreparedStrategy::new((entry.factory)()).map_err(|err| EngineError::PluginInit {
            name: entry.probe.name().to_string(),
            reason: err.to_string(),
        })
    }
}

/// Lowercased extension of `filename`, with leading dot.
fn extension_of(filename: &str) -> Option<String> {
    let name = filename.rsplit(['/', '\\']).next()?;
    let dot = name.rfind('.')?;
    if dot == 0 {
        // Dotfiles have no extension.
        return None;
    }
    Some(name[dot..].to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::register_builtin;

    fn builtin() -> StrategyRegistry {
        StrategyRegistry::with_builtin().unwrap()
    }

    #[test]
    fn test_extension_lookup_is_case_insensitive() {
        let registry = builtin();
        let strategy = registry.resolve("MAIN.GO", None).unwrap();
        assert_eq!(strategy.name(), "go");
    }

    #[test]
    fn test_override_beats_extension() {
        let registry = builtin();
        let strategy = registry.resolve("foo.rs", Some("python")).unwrap();
        assert_eq!(strategy.name(), "python");
    }

    #[test]
    fn test_unknown_override_falls_through_to_sweep() {
        let registry = builtin();
        let strategy = registry.resolve("script.py", Some("cobol")).unwrap();
        // The extension table is skipped; the sweep reaches the python
        // strategy through its filename heuristic.
        assert_eq!(strategy.name(), "python");
        let strategy = registry.resolve("mystery.zzz", Some("cobol")).unwrap();
        assert_eq!(strategy.name(), "generic");
    }

    #[test]
    fn test_unclaimed_extension_uses_handles_sweep() {
        let registry = builtin();
        // .sum is not in any extension table; the go strategy claims the
        // filename go.sum by sniff.
        let strategy = registry.resolve("go.sum", None).unwrap();
        assert_eq!(strategy.name(), "go");
    }

    #[test]
    fn test_unknown_file_falls_back_to_generic() {
        let registry = builtin();
        let strategy = registry.resolve("notes.zzz", None).unwrap();
        assert_eq!(strategy.name(), "generic");
    }

    #[test]
    fn test_language_override_is_case_insensitive() {
        let registry = builtin();
        let strategy = registry.resolve("anything.rs", Some("GO")).unwrap();
        assert_eq!(strategy.name(), "go");
    }

    struct ShoutyGoStrategy;

    impl ExtractionStrategy for ShoutyGoStrategy {
        fn name(&self) -> &'static str {
            "Go"
        }
        fn extensions(&self) -> &'static [&'static str] {
            &[]
        }
        fn prepare(&mut self) -> anyhow::Result<()> {
            Ok(())
        }
        fn dispose(&mut self) {}
        fn handles(&self, _filename: &str) -> bool {
            false
        }
        fn extract(&self, _content: &str) -> Vec<crate::artifact::Artifact> {
            Vec::new()
        }
    }

    #[test]
    fn test_duplicate_detection_ignores_name_case() {
        let mut registry = builtin();
        let err = registry.register(|| Box::new(ShoutyGoStrategy)).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateRegistration(name) if name == "Go"));
        // The lowercase-registered strategy still resolves.
        let strategy = registry.resolve("main.go", None).unwrap();
        assert_eq!(strategy.name(), "go");
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = builtin();
        let err = registry
            .register(|| Box::new(crate::strategy::GoStrategy::new()))
            .unwrap_err();
        assert!(matches!(err, EngineError::DuplicateRegistration(name) if name == "go"));
    }

    #[test]
    fn test_empty_registry_resolves_nothing() {
        let registry = StrategyRegistry::new();
        let err = registry.resolve("main.go", None).unwrap_err();
        assert!(matches!(err, EngineError::NoStrategy(_)));
    }

    #[test]
    fn test_register_builtin_is_idempotent_failure() {
        let mut registry = builtin();
        assert!(register_builtin(&mut registry).is_err());
    }

    #[test]
    fn test_list_is_name_sorted() {
        let registry = builtin();
        let names: Vec<&str> = registry.list().iter().map(|i| i.name).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names.len(), 7);
    }

    #[test]
    fn test_extension_of_handles_paths_and_dotfiles() {
        assert_eq!(extension_of("a/b/Main.JAVA"), Some(".java".to_string()));
        assert_eq!(extension_of(".gitignore"), None);
        assert_eq!(extension_of("README"), None);
    }
}
