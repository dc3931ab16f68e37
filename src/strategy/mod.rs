//! Extraction strategies: the pluggable per-language/format algorithms.
//!
//! Each strategy turns raw text into an ordered sequence of [`Artifact`]s.
//! Matching is regex-based and best-effort: unmatched or malformed input
//! yields zero artifacts, never an error. The universal fallback strategy
//! (`generic`) instead emits the whole input as one artifact when nothing
//! else matches.

use std::fmt;

mod dart;
mod generic;
mod golang;
mod java;
mod javascript;
mod python;
mod rust_lang;

pub use dart::DartStrategy;
pub use generic::GenericStrategy;
pub use golang::GoStrategy;
pub use java::JavaStrategy;
pub use javascript::JavaScriptStrategy;
pub use python::PythonStrategy;
pub use rust_lang::RustStrategy;

use crate::artifact::Artifact;
use crate::error::EngineError;
use crate::registry::StrategyRegistry;

/// Capability set every extraction strategy implements.
///
/// # Thread safety
///
/// A single instance holds mutable matcher state between `prepare` and
/// `dispose` and must not run `extract` from two workers at once. The
/// registry enforces this structurally by handing each caller its own
/// freshly prepared instance.
pub trait ExtractionStrategy: Send + Sync {
    /// Stable lowercase identifier, unique across the registry.
    fn name(&self) -> &'static str;

    /// File extensions this strategy claims by default (with leading dot).
    fn extensions(&self) -> &'static [&'static str];

    /// Compile internal matchers. Called once before first use.
    fn prepare(&mut self) -> anyhow::Result<()>;

    /// Release matcher state. Idempotent; called on every exit path.
    fn dispose(&mut self);

    /// Content-agnostic filename heuristic used by the registry when no
    /// extension mapping exists.
    fn handles(&self, filename: &str) -> bool;

    /// Extract artifacts from `content`. Must not fail for any input.
    fn extract(&self, content: &str) -> Vec<Artifact>;
}

/// Factory for compile-time registered strategies.
///
/// Dynamic shared-library loading is deliberately absent; the registry only
/// accepts factories known at compile time.
pub type StrategyFactory = fn() -> Box<dyn ExtractionStrategy>;

/// A strategy instance whose matchers have been compiled.
///
/// `dispose()` runs on drop, so matcher state is released on every exit
/// path, including early returns and panics.
pub struct PreparedStrategy {
    inner: Box<dyn ExtractionStrategy>,
}

impl PreparedStrategy {
    /// Prepare `strategy` for use, consuming it.
    pub fn new(mut strategy: Box<dyn ExtractionStrategy>) -> anyhow::Result<Self> {
        strategy.prepare()?;
        Ok(Self { inner: strategy })
    }

    /// Name of the underlying strategy.
    pub fn name(&self) -> &'static str {
        self.inner.name()
    }

    /// Run the underlying extraction.
    pub fn extract(&self, content: &str) -> Vec<Artifact> {
        self.inner.extract(content)
    }
}

impl Drop for PreparedStrategy {
    fn drop(&mut self) {
        self.inner.dispose();
    }
}

impl fmt::Debug for PreparedStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedStrategy")
            .field("name", &self.name())
            .finish()
    }
}

/// Register all built-in strategies.
///
/// The universal fallback (`generic`) is registered last so the `handles()`
/// sweep consults the specific strategies first.
pub fn register_builtin(registry: &mut StrategyRegistry) -> Result<(), EngineError> {
    registry.register(|| Box::new(JavaStrategy::new()))?;
    registry.register(|| Box::new(GoStrategy::new()))?;
    registry.register(|| Box::new(PythonStrategy::new()))?;
    registry.register(|| Box::new(JavaScriptStrategy::new()))?;
    registry.register(|| Box::new(RustStrategy::new()))?;
    registry.register(|| Box::new(DartStrategy::new()))?;
    registry.register(|| Box::new(GenericStrategy::new()))?;
    Ok(())
}

/// Regex fragment matching a brace-delimited body with one level of nested
/// `{...}` tolerated. Two or more nesting levels may truncate the match;
/// this is a documented approximation of the engine, not a bug.
pub(crate) const BRACE_BODY: &str = r"\{(?:[^{}]|\{[^{}]*\})*\}";

/// Re-scan `content` with a name-anchored pattern to recover the complete
/// balanced body of a declaration found by a coarse scan.
///
/// `anchor` must already be regex-escaped where it embeds user text.
/// Returns `None` when the pattern fails to compile or no longer matches;
/// callers then synthesize a skeleton so every declared name yields an
/// artifact.
pub(crate) fn balanced_block(content: &str, anchor: &str) -> Option<String> {
    let pattern = format!("{}{}", anchor, BRACE_BODY);
    let re = regex::Regex::new(&pattern).ok()?;
    re.find(content).map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_block_one_level_nesting() {
        let content = "type Foo struct { inner struct { a int } }";
        let body = balanced_block(content, r"type\s+Foo\s+struct\s*").unwrap();
        assert!(body.ends_with("} }"));
        assert!(body.contains("a int"));
    }

    #[test]
    fn test_balanced_block_missing_declaration() {
        assert!(balanced_block("nothing here", r"type\s+Foo\s+struct\s*").is_none());
    }

    #[test]
    fn test_prepared_strategy_disposes_on_drop() {
        // GenericStrategy::dispose is idempotent; exercising the guard twice
        // verifies drop does not double-release.
        let prepared = PreparedStrategy::new(Box::new(GenericStrategy::new())).unwrap();
        let artifacts = prepared.extract("plain text");
        assert_eq!(artifacts.len(), 1);
        drop(prepared);
    }

    #[test]
    fn test_prepared_strategy_debug_names_strategy() {
        let prepared = PreparedStrategy::new(Box::new(GenericStrategy::new())).unwrap();
        assert!(format!("{:?}", prepared).contains("generic"));
    }
}
