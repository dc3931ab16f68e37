//! Unflatten - a text-to-artifact extraction engine.
//!
//! Unflatten recovers structured source files from flattened text: pasted
//! chat transcripts, concatenated dumps, or markdown documents containing
//! code. Per-language strategies scan the text with best-effort regex
//! matching and emit classified artifacts, which a writer persists as
//! individual files.
//!
//! # Architecture
//!
//! - `artifact`: Core data model (artifacts, per-file results)
//! - `strategy`: Pluggable per-language/format extraction strategies
//! - `registry`: Strategy lookup by name, extension, or filename sniff
//! - `pipeline`: Per-file read/resolve/extract with failure isolation
//! - `batch`: Sequential or pooled runs over many files
//! - `writer`: Output naming, sanitization, and persistence
//! - `merge`: Coalescing artifacts that collide on output identity
//!
//! # Adding a New Strategy
//!
//! See `src/strategy/` for examples. Implement `ExtractionStrategy` and
//! register a factory with the `StrategyRegistry`.

pub mod artifact;
pub mod batch;
pub mod error;
pub mod merge;
pub mod pipeline;
pub mod registry;
pub mod strategy;
pub mod writer;

pub use artifact::{Artifact, ExtractionResult};
pub use batch::{run_batch, BatchOptions, BatchOutcome, FileFailure};
pub use error::EngineError;
pub use merge::{merge_group, MERGE_SEPARATOR};
pub use registry::{StrategyInfo, StrategyRegistry};
pub use strategy::{register_builtin, ExtractionStrategy, PreparedStrategy};
pub use writer::ArtifactWriter;

/// Name and extension claims of every registered strategy, sorted by name
/// for deterministic listing output.
pub fn list_strategies(registry: &StrategyRegistry) -> Vec<StrategyInfo> {
    registry.list()
}
