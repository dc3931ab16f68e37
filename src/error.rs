//! Engine error taxonomy.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors produced by the extraction engine.
///
/// Strategy-internal matching failures are never errors: `extract` degrades
/// to zero artifacts or a skeleton artifact. Only registry construction
/// errors abort a run before any file is processed; everything else is
/// collected per file and the batch always completes.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A strategy failed `prepare()`. Fatal to registering that strategy only.
    #[error("strategy {name:?} failed to initialize: {reason}")]
    PluginInit { name: String, reason: String },

    /// A second strategy was registered under an existing name.
    #[error("strategy {0:?} is already registered")]
    DuplicateRegistration(String),

    /// No strategy, including the fallback, could be resolved for a file.
    /// Unreachable while the fallback is registered.
    #[error("no strategy available for {0:?}")]
    NoStrategy(String),

    /// The input file could not be read. Recoverable: skip and continue.
    #[error("reading {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An output file could not be written. Recoverable: skip and continue.
    #[error("writing {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An `extract` call exceeded the configured deadline.
    #[error("extraction of {} exceeded {limit:?}", path.display())]
    ExtractTimeout { path: PathBuf, limit: Duration },
}
