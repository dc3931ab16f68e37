//! Per-file extraction pipeline: read, resolve, extract.
//!
//! Every failure here is attributable to exactly one input path; the batch
//! runner collects them without aborting the other files.

use std::fs;
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::artifact::ExtractionResult;
use crate::error::EngineError;
use crate::registry::StrategyRegistry;

/// Run one file through strategy resolution and extraction.
///
/// The returned result carries no written paths; writing is the caller's
/// step. With a `timeout`, extraction runs on its own thread and a deadline
/// miss is reported as [`EngineError::ExtractTimeout`]; the stalled thread
/// is abandoned with its own strategy instance, so no shared state is left
/// behind.
pub fn extract_file(
    path: &Path,
    registry: &StrategyRegistry,
    language: Option<&str>,
    timeout: Option<Duration>,
) -> Result<ExtractionResult, EngineError> {
    let content = fs::read_to_string(path).map_err(|source| EngineError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let strategy = registry.resolve(&path.to_string_lossy(), language)?;
    let strategy_name = strategy.name().to_string();

    let artifacts = match timeout {
        None => strategy.extract(&content),
        Some(limit) => {
            let (tx, rx) = mpsc::channel();
            thread::spawn(move || {
                let _ = tx.send(strategy.extract(&content));
            });
            match rx.recv_timeout(limit) {
                Ok(artifacts) => artifacts,
                Err(_) => {
                    return Err(EngineError::ExtractTimeout {
                        path: path.to_path_buf(),
                        limit,
                    })
                }
            }
        }
    };

    Ok(ExtractionResult {
        source_path: path.to_path_buf(),
        strategy_name,
        artifacts,
        written_paths: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::Artifact;
    use crate::strategy::ExtractionStrategy;
    use std::fs;
    use tempfile::TempDir;

    fn builtin() -> StrategyRegistry {
        StrategyRegistry::with_builtin().unwrap()
    }

    #[test]
    fn test_extract_file_resolves_by_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sample.go");
        fs::write(&path, "package demo\n\nfunc Run() {\n    return\n}\n").unwrap();

        let result = extract_file(&path, &builtin(), None, None).unwrap();
        assert_eq!(result.strategy_name, "go");
        assert_eq!(result.artifact_count(), 1);
        assert!(result.written_paths.is_empty());
    }

    #[test]
    fn test_missing_file_reports_read_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.py");
        let err = extract_file(&path, &builtin(), None, None).unwrap_err();
        assert!(matches!(err, EngineError::Read { .. }));
    }

    struct SleepyStrategy;

    impl ExtractionStrategy for SleepyStrategy {
        fn name(&self) -> &'static str {
            "sleepy"
        }
        fn extensions(&self) -> &'static [&'static str] {
            &[".sleepy"]
        }
        fn prepare(&mut self) -> anyhow::Result<()> {
            Ok(())
        }
        fn dispose(&mut self) {}
        fn handles(&self, filename: &str) -> bool {
            filename.ends_with(".sleepy")
        }
        fn extract(&self, _content: &str) -> Vec<Artifact> {
            thread::sleep(Duration::from_millis(200));
            Vec::new()
        }
    }

    #[test]
    fn test_slow_extraction_hits_deadline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stall.sleepy");
        fs::write(&path, "anything").unwrap();

        let mut registry = StrategyRegistry::new();
        registry.register(|| Box::new(SleepyStrategy)).unwrap();

        let err = extract_file(&path, &registry, None, Some(Duration::from_millis(10)))
            .unwrap_err();
        assert!(matches!(err, EngineError::ExtractTimeout { .. }));
    }

    #[test]
    fn test_timeout_generous_enough_passes_through() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quick.py");
        fs::write(&path, "def f():\n    pass\n").unwrap();

        let result =
            extract_file(&path, &builtin(), None, Some(Duration::from_secs(5))).unwrap();
        assert_eq!(result.strategy_name, "python");
        assert_eq!(result.artifact_count(), 1);
    }
}
