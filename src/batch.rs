//! Batch runner: fans input files across a bounded worker pool, or runs
//! them sequentially, collecting per-file results and failures.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use rayon::prelude::*;

use crate::artifact::ExtractionResult;
use crate::error::EngineError;
use crate::merge;
use crate::pipeline;
use crate::registry::StrategyRegistry;
use crate::writer::{self, ArtifactWriter};

/// Configuration for one batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// 1 runs sequentially in input order; higher values use a worker pool
    /// bounded by the machine's available parallelism.
    pub concurrency: usize,
    /// Compute everything, write nothing.
    pub dry_run: bool,
    /// Explicit strategy override applied to every file.
    pub language: Option<String>,
    /// Coalesce artifacts colliding on output identity instead of
    /// overwriting (last-write-wins otherwise).
    pub merge: bool,
    /// Per-file deadline on the extraction call.
    pub extract_timeout: Option<Duration>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            dry_run: false,
            language: None,
            merge: false,
            extract_timeout: None,
        }
    }
}

/// One failed input file and its cause.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: EngineError,
}

/// Everything one batch produced.
///
/// In pooled mode the order of `results` and `failures` is unspecified;
/// sequential mode preserves input order.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub results: Vec<ExtractionResult>,
    pub failures: Vec<FileFailure>,
}

impl BatchOutcome {
    /// Total artifacts across all successful files.
    pub fn total_artifacts(&self) -> usize {
        self.results.iter().map(|r| r.artifact_count()).sum()
    }

    /// Total files written across all successful files.
    pub fn total_written(&self) -> usize {
        self.results.iter().map(|r| r.written_count()).sum()
    }
}

/// Run a batch of input files through extraction and writing.
///
/// Per-file failures never abort the batch; the outcome carries a full
/// accounting of successes and failures. Without merging, each worker
/// writes its own file's artifacts; with merging, writing is deferred
/// until all results are in so collisions can be coalesced batch-wide.
pub fn run_batch(
    paths: &[PathBuf],
    registry: &StrategyRegistry,
    options: &BatchOptions,
    writer: &ArtifactWriter,
) -> BatchOutcome {
    let mut outcome = if options.concurrency <= 1 {
        run_sequential(paths, registry, options, writer)
    } else {
        run_pooled(paths, registry, options, writer)
    };

    if options.merge {
        write_merged(&mut outcome, writer);
    }
    outcome
}

fn process_one(
    path: &Path,
    registry: &StrategyRegistry,
    options: &BatchOptions,
    writer: &ArtifactWriter,
) -> Result<ExtractionResult, EngineError> {
    let mut result = pipeline::extract_file(
        path,
        registry,
        options.language.as_deref(),
        options.extract_timeout,
    )?;
    if !options.merge {
        result.written_paths = writer.write_all(&result.source_path, &result.artifacts);
    }
    Ok(result)
}

fn run_sequential(
    paths: &[PathBuf],
    registry: &StrategyRegistry,
    options: &BatchOptions,
    writer: &ArtifactWriter,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for path in paths {
        match process_one(path, registry, options, writer) {
            Ok(result) => outcome.results.push(result),
            Err(error) => outcome.failures.push(FileFailure {
                path: path.clone(),
                error,
            }),
        }
    }
    outcome
}

fn run_pooled(
    paths: &[PathBuf],
    registry: &StrategyRegistry,
    options: &BatchOptions,
    writer: &ArtifactWriter,
) -> BatchOutcome {
    let workers = options.concurrency.min(available_parallelism());
    let pool = match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool,
        Err(err) => {
            eprintln!("Warning: worker pool unavailable ({}), running sequentially", err);
            return run_sequential(paths, registry, options, writer);
        }
    };

    let (result_tx, result_rx) = mpsc::channel();
    let (failure_tx, failure_rx) = mpsc::channel();

    pool.install(|| {
        paths.par_iter().for_each_with(
            (result_tx, failure_tx),
            |(result_tx, failure_tx), path| {
                match process_one(path, registry, options, writer) {
                    Ok(result) => {
                        let _ = result_tx.send(result);
                    }
                    Err(error) => {
                        let _ = failure_tx.send(FileFailure {
                            path: path.clone(),
                            error,
                        });
                    }
                }
            },
        );
    });

    // All senders are dropped with the closure above; both channels drain
    // to completion here.
    BatchOutcome {
        results: result_rx.into_iter().collect(),
        failures: failure_rx.into_iter().collect(),
    }
}

fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Coalesce colliding artifacts across the whole batch, then write the
/// survivors. Each merged artifact's written path is attributed to the
/// first contributing file's result.
fn write_merged(outcome: &mut BatchOutcome, writer: &ArtifactWriter) {
    let mut candidates = Vec::new();
    for (index, result) in outcome.results.iter().enumerate() {
        for (ordinal, artifact) in result.artifacts.iter().enumerate() {
            candidates.push(merge::MergeCandidate {
                source_index: index,
                resolved_name: writer::output_name(&result.source_path, artifact, ordinal + 1),
                artifact: artifact.clone(),
            });
        }
    }

    for merged in merge::merge_batch(&candidates) {
        let source = outcome.results[merged.source_index].source_path.clone();
        let written = writer.write_all(&source, std::slice::from_ref(&merged.artifact));
        outcome.results[merged.source_index]
            .written_paths
            .extend(written);
    }
}
