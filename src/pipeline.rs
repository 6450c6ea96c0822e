//! Build orchestration.
//!
//! Wires the stages together and drives one run to completion:
//!
//! ```text
//! discover ──paths──▶ translate ──jobs──▶ pool ──results──▶ caller
//! ```
//!
//! Every arrow is a rendezvous conduit (`sync_channel(0)`), so a stage can
//! only hand over a value when the next stage is ready to take it. Discovery,
//! translation and the pool each run on their own scoped thread; results are
//! consumed on the calling thread.
//!
//! ## Shutdown
//!
//! Each stage ends when its input conduit closes and closes its own output on
//! the way out: discovery finishes listing, translation sees the end of the
//! paths and drops the job sender, the pool drains its in-flight tasks and
//! drops the result sender, and the caller's result loop ends. Only then is
//! `finished` logged.
//!
//! ## Failure Handling
//!
//! | Failure | Effect |
//! |---------|--------|
//! | Template missing or malformed | [`BuildError::Template`], nothing started |
//! | Source directory unreadable | logged, recorded in the report, run continues |
//! | Bad article file name | logged, recorded as skipped |
//! | Article read/write/template failure | logged, recorded as failed |
//!
//! Per-article problems never abort the run. Whether they fail the process is
//! decided by the caller through [`BuildReport::is_success`].

use crate::config::BuildConfig;
use crate::discover::{DiscoveredPath, DiscoveryError, discover};
use crate::naming::FormatError;
use crate::output::error_chain;
use crate::pool::{PoolError, run_pool};
use crate::render::{ArticleError, ArticleRenderer, HtmlRenderer, RenderJob, RenderResult};
use crate::template::{PageTemplate, TemplateError};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error("failed to start {stage} stage: {source}")]
    Spawn {
        stage: &'static str,
        source: io::Error,
    },
    #[error("{0} stage panicked")]
    StagePanicked(&'static str),
}

/// An article that was discovered and scheduled but not written.
#[derive(Debug)]
pub struct FailedArticle {
    pub input: PathBuf,
    pub error: ArticleError,
}

/// Outcome of a full build run.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Output paths written, in completion order.
    pub rendered: Vec<PathBuf>,
    /// Articles whose render failed.
    pub failed: Vec<FailedArticle>,
    /// `.md` files rejected by the naming rule.
    pub skipped: Vec<FormatError>,
    /// Problems listing the source directory.
    pub discovery_errors: Vec<DiscoveryError>,
}

impl BuildReport {
    /// Whether every discovered article was rendered or deliberately skipped.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.discovery_errors.is_empty()
    }

    /// Whether the run counts as successful.
    ///
    /// Permissive runs always succeed once the pipeline completes. Strict
    /// runs require [`is_clean`](Self::is_clean).
    pub fn is_success(&self, strict: bool) -> bool {
        !strict || self.is_clean()
    }

    fn record(&mut self, result: RenderResult) {
        match result {
            RenderResult::Rendered { output } => {
                tracing::info!(output = %output.display(), "successfully rendered");
                self.rendered.push(output);
            }
            RenderResult::Failed { input, error } => {
                tracing::error!(
                    input = %input.display(),
                    error = %error_chain(&error),
                    "failed to render"
                );
                self.failed.push(FailedArticle { input, error });
            }
        }
    }
}

/// What translation dropped instead of forwarding.
#[derive(Debug, Default)]
struct Dropped {
    skipped: Vec<FormatError>,
    discovery_errors: Vec<DiscoveryError>,
}

/// Run a full build: load the template, then render every article.
///
/// The template is loaded before any stage starts, so a missing or
/// malformed template fails the run before anything is read or written.
pub fn build(config: &BuildConfig) -> Result<BuildReport, BuildError> {
    let template = PageTemplate::load(&config.template_dir)?;
    tracing::debug!(template = %template.path().display(), "loaded page template");
    let renderer = HtmlRenderer::new(template, config.page.clone());
    build_with(config, &renderer)
}

/// Run the pipeline with a given renderer.
pub fn build_with<R: ArticleRenderer>(
    config: &BuildConfig,
    renderer: &R,
) -> Result<BuildReport, BuildError> {
    tracing::info!(
        source = %config.source_dir.display(),
        output = %config.output_dir.display(),
        workers = %config.concurrency,
        "building articles"
    );

    let (path_tx, path_rx) = mpsc::sync_channel::<DiscoveredPath>(0);
    let (job_tx, job_rx) = mpsc::sync_channel::<RenderJob>(0);
    let (result_tx, result_rx) = mpsc::sync_channel::<RenderResult>(0);

    let report = thread::scope(|s| -> Result<BuildReport, BuildError> {
        let pool = thread::Builder::new()
            .name("pool".into())
            .spawn_scoped(s, move || {
                run_pool(renderer, config.concurrency, job_rx, result_tx)
            })
            .map_err(|source| BuildError::Spawn {
                stage: "pool",
                source,
            })?;

        let discovery = thread::Builder::new()
            .name("discover".into())
            .spawn_scoped(s, move || discover(&config.source_dir, path_tx))
            .map_err(|source| BuildError::Spawn {
                stage: "discovery",
                source,
            })?;

        let translation = thread::Builder::new()
            .name("translate".into())
            .spawn_scoped(s, move || translate(path_rx, &config.output_dir, job_tx))
            .map_err(|source| BuildError::Spawn {
                stage: "translation",
                source,
            })?;

        let mut report = BuildReport::default();
        for result in result_rx {
            report.record(result);
        }

        discovery
            .join()
            .map_err(|_| BuildError::StagePanicked("discovery"))?;
        let dropped = translation
            .join()
            .map_err(|_| BuildError::StagePanicked("translation"))?;
        pool.join().map_err(|_| BuildError::StagePanicked("pool"))??;

        report.skipped = dropped.skipped;
        report.discovery_errors = dropped.discovery_errors;
        Ok(report)
    })?;

    tracing::info!(
        rendered = report.rendered.len(),
        failed = report.failed.len(),
        skipped = report.skipped.len(),
        "finished"
    );
    Ok(report)
}

/// Turn discovered paths into render jobs.
///
/// Closes `jobs` (by dropping it) once `paths` is exhausted, or early if the
/// pool stops accepting.
fn translate(
    paths: Receiver<DiscoveredPath>,
    output_root: &Path,
    jobs: SyncSender<RenderJob>,
) -> Dropped {
    let mut dropped = Dropped::default();
    for discovered in paths {
        let path = match discovered {
            Ok(path) => path,
            Err(err) => {
                tracing::error!(error = %error_chain(&err), "article discovery failed");
                dropped.discovery_errors.push(err);
                continue;
            }
        };

        match RenderJob::from_path(&path, output_root) {
            Ok(job) => {
                if jobs.send(job).is_err() {
                    tracing::warn!("render pool stopped accepting jobs");
                    break;
                }
            }
            Err(err) => {
                tracing::warn!(file = %err.name, "{err}");
                dropped.skipped.push(err);
            }
        }
    }
    dropped
}
