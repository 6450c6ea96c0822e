//! Per-article rendering.
//!
//! A [`RenderJob`] is one article resolved to its input and output paths.
//! Rendering a job runs these steps in order, stopping at the first failure:
//!
//! ```text
//! 1. read input file           → ArticleError::Read
//! 2. markdown → HTML fragment  (pure, cannot fail)
//! 3. create output directory   → ArticleError::CreateDir
//! 4. create/truncate output    → ArticleError::CreateFile
//! 5. merge into page template  → ArticleError::Template / ArticleError::Write
//! ```
//!
//! Every job ends as exactly one [`RenderResult`]: `Rendered` with the output
//! path, or `Failed` with the input path and the cause.
//!
//! [`ArticleRenderer`] is the seam between the worker pool and the work
//! itself. [`HtmlRenderer`] is the real implementation; tests plug in their
//! own to control timing and failures.

use crate::config::{MetadataPolicy, PageConfig};
use crate::markdown::render_markdown;
use crate::naming::{self, ArticleName, FormatError};
use crate::template::{PageContext, PageTemplate};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArticleError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("failed to create {}: {source}", path.display())]
    CreateFile { path: PathBuf, source: io::Error },
    #[error("template execution failed: {0}")]
    Template(#[from] tera::Error),
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("render task panicked: {0}")]
    Panicked(String),
    #[error("failed to spawn render thread: {0}")]
    Spawn(io::Error),
}

/// One article resolved to where it is read from and written to.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub name: ArticleName,
}

impl RenderJob {
    /// Derive a job from a discovered article path.
    ///
    /// `content/foo.my-slug.md` with output root `/out` becomes
    /// `/out/my-slug/index.html`.
    pub fn from_path(input: &Path, output_root: &Path) -> Result<Self, FormatError> {
        let file_name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = naming::parse_article_name(&file_name)?;
        Ok(Self {
            input: input.to_path_buf(),
            output: naming::output_path(output_root, &name.slug),
            name,
        })
    }
}

/// Outcome of one render job.
#[derive(Debug)]
pub enum RenderResult {
    Rendered { output: PathBuf },
    Failed { input: PathBuf, error: ArticleError },
}

impl RenderResult {
    /// Wrap the outcome of rendering `job`.
    pub fn from_outcome(job: &RenderJob, outcome: Result<PathBuf, ArticleError>) -> Self {
        match outcome {
            Ok(output) => RenderResult::Rendered { output },
            Err(error) => RenderResult::Failed {
                input: job.input.clone(),
                error,
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RenderResult::Rendered { .. })
    }

    /// Output path on success, input path on failure.
    pub fn path(&self) -> &Path {
        match self {
            RenderResult::Rendered { output } => output,
            RenderResult::Failed { input, .. } => input,
        }
    }
}

/// Turns one job into a written page.
///
/// Shared by reference across all render tasks, so implementations must be
/// `Sync`.
pub trait ArticleRenderer: Sync {
    /// Render `job`, returning the output path written.
    fn render(&self, job: &RenderJob) -> Result<PathBuf, ArticleError>;
}

/// Markdown + page template renderer writing to the filesystem.
#[derive(Debug)]
pub struct HtmlRenderer {
    template: PageTemplate,
    page: PageConfig,
}

impl HtmlRenderer {
    pub fn new(template: PageTemplate, page: PageConfig) -> Self {
        Self { template, page }
    }

    /// Title for a job under the configured metadata policy.
    fn title_for(&self, job: &RenderJob) -> String {
        match self.page.metadata {
            MetadataPolicy::Placeholder => self.page.title.clone(),
            MetadataPolicy::Filename => job.name.display_title(),
        }
    }
}

impl ArticleRenderer for HtmlRenderer {
    fn render(&self, job: &RenderJob) -> Result<PathBuf, ArticleError> {
        let source = fs::read(&job.input).map_err(|source| ArticleError::Read {
            path: job.input.clone(),
            source,
        })?;

        let body = render_markdown(&source);

        if let Some(parent) = job.output.parent() {
            fs::create_dir_all(parent).map_err(|source| ArticleError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let file = File::create(&job.output).map_err(|source| ArticleError::CreateFile {
            path: job.output.clone(),
            source,
        })?;
        let mut dst = BufWriter::new(file);

        let title = self.title_for(job);
        let page = PageContext {
            title: &title,
            created_at: &self.page.created_at,
            content: &body,
        };
        self.template.render_to(&page, &mut dst)?;
        dst.flush().map_err(|source| ArticleError::Write {
            path: job.output.clone(),
            source,
        })?;

        Ok(job.output.clone())
    }
}
