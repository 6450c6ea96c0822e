//! Shared test utilities for the slugpress test suite.
//!
//! Provides fixture setup, small file writers, and a [`StubRenderer`] that
//! lets pool and build tests control timing and failures without touching
//! the filesystem.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let site = setup_fixtures();
//! let config = BuildConfig::new(site.source(), site.output(), site.templates());
//! let report = build(&config).unwrap();
//!
//! assert_eq!(read_page(&site.output(), "post-one").contains("<h1>"), true);
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

use crate::render::{ArticleError, ArticleRenderer, RenderJob};
use crate::template::TEMPLATE_FILE_NAME;

/// Minimal page template exercising all three variables.
pub const TEST_TEMPLATE: &str =
    "<title>{{ title }}</title><time>{{ created_at }}</time>{{ content | safe }}";

// =========================================================================
// Fixture setup
// =========================================================================

/// A temp directory laid out as `content/`, `templates/`, and `dist/`.
pub struct Site {
    tmp: TempDir,
}

impl Site {
    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    pub fn source(&self) -> PathBuf {
        self.root().join("content")
    }

    pub fn templates(&self) -> PathBuf {
        self.root().join("templates")
    }

    pub fn output(&self) -> PathBuf {
        self.root().join("dist")
    }
}

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> Site {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    Site { tmp }
}

/// An empty site with only the test template in place.
pub fn empty_site() -> Site {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir_all(tmp.path().join("content")).unwrap();
    write_template(&tmp.path().join("templates"), TEST_TEMPLATE);
    Site { tmp }
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// File writers and readers
// =========================================================================

/// Write an article file, creating `dir` if needed.
pub fn write_article(dir: &Path, file_name: &str, body: &str) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(file_name);
    std::fs::write(&path, body).unwrap();
    path
}

/// Write `article.html` into `dir`, creating it if needed.
pub fn write_template(dir: &Path, source: &str) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(TEMPLATE_FILE_NAME);
    std::fs::write(&path, source).unwrap();
    path
}

/// Read `<out>/<slug>/index.html`. Panics with the path if missing.
pub fn read_page(output_root: &Path, slug: &str) -> String {
    let path = crate::naming::output_path(output_root, slug);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("page {} not readable: {e}", path.display()))
}

// =========================================================================
// Stub renderer
// =========================================================================

/// Renderer that never touches the filesystem.
///
/// Jobs are matched by slug: slugs in `slow` sleep for `delay`, slugs in
/// `failing` return an error, slugs in `panicking` panic. Everything else
/// succeeds immediately with the job's output path.
#[derive(Default)]
pub struct StubRenderer {
    pub slow: Vec<String>,
    pub failing: Vec<String>,
    pub panicking: Vec<String>,
    pub delay: Duration,
    pub(crate) in_flight: AtomicUsize,
    pub(crate) max_in_flight: AtomicUsize,
}

impl StubRenderer {
    /// Highest number of jobs observed running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ArticleRenderer for StubRenderer {
    fn render(&self, job: &RenderJob) -> Result<PathBuf, ArticleError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let slug = &job.name.slug;
        if self.slow.contains(slug) {
            thread::sleep(self.delay);
        }
        if self.panicking.contains(slug) {
            panic!("stub renderer panicked on {slug}");
        }
        if self.failing.contains(slug) {
            return Err(ArticleError::Read {
                path: job.input.clone(),
                source: io::Error::other("stub failure"),
            });
        }
        Ok(job.output.clone())
    }
}
