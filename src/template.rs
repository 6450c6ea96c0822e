//! Page template loading and rendering.
//!
//! Every article is merged into one shared template, `article.html`, read
//! from the template directory at startup. The template uses
//! [Tera](https://keats.github.io/tera/) syntax and sees three variables:
//!
//! | Variable | Content |
//! |----------|---------|
//! | `title` | Page title (escaped on output) |
//! | `created_at` | Creation date string (escaped on output) |
//! | `content` | Rendered article HTML; embed with `{{ content \| safe }}` |
//!
//! ```html
//! <!DOCTYPE html>
//! <html>
//!   <head><title>{{ title }}</title></head>
//!   <body>
//!     <time>{{ created_at }}</time>
//!     <article>{{ content | safe }}</article>
//!   </body>
//! </html>
//! ```
//!
//! Loading happens once and is fatal on failure: a missing or unparsable
//! template aborts the run before any article is touched. Rendering errors
//! afterwards are per-article.
//!
//! A loaded [`PageTemplate`] is immutable and shared by reference across all
//! render tasks.

use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tera::{Context, Tera};
use thiserror::Error;

/// File name of the page template inside the template directory.
pub const TEMPLATE_FILE_NAME: &str = "article.html";

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("failed to read template {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse template {}: {source}", path.display())]
    Parse { path: PathBuf, source: tera::Error },
}

/// The record merged into the template for each article.
#[derive(Debug, Clone, Serialize)]
pub struct PageContext<'a> {
    pub title: &'a str,
    pub created_at: &'a str,
    /// Trusted HTML fragment.
    pub content: &'a str,
}

/// A parsed page template, ready to render any number of pages.
#[derive(Debug)]
pub struct PageTemplate {
    tera: Tera,
    path: PathBuf,
}

impl PageTemplate {
    /// Load `article.html` from `template_dir`.
    pub fn load(template_dir: &Path) -> Result<Self, TemplateError> {
        let path = template_dir.join(TEMPLATE_FILE_NAME);
        let source = std::fs::read_to_string(&path).map_err(|source| TemplateError::Io {
            path: path.clone(),
            source,
        })?;
        Self::from_source(&source, path)
    }

    /// Parse template source directly. `path` is only used for messages.
    pub fn from_source(source: &str, path: PathBuf) -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_FILE_NAME, source)
            .map_err(|source| TemplateError::Parse {
                path: path.clone(),
                source,
            })?;
        Ok(Self { tera, path })
    }

    /// Path the template was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Merge `page` into the template, writing the result to `dst`.
    pub fn render_to(&self, page: &PageContext<'_>, dst: impl Write) -> Result<(), tera::Error> {
        let context = Context::from_serialize(page)?;
        self.tera.render_to(TEMPLATE_FILE_NAME, &context, dst)
    }
}
