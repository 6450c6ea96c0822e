//! Centralized filename parsing for the `<title>.<slug>.<ext>` convention.
//!
//! Every article file carries its output location in its name. The name is
//! split on `.` and must produce exactly three components:
//!
//! ```text
//! hello.my-first-post.md
//! ^^^^^ ^^^^^^^^^^^^^ ^^
//! title      slug      extension
//! ```
//!
//! The slug becomes the article's directory under the output root, and the
//! page is always written as `index.html` inside it:
//!
//! - `hello.my-first-post.md` → `<out>/my-first-post/index.html`
//! - `not-valid.md` → rejected (two components)
//! - `a.b.c.md` → rejected (four components)
//!
//! ## Display Titles
//!
//! Dashes in the title component are converted to spaces for display, the
//! same way for every article: `Hello-World.intro.md` → "Hello World".

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fixed file name written inside each slug directory.
pub const OUTPUT_FILE_NAME: &str = "index.html";

#[derive(Error, Debug, Clone, PartialEq)]
#[error("wrong filename format for file {name}: expected <title>.<slug>.<ext>, found {components} component(s)")]
pub struct FormatError {
    pub name: String,
    pub components: usize,
}

/// Result of parsing an article file name like `hello.my-first-post.md`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleName {
    /// First component, dashes preserved.
    pub title: String,
    /// Middle component, used as the output directory name.
    pub slug: String,
    /// Last component, without the dot.
    pub extension: String,
}

impl ArticleName {
    /// Title component with dashes converted to spaces.
    pub fn display_title(&self) -> String {
        self.title.replace('-', " ")
    }
}

/// Parse a bare file name (no directory part) into its three components.
///
/// Empty components are kept as they come out of the split, so `a..md`
/// parses with an empty slug. Only the component count is enforced.
pub fn parse_article_name(name: &str) -> Result<ArticleName, FormatError> {
    let chunks: Vec<&str> = name.split('.').collect();
    match chunks.as_slice() {
        [title, slug, extension] => Ok(ArticleName {
            title: (*title).to_string(),
            slug: (*slug).to_string(),
            extension: (*extension).to_string(),
        }),
        _ => Err(FormatError {
            name: name.to_string(),
            components: chunks.len(),
        }),
    }
}

/// Output path for a slug under the output root.
pub fn output_path(output_root: &Path, slug: &str) -> PathBuf {
    output_root.join(slug).join(OUTPUT_FILE_NAME)
}
