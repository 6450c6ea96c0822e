//! # slugpress
//!
//! Batch static page builder. Point it at a directory of markdown articles
//! and a page template; it writes one HTML page per article into a directory
//! named after the article's slug.
//!
//! ```text
//! content/                          dist/
//! ├── hello.first-post.md     →     ├── first-post/index.html
//! ├── notes.second-post.md    →     ├── second-post/index.html
//! ├── not-valid.md                  │   (skipped: two name components)
//! └── readme.txt                    │   (ignored: not .md)
//! templates/
//! └── article.html                  (shared page template)
//! ```
//!
//! # Architecture: Concurrent Pipeline
//!
//! A build is four stages connected by rendezvous channels:
//!
//! ```text
//! 1. Discover   content/  →  article paths     (one directory listing)
//! 2. Translate  paths     →  render jobs       (<title>.<slug>.md → <out>/<slug>/index.html)
//! 3. Render     jobs      →  render results    (worker pool, one task per job)
//! 4. Consume    results   →  log + report      (caller's thread)
//! ```
//!
//! Each stage closes its output when its input is exhausted, so the result
//! stream ends exactly once, after the last render task has reported. Every
//! job produces exactly one result; a failure in one article never affects
//! another.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`discover`] | Stage 1: non-recursive listing of `*.md` files |
//! | [`naming`] | `<title>.<slug>.<ext>` filename rule and output paths |
//! | [`render`] | Per-job read → markdown → write steps, [`render::ArticleRenderer`] seam |
//! | [`pool`] | Worker pool with a configurable concurrency cap and completion barrier |
//! | [`pipeline`] | Orchestration: wires the stages, builds the [`pipeline::BuildReport`] |
//! | [`markdown`] | Markdown to HTML fragment via pulldown-cmark |
//! | [`template`] | `article.html` loading and rendering via Tera |
//! | [`config`] | `config.toml` loading and the explicit [`config::BuildConfig`] |
//! | [`output`] | CLI summary formatting |
//!
//! # Design Decisions
//!
//! ## Threads, Not an Async Runtime
//!
//! Every suspension point is blocking file I/O or a channel handoff. Plain
//! scoped threads and `std::sync::mpsc::sync_channel(0)` express the pipeline
//! directly, and scoping lets all stages borrow the config and the renderer
//! instead of sharing them through reference counting.
//!
//! ## Bounded by Default
//!
//! One task per article with no cap means one open file per article at
//! peak. The default [`config::Concurrency::Auto`] caps in-flight jobs at
//! twice the core count using a dedicated rayon pool. The unbounded mode is
//! still available for small sites and for tests.
//!
//! ## Runtime Template
//!
//! The page template is a file the site owner edits, so it is parsed at
//! startup with Tera rather than compiled in. A template that fails to load
//! stops the build before any article is read.
//!
//! ## Permissive Exit Code
//!
//! Individual article failures are logged and reported but do not change the
//! exit code unless `--strict` is given.

pub mod config;
pub mod discover;
pub mod markdown;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod pool;
pub mod render;
pub mod template;

#[cfg(test)]
pub(crate) mod test_helpers;
