//! Article discovery.
//!
//! First stage of the build pipeline. Lists the source directory once
//! (non-recursive) and sends every eligible article path down a conduit.
//!
//! ## Eligibility
//!
//! An entry is an article candidate when its file name ends with the literal
//! suffix `.md` and it is not a directory. Everything else is skipped without
//! a log line at the default level, except a directory carrying the `.md`
//! suffix, which is skipped with a warning:
//!
//! ```text
//! content/
//! ├── a.post-one.md     → sent
//! ├── not-valid.md      → sent (rejected later by the naming rule)
//! ├── readme.txt        → skipped
//! ├── drafts/           → skipped (no recursion)
//! └── archive.old.md/   → skipped with a warning
//! ```
//!
//! ## Ordering
//!
//! Entries are sent in lexical order of their file names. Downstream stages
//! do not rely on it, but it keeps logs stable between runs.
//!
//! ## Failure
//!
//! A directory that cannot be listed produces exactly one
//! [`DiscoveryError::ReadDir`] and nothing else. Either way the sender is
//! dropped when [`discover`] returns, which closes the conduit.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::SyncSender;
use thiserror::Error;

/// Suffix an entry name must end with to be considered an article.
pub const ARTICLE_SUFFIX: &str = ".md";

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("failed to read source directory {}: {source}", path.display())]
    ReadDir { path: PathBuf, source: io::Error },
    #[error("failed to read entry in {}: {source}", path.display())]
    Entry { path: PathBuf, source: io::Error },
}

/// One item of the discovery stream: an article path or a discovery failure.
pub type DiscoveredPath = Result<PathBuf, DiscoveryError>;

/// List `dir` and send each article path to `sender`.
///
/// Returns early, without error, if the receiving side hangs up.
pub fn discover(dir: &Path, sender: SyncSender<DiscoveredPath>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(source) => {
            let _ = sender.send(Err(DiscoveryError::ReadDir {
                path: dir.to_path_buf(),
                source,
            }));
            return;
        }
    };

    let mut names = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => {
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                names.push((entry.file_name(), is_dir));
            }
            Err(source) => {
                let err = DiscoveryError::Entry {
                    path: dir.to_path_buf(),
                    source,
                };
                if sender.send(Err(err)).is_err() {
                    return;
                }
            }
        }
    }
    names.sort();

    for (name, is_dir) in names {
        let name_str = name.to_string_lossy();
        if !name_str.ends_with(ARTICLE_SUFFIX) {
            tracing::debug!(entry = %name_str, "skipping non-article entry");
            continue;
        }
        if is_dir {
            tracing::warn!(entry = %name_str, "skipping directory with article suffix");
            continue;
        }
        if sender.send(Ok(dir.join(&name))).is_err() {
            return;
        }
    }
}
