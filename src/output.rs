//! CLI output formatting for a finished build.
//!
//! Logging reports events as they happen, in completion order. This module
//! prints the inventory afterwards: a stable, sorted summary on stdout that
//! reads the same on every run with the same inputs.
//!
//! # Output Format
//!
//! ```text
//! Rendered
//!     post-one → post-one/index.html
//!     post-two → post-two/index.html
//!
//! Skipped
//!     not-valid.md
//!         wrong filename format for file not-valid.md: expected <title>.<slug>.<ext>, found 2 component(s)
//!
//! Failed
//!     b.blocked.md
//!         failed to create directory dist/blocked: File exists (os error 17)
//!
//! Rendered 2 articles, 1 failed, 1 skipped
//! ```
//!
//! Sections with nothing in them are left out. The totals line is always
//! present.
//!
//! # Architecture
//!
//! [`format_build_output`] returns `Vec<String>` for testability and
//! [`print_build_output`] writes it to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::pipeline::BuildReport;
use std::error::Error;
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Render an error and its causes on one line, separated by `: `.
///
/// A cause whose text already appears in the message above it is left out,
/// since most errors here embed their source in their own message.
pub fn error_chain(err: &dyn Error) -> String {
    let mut line = err.to_string();
    let mut current = err.source();
    while let Some(cause) = current {
        let text = cause.to_string();
        if !line.contains(&text) {
            line.push_str(": ");
            line.push_str(&text);
        }
        current = cause.source();
    }
    line
}

/// Format the build summary.
///
/// Rendered pages are listed as `slug → relative path`, sorted by slug.
/// Skipped and failed articles are listed by file name with the reason
/// indented beneath.
pub fn format_build_output(report: &BuildReport, output_root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    if !report.rendered.is_empty() {
        let mut rendered: Vec<&Path> = report.rendered.iter().map(|p| p.as_path()).collect();
        rendered.sort();

        lines.push("Rendered".to_string());
        for path in rendered {
            let relative = path.strip_prefix(output_root).unwrap_or(path);
            let slug = relative
                .parent()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            lines.push(format!(
                "{}{} \u{2192} {}",
                indent(1),
                slug,
                relative.display()
            ));
        }
    }

    if !report.skipped.is_empty() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push("Skipped".to_string());
        for err in &report.skipped {
            lines.push(format!("{}{}", indent(1), err.name));
            lines.push(format!("{}{}", indent(2), err));
        }
    }

    if !report.failed.is_empty() || !report.discovery_errors.is_empty() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push("Failed".to_string());
        for err in &report.discovery_errors {
            lines.push(format!("{}(source directory)", indent(1)));
            lines.push(format!("{}{}", indent(2), error_chain(err)));
        }
        let mut failed: Vec<_> = report.failed.iter().collect();
        failed.sort_by(|a, b| a.input.cmp(&b.input));
        for article in failed {
            lines.push(format!("{}{}", indent(1), file_name(&article.input)));
            lines.push(format!("{}{}", indent(2), error_chain(&article.error)));
        }
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "Rendered {}, {} failed, {} skipped",
        plural(report.rendered.len(), "article", "articles"),
        report.failed.len(),
        report.skipped.len()
    ));

    lines
}

/// Print the build summary to stdout.
pub fn print_build_output(report: &BuildReport, output_root: &Path) {
    for line in format_build_output(report, output_root) {
        println!("{}", line);
    }
}
