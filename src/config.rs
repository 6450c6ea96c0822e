//! Build configuration.
//!
//! Two layers feed one explicit [`BuildConfig`] value that is assembled once
//! in `main` and handed by reference to every stage. Nothing reads ambient
//! process state after startup.
//!
//! 1. **Site config**: an optional `config.toml` in the source directory,
//!    deserialized into [`SiteConfig`].
//! 2. **CLI flags**: directories are always taken from the command line, and
//!    `--workers` overrides `processing.workers`.
//!
//! ## Config File Location
//!
//! ```text
//! content/
//! ├── config.toml              # Optional, sits next to the articles
//! ├── hello.my-first-post.md
//! └── ...
//! ```
//!
//! `config.toml` does not end in `.md`, so discovery never picks it up.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [page]
//! metadata = "placeholder"  # "placeholder" or "filename"
//! title = "title"           # Page title for the placeholder policy
//! created_at = "23/07/23"   # Creation date shown on every page
//!
//! [processing]
//! workers = "auto"          # "auto", "unbounded", or a positive integer
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Name of the optional site config file inside the source directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Multiplier applied to the core count for [`Concurrency::Auto`].
/// Rendering is dominated by file I/O, so a few jobs per core keep it busy.
const AUTO_WORKERS_PER_CORE: usize = 2;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Presentation metadata merged into every page.
    pub page: PageConfig,
    /// Render worker settings.
    pub processing: ProcessingConfig,
}

impl SiteConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page.metadata == MetadataPolicy::Placeholder && self.page.title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "page.title must not be empty when page.metadata = \"placeholder\"".into(),
            ));
        }
        Ok(())
    }
}

/// Where a page's title comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataPolicy {
    /// Use `page.title` for every article.
    #[default]
    Placeholder,
    /// Use the title component of the file name, dashes as spaces.
    Filename,
}

/// Presentation metadata settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageConfig {
    pub metadata: MetadataPolicy,
    pub title: String,
    pub created_at: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            metadata: MetadataPolicy::Placeholder,
            title: "title".to_string(),
            created_at: "23/07/23".to_string(),
        }
    }
}

/// Render worker settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of articles rendered at once.
    pub workers: Concurrency,
}

/// How many render jobs may be in flight at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WorkersValue", into = "WorkersValue")]
pub enum Concurrency {
    /// A bounded pool sized from the available cores.
    #[default]
    Auto,
    /// One task per job with no cap.
    Unbounded,
    /// At most `n` jobs at once. `1` renders serially.
    Limited(NonZeroUsize),
}

impl Concurrency {
    /// Resolve to a concrete cap. `None` means unbounded.
    ///
    /// - `Auto` → available cores × 2
    /// - `Limited(n)` → `n`, not clamped: jobs wait on I/O, not CPU
    pub fn limit(self) -> Option<NonZeroUsize> {
        match self {
            Concurrency::Auto => {
                let cores = std::thread::available_parallelism()
                    .map(NonZeroUsize::get)
                    .unwrap_or(1);
                NonZeroUsize::new(cores * AUTO_WORKERS_PER_CORE)
            }
            Concurrency::Unbounded => None,
            Concurrency::Limited(n) => Some(n),
        }
    }
}

impl fmt::Display for Concurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Concurrency::Auto => f.write_str("auto"),
            Concurrency::Unbounded => f.write_str("unbounded"),
            Concurrency::Limited(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for Concurrency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "auto" => Ok(Concurrency::Auto),
            "unbounded" => Ok(Concurrency::Unbounded),
            other => other
                .parse::<usize>()
                .ok()
                .and_then(NonZeroUsize::new)
                .map(Concurrency::Limited)
                .ok_or_else(|| {
                    format!("invalid worker count {other:?}: expected \"auto\", \"unbounded\", or a positive integer")
                }),
        }
    }
}

/// Wire form of [`Concurrency`] in TOML: a bare integer or a keyword string.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum WorkersValue {
    Count(usize),
    Keyword(String),
}

impl TryFrom<WorkersValue> for Concurrency {
    type Error = String;

    fn try_from(value: WorkersValue) -> Result<Self, Self::Error> {
        match value {
            WorkersValue::Count(n) => NonZeroUsize::new(n)
                .map(Concurrency::Limited)
                .ok_or_else(|| "processing.workers must be at least 1".to_string()),
            WorkersValue::Keyword(s) => s.parse(),
        }
    }
}

impl From<Concurrency> for WorkersValue {
    fn from(value: Concurrency) -> Self {
        match value {
            Concurrency::Limited(n) => WorkersValue::Count(n.get()),
            other => WorkersValue::Keyword(other.to_string()),
        }
    }
}

/// Load config from `config.toml` in the given directory.
///
/// Returns stock defaults when the file does not exist. Rejects unknown keys
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let config_path = root.join(CONFIG_FILE_NAME);
    if !config_path.is_file() {
        return Ok(SiteConfig::default());
    }
    let content = fs::read_to_string(&config_path)?;
    let config: SiteConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Everything one build run needs, resolved up front.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Directory scanned for `*.md` articles.
    pub source_dir: PathBuf,
    /// Root under which `<slug>/index.html` files are written.
    pub output_dir: PathBuf,
    /// Directory holding `article.html`.
    pub template_dir: PathBuf,
    pub page: PageConfig,
    pub concurrency: Concurrency,
    /// Treat any failed article as a failed run.
    pub strict: bool,
}

impl BuildConfig {
    /// A config with stock page and processing settings.
    pub fn new(
        source_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        template_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            template_dir: template_dir.into(),
            page: PageConfig::default(),
            concurrency: Concurrency::default(),
            strict: false,
        }
    }

    /// Apply settings from a loaded `config.toml`.
    pub fn with_site_config(mut self, site: SiteConfig) -> Self {
        self.page = site.page;
        self.concurrency = site.processing.workers;
        self
    }

    pub fn with_concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `--gen-config` CLI flag.
pub fn stock_config_toml() -> &'static str {
    r##"# slugpress configuration
# =======================
# Place this file as config.toml in the source directory.
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Page metadata
# ---------------------------------------------------------------------------
[page]
# Where each page's title comes from:
#   "placeholder" - use `title` below for every article
#   "filename"    - use the title part of <title>.<slug>.md, dashes as spaces
metadata = "placeholder"

# Title used by the placeholder policy.
title = "title"

# Creation date string passed to the template as `created_at`.
created_at = "23/07/23"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum number of articles rendered at once:
#   "auto"      - twice the number of CPU cores
#   "unbounded" - one task per article, no cap
#   N           - at most N at once (1 = serial)
workers = "auto"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_page_is_placeholder() {
        let config = SiteConfig::default();
        assert_eq!(config.page.metadata, MetadataPolicy::Placeholder);
        assert_eq!(config.page.title, "title");
        assert_eq!(config.page.created_at, "23/07/23");
    }

    #[test]
    fn default_workers_is_auto() {
        assert_eq!(SiteConfig::default().processing.workers, Concurrency::Auto);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[page]
created_at = "2024-01-01"
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.page.created_at, "2024-01-01");
        // Defaults preserved
        assert_eq!(config.page.title, "title");
        assert_eq!(config.processing.workers, Concurrency::Auto);
    }

    #[test]
    fn parse_filename_policy() {
        let config: SiteConfig = toml::from_str("[page]\nmetadata = \"filename\"\n").unwrap();
        assert_eq!(config.page.metadata, MetadataPolicy::Filename);
    }

    #[test]
    fn parse_workers_integer() {
        let config: SiteConfig = toml::from_str("[processing]\nworkers = 4\n").unwrap();
        assert_eq!(
            config.processing.workers,
            Concurrency::Limited(NonZeroUsize::new(4).unwrap())
        );
    }

    #[test]
    fn parse_workers_keywords() {
        let config: SiteConfig = toml::from_str("[processing]\nworkers = \"unbounded\"\n").unwrap();
        assert_eq!(config.processing.workers, Concurrency::Unbounded);

        let config: SiteConfig = toml::from_str("[processing]\nworkers = \"auto\"\n").unwrap();
        assert_eq!(config.processing.workers, Concurrency::Auto);
    }

    #[test]
    fn workers_zero_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[processing]\nworkers = 0\n");
        assert!(result.is_err());
    }

    #[test]
    fn workers_unknown_keyword_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[processing]\nworkers = \"lots\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_key_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[page]\ntitel = \"x\"\n");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[pages]\ntitle = \"x\"\n");
        assert!(result.is_err());
    }

    // =========================================================================
    // Concurrency
    // =========================================================================

    #[test]
    fn concurrency_from_str() {
        assert_eq!("auto".parse::<Concurrency>().unwrap(), Concurrency::Auto);
        assert_eq!(
            "unbounded".parse::<Concurrency>().unwrap(),
            Concurrency::Unbounded
        );
        assert_eq!(
            "3".parse::<Concurrency>().unwrap(),
            Concurrency::Limited(NonZeroUsize::new(3).unwrap())
        );
        assert!("0".parse::<Concurrency>().is_err());
        assert!("-1".parse::<Concurrency>().is_err());
        assert!("many".parse::<Concurrency>().is_err());
    }

    #[test]
    fn concurrency_display_roundtrips() {
        for c in [
            Concurrency::Auto,
            Concurrency::Unbounded,
            Concurrency::Limited(NonZeroUsize::new(7).unwrap()),
        ] {
            assert_eq!(c.to_string().parse::<Concurrency>().unwrap(), c);
        }
    }

    #[test]
    fn limit_auto_scales_with_cores() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(
            Concurrency::Auto.limit().map(NonZeroUsize::get),
            Some(cores * AUTO_WORKERS_PER_CORE)
        );
    }

    #[test]
    fn limit_unbounded_is_none() {
        assert_eq!(Concurrency::Unbounded.limit(), None);
    }

    #[test]
    fn limit_user_value_not_clamped() {
        let n = NonZeroUsize::new(10_000).unwrap();
        assert_eq!(Concurrency::Limited(n).limit(), Some(n));
    }

    // =========================================================================
    // load_config
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(load_config(tmp.path()).unwrap(), SiteConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            "[page]\ntitle = \"My Blog\"\n\n[processing]\nworkers = 1\n",
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.page.title, "My Blog");
        assert_eq!(
            config.processing.workers,
            Concurrency::Limited(NonZeroUsize::MIN)
        );
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE_NAME), "this is not valid toml [[[").unwrap();

        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE_NAME), "[page]\ntitle = \"  \"\n").unwrap();

        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn empty_title_allowed_with_filename_policy() {
        let mut config = SiteConfig::default();
        config.page.metadata = MetadataPolicy::Filename;
        config.page.title = String::new();
        assert!(config.validate().is_ok());
    }

    // =========================================================================
    // BuildConfig
    // =========================================================================

    #[test]
    fn build_config_takes_site_settings() {
        let mut site = SiteConfig::default();
        site.page.title = "Blog".into();
        site.processing.workers = Concurrency::Unbounded;

        let config = BuildConfig::new("src", "out", "tpl").with_site_config(site);
        assert_eq!(config.page.title, "Blog");
        assert_eq!(config.concurrency, Concurrency::Unbounded);
        assert!(!config.strict);
    }

    #[test]
    fn cli_concurrency_overrides_site() {
        let mut site = SiteConfig::default();
        site.processing.workers = Concurrency::Unbounded;

        let config = BuildConfig::new("src", "out", "tpl")
            .with_site_config(site)
            .with_concurrency(Concurrency::Limited(NonZeroUsize::MIN));
        assert_eq!(config.concurrency, Concurrency::Limited(NonZeroUsize::MIN));
    }

    // =========================================================================
    // Stock config
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn default_config_serializes() {
        let value = toml::Value::try_from(SiteConfig::default()).unwrap();
        let back: SiteConfig = value.try_into().unwrap();
        assert_eq!(back, SiteConfig::default());
    }
}
