use clap::{CommandFactory, Parser};
use slugpress::config::{self, BuildConfig, Concurrency};
use slugpress::{output, pipeline};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "slugpress")]
#[command(about = "Render markdown articles into per-slug HTML pages")]
#[command(long_about = "\
Render markdown articles into per-slug HTML pages

Every <title>.<slug>.md file in the source directory is converted to HTML,
merged into the article.html template, and written to <out>/<slug>/index.html.

Content structure:

  content/
  ├── config.toml                  # Optional settings (see --gen-config)
  ├── hello.first-post.md          # → dist/first-post/index.html
  ├── notes.second-post.md         # → dist/second-post/index.html
  └── not-valid.md                 # Skipped: needs three dot-separated parts

  templates/
  └── article.html                 # Tera template: title, created_at, content

Articles that fail to render are logged and the build carries on. The exit
code stays 0 unless --strict is given.

The directory flags also accept a single dash: -src, -out, -tpl.")]
#[command(version)]
struct Cli {
    /// Directory containing <title>.<slug>.md articles
    #[arg(long, value_name = "DIR", required_unless_present = "gen_config")]
    src: Option<PathBuf>,

    /// Output root; each article is written to <out>/<slug>/index.html
    #[arg(long, value_name = "DIR", required_unless_present = "gen_config")]
    out: Option<PathBuf>,

    /// Directory containing the article.html page template
    #[arg(long, value_name = "DIR", required_unless_present = "gen_config")]
    tpl: Option<PathBuf>,

    /// Articles rendered at once: auto, unbounded, or a positive number
    #[arg(long, value_name = "N")]
    workers: Option<Concurrency>,

    /// Exit with status 1 if any article failed to render
    #[arg(long)]
    strict: bool,

    /// Log every pipeline step
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,

    /// Print a stock config.toml with all options documented
    #[arg(long)]
    gen_config: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse_from(normalize_args(std::env::args_os())) {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version go to stdout with status 0; usage errors exit 1.
            let code = if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            let _ = err.print();
            return code;
        }
    };

    init_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{}", output::error_chain(err.as_ref()));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    if cli.gen_config {
        print!("{}", config::stock_config_toml());
        return Ok(ExitCode::SUCCESS);
    }

    let (Some(src), Some(out), Some(tpl)) = (cli.src, cli.out, cli.tpl) else {
        Cli::command().print_help()?;
        return Ok(ExitCode::FAILURE);
    };

    let site_config = config::load_config(&src)?;
    let mut build_config = BuildConfig::new(src, out, tpl)
        .with_site_config(site_config)
        .with_strict(cli.strict);
    if let Some(workers) = cli.workers {
        build_config = build_config.with_concurrency(workers);
    }

    let report = pipeline::build(&build_config)?;
    output::print_build_output(&report, &build_config.output_dir);

    if report.is_success(build_config.strict) {
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::warn!("strict mode: some articles failed");
        Ok(ExitCode::FAILURE)
    }
}

/// Long flags that may also be spelled with a single dash.
const SINGLE_DASH_FLAGS: [&str; 3] = ["src", "out", "tpl"];

/// Rewrite `-src`, `-out` and `-tpl` (and their `=value` forms) to the
/// double-dash spelling clap expects. Every other argument passes through.
fn normalize_args(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    args.into_iter()
        .map(|arg| {
            let Some(text) = arg.to_str() else {
                return arg;
            };
            let Some(rest) = text.strip_prefix('-') else {
                return arg;
            };
            let name = rest.split_once('=').map_or(rest, |(name, _)| name);
            if SINGLE_DASH_FLAGS.contains(&name) {
                OsString::from(format!("-{text}"))
            } else {
                arg
            }
        })
        .collect()
}

/// Initialise tracing-based logging on stderr.
///
/// Uses `RUST_LOG` if set, otherwise defaults based on verbosity flags.
fn init_logging(verbose: bool, quiet: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if quiet {
        EnvFilter::new("warn")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
