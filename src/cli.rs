//! CLI parsing and orchestration. Loads the page, extracts the article, fetches images, writes the
//! EPUB. Maps errors to exit codes.

use crate::article::ExtractionError;
use crate::config;
use crate::convert::{extract_article, package_article, suggested_filename, ConvertOptions};
use crate::epub::{AssemblyError, EpubVersion};
use crate::fetch::{
    FetchError, Fetcher, HttpFetcher, DEFAULT_BACKOFF_SECS, DEFAULT_CONCURRENCY,
    DEFAULT_RETRY_COUNT,
};
use crate::page::HtmlPage;
use clap::Parser;
use reqwest::Url;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// CLI error carrying exit code and message.
#[derive(Debug, Error)]
pub enum CliRunError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Could not load page: {0}")]
    PageFetch(#[from] FetchError),

    #[error("{0}")]
    Extraction(#[from] ExtractionError),

    #[error("{0}")]
    Assembly(#[from] AssemblyError),

    #[error("Cannot write output: {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Validation(String),
}

impl CliRunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliRunError::InvalidInput(_) => 1,
            CliRunError::PageFetch(_) | CliRunError::Extraction(_) => 2,
            CliRunError::Assembly(_) | CliRunError::Write { .. } | CliRunError::Validation(_) => 3,
        }
    }
}

/// Run epubcheck on the given EPUB path. Requires epubcheck on PATH.
fn validate_epub(path: &Path) -> Result<(), CliRunError> {
    let output = std::process::Command::new("epubcheck")
        .arg(path)
        .output()
        .map_err(|e| {
            CliRunError::Validation(format!(
                "Could not run epubcheck: {}. Is epubcheck installed and on PATH?",
                e
            ))
        })?;
    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let msg = if stderr.is_empty() { stdout } else { stderr };
        Err(CliRunError::Validation(format!(
            "epubcheck reported errors:\n{}",
            msg.trim()
        )))
    }
}

#[derive(Parser, Debug)]
#[command(name = "scribe")]
#[command(about = "Convert a web article into a single-chapter EPUB with its images embedded")]
#[command(
    after_help = "Config file keys (output_dir, user_agent, timeout_secs, retry_count, retry_backoff_secs, concurrency, epub_version) are read from ./scribe.toml or ~/.config/scribe/config.toml. CLI flags override config."
)]
pub struct Args {
    /// Article URL (http or https), or path to a saved HTML page.
    pub input: String,

    /// Output path. Default: {output_dir}/{sanitized-title}.epub
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Page address used to resolve relative links when INPUT is a file. Default: the file's own file:// URL.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Generate EPUB 3 instead of EPUB 2.
    #[arg(long)]
    pub epub_3: bool,

    /// Image downloads in flight at once (overrides config; default 4).
    #[arg(long, value_parser = parse_concurrency)]
    pub concurrency: Option<usize>,

    /// HTTP User-Agent (overrides config).
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Request timeout in seconds (overrides config; default 30).
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Extract the article and print it as JSON without fetching images or writing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// After writing, run epubcheck to validate the package (epubcheck must be on PATH).
    #[arg(long)]
    pub validate: bool,

    /// Suppress progress output (errors only).
    #[arg(short, long)]
    pub quiet: bool,

    /// Debug logging and full error chain.
    #[arg(long)]
    pub verbose: bool,
}

fn parse_concurrency(s: &str) -> Result<usize, String> {
    let n: usize = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid --concurrency: '{}' is not a number", s))?;
    if n == 0 {
        return Err("Invalid --concurrency: must be at least 1".to_string());
    }
    Ok(n)
}

/// Where the page comes from.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Url(Url),
    File(PathBuf),
}

/// http(s) URLs are fetched; anything else is a local path.
fn classify_input(input: &str) -> Input {
    match Url::parse(input) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Input::Url(url),
        _ => Input::File(PathBuf::from(input)),
    }
}

/// Fetch or read the page and parse it under the address links should resolve against.
async fn load_page(
    input: &str,
    base_url: Option<&str>,
    fetcher: &dyn Fetcher,
) -> Result<HtmlPage, CliRunError> {
    let base_override = base_url
        .map(|b| {
            Url::parse(b).map_err(|e| {
                CliRunError::InvalidInput(format!("Invalid --base-url '{}': {}", b, e))
            })
        })
        .transpose()?;

    match classify_input(input) {
        Input::Url(url) => {
            tracing::debug!(%url, "fetching page");
            let body = fetcher.fetch(url.as_str()).await?;
            let address = base_override.unwrap_or(url);
            Ok(HtmlPage::parse(address.as_str(), &String::from_utf8_lossy(&body)))
        }
        Input::File(path) => {
            let html = std::fs::read_to_string(&path).map_err(|e| {
                CliRunError::InvalidInput(format!("Cannot read {}: {}", path.display(), e))
            })?;
            let address = match base_override {
                Some(url) => url,
                None => file_url(&path)?,
            };
            tracing::debug!(path = %path.display(), %address, "page read from file");
            Ok(HtmlPage::parse(address.as_str(), &html))
        }
    }
}

fn file_url(path: &Path) -> Result<Url, CliRunError> {
    let absolute = std::fs::canonicalize(path).map_err(|e| {
        CliRunError::InvalidInput(format!("Cannot resolve {}: {}", path.display(), e))
    })?;
    Url::from_file_path(&absolute).map_err(|()| {
        CliRunError::InvalidInput(format!(
            "Cannot use {} as a page address; pass --base-url",
            absolute.display()
        ))
    })
}

/// Ensure output path parent exists.
fn validate_output_path(path: &Path) -> Result<(), CliRunError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(CliRunError::InvalidInput(format!(
                "Cannot write output: {}: parent directory does not exist.",
                path.display()
            )));
        }
    }
    Ok(())
}

fn default_output_path(output_dir: &Path, title: &str) -> PathBuf {
    output_dir.join(suggested_filename(title))
}

/// Entry point for the CLI. Returns Ok(()) on success; Err with exit code and message on failure.
pub async fn run(args: &Args) -> Result<(), CliRunError> {
    let config = config::load_config()
        .map_err(CliRunError::InvalidInput)?
        .unwrap_or_default();

    let version = if args.epub_3 {
        EpubVersion::Epub3
    } else {
        config
            .epub_version()
            .map_err(CliRunError::InvalidInput)?
            .unwrap_or_default()
    };
    let concurrency = args
        .concurrency
        .or(config.concurrency)
        .unwrap_or(DEFAULT_CONCURRENCY);
    if concurrency == 0 {
        return Err(CliRunError::InvalidInput(
            "Invalid concurrency in config: must be at least 1".to_string(),
        ));
    }
    let output_dir = config
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));

    let timeout_secs = args
        .timeout
        .or(config.timeout_secs)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    let retry_count = config.retry_count.unwrap_or(DEFAULT_RETRY_COUNT).max(1);
    let retry_backoff_secs = config
        .retry_backoff_secs
        .clone()
        .unwrap_or_else(|| DEFAULT_BACKOFF_SECS.to_vec());
    let user_agent = args.user_agent.clone().or_else(|| config.user_agent.clone());

    let mut builder = HttpFetcher::builder()
        .timeout_secs(timeout_secs)
        .retry_count(retry_count)
        .retry_backoff_secs(retry_backoff_secs);
    if let Some(ua) = user_agent {
        builder = builder.user_agent(ua);
    }
    let fetcher = builder
        .build()
        .map_err(|e| CliRunError::InvalidInput(format!("Failed to create HTTP client: {}", e)))?;

    let article = {
        let page = load_page(&args.input, args.base_url.as_deref(), &fetcher).await?;
        extract_article(&page)?
    };

    let output_path = match &args.output {
        Some(p) => p.clone(),
        None => default_output_path(&output_dir, &article.title),
    };

    if args.dry_run {
        let stdout = std::io::stdout();
        serde_json::to_writer_pretty(stdout.lock(), &article).map_err(|e| CliRunError::Write {
            path: PathBuf::from("-"),
            source: e.into(),
        })?;
        println!();
        eprintln!("Images: {}", article.images.len());
        eprintln!("Output: {}", output_path.display());
        return Ok(());
    }

    validate_output_path(&output_path)?;

    let progress_state: RefCell<Option<indicatif::ProgressBar>> = RefCell::new(None);
    let progress_cb = |n: usize, total: usize| {
        if total == 0 {
            return;
        }
        let mut state = progress_state.borrow_mut();
        let pb = state.get_or_insert_with(|| {
            let bar = indicatif::ProgressBar::new(total as u64);
            if let Ok(style) = indicatif::ProgressStyle::default_bar()
                .template("{spinner} {msg} [{bar:40}] {pos}/{len} ({elapsed})")
            {
                bar.set_style(
                    style
                        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                        .progress_chars("█▉▊▋▌▍▎▏ "),
                );
            }
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        });
        pb.set_position(n as u64);
        pb.set_message(format!("Fetching image {}/{}", n, total));
    };
    let progress: Option<&dyn Fn(usize, usize)> = if args.quiet { None } else { Some(&progress_cb) };
    let options = ConvertOptions {
        version,
        concurrency,
        progress,
    };

    let bytes = package_article(article, &fetcher, &options).await?;

    if let Some(pb) = progress_state.borrow_mut().take() {
        pb.disable_steady_tick();
        pb.finish_and_clear();
    }

    std::fs::write(&output_path, &bytes).map_err(|e| CliRunError::Write {
        path: output_path.clone(),
        source: e,
    })?;

    if args.validate {
        validate_epub(&output_path)?;
    }

    if !args.quiet {
        eprintln!("Wrote {}", output_path.display());
    }
    Ok(())
}
