//! Optional config file loading. Search order: ./scribe.toml, then
//! $XDG_CONFIG_HOME/scribe/config.toml (or ~/.config/scribe/config.toml).

use crate::epub::EpubVersion;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file contents. All fields optional; only present keys override defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case", default, deny_unknown_fields)]
pub struct Config {
    /// Default output directory when -o is not set. Paths are relative to CWD.
    pub output_dir: Option<PathBuf>,
    /// HTTP User-Agent header.
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Number of HTTP attempts for transient failures (default 3).
    pub retry_count: Option<u32>,
    /// Delay in seconds before each retry (e.g. [1, 2]). Empty means exponential.
    pub retry_backoff_secs: Option<Vec<u64>>,
    /// Image downloads in flight at once (default 4).
    pub concurrency: Option<usize>,
    /// "2" (default) or "3".
    pub epub_version: Option<String>,
}

impl Config {
    /// Parsed `epub_version`, if set. An unrecognised value is an error.
    pub fn epub_version(&self) -> Result<Option<EpubVersion>, String> {
        self.epub_version
            .as_deref()
            .map(|v| v.parse::<EpubVersion>().map_err(|e| e.to_string()))
            .transpose()
    }
}

/// Search order: (1) ./scribe.toml, (2) $XDG_CONFIG_HOME/scribe/config.toml.
/// Missing file returns Ok(None). Invalid TOML or I/O error reading a present file returns Err.
pub fn load_config() -> Result<Option<Config>, String> {
    let cwd = std::env::current_dir()
        .map_err(|e| format!("Cannot determine current directory: {}", e))?;
    let mut paths = vec![cwd.join("scribe.toml")];
    if let Some(d) = dirs::config_dir() {
        paths.push(d.join("scribe").join("config.toml"));
    }
    for path in &paths {
        if path.exists() {
            return load_config_from(path).map(Some);
        }
    }
    Ok(None)
}

/// Read and parse one config file.
pub fn load_config_from(path: &Path) -> Result<Config, String> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| format!("Cannot read config {}: {}", path.display(), e))?;
    let config: Config =
        toml::from_str(&s).map_err(|e| format!("Invalid config {}: {}", path.display(), e))?;
    tracing::debug!(path = %path.display(), "config loaded");
    Ok(config)
}
