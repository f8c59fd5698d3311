//! Per-request fetch errors. Recoverable for images: the collector logs them and moves on.

use thiserror::Error;

/// Why a single URL could not be retrieved.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: could not reach {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("HTTP {status} when fetching: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Failed to read response body from {url}: {source}")]
    BodyRead { url: String, source: reqwest::Error },

    #[error("Malformed data URL: {reason}")]
    DataUrl { reason: String },

    #[error("Cannot read local file {url}: {source}")]
    File { url: String, source: std::io::Error },
}
