//! Async HTTP fetcher with a browser-like User-Agent, timeout, and retries for transient failures.
//! `data:` and `file:` URLs are resolved locally.

use super::{FetchError, Fetcher};
use async_trait::async_trait;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use percent_encoding::percent_decode_str;
use reqwest::{StatusCode, Url};
use std::time::Duration;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; scribe/0.1; +https://github.com/scribe-epub/scribe)";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_REDIRECTS: usize = 10;

/// Default number of attempts per URL (initial plus retries).
pub const DEFAULT_RETRY_COUNT: u32 = 3;
/// Default backoff in seconds after each failed attempt.
pub const DEFAULT_BACKOFF_SECS: [u64; 2] = [1, 2];
/// Backoff for HTTP 429: give the server longer to recover.
const BACKOFF_429_SECS: [u64; 3] = [5, 10, 20];

/// Inline images often omit base64 padding.
const DATA_URL_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// reqwest-backed [Fetcher]. Cheap to share by reference across concurrent fetches.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    inner: reqwest::Client,
    retry_count: u32,
    backoff_secs: Vec<u64>,
}

impl HttpFetcher {
    /// Build a fetcher with default User-Agent, timeout and retries.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::builder().build()
    }

    pub fn builder() -> HttpFetcherBuilder {
        HttpFetcherBuilder::default()
    }

    /// GET with retries.
    ///
    /// Retries on timeout, connection errors, HTTP 5xx and HTTP 429. Anything else (including
    /// other 4xx) is returned immediately. The final attempt's outcome is returned as-is.
    pub async fn get_with_retry(&self, url: &str) -> Result<reqwest::Response, reqwest::Error> {
        let mut attempt: u32 = 0;
        loop {
            let last_attempt = attempt + 1 >= self.retry_count;
            let rate_limited = match self.inner.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    let rate_limited = status == StatusCode::TOO_MANY_REQUESTS;
                    if !(status.is_server_error() || rate_limited) || last_attempt {
                        return Ok(response);
                    }
                    tracing::debug!(url, status = status.as_u16(), attempt, "retrying after HTTP error");
                    rate_limited
                }
                Err(e) => {
                    if !(e.is_timeout() || e.is_connect()) || last_attempt {
                        return Err(e);
                    }
                    tracing::debug!(url, error = %e, attempt, "retrying after network error");
                    false
                }
            };
            tokio::time::sleep(self.backoff(attempt, rate_limited)).await;
            attempt += 1;
        }
    }

    fn backoff(&self, attempt: u32, rate_limited: bool) -> Duration {
        let table: &[u64] = if rate_limited {
            &BACKOFF_429_SECS
        } else {
            &self.backoff_secs
        };
        let secs = table
            .get(attempt as usize)
            .or_else(|| table.last())
            .copied()
            .unwrap_or(1);
        Duration::from_secs(secs)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        match Url::parse(url) {
            Ok(parsed) if parsed.scheme() == "data" => decode_data_url(url),
            Ok(parsed) if parsed.scheme() == "file" => read_file_url(&parsed).await,
            _ => self.fetch_http(url).await,
        }
    }
}

impl HttpFetcher {
    async fn fetch_http(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .get_with_retry(url)
            .await
            .map_err(|e| FetchError::Network {
                url: url.to_string(),
                source: e,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let bytes = response.bytes().await.map_err(|e| FetchError::BodyRead {
            url: url.to_string(),
            source: e,
        })?;
        Ok(bytes.to_vec())
    }
}

/// Payload of `data:[<media type>][;base64],<data>`.
fn decode_data_url(url: &str) -> Result<Vec<u8>, FetchError> {
    let rest = url
        .get(5..)
        .filter(|_| url[..5].eq_ignore_ascii_case("data:"))
        .ok_or_else(|| FetchError::DataUrl {
            reason: "missing data: prefix".to_string(),
        })?;
    let (header, payload) = rest.split_once(',').ok_or_else(|| FetchError::DataUrl {
        reason: "missing ',' before payload".to_string(),
    })?;
    let raw: Vec<u8> = percent_decode_str(payload).collect();
    let is_base64 = header
        .rsplit(';')
        .next()
        .is_some_and(|p| p.trim().eq_ignore_ascii_case("base64"));
    if !is_base64 {
        return Ok(raw);
    }
    let compact: Vec<u8> = raw.into_iter().filter(|b| !b.is_ascii_whitespace()).collect();
    DATA_URL_BASE64
        .decode(compact)
        .map_err(|e| FetchError::DataUrl {
            reason: e.to_string(),
        })
}

async fn read_file_url(url: &Url) -> Result<Vec<u8>, FetchError> {
    let path = url.to_file_path().map_err(|()| FetchError::File {
        url: url.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a local path"),
    })?;
    tokio::fs::read(&path).await.map_err(|e| FetchError::File {
        url: url.to_string(),
        source: e,
    })
}

/// Builder for [HttpFetcher] with optional User-Agent, timeout, and retry settings.
#[derive(Debug)]
pub struct HttpFetcherBuilder {
    user_agent: Option<String>,
    timeout_secs: u64,
    retry_count: u32,
    retry_backoff_secs: Vec<u64>,
}

impl Default for HttpFetcherBuilder {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry_count: DEFAULT_RETRY_COUNT,
            retry_backoff_secs: DEFAULT_BACKOFF_SECS.to_vec(),
        }
    }
}

impl HttpFetcherBuilder {
    /// Set a custom User-Agent. If not set, a browser-like default is used.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Per-request timeout in seconds. Default 30.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Attempts per URL, at least 1. Default 3.
    pub fn retry_count(mut self, n: u32) -> Self {
        self.retry_count = n.max(1);
        self
    }

    /// Backoff in seconds before each retry. If shorter than `retry_count - 1`, the last value is reused.
    pub fn retry_backoff_secs(mut self, secs: Vec<u64>) -> Self {
        self.retry_backoff_secs = secs;
        self
    }

    pub fn build(self) -> Result<HttpFetcher, reqwest::Error> {
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let inner = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(user_agent)
            .timeout(Duration::from_secs(self.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        let backoff_secs = if self.retry_backoff_secs.is_empty() {
            // Exponential 1, 2, 4, ... for (retry_count - 1) steps
            let n = self.retry_count.saturating_sub(1) as usize;
            (0..n).map(|i| 1u64 << i.min(4)).collect()
        } else {
            self.retry_backoff_secs
        };
        Ok(HttpFetcher {
            inner,
            retry_count: self.retry_count,
            backoff_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_clamps_retry_count() -> Result<(), reqwest::Error> {
        let fetcher = HttpFetcher::builder().retry_count(0).build()?;
        assert_eq!(fetcher.retry_count, 1);
        Ok(())
    }

    #[test]
    fn empty_backoff_becomes_exponential() -> Result<(), reqwest::Error> {
        let fetcher = HttpFetcher::builder()
            .retry_count(4)
            .retry_backoff_secs(Vec::new())
            .build()?;
        assert_eq!(fetcher.backoff_secs, vec![1, 2, 4]);
        Ok(())
    }

    #[test]
    fn backoff_reuses_last_value() -> Result<(), reqwest::Error> {
        let fetcher = HttpFetcher::builder()
            .retry_backoff_secs(vec![3, 7])
            .build()?;
        assert_eq!(fetcher.backoff(0, false), Duration::from_secs(3));
        assert_eq!(fetcher.backoff(5, false), Duration::from_secs(7));
        assert_eq!(fetcher.backoff(0, true), Duration::from_secs(5));
        assert_eq!(fetcher.backoff(9, true), Duration::from_secs(20));
        Ok(())
    }

    #[tokio::test]
    async fn fetch_decodes_base64_data_url() -> Result<(), Box<dyn std::error::Error>> {
        let fetcher = HttpFetcher::new()?;
        let png = fetcher.fetch("data:image/png;base64,iVBORw0KGgo=").await?;
        assert_eq!(png, b"\x89PNG\r\n\x1a\n".to_vec());
        let unpadded = fetcher.fetch("data:image/png;base64,iVBORw0KGgo").await?;
        assert_eq!(unpadded, png);
        Ok(())
    }

    #[tokio::test]
    async fn fetch_decodes_percent_encoded_data_url() -> Result<(), Box<dyn std::error::Error>> {
        let fetcher = HttpFetcher::new()?;
        let svg = fetcher.fetch("data:image/svg+xml,%3Csvg%3E%3C/svg%3E").await?;
        assert_eq!(svg, b"<svg></svg>".to_vec());
        Ok(())
    }

    #[tokio::test]
    async fn fetch_rejects_malformed_data_url() -> Result<(), reqwest::Error> {
        let fetcher = HttpFetcher::new()?;
        let err = fetcher.fetch("data:image/png;base64").await.err();
        assert!(matches!(err, Some(FetchError::DataUrl { .. })));
        let err = fetcher.fetch("data:image/png;base64,@@@@").await.err();
        assert!(matches!(err, Some(FetchError::DataUrl { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn fetch_reads_file_url() -> Result<(), Box<dyn std::error::Error>> {
        let path = std::env::temp_dir().join(format!("scribe_fetch_{}.png", std::process::id()));
        std::fs::write(&path, b"local bytes")?;
        let url = Url::from_file_path(&path).map_err(|()| "temp path is not absolute")?;
        let fetcher = HttpFetcher::new()?;
        let body = fetcher.fetch(url.as_str()).await;
        std::fs::remove_file(&path).ok();
        assert_eq!(body?, b"local bytes".to_vec());
        Ok(())
    }

    #[tokio::test]
    async fn fetch_missing_file_url_errors() -> Result<(), reqwest::Error> {
        let fetcher = HttpFetcher::new()?;
        let err = fetcher
            .fetch("file:///nonexistent_scribe_dir/missing.png")
            .await
            .err();
        assert!(matches!(err, Some(FetchError::File { .. })));
        Ok(())
    }
}
