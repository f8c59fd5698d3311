//! Image collection. Resolves each `ImageRef` to bytes through a [Fetcher], dropping failures.

mod client;
mod error;

pub use client::{HttpFetcher, HttpFetcherBuilder, DEFAULT_BACKOFF_SECS, DEFAULT_RETRY_COUNT};
pub use error::FetchError;

use crate::model::{FetchedImage, ImageRef};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};

/// Default number of image fetches in flight.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Network-fetch capability supplied by the host.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url` (absolute) and return the body. Non-success responses are errors.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Options for [collect_images].
pub struct CollectOptions<'a> {
    /// Fetches in flight at once; 1 fetches strictly in sequence.
    pub concurrency: usize,
    /// Called with (completed, total) after each fetch finishes, successful or not.
    pub progress: Option<&'a dyn Fn(usize, usize)>,
}

impl Default for CollectOptions<'_> {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            progress: None,
        }
    }
}

/// Fetch every image, keeping only successes, ordered by `index` regardless of completion order.
pub async fn collect_images(
    fetcher: &dyn Fetcher,
    images: &[ImageRef],
    options: &CollectOptions<'_>,
) -> Vec<FetchedImage> {
    let total = images.len();
    if total == 0 {
        return Vec::new();
    }
    tracing::debug!(total, concurrency = options.concurrency, "fetching images");

    let mut in_flight = stream::iter(images.iter().cloned())
        .map(|image| async move {
            let result = fetcher.fetch(&image.source_url).await;
            (image, result)
        })
        .buffer_unordered(options.concurrency.max(1));

    let mut fetched = Vec::with_capacity(total);
    let mut done = 0;
    while let Some((image, result)) = in_flight.next().await {
        done += 1;
        match result {
            Ok(data) => {
                tracing::debug!(file = %image.filename, bytes = data.len(), "image fetched");
                fetched.push(FetchedImage::new(image, data));
            }
            Err(e) => {
                tracing::warn!(file = %image.filename, error = %e, "image omitted from package");
            }
        }
        if let Some(progress) = options.progress {
            progress(done, total);
        }
    }

    fetched.sort_by_key(|f| f.image.index);
    fetched
}
