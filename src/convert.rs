//! Conversion pipeline: page → article record → fetched images → EPUB bytes.
//!
//! Split in two so the page (which may not be `Send`) is only touched by the synchronous half.

use crate::article::{self, ExtractionError};
use crate::epub::{self, AssemblyError, EpubVersion};
use crate::fetch::{collect_images, CollectOptions, Fetcher, DEFAULT_CONCURRENCY};
use crate::model::{ArticleRecord, BookIdentifier};
use crate::page::Page;
use thiserror::Error;

const MAX_FILENAME_CHARS: usize = 200;
const EPUB_EXTENSION: &str = ".epub";

/// Options for one conversion.
pub struct ConvertOptions<'a> {
    pub version: EpubVersion,
    /// Image fetches in flight at once.
    pub concurrency: usize,
    /// Called with (completed, total) as images finish downloading.
    pub progress: Option<&'a dyn Fn(usize, usize)>,
}

impl Default for ConvertOptions<'_> {
    fn default() -> Self {
        Self {
            version: EpubVersion::default(),
            concurrency: DEFAULT_CONCURRENCY,
            progress: None,
        }
    }
}

/// The single failure surfaced by [convert_page_to_package]. No partial package accompanies it.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}

/// Metadata, body location, sanitizing and serialization. Touches no network.
pub fn extract_article(page: &dyn Page) -> Result<ArticleRecord, ExtractionError> {
    let metadata = article::extract_metadata(page);
    let body = article::locate_article_body(page)?;
    let clean = article::sanitize(&body, page.url());
    let serialized = article::serialize(&clean);
    tracing::debug!(
        title = %metadata.title,
        markup_len = serialized.markup.len(),
        images = serialized.images.len(),
        "article extracted"
    );
    Ok(ArticleRecord::new(metadata, serialized.markup, serialized.images))
}

/// Fetch the article's images and assemble the package under a fresh identifier.
pub async fn package_article(
    article: ArticleRecord,
    fetcher: &dyn Fetcher,
    options: &ConvertOptions<'_>,
) -> Result<Vec<u8>, AssemblyError> {
    let collect = CollectOptions {
        concurrency: options.concurrency,
        progress: options.progress,
    };
    let images = collect_images(fetcher, &article.images, &collect).await;
    if images.len() < article.images.len() {
        tracing::warn!(
            fetched = images.len(),
            referenced = article.images.len(),
            "some images could not be fetched"
        );
    }
    epub::assemble(article, images, BookIdentifier::new(), options.version).await
}

/// Convert one article page into a complete EPUB package.
pub async fn convert_page_to_package(
    page: &dyn Page,
    fetcher: &dyn Fetcher,
    options: &ConvertOptions<'_>,
) -> Result<Vec<u8>, ConvertError> {
    let article = extract_article(page)?;
    Ok(package_article(article, fetcher, options).await?)
}

/// Filesystem-safe `.epub` filename for an article title.
pub fn suggested_filename(title: &str) -> String {
    let replaced: String = title
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c => c,
        })
        .collect();
    let mut stem = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
    if stem.to_ascii_lowercase().ends_with(EPUB_EXTENSION) {
        stem.truncate(stem.len() - EPUB_EXTENSION.len());
    }
    let truncated: String = stem.chars().take(MAX_FILENAME_CHARS).collect();
    let mut name = truncated.trim_end().to_string();
    if name.is_empty() {
        name = "article".to_string();
    }
    name.push_str(EPUB_EXTENSION);
    name
}
