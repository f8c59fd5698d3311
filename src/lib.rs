//! scribe: turn a web article into a single-chapter EPUB with its images embedded.

pub mod article;
pub mod cli;
pub mod config;
pub mod convert;
pub mod epub;
pub mod fetch;
pub mod logging;
pub mod model;
pub mod page;

// Re-exports for CLI and consumers.
pub use article::ExtractionError;
pub use convert::{
    convert_page_to_package, extract_article, package_article, suggested_filename, ConvertError,
    ConvertOptions,
};
pub use epub::{assemble, assemble_into, ArchiveWriter, AssemblyError, EpubVersion, ZipArchiveWriter};
pub use fetch::{collect_images, CollectOptions, FetchError, Fetcher, HttpFetcher, HttpFetcherBuilder};
pub use model::{ArticleMetadata, ArticleRecord, BookIdentifier, FetchedImage, ImageRef};
pub use page::{Element, HtmlPage, Node, Page};
