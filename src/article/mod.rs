//! Article extraction: metadata heuristics, body location, sanitizing and XHTML serialization.

pub mod metadata;
pub mod sanitize;
pub mod serialize;

pub use metadata::extract_metadata;
pub use sanitize::sanitize;
pub use serialize::{serialize, Serialized};

use crate::page::{Element, Page};
use thiserror::Error;

/// Article body containers, most specific first. The first selector with a match wins.
pub const BODY_SELECTORS: [&str; 6] = [
    // Substack and similar
    "div.body.markup",
    // LessWrong
    "div#postBody",
    "div.postBody",
    r#"article[role="main"]"#,
    "main article",
    r#"[itemprop="articleBody"]"#,
];

/// Fatal extraction errors. Raised before any network or archive work.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Could not find article content at {url}. This page does not contain a supported article structure.")]
    NoArticleBody { url: String },
}

/// Find the article body via [BODY_SELECTORS]. Returns a detached copy.
pub fn locate_article_body(page: &dyn Page) -> Result<Element, ExtractionError> {
    for selector in BODY_SELECTORS {
        if let Some(body) = page.select_first(selector) {
            tracing::debug!(selector, "article body located");
            return Ok(body);
        }
    }
    Err(ExtractionError::NoArticleBody {
        url: page.url().to_string(),
    })
}
