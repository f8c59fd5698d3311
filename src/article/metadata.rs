//! Metadata heuristics: title, author, publish date, source URL. Never fails.

use crate::model::ArticleMetadata;
use crate::page::{Element, Page};

pub const UNTITLED: &str = "Untitled Article";

/// Author selectors, tried in order. The first one whose first match has text wins.
const AUTHOR_SELECTORS: [&str; 6] = [
    // Substack profile links
    r#"a[href*="/profile/"]"#,
    // LessWrong user links
    r#"a[href*="/users/"]"#,
    ".PostsAuthors-author a",
    r#"[class*="author"] a"#,
    r#"meta[name="author"]"#,
    r#"span[itemprop="author"]"#,
];

const DATE_META_SELECTORS: [&str; 3] = [
    r#"meta[property="article:published_time"]"#,
    r#"meta[name="publish_date"]"#,
    r#"meta[itemprop="datePublished"]"#,
];

/// Pull title, author, publish date and source URL from the page.
pub fn extract_metadata(page: &dyn Page) -> ArticleMetadata {
    ArticleMetadata {
        title: extract_title(page),
        author: extract_author(page),
        publish_date: extract_publish_date(page),
        source_url: page.url().to_string(),
    }
}

fn extract_title(page: &dyn Page) -> String {
    page.select_first("title")
        .map(|t| collapse_whitespace(&t.text()))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string())
}

fn extract_author(page: &dyn Page) -> Option<String> {
    AUTHOR_SELECTORS
        .iter()
        .filter_map(|sel| page.select_first(sel))
        .map(|el| content_or_text(&el))
        .find(|s| !s.is_empty())
}

fn extract_publish_date(page: &dyn Page) -> Option<String> {
    let from_time = page.select_first("time").and_then(|time| {
        time.attr("datetime")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .or_else(|| Some(time.text().trim().to_string()).filter(|s| !s.is_empty()))
    });
    from_time.or_else(|| {
        DATE_META_SELECTORS
            .iter()
            .filter_map(|sel| page.select_first(sel))
            .filter_map(|el| el.attr("content").map(|c| c.trim().to_string()))
            .find(|s| !s.is_empty())
    })
}

/// A `<meta>` tag's `content` attribute, otherwise the element's text. Trimmed.
fn content_or_text(el: &Element) -> String {
    if el.is("meta") {
        return el.attr("content").map(str::trim).unwrap_or_default().to_string();
    }
    el.text().trim().to_string()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
