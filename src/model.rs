//! Data model for one article conversion.
//!
//! `ArticleRecord` is produced once by extraction and consumed by the package assembler.
//! Nothing here is persisted.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Image extensions recognised in image URLs. Anything else becomes `jpg`.
const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "webp", "svg"];

/// Page metadata found by the heuristic search. Every field degrades instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleMetadata {
    pub title: String,
    pub author: Option<String>,
    #[serde(rename = "publishDate")]
    pub publish_date: Option<String>,
    #[serde(rename = "sourceUrl")]
    pub source_url: String,
}

/// Extracted article: metadata, serialized XHTML body, and the images it references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    pub author: Option<String>,
    #[serde(rename = "publishDate")]
    pub publish_date: Option<String>,
    #[serde(rename = "sourceUrl")]
    pub source_url: String,
    /// Serialized XHTML fragment.
    #[serde(rename = "bodyMarkup")]
    pub body_markup: String,
    pub images: Vec<ImageRef>,
}

impl ArticleRecord {
    pub fn new(metadata: ArticleMetadata, body_markup: String, images: Vec<ImageRef>) -> Self {
        Self {
            title: metadata.title,
            author: metadata.author,
            publish_date: metadata.publish_date,
            source_url: metadata.source_url,
            body_markup,
            images,
        }
    }
}

/// One `<img>` found while serializing, in document order.
///
/// Two refs with the same `source_url` still get distinct indices and filenames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(rename = "sourceUrl")]
    pub source_url: String,
    /// `image{index}.{ext}`, relative to the package's `Images/` directory.
    pub filename: String,
    /// 0-based position in document order.
    pub index: usize,
}

impl ImageRef {
    pub fn new(index: usize, source_url: impl Into<String>) -> Self {
        let source_url = source_url.into();
        let filename = format!("image{}.{}", index, image_extension(&source_url));
        Self {
            source_url,
            filename,
            index,
        }
    }

    /// Filename without extension; doubles as the manifest item id.
    pub fn stem(&self) -> &str {
        self.filename
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&self.filename)
    }

    pub fn media_type(&self) -> &'static str {
        media_type_for(&self.filename)
    }
}

/// An image whose bytes were retrieved.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub image: ImageRef,
    pub data: Vec<u8>,
    pub media_type: &'static str,
}

impl FetchedImage {
    pub fn new(image: ImageRef, data: Vec<u8>) -> Self {
        let media_type = image.media_type();
        Self {
            image,
            data,
            media_type,
        }
    }
}

/// Unique id of one produced package. Fresh per conversion, so converting the same article twice
/// yields two different identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookIdentifier(Uuid);

impl BookIdentifier {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// URN form embedded in the package documents.
    pub fn urn(&self) -> String {
        format!("urn:uuid:{}", self.0)
    }
}

impl Default for BookIdentifier {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for BookIdentifier {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Extension for an image URL: the known extension right before end of string or `?query`, lowercased.
pub fn image_extension(url: &str) -> &'static str {
    let path = url.split_once('?').map(|(p, _)| p).unwrap_or(url);
    let Some((_, ext)) = path.rsplit_once('.') else {
        return "jpg";
    };
    IMAGE_EXTENSIONS
        .iter()
        .find(|known| known.eq_ignore_ascii_case(ext))
        .copied()
        .unwrap_or("jpg")
}

/// Media type from a filename's extension. Unknown extensions map to `image/jpeg`.
pub fn media_type_for(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, e)| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "image/jpeg",
    }
}
