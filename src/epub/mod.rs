//! Package assembler. Turns one `ArticleRecord` and its fetched images into an EPUB container
//! (mimetype, container, OPF, NCX or nav, stylesheet, single chapter, images).

mod archive;

pub use archive::{ArchiveWriter, ZipArchiveWriter};

use crate::model::{ArticleRecord, BookIdentifier, FetchedImage};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use std::str::FromStr;
use thiserror::Error;

const MIMETYPE: &[u8] = b"application/epub+zip";
const OEBPS_PREFIX: &str = "OEBPS/";
const UNKNOWN_AUTHOR: &str = "Unknown Author";

const CONTAINER_XML: &[u8] = b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<container version=\"1.0\" xmlns=\"urn:oasis:names:tc:opendocument:xmlns:container\">\n  <rootfiles>\n    <rootfile full-path=\"OEBPS/content.opf\" media-type=\"application/oebps-package+xml\"/>\n  </rootfiles>\n</container>";

const STYLES_CSS: &str = r#"body {
  font-family: Georgia, serif;
  line-height: 1.6;
  margin: 1em;
}

h1, h2, h3, h4, h5, h6 {
  font-family: Arial, sans-serif;
  margin-top: 1.5em;
  margin-bottom: 0.5em;
}

p {
  margin-bottom: 1em;
  text-align: justify;
}

img {
  max-width: 100%;
  height: auto;
  margin: 1em 0;
}

blockquote {
  margin: 1em 2em;
  padding-left: 1em;
  border-left: 3px solid #ccc;
  font-style: italic;
}

pre {
  background-color: #f4f4f4;
  padding: 1em;
  overflow-x: auto;
  font-family: Consolas, monospace;
}

code {
  background-color: #f4f4f4;
  padding: 0.2em 0.4em;
  font-family: Consolas, monospace;
}"#;

/// EPUB format version.
///
/// Default is EPUB 2 (OPF 2.0, toc.ncx, XHTML 1.1 chapter). `Epub3` writes OPF 3.0, nav.xhtml and
/// an HTML5 chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EpubVersion {
    #[default]
    Epub2,
    Epub3,
}

#[derive(Debug, Error)]
#[error("Unknown EPUB version \"{0}\" (expected \"2\" or \"3\")")]
pub struct UnknownEpubVersion(pub String);

impl FromStr for EpubVersion {
    type Err = UnknownEpubVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "2" | "epub2" => Ok(EpubVersion::Epub2),
            "3" | "epub3" => Ok(EpubVersion::Epub3),
            other => Err(UnknownEpubVersion(other.to_string())),
        }
    }
}

/// Errors while building the archive. Fatal: no partial package is returned.
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("Failed to generate EPUB: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Failed to generate EPUB: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to generate EPUB: archive task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Build the package on tokio's blocking pool and return the finished bytes.
pub async fn assemble(
    article: ArticleRecord,
    images: Vec<FetchedImage>,
    identifier: BookIdentifier,
    version: EpubVersion,
) -> Result<Vec<u8>, AssemblyError> {
    let bytes = tokio::task::spawn_blocking(move || {
        assemble_into(&article, &images, &identifier, version, ZipArchiveWriter::new())
    })
    .await??;
    tracing::info!(bytes = bytes.len(), "package assembled");
    Ok(bytes)
}

/// Write every package member into `writer` in fixed order, then finish it.
pub fn assemble_into<W: ArchiveWriter>(
    article: &ArticleRecord,
    images: &[FetchedImage],
    identifier: &BookIdentifier,
    version: EpubVersion,
    mut writer: W,
) -> Result<Vec<u8>, AssemblyError> {
    let now = Utc::now();
    let urn = identifier.urn();
    tracing::debug!(?version, images = images.len(), id = %urn, "assembling package");

    // Mimetype first, uncompressed
    writer.add_entry("mimetype", MIMETYPE, true)?;
    writer.add_entry("META-INF/container.xml", CONTAINER_XML, false)?;

    let opf = match version {
        EpubVersion::Epub2 => opf2(article, images, &urn, now),
        EpubVersion::Epub3 => opf3(article, images, &urn, now),
    };
    writer.add_entry(&oebps("content.opf"), opf.as_bytes(), false)?;

    match version {
        EpubVersion::Epub2 => writer.add_entry(&oebps("toc.ncx"), ncx(article, &urn).as_bytes(), false)?,
        EpubVersion::Epub3 => writer.add_entry(&oebps("nav.xhtml"), nav_xhtml(article, &urn).as_bytes(), false)?,
    }

    writer.add_entry(&oebps("styles.css"), STYLES_CSS.as_bytes(), false)?;
    writer.add_entry(&oebps("chapter1.xhtml"), chapter(article, version).as_bytes(), false)?;

    for fetched in images {
        let name = oebps(&format!("Images/{}", fetched.image.filename));
        writer.add_entry(&name, &fetched.data, false)?;
    }

    writer.finish()
}

fn oebps(name: &str) -> String {
    format!("{}{}", OEBPS_PREFIX, name)
}

fn creator(article: &ArticleRecord) -> String {
    xml_escape(article.author.as_deref().unwrap_or(UNKNOWN_AUTHOR))
}

fn dc_date(article: &ArticleRecord, now: DateTime<Utc>) -> String {
    match &article.publish_date {
        Some(date) => xml_escape(date),
        None => now.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

fn image_items(images: &[FetchedImage]) -> String {
    images
        .iter()
        .map(|f| {
            format!(
                r#"    <item id="{}" href="Images/{}" media-type="{}"/>
"#,
                f.image.stem(),
                xml_escape(&f.image.filename),
                f.media_type
            )
        })
        .collect()
}

fn opf2(article: &ArticleRecord, images: &[FetchedImage], urn: &str, now: DateTime<Utc>) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" unique-identifier="BookID" version="2.0">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
    <dc:title>{title}</dc:title>
    <dc:creator>{creator}</dc:creator>
    <dc:identifier id="BookID">{urn}</dc:identifier>
    <dc:language>en</dc:language>
    <dc:date>{date}</dc:date>
    <dc:source>{source}</dc:source>
  </metadata>
  <manifest>
    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
    <item id="style" href="styles.css" media-type="text/css"/>
    <item id="chapter1" href="chapter1.xhtml" media-type="application/xhtml+xml"/>
{images}  </manifest>
  <spine toc="ncx">
    <itemref idref="chapter1"/>
  </spine>
</package>
"#,
        title = xml_escape(&article.title),
        creator = creator(article),
        urn = urn,
        date = dc_date(article, now),
        source = xml_escape(&article.source_url),
        images = image_items(images),
    )
}

fn opf3(article: &ArticleRecord, images: &[FetchedImage], urn: &str, now: DateTime<Utc>) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" unique-identifier="BookID" version="3.0">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>{title}</dc:title>
    <dc:creator>{creator}</dc:creator>
    <dc:identifier id="BookID">{urn}</dc:identifier>
    <dc:language>en</dc:language>
    <dc:date>{date}</dc:date>
    <dc:source>{source}</dc:source>
    <meta property="dcterms:modified">{modified}</meta>
  </metadata>
  <manifest>
    <item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav"/>
    <item id="style" href="styles.css" media-type="text/css"/>
    <item id="chapter1" href="chapter1.xhtml" media-type="application/xhtml+xml"/>
{images}  </manifest>
  <spine>
    <itemref idref="chapter1"/>
  </spine>
</package>
"#,
        title = xml_escape(&article.title),
        creator = creator(article),
        urn = urn,
        date = dc_date(article, now),
        source = xml_escape(&article.source_url),
        modified = now.format("%Y-%m-%dT%H:%M:%SZ"),
        images = image_items(images),
    )
}

fn ncx(article: &ArticleRecord, urn: &str) -> String {
    let title = xml_escape(&article.title);
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE ncx PUBLIC "-//NISO//DTD ncx 2005-1//EN" "http://www.daisy.org/z3986/2005/ncx-2005-1.dtd">
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
    <meta name="dtb:uid" content="{urn}"/>
    <meta name="dtb:depth" content="1"/>
    <meta name="dtb:totalPageCount" content="0"/>
    <meta name="dtb:maxPageNumber" content="0"/>
  </head>
  <docTitle>
    <text>{title}</text>
  </docTitle>
  <navMap>
    <navPoint id="navPoint-1" playOrder="1">
      <navLabel>
        <text>{title}</text>
      </navLabel>
      <content src="chapter1.xhtml"/>
    </navPoint>
  </navMap>
</ncx>
"#,
        urn = urn,
        title = title,
    )
}

fn nav_xhtml(article: &ArticleRecord, urn: &str) -> String {
    let title = xml_escape(&article.title);
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
<head>
  <meta charset="UTF-8"/>
  <meta name="dc:identifier" content="{urn}"/>
  <title>{title}</title>
</head>
<body>
  <nav epub:type="toc">
    <ol>
      <li><a href="chapter1.xhtml">{title}</a></li>
    </ol>
  </nav>
</body>
</html>
"#,
        urn = urn,
        title = title,
    )
}

fn chapter(article: &ArticleRecord, version: EpubVersion) -> String {
    let title = xml_escape(&article.title);
    let byline = article
        .author
        .as_deref()
        .map(|a| format!("  <p><em>By {}</em></p>\n", xml_escape(a)))
        .unwrap_or_default();
    let dateline = article
        .publish_date
        .as_deref()
        .map(|d| format!("  <p><em>{}</em></p>\n", xml_escape(&format_date(d))))
        .unwrap_or_default();
    let (prolog, head_meta) = match version {
        EpubVersion::Epub2 => (
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.1//EN\" \"http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd\">",
            "",
        ),
        EpubVersion::Epub3 => (
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE html>",
            "  <meta charset=\"UTF-8\"/>\n",
        ),
    };
    format!(
        r#"{prolog}
<html xmlns="http://www.w3.org/1999/xhtml">
<head>
{head_meta}  <title>{title}</title>
  <link rel="stylesheet" type="text/css" href="styles.css"/>
</head>
<body>
  <h1>{title}</h1>
{byline}{dateline}  <hr/>
{body}
</body>
</html>
"#,
        prolog = prolog,
        head_meta = head_meta,
        title = title,
        byline = byline,
        dateline = dateline,
        body = article.body_markup,
    )
}

/// Human-readable date (`January 5, 2024`) for the chapter heading. Unparseable input is
/// returned unchanged.
pub fn format_date(raw: &str) -> String {
    const DISPLAY: &str = "%B %-d, %Y";
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.format(DISPLAY).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return dt.format(DISPLAY).to_string();
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.format(DISPLAY).to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return dt.format(DISPLAY).to_string();
    }
    raw.to_string()
}

pub fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ImageRef;
    use std::io::{Cursor, Read};
    use uuid::Uuid;
    use zip::read::ZipArchive;

    fn article(images: usize) -> ArticleRecord {
        let refs: Vec<ImageRef> = (0..images)
            .map(|i| ImageRef::new(i, format!("https://cdn.example.com/{}.png", i)))
            .collect();
        let body: String = refs
            .iter()
            .map(|r| format!("<img src=\"Images/{}\" alt=\"\"/>", r.filename))
            .collect();
        ArticleRecord {
            title: "Tom & Jerry <Live>".to_string(),
            author: Some("Jane Doe".to_string()),
            publish_date: Some("2024-01-05".to_string()),
            source_url: "https://example.com/post?a=1&b=2".to_string(),
            body_markup: format!("\n<p>Hello</p>\n{}", body),
            images: refs,
        }
    }

    fn fetched(record: &ArticleRecord, keep: &[usize]) -> Vec<FetchedImage> {
        record
            .images
            .iter()
            .filter(|r| keep.contains(&r.index))
            .map(|r| FetchedImage::new(r.clone(), vec![r.index as u8; 8]))
            .collect()
    }

    fn read_member(bytes: &[u8], name: &str) -> Result<String, Box<dyn std::error::Error>> {
        let mut zip = ZipArchive::new(Cursor::new(bytes))?;
        let mut file = zip.by_name(name)?;
        let mut s = String::new();
        file.read_to_string(&mut s)?;
        Ok(s)
    }

    /// Records member names and compression; `finish` returns them one per line.
    #[derive(Default)]
    struct RecordingWriter {
        entries: Vec<(String, bool)>,
    }

    impl ArchiveWriter for RecordingWriter {
        fn add_entry(&mut self, name: &str, _data: &[u8], stored: bool) -> Result<(), AssemblyError> {
            self.entries.push((name.to_string(), stored));
            Ok(())
        }

        fn finish(self) -> Result<Vec<u8>, AssemblyError> {
            let lines: Vec<String> = self
                .entries
                .iter()
                .map(|(n, stored)| format!("{}{}", n, if *stored { " stored" } else { "" }))
                .collect();
            Ok(lines.join("\n").into_bytes())
        }
    }

    struct FailingWriter;

    impl ArchiveWriter for FailingWriter {
        fn add_entry(&mut self, _name: &str, _data: &[u8], _stored: bool) -> Result<(), AssemblyError> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into())
        }

        fn finish(self) -> Result<Vec<u8>, AssemblyError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn members_written_in_fixed_order() -> Result<(), Box<dyn std::error::Error>> {
        let record = article(2);
        let images = fetched(&record, &[0, 1]);
        let id = BookIdentifier::new();
        let listing = assemble_into(&record, &images, &id, EpubVersion::Epub2, RecordingWriter::default())?;
        let listing = String::from_utf8(listing)?;
        let names: Vec<&str> = listing.lines().collect();
        assert_eq!(
            names,
            vec![
                "mimetype stored",
                "META-INF/container.xml",
                "OEBPS/content.opf",
                "OEBPS/toc.ncx",
                "OEBPS/styles.css",
                "OEBPS/chapter1.xhtml",
                "OEBPS/Images/image0.png",
                "OEBPS/Images/image1.png",
            ]
        );

        let listing = assemble_into(&record, &[], &id, EpubVersion::Epub3, RecordingWriter::default())?;
        let listing = String::from_utf8(listing)?;
        assert_eq!(listing.lines().nth(3), Some("OEBPS/nav.xhtml"));
        Ok(())
    }

    #[test]
    fn mimetype_is_first_and_stored() -> Result<(), Box<dyn std::error::Error>> {
        let record = article(0);
        let bytes = assemble_into(&record, &[], &BookIdentifier::new(), EpubVersion::Epub2, ZipArchiveWriter::new())?;
        // First local header is 30 fixed bytes followed by the name
        assert_eq!(&bytes[0..4], b"PK\x03\x04");
        assert_eq!(&bytes[30..38], b"mimetype");

        let mut zip = ZipArchive::new(Cursor::new(&bytes))?;
        let first = zip.by_index(0)?;
        assert_eq!(first.name(), "mimetype");
        assert_eq!(first.compression(), zip::CompressionMethod::Stored);
        Ok(())
    }

    #[test]
    fn failed_image_absent_from_manifest_but_kept_in_chapter() -> Result<(), Box<dyn std::error::Error>> {
        let record = article(3);
        let images = fetched(&record, &[0, 2]);
        let bytes = assemble_into(&record, &images, &BookIdentifier::new(), EpubVersion::Epub2, ZipArchiveWriter::new())?;

        let opf = read_member(&bytes, "OEBPS/content.opf")?;
        assert!(opf.contains(r#"<item id="image0" href="Images/image0.png" media-type="image/png"/>"#));
        assert!(opf.contains(r#"<item id="image2" href="Images/image2.png" media-type="image/png"/>"#));
        assert!(!opf.contains("image1"));

        let chapter = read_member(&bytes, "OEBPS/chapter1.xhtml")?;
        assert_eq!(chapter.matches("<img ").count(), 3);
        assert!(chapter.contains("Images/image1.png"));

        let zip = ZipArchive::new(Cursor::new(&bytes))?;
        let names: Vec<&str> = zip.file_names().collect();
        assert!(names.contains(&"OEBPS/Images/image2.png"));
        assert!(!names.contains(&"OEBPS/Images/image1.png"));
        Ok(())
    }

    #[test]
    fn manifest_never_lists_the_package_document() -> Result<(), Box<dyn std::error::Error>> {
        let record = article(1);
        let images = fetched(&record, &[0]);
        for version in [EpubVersion::Epub2, EpubVersion::Epub3] {
            let bytes = assemble_into(&record, &images, &BookIdentifier::new(), version, ZipArchiveWriter::new())?;
            let opf = read_member(&bytes, "OEBPS/content.opf")?;
            assert!(!opf.contains(r#"href="content.opf""#));
            assert_eq!(opf.matches("<itemref ").count(), 1);
        }
        Ok(())
    }

    #[test]
    fn opf_metadata_is_escaped_and_defaulted() -> Result<(), Box<dyn std::error::Error>> {
        let mut record = article(0);
        let id = BookIdentifier::from(Uuid::nil());
        let bytes = assemble_into(&record, &[], &id, EpubVersion::Epub2, ZipArchiveWriter::new())?;
        let opf = read_member(&bytes, "OEBPS/content.opf")?;
        assert!(opf.contains("<dc:title>Tom &amp; Jerry &lt;Live&gt;</dc:title>"));
        assert!(opf.contains("<dc:creator>Jane Doe</dc:creator>"));
        assert!(opf.contains(r#"<dc:identifier id="BookID">urn:uuid:00000000-0000-0000-0000-000000000000</dc:identifier>"#));
        assert!(opf.contains("<dc:date>2024-01-05</dc:date>"));
        assert!(opf.contains("<dc:source>https://example.com/post?a=1&amp;b=2</dc:source>"));
        assert!(opf.contains(r#"<spine toc="ncx">"#));

        record.author = None;
        record.publish_date = None;
        let bytes = assemble_into(&record, &[], &id, EpubVersion::Epub2, ZipArchiveWriter::new())?;
        let opf = read_member(&bytes, "OEBPS/content.opf")?;
        assert!(opf.contains("<dc:creator>Unknown Author</dc:creator>"));
        let date = opf
            .split("<dc:date>")
            .nth(1)
            .and_then(|rest| rest.split("</dc:date>").next())
            .ok_or("missing dc:date")?;
        assert!(DateTime::parse_from_rfc3339(date).is_ok(), "not rfc3339: {}", date);
        Ok(())
    }

    #[test]
    fn navigation_carries_identifier() -> Result<(), Box<dyn std::error::Error>> {
        let record = article(0);
        let id = BookIdentifier::new();
        let urn = id.urn();

        let bytes = assemble_into(&record, &[], &id, EpubVersion::Epub2, ZipArchiveWriter::new())?;
        let ncx = read_member(&bytes, "OEBPS/toc.ncx")?;
        assert!(ncx.contains(&format!(r#"<meta name="dtb:uid" content="{}"/>"#, urn)));
        assert!(ncx.contains(r#"<content src="chapter1.xhtml"/>"#));

        let bytes = assemble_into(&record, &[], &id, EpubVersion::Epub3, ZipArchiveWriter::new())?;
        let nav = read_member(&bytes, "OEBPS/nav.xhtml")?;
        assert!(nav.contains(&urn));
        assert!(nav.contains(r#"<a href="chapter1.xhtml">Tom &amp; Jerry &lt;Live&gt;</a>"#));
        let opf = read_member(&bytes, "OEBPS/content.opf")?;
        assert!(opf.contains(r#"version="3.0""#));
        assert!(opf.contains(r#"properties="nav""#));
        assert!(opf.contains(r#"<meta property="dcterms:modified">"#));
        Ok(())
    }

    #[test]
    fn chapter_has_heading_byline_and_date() -> Result<(), Box<dyn std::error::Error>> {
        let record = article(0);
        let bytes = assemble_into(&record, &[], &BookIdentifier::new(), EpubVersion::Epub2, ZipArchiveWriter::new())?;
        let chapter = read_member(&bytes, "OEBPS/chapter1.xhtml")?;
        assert!(chapter.contains("XHTML 1.1"));
        assert!(chapter.contains("<h1>Tom &amp; Jerry &lt;Live&gt;</h1>"));
        assert!(chapter.contains("<p><em>By Jane Doe</em></p>"));
        assert!(chapter.contains("<p><em>January 5, 2024</em></p>"));
        assert!(chapter.contains("<hr/>\n\n<p>Hello</p>"));
        Ok(())
    }

    #[test]
    fn chapter_omits_missing_byline_and_date() -> Result<(), Box<dyn std::error::Error>> {
        let mut record = article(0);
        record.author = None;
        record.publish_date = None;
        let bytes = assemble_into(&record, &[], &BookIdentifier::new(), EpubVersion::Epub3, ZipArchiveWriter::new())?;
        let chapter = read_member(&bytes, "OEBPS/chapter1.xhtml")?;
        assert!(chapter.contains("<!DOCTYPE html>"));
        assert!(!chapter.contains("By "));
        assert!(!chapter.contains("<em>"));
        Ok(())
    }

    #[test]
    fn writer_error_is_surfaced() {
        let record = article(0);
        let result = assemble_into(&record, &[], &BookIdentifier::new(), EpubVersion::Epub2, FailingWriter);
        let err = result.err().map(|e| e.to_string()).unwrap_or_default();
        assert!(err.starts_with("Failed to generate EPUB:"), "{}", err);
    }

    #[tokio::test]
    async fn assemble_runs_off_thread() -> Result<(), Box<dyn std::error::Error>> {
        let record = article(1);
        let images = fetched(&record, &[0]);
        let bytes = assemble(record, images, BookIdentifier::new(), EpubVersion::Epub2).await?;
        let zip = ZipArchive::new(Cursor::new(&bytes))?;
        assert_eq!(zip.len(), 7);
        Ok(())
    }

    #[test]
    fn format_date_variants() {
        assert_eq!(format_date("2024-01-05"), "January 5, 2024");
        assert_eq!(format_date("2023-11-30T08:15:00Z"), "November 30, 2023");
        assert_eq!(format_date("2023-11-30T08:15:00"), "November 30, 2023");
        assert_eq!(format_date("Tue, 1 Jul 2003 10:52:37 +0200"), "July 1, 2003");
        assert_eq!(format_date("last Tuesday"), "last Tuesday");
    }

    #[test]
    fn epub_version_parses_config_values() {
        assert_eq!("2".parse::<EpubVersion>().ok(), Some(EpubVersion::Epub2));
        assert_eq!("EPUB3".parse::<EpubVersion>().ok(), Some(EpubVersion::Epub3));
        assert!("4".parse::<EpubVersion>().is_err());
        assert_eq!(EpubVersion::default(), EpubVersion::Epub2);
    }

    #[test]
    fn xml_escape_covers_markup_characters() {
        assert_eq!(xml_escape(r#"a & b < c > "d" 'e'"#), "a &amp; b &lt; c &gt; &quot;d&quot; &apos;e&apos;");
    }
}
