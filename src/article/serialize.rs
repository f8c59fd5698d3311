//! XHTML serializer. Walks a sanitized tree and emits well-formed markup plus the images it references.
//!
//! Pure: same tree in, same output out. The image counter is passed down the recursion and the
//! next value handed back, so numbering follows document order.

use crate::model::ImageRef;
use crate::page::{Element, Node};

/// Serializer output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Serialized {
    pub markup: String,
    pub images: Vec<ImageRef>,
}

/// Serialize `root` (itself included) to XHTML.
pub fn serialize(root: &Element) -> Serialized {
    let mut out = Serialized::default();
    write_element(root, &mut out, 0);
    out
}

/// Write one node; returns the next free image index.
fn write_node(node: &Node, out: &mut Serialized, next_image: usize) -> usize {
    match node {
        Node::Text(text) => {
            out.markup.push_str(&escape_text(text));
            next_image
        }
        Node::Element(el) => write_element(el, out, next_image),
    }
}

fn write_children(el: &Element, out: &mut Serialized, next_image: usize) -> usize {
    el.children
        .iter()
        .fold(next_image, |next, child| write_node(child, out, next))
}

fn write_wrapped(
    tag: &str,
    el: &Element,
    out: &mut Serialized,
    next_image: usize,
) -> usize {
    out.markup.push('<');
    out.markup.push_str(tag);
    out.markup.push('>');
    let next = write_children(el, out, next_image);
    out.markup.push_str("</");
    out.markup.push_str(tag);
    out.markup.push('>');
    next
}

/// Block element on its own line.
fn write_block(tag: &str, el: &Element, out: &mut Serialized, next_image: usize) -> usize {
    if !out.markup.is_empty() && !out.markup.ends_with('\n') {
        out.markup.push('\n');
    }
    let next = write_wrapped(tag, el, out, next_image);
    out.markup.push('\n');
    next
}

/// Container set off by blank line breaks on both sides.
fn write_fenced(tag: &str, el: &Element, out: &mut Serialized, next_image: usize) -> usize {
    out.markup.push('\n');
    let next = write_wrapped(tag, el, out, next_image);
    out.markup.push('\n');
    next
}

fn write_element(el: &Element, out: &mut Serialized, next_image: usize) -> usize {
    let name = el.name.to_ascii_lowercase();
    match name.as_str() {
        "p" | "div" => write_block("p", el, out, next_image),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => write_block(&name, el, out, next_image),
        "strong" | "b" => write_wrapped("strong", el, out, next_image),
        "em" | "i" => write_wrapped("em", el, out, next_image),
        "code" => write_wrapped("code", el, out, next_image),
        "br" => {
            out.markup.push_str("<br/>");
            next_image
        }
        "hr" => {
            out.markup.push_str("\n<hr/>\n");
            next_image
        }
        "a" => match el.attr("href").filter(|h| !h.is_empty()) {
            Some(href) => {
                out.markup.push_str("<a href=\"");
                out.markup.push_str(&escape_attr(href));
                out.markup.push_str("\">");
                let next = write_children(el, out, next_image);
                out.markup.push_str("</a>");
                next
            }
            None => write_children(el, out, next_image),
        },
        "blockquote" => write_fenced("blockquote", el, out, next_image),
        "ul" | "ol" => write_fenced(&name, el, out, next_image),
        "li" => write_wrapped("li", el, out, next_image),
        "img" => match el.attr("src").filter(|s| !s.is_empty()) {
            Some(src) => {
                let image = ImageRef::new(next_image, src);
                out.markup.push_str(&format!(
                    "<img src=\"Images/{}\" alt=\"{}\"/>",
                    image.filename,
                    escape_attr(el.attr("alt").unwrap_or(""))
                ));
                out.images.push(image);
                next_image + 1
            }
            None => next_image,
        },
        "pre" => write_fenced("pre", el, out, next_image),
        _ => write_children(el, out, next_image),
    }
}

/// Escape text content: `&`, `<`, `>`.
pub fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape an attribute value: `&`, `<`, `>`, `"`.
pub fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
