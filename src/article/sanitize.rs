//! DOM sanitizer. Produces an XHTML-safe copy of the article body; the input is never touched.

use crate::page::{Element, Node};
use reqwest::Url;

/// Removed with all descendants.
const UNWANTED_TAGS: [&str; 9] = [
    "script", "style", "iframe", "noscript", "object", "embed", "source", "video", "audio",
];

/// Elements that cannot carry content in strict markup.
const VOID_TAGS: [&str; 13] = [
    "img", "br", "hr", "input", "meta", "link", "area", "base", "col", "embed", "source", "track",
    "wbr",
];

/// Image attributes EPUB readers don't understand.
const DROPPED_IMG_ATTRS: [&str; 3] = ["srcset", "sizes", "loading"];

/// Return a cleaned deep copy of `root`. Rules apply to descendants in a fixed order:
/// unwanted elements removed, void elements emptied, `<picture>` replaced by its first `<img>`,
/// then image and link addresses made absolute against `base_url`.
///
/// Applying it to its own output changes nothing.
pub fn sanitize(root: &Element, base_url: &str) -> Element {
    let base = Url::parse(base_url).ok();
    if base.is_none() {
        tracing::debug!(base_url, "page address is not absolute; relative links stay unresolved");
    }
    let mut clean = root.clone();
    remove_unwanted(&mut clean);
    empty_void_elements(&mut clean);
    replace_pictures(&mut clean);
    fix_images(&mut clean, base.as_ref());
    fix_links(&mut clean, base.as_ref());
    clean
}

fn remove_unwanted(el: &mut Element) {
    el.children.retain(|child| match child {
        Node::Element(e) => !UNWANTED_TAGS.iter().any(|t| e.is(t)),
        Node::Text(_) => true,
    });
    for_each_child_element(el, remove_unwanted);
}

fn empty_void_elements(el: &mut Element) {
    for child in &mut el.children {
        if let Node::Element(e) = child {
            if VOID_TAGS.iter().any(|t| e.is(t)) {
                e.children.clear();
            } else {
                empty_void_elements(e);
            }
        }
    }
}

fn replace_pictures(el: &mut Element) {
    let children = std::mem::take(&mut el.children);
    el.children = children
        .into_iter()
        .filter_map(|child| match child {
            Node::Element(e) if e.is("picture") => e.find_first("img").cloned().map(Node::Element),
            other => Some(other),
        })
        .collect();
    for_each_child_element(el, replace_pictures);
}

fn fix_images(el: &mut Element, base: Option<&Url>) {
    for child in &mut el.children {
        if let Node::Element(e) = child {
            if e.is("img") {
                resolve_attr(e, "src", base);
                for attr in DROPPED_IMG_ATTRS {
                    e.remove_attr(attr);
                }
                if !e.has_attr("alt") {
                    e.set_attr("alt", "");
                }
            }
            fix_images(e, base);
        }
    }
}

fn fix_links(el: &mut Element, base: Option<&Url>) {
    for child in &mut el.children {
        if let Node::Element(e) = child {
            if e.is("a") {
                resolve_attr(e, "href", base);
            }
            fix_links(e, base);
        }
    }
}

/// Make `attr` absolute. An empty or unresolvable value removes the attribute.
fn resolve_attr(el: &mut Element, attr: &str, base: Option<&Url>) {
    let Some(raw) = el.attr(attr).map(str::trim) else {
        return;
    };
    let resolved = if raw.is_empty() {
        None
    } else {
        match base {
            Some(b) => b.join(raw).ok(),
            None => Url::parse(raw).ok(),
        }
    };
    match resolved {
        Some(url) => {
            let url = url.to_string();
            el.set_attr(attr, &url);
        }
        None => {
            tracing::debug!(tag = %el.name, attr, value = raw, "dropping unresolvable address");
            el.remove_attr(attr);
        }
    }
}

fn for_each_child_element(el: &mut Element, f: fn(&mut Element)) {
    for child in &mut el.children {
        if let Node::Element(e) = child {
            f(e);
        }
    }
}
