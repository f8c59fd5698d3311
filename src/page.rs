//! Page inspection. The `Page` trait is the read-only handle the pipeline queries; `Element` is the
//! owned, detached copy of a subtree that the sanitizer and serializer work on.

use scraper::{ElementRef, Html, Selector};

/// Read-only page-inspection capability supplied by the host.
///
/// Implementations return deep copies, so nothing downstream can mutate the page itself.
pub trait Page {
    /// The page's own address, verbatim.
    fn url(&self) -> &str;

    /// Deep copy of the first element (document order) matching a CSS selector.
    fn select_first(&self, selector: &str) -> Option<Element>;

    /// Deep copies of every element matching a CSS selector, in document order.
    fn select_all(&self, selector: &str) -> Vec<Element>;
}

/// A node of a detached element tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// Owned element: lowercase tag name, attributes in source order, children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_lowercase(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter, mostly for tests.
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder-style child append, mostly for tests.
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self
            .attrs
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some((_, v)) => *v = value.to_string(),
            None => self.attrs.push((name.to_string(), value.to_string())),
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// First descendant element (depth-first, document order) with the given tag name.
    pub fn find_first(&self, name: &str) -> Option<&Element> {
        for child in &self.children {
            if let Node::Element(el) = child {
                if el.is(name) {
                    return Some(el);
                }
                if let Some(found) = el.find_first(name) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Deep copy of a parsed `scraper` element.
    pub fn from_element_ref(element: ElementRef<'_>) -> Self {
        let value = element.value();
        let children = element
            .children()
            .filter_map(|child| match child.value() {
                scraper::Node::Text(text) => Some(Node::Text(String::from(&**text))),
                scraper::Node::Element(_) => {
                    ElementRef::wrap(child).map(|e| Node::Element(Element::from_element_ref(e)))
                }
                _ => None,
            })
            .collect();
        Element {
            name: value.name().to_ascii_lowercase(),
            attrs: value
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            children,
        }
    }
}

fn collect_text(el: &Element, out: &mut String) {
    for child in &el.children {
        match child {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => collect_text(e, out),
        }
    }
}

/// `Page` over a parsed HTML document.
pub struct HtmlPage {
    url: String,
    document: Html,
}

impl HtmlPage {
    /// Parse `html` as a full document served from `url`.
    pub fn parse(url: impl Into<String>, html: &str) -> Self {
        Self {
            url: url.into(),
            document: Html::parse_document(html),
        }
    }

    /// Text of the `<title>` element, if there is one.
    pub fn title(&self) -> Option<String> {
        self.select_first("title").map(|t| t.text())
    }
}

/// Parsed selector, or `None` (logged) when the syntax is invalid.
fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::warn!(selector, error = %e, "invalid selector, treating as no match");
            None
        }
    }
}

impl Page for HtmlPage {
    fn url(&self) -> &str {
        &self.url
    }

    fn select_first(&self, selector: &str) -> Option<Element> {
        let sel = parse_selector(selector)?;
        self.document
            .select(&sel)
            .next()
            .map(Element::from_element_ref)
    }

    fn select_all(&self, selector: &str) -> Vec<Element> {
        let Some(sel) = parse_selector(selector) else {
            return Vec::new();
        };
        self.document
            .select(&sel)
            .map(Element::from_element_ref)
            .collect()
    }
}
