//! Typed document tree
//!
//! Parsed HTML is lifted out of the parser's arena into an owned tree of
//! [`Node`] values so that the sanitizer and the Markdown converter can match
//! on node kinds instead of probing them at runtime.

use scraper::{ElementRef, Html, Selector};
use std::fmt::Write as _;
use thiserror::Error;

/// Default maximum element nesting accepted when building a tree
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Elements that never have children or a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Errors raised while lifting parsed HTML into a [`Node`] tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("Element nesting exceeds {limit} levels")]
    TooDeep { limit: usize },

    #[error("Document has no body element")]
    MissingBody,
}

/// A node in an owned HTML tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

/// An element with lowercase tag name, ordered attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    /// Creates an element with no attributes or children
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Looks up an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterates over child elements, skipping text and comments
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    /// Serializes the children of this element as HTML
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            write_node(&mut out, child);
        }
        out
    }
}

/// Callbacks for a depth-first walk over a [`Node`] tree
///
/// The walker calls exactly one method per node; visitors decide whether and
/// how to descend into element children by calling [`visit`] themselves.
pub trait Visitor {
    type Output;
    type Error;

    fn visit_element(&mut self, element: &Element) -> Result<Self::Output, Self::Error>;

    fn visit_text(&mut self, text: &str) -> Result<Self::Output, Self::Error>;

    fn visit_comment(&mut self, comment: &str) -> Result<Self::Output, Self::Error>;
}

/// Dispatches a node to the matching visitor callback
pub fn visit<V: Visitor>(node: &Node, visitor: &mut V) -> Result<V::Output, V::Error> {
    match node {
        Node::Element(element) => visitor.visit_element(element),
        Node::Text(text) => visitor.visit_text(text),
        Node::Comment(comment) => visitor.visit_comment(comment),
    }
}

/// A parsed page: its title and an owned copy of its body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub title: Option<String>,
    pub body: Element,
}

impl Document {
    /// Serializes the body's children as HTML
    pub fn body_html(&self) -> String {
        self.body.inner_html()
    }
}

/// Parses HTML and lifts it into an owned [`Document`]
///
/// Parsing itself is error-tolerant; this fails only when the body nests
/// deeper than `max_depth`, which keeps every later recursive walk bounded.
pub fn parse_document(html: &str, max_depth: usize) -> Result<Document, TreeError> {
    let parsed = Html::parse_document(html);
    let title = extract_title(&parsed);

    let body_selector = Selector::parse("body").map_err(|_| TreeError::MissingBody)?;
    let body = parsed
        .select(&body_selector)
        .next()
        .ok_or(TreeError::MissingBody)?;

    let body = lift_element(body, 0, max_depth)?;
    Ok(Document { title, body })
}

/// Extracts the trimmed `<title>` text, if present and non-empty
pub fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn lift_element(element: ElementRef<'_>, depth: usize, max_depth: usize) -> Result<Element, TreeError> {
    if depth > max_depth {
        return Err(TreeError::TooDeep { limit: max_depth });
    }

    let value = element.value();
    let mut lifted = Element::new(value.name().to_ascii_lowercase());
    lifted.attrs = value
        .attrs()
        .map(|(name, val)| (name.to_ascii_lowercase(), val.to_string()))
        .collect();

    for child in element.children() {
        match child.value() {
            scraper::Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    lifted
                        .children
                        .push(Node::Element(lift_element(child_el, depth + 1, max_depth)?));
                }
            }
            scraper::Node::Text(text) => lifted.children.push(Node::Text(text.to_string())),
            scraper::Node::Comment(comment) => {
                lifted.children.push(Node::Comment(comment.to_string()))
            }
            _ => {}
        }
    }

    Ok(lifted)
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Element(el) => write_element(out, el),
        Node::Text(text) => out.push_str(&escape_html(text, false)),
        Node::Comment(comment) => {
            let _ = write!(out, "<!--{}-->", comment.replace("--", "- -"));
        }
    }
}

fn write_element(out: &mut String, el: &Element) {
    out.push('<');
    out.push_str(&el.tag);
    for (name, value) in &el.attrs {
        let _ = write!(out, " {}=\"{}\"", name, escape_html(value, true));
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&el.tag.as_str()) {
        return;
    }

    for child in &el.children {
        write_node(out, child);
    }
    let _ = write!(out, "</{}>", el.tag);
}

/// Escapes text for HTML serialization
fn escape_html(text: &str, in_attribute: bool) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if in_attribute => escaped.push_str("&quot;"),
            '\u{a0}' => escaped.push_str("&nbsp;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_title_and_body() {
        let doc = parse_document(
            "<html><head><title> Hello </title></head><body><p>Hi</p></body></html>",
            DEFAULT_MAX_DEPTH,
        )
        .unwrap();
        assert_eq!(doc.title, Some("Hello".to_string()));
        assert_eq!(doc.body.tag, "body");
        assert_eq!(doc.body_html(), "<p>Hi</p>");
    }

    #[test]
    fn test_fragment_gets_body() {
        let doc = parse_document("<p>loose</p>", DEFAULT_MAX_DEPTH).unwrap();
        assert_eq!(doc.title, None);
        assert_eq!(doc.body_html(), "<p>loose</p>");
    }

    #[test]
    fn test_attributes_kept_in_order() {
        let doc = parse_document(r#"<a href="/x" class="c">x</a>"#, DEFAULT_MAX_DEPTH).unwrap();
        let link = doc.body.child_elements().next().unwrap();
        assert_eq!(link.attr("href"), Some("/x"));
        assert_eq!(link.attr("class"), Some("c"));
        assert_eq!(link.attr("id"), None);
    }

    #[test]
    fn test_serialization_escapes_text_and_attributes() {
        let doc = parse_document(
            r#"<p title="a &quot;b&quot;">1 &lt; 2 &amp; 3</p>"#,
            DEFAULT_MAX_DEPTH,
        )
        .unwrap();
        assert_eq!(
            doc.body_html(),
            r#"<p title="a &quot;b&quot;">1 &lt; 2 &amp; 3</p>"#
        );
    }

    #[test]
    fn test_void_elements_not_closed() {
        let doc = parse_document("<p>a<br>b<img src=\"x.png\"></p>", DEFAULT_MAX_DEPTH).unwrap();
        assert_eq!(doc.body_html(), "<p>a<br>b<img src=\"x.png\"></p>");
    }

    #[test]
    fn test_depth_limit() {
        let html = format!("{}x{}", "<div>".repeat(50), "</div>".repeat(50));
        assert!(parse_document(&html, 100).is_ok());
        assert_eq!(
            parse_document(&html, 10).unwrap_err(),
            TreeError::TooDeep { limit: 10 }
        );
    }

    struct TextCounter;

    impl Visitor for TextCounter {
        type Output = usize;
        type Error = ();

        fn visit_element(&mut self, element: &Element) -> Result<usize, ()> {
            let mut total = 0;
            for child in &element.children {
                total += visit(child, self)?;
            }
            Ok(total)
        }

        fn visit_text(&mut self, text: &str) -> Result<usize, ()> {
            Ok(text.trim().len())
        }

        fn visit_comment(&mut self, _comment: &str) -> Result<usize, ()> {
            Ok(0)
        }
    }

    #[test]
    fn test_visitor_dispatch() {
        let doc = parse_document("<p>ab<b>cd</b><!-- ignored --></p>", DEFAULT_MAX_DEPTH).unwrap();
        let node = Node::Element(doc.body);
        assert_eq!(visit(&node, &mut TextCounter), Ok(4));
    }
}
