//! Tree-based HTML sanitizer
//!
//! This is the single security boundary for untrusted markup: every page is
//! passed through [`HtmlSanitizer::sanitize`] before it is converted, stored or
//! returned to a caller.

use crate::html::fallback::strip_dangerous;
use crate::html::node::{parse_document, Document, Element, Node, TreeError, DEFAULT_MAX_DEPTH};

/// Tags removed together with their entire subtree
pub const DENIED_TAGS: &[&str] = &[
    "script", "style", "iframe", "embed", "object", "noscript", "meta", "link", "form", "input",
    "button", "select", "textarea", "frame", "frameset",
];

/// Attributes removed regardless of value (event handlers are matched by prefix)
pub const DENIED_ATTRIBUTES: &[&str] = &["formaction", "action", "srcdoc", "xlink:href"];

/// Attributes whose values are URLs and must not carry a script scheme
const URL_ATTRIBUTES: &[&str] = &["href", "src", "background", "poster", "cite", "data"];

/// URL schemes that execute code when followed
const SCRIPT_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:text/html"];

/// Removes executable and interactive content from HTML
#[derive(Debug, Clone)]
pub struct HtmlSanitizer {
    max_depth: usize,
}

impl Default for HtmlSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlSanitizer {
    /// Creates a sanitizer with the default nesting limit
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Creates a sanitizer that gives up on tree parsing past `max_depth` levels
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Sanitizes HTML and returns the cleaned inner HTML of the body
    ///
    /// Never fails: if the document cannot be lifted into a tree, a
    /// regex-based pass strips the same content on a best-effort basis.
    pub fn sanitize(&self, html: &str) -> String {
        match self.sanitize_document(html) {
            Ok(document) => document.body_html(),
            Err(e) => {
                tracing::warn!("Tree sanitization failed ({}), using fallback stripper", e);
                strip_dangerous(html)
            }
        }
    }

    /// Parses and sanitizes HTML, returning the cleaned tree
    pub fn sanitize_document(&self, html: &str) -> Result<Document, TreeError> {
        let mut document = parse_document(html, self.max_depth)?;
        clean_element(&mut document.body);
        Ok(document)
    }
}

/// Sanitizes HTML with default settings
///
/// # Examples
///
/// ```
/// use page_trawl::html::sanitize;
///
/// let clean = sanitize(r#"<p onclick="steal()">Hi<script>alert(1)</script></p>"#);
/// assert_eq!(clean, "<p>Hi</p>");
/// ```
pub fn sanitize(html: &str) -> String {
    HtmlSanitizer::new().sanitize(html)
}

/// Returns true if a tag is on the denylist
pub fn is_denied_tag(tag: &str) -> bool {
    DENIED_TAGS.iter().any(|denied| denied.eq_ignore_ascii_case(tag))
}

/// Returns true if an attribute should be dropped from every element
pub fn is_denied_attribute(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name.starts_with("on") || DENIED_ATTRIBUTES.contains(&name.as_str())
}

/// Returns true if a URL-valued attribute carries a script scheme
pub fn is_script_url(value: &str) -> bool {
    // Browsers ignore embedded whitespace and control characters in schemes
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .take(32)
        .collect::<String>()
        .to_ascii_lowercase();
    SCRIPT_SCHEMES.iter().any(|scheme| compact.starts_with(scheme))
}

fn clean_element(element: &mut Element) {
    element.attrs.retain(|(name, value)| {
        if is_denied_attribute(name) {
            return false;
        }
        !(URL_ATTRIBUTES.contains(&name.as_str()) && is_script_url(value))
    });

    element.children.retain(|child| match child {
        Node::Element(el) => !is_denied_tag(&el.tag),
        Node::Comment(_) => false,
        Node::Text(_) => true,
    });

    for child in &mut element.children {
        if let Node::Element(el) = child {
            clean_element(el);
        }
    }
}
