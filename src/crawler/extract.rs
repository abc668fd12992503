//! HTML parser for extracting links and selector matches
//!
//! This module handles parsing HTML content to extract:
//! - Links to follow (from `<a href>` tags, in document order)
//! - Elements matching a caller-supplied CSS selector

use crate::ScrapeError;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

/// Attribute names that are never copied into extracted elements
const FORBIDDEN_KEYS: &[&str] = &["__proto__", "constructor", "prototype"];

/// Text and attributes of one element matched by a selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ExtractedElement {
    pub text: String,
    pub attributes: BTreeMap<String, String>,
}

/// Extracts all followable links from an HTML document
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags, in document order, resolved against `base_url`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links and data URIs
/// - Fragment-only links (same page anchors)
/// - Hrefs that fail to resolve or resolve to a non-HTTP(S) URL
///
/// Fragments are removed from the resolved URLs.
///
/// # Example
///
/// ```
/// use page_trawl::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<a href="/page#top">Link</a><a href="mailto:x@example.com">Mail</a>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let links = extract_links(html, &base_url);
/// assert_eq!(links, vec![Url::parse("https://example.com/page").unwrap()]);
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                match resolve_link(href, base_url) {
                    Some(url) => links.push(url),
                    None => tracing::trace!("Skipping href {:?}", href),
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let mut absolute = base_url.join(href).ok()?;
    if absolute.scheme() != "http" && absolute.scheme() != "https" {
        return None;
    }

    absolute.set_fragment(None);
    Some(absolute)
}

/// Extracts text and attributes of every element matching `selector`
///
/// # Returns
///
/// * `Ok(Vec<ExtractedElement>)` - One entry per match, in document order
/// * `Err(ScrapeError::InvalidArgument)` - The selector does not parse
pub fn extract_elements(html: &str, selector: &str) -> Result<Vec<ExtractedElement>, ScrapeError> {
    let parsed = Selector::parse(selector)
        .map_err(|e| ScrapeError::InvalidArgument(format!("invalid selector {:?}: {:?}", selector, e)))?;
    let document = Html::parse_document(html);

    let elements = document
        .select(&parsed)
        .map(|element| {
            let text = element
                .text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");

            let attributes = element
                .value()
                .attrs()
                .filter(|(name, _)| is_safe_key(name))
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect();

            ExtractedElement { text, attributes }
        })
        .collect();

    Ok(elements)
}

/// Rejects keys that would be dangerous once the map is handed to a
/// scripting consumer
fn is_safe_key(key: &str) -> bool {
    !FORBIDDEN_KEYS.contains(&key) && !key.contains('<') && !key.contains('>')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/dir/page").unwrap()
    }

    fn link_strings(html: &str) -> Vec<String> {
        extract_links(html, &base_url())
            .into_iter()
            .map(|u| u.to_string())
            .collect()
    }

    #[test]
    fn test_extract_absolute_link() {
        let html = r#"<a href="https://other.com/page">Link</a>"#;
        assert_eq!(link_strings(html), vec!["https://other.com/page"]);
    }

    #[test]
    fn test_extract_relative_links() {
        let html = r#"<a href="/root">R</a><a href="sibling">S</a><a href="../up">U</a>"#;
        assert_eq!(
            link_strings(html),
            vec![
                "https://example.com/root",
                "https://example.com/dir/sibling",
                "https://example.com/up"
            ]
        );
    }

    #[test]
    fn test_skip_special_schemes() {
        let html = r#"
            <a href="javascript:void(0)">JS</a>
            <a href="JavaScript:void(0)">JS</a>
            <a href="mailto:test@example.com">Email</a>
            <a href="tel:+1234567890">Phone</a>
            <a href="data:text/html,<h1>Test</h1>">Data</a>
            <a href="ftp://example.com/file">FTP</a>
        "#;
        assert!(link_strings(html).is_empty());
    }

    #[test]
    fn test_skip_fragments_and_download() {
        let html = r##"<a href="#section">Frag</a><a href="/f.zip" download>D</a><a href="/x#y">X</a>"##;
        assert_eq!(link_strings(html), vec!["https://example.com/x"]);
    }

    #[test]
    fn test_malformed_href_skipped() {
        let html = r#"<a href="http://[bad">Bad</a><a href="/ok">Ok</a>"#;
        assert_eq!(link_strings(html), vec!["https://example.com/ok"]);
    }

    #[test]
    fn test_document_order_preserved() {
        let html = r#"<a href="/c">c</a><div><a href="/a">a</a></div><a href="/b">b</a>"#;
        assert_eq!(
            link_strings(html),
            vec![
                "https://example.com/c",
                "https://example.com/a",
                "https://example.com/b"
            ]
        );
    }

    #[test]
    fn test_extract_elements() {
        let html = r#"<ul><li class="item" data-id="1"> First
            item </li><li class="item" data-id="2">Second</li></ul>"#;
        let elements = extract_elements(html, "li.item").unwrap();
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].text, "First item");
        assert_eq!(elements[0].attributes.get("data-id"), Some(&"1".to_string()));
        assert_eq!(elements[1].text, "Second");
    }

    #[test]
    fn test_extract_elements_filters_forbidden_keys() {
        let html = r#"<div __proto__="x" constructor="y" prototype="z" id="ok">t</div>"#;
        let elements = extract_elements(html, "div").unwrap();
        let keys: Vec<_> = elements[0].attributes.keys().cloned().collect();
        assert_eq!(keys, vec!["id"]);
    }

    #[test]
    fn test_safe_key() {
        assert!(is_safe_key("href"));
        assert!(!is_safe_key("__proto__"));
        assert!(!is_safe_key("a<b"));
        assert!(!is_safe_key("x>"));
    }

    #[test]
    fn test_invalid_selector() {
        let err = extract_elements("<p>x</p>", "p[").unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidArgument(_)));
    }
}
