//! Escaping for text emitted into Markdown
//!
//! Every text run and attribute value written by the converter passes
//! through [`escape_text`]. Newlines are never touched here: the converter
//! only emits newlines of its own, and those are structural.

/// Escapes a text run or attribute value for embedding
///
/// # Examples
///
/// ```
/// use page_trawl::markdown::escape_text;
///
/// assert_eq!(escape_text(r#"a < b & "c""#), "a &lt; b &amp; &quot;c&quot;");
/// assert_eq!(escape_text("tab\there"), "tab here");
/// ```
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '\\' => escaped.push_str("\\\\"),
            '\r' | '\t' | '\u{0c}' => escaped.push(' '),
            '\0' => {}
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escapes Markdown for placement inside a JSON string literal
///
/// The result carries no surrounding quotes.
pub fn escape_for_json(text: &str) -> String {
    let quoted = serde_json::to_string(text).unwrap_or_default();
    quoted
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or_default()
        .to_string()
}
