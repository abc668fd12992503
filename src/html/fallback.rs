//! String-level sanitizer used when tree construction fails
//!
//! Best effort only, but it never fails and never returns input that still
//! contains a complete denied element, an inline event handler or a
//! `javascript:` URL it could recognize.

use crate::html::sanitizer::DENIED_TAGS;
use once_cell::sync::Lazy;
use regex::Regex;

/// One `<tag ...>...</tag>` pattern per denied tag; the regex crate has no
/// backreferences, so open/close pairs are spelled out per tag
static BLOCK_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    DENIED_TAGS
        .iter()
        .filter_map(|tag| Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>")).ok())
        .collect()
});

/// Any remaining open, close or self-closing denied tag
static STRAY_TAG: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(&format!(r"(?is)</?(?:{})\b[^>]*>", DENIED_TAGS.join("|"))).ok()
});

static COMMENT: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?s)<!--.*?(?:-->|$)").ok());

/// An event handler or denied attribute inside an open tag; group 1 keeps
/// everything before it. Quoted values are skipped whole, since they may
/// contain `>`.
static EVENT_ATTRIBUTE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r#"(?i)(<[a-z](?:[^>"']|"[^"]*"|'[^']*')*?)\s+(?:on[a-z0-9_:.-]*|formaction|srcdoc|xlink:href)\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#,
    )
    .ok()
});

/// A URL attribute with a script scheme inside an open tag
static SCRIPT_URL: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r#"(?i)(<[a-z](?:[^>"']|"[^"]*"|'[^']*')*?\s(?:href|src|action|background|poster))\s*=\s*(?:"\s*(?:javascript|vbscript):[^"]*"|'\s*(?:javascript|vbscript):[^']*'|(?:javascript|vbscript):[^\s>]*)"#,
    )
    .ok()
});

/// Removes denied tags, event handler attributes and script URLs from HTML text
///
/// # Examples
///
/// ```
/// use page_trawl::html::strip_dangerous;
///
/// let out = strip_dangerous(r#"<p onclick="x()">ok<script>bad()</script></p>"#);
/// assert_eq!(out, "<p>ok</p>");
/// ```
pub fn strip_dangerous(html: &str) -> String {
    let mut out = replace_all(&COMMENT, html, "");

    // Repeat until stable so that tags split around an inner block
    // (e.g. `<scr<script></script>ipt>`) are caught once reassembled
    loop {
        let mut next = out.clone();
        for pattern in BLOCK_PATTERNS.iter() {
            next = pattern.replace_all(&next, "").into_owned();
        }
        next = replace_all(&STRAY_TAG, &next, "");
        if next == out {
            break;
        }
        out = next;
    }

    out = replace_until_stable(&EVENT_ATTRIBUTE, out, "$1");
    replace_until_stable(&SCRIPT_URL, out, "$1=\"#\"")
}

/// Each pass rewrites at most one attribute per tag, so repeat until nothing changes
fn replace_until_stable(pattern: &Lazy<Option<Regex>>, mut text: String, replacement: &str) -> String {
    loop {
        let next = replace_all(pattern, &text, replacement);
        if next == text {
            return text;
        }
        text = next;
    }
}

fn replace_all(pattern: &Lazy<Option<Regex>>, text: &str, replacement: &str) -> String {
    match pattern.as_ref() {
        Some(re) => re.replace_all(text, replacement).into_owned(),
        None => text.to_string(),
    }
}
