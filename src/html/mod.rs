//! HTML handling module for page-trawl
//!
//! This module contains:
//! - The owned, typed document tree and its visitor dispatcher
//! - The tree-based sanitizer that strips executable content
//! - A string-level fallback stripper for documents that cannot be lifted

mod fallback;
mod node;
mod sanitizer;

pub use fallback::strip_dangerous;
pub use node::{
    extract_title, parse_document, visit, Document, Element, Node, TreeError, Visitor,
    DEFAULT_MAX_DEPTH,
};
pub use sanitizer::{
    is_denied_attribute, is_denied_tag, is_script_url, sanitize, HtmlSanitizer, DENIED_ATTRIBUTES,
    DENIED_TAGS,
};
