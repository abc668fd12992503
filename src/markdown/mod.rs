//! Markdown module for page-trawl
//!
//! This module handles:
//! - Rendering the typed HTML tree as Markdown
//! - Escaping every emitted text run and attribute value
//! - Plain-text extraction when a document is too deep to walk

mod converter;
mod escape;

pub use converter::{plain_text, to_markdown, ConvertError, MarkdownConverter};
pub use escape::{escape_for_json, escape_text};
