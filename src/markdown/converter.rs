//! Tree-walking HTML to Markdown converter
//!
//! The converter lifts HTML into the typed [`Node`] tree and renders it with a
//! [`Visitor`]. Block elements are padded with blank lines while rendering and
//! the result is normalized once at the end, so individual templates never
//! need to know what surrounds them.

use crate::html::{parse_document, visit, Document, Element, Node, Visitor, DEFAULT_MAX_DEPTH};
use crate::markdown::escape::escape_text;
use scraper::Html;
use thiserror::Error;

/// Elements whose content is never rendered
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template", "head", "title"];

/// Elements rendered as paragraphs of their children
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "main", "header", "footer", "nav", "aside", "figure",
    "figcaption", "address", "details", "summary", "dl", "dt", "dd", "body", "center",
];

/// Errors raised while walking a document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("Element nesting exceeds {limit} levels")]
    DepthExceeded { limit: usize },
}

/// Converts HTML into Markdown
#[derive(Debug, Clone)]
pub struct MarkdownConverter {
    max_depth: usize,
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownConverter {
    /// Creates a converter with the default nesting limit
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Creates a converter that falls back to plain text past `max_depth` levels
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Converts an HTML string to Markdown
    ///
    /// Never fails. Documents nested deeper than the configured limit are
    /// reduced to their escaped plain text.
    pub fn convert(&self, html: &str) -> String {
        let rendered = parse_document(html, self.max_depth)
            .map_err(|e| e.to_string())
            .and_then(|document| self.convert_document(&document).map_err(|e| e.to_string()));

        match rendered {
            Ok(markdown) => markdown,
            Err(reason) => {
                tracing::warn!("Markdown conversion failed ({}), extracting plain text", reason);
                plain_text(html)
            }
        }
    }

    /// Renders an already parsed document
    pub fn convert_document(&self, document: &Document) -> Result<String, ConvertError> {
        let mut renderer = Renderer {
            depth: 0,
            max_depth: self.max_depth,
        };
        let raw = renderer.children(&document.body)?;
        Ok(normalize_output(&raw))
    }
}

/// Converts HTML to Markdown with default settings
///
/// # Examples
///
/// ```
/// use page_trawl::markdown::to_markdown;
///
/// let md = to_markdown("<h1>Title</h1><p>Some <strong>bold</strong> text</p>");
/// assert_eq!(md, "# Title\n\nSome **bold** text");
/// ```
pub fn to_markdown(html: &str) -> String {
    MarkdownConverter::new().convert(html)
}

/// Extracts escaped text from every text node outside skipped elements
///
/// Walks the parser's arena with its own iterator, so deep nesting cannot
/// exhaust the stack.
pub fn plain_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut chunks = Vec::new();

    for node in document.tree.root().descendants() {
        let scraper::Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map(|el| SKIPPED_TAGS.contains(&el.name()))
                .unwrap_or(false)
        });
        if hidden {
            continue;
        }

        let collapsed = collapse_whitespace(text);
        let collapsed = collapsed.trim();
        if !collapsed.is_empty() {
            chunks.push(escape_text(collapsed));
        }
    }

    chunks.join("\n")
}

struct Renderer {
    depth: usize,
    max_depth: usize,
}

impl Visitor for Renderer {
    type Output = String;
    type Error = ConvertError;

    fn visit_element(&mut self, element: &Element) -> Result<String, ConvertError> {
        if self.depth >= self.max_depth {
            return Err(ConvertError::DepthExceeded {
                limit: self.max_depth,
            });
        }

        self.depth += 1;
        let rendered = self.render_element(element);
        self.depth -= 1;
        rendered
    }

    fn visit_text(&mut self, text: &str) -> Result<String, ConvertError> {
        Ok(escape_text(&collapse_whitespace(text)))
    }

    fn visit_comment(&mut self, _comment: &str) -> Result<String, ConvertError> {
        Ok(String::new())
    }
}

impl Renderer {
    fn children(&mut self, element: &Element) -> Result<String, ConvertError> {
        let mut out = String::new();
        for child in &element.children {
            out.push_str(&visit(child, self)?);
        }
        Ok(out)
    }

    fn render_element(&mut self, el: &Element) -> Result<String, ConvertError> {
        let tag = el.tag.as_str();

        if SKIPPED_TAGS.contains(&tag) {
            return Ok(String::new());
        }

        match tag {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = tag[1..].parse::<usize>().unwrap_or(1);
                let text = single_line(&self.children(el)?);
                if text.is_empty() {
                    return Ok(String::new());
                }
                Ok(format!("\n\n{} {}\n\n", "#".repeat(level), text))
            }
            "br" => Ok("\n".to_string()),
            "hr" => Ok("\n\n---\n\n".to_string()),
            "strong" | "b" => Ok(wrap_inline(&self.children(el)?, "**")),
            "em" | "i" => Ok(wrap_inline(&self.children(el)?, "*")),
            "code" => Ok(inline_code(&text_content(el))),
            "pre" => Ok(code_block(el)),
            "a" => self.render_link(el),
            "img" => Ok(render_image(el)),
            "ul" => self.render_list(el, None),
            "ol" => {
                let start = el
                    .attr("start")
                    .and_then(|s| s.trim().parse::<usize>().ok())
                    .unwrap_or(1);
                self.render_list(el, Some(start))
            }
            "li" => {
                let content = self.children(el)?;
                Ok(format!("\n{}\n", list_item(content.trim(), "- ")))
            }
            "blockquote" => {
                let content = normalize_output(&self.children(el)?);
                let quoted = content
                    .lines()
                    .map(|line| {
                        let line = line.trim_end();
                        if line.is_empty() {
                            ">".to_string()
                        } else {
                            format!("> {}", line)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                Ok(block(&quoted))
            }
            "table" => self.render_table(el),
            _ if BLOCK_TAGS.contains(&tag) => Ok(block(&self.children(el)?)),
            _ => self.children(el),
        }
    }

    fn render_link(&mut self, el: &Element) -> Result<String, ConvertError> {
        let text = single_line(&self.children(el)?);
        let href = el.attr("href").map(str::trim).unwrap_or("");

        if href.is_empty() || href.starts_with('#') {
            return Ok(text);
        }

        let target = link_target(href);
        let label = if text.is_empty() { target.clone() } else { text };
        Ok(format!("[{}]({})", label, target))
    }

    fn render_list(&mut self, el: &Element, start: Option<usize>) -> Result<String, ConvertError> {
        let mut items = Vec::new();
        let mut number = start.unwrap_or(1);

        for child in el.child_elements() {
            let content = if child.tag == "li" {
                self.children(child)?
            } else {
                self.visit_element(child)?
            };

            let content = content.trim();
            if content.is_empty() {
                continue;
            }

            let marker = match start {
                Some(_) => format!("{}. ", number),
                None => "- ".to_string(),
            };
            number += 1;
            items.push(list_item(content, &marker));
        }

        if items.is_empty() {
            return Ok(String::new());
        }
        Ok(block(&items.join("\n")))
    }

    fn render_table(&mut self, el: &Element) -> Result<String, ConvertError> {
        let mut rows: Vec<Vec<String>> = Vec::new();

        for child in el.child_elements() {
            match child.tag.as_str() {
                "tr" => rows.push(self.table_row(child)?),
                "thead" | "tbody" | "tfoot" => {
                    for row in child.child_elements().filter(|r| r.tag == "tr") {
                        rows.push(self.table_row(row)?);
                    }
                }
                _ => {}
            }
        }

        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        if columns == 0 {
            return Ok(String::new());
        }

        let mut lines = Vec::with_capacity(rows.len() + 1);
        for (index, mut row) in rows.into_iter().enumerate() {
            row.resize(columns, String::new());
            lines.push(format!("| {} |", row.join(" | ")));
            if index == 0 {
                lines.push(format!("| {} |", vec!["---"; columns].join(" | ")));
            }
        }

        Ok(block(&lines.join("\n")))
    }

    fn table_row(&mut self, row: &Element) -> Result<Vec<String>, ConvertError> {
        let mut cells = Vec::new();
        for cell in row.child_elements().filter(|c| c.tag == "td" || c.tag == "th") {
            let text = single_line(&self.children(cell)?);
            cells.push(text.replace('|', "\\|"));
        }
        Ok(cells)
    }
}

/// Collapses every whitespace run to a single space, keeping edge spaces
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Joins rendered content onto one trimmed line
fn single_line(content: &str) -> String {
    content.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn block(content: &str) -> String {
    let content = content.trim();
    if content.is_empty() {
        String::new()
    } else {
        format!("\n\n{}\n\n", content)
    }
}

/// Wraps inline content in emphasis markers, moving edge spaces outside them
fn wrap_inline(content: &str, marker: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return content.to_string();
    }

    let lead = if content.starts_with(char::is_whitespace) { " " } else { "" };
    let trail = if content.ends_with(char::is_whitespace) { " " } else { "" };
    format!("{}{}{}{}{}", lead, marker, trimmed, marker, trail)
}

fn inline_code(raw: &str) -> String {
    let code = escape_text(&single_line(raw));
    if code.is_empty() {
        return String::new();
    }

    let fence = if code.contains('`') { "``" } else { "`" };
    let pad = if code.starts_with('`') || code.ends_with('`') { " " } else { "" };
    format!("{fence}{pad}{code}{pad}{fence}")
}

fn code_block(el: &Element) -> String {
    let language = code_language(el)
        .or_else(|| el.child_elements().find(|c| c.tag == "code").and_then(code_language))
        .unwrap_or_default();

    let raw = text_content(el);
    let code = escape_text(raw.trim_matches('\n'));
    let fence = if code.contains("```") { "````" } else { "```" };

    format!("\n\n{fence}{language}\n{code}\n{fence}\n\n")
}

/// Reads a `language-xxx` or `lang-xxx` class
fn code_language(el: &Element) -> Option<String> {
    el.attr("class")?
        .split_whitespace()
        .find_map(|class| {
            class
                .strip_prefix("language-")
                .or_else(|| class.strip_prefix("lang-"))
        })
        .filter(|lang| lang.chars().all(|c| c.is_ascii_alphanumeric() || "+-_#.".contains(c)))
        .map(str::to_string)
}

fn render_image(el: &Element) -> String {
    let src = el.attr("src").map(str::trim).unwrap_or("");
    if src.is_empty() {
        return String::new();
    }

    let alt = single_line(&escape_text(el.attr("alt").unwrap_or("")));
    format!("![{}]({})", alt, link_target(src))
}

/// Escapes a URL and encodes the characters that would end a link target
fn link_target(url: &str) -> String {
    escape_text(url)
        .replace(' ', "%20")
        .replace('(', "%28")
        .replace(')', "%29")
}

/// Prefixes the first line with a marker and indents continuation lines
fn list_item(content: &str, marker: &str) -> String {
    let indent = " ".repeat(marker.len());
    let mut lines = content.lines().filter(|line| !line.trim().is_empty());

    let mut out = String::new();
    if let Some(first) = lines.next() {
        out.push_str(marker);
        out.push_str(first.trim_start());
    }
    for line in lines {
        out.push('\n');
        out.push_str(&indent);
        out.push_str(line);
    }
    out
}

/// Concatenates raw text below an element without recursion
fn text_content(el: &Element) -> String {
    let mut out = String::new();
    let mut stack: Vec<&Node> = el.children.iter().rev().collect();

    while let Some(node) = stack.pop() {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(child) if child.tag == "br" => out.push('\n'),
            Node::Element(child) => stack.extend(child.children.iter().rev()),
            Node::Comment(_) => {}
        }
    }
    out
}

/// Trims line ends, drops indentation artifacts and collapses blank runs,
/// leaving fenced code untouched
fn normalize_output(raw: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut in_fence = false;
    let mut blank_run = 0;

    for line in raw.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            blank_run = 0;
            lines.push(line.trim());
            continue;
        }

        if in_fence {
            lines.push(line.trim_end());
            continue;
        }

        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
            lines.push(line);
            continue;
        }

        blank_run = 0;
        // A lone leading space is left over from inline whitespace next to a
        // block boundary; deeper indentation belongs to list continuations
        match line.strip_prefix(' ') {
            Some(rest) if !rest.starts_with(' ') => lines.push(rest),
            _ => lines.push(line),
        }
    }

    lines.join("\n").trim().to_string()
}
