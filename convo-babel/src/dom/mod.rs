//! Read-only helpers over an html5ever DOM
//!
//! The extractor and the HTML → markdown normalizer both walk a parsed share
//! page. Parsing goes through `html5ever` into a `markup5ever_rcdom` tree; this
//! module adds the small set of queries they need on top of it:
//!
//! - element name, attribute and class lookups
//! - document-order traversal
//! - `innerText`-like visible text and `innerHTML`-like serialization
//! - descendant CSS selectors (see [`selector`])

pub mod selector;

use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};
use std::ops::Range;

pub use selector::{Selector, SelectorError};

/// Elements whose text never shows up in rendered output.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "template", "noscript", "head"];

/// Elements that start on their own line.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption", "figure",
    "footer", "form", "header", "hr", "li", "main", "nav", "ol", "pre", "section", "table",
    "tbody", "thead", "tfoot", "tr", "ul",
];

/// Elements separated from their neighbours by a blank line.
const PARAGRAPH_ELEMENTS: &[&str] = &["p", "h1", "h2", "h3", "h4", "h5", "h6"];

/// Parse a complete HTML document. html5ever recovers from any malformed input.
pub fn parse_html(html: &str) -> RcDom {
    parse_document(RcDom::default(), ParseOpts::default()).one(html)
}

/// Lowercase local name of an element node.
pub fn element_name(handle: &Handle) -> Option<String> {
    match &handle.data {
        NodeData::Element { name, .. } => Some(name.local.to_string()),
        _ => None,
    }
}

pub fn is_element(handle: &Handle, tag: &str) -> bool {
    match &handle.data {
        NodeData::Element { name, .. } => &*name.local == tag,
        _ => false,
    }
}

/// Value of the named attribute, if present.
pub fn attr(handle: &Handle, attr_name: &str) -> Option<String> {
    match &handle.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| &*a.name.local == attr_name)
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

pub fn classes(handle: &Handle) -> Vec<String> {
    attr(handle, "class")
        .map(|value| value.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

pub fn children(handle: &Handle) -> Vec<Handle> {
    handle.children.borrow().iter().cloned().collect()
}

/// All element descendants of `handle` in document order, excluding itself.
pub fn descendant_elements(handle: &Handle) -> Vec<Handle> {
    let mut out = Vec::new();
    collect_elements(handle, &mut out);
    out
}

fn collect_elements(handle: &Handle, out: &mut Vec<Handle>) {
    for child in handle.children.borrow().iter() {
        if matches!(child.data, NodeData::Element { .. }) {
            out.push(child.clone());
        }
        collect_elements(child, out);
    }
}

/// Concatenated text of all descendant text nodes, untouched (`textContent`).
pub fn text_content(handle: &Handle) -> String {
    let mut out = String::new();
    push_text_content(handle, &mut out);
    out
}

fn push_text_content(handle: &Handle, out: &mut String) {
    for child in handle.children.borrow().iter() {
        match &child.data {
            NodeData::Text { contents } => out.push_str(&contents.borrow()),
            NodeData::Element { .. } => push_text_content(child, out),
            _ => {}
        }
    }
}

/// Visible text of an element, approximating the browser's `innerText`.
///
/// Whitespace collapses outside `<pre>`, `<br>` and block boundaries become
/// line breaks, paragraphs and headings are separated by a blank line, and
/// table cells are tab separated. The result is trimmed.
pub fn inner_text(handle: &Handle) -> String {
    let mut collector = TextCollector::default();
    for child in handle.children.borrow().iter() {
        collect_text(child, false, &mut collector);
    }
    collector.finish()
}

fn collect_text(handle: &Handle, preformatted: bool, collector: &mut TextCollector) {
    match &handle.data {
        NodeData::Text { contents } => collector.push_text(&contents.borrow(), preformatted),
        NodeData::Element { name, .. } => {
            let tag = &*name.local;
            if HIDDEN_ELEMENTS.contains(&tag) {
                return;
            }
            if tag == "br" {
                collector.push_line_break();
                return;
            }

            let breaks = if PARAGRAPH_ELEMENTS.contains(&tag) {
                2
            } else if BLOCK_ELEMENTS.contains(&tag) {
                1
            } else {
                0
            };
            if matches!(tag, "td" | "th") {
                collector.push_cell_separator();
            }

            collector.request_breaks(breaks);
            let preformatted = preformatted || tag == "pre";
            for child in handle.children.borrow().iter() {
                collect_text(child, preformatted, collector);
            }
            collector.request_breaks(breaks);
        }
        NodeData::Document => {
            for child in handle.children.borrow().iter() {
                collect_text(child, preformatted, collector);
            }
        }
        _ => {}
    }
}

#[derive(Default)]
struct TextCollector {
    out: String,
    pending_breaks: usize,
    /// Byte ranges of `out` copied verbatim from `<pre>` text.
    preformatted: Vec<Range<usize>>,
}

impl TextCollector {
    fn request_breaks(&mut self, count: usize) {
        self.pending_breaks = self.pending_breaks.max(count);
    }

    fn at_line_start(&self) -> bool {
        self.out.is_empty() || self.out.ends_with('\n')
    }

    fn is_preformatted(&self, index: usize) -> bool {
        self.preformatted.iter().any(|range| range.contains(&index))
    }

    /// Trailing spaces are dropped, except those inside preformatted text.
    fn trim_trailing_spaces(&mut self) {
        let protected = self.preformatted.last().map_or(0, |range| range.end);
        let trimmed = self.out.trim_end_matches([' ', '\t']).len().max(protected);
        self.out.truncate(trimmed);
    }

    fn flush_breaks(&mut self) {
        if self.pending_breaks > 0 && !self.out.is_empty() {
            self.trim_trailing_spaces();
            let existing = self.out.len() - self.out.trim_end_matches('\n').len();
            for _ in existing..self.pending_breaks {
                self.out.push('\n');
            }
        }
        self.pending_breaks = 0;
    }

    fn push_line_break(&mut self) {
        self.flush_breaks();
        self.trim_trailing_spaces();
        self.out.push('\n');
    }

    fn push_cell_separator(&mut self) {
        if self.pending_breaks == 0 && !self.at_line_start() {
            self.trim_trailing_spaces();
            self.out.push('\t');
        }
    }

    fn push_text(&mut self, text: &str, preformatted: bool) {
        if preformatted {
            if !text.is_empty() {
                self.flush_breaks();
                let start = self.out.len();
                self.out.push_str(text);
                self.preformatted.push(start..self.out.len());
            }
            return;
        }

        let mut collapsed = String::with_capacity(text.len());
        let mut previous_space = false;
        for c in text.chars() {
            if c.is_whitespace() {
                if !previous_space {
                    collapsed.push(' ');
                }
                previous_space = true;
            } else {
                collapsed.push(c);
                previous_space = false;
            }
        }

        if collapsed.trim().is_empty() {
            if !collapsed.is_empty()
                && self.pending_breaks == 0
                && !self.at_line_start()
                && !self.out.ends_with([' ', '\t'])
            {
                self.out.push(' ');
            }
            return;
        }

        self.flush_breaks();
        let piece = if self.at_line_start() || self.out.ends_with([' ', '\t']) {
            collapsed.trim_start()
        } else {
            collapsed.as_str()
        };
        self.out.push_str(piece);
    }

    /// Cap blank-line runs at one and trim line ends, leaving preformatted
    /// lines and the line breaks between them as they were.
    fn finish(self) -> String {
        let mut result = String::with_capacity(self.out.len());
        let mut newline_run = 0;
        let mut verbatim_gap = false;
        let mut start = 0;
        for raw in self.out.split('\n') {
            if start > 0 {
                newline_run += 1;
                verbatim_gap |= self.is_preformatted(start - 1);
            }
            let end = start + raw.len();
            let line = if end > start && self.is_preformatted(end - 1) {
                raw
            } else {
                raw.trim_end_matches([' ', '\t'])
            };
            start = end + 1;

            if line.is_empty() {
                continue;
            }
            if !result.is_empty() {
                let breaks = if verbatim_gap {
                    newline_run
                } else {
                    newline_run.clamp(1, 2)
                };
                result.extend(std::iter::repeat('\n').take(breaks));
            }
            newline_run = 0;
            verbatim_gap = false;
            result.push_str(line);
        }
        result
    }
}

/// Serialize the children of `handle`, like the browser's `innerHTML`.
pub fn inner_html(handle: &Handle) -> std::io::Result<String> {
    let mut output = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::ChildrenOnly(None),
        ..Default::default()
    };
    let serializable = SerializableHandle::from(handle.clone());
    serialize(&mut output, &serializable, opts)?;
    String::from_utf8(output).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}
