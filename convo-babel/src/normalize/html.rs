//! HTML → markdown conversion
//!
//! Pipeline: HTML string → RcDom → Comrak AST → markdown string
//!
//! The DOM is walked once and mirrored into comrak nodes; `format_commonmark`
//! then takes care of escaping and GFM table layout. Block-level children
//! start new blocks, runs of inline content are wrapped into paragraphs.
//!
//! Element mapping:
//!
//! - `p`, `h1`–`h6`, `blockquote`, `hr`, `pre` map to their markdown block
//! - `ul`/`ol` (honouring `start`) map to lists; a checkbox input marks a task item
//! - `table` becomes a pipe table, the first row being the header
//! - `strong`/`b`, `em`/`i`, `del`/`s`, `code`, `a`, `img`, `br` map inline
//! - `div`, `section` and unknown elements are transparent

use super::RichTextNormalizer;
use crate::dom::{self, attr, children, classes, is_element, text_content};
use comrak::nodes::{
    Ast, AstNode, ListDelimType, ListType, NodeCode, NodeCodeBlock, NodeHeading, NodeLink,
    NodeList, NodeTable, NodeValue, TableAlignment,
};
use comrak::{format_commonmark, Arena, ComrakOptions};
use markup5ever_rcdom::{Handle, NodeData};
use std::cell::RefCell;
use tracing::{debug, warn};

/// Never contribute text.
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "template", "noscript", "button", "input", "svg", "head",
];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "details", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main",
    "nav", "ol", "p", "pre", "section", "summary", "table", "ul",
];

/// Turndown-style converter from chat HTML to GFM markdown.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlToMarkdown;

impl HtmlToMarkdown {
    pub fn new() -> Self {
        Self
    }
}

impl RichTextNormalizer for HtmlToMarkdown {
    fn convert(&self, markup: &str) -> String {
        if markup.trim().is_empty() {
            return String::new();
        }

        let parsed = dom::parse_html(markup);
        let Some(body) = dom::descendant_elements(&parsed.document)
            .into_iter()
            .find(|h| is_element(h, "body"))
        else {
            return String::new();
        };

        let arena = Arena::new();
        let root = new_node(&arena, NodeValue::Document);
        append_blocks(&arena, root, &body);
        tidy(root);

        match render_markdown(root) {
            Ok(markdown) => {
                debug!(
                    "Normalized {} bytes of markup into {} bytes of markdown",
                    markup.len(),
                    markdown.len()
                );
                markdown
            }
            Err(e) => {
                warn!("Markdown rendering failed: {e}");
                String::new()
            }
        }
    }
}

fn comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.tasklist = true;
    options
}

fn render_markdown<'a>(root: &'a AstNode<'a>) -> std::io::Result<String> {
    let mut output = Vec::new();
    format_commonmark(root, &comrak_options(), &mut output)?;
    let markdown = String::from_utf8(output)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    // Comrak separates adjacent lists with a marker comment
    Ok(markdown
        .replace("<!-- end list -->\n\n", "")
        .trim_end()
        .to_string())
}

fn new_node<'a>(arena: &'a Arena<AstNode<'a>>, value: NodeValue) -> &'a AstNode<'a> {
    arena.alloc(AstNode::new(RefCell::new(Ast::new(value, (0, 0).into()))))
}

fn tag_of(handle: &Handle) -> Option<String> {
    dom::element_name(handle)
}

fn is_block(handle: &Handle) -> bool {
    let Some(tag) = tag_of(handle) else {
        return false;
    };
    if BLOCK_TAGS.contains(&tag.as_str()) {
        return true;
    }
    // Custom elements wrap whole blocks in chat UIs (code-block, table-block).
    tag.contains('-')
        && dom::descendant_elements(handle)
            .iter()
            .filter_map(tag_of)
            .any(|t| BLOCK_TAGS.contains(&t.as_str()))
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !previous_space {
                out.push(' ');
            }
            previous_space = true;
        } else {
            out.push(c);
            previous_space = false;
        }
    }
    out
}

fn ends_with_space<'a>(node: &'a AstNode<'a>) -> bool {
    match node.last_child() {
        Some(last) => match &last.data.borrow().value {
            NodeValue::Text(text) => text.ends_with(' '),
            _ => false,
        },
        None => true,
    }
}

fn append_text<'a>(arena: &'a Arena<AstNode<'a>>, parent: &'a AstNode<'a>, raw: &str) {
    let collapsed = collapse_whitespace(raw);
    let text = if ends_with_space(parent) {
        collapsed.trim_start()
    } else {
        collapsed.as_str()
    };
    if !text.is_empty() {
        parent.append(new_node(arena, NodeValue::Text(text.to_string())));
    }
}

/// Append the children of `element` as blocks of `parent`.
fn append_blocks<'a>(arena: &'a Arena<AstNode<'a>>, parent: &'a AstNode<'a>, element: &Handle) {
    let mut paragraph: Option<&'a AstNode<'a>> = None;

    for child in element.children.borrow().iter() {
        match &child.data {
            NodeData::Text { contents } => {
                let text = contents.borrow();
                if text.trim().is_empty() {
                    // Separates inline siblings, never starts a paragraph
                    if let Some(open) = paragraph {
                        append_text(arena, open, " ");
                    }
                    continue;
                }
                let open = open_paragraph(arena, parent, &mut paragraph);
                append_text(arena, open, &text);
            }
            NodeData::Element { .. } => {
                let tag = tag_of(child).unwrap_or_default();
                if SKIPPED_TAGS.contains(&tag.as_str()) {
                    continue;
                }
                if is_block(child) {
                    paragraph = None;
                    append_block(arena, parent, child, &tag);
                } else {
                    let open = open_paragraph(arena, parent, &mut paragraph);
                    append_inline(arena, open, child);
                }
            }
            _ => {}
        }
    }
}

fn open_paragraph<'a>(
    arena: &'a Arena<AstNode<'a>>,
    parent: &'a AstNode<'a>,
    paragraph: &mut Option<&'a AstNode<'a>>,
) -> &'a AstNode<'a> {
    *paragraph.get_or_insert_with(|| {
        let node = new_node(arena, NodeValue::Paragraph);
        parent.append(node);
        node
    })
}

fn append_block<'a>(
    arena: &'a Arena<AstNode<'a>>,
    parent: &'a AstNode<'a>,
    element: &Handle,
    tag: &str,
) {
    match tag {
        "p" => {
            let node = new_node(arena, NodeValue::Paragraph);
            parent.append(node);
            append_inlines(arena, node, element);
        }
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = tag[1..].parse::<u8>().unwrap_or(1);
            let node = new_node(
                arena,
                NodeValue::Heading(NodeHeading {
                    level,
                    setext: false,
                }),
            );
            parent.append(node);
            append_inlines(arena, node, element);
        }
        "ul" => append_list(arena, parent, element, false),
        "ol" => append_list(arena, parent, element, true),
        "pre" => append_code_block(arena, parent, element),
        "blockquote" => {
            let node = new_node(arena, NodeValue::BlockQuote);
            parent.append(node);
            append_blocks(arena, node, element);
        }
        "hr" => parent.append(new_node(arena, NodeValue::ThematicBreak)),
        "table" => append_table(arena, parent, element),
        _ => append_blocks(arena, parent, element),
    }
}

fn append_list<'a>(
    arena: &'a Arena<AstNode<'a>>,
    parent: &'a AstNode<'a>,
    element: &Handle,
    ordered: bool,
) {
    let start = if ordered {
        attr(element, "start")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(1)
    } else {
        1
    };
    let list = NodeList {
        list_type: if ordered {
            ListType::Ordered
        } else {
            ListType::Bullet
        },
        marker_offset: 0,
        padding: 0,
        start,
        delimiter: ListDelimType::Period,
        bullet_char: b'-',
        tight: true,
    };

    let list_node = new_node(arena, NodeValue::List(list));
    parent.append(list_node);

    for item in children(element)
        .into_iter()
        .filter(|c| is_element(c, "li"))
    {
        let value = match task_state(&item) {
            Some(checked) => NodeValue::TaskItem(checked.then_some('x')),
            None => NodeValue::Item(list),
        };
        let item_node = new_node(arena, value);
        list_node.append(item_node);
        append_blocks(arena, item_node, &item);
    }

    if list_node.first_child().is_none() {
        list_node.detach();
    }
}

/// Checkbox state when the item leads with `<input type="checkbox">`.
fn task_state(item: &Handle) -> Option<bool> {
    children(item)
        .into_iter()
        .find(|c| matches!(c.data, NodeData::Element { .. }))
        .filter(|c| {
            is_element(c, "input")
                && attr(c, "type").is_some_and(|t| t.eq_ignore_ascii_case("checkbox"))
        })
        .map(|input| attr(&input, "checked").is_some())
}

fn language_of(handle: &Handle) -> Option<String> {
    classes(handle).into_iter().find_map(|class| {
        class
            .strip_prefix("language-")
            .or_else(|| class.strip_prefix("lang-"))
            .map(str::to_string)
    })
}

fn append_code_block<'a>(arena: &'a Arena<AstNode<'a>>, parent: &'a AstNode<'a>, pre: &Handle) {
    let info = children(pre)
        .iter()
        .find(|c| is_element(c, "code"))
        .and_then(language_of)
        .or_else(|| language_of(pre))
        .unwrap_or_default();

    let mut literal = text_content(pre);
    if !literal.ends_with('\n') {
        literal.push('\n');
    }

    parent.append(new_node(
        arena,
        NodeValue::CodeBlock(NodeCodeBlock {
            fenced: true,
            fence_char: b'`',
            fence_length: 3,
            fence_offset: 0,
            info,
            literal,
        }),
    ));
}

fn table_rows(table: &Handle) -> Vec<Vec<Handle>> {
    let mut rows = Vec::new();
    for child in children(table) {
        if is_element(&child, "tr") {
            rows.push(child);
        } else if ["thead", "tbody", "tfoot"].iter().any(|t| is_element(&child, t)) {
            rows.extend(children(&child).into_iter().filter(|r| is_element(r, "tr")));
        }
    }

    rows.iter()
        .map(|row| {
            children(row)
                .into_iter()
                .filter(|c| is_element(c, "td") || is_element(c, "th"))
                .collect::<Vec<_>>()
        })
        .filter(|cells| !cells.is_empty())
        .collect()
}

fn append_table<'a>(arena: &'a Arena<AstNode<'a>>, parent: &'a AstNode<'a>, table: &Handle) {
    let rows = table_rows(table);
    let num_columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    if num_columns == 0 {
        return;
    }

    let table_node = new_node(
        arena,
        NodeValue::Table(NodeTable {
            alignments: vec![TableAlignment::None; num_columns],
            num_columns,
            num_rows: rows.len(),
            num_nonempty_cells: 0,
        }),
    );
    parent.append(table_node);

    for (index, cells) in rows.iter().enumerate() {
        let row_node = new_node(arena, NodeValue::TableRow(index == 0));
        table_node.append(row_node);
        for column in 0..num_columns {
            let cell_node = new_node(arena, NodeValue::TableCell);
            row_node.append(cell_node);
            if let Some(cell) = cells.get(column) {
                append_inlines(arena, cell_node, cell);
            }
        }
    }
}

/// Append the children of `element` as inline content of `parent`.
fn append_inlines<'a>(arena: &'a Arena<AstNode<'a>>, parent: &'a AstNode<'a>, element: &Handle) {
    for child in element.children.borrow().iter() {
        match &child.data {
            NodeData::Text { contents } => append_text(arena, parent, &contents.borrow()),
            NodeData::Element { .. } => append_inline(arena, parent, child),
            _ => {}
        }
    }
}

fn append_wrapped<'a>(
    arena: &'a Arena<AstNode<'a>>,
    parent: &'a AstNode<'a>,
    element: &Handle,
    value: NodeValue,
) {
    let node = new_node(arena, value);
    parent.append(node);
    append_inlines(arena, node, element);
}

fn append_inline<'a>(arena: &'a Arena<AstNode<'a>>, parent: &'a AstNode<'a>, element: &Handle) {
    let tag = tag_of(element).unwrap_or_default();
    match tag.as_str() {
        t if SKIPPED_TAGS.contains(&t) => {}
        "br" => parent.append(new_node(arena, NodeValue::LineBreak)),
        "strong" | "b" => append_wrapped(arena, parent, element, NodeValue::Strong),
        "em" | "i" => append_wrapped(arena, parent, element, NodeValue::Emph),
        "del" | "s" | "strike" => append_wrapped(arena, parent, element, NodeValue::Strikethrough),
        "code" => {
            let literal = collapse_whitespace(&text_content(element));
            if !literal.is_empty() {
                parent.append(new_node(
                    arena,
                    NodeValue::Code(NodeCode {
                        num_backticks: 1,
                        literal,
                    }),
                ));
            }
        }
        "a" => match attr(element, "href").filter(|href| !href.is_empty()) {
            Some(url) => {
                let title = attr(element, "title").unwrap_or_default();
                append_wrapped(arena, parent, element, NodeValue::Link(NodeLink { url, title }));
            }
            None => append_inlines(arena, parent, element),
        },
        "img" => {
            let url = attr(element, "src").unwrap_or_default();
            let title = attr(element, "title").unwrap_or_default();
            let alt = attr(element, "alt").unwrap_or_default();
            let node = new_node(arena, NodeValue::Image(NodeLink { url, title }));
            parent.append(node);
            if !alt.is_empty() {
                node.append(new_node(arena, NodeValue::Text(alt)));
            }
        }
        _ => append_inlines(arena, parent, element),
    }
}

/// Trim whitespace at the edges of inline containers and drop empty paragraphs.
fn tidy<'a>(node: &'a AstNode<'a>) {
    let kids: Vec<_> = node.children().collect();
    for child in kids {
        tidy(child);
    }

    let (inline_container, paragraph) = match node.data.borrow().value {
        NodeValue::Paragraph => (true, true),
        NodeValue::Heading(_) | NodeValue::TableCell => (true, false),
        _ => (false, false),
    };
    if !inline_container {
        return;
    }

    while let Some(leaf) = node.descendants().skip(1).find(|n| n.first_child().is_none()) {
        if !trim_leaf(leaf, str::trim_start) {
            break;
        }
    }
    while let Some(leaf) = node
        .descendants()
        .skip(1)
        .filter(|n| n.first_child().is_none())
        .last()
    {
        if !trim_leaf(leaf, str::trim_end) {
            break;
        }
    }

    if paragraph && node.first_child().is_none() {
        node.detach();
    }
}

/// Trim an edge leaf. Returns true while there may be more to trim.
fn trim_leaf<'a>(leaf: &'a AstNode<'a>, trim: fn(&str) -> &str) -> bool {
    let detach = {
        let mut data = leaf.data.borrow_mut();
        match &mut data.value {
            NodeValue::Text(text) => {
                let trimmed = trim(text).to_string();
                if trimmed.is_empty() {
                    true
                } else if trimmed.len() != text.len() {
                    *text = trimmed;
                    return true;
                } else {
                    return false;
                }
            }
            NodeValue::Strong | NodeValue::Emph | NodeValue::Strikethrough => true,
            _ => return false,
        }
    };
    if detach {
        leaf.detach();
    }
    detach
}
