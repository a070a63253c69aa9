//! Markdown → block tokens
//!
//! Pipeline: Markdown string → Comrak AST → flat [`Token`] sequence.
//!
//! Comrak never rejects input, but a panic inside the parser must not take the
//! export down with it: tokenizing degrades to a single paragraph holding the
//! raw source instead.

use super::token::{ListItem, Token};
use comrak::nodes::{AstNode, ListType, NodeValue};
use comrak::{parse_document, Arena, ComrakOptions};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// Tokenize a markdown string. Never fails; empty input yields no tokens.
pub fn tokenize(source: &str) -> Vec<Token> {
    if source.is_empty() {
        return Vec::new();
    }

    match panic::catch_unwind(AssertUnwindSafe(|| tokenize_with_comrak(source))) {
        Ok(tokens) => {
            debug!("Tokenized {} bytes into {} tokens", source.len(), tokens.len());
            tokens
        }
        Err(_) => {
            warn!("Markdown parser failed; degrading to a raw paragraph");
            vec![Token::Paragraph {
                text: source.to_string(),
            }]
        }
    }
}

fn default_comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options
}

fn tokenize_with_comrak(source: &str) -> Vec<Token> {
    let arena = Arena::new();
    let options = default_comrak_options();
    let root = parse_document(&arena, source, &options);

    let mut tokens = Vec::new();
    let mut previous_end: Option<usize> = None;

    for node in root.children() {
        let (start, end) = {
            let data = node.data.borrow();
            (data.sourcepos.start.line, data.sourcepos.end.line)
        };
        // Two or more blank lines between blocks surface as whitespace.
        if let Some(prev) = previous_end {
            if start > prev + 2 {
                tokens.push(Token::Space);
            }
        }
        previous_end = Some(end);

        collect_block(node, 0, &mut tokens);
    }

    tokens
}

/// Convert one top-level (or list-nested) block node into tokens.
fn collect_block<'a>(node: &'a AstNode<'a>, list_depth: usize, tokens: &mut Vec<Token>) {
    let value = node.data.borrow().value.clone();

    match value {
        NodeValue::Heading(heading) => tokens.push(Token::Heading {
            depth: heading.level,
            text: inline_text(node),
        }),

        NodeValue::Paragraph => tokens.push(Token::Paragraph {
            text: inline_text(node),
        }),

        NodeValue::List(_) => collect_list(node, list_depth, tokens),

        NodeValue::CodeBlock(code) => {
            let lang = code
                .info
                .split_whitespace()
                .next()
                .map(|s| s.to_string());
            tokens.push(Token::Code {
                lang,
                text: code.literal.trim_end_matches('\n').to_string(),
            });
        }

        NodeValue::BlockQuote => tokens.push(Token::Blockquote {
            text: block_text(node),
        }),

        NodeValue::Table(_) => {
            let (header, rows) = table_cells(node);
            tokens.push(Token::Table { header, rows });
        }

        NodeValue::ThematicBreak => tokens.push(Token::Rule),

        NodeValue::HtmlBlock(html) => tokens.push(Token::RawMarkup {
            text: html.literal.trim_end_matches('\n').to_string(),
        }),

        other => {
            let text = block_text(node);
            tokens.push(Token::Other {
                kind: node_kind(&other).to_string(),
                text: if text.trim().is_empty() {
                    None
                } else {
                    Some(text)
                },
            });
        }
    }
}

/// Flatten a (possibly nested) list into consecutive list tokens.
///
/// A nested list splits its parent: items before it form one token, the
/// nested list follows at `depth + 1`, and the remaining items continue with
/// the running `start` counter.
fn collect_list<'a>(node: &'a AstNode<'a>, depth: usize, tokens: &mut Vec<Token>) {
    let (ordered, start) = match &node.data.borrow().value {
        NodeValue::List(list) => (
            matches!(list.list_type, ListType::Ordered),
            if matches!(list.list_type, ListType::Ordered) {
                list.start
            } else {
                1
            },
        ),
        _ => return,
    };

    let mut pending: Vec<ListItem> = Vec::new();
    let mut run_start = start;
    let mut next_number = start;

    for item in node.children() {
        let checked = match &item.data.borrow().value {
            NodeValue::Item(_) => None,
            NodeValue::TaskItem(symbol) => Some(symbol.is_some()),
            _ => continue,
        };

        let mut parts = Vec::new();
        let mut nested = Vec::new();
        for child in item.children() {
            if matches!(child.data.borrow().value, NodeValue::List(_)) {
                nested.push(child);
            } else {
                let text = block_text(child);
                if !text.is_empty() {
                    parts.push(text);
                }
            }
        }

        pending.push(ListItem {
            text: parts.join("\n"),
            checked,
        });
        next_number += 1;

        if !nested.is_empty() {
            tokens.push(Token::List {
                ordered,
                start: run_start,
                depth,
                items: std::mem::take(&mut pending),
            });
            for child in nested {
                collect_list(child, depth + 1, tokens);
            }
            run_start = next_number;
        }
    }

    if !pending.is_empty() {
        tokens.push(Token::List {
            ordered,
            start: run_start,
            depth,
            items: pending,
        });
    }
}

fn table_cells<'a>(node: &'a AstNode<'a>) -> (Vec<String>, Vec<Vec<String>>) {
    let mut header = Vec::new();
    let mut rows = Vec::new();

    for row in node.children() {
        let is_header = match &row.data.borrow().value {
            NodeValue::TableRow(header) => *header,
            _ => continue,
        };
        let cells: Vec<String> = row.children().map(inline_text).collect();
        if is_header && header.is_empty() {
            header = cells;
        } else {
            rows.push(cells);
        }
    }

    (header, rows)
}

/// Visible text of a block and its descendants, blocks separated by newlines.
fn block_text<'a>(node: &'a AstNode<'a>) -> String {
    let value = node.data.borrow().value.clone();
    match value {
        NodeValue::Paragraph | NodeValue::Heading(_) | NodeValue::TableCell => inline_text(node),
        NodeValue::CodeBlock(code) => code.literal.trim_end_matches('\n').to_string(),
        NodeValue::HtmlBlock(html) => html.literal.trim_end_matches('\n').to_string(),
        NodeValue::FrontMatter(content) => content.trim().to_string(),
        NodeValue::Item(_) | NodeValue::TaskItem(_) => {
            let text = children_text(node);
            format!("- {text}")
        }
        _ => children_text(node),
    }
}

fn children_text<'a>(node: &'a AstNode<'a>) -> String {
    node.children()
        .map(block_text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Visible inline text of a node. Emphasis and links flatten to their text.
fn inline_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut out = String::new();
    for child in node.children() {
        collect_inline(child, &mut out);
    }
    out
}

fn collect_inline<'a>(node: &'a AstNode<'a>, out: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(text) => out.push_str(text),
        NodeValue::Code(code) => out.push_str(&code.literal),
        NodeValue::HtmlInline(html) => out.push_str(html),
        NodeValue::SoftBreak | NodeValue::LineBreak => out.push('\n'),
        _ => {
            for child in node.children() {
                collect_inline(child, out);
            }
        }
    }
}

fn node_kind(value: &NodeValue) -> &'static str {
    match value {
        NodeValue::FrontMatter(_) => "front_matter",
        NodeValue::DescriptionList => "description_list",
        NodeValue::FootnoteDefinition(_) => "footnote_definition",
        NodeValue::Document => "document",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_tokens() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn heading_depth_and_text() {
        let tokens = tokenize("## Setup *steps*\n");
        assert_eq!(
            tokens,
            vec![Token::Heading {
                depth: 2,
                text: "Setup steps".to_string()
            }]
        );
    }

    #[test]
    fn paragraph_flattens_inline_markup() {
        let tokens = tokenize("Hi **there** and `code` [link](http://x)\n");
        assert_eq!(
            tokens,
            vec![Token::Paragraph {
                text: "Hi there and code link".to_string()
            }]
        );
    }

    #[test]
    fn fenced_code_keeps_lines_and_language() {
        let tokens = tokenize("```rust\nfn main() {}\nlet x = 1;\n```\n");
        assert_eq!(
            tokens,
            vec![Token::Code {
                lang: Some("rust".to_string()),
                text: "fn main() {}\nlet x = 1;".to_string()
            }]
        );
    }

    #[test]
    fn ordered_list_keeps_start() {
        let tokens = tokenize("3. three\n4. four\n");
        assert_eq!(
            tokens,
            vec![Token::List {
                ordered: true,
                start: 3,
                depth: 0,
                items: vec![ListItem::plain("three"), ListItem::plain("four")],
            }]
        );
    }

    #[test]
    fn task_items_carry_checked_state() {
        let tokens = tokenize("- [x] done\n- [ ] todo\n");
        assert_eq!(
            tokens,
            vec![Token::List {
                ordered: false,
                start: 1,
                depth: 0,
                items: vec![ListItem::task("done", true), ListItem::task("todo", false)],
            }]
        );
    }

    #[test]
    fn nested_list_splits_parent_and_continues_numbering() {
        let md = "1. one\n   - inner\n2. two\n";
        let tokens = tokenize(md);
        assert_eq!(
            tokens,
            vec![
                Token::List {
                    ordered: true,
                    start: 1,
                    depth: 0,
                    items: vec![ListItem::plain("one")],
                },
                Token::List {
                    ordered: false,
                    start: 1,
                    depth: 1,
                    items: vec![ListItem::plain("inner")],
                },
                Token::List {
                    ordered: true,
                    start: 2,
                    depth: 0,
                    items: vec![ListItem::plain("two")],
                },
            ]
        );
    }

    #[test]
    fn table_header_and_rows() {
        let tokens = tokenize("| A | B |\n|---|---|\n| 1 | 2 |\n| 3 | 4 |\n");
        assert_eq!(
            tokens,
            vec![Token::Table {
                header: vec!["A".to_string(), "B".to_string()],
                rows: vec![
                    vec!["1".to_string(), "2".to_string()],
                    vec!["3".to_string(), "4".to_string()],
                ],
            }]
        );
    }

    #[test]
    fn rule_blockquote_and_html() {
        let tokens = tokenize("> quoted\n\n---\n\n<div>raw</div>\n");
        assert_eq!(
            tokens,
            vec![
                Token::Blockquote {
                    text: "quoted".to_string()
                },
                Token::Rule,
                Token::RawMarkup {
                    text: "<div>raw</div>".to_string()
                },
            ]
        );
    }

    #[test]
    fn wide_blank_gap_emits_space() {
        let tokens = tokenize("first\n\n\n\nsecond\n");
        assert_eq!(
            tokens,
            vec![
                Token::Paragraph {
                    text: "first".to_string()
                },
                Token::Space,
                Token::Paragraph {
                    text: "second".to_string()
                },
            ]
        );
    }

    #[test]
    fn single_blank_line_emits_no_space() {
        let tokens = tokenize("first\n\nsecond\n");
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn unterminated_fence_still_tokenizes() {
        let tokens = tokenize("```\nnever closed");
        assert_eq!(
            tokens,
            vec![Token::Code {
                lang: None,
                text: "never closed".to_string()
            }]
        );
    }
}
