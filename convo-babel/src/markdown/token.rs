//! Block tokens produced by the tokenizer and consumed by the renderer.

use serde::Serialize;

/// A classified block of a message body.
///
/// Text fields hold plain content: inline emphasis, links and code spans are
/// flattened to their visible text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Token {
    Heading {
        depth: u8,
        text: String,
    },
    Paragraph {
        text: String,
    },
    /// A run of items at one nesting level. Nested lists follow as their own
    /// tokens with a greater depth.
    List {
        ordered: bool,
        start: usize,
        depth: usize,
        items: Vec<ListItem>,
    },
    Code {
        lang: Option<String>,
        text: String,
    },
    Blockquote {
        text: String,
    },
    Table {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Rule,
    /// Raw HTML block, never interpreted.
    RawMarkup {
        text: String,
    },
    Space,
    /// Anything the renderer has no dedicated rule for.
    Other {
        kind: String,
        text: Option<String>,
    },
}

impl Token {
    /// Short name used in logs and inspect output.
    pub fn kind(&self) -> &str {
        match self {
            Token::Heading { .. } => "heading",
            Token::Paragraph { .. } => "paragraph",
            Token::List { .. } => "list",
            Token::Code { .. } => "code",
            Token::Blockquote { .. } => "blockquote",
            Token::Table { .. } => "table",
            Token::Rule => "rule",
            Token::RawMarkup { .. } => "raw_markup",
            Token::Space => "space",
            Token::Other { kind, .. } => kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    pub text: String,
    /// `Some` for task items.
    pub checked: Option<bool>,
}

impl ListItem {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            checked: None,
        }
    }

    pub fn task(text: impl Into<String>, checked: bool) -> Self {
        Self {
            text: text.into(),
            checked: Some(checked),
        }
    }
}
