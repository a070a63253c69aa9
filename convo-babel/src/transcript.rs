//! Conversation model shared by extractors, formats and the renderer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Label emitted in front of each rendered message.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User:",
            Role::Assistant => "Assistant:",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message of the conversation, in original order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    /// Plain text as displayed. Exported verbatim.
    pub text: String,
    /// Rich markup (HTML) the text was rendered from, when known.
    pub markup: Option<String>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            markup: None,
        }
    }

    pub fn assistant(text: impl Into<String>, markup: Option<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            markup,
        }
    }
}

/// Everything one extraction pass yields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    /// Raw conversation title, before sanitization.
    pub title: String,
    /// Address the conversation was captured from.
    pub url: String,
    pub turns: Vec<Turn>,
}

impl Transcript {
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
