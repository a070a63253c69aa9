//! Share page extraction
//!
//! Each turn container holds at most one user query and one assistant
//! response. Turns are emitted in document order, user before assistant:
//!
//! - the user turn is the trimmed inner text of the query; empty queries are
//!   dropped
//! - the assistant turn keeps both the inner text and the inner HTML; it is
//!   dropped only when both are empty
//!
//! The page address comes from `<link rel="canonical">` or
//! `<meta property="og:url">` unless the caller supplies one.

use super::TranscriptExtractor;
use crate::dom::{self, attr, descendant_elements, inner_html, inner_text, is_element, Selector};
use crate::error::ExportError;
use crate::transcript::{Transcript, Turn};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Selectors locating the parts of a share page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractSelectors {
    pub turn: String,
    pub user_text: String,
    pub assistant: String,
    pub title: String,
}

impl Default for ExtractSelectors {
    fn default() -> Self {
        Self {
            turn: "share-turn-viewer".to_string(),
            user_text: "user-query .query-text".to_string(),
            assistant: "response-container message-content .markdown".to_string(),
            title: ".share-title-section h1".to_string(),
        }
    }
}

struct CompiledSelectors {
    turn: Selector,
    user_text: Selector,
    assistant: Selector,
    title: Selector,
}

impl CompiledSelectors {
    fn compile(selectors: &ExtractSelectors) -> Result<Self, ExportError> {
        Ok(Self {
            turn: Selector::parse(&selectors.turn)?,
            user_text: Selector::parse(&selectors.user_text)?,
            assistant: Selector::parse(&selectors.assistant)?,
            title: Selector::parse(&selectors.title)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct HtmlTranscriptExtractor {
    html: String,
    source: Option<PathBuf>,
    selectors: ExtractSelectors,
    url: Option<String>,
}

impl HtmlTranscriptExtractor {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            source: None,
            selectors: ExtractSelectors::default(),
            url: None,
        }
    }

    /// Read a saved page from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ExportError> {
        let path = path.as_ref();
        let html = std::fs::read_to_string(path).map_err(|e| ExportError::Input {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let mut extractor = Self::new(html);
        extractor.source = Some(path.to_path_buf());
        Ok(extractor)
    }

    pub fn with_selectors(mut self, selectors: ExtractSelectors) -> Self {
        self.selectors = selectors;
        self
    }

    /// Use `url` instead of the address found in the page.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    fn input_error(&self, reason: String) -> ExportError {
        ExportError::Input {
            path: self.source.clone().unwrap_or_default(),
            reason,
        }
    }
}

impl TranscriptExtractor for HtmlTranscriptExtractor {
    fn extract(&self) -> Result<Transcript, ExportError> {
        let selectors = CompiledSelectors::compile(&self.selectors)?;
        let document = dom::parse_html(&self.html);
        let root = &document.document;

        let containers = selectors.turn.query_all(root);
        let mut turns = Vec::new();

        for container in &containers {
            if let Some(query) = selectors.user_text.query_first(container) {
                let text = inner_text(&query);
                if !text.is_empty() {
                    turns.push(Turn::user(text));
                }
            }

            if let Some(response) = selectors.assistant.query_first(container) {
                let markup = inner_html(&response)
                    .map_err(|e| self.input_error(format!("cannot serialize response: {e}")))?
                    .trim()
                    .to_string();
                let text = inner_text(&response);
                if !markup.is_empty() || !text.is_empty() {
                    let markup = (!markup.is_empty()).then_some(markup);
                    turns.push(Turn::assistant(text, markup));
                }
            }
        }

        debug!(
            "Found {} turn containers with '{}'",
            containers.len(),
            selectors.turn.as_str()
        );
        if turns.is_empty() && !containers.is_empty() {
            warn!(
                "Turn containers found but no messages extracted; selectors may be outdated: user='{}', assistant='{}'",
                selectors.user_text.as_str(),
                selectors.assistant.as_str()
            );
        }

        let title = selectors
            .title
            .query_first(root)
            .map(|h| dom::text_content(&h).trim().to_string())
            .unwrap_or_default();

        let url = self
            .url
            .clone()
            .or_else(|| page_address(root))
            .unwrap_or_default();

        info!("Extracted {} messages from share page", turns.len());
        Ok(Transcript { title, url, turns })
    }
}

/// Canonical address declared by the page itself.
fn page_address(root: &markup5ever_rcdom::Handle) -> Option<String> {
    let elements = descendant_elements(root);

    let canonical = elements.iter().find_map(|e| {
        let is_canonical = is_element(e, "link")
            && attr(e, "rel").is_some_and(|rel| {
                rel.split_whitespace()
                    .any(|r| r.eq_ignore_ascii_case("canonical"))
            });
        if is_canonical {
            attr(e, "href")
        } else {
            None
        }
    });

    canonical
        .or_else(|| {
            elements.iter().find_map(|e| {
                if is_element(e, "meta") && attr(e, "property").as_deref() == Some("og:url") {
                    attr(e, "content")
                } else {
                    None
                }
            })
        })
        .filter(|url| !url.trim().is_empty())
}
