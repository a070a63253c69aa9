//! Re-reading exported JSON data files.

use super::TranscriptExtractor;
use crate::error::ExportError;
use crate::transcript::{Role, Transcript, Turn};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct ExportedConversation {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    messages: Vec<ExportedMessage>,
}

#[derive(Debug, Deserialize)]
struct ExportedMessage {
    role: Role,
    content: String,
}

/// Reads the `{ title, url, messages }` document written by the json format.
///
/// The export keeps plain text only, so assistant turns come back without
/// markup and render from their text.
#[derive(Debug, Clone)]
pub struct JsonTranscriptExtractor {
    source: String,
    path: Option<PathBuf>,
}

impl JsonTranscriptExtractor {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            path: None,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ExportError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ExportError::Input {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            source,
            path: Some(path.to_path_buf()),
        })
    }
}

impl TranscriptExtractor for JsonTranscriptExtractor {
    fn extract(&self) -> Result<Transcript, ExportError> {
        let exported: ExportedConversation =
            serde_json::from_str(&self.source).map_err(|e| ExportError::Input {
                path: self.path.clone().unwrap_or_default(),
                reason: format!("invalid conversation JSON: {e}"),
            })?;

        let turns = exported
            .messages
            .into_iter()
            .map(|m| match m.role {
                Role::User => Turn::user(m.content),
                Role::Assistant => Turn::assistant(m.content, None),
            })
            .collect();

        Ok(Transcript {
            title: exported.title,
            url: exported.url,
            turns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_exported_document() {
        let source = r#"{
  "title": "chat",
  "url": "https://example.com",
  "messages": [
    { "role": "user", "content": "Hello" },
    { "role": "assistant", "content": "Hi there" }
  ]
}"#;
        let transcript = JsonTranscriptExtractor::new(source).extract().unwrap();
        assert_eq!(transcript.title, "chat");
        assert_eq!(
            transcript.turns,
            vec![Turn::user("Hello"), Turn::assistant("Hi there", None)]
        );
    }

    #[test]
    fn unknown_role_is_an_input_error() {
        let source = r#"{"messages": [{"role": "system", "content": "x"}]}"#;
        let err = JsonTranscriptExtractor::new(source).extract().unwrap_err();
        match err {
            ExportError::Input { reason, .. } => assert!(reason.contains("invalid")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_title_and_url_default_to_empty() {
        let transcript = JsonTranscriptExtractor::new(r#"{"messages": []}"#)
            .extract()
            .unwrap();
        assert!(transcript.is_empty());
        assert_eq!(transcript.url, "");
    }
}
