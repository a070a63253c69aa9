//! Conversation data export
//!
//! The document is `{ "title", "url", "messages": [{ "role", "content" }] }`,
//! keys in that order, pretty printed with two-space indentation. `content`
//! is the plain text of the turn, byte for byte; markup is not exported.
//! Parsing reads the same shape back (see [`JsonTranscriptExtractor`]).

use crate::error::ExportError;
use crate::extract::{JsonTranscriptExtractor, TranscriptExtractor};
use crate::format::{ExportContext, Format, ParseOptions, SerializedDocument};
use crate::transcript::{Role, Transcript};
use serde::Serialize;

#[derive(Serialize)]
struct ConversationDocument<'a> {
    title: &'a str,
    url: &'a str,
    messages: Vec<MessageEntry<'a>>,
}

#[derive(Serialize)]
struct MessageEntry<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFormat;

impl Format for JsonFormat {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Conversation data as JSON"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn mime_type(&self) -> &str {
        "application/json"
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str, _options: &ParseOptions) -> Result<Transcript, ExportError> {
        JsonTranscriptExtractor::new(source).extract()
    }

    fn serialize(
        &self,
        transcript: &Transcript,
        context: &ExportContext<'_>,
    ) -> Result<SerializedDocument, ExportError> {
        let document = ConversationDocument {
            title: &context.title,
            url: &transcript.url,
            messages: transcript
                .turns
                .iter()
                .map(|turn| MessageEntry {
                    role: turn.role,
                    content: &turn.text,
                })
                .collect(),
        };

        serde_json::to_string_pretty(&document)
            .map(SerializedDocument::Text)
            .map_err(|e| ExportError::StreamFinalize {
                reason: format!("cannot encode conversation JSON: {e}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::HtmlToMarkdown;
    use crate::render::RenderStyle;
    use crate::transcript::Turn;

    fn export(transcript: &Transcript, title: &str) -> String {
        let style = RenderStyle::default();
        let normalizer = HtmlToMarkdown::new();
        let context = ExportContext::new(title, &style, &normalizer);
        match JsonFormat.serialize(transcript, &context).unwrap() {
            SerializedDocument::Text(text) => text,
            SerializedDocument::Binary(_) => panic!("json export must be text"),
        }
    }

    #[test]
    fn keys_in_order_with_two_space_indent() {
        let transcript = Transcript {
            title: "My chat".to_string(),
            url: "https://g.co/share/1".to_string(),
            turns: vec![
                Turn::user("Hello"),
                Turn::assistant("Hi there", Some("<p>Hi <b>there</b></p>".to_string())),
            ],
        };
        let json = export(&transcript, "My_chat");
        assert_eq!(
            json,
            r#"{
  "title": "My_chat",
  "url": "https://g.co/share/1",
  "messages": [
    {
      "role": "user",
      "content": "Hello"
    },
    {
      "role": "assistant",
      "content": "Hi there"
    }
  ]
}"#
        );
    }

    #[test]
    fn content_is_verbatim() {
        let text = "line one\n\n  indented `code` & <tags> \u{00e9}";
        let transcript = Transcript {
            turns: vec![Turn::user(text)],
            ..Transcript::default()
        };
        let json = export(&transcript, "t");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["messages"][0]["content"], text);
    }

    #[test]
    fn exported_document_parses_back() {
        let transcript = Transcript {
            title: "t".to_string(),
            url: "u".to_string(),
            turns: vec![Turn::user("q"), Turn::assistant("a", None)],
        };
        let json = export(&transcript, "t");
        let parsed = JsonFormat.parse(&json, &ParseOptions::default()).unwrap();
        assert_eq!(parsed, transcript);
    }
}
