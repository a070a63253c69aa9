//! Format trait definition
//!
//! Every input or output representation of a conversation implements
//! [`Format`]. Parsing turns a source document into a [`Transcript`];
//! serialization turns a transcript into an artifact. A format may support
//! either direction or both.

use crate::error::ExportError;
use crate::extract::ExtractSelectors;
use crate::normalize::RichTextNormalizer;
use crate::render::{PageGeometry, RenderStyle};
use crate::transcript::Transcript;
use std::collections::HashMap;

/// Serialized output produced by a [`Format`] implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerializedDocument {
    /// UTF-8 text output (e.g. JSON)
    Text(String),
    /// Binary output (e.g. PDF)
    Binary(Vec<u8>),
}

impl SerializedDocument {
    /// Consume the serialized output and return the underlying bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            SerializedDocument::Text(text) => text.into_bytes(),
            SerializedDocument::Binary(bytes) => bytes,
        }
    }
}

/// Inputs for parsing a source document.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    pub selectors: ExtractSelectors,
    /// Source address to record instead of the one found in the document.
    pub url: Option<String>,
}

/// Everything a serializer may need besides the transcript itself.
pub struct ExportContext<'a> {
    /// Sanitized conversation title.
    pub title: String,
    /// Generation date shown in document headers.
    pub generated_on: String,
    pub style: &'a RenderStyle,
    pub page: PageGeometry,
    pub normalizer: &'a dyn RichTextNormalizer,
    /// Format specific `--extra-<key>` parameters.
    pub options: HashMap<String, String>,
}

impl<'a> ExportContext<'a> {
    pub fn new(
        title: impl Into<String>,
        style: &'a RenderStyle,
        normalizer: &'a dyn RichTextNormalizer,
    ) -> Self {
        Self {
            title: title.into(),
            generated_on: chrono::Local::now().format("%-m/%-d/%Y").to_string(),
            style,
            page: PageGeometry::default(),
            normalizer,
            options: HashMap::new(),
        }
    }

    pub fn with_page(mut self, page: PageGeometry) -> Self {
        self.page = page;
        self
    }

    pub fn with_generated_on(mut self, date: impl Into<String>) -> Self {
        self.generated_on = date.into();
        self
    }

    pub fn with_options(mut self, options: HashMap<String, String>) -> Self {
        self.options = options;
        self
    }
}

/// Trait for conversation formats
pub trait Format: Send + Sync {
    /// The name of this format (e.g. "html", "json", "pdf")
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// File extensions without the leading dot, used for format detection.
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    /// MIME type of serialized artifacts.
    fn mime_type(&self) -> &str {
        "application/octet-stream"
    }

    /// Whether this format supports parsing (source → Transcript)
    fn supports_parsing(&self) -> bool {
        false
    }

    /// Whether this format supports serialization (Transcript → artifact)
    fn supports_serialization(&self) -> bool {
        false
    }

    fn parse(&self, _source: &str, _options: &ParseOptions) -> Result<Transcript, ExportError> {
        Err(ExportError::Unsupported(format!(
            "Format '{}' does not support parsing",
            self.name()
        )))
    }

    fn serialize(
        &self,
        _transcript: &Transcript,
        _context: &ExportContext<'_>,
    ) -> Result<SerializedDocument, ExportError> {
        Err(ExportError::Unsupported(format!(
            "Format '{}' does not support serialization",
            self.name()
        )))
    }
}

/// Read a boolean `--extra-<key>` value. A bare flag means `true`.
pub fn parse_bool_option(
    options: &HashMap<String, String>,
    key: &str,
    default: bool,
) -> Result<bool, ExportError> {
    match options.get(key) {
        None => Ok(default),
        Some(value) if value.is_empty() => Ok(true),
        Some(value) => match value.to_lowercase().as_str() {
            "true" | "1" | "yes" | "y" => Ok(true),
            "false" | "0" | "no" | "n" => Ok(false),
            other => Err(ExportError::Unsupported(format!(
                "Invalid boolean value '{other}' for --extra-{key}"
            ))),
        },
    }
}
