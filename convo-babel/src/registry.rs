//! Format registry for format discovery and selection
//!
//! Formats are registered under their name and looked up by name or by file
//! extension. Asking for a format that is not registered (unknown, or compiled
//! out through a cargo feature) yields [`ExportError::DependencyUnavailable`].

use crate::error::ExportError;
use crate::format::{ExportContext, Format, ParseOptions, SerializedDocument};
use crate::transcript::Transcript;
use std::collections::HashMap;

pub struct FormatRegistry {
    formats: HashMap<String, Box<dyn Format>>,
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        FormatRegistry {
            formats: HashMap::new(),
        }
    }

    /// Register a format, replacing any format of the same name.
    pub fn register<F: Format + 'static>(&mut self, format: F) {
        self.formats
            .insert(format.name().to_string(), Box::new(format));
    }

    pub fn get(&self, name: &str) -> Result<&dyn Format, ExportError> {
        self.formats
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| ExportError::DependencyUnavailable(format!("format '{name}'")))
    }

    pub fn has(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// All registered format names, sorted.
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formats.keys().cloned().collect();
        names.sort();
        names
    }

    /// Detect a format from the extension of `filename`.
    pub fn detect_format_from_filename(&self, filename: &str) -> Option<String> {
        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())?
            .to_ascii_lowercase();

        self.formats
            .values()
            .find(|format| format.file_extensions().contains(&extension.as_str()))
            .map(|format| format.name().to_string())
    }

    /// Parse a source document using the named format.
    pub fn parse(
        &self,
        source: &str,
        format: &str,
        options: &ParseOptions,
    ) -> Result<Transcript, ExportError> {
        let fmt = self.get(format)?;
        if !fmt.supports_parsing() {
            return Err(ExportError::Unsupported(format!(
                "Format '{format}' does not support parsing"
            )));
        }
        fmt.parse(source, options)
    }

    /// Serialize a transcript using the named format.
    pub fn serialize(
        &self,
        transcript: &Transcript,
        format: &str,
        context: &ExportContext<'_>,
    ) -> Result<SerializedDocument, ExportError> {
        let fmt = self.get(format)?;
        if !fmt.supports_serialization() {
            return Err(ExportError::Unsupported(format!(
                "Format '{format}' does not support serialization"
            )));
        }
        fmt.serialize(transcript, context)
    }

    /// Create a registry with the built-in formats
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(crate::formats::html::HtmlFormat);
        registry.register(crate::formats::json::JsonFormat);
        #[cfg(feature = "pdf-export")]
        registry.register(crate::formats::pdf::PdfFormat::default());

        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
