//! Error types for export operations
//!
//! Two error types mirror the two failure scopes of an export:
//!
//! * [`ExportError`] is fatal for one download attempt. It is surfaced to the
//!   user and no artifact is delivered.
//! * [`RenderError`] is local to one message. The renderer recovers from it by
//!   substituting a fallback block, so it never escapes a document render.

use crate::dom::SelectorError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that halt an export attempt.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The extractor found no turns.
    #[error("No conversation data found")]
    ExtractionEmpty,

    /// A capability the requested export needs is not available in this build.
    #[error("Required capability '{0}' is not available")]
    DependencyUnavailable(String),

    /// The input document could not be read or decoded.
    #[error("Failed to read input '{path}': {reason}")]
    Input { path: PathBuf, reason: String },

    /// The output stream could not be finalized or written.
    #[error("Failed to finalize output: {reason}")]
    StreamFinalize { reason: String },

    /// Another export is still running on the same exporter.
    #[error("An export is already in progress")]
    Busy,

    /// A format was asked for a direction it does not implement.
    #[error("{0}")]
    Unsupported(String),

    /// A configured page selector could not be parsed.
    #[error(transparent)]
    Selector(#[from] SelectorError),

    /// Rendering failed outside of any single message (header or fallback).
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

/// Failures while laying out a single message body.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    /// The requested indent leaves no horizontal room for text.
    #[error("No room for text at indent {indent}pt (content width {available}pt)")]
    NoRoomForText { indent: f32, available: f32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_room_display_mentions_indent() {
        let e = RenderError::NoRoomForText {
            indent: 600.0,
            available: 512.0,
        };
        let msg = e.to_string();
        assert!(msg.contains("600"), "got: {msg}");
        assert!(msg.contains("512"), "got: {msg}");
    }

    #[test]
    fn render_error_converts_into_export_error() {
        let e: ExportError = RenderError::NoRoomForText {
            indent: 700.0,
            available: 512.0,
        }
        .into();
        assert!(matches!(e, ExportError::Render(_)));
        assert!(e.to_string().contains("700"));
    }

    #[test]
    fn extraction_empty_matches_user_notice() {
        assert_eq!(
            ExportError::ExtractionEmpty.to_string(),
            "No conversation data found"
        );
    }
}
