//! Transcript extraction
//!
//! An extractor yields the ordered turns of one conversation together with its
//! title and source address. Two sources are supported:
//!
//! - [`HtmlTranscriptExtractor`]: a saved share page, located with CSS selectors
//! - [`JsonTranscriptExtractor`]: a previously exported JSON data file
//!
//! Finding no turns is not an error here. The exporter decides what an empty
//! transcript means; extractors only fail on unreadable or undecodable input.

mod html;
mod json;

pub use html::{ExtractSelectors, HtmlTranscriptExtractor};
pub use json::JsonTranscriptExtractor;

use crate::error::ExportError;
use crate::transcript::Transcript;

pub trait TranscriptExtractor {
    fn extract(&self) -> Result<Transcript, ExportError>;
}

/// An already extracted transcript, e.g. built in memory by a caller.
impl TranscriptExtractor for Transcript {
    fn extract(&self) -> Result<Transcript, ExportError> {
        Ok(self.clone())
    }
}
