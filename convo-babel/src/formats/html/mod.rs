//! Share page input
//!
//! Parsing only. The page is located with [`ParseOptions::selectors`]; see
//! [`HtmlTranscriptExtractor`] for the extraction rules.

use crate::error::ExportError;
use crate::extract::{HtmlTranscriptExtractor, TranscriptExtractor};
use crate::format::{Format, ParseOptions};
use crate::transcript::Transcript;

#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlFormat;

impl Format for HtmlFormat {
    fn name(&self) -> &str {
        "html"
    }

    fn description(&self) -> &str {
        "Saved conversation share page"
    }

    fn file_extensions(&self) -> &[&str] {
        &["html", "htm"]
    }

    fn mime_type(&self) -> &str {
        "text/html"
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn parse(&self, source: &str, options: &ParseOptions) -> Result<Transcript, ExportError> {
        let mut extractor =
            HtmlTranscriptExtractor::new(source).with_selectors(options.selectors.clone());
        if let Some(url) = &options.url {
            extractor = extractor.with_url(url.clone());
        }
        extractor.extract()
    }
}
