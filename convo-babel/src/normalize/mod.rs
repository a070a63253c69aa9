//! Rich markup → markdown
//!
//! Assistant turns carry the HTML the chat UI rendered. Before tokenizing, that
//! markup is normalized back into markdown so block structure (headings, lists,
//! code, tables) survives into the PDF.
//!
//! A normalizer is built once per process and shared by reference, so
//! implementations must be `Send + Sync` and stateless across calls.

mod html;

pub use html::HtmlToMarkdown;

/// Converts a turn's rich markup into markdown text.
///
/// Conversion never fails. An empty result means "nothing usable"; callers
/// fall back to the turn's plain text.
pub trait RichTextNormalizer: Send + Sync {
    fn convert(&self, markup: &str) -> String;
}

impl<F> RichTextNormalizer for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn convert(&self, markup: &str) -> String {
        self(markup)
    }
}
