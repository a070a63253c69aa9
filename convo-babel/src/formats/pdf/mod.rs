//! Rendered PDF export
//!
//! The transcript goes through [`DocumentRenderer`] onto a [`PageCanvas`];
//! the recorded pages are then written out by [`assembler::assemble`] using
//! the base-14 Type1 fonts, so no font files are embedded.
//!
//! Extra parameters:
//!
//! - `--extra-page-size letter|a4`: page size; defaults to the configured page
//! - `--extra-compress <bool>`: compress content streams (default on)

pub mod assembler;

use crate::error::ExportError;
use crate::format::{parse_bool_option, ExportContext, Format, SerializedDocument};
use crate::render::{Canvas, DocumentHeader, DocumentRenderer, PageCanvas, PageGeometry};
use crate::transcript::Transcript;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Default, Clone, Copy)]
pub struct PdfFormat;

impl PdfFormat {
    pub fn new() -> Self {
        Self
    }
}

impl Format for PdfFormat {
    fn name(&self) -> &str {
        "pdf"
    }

    fn description(&self) -> &str {
        "Paginated PDF rendering of the conversation"
    }

    fn file_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    fn mime_type(&self) -> &str {
        "application/pdf"
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(
        &self,
        transcript: &Transcript,
        context: &ExportContext<'_>,
    ) -> Result<SerializedDocument, ExportError> {
        let page = PageSize::from_options(&context.options)?.geometry(context.page);
        let compress = parse_bool_option(&context.options, "compress", true)?;

        let mut canvas = PageCanvas::new(page, context.style.body());
        let renderer = DocumentRenderer::new(context.style, context.normalizer);
        let header = DocumentHeader {
            title: &context.title,
            url: &transcript.url,
            generated_on: &context.generated_on,
        };
        let report = renderer.render_document(&mut canvas, &header, &transcript.turns)?;
        for (index, error) in &report.recovered {
            debug!("Message {} rendered as plain text: {}", index, error);
        }

        let pages = canvas.finish();
        let bytes = assembler::assemble(&pages, page, &context.title, compress)?;
        Ok(SerializedDocument::Binary(bytes))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PageSize {
    Configured,
    Letter,
    A4,
}

impl PageSize {
    fn from_options(options: &HashMap<String, String>) -> Result<Self, ExportError> {
        match options.get("page-size").map(|v| v.to_ascii_lowercase()) {
            None => Ok(PageSize::Configured),
            Some(value) => match value.as_str() {
                "letter" => Ok(PageSize::Letter),
                "a4" => Ok(PageSize::A4),
                other => Err(ExportError::Unsupported(format!(
                    "Unknown page size '{other}' (expected letter or a4)"
                ))),
            },
        }
    }

    /// Page to lay out on, keeping the configured margin.
    fn geometry(&self, configured: PageGeometry) -> PageGeometry {
        match self {
            PageSize::Configured => configured,
            PageSize::Letter => PageGeometry {
                margin: configured.margin,
                ..PageGeometry::LETTER
            },
            PageSize::A4 => PageGeometry {
                width: 595.28,
                height: 841.89,
                margin: configured.margin,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::HtmlToMarkdown;
    use crate::render::RenderStyle;
    use crate::transcript::Turn;
    use lopdf::Document;

    fn render(transcript: &Transcript, options: HashMap<String, String>) -> Vec<u8> {
        let style = RenderStyle::default();
        let normalizer = HtmlToMarkdown::new();
        let context = ExportContext::new("chat", &style, &normalizer)
            .with_generated_on("1/2/2026")
            .with_options(options);
        PdfFormat.serialize(transcript, &context).unwrap().into_bytes()
    }

    fn media_box(bytes: &[u8]) -> Vec<f32> {
        let doc = Document::load_mem(bytes).unwrap();
        let pages_id = doc
            .catalog()
            .unwrap()
            .get(b"Pages")
            .unwrap()
            .as_reference()
            .unwrap();
        doc.get_dictionary(pages_id)
            .unwrap()
            .get(b"MediaBox")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o.as_float().unwrap())
            .collect()
    }

    fn transcript() -> Transcript {
        Transcript {
            title: "chat".to_string(),
            url: "https://g.co/share/1".to_string(),
            turns: vec![
                Turn::user("Hello"),
                Turn::assistant("Hi there", Some("<p>Hi <b>there</b></p>".to_string())),
            ],
        }
    }

    #[test]
    fn renders_letter_by_default() {
        let bytes = render(&transcript(), HashMap::new());
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(media_box(&bytes), vec![0.0, 0.0, 612.0, 792.0]);
    }

    #[test]
    fn a4_option() {
        let mut options = HashMap::new();
        options.insert("page-size".to_string(), "A4".to_string());
        let bytes = render(&transcript(), options);
        let mb = media_box(&bytes);
        assert!((mb[2] - 595.28).abs() < 0.01);
        assert!((mb[3] - 841.89).abs() < 0.01);
    }

    #[test]
    fn unknown_page_size_is_rejected() {
        let mut options = HashMap::new();
        options.insert("page-size".to_string(), "tabloid".to_string());
        let style = RenderStyle::default();
        let normalizer = HtmlToMarkdown::new();
        let context = ExportContext::new("chat", &style, &normalizer).with_options(options);
        assert!(matches!(
            PdfFormat.serialize(&transcript(), &context),
            Err(ExportError::Unsupported(_))
        ));
    }

    #[test]
    fn long_conversation_spans_pages() {
        let turns = (0..80)
            .map(|i| Turn::user(format!("Question number {i}")))
            .collect();
        let transcript = Transcript {
            turns,
            ..Transcript::default()
        };
        let bytes = render(&transcript, HashMap::new());
        let doc = Document::load_mem(&bytes).unwrap();
        assert!(doc.get_pages().len() > 1);
    }
}
