//! Recorded pages → PDF bytes
//!
//! Canvas coordinates are top-down; PDF user space is bottom-up, so every
//! y is flipped against the page height here and nowhere else.

use crate::error::ExportError;
use crate::render::metrics::encode_win_ansi;
use crate::render::{DrawOp, Font, Page, PageGeometry, TextStyle};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::debug;

const PRODUCER: &str = "convo";

fn finalize_error(e: impl std::fmt::Display) -> ExportError {
    ExportError::StreamFinalize {
        reason: e.to_string(),
    }
}

/// Build a complete PDF document from `pages`.
///
/// An empty page list still yields a valid single blank page.
pub fn assemble(
    pages: &[Page],
    geometry: PageGeometry,
    title: &str,
    compress: bool,
) -> Result<Vec<u8>, ExportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for font in Font::ALL {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font.resource_name(), font_id);
    }
    let resources_id = doc.add_object(dictionary! {
        "Font" => fonts,
    });

    let blank = [Page::default()];
    let pages = if pages.is_empty() { &blank[..] } else { pages };

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let content = Content {
            operations: page_operations(page, geometry),
        };
        let encoded = content.encode().map_err(finalize_error)?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            geometry.width.into(),
            geometry.height.into(),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = info_dictionary(&mut doc, title);
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    if compress {
        doc.compress();
    }

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(finalize_error)?;
    debug!("Assembled {} pages into {} bytes", page_count, bytes.len());
    Ok(bytes)
}

fn info_dictionary(doc: &mut Document, title: &str) -> ObjectId {
    doc.add_object(dictionary! {
        "Title" => Object::String(encode_win_ansi(title), StringFormat::Literal),
        "Producer" => Object::string_literal(PRODUCER),
    })
}

fn page_operations(page: &Page, geometry: PageGeometry) -> Vec<Operation> {
    let mut ops = Vec::new();
    for op in &page.ops {
        match op {
            DrawOp::Text {
                x,
                baseline,
                text,
                style,
            } => text_operations(&mut ops, *x, geometry.height - baseline, text, style),
            DrawOp::Line {
                from,
                to,
                width,
                color,
                dash,
            } => {
                let [r, g, b] = color.unit_rgb();
                ops.push(Operation::new("q", vec![]));
                ops.push(Operation::new("w", vec![(*width).into()]));
                ops.push(Operation::new("RG", vec![r.into(), g.into(), b.into()]));
                let pattern = match dash {
                    Some(len) => vec![(*len).into(), (*len).into()],
                    None => vec![],
                };
                ops.push(Operation::new(
                    "d",
                    vec![Object::Array(pattern), Object::Integer(0)],
                ));
                ops.push(Operation::new(
                    "m",
                    vec![from.0.into(), (geometry.height - from.1).into()],
                ));
                ops.push(Operation::new(
                    "l",
                    vec![to.0.into(), (geometry.height - to.1).into()],
                ));
                ops.push(Operation::new("S", vec![]));
                ops.push(Operation::new("Q", vec![]));
            }
        }
    }
    ops
}

fn text_operations(ops: &mut Vec<Operation>, x: f32, y: f32, text: &str, style: &TextStyle) {
    let [r, g, b] = style.color.unit_rgb();
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![style.font.resource_name().into(), style.size.into()],
    ));
    ops.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
    ops.push(Operation::new("Td", vec![x.into(), y.into()]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
    ));
    ops.push(Operation::new("ET", vec![]));
}
