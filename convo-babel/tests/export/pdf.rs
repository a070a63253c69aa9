use crate::common::load_fixture;
use convo_babel::format::ParseOptions;
use convo_babel::Exporter;
use lopdf::content::Content;
use lopdf::{Document, Object};
use std::collections::HashMap;

/// Every string shown with `Tj`, page by page.
fn shown_text(bytes: &[u8]) -> Vec<Vec<String>> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|page_id| {
            let content = Content::decode(&doc.get_page_content(*page_id).unwrap()).unwrap();
            content
                .operations
                .iter()
                .filter(|op| op.operator == "Tj")
                .filter_map(|op| match op.operands.first() {
                    Some(Object::String(bytes, _)) => {
                        Some(String::from_utf8_lossy(bytes).into_owned())
                    }
                    _ => None,
                })
                .collect()
        })
        .collect()
}

fn export_fixture(options: HashMap<String, String>) -> Vec<u8> {
    Exporter::new()
        .convert(
            &load_fixture("export", "share.html"),
            "html",
            &ParseOptions::default(),
            "pdf",
            &options,
        )
        .unwrap()
        .bytes
}

fn uncompressed() -> HashMap<String, String> {
    let mut options = HashMap::new();
    options.insert("compress".to_string(), "false".to_string());
    options
}

#[test]
fn fixture_renders_header_then_messages() {
    let pages = shown_text(&export_fixture(uncompressed()));
    let lines: Vec<String> = pages.into_iter().flatten().collect();

    assert_eq!(lines[0], "Sorting_in_Rust_stable_vs._unstable_");
    assert_eq!(lines[1], "https://gemini.google.com/share/5f2c1a9e0b7d");
    assert!(lines[2].starts_with("Generated on "));

    let labels: Vec<&str> = lines
        .iter()
        .map(String::as_str)
        .filter(|l| *l == "User:" || *l == "Assistant:")
        .collect();
    assert_eq!(labels, vec!["User:", "Assistant:", "User:", "Assistant:"]);
    assert_eq!(
        lines[4],
        "What is the difference between sort and sort_unstable?"
    );
    assert!(!lines.iter().any(|l| l == "[Msg Render Error]"));
}

#[test]
fn table_separator_matches_header() {
    let lines: Vec<String> = shown_text(&export_fixture(uncompressed()))
        .into_iter()
        .flatten()
        .collect();
    let header = lines
        .iter()
        .position(|l| l == "Method | Stable")
        .expect("table header line");
    assert_eq!(lines[header + 1], "-".repeat("Method | Stable".len()));
    assert_eq!(lines[header + 2], "sort | yes");
}

#[test]
fn compressed_by_default() {
    let compressed = export_fixture(HashMap::new());
    let plain = export_fixture(uncompressed());
    assert!(compressed.starts_with(b"%PDF"));
    assert!(compressed.len() < plain.len());
    assert_eq!(shown_text(&compressed), shown_text(&plain));
}
