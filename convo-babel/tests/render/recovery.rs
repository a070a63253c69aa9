use convo_babel::error::RenderError;
use convo_babel::render::{
    Canvas, DocumentHeader, DocumentRenderer, DrawOp, Font, PageCanvas, PageGeometry,
    RenderStyle,
};
use convo_babel::Turn;

const HEADER: DocumentHeader<'static> = DocumentHeader {
    title: "chat",
    url: "https://example.com",
    generated_on: "1/2/2026",
};

fn drawn(pages: &[convo_babel::render::Page]) -> Vec<(String, Font)> {
    pages
        .iter()
        .flat_map(|p| p.ops.iter())
        .filter_map(|op| match op {
            DrawOp::Text { text, style, .. } => Some((text.clone(), style.font)),
            DrawOp::Line { .. } => None,
        })
        .collect()
}

/// Markup "code" converts to a fenced block, anything else to a paragraph.
fn normalizer(markup: &str) -> String {
    if markup == "code" {
        "```\nlet x = 1;\n```".to_string()
    } else {
        markup.to_string()
    }
}

#[test]
fn one_failing_message_does_not_cascade() {
    // Code blocks are indented past the content width; paragraphs are not.
    let style = RenderStyle {
        indent: 1000.0,
        ..RenderStyle::default()
    };
    let renderer = DocumentRenderer::new(&style, &normalizer);
    let mut canvas = PageCanvas::new(PageGeometry::LETTER, style.body());

    let turns = vec![
        Turn::user("before"),
        Turn::assistant("let x = 1;", Some("code".to_string())),
        Turn::user("after"),
    ];
    let report = renderer
        .render_document(&mut canvas, &HEADER, &turns)
        .unwrap();

    assert_eq!(report.messages, 3);
    assert_eq!(report.recovered.len(), 1);
    assert_eq!(report.recovered[0].0, 1);
    assert!(matches!(
        report.recovered[0].1,
        RenderError::NoRoomForText { .. }
    ));

    let lines = drawn(&canvas.finish());
    let body: Vec<(&str, Font)> = lines[3..]
        .iter()
        .map(|(t, f)| (t.as_str(), *f))
        .collect();
    assert_eq!(
        body,
        vec![
            ("User:", Font::Bold),
            ("before", Font::Regular),
            ("Assistant:", Font::Bold),
            ("[Msg Render Error]", Font::Regular),
            ("let x = 1;", Font::Mono),
            ("User:", Font::Bold),
            ("after", Font::Regular),
        ]
    );
}

#[test]
fn all_messages_render_once_in_order() {
    let style = RenderStyle::default();
    let renderer = DocumentRenderer::new(&style, &normalizer);
    let mut canvas = PageCanvas::new(PageGeometry::LETTER, style.body());

    let turns: Vec<Turn> = (0..30)
        .map(|i| {
            if i % 2 == 0 {
                Turn::user(format!("question {i}"))
            } else {
                Turn::assistant(format!("answer {i}"), Some(format!("answer {i}")))
            }
        })
        .collect();
    let report = renderer
        .render_document(&mut canvas, &HEADER, &turns)
        .unwrap();
    assert_eq!(report.messages, 30);
    assert!(report.recovered.is_empty());

    let pages = canvas.finish();
    assert!(pages.len() > 1);
    let bodies: Vec<String> = drawn(&pages)
        .into_iter()
        .map(|(t, _)| t)
        .filter(|t| t.starts_with("question ") || t.starts_with("answer "))
        .collect();
    let expected: Vec<String> = turns.iter().map(|t| t.text.clone()).collect();
    assert_eq!(bodies, expected);
}
