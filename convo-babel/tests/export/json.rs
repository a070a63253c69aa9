use crate::common::load_fixture;
use convo_babel::format::ParseOptions;
use convo_babel::{ExportError, Exporter, Transcript, Turn};
use insta::assert_snapshot;
use std::collections::HashMap;

const GREETING_PAGE: &str = r#"<html><head><link rel="canonical" href="https://gemini.google.com/share/greeting"></head><body>
<div class="share-title-section"><h1>Greeting test</h1></div>
<share-turn-viewer>
  <user-query><div class="query-text">Hello</div></user-query>
  <response-container><message-content><div class="markdown"><p>Hi <b>there</b></p></div></message-content></response-container>
</share-turn-viewer>
</body></html>"#;

fn export_json(source: &str) -> Result<String, ExportError> {
    let artifact = Exporter::new().convert(
        source,
        "html",
        &ParseOptions::default(),
        "json",
        &HashMap::new(),
    )?;
    Ok(String::from_utf8(artifact.bytes).unwrap())
}

#[test]
fn greeting_page_exports_plain_text_content() {
    let json = export_json(GREETING_PAGE).unwrap();
    assert_snapshot!(json, @r###"
    {
      "title": "Greeting_test",
      "url": "https://gemini.google.com/share/greeting",
      "messages": [
        {
          "role": "user",
          "content": "Hello"
        },
        {
          "role": "assistant",
          "content": "Hi there"
        }
      ]
    }
    "###);
}

#[test]
fn fixture_page_exports_all_turns_in_order() {
    let json = export_json(&load_fixture("export", "share.html")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["title"], "Sorting_in_Rust_stable_vs._unstable_");
    assert_eq!(
        value["url"],
        "https://gemini.google.com/share/5f2c1a9e0b7d"
    );

    let messages = value["messages"].as_array().unwrap();
    let roles: Vec<&str> = messages
        .iter()
        .map(|m| m["role"].as_str().unwrap())
        .collect();
    assert_eq!(roles, vec!["user", "assistant", "user", "assistant"]);
    assert_eq!(
        messages[0]["content"],
        "What is the difference between sort and sort_unstable?"
    );
    let answer = messages[1]["content"].as_str().unwrap();
    assert!(answer.starts_with("Short answer"), "got: {answer}");
    assert!(answer.contains("v.sort_unstable();"));
    assert!(!answer.contains('<'));
    assert_eq!(messages[3]["content"], "You're welcome.");
}

#[test]
fn content_matches_turn_text_byte_for_byte() {
    let turns = vec![
        Turn::user("  leading spaces\nand a second line\t"),
        Turn::assistant("**not** rendered, just *copied*", None),
        Turn::user("caf\u{00e9} \u{1f980} \"quoted\" \\ backslash"),
    ];
    let transcript = Transcript {
        title: "t".to_string(),
        url: String::new(),
        turns: turns.clone(),
    };

    let artifact = Exporter::new()
        .export(&transcript, "json", &HashMap::new())
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&artifact.bytes).unwrap();
    for (message, turn) in value["messages"].as_array().unwrap().iter().zip(&turns) {
        assert_eq!(message["content"].as_str().unwrap(), turn.text);
    }
}

#[test]
fn page_without_conversation_produces_no_artifact() {
    let result = export_json("<html><body><p>Sign in to continue</p></body></html>");
    assert!(matches!(result, Err(ExportError::ExtractionEmpty)));
}

#[test]
fn artifact_written_to_directory() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = Exporter::new()
        .convert(
            GREETING_PAGE,
            "html",
            &ParseOptions::default(),
            "json",
            &HashMap::new(),
        )
        .unwrap();
    let path = artifact.write_to(dir.path()).unwrap();

    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("Greeting_test_"));
    assert!(name.ends_with(".json"));
    assert_eq!(std::fs::read(&path).unwrap(), artifact.bytes);
}
