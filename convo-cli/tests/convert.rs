use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

const SHARE_PAGE: &str = "../convo-babel/tests/export/fixtures/share.html";

/// The single file the CLI wrote into `dir`, as reported on stdout.
fn written_path(stdout: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(stdout).trim())
}

#[test]
fn converts_share_page_to_json() {
    let dir = tempdir().unwrap();

    let mut cmd = cargo_bin_cmd!("convo");
    cmd.arg(SHARE_PAGE)
        .arg("--to")
        .arg("json")
        .arg("-o")
        .arg(dir.path());

    let output = cmd.assert().success().get_output().stdout.clone();
    let path = written_path(&output);
    let name = path.file_name().unwrap().to_str().unwrap().to_string();
    assert!(name.starts_with("Sorting_in_Rust_stable_vs._unstable__"));
    assert!(name.ends_with(".json"));

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["messages"].as_array().unwrap().len(), 4);
    assert_eq!(value["messages"][2]["content"], "Thanks!");
}

#[test]
fn explicit_convert_with_url_override() {
    let dir = tempdir().unwrap();

    let mut cmd = cargo_bin_cmd!("convo");
    cmd.arg("convert")
        .arg(SHARE_PAGE)
        .arg("--to")
        .arg("json")
        .arg("--url")
        .arg("https://example.com/mine")
        .arg("-o")
        .arg(dir.path());

    let output = cmd.assert().success().get_output().stdout.clone();
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(written_path(&output)).unwrap()).unwrap();
    assert_eq!(value["url"], "https://example.com/mine");
}

#[test]
fn converts_share_page_to_pdf() {
    let dir = tempdir().unwrap();

    let mut cmd = cargo_bin_cmd!("convo");
    cmd.arg(SHARE_PAGE)
        .arg("--to")
        .arg("pdf")
        .arg("-o")
        .arg(dir.path())
        .arg("--extra-page-size")
        .arg("a4");

    let output = cmd.assert().success().get_output().stdout.clone();
    let path = written_path(&output);
    assert_eq!(path.extension().unwrap(), "pdf");

    let bytes = fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    assert!(!doc.get_pages().is_empty());
}

#[test]
fn json_export_renders_back_to_pdf() {
    let dir = tempdir().unwrap();
    let mut first = cargo_bin_cmd!("convo");
    first
        .arg(SHARE_PAGE)
        .arg("--to")
        .arg("json")
        .arg("-o")
        .arg(dir.path());
    let output = first.assert().success().get_output().stdout.clone();
    let json_path = written_path(&output);

    let mut second = cargo_bin_cmd!("convo");
    second
        .arg(&json_path)
        .arg("--to")
        .arg("pdf")
        .arg("-o")
        .arg(dir.path());
    second
        .assert()
        .success()
        .stdout(predicate::str::contains(".pdf"));
}

#[test]
fn empty_page_reports_no_conversation() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("empty.html");
    fs::write(&input, "<html><body><p>Sign in</p></body></html>").unwrap();

    let mut cmd = cargo_bin_cmd!("convo");
    cmd.arg(&input)
        .arg("--to")
        .arg("json")
        .arg("-o")
        .arg(dir.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("No conversation data found."));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn unknown_target_format_fails() {
    let mut cmd = cargo_bin_cmd!("convo");
    cmd.arg(SHARE_PAGE).arg("--to").arg("docx");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("docx"));
}

#[test]
fn undetectable_source_format_fails() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("notes.txt");
    fs::write(&input, "hello").unwrap();

    let mut cmd = cargo_bin_cmd!("convo");
    cmd.arg(&input).arg("--to").arg("json");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--from"));
}

#[test]
fn config_file_caps_title_length() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("convo.toml");
    fs::write(&config_path, "[export]\nmax_title_len = 7\n").unwrap();

    let mut cmd = cargo_bin_cmd!("convo");
    cmd.arg(SHARE_PAGE)
        .arg("--to")
        .arg("json")
        .arg("-o")
        .arg(dir.path())
        .arg("--config")
        .arg(&config_path);

    let output = cmd.assert().success().get_output().stdout.clone();
    let path = written_path(&output);
    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("Sorting_"), "got {name}");
    assert!(!name.starts_with("Sorting_i"), "got {name}");
}

#[test]
fn lists_formats() {
    let mut cmd = cargo_bin_cmd!("convo");
    cmd.arg("--list-formats");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("html"))
        .stdout(predicate::str::contains("json"))
        .stdout(predicate::str::contains("pdf"));
}
