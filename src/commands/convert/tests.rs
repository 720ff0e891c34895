use std::fs;
use std::io::Cursor;
use std::path::Path;

use super::record::scalar_text;
use super::run::{jsonl_to_xml, output_path_for, run};
use crate::cli::ConvertArgs;

fn convert(input: &str) -> (String, super::run::ConversionStats) {
    let (bytes, stats) = jsonl_to_xml(Cursor::new(input), "test.jsonl").expect("conversion");
    (String::from_utf8(bytes).expect("utf-8 output"), stats)
}

fn child<'a, 'input>(node: roxmltree::Node<'a, 'input>, name: &str) -> Option<roxmltree::Node<'a, 'input>> {
    node.children().find(|child| child.has_tag_name(name))
}

#[test]
fn text_and_answer_become_elements() {
    let (xml, stats) = convert(r#"{"text":"hello","answer":"accept"}"#);

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains("<text>hello</text>"));
    assert!(xml.contains("<answer>accept</answer>"));
    assert!(!xml.contains("<tokens"));
    assert!(!xml.contains("<spans"));
    assert!(xml.contains("<input_hash/>"));
    assert_eq!(stats.records, 1);

    let document = roxmltree::Document::parse(&xml).expect("well-formed");
    let annotation = child(document.root_element(), "annotation").expect("annotation");
    let names = annotation
        .children()
        .filter(|node| node.is_element())
        .map(|node| node.tag_name().name())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["text", "answer", "metadata"]);
}

#[test]
fn tokens_spans_and_metadata_carry_attributes() {
    let line = r#"{"text":"Whymper & co","answer":"accept",
        "tokens":[{"text":"Whymper","id":0,"start":0,"end":7},{"text":"&","id":1,"start":8,"end":9}],
        "spans":[{"text":"Whymper","start":0,"end":7,"label":"PERSON","token_start":0,"token_end":0},
                 {"text":"co","start":10,"end":12,"label":"ORG"}],
        "_input_hash":-1234,"_task_hash":99,"_timestamp":1700000000,"_view_id":"ner_manual"}"#
        .replace('\n', " ");
    let (xml, _) = convert(&line);

    let document = roxmltree::Document::parse(&xml).expect("well-formed");
    let annotation = child(document.root_element(), "annotation").expect("annotation");
    assert_eq!(child(annotation, "text").and_then(|node| node.text()), Some("Whymper & co"));

    let tokens = child(annotation, "tokens").expect("tokens");
    let token = tokens.children().filter(|node| node.is_element()).nth(1).expect("second token");
    assert_eq!(token.attribute("id"), Some("1"));
    assert_eq!(token.attribute("start"), Some("8"));
    assert_eq!(token.attribute("end"), Some("9"));
    assert_eq!(token.text(), Some("&"));

    let spans = child(annotation, "spans")
        .expect("spans")
        .children()
        .filter(|node| node.is_element())
        .collect::<Vec<_>>();
    assert_eq!(spans.len(), 2);
    assert_eq!(spans[0].attribute("label"), Some("PERSON"));
    assert_eq!(spans[0].attribute("token_start"), Some("0"));
    assert_eq!(spans[0].attribute("token_end"), Some("0"));
    assert_eq!(spans[1].attribute("token_start"), None);
    assert_eq!(spans[1].text(), Some("co"));

    let metadata = child(annotation, "metadata").expect("metadata");
    assert_eq!(child(metadata, "input_hash").and_then(|node| node.text()), Some("-1234"));
    assert_eq!(child(metadata, "task_hash").and_then(|node| node.text()), Some("99"));
    assert_eq!(child(metadata, "timestamp").and_then(|node| node.text()), Some("1700000000"));
    assert_eq!(child(metadata, "view_id").and_then(|node| node.text()), Some("ner_manual"));
}

#[test]
fn empty_token_list_and_empty_span_list() {
    let (xml, _) = convert(r#"{"text":"x","tokens":[],"spans":[]}"#);

    assert!(xml.contains("<tokens/>"));
    assert!(!xml.contains("<spans"));
    assert!(xml.contains("<answer/>"));
}

#[test]
fn blank_and_malformed_lines_are_skipped() {
    let input = "{\"text\":\"one\"}\n\n   \n{not json}\n{\"text\":\"two\"}\n";
    let (xml, stats) = convert(input);

    assert_eq!(stats.records, 2);
    assert_eq!(stats.skipped_lines, 1);
    let document = roxmltree::Document::parse(&xml).expect("well-formed");
    assert_eq!(
        document
            .root_element()
            .children()
            .filter(|node| node.has_tag_name("annotation"))
            .count(),
        2
    );
}

#[test]
fn lines_that_are_not_utf8_are_skipped() {
    let input: &[u8] = b"{\"text\":\"ok\"}\r\n\xff\xfe bad\n{\"text\":\"after\"}";
    let (bytes, stats) = jsonl_to_xml(Cursor::new(input), "test.jsonl").expect("conversion");
    let xml = String::from_utf8(bytes).expect("utf-8 output");

    assert_eq!(stats.records, 2);
    assert_eq!(stats.skipped_lines, 1);
    assert!(xml.contains("<text>ok</text>"));
    assert!(xml.contains("<text>after</text>"));
}

#[test]
fn empty_input_produces_empty_root() {
    let (xml, stats) = convert("");
    assert_eq!(stats.records, 0);
    let document = roxmltree::Document::parse(&xml).expect("well-formed");
    assert_eq!(document.root_element().tag_name().name(), "annotations");
    assert_eq!(document.root_element().children().filter(|node| node.is_element()).count(), 0);
}

#[test]
fn scalar_text_forms() {
    assert_eq!(scalar_text(None), "");
    assert_eq!(scalar_text(Some(&serde_json::Value::Null)), "");
    assert_eq!(scalar_text(Some(&serde_json::json!("abc"))), "abc");
    assert_eq!(scalar_text(Some(&serde_json::json!(42))), "42");
    assert_eq!(scalar_text(Some(&serde_json::json!(1.5))), "1.5");
}

#[test]
fn output_name_replaces_extension() {
    assert_eq!(
        output_path_for(Path::new("out"), Path::new("in/batch.v2.jsonl")),
        Path::new("out").join("batch.v2.xml")
    );
}

#[test]
fn run_converts_named_files_and_skips_missing() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("a.jsonl"), "{\"text\":\"alpha\"}\n").expect("a");
    fs::write(dir.path().join("b.jsonl"), "{\"text\":\"beta\"}\n").expect("b");
    let out = dir.path().join("xml");

    run(ConvertArgs {
        input_dir: dir.path().to_path_buf(),
        files: vec!["b.jsonl".to_string(), "missing.jsonl".to_string()],
        output_dir: Some(out.clone()),
    })
    .expect("run");

    let written = fs::read_to_string(out.join("b.xml")).expect("b.xml");
    assert!(written.contains("<text>beta</text>"));
    assert!(!out.join("a.xml").exists());
    assert!(!out.join("missing.xml").exists());
}

#[test]
fn run_without_names_converts_every_jsonl_next_to_input() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("a.jsonl"), "{\"text\":\"alpha\"}\n").expect("a");
    fs::write(dir.path().join("b.JSONL"), "{\"text\":\"beta\"}\n").expect("b");
    fs::write(dir.path().join("notes.txt"), "ignored").expect("notes");

    run(ConvertArgs {
        input_dir: dir.path().to_path_buf(),
        files: Vec::new(),
        output_dir: None,
    })
    .expect("run");

    assert!(dir.path().join("a.xml").exists());
    assert!(dir.path().join("b.xml").exists());
    assert!(!dir.path().join("notes.xml").exists());
}

#[test]
fn run_keeps_converting_after_a_bad_line() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("a.jsonl"),
        b"{\"text\":\"ok\"}\n\xff\xfe bad\n{\"text\":\"after\"}".as_slice(),
    )
    .expect("a");
    fs::write(dir.path().join("b.jsonl"), "{\"text\":\"beta\"}\n").expect("b");

    run(ConvertArgs {
        input_dir: dir.path().to_path_buf(),
        files: Vec::new(),
        output_dir: None,
    })
    .expect("run");

    let first = fs::read_to_string(dir.path().join("a.xml")).expect("a.xml");
    assert!(first.contains("<text>after</text>"));
    assert!(dir.path().join("b.xml").exists());
}
