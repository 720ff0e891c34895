use std::fs;

use super::document::AnnotatedText;
use super::entities::extract_entities;
use super::pairs::{discover_pairs, group_by_year, year_from_file_name, year_pattern};
use super::text::SentenceFormatter;
use super::load_pair;

const TOKENS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<text>
  <p>
    <s id="s1">
      <w id="t1">New</w>
      <w id="t2">York</w>
      <w id="t3">is</w>
      <w id="t4">busy</w>
      <w id="t5">.</w>
    </s>
    <s id="s2">
      <w id="t6">Edward</w>
      <w id="t7">Whymper</w>
      <w id="t8">(</w>
      <w id="t9">1840</w>
      <w id="t10">)</w>
      <w id="t11">climbed</w>
      <w id="t12">,</w>
      <w id="t13">twice</w>
      <w id="t14">.</w>
    </s>
  </p>
  <w id="t99">Appendix</w>
</text>
"#;

const NER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ner>
  <geo>
    <g span="t1 t2" type="city"/>
    <g span="t99"/>
    <g span="t404"/>
  </geo>
  <persons>
    <person><firstname> Edward </firstname><lastname>Whymper</lastname></person>
    <person><firstname></firstname><lastname></lastname></person>
    <person><lastname>Mummery</lastname></person>
  </persons>
</ner>
"#;

#[test]
fn token_lookup_tracks_enclosing_sentence() {
    let text = AnnotatedText::parse(TOKENS_XML).expect("token xml should parse");

    let token = text.token("t2").expect("t2 present");
    assert_eq!(token.text, "York");
    assert_eq!(token.sentence_id.as_deref(), Some("s1"));

    let outside = text.token("t99").expect("t99 present");
    assert_eq!(outside.text, "Appendix");
    assert!(outside.sentence_id.is_none());

    assert_eq!(text.token_count(), 15);
    assert_eq!(text.sentences().len(), 2);
    assert_eq!(text.sentences()[1].words.len(), 9);
}

#[test]
fn sentences_without_ids_stay_distinct_and_duplicate_ids_merge() {
    let xml = r#"<text>
        <s><w id="a">One</w></s>
        <s><w id="b">Two</w></s>
        <s id="x"><w id="c">Three</w></s>
        <s id="x"><w id="d">Four</w></s>
    </text>"#;
    let text = AnnotatedText::parse(xml).expect("parse");

    let ids = text
        .sentences()
        .iter()
        .map(|sentence| sentence.id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["#1", "#2", "x"]);
    assert_eq!(text.sentences()[2].words, vec!["Three", "Four"]);
}

#[test]
fn geo_entity_joins_span_tokens_with_spaces() {
    let text = AnnotatedText::parse(
        r#"<text><s id="s1"><w id="t1">New</w><w id="t2">York</w></s></text>"#,
    )
    .expect("parse");
    let extraction = extract_entities(
        r#"<ner><geo><g span="t1 t2" type="city"/></geo></ner>"#,
        &text,
    )
    .expect("ner");

    assert_eq!(extraction.entities.len(), 1);
    assert_eq!(extraction.entities[0].text, "New York");
    assert_eq!(extraction.entities[0].sentence_ids, vec!["s1".to_string()]);
    assert_eq!(extraction.entities[0].tag(), "[New York|CITY]");
}

#[test]
fn entity_extraction_reports_missing_ids_and_builds_persons() {
    let text = AnnotatedText::parse(TOKENS_XML).expect("parse");
    let extraction = extract_entities(NER_XML, &text).expect("ner");

    let labels = extraction
        .entities
        .iter()
        .map(|entity| entity.tag())
        .collect::<Vec<_>>();
    assert_eq!(
        labels,
        vec![
            "[New York|CITY]",
            "[Appendix|GEO]",
            "[Edward Whymper|PERSON]",
            "[Mummery|PERSON]",
        ]
    );

    assert_eq!(extraction.missing_token_ids, vec!["t404".to_string()]);
    assert_eq!(extraction.unresolved_spans, vec!["t404".to_string()]);

    let appendix = &extraction.entities[1];
    assert!(appendix.sentence_ids.is_empty());
    let person = &extraction.entities[2];
    assert!(person.span.is_none());
    assert!(person.sentence_ids.is_empty());
}

#[test]
fn partially_resolved_span_keeps_known_tokens() {
    let text = AnnotatedText::parse(TOKENS_XML).expect("parse");
    let extraction =
        extract_entities(r#"<ner><geo><g span="t1 t77 t2" type="city"/></geo></ner>"#, &text)
            .expect("ner");

    assert_eq!(extraction.entities[0].text, "New York");
    assert_eq!(extraction.missing_token_ids, vec!["t77".to_string()]);
    assert!(extraction.unresolved_spans.is_empty());
}

#[test]
fn malformed_xml_is_an_error() {
    assert!(AnnotatedText::parse("<text><s>").is_err());
    let text = AnnotatedText::parse(TOKENS_XML).expect("parse");
    assert!(extract_entities("<ner><geo>", &text).is_err());
}

#[test]
fn formatter_attaches_punctuation_in_document_text() {
    let text = AnnotatedText::parse(TOKENS_XML).expect("parse");
    let formatter = SentenceFormatter::new().expect("formatter");

    assert_eq!(
        formatter.document_text(&text),
        "New York is busy. Edward Whymper ( 1840 ) climbed, twice."
    );
}

#[test]
fn formatter_tidies_sentence_spacing_and_parentheses() {
    let text = AnnotatedText::parse(TOKENS_XML).expect("parse");
    let formatter = SentenceFormatter::new().expect("formatter");

    let sentences = text
        .sentences()
        .iter()
        .map(|sentence| formatter.sentence_text(&sentence.words))
        .collect::<Vec<_>>();
    assert_eq!(
        sentences,
        vec![
            "New York is busy.".to_string(),
            "Edward Whymper (1840) climbed, twice.".to_string(),
        ]
    );
}

#[test]
fn year_is_taken_from_underscored_four_digit_token() {
    let pattern = year_pattern().expect("regex");
    assert_eq!(
        year_from_file_name("Report_1987_en.xml", &pattern).as_deref(),
        Some("1987")
    );
    assert_eq!(year_from_file_name("Report_en.xml", &pattern), None);
    assert_eq!(year_from_file_name("Report_19870_en.xml", &pattern), None);
}

#[test]
fn discover_pairs_requires_ner_partner_and_groups_by_year() {
    let dir = tempfile::tempdir().expect("tempdir");
    for name in [
        "AJ_1987_en.xml",
        "AJ_1987_en-ner.xml",
        "AJ_1990_vol2_en.xml",
        "AJ_1990_vol2_en-ner.xml",
        "AJ_1991_en.xml",
        "Undated_en.xml",
        "Undated_en-ner.xml",
        "notes.txt",
    ] {
        fs::write(dir.path().join(name), "<text/>").expect("write fixture");
    }

    let pairs = discover_pairs(dir.path()).expect("discover");
    let names = pairs
        .iter()
        .map(|pair| pair.base_name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["AJ_1987", "AJ_1990_vol2", "Undated"]);
    assert_eq!(pairs[0].ner_path, dir.path().join("AJ_1987_en-ner.xml"));

    let buckets = group_by_year(pairs, &year_pattern().expect("regex"));
    assert_eq!(buckets.keys().collect::<Vec<_>>(), vec!["1987", "1990"]);
    assert_eq!(buckets["1990"][0].file_name, "AJ_1990_vol2_en.xml");
}

#[cfg(unix)]
#[test]
fn discover_pairs_skips_files_with_non_utf8_names() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("B_1901_en.xml"), TOKENS_XML).expect("write tokens");
    fs::write(dir.path().join("B_1901_en-ner.xml"), NER_XML).expect("write ner");
    fs::write(dir.path().join(OsStr::from_bytes(b"bad\xff.xml")), "<text/>").expect("stray");

    let pairs = discover_pairs(dir.path()).expect("discover");
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].base_name, "B_1901");
}

#[test]
fn load_pair_reads_both_documents() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("AJ_1987_en.xml"), TOKENS_XML).expect("write tokens");
    fs::write(dir.path().join("AJ_1987_en-ner.xml"), NER_XML).expect("write ner");

    let pairs = discover_pairs(dir.path()).expect("discover");
    let loaded = load_pair(&pairs[0]).expect("load pair");
    assert_eq!(loaded.entities.len(), 4);
    assert_eq!(loaded.text.sentences().len(), 2);
}
