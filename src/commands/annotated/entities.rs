use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use roxmltree::Node;

use super::document::AnnotatedText;

pub(crate) const PERSON_KIND: &str = "person";
const DEFAULT_GEO_KIND: &str = "geo";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Entity {
    pub text: String,
    pub kind: String,
    /// Raw `span` attribute; persons have none.
    pub span: Option<String>,
    /// Sentences the entity's tokens belong to, in first-seen order.
    pub sentence_ids: Vec<String>,
}

impl Entity {
    pub(crate) fn kind_label(&self) -> String {
        self.kind.to_uppercase()
    }

    /// `[New York|CITY]`
    pub(crate) fn tag(&self) -> String {
        format!("[{}|{}]", self.text, self.kind_label())
    }
}

#[derive(Debug, Default)]
pub(crate) struct EntityExtraction {
    pub entities: Vec<Entity>,
    /// Span ids with no matching `<w>` in the token document.
    pub missing_token_ids: Vec<String>,
    /// Geographic entities none of whose span ids resolved.
    pub unresolved_spans: Vec<String>,
}

pub(crate) fn load_entities(ner_path: &Path, text: &AnnotatedText) -> Result<EntityExtraction> {
    let raw = fs::read_to_string(ner_path)
        .with_context(|| format!("failed to read {}", ner_path.display()))?;
    extract_entities(&raw, text).with_context(|| format!("failed to parse {}", ner_path.display()))
}

/// Geographic entities from `<geo><g span type>` resolved through the token
/// lookup, followed by persons from `<persons><person>`.
///
/// Span ids missing from the lookup are recorded and skipped, so a multi-word
/// entity can come back shorter than its span.
pub(crate) fn extract_entities(ner_xml: &str, text: &AnnotatedText) -> Result<EntityExtraction> {
    let document = roxmltree::Document::parse(ner_xml).context("invalid NER XML")?;
    let mut extraction = EntityExtraction::default();

    for geo in document
        .descendants()
        .filter(|node| node.has_tag_name("g") && parent_is(node, "geo"))
    {
        let span = geo.attribute("span").unwrap_or_default();
        let mut words = Vec::new();
        let mut sentence_ids: Vec<String> = Vec::new();

        for token_id in span.split_whitespace() {
            match text.token(token_id) {
                Some(entry) => {
                    words.push(entry.text.as_str());
                    if let Some(sentence_id) = &entry.sentence_id {
                        if !sentence_ids.contains(sentence_id) {
                            sentence_ids.push(sentence_id.clone());
                        }
                    }
                }
                None => extraction.missing_token_ids.push(token_id.to_string()),
            }
        }

        let entity_text = words.join(" ");
        if entity_text.trim().is_empty() {
            extraction.unresolved_spans.push(span.to_string());
            continue;
        }

        extraction.entities.push(Entity {
            text: entity_text,
            kind: geo
                .attribute("type")
                .unwrap_or(DEFAULT_GEO_KIND)
                .to_string(),
            span: Some(span.to_string()),
            sentence_ids,
        });
    }

    for person in document
        .descendants()
        .filter(|node| node.has_tag_name("person") && parent_is(node, "persons"))
    {
        let firstname = child_text(&person, "firstname");
        let lastname = child_text(&person, "lastname");
        if firstname.is_empty() && lastname.is_empty() {
            continue;
        }

        extraction.entities.push(Entity {
            text: format!("{firstname} {lastname}").trim().to_string(),
            kind: PERSON_KIND.to_string(),
            span: None,
            sentence_ids: Vec::new(),
        });
    }

    Ok(extraction)
}

fn parent_is(node: &Node, tag: &str) -> bool {
    node.parent_element()
        .map(|parent| parent.has_tag_name(tag))
        .unwrap_or(false)
}

fn child_text<'a>(node: &Node<'a, '_>, tag: &str) -> &'a str {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
        .map(str::trim)
        .unwrap_or_default()
}
