//! Loading of paired token/NER XML documents shared by `merge-entities` and
//! `link-yearly`.

mod document;
mod entities;
mod pairs;
#[cfg(test)]
mod tests;
mod text;

use anyhow::Result;
use tracing::warn;

pub(crate) use document::AnnotatedText;
pub(crate) use entities::{Entity, load_entities};
pub(crate) use pairs::{DocumentPair, discover_pairs, group_by_year, year_pattern};
pub(crate) use text::SentenceFormatter;

/// A token document with its entities resolved against it.
#[derive(Debug)]
pub(crate) struct LoadedPair {
    pub text: AnnotatedText,
    pub entities: Vec<Entity>,
}

/// Loads both halves of a pair and reports span ids that did not resolve
/// instead of dropping them silently.
pub(crate) fn load_pair(pair: &DocumentPair) -> Result<LoadedPair> {
    let text = AnnotatedText::load(&pair.text_path)?;
    let extraction = load_entities(&pair.ner_path, &text)?;

    if !extraction.missing_token_ids.is_empty() {
        warn!(
            file = %pair.file_name,
            missing = extraction.missing_token_ids.len(),
            ids = ?extraction.missing_token_ids,
            "entity spans reference unknown token ids; entity text may be shortened"
        );
    }
    if !extraction.unresolved_spans.is_empty() {
        warn!(
            file = %pair.file_name,
            dropped = extraction.unresolved_spans.len(),
            spans = ?extraction.unresolved_spans,
            "dropped geographic entities with no resolvable tokens"
        );
    }

    Ok(LoadedPair {
        text,
        entities: extraction.entities,
    })
}
