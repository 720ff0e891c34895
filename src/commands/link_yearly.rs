use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::CorpusArgs;
use crate::commands::annotated::{
    DocumentPair, Entity, LoadedPair, SentenceFormatter, discover_pairs, group_by_year,
    load_pair, year_pattern,
};
use crate::config::CorpusConfig;
use crate::util::ensure_parent_directory;

const DEFAULT_OUTPUT_FILE: &str = "yearly_sentences_annotated.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AnnotatedSentence {
    pub text: String,
    pub tags: Vec<String>,
}

/// Everything written for one year bucket.
#[derive(Debug, Default)]
pub(crate) struct YearReport {
    pub sentences: Vec<AnnotatedSentence>,
    /// Unique `(text, kind)` pairs, kept sorted.
    pub index: BTreeSet<(String, String)>,
}

pub fn run(args: CorpusArgs) -> Result<()> {
    let config = CorpusConfig::from_args(&args, DEFAULT_OUTPUT_FILE)?;
    info!(
        input_dir = %config.input_dir.display(),
        output = %config.output_path.display(),
        "linking entities to sentences by year"
    );

    let pairs = discover_pairs(&config.input_dir)?;
    let buckets = group_by_year(pairs, &year_pattern()?);
    if buckets.is_empty() {
        warn!(input_dir = %config.input_dir.display(), "no dated document pairs found");
    }

    let formatter = SentenceFormatter::new()?;

    ensure_parent_directory(&config.output_path)?;
    let file = File::create(&config.output_path)
        .with_context(|| format!("failed to create {}", config.output_path.display()))?;
    let mut output = BufWriter::new(file);

    for (year, pairs) in &buckets {
        info!(year = %year, documents = pairs.len(), "processing year");
        let report = build_year_report(pairs, &formatter);
        output
            .write_all(render_year(year, &report).as_bytes())
            .with_context(|| format!("failed to write {}", config.output_path.display()))?;
    }

    output
        .flush()
        .with_context(|| format!("failed to flush {}", config.output_path.display()))?;

    info!(
        path = %config.output_path.display(),
        years = buckets.len(),
        "yearly linkage completed"
    );

    Ok(())
}

fn build_year_report(pairs: &[DocumentPair], formatter: &SentenceFormatter) -> YearReport {
    let mut report = YearReport::default();

    for pair in pairs {
        match load_pair(pair) {
            Ok(loaded) => append_document(&mut report, loaded, formatter),
            Err(error) => {
                let cause = format!("{error:#}");
                warn!(file = %pair.file_name, error = %cause, "skipping document pair");
            }
        }
    }

    report
}

/// Adds one document's sentences and entities to the year. Sentence ids are
/// only meaningful within the document, so linkage never crosses documents.
pub(crate) fn append_document(report: &mut YearReport, loaded: LoadedPair, formatter: &SentenceFormatter) {
    let sentences = loaded
        .text
        .sentences()
        .iter()
        .map(|sentence| (sentence.id.clone(), formatter.sentence_text(&sentence.words)))
        .collect::<Vec<(String, String)>>();

    let mut entities = loaded.entities;
    link_entities_to_sentences(&mut entities, &sentences);

    let mut tags_by_sentence = HashMap::<&str, Vec<String>>::new();
    for entity in &entities {
        for sentence_id in &entity.sentence_ids {
            tags_by_sentence
                .entry(sentence_id.as_str())
                .or_default()
                .push(entity.tag());
        }
    }

    for (sentence_id, text) in &sentences {
        report.sentences.push(AnnotatedSentence {
            text: text.clone(),
            tags: tags_by_sentence.remove(sentence_id.as_str()).unwrap_or_default(),
        });
    }

    for entity in &entities {
        report.index.insert((entity.text.clone(), entity.kind.clone()));
    }
}

/// Entities without direct sentence ids (persons, or spans outside any
/// sentence) are linked to every sentence whose text contains them. Repeated
/// or partial names therefore link to all matches.
pub(crate) fn link_entities_to_sentences(entities: &mut [Entity], sentences: &[(String, String)]) {
    for entity in entities.iter_mut() {
        if !entity.sentence_ids.is_empty() {
            continue;
        }
        entity.sentence_ids = sentences
            .iter()
            .filter(|(_, text)| text.contains(entity.text.as_str()))
            .map(|(sentence_id, _)| sentence_id.clone())
            .collect();
    }
}

pub(crate) fn render_year(year: &str, report: &YearReport) -> String {
    let mut rendered = format!("\n\n=== YEAR {year} ===\n=== Sentences ===\n");

    for sentence in &report.sentences {
        rendered.push('\n');
        rendered.push_str(&sentence.text);
        rendered.push('\n');
        if !sentence.tags.is_empty() {
            rendered.push_str("  Entities: ");
            rendered.push_str(&sentence.tags.join(", "));
            rendered.push('\n');
        }
    }

    rendered.push_str("\n=== Entity Index ===\n");
    for (text, kind) in &report.index {
        rendered.push_str(&format!("- {} ({})\n", text, kind.to_uppercase()));
    }

    rendered
}
