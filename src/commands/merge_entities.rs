use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::CorpusArgs;
use crate::commands::annotated::{
    DocumentPair, Entity, LoadedPair, SentenceFormatter, discover_pairs, load_pair,
};
use crate::config::CorpusConfig;
use crate::util::ensure_parent_directory;

const DEFAULT_OUTPUT_FILE: &str = "prodigy_annotated.txt";
const SECTION_RULE_WIDTH: usize = 50;

pub fn run(args: CorpusArgs) -> Result<()> {
    let config = CorpusConfig::from_args(&args, DEFAULT_OUTPUT_FILE)?;
    info!(
        input_dir = %config.input_dir.display(),
        output = %config.output_path.display(),
        "merging token text with entity annotations"
    );

    let pairs = discover_pairs(&config.input_dir)?;
    if pairs.is_empty() {
        warn!(input_dir = %config.input_dir.display(), "no annotated document pairs found");
    }

    let formatter = SentenceFormatter::new()?;

    ensure_parent_directory(&config.output_path)?;
    let file = File::create(&config.output_path)
        .with_context(|| format!("failed to create {}", config.output_path.display()))?;
    let mut output = BufWriter::new(file);

    let mut processed = 0usize;
    let mut failed = 0usize;
    for pair in &pairs {
        let section = match load_pair(pair) {
            Ok(loaded) => {
                processed += 1;
                info!(
                    file = %pair.file_name,
                    tokens = loaded.text.token_count(),
                    entities = loaded.entities.len(),
                    "processed document pair"
                );
                render_section(&pair.base_name, &formatter, &loaded)
            }
            Err(error) => {
                failed += 1;
                let cause = format!("{error:#}");
                warn!(file = %pair.file_name, error = %cause, "failed to process document pair");
                render_failed_section(pair, &cause)
            }
        };

        output
            .write_all(section.as_bytes())
            .with_context(|| format!("failed to write {}", config.output_path.display()))?;
    }

    output
        .flush()
        .with_context(|| format!("failed to flush {}", config.output_path.display()))?;

    info!(
        path = %config.output_path.display(),
        processed,
        failed,
        "annotation merge completed"
    );

    Ok(())
}

pub(crate) fn render_section(
    base_name: &str,
    formatter: &SentenceFormatter,
    loaded: &LoadedPair,
) -> String {
    let mut section = format!(
        "=== {base_name} ===\n{}\n\n",
        formatter.document_text(&loaded.text)
    );

    if !loaded.entities.is_empty() {
        section.push_str(&render_entity_list(&loaded.entities));
    }

    section.push_str(&section_rule());
    section
}

fn render_entity_list(entities: &[Entity]) -> String {
    let mut list = String::from("--- Entities ---\n");
    for entity in entities {
        list.push_str(&entity.tag());
        list.push('\n');
    }
    list.push('\n');
    list
}

fn render_failed_section(pair: &DocumentPair, cause: &str) -> String {
    format!(
        "=== {} ===\n[error: failed to process {}: {}]\n\n{}",
        pair.base_name,
        pair.file_name,
        cause,
        section_rule()
    )
}

fn section_rule() -> String {
    format!("{}\n\n", "=".repeat(SECTION_RULE_WIDTH))
}
