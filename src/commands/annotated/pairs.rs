use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{debug, warn};

use crate::util::{discover_files, file_name_string};

pub(crate) const TEXT_SUFFIX: &str = "_en.xml";
pub(crate) const NER_SUFFIX: &str = "_en-ner.xml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DocumentPair {
    pub file_name: String,
    pub base_name: String,
    pub text_path: PathBuf,
    pub ner_path: PathBuf,
}

/// `*_en.xml` token documents that have an `*_en-ner.xml` partner, sorted by
/// file name. Documents without a partner are logged and left out.
pub(crate) fn discover_pairs(input_dir: &Path) -> Result<Vec<DocumentPair>> {
    let mut pairs = Vec::new();

    for text_path in discover_files(input_dir, "xml")? {
        let file_name = match file_name_string(&text_path) {
            Ok(name) => name,
            Err(error) => {
                warn!(error = %error, "skipping file with unreadable name");
                continue;
            }
        };
        let Some(base_name) = file_name.strip_suffix(TEXT_SUFFIX) else {
            continue;
        };

        let ner_path = input_dir.join(format!("{base_name}{NER_SUFFIX}"));
        if !ner_path.is_file() {
            warn!(file = %file_name, "skipping document without matching NER file");
            continue;
        }

        pairs.push(DocumentPair {
            base_name: base_name.to_string(),
            file_name,
            text_path,
            ner_path,
        });
    }

    Ok(pairs)
}

pub(crate) fn year_pattern() -> Result<Regex> {
    Regex::new(r"_(\d{4})_").context("failed to compile filename year regex")
}

/// First `_YYYY_` token of the file name.
pub(crate) fn year_from_file_name(file_name: &str, pattern: &Regex) -> Option<String> {
    pattern
        .captures(file_name)
        .and_then(|captures| captures.get(1))
        .map(|year| year.as_str().to_string())
}

/// Year buckets in ascending order. Pairs whose file name carries no year are
/// excluded from every bucket.
pub(crate) fn group_by_year(
    pairs: Vec<DocumentPair>,
    pattern: &Regex,
) -> BTreeMap<String, Vec<DocumentPair>> {
    let mut buckets = BTreeMap::<String, Vec<DocumentPair>>::new();
    for pair in pairs {
        match year_from_file_name(&pair.file_name, pattern) {
            Some(year) => buckets.entry(year).or_default().push(pair),
            None => debug!(file = %pair.file_name, "no year token in file name, excluded"),
        }
    }
    buckets
}
