use anyhow::{Context, Result};
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use super::cleanup::TextCleaner;
use crate::config::SentenceFilter;

pub(crate) struct SentenceSplitter {
    filter: SentenceFilter,
    furniture: Regex,
}

impl SentenceSplitter {
    pub(crate) fn new(filter: SentenceFilter) -> Result<Self> {
        Ok(Self {
            filter,
            furniture: Regex::new(r"^(Page \d+|\d+|Chapter \d+)")
                .context("failed to compile page furniture regex")?,
        })
    }

    /// Splits on Unicode sentence boundaries and keeps the candidates that
    /// pass [`SentenceSplitter::accepts`].
    pub(crate) fn split(&self, cleaned: &str) -> Vec<String> {
        cleaned
            .unicode_sentences()
            .map(str::trim)
            .filter(|sentence| self.accepts(sentence))
            .map(ToOwned::to_owned)
            .collect()
    }

    pub(crate) fn accepts(&self, sentence: &str) -> bool {
        let length = sentence.chars().count();
        if length < self.filter.min_chars || length > self.filter.max_chars {
            return false;
        }
        !self.furniture.is_match(sentence)
    }
}

pub(crate) fn process_sentences(
    cleaner: &TextCleaner,
    splitter: &SentenceSplitter,
    text: &str,
) -> Vec<String> {
    let cleaned = cleaner.clean(text);
    splitter.split(&cleaned)
}
