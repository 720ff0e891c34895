use anyhow::{Context, Result};
use regex::Regex;

use super::document::AnnotatedText;

/// Rebuilds readable text from space-joined tokens.
pub(crate) struct SentenceFormatter {
    leading_space_punct: Regex,
    spaced_sentence_punct: Regex,
    space_after_open_paren: Regex,
    space_before_close_paren: Regex,
}

impl SentenceFormatter {
    pub(crate) fn new() -> Result<Self> {
        Ok(Self {
            leading_space_punct: Regex::new(r"\s([,.!?])")
                .context("failed to compile punctuation spacing regex")?,
            spaced_sentence_punct: Regex::new(r"\s([,.!?;:](?:\s|$))")
                .context("failed to compile sentence punctuation regex")?,
            space_after_open_paren: Regex::new(r"([(])\s")
                .context("failed to compile open parenthesis regex")?,
            space_before_close_paren: Regex::new(r"\s([)])")
                .context("failed to compile close parenthesis regex")?,
        })
    }

    /// Whole-document text: every sentence with spaces before `, . ! ?`
    /// removed, sentences joined by a single space.
    pub(crate) fn document_text(&self, text: &AnnotatedText) -> String {
        text.sentences()
            .iter()
            .map(|sentence| {
                self.leading_space_punct
                    .replace_all(&sentence.words.join(" "), "${1}")
                    .into_owned()
            })
            .collect::<Vec<String>>()
            .join(" ")
    }

    /// One sentence with punctuation and parentheses attached to their words.
    pub(crate) fn sentence_text(&self, words: &[String]) -> String {
        let joined = words.join(" ");
        let text = self.spaced_sentence_punct.replace_all(&joined, "${1}");
        let text = self.space_after_open_paren.replace_all(&text, "${1}");
        self.space_before_close_paren
            .replace_all(&text, "${1}")
            .into_owned()
    }
}
