use anyhow::{Context, Result};
use regex::Regex;

use crate::cli::CleanupRule;

const MIN_KEPT_LINE_CHARS: usize = 11;

/// Ordered regex repairs for text coming out of a PDF text layer or OCR.
///
/// The rules run once each, in `CleanupRule::ALL` order. They are not
/// idempotent on partially cleaned text and should be fed raw extraction
/// output.
pub(crate) struct TextCleaner {
    rules: Vec<CleanupRule>,
    wrapped_hyphen: Regex,
    split_name: Regex,
    lowercase_hyphen: Regex,
    spaced_letters_five: Regex,
    spaced_letters_four: Regex,
    spaced_letters_three: Regex,
    whitespace_run: Regex,
    disallowed_run: Regex,
}

impl TextCleaner {
    pub(crate) fn new(rules: &[CleanupRule]) -> Result<Self> {
        let ordered = CleanupRule::ALL
            .into_iter()
            .filter(|rule| rules.contains(rule))
            .collect::<Vec<_>>();

        Ok(Self {
            rules: ordered,
            wrapped_hyphen: Regex::new(r"-\s+").context("failed to compile wrapped hyphen regex")?,
            split_name: Regex::new(r"([A-Z][a-z]+)-\s*([a-z]+)")
                .context("failed to compile split name regex")?,
            lowercase_hyphen: Regex::new(r"([a-z])-([a-z])")
                .context("failed to compile lowercase hyphen regex")?,
            spaced_letters_five: Regex::new(
                r"\b([a-zA-Z])\s([a-zA-Z])\s([a-zA-Z])\s([a-zA-Z])\s([a-zA-Z]+)\b",
            )
            .context("failed to compile five-letter spacing regex")?,
            spaced_letters_four: Regex::new(r"\b([a-zA-Z])\s([a-zA-Z])\s([a-zA-Z])\s([a-zA-Z])\b")
                .context("failed to compile four-letter spacing regex")?,
            spaced_letters_three: Regex::new(r"\b([a-zA-Z])\s([a-zA-Z])\s([a-zA-Z])\b")
                .context("failed to compile three-letter spacing regex")?,
            whitespace_run: Regex::new(r"\s+").context("failed to compile whitespace regex")?,
            disallowed_run: Regex::new(r#"[^\w\s.,!?;:\-()\[\]"']+"#)
                .context("failed to compile disallowed character regex")?,
        })
    }

    pub(crate) fn rules(&self) -> &[CleanupRule] {
        &self.rules
    }

    pub(crate) fn clean(&self, text: &str) -> String {
        self.rules
            .iter()
            .fold(text.to_string(), |current, rule| self.apply(*rule, &current))
    }

    pub(crate) fn apply(&self, rule: CleanupRule, text: &str) -> String {
        match rule {
            CleanupRule::RejoinWrappedHyphens => self.rejoin_wrapped_hyphens(text),
            CleanupRule::JoinSplitNames => self.join_split_names(text),
            CleanupRule::JoinLowercaseHyphens => self.join_lowercase_hyphens(text),
            CleanupRule::CollapseSpacedLetters => self.collapse_spaced_letters(text),
            CleanupRule::CollapseWhitespace => self.collapse_whitespace(text),
            CleanupRule::StripDisallowed => self.strip_disallowed(text),
            CleanupRule::DropShortLines => drop_short_lines(text),
        }
    }

    /// `"self- contained"` becomes `"self-contained"`.
    pub(crate) fn rejoin_wrapped_hyphens(&self, text: &str) -> String {
        self.wrapped_hyphen.replace_all(text, "-").into_owned()
    }

    /// `"Zimmer- man"` becomes `"Zimmerman"`.
    pub(crate) fn join_split_names(&self, text: &str) -> String {
        self.split_name.replace_all(text, "${1}${2}").into_owned()
    }

    /// `"west-ern"` becomes `"western"`. Also merges real compounds such as
    /// `"well-known"`; disable the rule when that matters.
    pub(crate) fn join_lowercase_hyphens(&self, text: &str) -> String {
        self.lowercase_hyphen.replace_all(text, "${1}${2}").into_owned()
    }

    /// Joins OCR output that split a word into single spaced letters. Longest
    /// run first so a five-letter run is not consumed as a three-letter one.
    pub(crate) fn collapse_spaced_letters(&self, text: &str) -> String {
        let text = self
            .spaced_letters_five
            .replace_all(text, "${1}${2}${3}${4}${5}");
        let text = self
            .spaced_letters_four
            .replace_all(&text, "${1}${2}${3}${4}");
        self.spaced_letters_three
            .replace_all(&text, "${1}${2}${3}")
            .into_owned()
    }

    pub(crate) fn collapse_whitespace(&self, text: &str) -> String {
        self.whitespace_run.replace_all(text, " ").into_owned()
    }

    pub(crate) fn strip_disallowed(&self, text: &str) -> String {
        self.disallowed_run.replace_all(text, " ").into_owned()
    }
}

/// Drops page numbers and other furniture: lines of 10 characters or fewer.
pub(crate) fn drop_short_lines(text: &str) -> String {
    text.split('\n')
        .map(str::trim)
        .filter(|line| line.chars().count() >= MIN_KEPT_LINE_CHARS)
        .collect::<Vec<&str>>()
        .join("\n")
}
