use std::collections::HashMap;
use std::fmt;

use crate::config::QualityGate;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum QualityVerdict {
    Accepted,
    TooShort,
    LowAlphabeticRatio,
    RepeatedGlyph,
}

impl QualityVerdict {
    pub(crate) fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::TooShort => "too_short",
            Self::LowAlphabeticRatio => "low_alphabetic_ratio",
            Self::RepeatedGlyph => "repeated_glyph",
        }
    }
}

impl fmt::Display for QualityVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl QualityGate {
    /// Decides whether extracted text looks like prose rather than glyph noise.
    ///
    /// Lengths and ratios are measured in characters. The repeated-glyph check
    /// counts characters case-insensitively against the untrimmed length.
    pub(crate) fn evaluate(&self, text: &str) -> QualityVerdict {
        if text.trim().chars().count() < self.min_text_chars {
            return QualityVerdict::TooShort;
        }

        // Non-zero: the config requires min_text_chars >= 1.
        let total_chars = text.chars().count();

        let letters = text.chars().filter(|character| character.is_alphabetic()).count();
        if (letters as f64) / (total_chars as f64) < self.min_alpha_ratio {
            return QualityVerdict::LowAlphabeticRatio;
        }

        let mut counts = HashMap::<char, usize>::new();
        for character in text.chars().flat_map(char::to_lowercase) {
            *counts.entry(character).or_insert(0) += 1;
        }
        let most_common = counts.values().copied().max().unwrap_or(0);
        if (most_common as f64) > (total_chars as f64) * self.max_char_share {
            return QualityVerdict::RepeatedGlyph;
        }

        QualityVerdict::Accepted
    }
}
