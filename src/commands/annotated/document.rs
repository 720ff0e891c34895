use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TokenEntry {
    pub text: String,
    pub sentence_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SentenceTokens {
    pub id: String,
    pub words: Vec<String>,
}

/// Token stream of one `_en.xml` document: `<s id>` sentences made of
/// `<w id>` words.
#[derive(Debug, Default)]
pub(crate) struct AnnotatedText {
    tokens: HashMap<String, TokenEntry>,
    sentences: Vec<SentenceTokens>,
}

impl AnnotatedText {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Sentences without an `id` get a synthetic `#<ordinal>` id so they stay
    /// distinct; sentences sharing an id are merged in document order.
    pub(crate) fn parse(xml: &str) -> Result<Self> {
        let document = roxmltree::Document::parse(xml).context("invalid token XML")?;

        let mut text = Self::default();
        let mut sentence_index = HashMap::<String, usize>::new();

        let sentence_nodes = document
            .descendants()
            .filter(|node| node.has_tag_name("s"));
        for (ordinal, sentence) in sentence_nodes.enumerate() {
            let sentence_id = sentence
                .attribute("id")
                .map(ToOwned::to_owned)
                .unwrap_or_else(|| format!("#{}", ordinal + 1));

            let index = *sentence_index.entry(sentence_id.clone()).or_insert_with(|| {
                text.sentences.push(SentenceTokens {
                    id: sentence_id.clone(),
                    words: Vec::new(),
                });
                text.sentences.len() - 1
            });

            for word in sentence.children().filter(|node| node.has_tag_name("w")) {
                let word_text = word.text().unwrap_or_default().to_string();
                text.sentences[index].words.push(word_text.clone());
                if let Some(word_id) = word.attribute("id") {
                    text.tokens.insert(
                        word_id.to_string(),
                        TokenEntry {
                            text: word_text,
                            sentence_id: Some(sentence_id.clone()),
                        },
                    );
                }
            }
        }

        for word in document.descendants().filter(|node| node.has_tag_name("w")) {
            let Some(word_id) = word.attribute("id") else {
                continue;
            };
            text.tokens
                .entry(word_id.to_string())
                .or_insert_with(|| TokenEntry {
                    text: word.text().unwrap_or_default().to_string(),
                    sentence_id: None,
                });
        }

        Ok(text)
    }

    pub(crate) fn token(&self, id: &str) -> Option<&TokenEntry> {
        self.tokens.get(id)
    }

    pub(crate) fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub(crate) fn sentences(&self) -> &[SentenceTokens] {
        &self.sentences
    }
}
