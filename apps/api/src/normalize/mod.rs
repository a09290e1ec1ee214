//! Turns raw resume text into the reduced token stream the role model reads.

pub mod lexicon;
pub mod patterns;
pub mod tagger;

use std::collections::HashSet;
use std::sync::Arc;

use stop_words::LANGUAGE;

pub use patterns::redact;
pub use tagger::{EntityLabel, LexiconTagger, TokenTagger};

/// Leading tokens dropped after filtering; they are usually a name or title fragment.
const LEADING_TOKENS_DROPPED: usize = 2;

pub struct Normalizer {
    stopwords: HashSet<String>,
    tagger: Arc<dyn TokenTagger>,
}

impl Normalizer {
    pub fn new(stopwords: HashSet<String>, tagger: Arc<dyn TokenTagger>) -> Self {
        Self { stopwords, tagger }
    }

    /// English stopwords with the built-in lexicon tagger.
    pub fn english() -> Self {
        let stopwords = stop_words::get(LANGUAGE::English)
            .iter()
            .map(|s| s.to_lowercase())
            .collect();
        Self::new(stopwords, Arc::new(LexiconTagger::new()))
    }

    /// Pure: the same input always yields the same output.
    pub fn normalize(&self, raw: &str) -> String {
        let redacted = redact(raw);
        let tokens: Vec<&str> = redacted.split(' ').filter(|t| !t.is_empty()).collect();

        let entities = self.tagger.entities(&tokens);
        let tokens: Vec<&str> = tokens
            .into_iter()
            .zip(entities)
            .filter(|(_, label)| !matches!(label, Some(EntityLabel::Person | EntityLabel::Gpe)))
            .map(|(token, _)| token)
            .collect();

        let tokens: Vec<&str> = tokens
            .into_iter()
            .filter(|t| !self.stopwords.contains(&t.to_lowercase()))
            .collect();

        let verbs = self.tagger.verbs(&tokens);
        let tokens: Vec<&str> = tokens
            .into_iter()
            .zip(verbs)
            .filter(|(_, is_verb)| !is_verb)
            .map(|(token, _)| token)
            .collect();

        if tokens.len() <= LEADING_TOKENS_DROPPED {
            return String::new();
        }
        tokens[LEADING_TOKENS_DROPPED..].join(" ")
    }
}
