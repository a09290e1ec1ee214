use std::collections::HashSet;

use super::lexicon::{
    GIVEN_NAMES, IRREGULAR_FORMS, MULTI_WORD_PLACES, NOUN_LIKE_VERBS, PLACES, VERB_BASES,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityLabel {
    Person,
    /// Geopolitical entity: country, state or city.
    Gpe,
}

/// Linguistic annotator used by the entity and verb removal steps.
///
/// Both methods return one entry per input token.
pub trait TokenTagger: Send + Sync {
    fn entities(&self, tokens: &[&str]) -> Vec<Option<EntityLabel>>;
    fn verbs(&self, tokens: &[&str]) -> Vec<bool>;
}

/// Gazetteer tagger over the built-in English word lists.
///
/// Entities must be capitalised. A known given name also claims the capitalised
/// token after it as the surname.
pub struct LexiconTagger {
    given_names: HashSet<&'static str>,
    places: HashSet<&'static str>,
    multi_word_places: HashSet<&'static str>,
    verb_forms: HashSet<String>,
}

impl LexiconTagger {
    pub fn new() -> Self {
        let mut verb_forms: HashSet<String> = IRREGULAR_FORMS.iter().map(|s| s.to_string()).collect();
        for base in VERB_BASES {
            verb_forms.insert(base.to_string());
            verb_forms.extend(inflections(base));
        }
        for base in NOUN_LIKE_VERBS {
            verb_forms.extend(inflections(base));
        }

        Self {
            given_names: GIVEN_NAMES.iter().copied().collect(),
            places: PLACES.iter().copied().collect(),
            multi_word_places: MULTI_WORD_PLACES.iter().copied().collect(),
            verb_forms,
        }
    }
}

impl Default for LexiconTagger {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenTagger for LexiconTagger {
    fn entities(&self, tokens: &[&str]) -> Vec<Option<EntityLabel>> {
        let mut labels = vec![None; tokens.len()];
        let mut i = 0;

        while i < tokens.len() {
            if !is_capitalised(tokens[i]) {
                i += 1;
                continue;
            }

            let lower = tokens[i].to_lowercase();

            if let Some(next) = tokens.get(i + 1).filter(|t| is_capitalised(t)) {
                let pair = format!("{lower} {}", next.to_lowercase());
                if self.multi_word_places.contains(pair.as_str()) {
                    labels[i] = Some(EntityLabel::Gpe);
                    labels[i + 1] = Some(EntityLabel::Gpe);
                    i += 2;
                    continue;
                }
            }

            if self.places.contains(lower.as_str()) {
                labels[i] = Some(EntityLabel::Gpe);
                i += 1;
            } else if self.given_names.contains(lower.as_str()) {
                labels[i] = Some(EntityLabel::Person);
                match tokens.get(i + 1) {
                    Some(next) if is_capitalised(next) && is_alphabetic(next) => {
                        labels[i + 1] = Some(EntityLabel::Person);
                        i += 2;
                    }
                    _ => i += 1,
                }
            } else {
                i += 1;
            }
        }

        labels
    }

    fn verbs(&self, tokens: &[&str]) -> Vec<bool> {
        tokens
            .iter()
            .map(|t| self.verb_forms.contains(&t.to_lowercase()))
            .collect()
    }
}

fn is_capitalised(token: &str) -> bool {
    token.chars().next().is_some_and(char::is_uppercase)
}

fn is_alphabetic(token: &str) -> bool {
    token.chars().all(char::is_alphabetic)
}

/// Regular past tense and gerund of `base`.
fn inflections(base: &str) -> [String; 2] {
    let past = if base.ends_with('e') {
        format!("{base}d")
    } else if let Some(stem) = base.strip_suffix('y').filter(|s| !s.ends_with(is_vowel)) {
        format!("{stem}ied")
    } else {
        format!("{base}ed")
    };

    let gerund = if let Some(stem) = base.strip_suffix("ie") {
        format!("{stem}ying")
    } else if base.ends_with('e') && !base.ends_with("ee") {
        format!("{}ing", &base[..base.len() - 1])
    } else {
        format!("{base}ing")
    };

    [past, gerund]
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}
