use super::Lemmatizer;

use std::sync::Arc;

/// Turns expanded terms into their lemmatized forms, position for position.
///
/// Multi-word terms are split into words, every word of every term goes to the
/// lemmatizer in a single call, and the lemmas are regrouped per term. The output
/// therefore has exactly one entry per input term, or is empty when the
/// lemmatizer failed, answered with the wrong number of lemmas, or was asked
/// about nothing.
pub struct TermNormalizer {
    lemmatizer: Option<Arc<dyn Lemmatizer>>,
}

impl TermNormalizer {
    pub fn new(lemmatizer: Arc<dyn Lemmatizer>) -> Self {
        Self {
            lemmatizer: Some(lemmatizer),
        }
    }

    /// Normalization switched off: terms pass through untouched.
    pub fn disabled() -> Self {
        Self { lemmatizer: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.lemmatizer.is_some()
    }

    pub async fn normalize(&self, terms: &[String]) -> Vec<String> {
        let Some(lemmatizer) = &self.lemmatizer else {
            return terms.to_vec();
        };

        let groups: Vec<usize> = terms
            .iter()
            .map(|term| term.split_whitespace().count())
            .collect();
        let words: Vec<String> = terms
            .iter()
            .flat_map(|term| term.split_whitespace().map(str::to_string))
            .collect();

        if words.is_empty() {
            return Vec::new();
        }

        let lemmas = match lemmatizer.lemmatize(&words).await {
            Ok(lemmas) => lemmas,
            Err(e) => {
                tracing::warn!("Lemmatization via {} failed: {}", lemmatizer.name(), e);
                return Vec::new();
            }
        };

        if lemmas.len() != words.len() {
            tracing::warn!(
                "Lemmatizer returned {} lemmas for {} words, discarding",
                lemmas.len(),
                words.len()
            );
            return Vec::new();
        }

        let mut lemmas = lemmas.into_iter();
        groups
            .into_iter()
            .map(|count| {
                lemmas
                    .by_ref()
                    .take(count)
                    .filter(|lemma| !lemma.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }
}
