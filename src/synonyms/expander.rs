use super::dictionary::SynonymDictionary;
use crate::search::types::WeightedTerm;

use std::sync::Arc;

/// Injects dictionary synonyms into a query.
pub struct QueryExpander {
    dictionary: Arc<SynonymDictionary>,
}

impl QueryExpander {
    pub fn new(dictionary: Arc<SynonymDictionary>) -> Self {
        Self { dictionary }
    }

    /// The query itself at weight `1.0`, followed by every synonym listed under
    /// its normalized key with the declared weight. Single level: synonyms are
    /// not expanded further. An unloadable dictionary simply has no matches.
    pub fn expand_with_weights(&self, query: &str) -> Vec<WeightedTerm> {
        let mut expanded = vec![WeightedTerm::original(query)];

        if let Some(synonyms) = self.dictionary.lookup(query) {
            tracing::debug!("Expanded '{}' with {} synonyms", query, synonyms.len());
            expanded.extend(synonyms);
        }

        expanded
    }
}
