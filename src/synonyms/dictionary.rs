//! Synonym Dictionary
//!
//! Backed by a JSON object on disk:
//!
//! ```json
//! { "neural networks": [["deep learning", 0.61], ["perceptron", 0.34]] }
//! ```
//!
//! The in-memory view is an immutable snapshot keyed by `normalize_key`. It is
//! swapped wholesale on `reload`, so searches running concurrently with an
//! update see either the old or the new dictionary, never a mix.

use super::normalize::normalize_key;
use crate::search::types::WeightedTerm;

use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub type SynonymMap = HashMap<String, Vec<WeightedTerm>>;

#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    #[error("failed to access dictionary {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("dictionary {path} is not a JSON object: {reason}")]
    Malformed { path: String, reason: String },
    #[error("failed to encode dictionary: {0}")]
    Encode(#[from] serde_json::Error),
}

pub struct SynonymDictionary {
    path: PathBuf,
    entries: RwLock<Arc<SynonymMap>>,
    // Serializes read-modify-write cycles on the backing file.
    write_lock: tokio::sync::Mutex<()>,
}

impl SynonymDictionary {
    /// Opens the dictionary at `path`. Never fails: a missing or corrupt file
    /// yields an empty dictionary.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load(&path);
        tracing::info!(
            "Loaded {} synonym entries from {}",
            entries.len(),
            path.display()
        );
        Self {
            path,
            entries: RwLock::new(Arc::new(entries)),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Dictionary with fixed contents whose backing path is `path`.
    pub fn with_entries(path: impl Into<PathBuf>, entries: SynonymMap) -> Self {
        Self {
            path: path.into(),
            entries: RwLock::new(Arc::new(entries)),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> Arc<SynonymMap> {
        self.entries.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Synonyms registered for `query`, compared by normalized key.
    pub fn lookup(&self, query: &str) -> Option<Vec<WeightedTerm>> {
        self.snapshot().get(&normalize_key(query)).cloned()
    }

    /// Re-reads the backing file and swaps in the result. Returns the entry count.
    pub async fn reload(&self) -> usize {
        let entries = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => parse_or_empty(&self.path, &text),
            Err(e) => {
                tracing::warn!(
                    "Synonym dictionary {} unavailable, expansion disabled: {}",
                    self.path.display(),
                    e
                );
                SynonymMap::new()
            }
        };
        let count = entries.len();
        *self.entries.write() = Arc::new(entries);
        tracing::info!("Reloaded synonym dictionary: {} entries", count);
        count
    }

    /// The backing file as written, or `None` when it does not exist.
    pub async fn read_raw(&self) -> Result<Option<Map<String, Value>>, DictionaryError> {
        read_object(&self.path).await
    }

    /// Replaces the synonyms of `term` and rewrites the whole file atomically,
    /// then reloads. An existing key that normalizes to the same key as `term`
    /// is replaced in place, so the new list is the one lookups find.
    pub async fn update(
        &self,
        term: &str,
        synonyms: &[(String, f64)],
    ) -> Result<Map<String, Value>, DictionaryError> {
        let _guard = self.write_lock.lock().await;

        let mut raw = read_object(&self.path).await?.unwrap_or_default();
        let value = Value::Array(
            synonyms
                .iter()
                .map(|(synonym, weight)| serde_json::json!([synonym, weight]))
                .collect(),
        );

        let target = normalize_key(term);
        let existing = raw.keys().find(|key| normalize_key(key) == target).cloned();
        match existing {
            Some(key) => {
                if let Some(slot) = raw.get_mut(&key) {
                    *slot = value;
                }
            }
            None => {
                raw.insert(term.to_string(), value);
            }
        }

        write_atomically(&self.path, &raw).await?;
        self.reload().await;
        Ok(raw)
    }
}

/// Reads the dictionary file, falling back to an empty map on any failure.
pub fn load(path: &Path) -> SynonymMap {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(
                "Synonym dictionary {} unavailable, expansion disabled: {}",
                path.display(),
                e
            );
            return SynonymMap::new();
        }
    };

    parse_or_empty(path, &text)
}

fn parse_or_empty(path: &Path, text: &str) -> SynonymMap {
    match parse_dictionary(text) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(
                "Synonym dictionary {} is malformed, expansion disabled: {}",
                path.display(),
                e
            );
            SynonymMap::new()
        }
    }
}

/// Parses dictionary JSON into a normalized map.
///
/// Keys are visited in file order and the first key claiming a normalized form
/// wins. Entries that are not `[string, weight]` pairs with a non-empty string
/// are skipped; weights go through `coerce_weight`. A value that is not an array
/// contributes no synonyms.
pub fn parse_dictionary(text: &str) -> Result<SynonymMap, serde_json::Error> {
    let raw: Map<String, Value> = serde_json::from_str(text)?;

    let mut entries = SynonymMap::new();
    for (key, value) in raw {
        let normalized = normalize_key(&key);
        if entries.contains_key(&normalized) {
            tracing::debug!("Synonym key '{}' shadowed by an earlier entry", key);
            continue;
        }

        let synonyms = match value {
            Value::Array(pairs) => pairs.iter().filter_map(parse_pair).collect(),
            _ => Vec::new(),
        };
        entries.insert(normalized, synonyms);
    }
    Ok(entries)
}

fn parse_pair(pair: &Value) -> Option<WeightedTerm> {
    let items = pair.as_array()?;
    let term = items.first()?.as_str()?;
    if term.is_empty() {
        return None;
    }
    let weight = items.get(1).map(coerce_weight).unwrap_or(0.0);
    Some(WeightedTerm::new(term, weight))
}

/// Numbers and numeric strings are taken as-is; anything else, and any
/// negative or non-finite value, becomes `0.0`.
pub fn coerce_weight(value: &Value) -> f64 {
    let weight = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}

async fn read_object(path: &Path) -> Result<Option<Map<String, Value>>, DictionaryError> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(DictionaryError::Io {
                path: path.display().to_string(),
                source,
            });
        }
    };

    serde_json::from_str(&text)
        .map(Some)
        .map_err(|e| DictionaryError::Malformed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}

async fn write_atomically(path: &Path, raw: &Map<String, Value>) -> Result<(), DictionaryError> {
    let encoded = serde_json::to_string_pretty(raw)?;
    let tmp = path.with_extension("json.tmp");
    let io_err = |source| DictionaryError::Io {
        path: path.display().to_string(),
        source,
    };

    tokio::fs::write(&tmp, encoded).await.map_err(io_err)?;
    tokio::fs::rename(&tmp, path).await.map_err(io_err)?;
    Ok(())
}
