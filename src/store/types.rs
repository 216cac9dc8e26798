//! Article Data Types
//!
//! Records served by the document store. `Article` is the full record returned to
//! clients; `NormalizedArticle` is the lemmatized projection that scoring runs over.
//! Both share the same `ArticleId`.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static OBJECT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{24}$").expect("valid object id pattern"));

/// Opaque article identifier: 24 hex characters, stored lowercase.
///
/// Accepts either a bare string or the extended export form `{"$oid": "..."}`,
/// and always serializes back to a bare string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "RawArticleId", into = "String")]
pub struct ArticleId(String);

#[derive(Debug, thiserror::Error)]
#[error("invalid article id '{0}': expected 24 hex characters")]
pub struct InvalidArticleId(pub String);

impl ArticleId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ArticleId {
    type Err = InvalidArticleId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if OBJECT_ID.is_match(trimmed) {
            Ok(Self(trimmed.to_ascii_lowercase()))
        } else {
            Err(InvalidArticleId(s.to_string()))
        }
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ArticleId> for String {
    fn from(id: ArticleId) -> Self {
        id.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawArticleId {
    Plain(String),
    Extended {
        #[serde(rename = "$oid")]
        oid: String,
    },
}

impl TryFrom<RawArticleId> for ArticleId {
    type Error = InvalidArticleId;

    fn try_from(raw: RawArticleId) -> Result<Self, Self::Error> {
        match raw {
            RawArticleId::Plain(id) | RawArticleId::Extended { oid: id } => id.parse(),
        }
    }
}

/// Full article record as returned by search and `/article/:id`.
///
/// Decoded leniently from store exports (see `RawArticle`): a record is only
/// rejected when it has no usable id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawArticle")]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub tags: Vec<String>,
    pub authors: Vec<String>,
    pub affiliations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arxiv_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_category: Option<String>,
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl Article {
    /// Minimal record with only the searchable fields set.
    pub fn new(id: ArticleId, title: &str, abstract_text: &str, tags: &[&str]) -> Self {
        Self {
            id,
            title: title.to_string(),
            abstract_text: abstract_text.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            authors: Vec::new(),
            affiliations: Vec::new(),
            date: None,
            updated: None,
            arxiv_id: None,
            primary_category: None,
            categories: Vec::new(),
            doi: None,
            pdf_url: None,
            comment: None,
            journal_ref: None,
            lang: None,
        }
    }
}

/// Lemmatized projection of an article. Only `title`, `abstract` and `tags` take
/// part in scoring.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawNormalizedArticle")]
pub struct NormalizedArticle {
    pub id: ArticleId,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl NormalizedArticle {
    pub fn new(id: ArticleId, title: &str, abstract_text: &str, tags: &[&str]) -> Self {
        Self {
            id,
            title: title.to_string(),
            abstract_text: abstract_text.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            author: None,
            date: None,
        }
    }
}

// Export records may carry the store id under `_id`, the arXiv id under `id`,
// or both. Every other field tolerates nulls and foreign shapes.
#[derive(Deserialize)]
struct RawArticle {
    #[serde(rename = "_id", default)]
    store_id: Option<Value>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    title: String,
    #[serde(rename = "abstract", default, deserialize_with = "lenient_string")]
    abstract_text: String,
    #[serde(default, deserialize_with = "lenient_strings")]
    tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    authors: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    affiliations: Vec<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    updated: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    arxiv_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    primary_category: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    categories: Vec<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    doi: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pdf_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    comment: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    journal_ref: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    lang: Option<String>,
}

impl TryFrom<RawArticle> for Article {
    type Error = InvalidArticleId;

    fn try_from(raw: RawArticle) -> Result<Self, Self::Error> {
        let (id, external) = resolve_id(raw.store_id.as_ref(), raw.id.as_ref())?;
        Ok(Self {
            id,
            title: raw.title,
            abstract_text: raw.abstract_text,
            tags: raw.tags,
            authors: raw.authors,
            affiliations: raw.affiliations,
            date: raw.date,
            updated: raw.updated,
            arxiv_id: raw.arxiv_id.or(external),
            primary_category: raw.primary_category,
            categories: raw.categories,
            doi: raw.doi,
            pdf_url: raw.pdf_url,
            comment: raw.comment,
            journal_ref: raw.journal_ref,
            lang: raw.lang,
        })
    }
}

#[derive(Deserialize)]
struct RawNormalizedArticle {
    #[serde(rename = "_id", default)]
    store_id: Option<Value>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    title: String,
    #[serde(rename = "abstract", default, deserialize_with = "lenient_string")]
    abstract_text: String,
    #[serde(default, deserialize_with = "lenient_strings")]
    tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    author: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    date: Option<String>,
}

impl TryFrom<RawNormalizedArticle> for NormalizedArticle {
    type Error = InvalidArticleId;

    fn try_from(raw: RawNormalizedArticle) -> Result<Self, Self::Error> {
        let (id, _) = resolve_id(raw.store_id.as_ref(), raw.id.as_ref())?;
        Ok(Self {
            id,
            title: raw.title,
            abstract_text: raw.abstract_text,
            tags: raw.tags,
            author: raw.author,
            date: raw.date,
        })
    }
}

/// Picks the record id. `_id` wins when present and must be valid; otherwise
/// `id` must be one. When `_id` is used, a non-hex `id` is handed back as the
/// external (arXiv) identifier.
fn resolve_id(
    store_id: Option<&Value>,
    id: Option<&Value>,
) -> Result<(ArticleId, Option<String>), InvalidArticleId> {
    let id_text = id.and_then(value_text);

    match store_id.filter(|v| !v.is_null()) {
        Some(value) => {
            let parsed = object_id(value)?;
            let external = id_text.filter(|text| text.parse::<ArticleId>().is_err());
            Ok((parsed, external))
        }
        None => match id_text {
            Some(text) => Ok((text.parse()?, None)),
            None => Err(InvalidArticleId("<missing>".to_string())),
        },
    }
}

fn object_id(value: &Value) -> Result<ArticleId, InvalidArticleId> {
    match value {
        Value::String(s) => s.parse(),
        Value::Object(map) => match map.get("$oid") {
            Some(Value::String(s)) => s.parse(),
            _ => Err(InvalidArticleId(value.to_string())),
        },
        other => Err(InvalidArticleId(other.to_string())),
    }
}

/// Plain text out of a scalar or an extended-JSON wrapper such as
/// `{"$date": "..."}`, `{"$date": {"$numberLong": "..."}}` or `{"$oid": "..."}`.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => ["$date", "$numberLong", "$oid"]
            .iter()
            .find_map(|key| map.get(*key))
            .and_then(value_text),
        _ => None,
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_text(&value))
}

/// `null` and non-text values read as an empty string.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}

/// Accepts an array of strings, silently skipping non-string entries.
/// Anything that is not an array (null, a number, an object) reads as empty.
fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}
