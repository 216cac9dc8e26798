//! Search Log Types

use crate::search::types::WeightedTerm;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One executed search, as recorded by a `SearchLogSink`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchLogRecord {
    pub id: Uuid,
    pub query: String,
    pub expanded: bool,
    pub lemmas: bool,
    pub expanded_terms: Vec<WeightedTerm>,
    pub normalized_terms: Vec<String>,
    pub result_count: usize,
    /// Seconds.
    pub duration: f64,
    /// Milliseconds since the Unix epoch.
    pub created_at: u64,
}

impl SearchLogRecord {
    pub fn new(
        query: &str,
        expanded: bool,
        lemmas: bool,
        expanded_terms: Vec<WeightedTerm>,
        normalized_terms: Vec<String>,
        result_count: usize,
        duration: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            query: query.to_string(),
            expanded,
            lemmas,
            expanded_terms,
            normalized_terms,
            result_count,
            duration,
            created_at: now_ms(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchLogsResponse {
    pub status: String,
    pub logs: Vec<SearchLogRecord>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModeStats {
    pub count: usize,
    pub avg_results: f64,
    pub avg_time: f64,
}

/// Per-mode breakdown. Searches with lemmas but no expansion are not part of
/// any mode here.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModeBreakdown {
    #[serde(rename = "Basic")]
    pub basic: ModeStats,
    #[serde(rename = "Synonyms")]
    pub synonyms: ModeStats,
    #[serde(rename = "Syn+Lemma")]
    pub syn_lemma: ModeStats,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogSummary {
    pub total: usize,
    pub avg_results: f64,
    pub avg_time: f64,
    pub modes: ModeBreakdown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryModeStats {
    pub count: usize,
    pub avg_results: f64,
    pub med_results: f64,
    pub avg_time: f64,
    pub med_time: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuerySummary {
    pub query: String,
    pub modes: std::collections::BTreeMap<String, QueryModeStats>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuerySummaryResponse {
    pub status: String,
    pub queries: Vec<QuerySummary>,
}

pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
