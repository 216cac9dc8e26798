//! Aggregates over recorded searches, split by pipeline mode.

use super::types::{
    LogSummary, ModeBreakdown, ModeStats, QueryModeStats, QuerySummary, SearchLogRecord,
};

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Basic,
    Synonyms,
    SynLemma,
}

impl SearchMode {
    pub fn label(self) -> &'static str {
        match self {
            SearchMode::Basic => "Basic",
            SearchMode::Synonyms => "Synonyms",
            SearchMode::SynLemma => "Syn+Lemma",
        }
    }

    /// Exact mode; lemmas without expansion has none.
    pub fn of(record: &SearchLogRecord) -> Option<Self> {
        match (record.expanded, record.lemmas) {
            (false, false) => Some(SearchMode::Basic),
            (true, false) => Some(SearchMode::Synonyms),
            (true, true) => Some(SearchMode::SynLemma),
            (false, true) => None,
        }
    }

    /// Mode used when grouping per query, where lemmas-only counts as `Basic`.
    pub fn grouping(record: &SearchLogRecord) -> Self {
        Self::of(record).unwrap_or(SearchMode::Basic)
    }
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Lower-middle and upper-middle averaged for even counts; `0.0` when empty.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    let h = (n - 1) / 2;
    if n % 2 == 1 {
        sorted[h]
    } else {
        (sorted[h] + sorted[h + 1]) / 2.0
    }
}

fn mode_stats<'a>(records: impl Iterator<Item = &'a SearchLogRecord>) -> ModeStats {
    let (results, times): (Vec<f64>, Vec<f64>) = records
        .map(|r| (r.result_count as f64, r.duration))
        .unzip();
    ModeStats {
        count: results.len(),
        avg_results: round_to(mean(&results), 2),
        avg_time: round_to(mean(&times), 3),
    }
}

pub fn summarize(records: &[SearchLogRecord]) -> LogSummary {
    let in_mode = |mode: SearchMode| {
        mode_stats(
            records
                .iter()
                .filter(move |r| SearchMode::of(r) == Some(mode)),
        )
    };

    let overall = mode_stats(records.iter());
    LogSummary {
        total: overall.count,
        avg_results: overall.avg_results,
        avg_time: overall.avg_time,
        modes: ModeBreakdown {
            basic: in_mode(SearchMode::Basic),
            synonyms: in_mode(SearchMode::Synonyms),
            syn_lemma: in_mode(SearchMode::SynLemma),
        },
    }
}

/// Groups `records` (newest first) by trimmed, lowercased query and reports the
/// first `max_queries` groups with per-mode statistics.
pub fn summarize_per_query(records: &[SearchLogRecord], max_queries: usize) -> Vec<QuerySummary> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: BTreeMap<String, Vec<&SearchLogRecord>> = BTreeMap::new();

    for record in records {
        let key = record.query.trim().to_lowercase();
        let group = groups.entry(key.clone()).or_default();
        if group.is_empty() {
            order.push(key);
        }
        group.push(record);
    }

    order
        .into_iter()
        .take(max_queries)
        .map(|query| {
            let mut by_mode: BTreeMap<String, Vec<&SearchLogRecord>> = BTreeMap::new();
            for &record in groups.get(&query).into_iter().flatten() {
                by_mode
                    .entry(SearchMode::grouping(record).label().to_string())
                    .or_default()
                    .push(record);
            }

            let modes = by_mode
                .into_iter()
                .map(|(label, logs)| {
                    let results: Vec<f64> = logs.iter().map(|l| l.result_count as f64).collect();
                    let times: Vec<f64> = logs.iter().map(|l| l.duration).collect();
                    let stats = QueryModeStats {
                        count: logs.len(),
                        avg_results: round_to(mean(&results), 2),
                        med_results: median(&results),
                        avg_time: round_to(mean(&times), 3),
                        med_time: median(&times),
                    };
                    (label, stats)
                })
                .collect();

            QuerySummary { query, modes }
        })
        .collect()
}
