//! Search Module Tests
//!
//! Validates the search pipeline, from term pairing to ranking and hydration.
//!
//! ## Test Scopes
//! - **Scoring**: Field weights, substring semantics and weight scaling.
//! - **Pairing**: Lemmatized terms keep the weight of the term they came from.
//! - **Ranking**: Zero scores are excluded and ties keep corpus order.
//! - **Pipeline**: End-to-end searches over an in-memory store, with failing
//!   collaborators.

#[cfg(test)]
mod tests {
    use crate::lemmatizer::normalizer::TermNormalizer;
    use crate::lemmatizer::{LemmaFuture, Lemmatizer, LemmatizerError};
    use crate::logs::sink::{MemorySearchLog, SearchLogSink, SinkFuture};
    use crate::logs::types::SearchLogRecord;
    use crate::search::engine::{NOTHING_FOUND, SearchPipeline, pair_weights, rank_candidates};
    use crate::search::error::SearchError;
    use crate::search::handlers::parse_flag;
    use crate::search::scorer::{
        RelevanceScorer, Scorer, SubstringScorer, TextIndexScorer, round_score, score,
    };
    use crate::search::tokenizer::{tokenize_query, tokenize_text};
    use crate::search::types::{ScoredResult, WeightedTerm};
    use crate::store::memory::MemoryStore;
    use crate::store::types::{Article, ArticleId, NormalizedArticle};
    use crate::store::{DocumentStore, StoreError};
    use crate::synonyms::dictionary::{SynonymDictionary, SynonymMap};
    use crate::synonyms::expander::QueryExpander;
    use std::sync::Arc;
    use std::time::Duration;

    fn oid(n: u32) -> ArticleId {
        format!("{:024x}", n).parse().unwrap()
    }

    fn doc(n: u32, title: &str, abstract_text: &str, tags: &[&str]) -> NormalizedArticle {
        NormalizedArticle::new(oid(n), title, abstract_text, tags)
    }

    fn article(n: u32, title: &str) -> Article {
        Article::new(oid(n), title, "", &[])
    }

    fn graph_doc() -> NormalizedArticle {
        doc(
            1,
            "Graph Neural Networks",
            "deep learning on graphs",
            &["ml", "graphs"],
        )
    }

    struct UppercaseLemmatizer;

    impl Lemmatizer for UppercaseLemmatizer {
        fn name(&self) -> &'static str {
            "uppercase"
        }

        fn lemmatize<'a>(&'a self, words: &'a [String]) -> LemmaFuture<'a> {
            Box::pin(async move { Ok(words.iter().map(|w| w.to_uppercase()).collect()) })
        }
    }

    struct BrokenLemmatizer;

    impl Lemmatizer for BrokenLemmatizer {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn lemmatize<'a>(&'a self, _words: &'a [String]) -> LemmaFuture<'a> {
            Box::pin(async move { Err(LemmatizerError::EmptyOutput) })
        }
    }

    struct FailingSink;

    impl SearchLogSink for FailingSink {
        fn record(&self, _record: SearchLogRecord) -> SinkFuture<'_, ()> {
            Box::pin(async move { Err(anyhow::anyhow!("disk full")) })
        }

        fn recent(&self, _limit: usize) -> SinkFuture<'_, Vec<SearchLogRecord>> {
            Box::pin(async move { Err(anyhow::anyhow!("disk full")) })
        }
    }

    struct UnavailableStore;

    impl DocumentStore for UnavailableStore {
        fn normalized_articles(&self) -> Result<Arc<Vec<NormalizedArticle>>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }

        fn articles_by_ids(&self, _ids: &[ArticleId]) -> Result<Vec<Article>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }

        fn article(&self, _id: &ArticleId) -> Result<Option<Article>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }

        fn text_search(&self, _terms: &[WeightedTerm]) -> Result<Vec<ScoredResult>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    fn pipeline_with(
        store: Arc<dyn DocumentStore>,
        synonyms: SynonymMap,
        normalizer: TermNormalizer,
        sink: Arc<dyn SearchLogSink>,
    ) -> SearchPipeline {
        let dictionary = Arc::new(SynonymDictionary::with_entries(
            std::env::temp_dir().join("unused-synonyms.json"),
            synonyms,
        ));
        SearchPipeline::new(
            QueryExpander::new(dictionary),
            normalizer,
            Arc::new(SubstringScorer::new(store.clone(), 2)),
            store,
            sink,
        )
    }

    fn neural_synonyms() -> SynonymMap {
        let mut map = SynonymMap::new();
        map.insert(
            "neuralnetworks".to_string(),
            vec![
                WeightedTerm::new("deep learning", 0.61),
                WeightedTerm::new("perceptron", 0.34),
            ],
        );
        map
    }

    // ============================================================
    // SCORING TESTS
    // ============================================================

    #[test]
    fn test_score_counts_every_field() {
        let terms = vec![WeightedTerm::original("graph")];

        // title 3 + abstract "graphs" 2 + tag "graphs" 1
        assert_eq!(score(&graph_doc(), &terms), 6.0);
    }

    #[test]
    fn test_score_is_case_insensitive() {
        let terms = vec![WeightedTerm::original("GRAPH")];
        assert_eq!(score(&graph_doc(), &terms), 6.0);
    }

    #[test]
    fn test_score_counts_each_matching_tag() {
        let d = doc(2, "", "", &["graph theory", "graphs", "ml"]);
        let terms = vec![WeightedTerm::original("graph")];

        assert_eq!(score(&d, &terms), 2.0);
    }

    #[test]
    fn test_score_scales_with_weight() {
        let d = graph_doc();
        let full = score(&d, &[WeightedTerm::new("graph", 1.0)]);
        let partial = score(&d, &[WeightedTerm::new("graph", 0.5)]);

        assert_eq!(partial, round_score(full * 0.5));
    }

    #[test]
    fn test_score_is_monotone_in_weight() {
        let d = graph_doc();
        let mut last = 0.0;
        for w in [0.0, 0.1, 0.25, 0.5, 1.0, 2.0] {
            let s = score(&d, &[WeightedTerm::new("graph", w)]);
            assert!(s >= last, "score {} for weight {} dropped below {}", s, w, last);
            last = s;
        }
    }

    #[test]
    fn test_score_grows_by_title_weight_when_term_added() {
        let d = doc(4, "graph neural networks", "nothing here", &["ml"]);
        let base = vec![WeightedTerm::new("graph", 1.0)];
        let mut extended = base.clone();
        extended.push(WeightedTerm::new("neural", 0.4));

        let before = score(&d, &base);
        let after = score(&d, &extended);

        assert!(after > before);
        assert_eq!(after, round_score(before + 3.0 * 0.4));
    }

    #[test]
    fn test_score_folds_unicode_case() {
        let d = doc(5, "граф нейронный", "Über Graphen", &["ΣΥΣΤΗΜΑ"]);

        assert_eq!(score(&d, &[WeightedTerm::original("ГРАФ")]), 3.0);
        assert_eq!(score(&d, &[WeightedTerm::original("über")]), 2.0);
        assert_eq!(score(&d, &[WeightedTerm::original("σύστημα")]), 0.0);
        assert_eq!(score(&d, &[WeightedTerm::original("συστημα")]), 1.0);
    }

    #[test]
    fn test_score_zero_weight_is_no_op() {
        let d = graph_doc();
        let terms = vec![
            WeightedTerm::new("graph", 1.0),
            WeightedTerm::new("neural", 0.0),
        ];

        assert_eq!(score(&d, &terms), 6.0);
    }

    #[test]
    fn test_score_ignores_empty_terms() {
        let scorer = RelevanceScorer::new(&[WeightedTerm::new("", 1.0)]);

        assert!(scorer.is_empty());
        assert_eq!(scorer.score(&graph_doc()), 0.0);
    }

    #[test]
    fn test_score_is_rounded() {
        let d = doc(3, "alpha", "", &[]);
        let s = score(&d, &[WeightedTerm::new("alpha", 0.123456)]);

        assert_eq!(s, 0.3704);
    }

    #[test]
    fn test_score_all_keeps_positive_in_order() {
        let docs = vec![
            doc(1, "graph", "", &[]),
            doc(2, "nothing", "", &[]),
            doc(3, "", "graph", &[]),
        ];
        let scorer = RelevanceScorer::new(&[WeightedTerm::original("graph")]);
        let scored = scorer.score_all(&docs);

        let ids: Vec<ArticleId> = scored.iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids, vec![oid(1), oid(3)]);
    }

    // ============================================================
    // PAIRING TESTS
    // ============================================================

    #[test]
    fn test_pair_weights_keeps_positions() {
        let expanded = vec![
            WeightedTerm::new("networks", 1.0),
            WeightedTerm::new("deep learning", 0.61),
        ];
        let normalized = vec!["network".to_string(), "deep learn".to_string()];

        let paired = pair_weights(&expanded, &normalized);

        assert_eq!(
            paired,
            vec![
                WeightedTerm::new("network", 1.0),
                WeightedTerm::new("deep learn", 0.61),
            ]
        );
    }

    #[test]
    fn test_pair_weights_drops_empty_positions() {
        let expanded = vec![WeightedTerm::new("the", 1.0), WeightedTerm::new("graphs", 0.5)];
        let normalized = vec![String::new(), "graph".to_string()];

        let paired = pair_weights(&expanded, &normalized);

        assert_eq!(paired, vec![WeightedTerm::new("graph", 0.5)]);
    }

    #[test]
    fn test_pair_weights_mismatch_yields_nothing() {
        let expanded = vec![WeightedTerm::new("a", 1.0), WeightedTerm::new("b", 0.5)];

        assert!(pair_weights(&expanded, &["a".to_string()]).is_empty());
        assert!(pair_weights(&expanded, &[]).is_empty());
    }

    #[tokio::test]
    async fn test_normalizer_keeps_pairing() {
        let normalizer = TermNormalizer::new(Arc::new(UppercaseLemmatizer));
        let expanded = vec![
            WeightedTerm::new("graph", 1.0),
            WeightedTerm::new("neural network", 0.4),
        ];
        let raw: Vec<String> = expanded.iter().map(|t| t.term.clone()).collect();

        let normalized = normalizer.normalize(&raw).await;
        let paired = pair_weights(&expanded, &normalized);

        assert_eq!(
            paired,
            vec![
                WeightedTerm::new("GRAPH", 1.0),
                WeightedTerm::new("NEURAL NETWORK", 0.4),
            ]
        );
    }

    // ============================================================
    // RANKING TESTS
    // ============================================================

    #[test]
    fn test_rank_excludes_zero_scores() {
        let ranked = rank_candidates(vec![
            ScoredResult { id: oid(1), score: 0.0 },
            ScoredResult { id: oid(2), score: 2.0 },
        ]);

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].id, oid(2));
    }

    #[test]
    fn test_rank_descending_and_stable() {
        let ranked = rank_candidates(vec![
            ScoredResult { id: oid(1), score: 1.0 },
            ScoredResult { id: oid(2), score: 3.0 },
            ScoredResult { id: oid(3), score: 1.0 },
            ScoredResult { id: oid(4), score: 3.0 },
        ]);

        let ids: Vec<ArticleId> = ranked.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![oid(2), oid(4), oid(1), oid(3)]);
    }

    // ============================================================
    // SCORER BACKEND TESTS
    // ============================================================

    #[tokio::test]
    async fn test_substring_scorer_chunks_keep_corpus_order() {
        let docs: Vec<NormalizedArticle> = (1..=1000)
            .map(|n| doc(n, if n % 3 == 0 { "graph" } else { "other" }, "", &[]))
            .collect();
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new(Vec::new(), docs));
        let scorer = SubstringScorer::new(store, 4);

        let terms = vec![WeightedTerm::original("graph")];
        let results = scorer.rank(&terms).await.unwrap();

        assert_eq!(results.len(), 333);
        let ids: Vec<ArticleId> = results.iter().map(|r| r.id.clone()).collect();
        let expected: Vec<ArticleId> = (1..=1000).filter(|n| n % 3 == 0).map(oid).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_text_index_scorer_matches_whole_words() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new(
            Vec::new(),
            vec![
                doc(1, "graph methods", "", &[]),
                doc(2, "graphs everywhere", "", &[]),
            ],
        ));
        let scorer = TextIndexScorer::new(store);

        let terms = vec![WeightedTerm::original("graph")];
        let results = scorer.rank(&terms).await.unwrap();

        assert_eq!(results, vec![ScoredResult { id: oid(1), score: 3.0 }]);
    }

    // ============================================================
    // PIPELINE TESTS
    // ============================================================

    #[tokio::test]
    async fn test_pipeline_graph_scenario() {
        let store = Arc::new(MemoryStore::new(
            vec![article(1, "Graph Neural Networks")],
            vec![graph_doc()],
        ));
        let pipeline = pipeline_with(
            store,
            SynonymMap::new(),
            TermNormalizer::disabled(),
            Arc::new(MemorySearchLog::new()),
        );

        assert_eq!(pipeline.scorer_name(), "substring");
        let response = pipeline.search("graph", false, false).await.unwrap();

        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].score, 6.0);
        assert_eq!(response.results[0].article.title, "Graph Neural Networks");
        assert_eq!(response.expanded_terms, vec![WeightedTerm::original("graph")]);
        assert_eq!(response.normalized_terms, vec!["graph".to_string()]);
        assert!(response.message.is_none());
    }

    #[tokio::test]
    async fn test_pipeline_empty_corpus_reports_nothing_found() {
        let pipeline = pipeline_with(
            Arc::new(MemoryStore::empty()),
            SynonymMap::new(),
            TermNormalizer::disabled(),
            Arc::new(MemorySearchLog::new()),
        );

        let response = pipeline.search("graph", false, false).await.unwrap();

        assert!(response.results.is_empty());
        assert_eq!(response.message.as_deref(), Some(NOTHING_FOUND));
    }

    #[tokio::test]
    async fn test_pipeline_rejects_blank_query() {
        let pipeline = pipeline_with(
            Arc::new(MemoryStore::empty()),
            SynonymMap::new(),
            TermNormalizer::disabled(),
            Arc::new(MemorySearchLog::new()),
        );

        let result = pipeline.search("   ", true, true).await;
        assert!(matches!(result, Err(SearchError::MissingQuery)));
    }

    #[tokio::test]
    async fn test_pipeline_expansion_weights_synonyms() {
        let store = Arc::new(MemoryStore::new(
            vec![article(1, "Perceptron basics"), article(2, "Neural networks")],
            vec![
                doc(1, "perceptron basics", "", &[]),
                doc(2, "neural networks", "", &[]),
            ],
        ));
        let pipeline = pipeline_with(
            store,
            neural_synonyms(),
            TermNormalizer::disabled(),
            Arc::new(MemorySearchLog::new()),
        );

        let response = pipeline.search("Neural-Networks", true, false).await.unwrap();

        assert_eq!(response.expanded_terms.len(), 3);
        assert_eq!(response.expanded_terms[0], WeightedTerm::original("Neural-Networks"));
        // "Neural-Networks" is not a substring of "neural networks"; only the
        // perceptron synonym scores.
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].article.id, oid(1));
        assert_eq!(response.results[0].score, round_score(3.0 * 0.34));
    }

    #[tokio::test]
    async fn test_pipeline_without_expand_ignores_dictionary() {
        let pipeline = pipeline_with(
            Arc::new(MemoryStore::empty()),
            neural_synonyms(),
            TermNormalizer::disabled(),
            Arc::new(MemorySearchLog::new()),
        );

        let response = pipeline.search("neural networks", false, false).await.unwrap();
        assert_eq!(response.expanded_terms.len(), 1);
    }

    #[tokio::test]
    async fn test_pipeline_failed_lemmatizer_returns_empty_success() {
        let store = Arc::new(MemoryStore::new(
            vec![article(1, "Graph Neural Networks")],
            vec![graph_doc()],
        ));
        let pipeline = pipeline_with(
            store,
            SynonymMap::new(),
            TermNormalizer::new(Arc::new(BrokenLemmatizer)),
            Arc::new(MemorySearchLog::new()),
        );

        let response = pipeline.search("graph", false, true).await.unwrap();

        assert!(response.normalized_terms.is_empty());
        assert!(response.results.is_empty());
        assert_eq!(response.message.as_deref(), Some(NOTHING_FOUND));
    }

    #[tokio::test]
    async fn test_pipeline_lemmas_flag_off_skips_lemmatizer() {
        let store = Arc::new(MemoryStore::new(
            vec![article(1, "Graph Neural Networks")],
            vec![graph_doc()],
        ));
        let pipeline = pipeline_with(
            store,
            SynonymMap::new(),
            TermNormalizer::new(Arc::new(BrokenLemmatizer)),
            Arc::new(MemorySearchLog::new()),
        );

        let response = pipeline.search("graph", false, false).await.unwrap();
        assert_eq!(response.results.len(), 1);
    }

    #[tokio::test]
    async fn test_pipeline_drops_candidates_without_record() {
        let store = Arc::new(MemoryStore::new(
            vec![article(2, "second")],
            vec![doc(1, "graph", "", &[]), doc(2, "graph", "", &[])],
        ));
        let pipeline = pipeline_with(
            store,
            SynonymMap::new(),
            TermNormalizer::disabled(),
            Arc::new(MemorySearchLog::new()),
        );

        let response = pipeline.search("graph", false, false).await.unwrap();

        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].article.id, oid(2));
    }

    #[tokio::test]
    async fn test_pipeline_ties_keep_corpus_order() {
        let store = Arc::new(MemoryStore::new(
            vec![article(3, "c"), article(1, "a"), article(2, "b")],
            vec![
                doc(2, "graph", "", &[]),
                doc(1, "graph", "graph", &[]),
                doc(3, "graph", "", &[]),
            ],
        ));
        let pipeline = pipeline_with(
            store,
            SynonymMap::new(),
            TermNormalizer::disabled(),
            Arc::new(MemorySearchLog::new()),
        );

        let response = pipeline.search("graph", false, false).await.unwrap();

        let ids: Vec<ArticleId> = response.results.iter().map(|r| r.article.id.clone()).collect();
        assert_eq!(ids, vec![oid(1), oid(2), oid(3)]);
        let scores: Vec<f64> = response.results.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![5.0, 3.0, 3.0]);
    }

    #[tokio::test]
    async fn test_pipeline_repeated_search_is_identical() {
        let docs: Vec<NormalizedArticle> = (1..=600)
            .map(|n| doc(n, if n % 2 == 0 { "graph" } else { "graph theory" }, "", &[]))
            .collect();
        let articles: Vec<Article> = (1..=600).map(|n| article(n, "a")).collect();
        let pipeline = pipeline_with(
            Arc::new(MemoryStore::new(articles, docs)),
            SynonymMap::new(),
            TermNormalizer::disabled(),
            Arc::new(MemorySearchLog::new()),
        );

        let first = pipeline.search("graph", false, false).await.unwrap();
        let second = pipeline.search("graph", false, false).await.unwrap();

        assert_eq!(first.results.len(), 600);
        assert_eq!(
            serde_json::to_string(&first.results).unwrap(),
            serde_json::to_string(&second.results).unwrap()
        );
    }

    #[tokio::test]
    async fn test_pipeline_records_search() {
        let sink = Arc::new(MemorySearchLog::new());
        let pipeline = pipeline_with(
            Arc::new(MemoryStore::new(
                vec![article(1, "Graph Neural Networks")],
                vec![graph_doc()],
            )),
            SynonymMap::new(),
            TermNormalizer::disabled(),
            sink.clone(),
        );

        pipeline.search("graph", false, false).await.unwrap();

        let logs = sink.recent(10).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].query, "graph");
        assert_eq!(logs[0].result_count, 1);
        assert!(!logs[0].expanded);
        assert!(!logs[0].lemmas);
    }

    #[tokio::test]
    async fn test_pipeline_survives_failing_log_sink() {
        let pipeline = pipeline_with(
            Arc::new(MemoryStore::new(
                vec![article(1, "Graph Neural Networks")],
                vec![graph_doc()],
            )),
            SynonymMap::new(),
            TermNormalizer::disabled(),
            Arc::new(FailingSink),
        );

        let response = pipeline.search("graph", false, false).await.unwrap();
        assert_eq!(response.results.len(), 1);
    }

    #[tokio::test]
    async fn test_pipeline_does_not_wait_on_stalled_log_sink() {
        struct StalledSink;

        impl SearchLogSink for StalledSink {
            fn record(&self, _record: SearchLogRecord) -> SinkFuture<'_, ()> {
                Box::pin(async move {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(())
                })
            }

            fn recent(&self, _limit: usize) -> SinkFuture<'_, Vec<SearchLogRecord>> {
                Box::pin(async move { Ok(Vec::new()) })
            }
        }

        let pipeline = pipeline_with(
            Arc::new(MemoryStore::new(
                vec![article(1, "Graph Neural Networks")],
                vec![graph_doc()],
            )),
            SynonymMap::new(),
            TermNormalizer::disabled(),
            Arc::new(StalledSink),
        )
        .with_log_timeout(Duration::from_millis(50));

        let started = std::time::Instant::now();
        let response = pipeline.search("graph", false, false).await.unwrap();

        assert_eq!(response.results.len(), 1);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_pipeline_store_failure_is_an_error() {
        let pipeline = pipeline_with(
            Arc::new(UnavailableStore),
            SynonymMap::new(),
            TermNormalizer::disabled(),
            Arc::new(MemorySearchLog::new()),
        );

        let result = pipeline.search("graph", false, false).await;
        assert!(matches!(result, Err(SearchError::Store(_))));
    }

    #[tokio::test]
    async fn test_pipeline_timeout() {
        struct SlowLemmatizer;

        impl Lemmatizer for SlowLemmatizer {
            fn name(&self) -> &'static str {
                "slow"
            }

            fn lemmatize<'a>(&'a self, words: &'a [String]) -> LemmaFuture<'a> {
                Box::pin(async move {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(words.to_vec())
                })
            }
        }

        let pipeline = pipeline_with(
            Arc::new(MemoryStore::empty()),
            SynonymMap::new(),
            TermNormalizer::new(Arc::new(SlowLemmatizer)),
            Arc::new(MemorySearchLog::new()),
        )
        .with_timeout(Duration::from_millis(50));

        let result = pipeline.search("graph", false, true).await;
        assert!(matches!(result, Err(SearchError::Timeout(_))));
    }

    // ============================================================
    // TOKENIZER & FLAG TESTS
    // ============================================================

    #[test]
    fn test_tokenize_text_unicode() {
        let tokens = tokenize_text("Нейронные СЕТИ, graph-theory");

        assert!(tokens.contains("нейронные"));
        assert!(tokens.contains("сети"));
        assert!(tokens.contains("graph"));
        assert!(tokens.contains("theory"));
    }

    #[test]
    fn test_tokenize_query_keeps_order() {
        assert_eq!(
            tokenize_query("Deep Learning deep"),
            vec!["deep", "learning", "deep"]
        );
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag(None, true));
        assert!(!parse_flag(None, false));
        assert!(parse_flag(Some("1"), false));
        assert!(parse_flag(Some("TRUE"), false));
        assert!(parse_flag(Some("on"), false));
        assert!(!parse_flag(Some("0"), true));
        assert!(!parse_flag(Some("false"), true));
        assert!(!parse_flag(Some(""), true));
    }
}
