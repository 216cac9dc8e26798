//! Search Service Module
//!
//! The query processing and relevance-scoring pipeline behind `GET /search`.
//!
//! ## Overview
//! A raw query becomes a list of weighted terms (optionally widened with synonyms
//! and reduced to lemmas), every normalized article is scored against those
//! terms, and the positive scores are ranked and hydrated into full articles.
//!
//! ## Responsibilities
//! - **Pairing**: keeping each lemmatized term tied to the weight of the term it
//!   came from.
//! - **Ranking**: field-weighted substring scoring and a stable descending sort.
//! - **Retrieval**: hydrating ranked ids into full article records.
//! - **API**: the `/search` endpoint.
//!
//! ## Submodules
//! - **`engine`**: `SearchPipeline`, the orchestration of a single search.
//! - **`scorer`**: the relevance formula and the pluggable `Scorer` backends.
//! - **`tokenizer`**: word splitting for the store's text search.
//! - **`handlers`**: HTTP request handlers for the Axum web server.
//! - **`types`**: terms, scores and the response body.
//! - **`error`**: failures that end a search.

pub mod engine;
pub mod error;
pub mod handlers;
pub mod scorer;
pub mod tokenizer;
pub mod types;

#[cfg(test)]
mod tests;
