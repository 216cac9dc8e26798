//! Academic Article Search Library
//!
//! Keyword search over a corpus of academic articles. This crate holds every
//! component of the service; the binary (`main.rs`) only parses configuration
//! and serves the router built in `app`.
//!
//! ## Architecture Modules
//! - **`search`**: The query pipeline. Pairs weighted terms with their
//!   lemmas, scores normalized articles by field-weighted substring matching,
//!   ranks them and hydrates the winners.
//! - **`synonyms`**: The synonym dictionary (JSON file, normalized keys,
//!   atomic updates) and the query expander built on it.
//! - **`lemmatizer`**: Adapters for external lemmatization (a command or an
//!   HTTP service) and the term normalizer that keeps lemmas aligned with the
//!   terms they came from.
//! - **`store`**: The `DocumentStore` abstraction and its in-memory
//!   implementation loaded from JSON exports.
//! - **`logs`**: The search log sink and the usage summaries built on it.
//! - **`app`** / **`config`** / **`error`**: Wiring, startup configuration
//!   and the HTTP error shape.

pub mod app;
pub mod config;
pub mod error;
pub mod lemmatizer;
pub mod logs;
pub mod search;
pub mod store;
pub mod synonyms;
