//! Search Log Module
//!
//! Side-channel record of every executed search and the reporting built on it.
//!
//! ## Overview
//! The pipeline hands each finished search to a `SearchLogSink`. Sink failures
//! never reach the caller of `/search`. The reporting endpoints read the same
//! sink back:
//! - `GET /search-logs`: raw records, newest first.
//! - `GET /search-logs/summary`: counts and averages per pipeline mode.
//! - `GET /search-logs/summary-per-query`: the same, per recent distinct query,
//!   with medians.

pub mod handlers;
pub mod sink;
pub mod summary;
pub mod types;
