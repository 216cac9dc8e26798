//! Synonym Expansion Module
//!
//! Query expansion driven by a weighted synonym dictionary.
//!
//! ## Overview
//! The dictionary maps a normalized query key to an ordered list of
//! `(synonym, weight)` pairs. Expansion looks the whole query up under that key
//! and appends whatever it finds after the original term.
//!
//! ## Submodules
//! - **`normalize`**: the key normalization shared by loading and lookup.
//! - **`dictionary`**: loading, snapshotting, reloading and atomic rewrite of the
//!   dictionary file.
//! - **`expander`**: the `QueryExpander` used by the search pipeline.
//! - **`handlers`**: `GET /synonyms` and `PUT /synonyms/:term`.
//! - **`types`**: request/response bodies of the dictionary API.

pub mod dictionary;
pub mod expander;
pub mod handlers;
pub mod normalize;
pub mod types;
