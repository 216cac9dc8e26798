//! Dictionary API Types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `PUT /synonyms/:term`. Pairs are kept as raw JSON so each one can be
/// validated and reported individually.
#[derive(Debug, Deserialize)]
pub struct UpdateSynonymsRequest {
    #[serde(default)]
    pub synonyms: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SynonymsResponse {
    pub status: String,
    pub synonyms: Map<String, Value>,
}

impl SynonymsResponse {
    pub fn success(synonyms: Map<String, Value>) -> Self {
        Self {
            status: "success".to_string(),
            synonyms,
        }
    }
}
