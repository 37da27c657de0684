//! Backend Wire Protocol
//!
//! Endpoint paths and response DTOs for the Elasticsearch 7.x REST API subset the
//! crate relies on: index lifecycle, document storage, bulk, search and count.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// --- API Endpoints ---

pub const ENDPOINT_DOC: &str = "_doc";
pub const ENDPOINT_BULK: &str = "_bulk";
pub const ENDPOINT_REFRESH: &str = "_refresh";
pub const ENDPOINT_SEARCH: &str = "_search";
pub const ENDPOINT_COUNT: &str = "_count";

/// Largest `from + size` window the backend accepts (`index.max_result_window`).
pub const MAX_RESULT_WINDOW: u64 = 10_000;

pub fn index_url(base: &str, index: &str) -> String {
    format!("{}/{}", base, index)
}

pub fn index_endpoint_url(base: &str, index: &str, endpoint: &str) -> String {
    format!("{}/{}/{}", base, index, endpoint)
}

// --- Data Transfer Objects ---

/// Body of a `_search` response. Only the parts the crate reads are modelled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: HitsEnvelope,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HitsEnvelope {
    /// `{ "value": n, "relation": "eq" }` on 7.x, a plain number on older servers.
    #[serde(default)]
    pub total: Option<Value>,
    #[serde(default)]
    pub hits: Vec<Hit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    /// Null when the query does not compute scores.
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: Value,
}

impl SearchResponse {
    pub fn from_hits(hits: Vec<Hit>) -> Self {
        Self {
            hits: HitsEnvelope {
                total: Some(serde_json::json!({ "value": hits.len(), "relation": "eq" })),
                hits,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkResponse {
    pub errors: bool,
    #[serde(default)]
    pub items: Vec<Value>,
}

impl BulkResponse {
    /// First item-level failure as `(status, reason)`, if any.
    pub fn first_failure(&self) -> Option<(u16, String)> {
        self.items.iter().find_map(|item| {
            let result = item.as_object()?.values().next()?;
            let error = result.get("error")?;
            let status = result.get("status").and_then(Value::as_u64).unwrap_or(500) as u16;
            Some((status, error.to_string()))
        })
    }
}
