//! Recording backend for unit tests: every call is logged, searches return canned
//! responses, and any operation can be told to fail.

use super::client::SearchBackend;
use super::protocol::{Hit, SearchResponse};
use crate::error::{PercolatorError, Result};

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub op: &'static str,
    pub index: String,
    pub body: Value,
}

#[derive(Default)]
pub struct RecordingBackend {
    pub calls: Mutex<Vec<Call>>,
    search_response: Mutex<SearchResponse>,
    count: Mutex<u64>,
    failing_ops: Mutex<HashSet<&'static str>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hits(hits: Vec<Hit>) -> Self {
        let backend = Self::default();
        *backend.search_response.lock().unwrap() = SearchResponse::from_hits(hits);
        backend
    }

    pub fn with_count(count: u64) -> Self {
        let backend = Self::default();
        *backend.count.lock().unwrap() = count;
        backend
    }

    pub fn fail_on(&self, op: &'static str) {
        self.failing_ops.lock().unwrap().insert(op);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn ops(&self) -> Vec<&'static str> {
        self.calls().iter().map(|c| c.op).collect()
    }

    pub fn last_search_body(&self) -> Option<Value> {
        self.calls()
            .into_iter()
            .rev()
            .find(|c| c.op == "search")
            .map(|c| c.body)
    }

    fn record(&self, op: &'static str, index: &str, body: Value) -> Result<()> {
        self.calls.lock().unwrap().push(Call {
            op,
            index: index.to_string(),
            body,
        });
        if self.failing_ops.lock().unwrap().contains(op) {
            return Err(PercolatorError::BackendUnavailable(format!("{} failed", op)));
        }
        Ok(())
    }
}

/// Builds a percolator hit for a stored `{match_type: {field: term}}` query.
pub fn query_hit(match_type: &str, field: &str, term: &str, score: Option<f64>) -> Hit {
    Hit {
        id: None,
        score,
        source: json!({ "query": { match_type: { field: term } } }),
    }
}

#[async_trait]
impl SearchBackend for RecordingBackend {
    async fn delete_index(&self, index: &str) -> Result<()> {
        self.record("delete_index", index, Value::Null)
    }

    async fn create_index(&self, index: &str, body: &Value) -> Result<()> {
        self.record("create_index", index, body.clone())
    }

    async fn put_document(&self, index: &str, document: &Value) -> Result<()> {
        self.record("put_document", index, document.clone())
    }

    async fn bulk_insert(&self, index: &str, documents: &[Value]) -> Result<usize> {
        self.record("bulk_insert", index, Value::Array(documents.to_vec()))?;
        Ok(documents.len())
    }

    async fn refresh(&self, index: &str) -> Result<()> {
        self.record("refresh", index, Value::Null)
    }

    async fn search(&self, index: &str, body: &Value) -> Result<SearchResponse> {
        self.record("search", index, body.clone())?;
        Ok(self.search_response.lock().unwrap().clone())
    }

    async fn count(&self, index: &str) -> Result<u64> {
        self.record("count", index, Value::Null)?;
        Ok(*self.count.lock().unwrap())
    }
}
