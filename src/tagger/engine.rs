use super::format::TagFormat;
use super::types::{Pagination, TagMap, TagRequest};
use crate::analysis::analyzer::QUERY_FIELD;
use crate::backend::client::SearchBackend;
use crate::error::Result;
use crate::indexer::types::QueryIndexConfig;

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

/// Finds vocabulary mentions in text.
#[async_trait]
pub trait Tagging: Send + Sync {
    async fn get_tags(&self, request: &TagRequest) -> Result<TagMap>;
}

/// Tags text by percolating it against a domain's stored queries.
///
/// Holds no per-call state; one instance serves concurrent requests.
pub struct PercolateTagger {
    client: Arc<dyn SearchBackend>,
    config: QueryIndexConfig,
    format: TagFormat,
}

impl PercolateTagger {
    pub fn new(client: Arc<dyn SearchBackend>, config: QueryIndexConfig, format: TagFormat) -> Self {
        Self {
            client,
            config,
            format,
        }
    }

    pub fn config(&self) -> &QueryIndexConfig {
        &self.config
    }

    /// Search body for a request and its resolved window.
    pub fn search_body(&self, request: &TagRequest, page: Pagination) -> Value {
        let mut document = serde_json::Map::new();
        document.insert(self.config.field_name.clone(), json!(request.text));

        let percolate = json!({
            "percolate": {
                "field": QUERY_FIELD,
                "document": document,
            }
        });

        let mut body = if request.constant_score {
            json!({ "query": { "constant_score": { "filter": percolate } } })
        } else {
            json!({ "query": percolate })
        };

        if !request.constant_score {
            if let Some(min_score) = request.min_score {
                body["min_score"] = json!(min_score);
            }
        }
        body["from"] = json!(page.from);
        body["size"] = json!(page.size);
        body
    }

    /// Recovers the stored term from a hit's query body: plain string or `{query: ..}` form.
    pub fn extract_term(&self, source: &Value) -> Option<String> {
        let clause = source
            .get(QUERY_FIELD)?
            .get(self.config.match_type.as_str())?
            .get(&self.config.field_name)?;

        match clause {
            Value::String(term) => Some(term.clone()),
            Value::Object(options) => options.get("query")?.as_str().map(str::to_string),
            _ => None,
        }
    }
}

#[async_trait]
impl Tagging for PercolateTagger {
    async fn get_tags(&self, request: &TagRequest) -> Result<TagMap> {
        let page = Pagination::resolve(request.offset, request.limit)?;
        let body = self.search_body(request, page);

        tracing::info!("Fetching tags from {}", self.config.index);
        let response = self.client.search(&self.config.index, &body).await?;

        let mut tags = TagMap::new();
        for hit in response.hits.hits {
            let Some(term) = self.extract_term(&hit.source) else {
                tracing::warn!("Skipping hit without a stored term: {:?}", hit.id);
                continue;
            };

            let score = if request.constant_score {
                1.0
            } else {
                hit.score.unwrap_or(0.0)
            };
            if !request.constant_score && request.min_score.is_some_and(|min| score < min) {
                continue;
            }
            // Duplicate terms keep the score of the last hit.
            tags.insert(self.format.apply(&term), score);
        }

        tracing::debug!("Found {} tags in {}", tags.len(), self.config.index);
        Ok(tags)
    }
}
