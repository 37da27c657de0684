use super::protocol::*;
use crate::error::{PercolatorError, Result};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Operations the engine needs from a search backend.
///
/// Implementations must be shareable across concurrent requests. None of the calls
/// retry: failures go straight back to the caller.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Deletes an index; a missing index is not an error.
    async fn delete_index(&self, index: &str) -> Result<()>;

    /// Creates an index with the given settings/mappings body.
    async fn create_index(&self, index: &str, body: &Value) -> Result<()>;

    /// Stores a single document under a backend-generated id.
    async fn put_document(&self, index: &str, document: &Value) -> Result<()>;

    /// Stores many documents in one request. Returns how many were stored.
    async fn bulk_insert(&self, index: &str, documents: &[Value]) -> Result<usize>;

    /// Makes recent writes visible to search.
    async fn refresh(&self, index: &str) -> Result<()>;

    async fn search(&self, index: &str, body: &Value) -> Result<SearchResponse>;

    async fn count(&self, index: &str) -> Result<u64>;
}

/// Elasticsearch REST client.
///
/// Requests go to the first configured host; the remaining hosts are kept for
/// diagnostics only.
pub struct ElasticClient {
    http: reqwest::Client,
    hosts: Vec<String>,
}

impl ElasticClient {
    pub fn new(hosts: &[String], timeout: Duration) -> Result<Self> {
        let hosts: Vec<String> = hosts.iter().map(|h| normalize_host(h)).collect();
        if hosts.is_empty() {
            return Err(PercolatorError::Config(
                "At least one Elasticsearch host is required".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PercolatorError::Config(format!("HTTP client: {}", e)))?;

        tracing::info!("Elasticsearch client created");
        tracing::debug!("Elasticsearch hosts: {:?}", hosts);

        Ok(Self { http, hosts })
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    fn base(&self) -> &str {
        &self.hosts[0]
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        request.send().await.map_err(transport_error)
    }

    async fn expect_success(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(PercolatorError::Backend { status, body })
    }

    async fn decode<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status().as_u16();
        response
            .json::<T>()
            .await
            .map_err(|e| PercolatorError::Backend {
                status,
                body: format!("Invalid response body: {}", e),
            })
    }
}

#[async_trait]
impl SearchBackend for ElasticClient {
    async fn delete_index(&self, index: &str) -> Result<()> {
        let response = self
            .send(self.http.delete(index_url(self.base(), index)))
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!("Index {} did not exist", index);
            return Ok(());
        }
        self.expect_success(response).await?;
        Ok(())
    }

    async fn create_index(&self, index: &str, body: &Value) -> Result<()> {
        let response = self
            .send(self.http.put(index_url(self.base(), index)).json(body))
            .await?;
        self.expect_success(response).await?;
        Ok(())
    }

    async fn put_document(&self, index: &str, document: &Value) -> Result<()> {
        let url = index_endpoint_url(self.base(), index, ENDPOINT_DOC);
        let response = self.send(self.http.post(url).json(document)).await?;
        self.expect_success(response).await?;
        Ok(())
    }

    async fn bulk_insert(&self, index: &str, documents: &[Value]) -> Result<usize> {
        if documents.is_empty() {
            return Ok(0);
        }

        let mut payload = String::new();
        for document in documents {
            payload.push_str("{\"index\":{}}\n");
            payload.push_str(&document.to_string());
            payload.push('\n');
        }

        let url = index_endpoint_url(self.base(), index, ENDPOINT_BULK);
        let response = self
            .send(
                self.http
                    .post(url)
                    .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
                    .body(payload),
            )
            .await?;
        let response = self.expect_success(response).await?;
        let status = response.status().as_u16();
        let bulk: BulkResponse = self.decode(response).await?;

        if bulk.errors {
            let (status, body) = bulk.first_failure().unwrap_or_else(|| {
                (status, "bulk request reported errors without item details".to_string())
            });
            return Err(PercolatorError::Backend { status, body });
        }
        Ok(documents.len())
    }

    async fn refresh(&self, index: &str) -> Result<()> {
        let url = index_endpoint_url(self.base(), index, ENDPOINT_REFRESH);
        let response = self.send(self.http.post(url)).await?;
        self.expect_success(response).await?;
        Ok(())
    }

    async fn search(&self, index: &str, body: &Value) -> Result<SearchResponse> {
        let url = index_endpoint_url(self.base(), index, ENDPOINT_SEARCH);
        tracing::debug!("POST {} {}", url, body);

        let response = self.send(self.http.post(url).json(body)).await?;
        let response = self.expect_success(response).await?;
        self.decode(response).await
    }

    async fn count(&self, index: &str) -> Result<u64> {
        let url = index_endpoint_url(self.base(), index, ENDPOINT_COUNT);
        let response = self.send(self.http.get(url)).await?;
        let response = self.expect_success(response).await?;
        let count: CountResponse = self.decode(response).await?;
        Ok(count.count)
    }
}

/// Prefixes a scheme when missing and drops trailing slashes.
pub fn normalize_host(host: &str) -> String {
    let trimmed = host.trim();
    let normalized = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    normalized.trim_end_matches('/').to_string()
}

fn transport_error(e: reqwest::Error) -> PercolatorError {
    if e.is_timeout() {
        PercolatorError::BackendUnavailable(format!("request timed out: {}", e))
    } else {
        PercolatorError::BackendUnavailable(e.to_string())
    }
}
