use crate::error::{PercolatorError, Result};

use reqwest::header::{ACCEPT, CONTENT_DISPOSITION};
use serde_json::Value;
use std::time::Duration;

pub const ENDPOINT_RMETA_TEXT: &str = "/rmeta/text";
pub const TIKA_CONTENT_KEY: &str = "X-TIKA:content";

pub struct TikaExtractor {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl TikaExtractor {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PercolatorError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Sends raw document bytes to Tika and returns the trimmed text content.
    pub async fn extract(&self, bytes: Vec<u8>) -> Result<String> {
        let url = format!("{}{}", self.base_url, ENDPOINT_RMETA_TEXT);
        let disposition = format!("attachment; filename={}", uuid::Uuid::new_v4());
        tracing::debug!("Extracting text from {} bytes", bytes.len());

        let response = self
            .http
            .put(url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_DISPOSITION, disposition)
            .body(bytes)
            .send()
            .await
            .map_err(|e| self.extraction_error(e))?;

        let body = response.text().await.map_err(|e| self.extraction_error(e))?;
        parse_rmeta(&body)
    }

    /// Downloads a document and extracts its text.
    pub async fn extract_from_url(&self, url: &str) -> Result<String> {
        tracing::info!("Fetching document from {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.extraction_error(e))?;
        if !response.status().is_success() {
            return Err(PercolatorError::ExtractionFailure(format!(
                "{} answered {}",
                url,
                response.status()
            )));
        }
        let bytes = response.bytes().await.map_err(|e| self.extraction_error(e))?;

        self.extract(bytes.to_vec()).await
    }

    fn extraction_error(&self, e: reqwest::Error) -> PercolatorError {
        if e.is_timeout() {
            tracing::warn!("Text extraction gave up after {:?}", self.timeout);
            PercolatorError::ExtractionTimeout
        } else {
            PercolatorError::ExtractionFailure(e.to_string())
        }
    }
}

/// Reads the text content from an `/rmeta/text` response body.
///
/// The body must be a non-empty JSON list whose first element is an object. A missing
/// content key means Tika found no text.
pub fn parse_rmeta(body: &str) -> Result<String> {
    let data: Value = serde_json::from_str(body)
        .map_err(|e| PercolatorError::ExtractionFailure(format!("invalid JSON: {}", e)))?;

    let first = data
        .as_array()
        .and_then(|items| items.first())
        .ok_or_else(|| PercolatorError::ExtractionFailure("expected a non-empty list".to_string()))?;
    let metadata = first
        .as_object()
        .ok_or_else(|| PercolatorError::ExtractionFailure("expected an object".to_string()))?;

    match metadata.get(TIKA_CONTENT_KEY) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(content)) => Ok(content.trim().to_string()),
        Some(other) => Err(PercolatorError::ExtractionFailure(format!(
            "unexpected content type: {}",
            other
        ))),
    }
}
