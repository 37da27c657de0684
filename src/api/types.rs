use crate::backend::protocol::MAX_RESULT_WINDOW;
use crate::error::PercolatorError;
use crate::tagger::types::{coerce_count, coerce_score, TagMap, TagRequest};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;
pub const MAX_URL_LENGTH: usize = 400;
pub const MIN_SCORE_FLOOR: f64 = 0.1;

/// Raw extraction parameters. Numeric fields stay untyped until validation so that
/// numbers sent as strings can be coerced.
#[derive(Debug, Default, Deserialize)]
pub struct TagParams {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// Domains to search; all domains when missing or empty.
    #[serde(default)]
    pub domains: Option<Vec<String>>,
    #[serde(default)]
    pub offset: Value,
    #[serde(default)]
    pub limit: Value,
    #[serde(default)]
    pub min_score: Value,
    #[serde(default)]
    pub constant_score: Value,
}

/// Parameters shared by every tagging endpoint, after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct TagOptions {
    pub domains: Option<Vec<String>>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    pub min_score: Option<f64>,
    pub constant_score: bool,
}

impl TagOptions {
    pub fn request(&self, text: &str) -> TagRequest {
        TagRequest {
            text: text.to_string(),
            min_score: self.min_score,
            constant_score: self.constant_score,
            offset: self.offset,
            limit: self.limit,
        }
    }
}

impl TagParams {
    /// Validates paging, scoring and domain parameters. All problems are reported at once.
    pub fn options(&self) -> Result<TagOptions, ApiError> {
        let mut errors = IndexMap::new();

        let offset = coerce_count("offset", &self.offset)
            .map_err(|e| errors.insert("offset".to_string(), reason(e)))
            .ok()
            .flatten();

        let limit = match coerce_count("limit", &self.limit) {
            Ok(Some(limit)) if limit < 1 || limit > MAX_RESULT_WINDOW => {
                errors.insert(
                    "limit".to_string(),
                    format!("must be between 1 and {}", MAX_RESULT_WINDOW),
                );
                None
            }
            Ok(limit) => limit,
            Err(e) => {
                errors.insert("limit".to_string(), reason(e));
                None
            }
        };

        let min_score = match coerce_score("min_score", &self.min_score) {
            Ok(Some(score)) if score < MIN_SCORE_FLOOR => {
                errors.insert(
                    "min_score".to_string(),
                    format!("must be at least {}", MIN_SCORE_FLOOR),
                );
                None
            }
            Ok(score) => score,
            Err(e) => {
                errors.insert("min_score".to_string(), reason(e));
                None
            }
        };

        let constant_score = match coerce_flag(&self.constant_score) {
            Some(flag) => flag,
            None => {
                errors.insert("constant_score".to_string(), "must be a boolean".to_string());
                true
            }
        };

        let domains = self.domains.as_ref().map(|domains| {
            let mut unique: Vec<String> = Vec::new();
            for domain in domains {
                let domain = domain.trim().to_string();
                if domain.is_empty() {
                    continue;
                }
                if unique.contains(&domain) {
                    errors.insert("domains".to_string(), "must be unique".to_string());
                }
                unique.push(domain);
            }
            unique
        });

        if !errors.is_empty() {
            return Err(ApiError::validation(errors));
        }

        Ok(TagOptions {
            domains,
            offset,
            limit,
            min_score,
            constant_score,
        })
    }

    /// Builds parameters from multipart text fields; `domains` is comma-separated.
    pub fn from_form(fields: &IndexMap<String, String>) -> Self {
        let text = |name: &str| {
            fields
                .get(name)
                .map(|v| Value::String(v.clone()))
                .unwrap_or(Value::Null)
        };

        Self {
            content: None,
            url: None,
            domains: fields
                .get("domains")
                .map(|d| d.split(',').map(|s| s.trim().to_string()).collect()),
            offset: text("offset"),
            limit: text("limit"),
            min_score: text("min_score"),
            constant_score: text("constant_score"),
        }
    }
}

/// `null`/missing means the default (`true`).
fn coerce_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Null => Some(true),
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_u64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "" => Some(true),
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn reason(e: PercolatorError) -> String {
    match e {
        PercolatorError::InvalidParameter { reason, .. } => reason,
        other => other.to_string(),
    }
}

/// Domain name -> matched terms.
pub type TagResponse = IndexMap<String, TagMap>;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct DomainInfo {
    pub description: String,
    pub tags_count: u64,
}

/// An error response: a status plus a JSON body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiError {
    pub fn validation(errors: IndexMap<String, String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: json!(errors),
        }
    }

    pub fn bad_request(field: &str, message: &str) -> Self {
        let mut errors = IndexMap::new();
        errors.insert(field.to_string(), message.to_string());
        Self::validation(errors)
    }
}

impl From<PercolatorError> for ApiError {
    fn from(e: PercolatorError) -> Self {
        let (status, body) = match &e {
            PercolatorError::InvalidParameter { name, reason } => {
                let mut fields = serde_json::Map::new();
                fields.insert(name.clone(), json!(reason));
                (StatusCode::BAD_REQUEST, Value::Object(fields))
            }
            PercolatorError::UnknownDomain(_) => {
                (StatusCode::BAD_REQUEST, json!({ "domains": e.to_string() }))
            }
            PercolatorError::ExtractionTimeout => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Text extraction timed out" }),
            ),
            PercolatorError::ExtractionFailure(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Text extraction could not be performed" }),
            ),
            PercolatorError::BackendUnavailable(_) | PercolatorError::Backend { .. } => {
                (StatusCode::BAD_GATEWAY, json!({ "error": e.to_string() }))
            }
            PercolatorError::SourceRead { .. }
            | PercolatorError::OutputWrite { .. }
            | PercolatorError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": e.to_string() }),
            ),
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", e);
        }
        Self { status, body }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
