use crate::backend::protocol::MAX_RESULT_WINDOW;
use crate::error::{PercolatorError, Result};

use indexmap::IndexMap;
use serde_json::Value;

/// Formatted term -> score, in backend hit order.
pub type TagMap = IndexMap<String, f64>;

/// One tagging call.
#[derive(Debug, Clone, PartialEq)]
pub struct TagRequest {
    pub text: String,
    /// Only honoured when `constant_score` is off.
    pub min_score: Option<f64>,
    /// Every match scores exactly 1.0.
    pub constant_score: bool,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl TagRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            min_score: None,
            constant_score: true,
            offset: None,
            limit: None,
        }
    }

    pub fn relevance(mut self, min_score: Option<f64>) -> Self {
        self.constant_score = false;
        self.min_score = min_score;
        self
    }

    pub fn page(mut self, offset: Option<u64>, limit: Option<u64>) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }
}

/// A resolved `[from, from + size)` result window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub from: u64,
    pub size: u64,
}

impl Pagination {
    /// `limit` defaults to, and is clamped to, the backend window; the window end never
    /// passes `MAX_RESULT_WINDOW`.
    pub fn resolve(offset: Option<u64>, limit: Option<u64>) -> Result<Self> {
        let from = offset.unwrap_or(0);
        if from >= MAX_RESULT_WINDOW {
            return Err(PercolatorError::invalid_parameter(
                "offset",
                format!("must be lower than {}", MAX_RESULT_WINDOW),
            ));
        }

        let limit = limit.unwrap_or(MAX_RESULT_WINDOW).min(MAX_RESULT_WINDOW);
        Ok(Self {
            from,
            size: limit.min(MAX_RESULT_WINDOW - from),
        })
    }
}

/// Coerces a JSON number or numeric string into a non-negative integer.
/// `null` means "not provided".
pub fn coerce_count(name: &str, value: &Value) -> Result<Option<u64>> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                Ok(Some(v))
            } else if n.as_i64().is_some() {
                Err(PercolatorError::invalid_parameter(name, "must not be negative"))
            } else {
                match n.as_f64() {
                    Some(f) if f >= 0.0 && f.fract() == 0.0 => Ok(Some(f as u64)),
                    _ => Err(PercolatorError::invalid_parameter(name, "must be an integer")),
                }
            }
        }
        Value::String(s) => coerce_count_str(name, s),
        _ => Err(PercolatorError::invalid_parameter(name, "must be an integer")),
    }
}

pub fn coerce_count_str(name: &str, raw: &str) -> Result<Option<u64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(v) = raw.parse::<u64>() {
        return Ok(Some(v));
    }
    if raw.parse::<i64>().is_ok() {
        return Err(PercolatorError::invalid_parameter(name, "must not be negative"));
    }
    Err(PercolatorError::invalid_parameter(name, "must be an integer"))
}

/// Coerces a JSON number or numeric string into a finite score.
pub fn coerce_score(name: &str, value: &Value) -> Result<Option<f64>> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_f64()
            .filter(|f| f.is_finite())
            .map(Some)
            .ok_or_else(|| PercolatorError::invalid_parameter(name, "must be a number")),
        Value::String(s) => coerce_score_str(name, s),
        _ => Err(PercolatorError::invalid_parameter(name, "must be a number")),
    }
}

pub fn coerce_score_str(name: &str, raw: &str) -> Result<Option<f64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(Some)
        .ok_or_else(|| PercolatorError::invalid_parameter(name, "must be a number"))
}
