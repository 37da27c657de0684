//! HTTP API Module
//!
//! Exposes tagging over HTTP. Text can be sent directly, fetched from a URL or uploaded
//! as a document; the latter two go through text extraction first.
//!
//! ## Routes
//! - `GET /domains`: registered domains with their stored query counts
//! - `POST /tag`: tag JSON `content`
//! - `POST /tag/url`: tag the document at `url`
//! - `POST /tag/form`: tag an uploaded multipart `file`
//!
//! ## Submodules
//! - `types`: request parameters, validation, error responses
//! - `handlers`: axum handlers

pub mod handlers;
pub mod types;


use crate::domains::registry::DomainRegistry;
use crate::extraction::tika::TikaExtractor;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Extension, Router};
use std::sync::Arc;

/// Uploads may carry a full-size document plus multipart framing.
const MAX_BODY_BYTES: usize = 2 * types::MAX_CONTENT_LENGTH;

pub fn router(registry: Arc<DomainRegistry>, extractor: Arc<TikaExtractor>) -> Router {
    Router::new()
        .route("/domains", get(handlers::handle_list_domains))
        .route("/tag", post(handlers::handle_tag_text))
        .route("/tag/url", post(handlers::handle_tag_url))
        .route("/tag/form", post(handlers::handle_tag_form))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(Extension(registry))
        .layer(Extension(extractor))
}
