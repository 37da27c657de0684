use super::types::{
    ApiError, DomainInfo, TagOptions, TagParams, TagResponse, MAX_CONTENT_LENGTH, MAX_URL_LENGTH,
};
use crate::domains::registry::DomainRegistry;
use crate::error::Result;
use crate::extraction::tika::TikaExtractor;

use axum::extract::Multipart;
use axum::{Extension, Json};
use indexmap::IndexMap;
use std::sync::Arc;

/// Runs the text through every selected domain's tagger.
pub async fn tag_domains(
    registry: &DomainRegistry,
    text: &str,
    options: &TagOptions,
) -> Result<TagResponse> {
    let domains = registry.resolve(options.domains.as_deref())?;
    let request = options.request(text);

    let mut response = TagResponse::new();
    for domain in domains {
        let tags = domain.tagger.get_tags(&request).await?;
        tracing::debug!("Domain {} matched {} terms", domain.name, tags.len());
        response.insert(domain.name.clone(), tags);
    }
    Ok(response)
}

pub async fn handle_list_domains(
    Extension(registry): Extension<Arc<DomainRegistry>>,
) -> std::result::Result<Json<IndexMap<String, DomainInfo>>, ApiError> {
    let mut domains = IndexMap::new();
    for domain in registry.all() {
        let tags_count = domain.query_indexer.count().await?;
        domains.insert(
            domain.name.clone(),
            DomainInfo {
                description: domain.description.clone(),
                tags_count,
            },
        );
    }
    Ok(Json(domains))
}

pub async fn handle_tag_text(
    Extension(registry): Extension<Arc<DomainRegistry>>,
    Json(params): Json<TagParams>,
) -> std::result::Result<Json<TagResponse>, ApiError> {
    let options = params.options()?;
    let content = match params.content.as_deref() {
        Some(content) if !content.trim().is_empty() => content,
        _ => return Err(ApiError::bad_request("content", "This field is required.")),
    };
    if content.len() > MAX_CONTENT_LENGTH {
        return Err(ApiError::bad_request("content", "Content is too long."));
    }

    tracing::debug!("Tagging {} bytes of text", content.len());
    Ok(Json(tag_domains(&registry, content, &options).await?))
}

pub async fn handle_tag_url(
    Extension(registry): Extension<Arc<DomainRegistry>>,
    Extension(extractor): Extension<Arc<TikaExtractor>>,
    Json(params): Json<TagParams>,
) -> std::result::Result<Json<TagResponse>, ApiError> {
    let options = params.options()?;
    let url = match params.url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => url,
        _ => return Err(ApiError::bad_request("url", "This field is required.")),
    };
    if url.len() > MAX_URL_LENGTH {
        return Err(ApiError::bad_request("url", "URL is too long."));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ApiError::bad_request("url", "Enter a valid URL."));
    }

    let text = extractor.extract_from_url(url).await?;
    Ok(Json(tag_domains(&registry, &text, &options).await?))
}

pub async fn handle_tag_form(
    Extension(registry): Extension<Arc<DomainRegistry>>,
    Extension(extractor): Extension<Arc<TikaExtractor>>,
    mut multipart: Multipart,
) -> std::result::Result<Json<TagResponse>, ApiError> {
    let mut file: Option<Vec<u8>> = None;
    let mut fields = IndexMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request("file", &e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request("file", &e.body_text()))?;
            file = Some(bytes.to_vec());
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::bad_request(&name, &e.body_text()))?;
            fields.insert(name, value);
        }
    }

    let options = TagParams::from_form(&fields).options()?;
    let bytes = match file {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => return Err(ApiError::bad_request("file", "No file was submitted.")),
    };

    let text = extractor.extract(bytes).await?;
    Ok(Json(tag_domains(&registry, &text, &options).await?))
}
