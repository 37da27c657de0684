use super::types::{IndexSources, MatchType, QueryDocument, QueryIndexConfig};
use crate::analysis::analyzer::{build, AnalyzerProfile};
use crate::analysis::expander::expand;
use crate::backend::client::SearchBackend;
use crate::error::{PercolatorError, Result};
use crate::vocabulary::loader::load_terms;
use crate::vocabulary::types::LoadOptions;

use async_trait::async_trait;
use std::sync::Arc;

pub const CONTENT_FIELD: &str = "content";
pub const SPECIES_INDEX: &str = "species_percolator";
pub const COUNTRY_INDEX: &str = "country_percolator";

/// Builds and describes a domain's percolator index.
///
/// A rebuild deletes the index and recreates it before storing queries, so readers
/// running during a rebuild see an empty or partial index. Rebuilds of one domain
/// must not run concurrently; a failed rebuild is fixed by running it again.
#[async_trait]
pub trait QueryIndexing: Send + Sync {
    fn config(&self) -> &QueryIndexConfig;

    /// Full rebuild from the given sources. Returns the number of stored queries.
    async fn index_queries(&self, sources: &IndexSources) -> Result<usize>;

    /// Number of stored queries.
    async fn count(&self) -> Result<u64>;
}

/// Percolator index builder configured by an analyzer profile.
pub struct PercolatorIndexer {
    client: Arc<dyn SearchBackend>,
    config: QueryIndexConfig,
    profile: AnalyzerProfile,
    requires_synonyms: bool,
    load_options: LoadOptions,
}

impl PercolatorIndexer {
    pub fn new(
        client: Arc<dyn SearchBackend>,
        config: QueryIndexConfig,
        profile: AnalyzerProfile,
    ) -> Self {
        Self {
            client,
            config,
            profile,
            requires_synonyms: false,
            load_options: LoadOptions::default(),
        }
    }

    pub fn species(client: Arc<dyn SearchBackend>) -> Self {
        Self::new(
            client,
            QueryIndexConfig {
                index: SPECIES_INDEX.to_string(),
                field_name: CONTENT_FIELD.to_string(),
                match_type: MatchType::MatchPhrase,
            },
            AnalyzerProfile::species(),
        )
    }

    /// Country queries need a synonyms source alongside the country list.
    pub fn countries(client: Arc<dyn SearchBackend>) -> Self {
        let mut indexer = Self::new(
            client,
            QueryIndexConfig {
                index: COUNTRY_INDEX.to_string(),
                field_name: CONTENT_FIELD.to_string(),
                match_type: MatchType::MatchPhrase,
            },
            AnalyzerProfile::country(),
        );
        indexer.requires_synonyms = true;
        indexer
    }

    fn query_document(&self, term: &str) -> QueryDocument {
        QueryDocument {
            term: term.to_string(),
            match_type: self.config.match_type,
            field_name: self.config.field_name.clone(),
        }
    }
}

#[async_trait]
impl QueryIndexing for PercolatorIndexer {
    fn config(&self) -> &QueryIndexConfig {
        &self.config
    }

    async fn index_queries(&self, sources: &IndexSources) -> Result<usize> {
        if self.requires_synonyms && sources.synonyms.is_none() {
            return Err(PercolatorError::invalid_parameter(
                "synonyms",
                format!("index {} needs a synonyms source", self.config.index),
            ));
        }

        let terms = load_terms(&sources.vocabulary, &self.load_options)?;

        tracing::info!("Building analyzer");
        let mut synonyms = expand(&terms, self.profile.abbreviations);
        if let Some(path) = &sources.synonyms {
            let lines = load_terms(path, &self.load_options)?;
            synonyms.merge_lines(lines.iter().map(String::as_str));
        }
        if let Some(dir) = &sources.dump_dir {
            synonyms
                .dump(dir)
                .map_err(|e| PercolatorError::output_write(dir, e))?;
            tracing::info!("Wrote synonym rules to {}", dir.display());
        }
        let analyzer = build(&self.profile, &synonyms);

        tracing::info!("(Re)Creating index {}", self.config.index);
        self.client.delete_index(&self.config.index).await?;
        self.client
            .create_index(&self.config.index, &analyzer.index_body(&self.config.field_name))
            .await?;

        tracing::info!("Registering {} queries", terms.len());
        let mut stored = 0;
        for term in &terms {
            let document = self.query_document(term);
            self.client
                .put_document(&self.config.index, &document.to_json())
                .await?;
            stored += 1;
        }

        self.client.refresh(&self.config.index).await?;
        tracing::info!("Stored {} queries in {}", stored, self.config.index);
        Ok(stored)
    }

    async fn count(&self) -> Result<u64> {
        self.client.count(&self.config.index).await
    }
}
