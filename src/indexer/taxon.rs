use super::types::{TaxonCriteria, TaxonFieldConfig, TaxonRecord};
use crate::analysis::expander::autophrase;
use crate::backend::client::SearchBackend;
use crate::backend::protocol::MAX_RESULT_WINDOW;
use crate::error::Result;
use crate::vocabulary::loader::{normalize, read_rows};
use crate::vocabulary::types::{TableOptions, TableRow};

use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;

pub const SPECIES_TAXA_INDEX: &str = "species_taxa";
const BULK_CHUNK_SIZE: usize = 500;

/// Forward-search index over a structured taxonomy table. Unrelated to percolation.
#[async_trait]
pub trait TaxonIndexing: Send + Sync {
    fn index_name(&self) -> &str;

    /// Recreates the index and bulk-loads every row of the table.
    async fn index_taxa(&self, path: &Path) -> Result<usize>;

    /// All records whose fields equal the (treated) criteria values.
    async fn search(&self, criteria: &TaxonCriteria) -> Result<Vec<TaxonRecord>>;

    async fn first(&self, criteria: &TaxonCriteria) -> Result<Option<TaxonRecord>>;
}

pub struct SpeciesTaxonIndexer {
    client: Arc<dyn SearchBackend>,
    index: String,
    fields: TaxonFieldConfig,
    table: TableOptions,
}

impl SpeciesTaxonIndexer {
    pub fn new(client: Arc<dyn SearchBackend>) -> Self {
        Self::with_fields(client, TaxonFieldConfig::species())
    }

    pub fn with_fields(client: Arc<dyn SearchBackend>, fields: TaxonFieldConfig) -> Self {
        Self {
            client,
            index: SPECIES_TAXA_INDEX.to_string(),
            fields,
            // Values keep their case unless a field treatment says otherwise.
            table: TableOptions {
                lowercase: false,
                ..TableOptions::default()
            },
        }
    }

    /// Applies the configured treatment for `field` to a raw value.
    pub fn treat(&self, field: &str, value: &str) -> String {
        if self.fields.autophrase.iter().any(|f| f == field) {
            autophrase(&normalize(value, true))
        } else if self.fields.normalize.iter().any(|f| f == field) {
            normalize(value, true)
        } else {
            value.trim().to_string()
        }
    }

    pub fn prepare(&self, row: &TableRow) -> TaxonRecord {
        row.iter()
            .map(|(header, value)| {
                let field = field_key(header);
                let value = self.treat(&field, value);
                (field, value)
            })
            .collect()
    }

    pub fn criteria_query(&self, criteria: &TaxonCriteria, size: u64) -> Value {
        let filters: Vec<Value> = criteria
            .iter()
            .map(|(field, value)| {
                let field = field_key(field);
                let value = self.treat(&field, value);
                let mut term = serde_json::Map::new();
                term.insert(field, json!(value));
                json!({ "term": term })
            })
            .collect();

        json!({
            "query": { "bool": { "filter": filters } },
            "size": size,
        })
    }

    fn index_body() -> Value {
        json!({
            "mappings": {
                "dynamic_templates": [{
                    "strings_as_keywords": {
                        "match_mapping_type": "string",
                        "mapping": { "type": "keyword" }
                    }
                }]
            }
        })
    }

    async fn lookup(&self, criteria: &TaxonCriteria, size: u64) -> Result<Vec<TaxonRecord>> {
        let body = self.criteria_query(criteria, size);
        let response = self.client.search(&self.index, &body).await?;

        Ok(response
            .hits
            .hits
            .into_iter()
            .filter_map(|hit| record_from_source(&hit.source))
            .collect())
    }
}

#[async_trait]
impl TaxonIndexing for SpeciesTaxonIndexer {
    fn index_name(&self) -> &str {
        &self.index
    }

    async fn index_taxa(&self, path: &Path) -> Result<usize> {
        let rows = read_rows(path, &self.table)?;

        tracing::info!("(Re)Creating index {}", self.index);
        self.client.delete_index(&self.index).await?;
        self.client.create_index(&self.index, &Self::index_body()).await?;

        let mut stored = 0;
        for chunk in rows.chunks(BULK_CHUNK_SIZE) {
            let documents: Vec<Value> = chunk
                .iter()
                .map(|row| json!(self.prepare(row)))
                .collect();
            stored += self.client.bulk_insert(&self.index, &documents).await?;
            tracing::debug!("Bulk stored {} taxa so far", stored);
        }

        self.client.refresh(&self.index).await?;
        tracing::info!("Stored {} taxa in {}", stored, self.index);
        Ok(stored)
    }

    async fn search(&self, criteria: &TaxonCriteria) -> Result<Vec<TaxonRecord>> {
        self.lookup(criteria, MAX_RESULT_WINDOW).await
    }

    async fn first(&self, criteria: &TaxonCriteria) -> Result<Option<TaxonRecord>> {
        Ok(self.lookup(criteria, 1).await?.into_iter().next())
    }
}

/// Column header to field name: `Scientific Name` -> `scientific_name`.
pub fn field_key(header: &str) -> String {
    header
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

fn record_from_source(source: &Value) -> Option<TaxonRecord> {
    let object = source.as_object()?;
    Some(
        object
            .iter()
            .map(|(k, v)| {
                let value = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), value)
            })
            .collect(),
    )
}
