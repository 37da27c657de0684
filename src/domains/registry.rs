//! Domain Registry
//!
//! Maps domain names (e.g. "speciesplus") to the capabilities that index and tag them.
//! The registry is filled once at startup and then shared read-only behind an `Arc`.
//! Adding a domain means registering one more `Domain`; nothing else changes.

use crate::backend::client::SearchBackend;
use crate::error::{PercolatorError, Result};
use crate::indexer::query::{PercolatorIndexer, QueryIndexing};
use crate::indexer::taxon::{SpeciesTaxonIndexer, TaxonIndexing};
use crate::tagger::engine::{PercolateTagger, Tagging};
use crate::tagger::format::TagFormat;

use indexmap::IndexMap;
use std::sync::Arc;

pub const SPECIES_DOMAIN: &str = "speciesplus";
pub const COUNTRY_DOMAIN: &str = "countries";

const SPECIES_DESCRIPTION: &str = "Species listed in the Appendices of CITES and CMS, as well as \
    other CMS Family listings and species included in the Annexes to the EU Wildlife Trade \
    Regulations.";
const COUNTRY_DESCRIPTION: &str = "Country names, including common abbreviations and alternative names.";

/// A tagging domain and its capabilities.
pub struct Domain {
    pub name: String,
    pub description: String,
    pub query_indexer: Arc<dyn QueryIndexing>,
    pub tagger: Arc<dyn Tagging>,
    /// Forward-search taxonomy index, unrelated to percolation.
    pub taxon_indexer: Option<Arc<dyn TaxonIndexing>>,
}

impl std::fmt::Debug for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Domain")
            .field("name", &self.name)
            .field("index", &self.query_indexer.config().index)
            .field("taxon_indexer", &self.taxon_indexer.is_some())
            .finish()
    }
}

/// Registry of tagging domains, in registration order.
#[derive(Debug, Default)]
pub struct DomainRegistry {
    domains: IndexMap<String, Arc<Domain>>,
}

impl DomainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in domains, all sharing one backend client.
    pub fn standard(client: Arc<dyn SearchBackend>) -> Result<Self> {
        let mut registry = Self::new();

        let species = Arc::new(PercolatorIndexer::species(client.clone()));
        registry.register(Domain {
            name: SPECIES_DOMAIN.to_string(),
            description: SPECIES_DESCRIPTION.to_string(),
            tagger: Arc::new(PercolateTagger::new(
                client.clone(),
                species.config().clone(),
                TagFormat::Species,
            )),
            query_indexer: species,
            taxon_indexer: Some(Arc::new(SpeciesTaxonIndexer::new(client.clone()))),
        })?;

        let countries = Arc::new(PercolatorIndexer::countries(client.clone()));
        registry.register(Domain {
            name: COUNTRY_DOMAIN.to_string(),
            description: COUNTRY_DESCRIPTION.to_string(),
            tagger: Arc::new(PercolateTagger::new(
                client,
                countries.config().clone(),
                TagFormat::Country,
            )),
            query_indexer: countries,
            taxon_indexer: None,
        })?;

        Ok(registry)
    }

    /// Adds a domain. Names must be non-empty and unique.
    pub fn register(&mut self, domain: Domain) -> Result<()> {
        if domain.name.trim().is_empty() {
            return Err(PercolatorError::Config("Domain name must not be empty".to_string()));
        }
        if self.domains.contains_key(&domain.name) {
            return Err(PercolatorError::Config(format!(
                "Domain '{}' is already registered",
                domain.name
            )));
        }

        tracing::info!("Registered tag domain: {}", domain.name);
        self.domains.insert(domain.name.clone(), Arc::new(domain));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<Domain>> {
        self.domains
            .get(name)
            .cloned()
            .ok_or_else(|| PercolatorError::UnknownDomain(name.to_string()))
    }

    pub fn all(&self) -> Vec<Arc<Domain>> {
        self.domains.values().cloned().collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.domains.keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.domains.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Looks up the requested domains, or returns all of them when none are requested.
    /// Duplicate names are collapsed.
    pub fn resolve(&self, names: Option<&[String]>) -> Result<Vec<Arc<Domain>>> {
        match names {
            None | Some([]) => Ok(self.all()),
            Some(names) => {
                let mut resolved: IndexMap<String, Arc<Domain>> = IndexMap::new();
                for name in names {
                    let domain = self.get(name.trim())?;
                    resolved.insert(domain.name.clone(), domain);
                }
                Ok(resolved.into_values().collect())
            }
        }
    }
}
