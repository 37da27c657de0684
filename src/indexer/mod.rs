//! Indexer Module
//!
//! Offline index builders. Both indexers perform full rebuilds (delete, recreate,
//! load); there are no incremental updates.
//!
//! - **`query`**: percolator indexes. One stored query per vocabulary term, analysed
//!   with the domain's synonym-aware analyzer.
//! - **`taxon`**: a plain forward-search index over the species taxonomy table, for
//!   exact field lookups.
//! - **`types`**: configuration and document shapes shared with the tagger.

pub mod query;
pub mod taxon;
pub mod types;

#[cfg(test)]
mod tests;
