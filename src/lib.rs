//! Multi-Domain Percolation Tagging Library
//!
//! Builds one Elasticsearch percolator index per tagging domain (species, countries)
//! from a plain vocabulary, then tags free text by percolating it against the stored
//! queries. This crate is the foundation for the binary executable (`main.rs`).
//!
//! ## Architecture Modules
//!
//! - **`vocabulary`**: Reads line files and delimited tables into normalized term sets.
//! - **`analysis`**: Expands terms into autophrase rules and synonym groups, and turns
//!   them into a custom analyzer for the index settings.
//! - **`backend`**: The search backend capability and its Elasticsearch REST client.
//! - **`indexer`**: Rebuilds percolator indexes and the species taxonomy index.
//! - **`tagger`**: Percolates text and maps hits back to formatted terms with scores.
//! - **`domains`**: The registry that binds a domain name to its indexer and tagger.
//! - **`extraction`**: Document and URL text extraction through Apache Tika.
//! - **`api`**: HTTP routes for listing domains and tagging text, URLs and uploads.
//! - **`config`** / **`error`**: Environment settings and the library error type.

pub mod analysis;
pub mod api;
pub mod backend;
pub mod config;
pub mod domains;
pub mod error;
pub mod extraction;
pub mod indexer;
pub mod tagger;
pub mod vocabulary;
