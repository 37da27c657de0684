//! Tagger Module
//!
//! Request-time side of the engine: percolates input text against a domain's stored
//! queries and turns the hits into a formatted term -> score map.
//!
//! ## Scoring
//! - **Constant** (default): the percolate clause runs as a filter; every match scores 1.0
//!   and `min_score` is ignored.
//! - **Relevance**: backend scores are kept and `min_score` drops weaker hits.
//!
//! ## Submodules
//! - **`engine`**: the `Tagging` trait and the percolating implementation.
//! - **`format`**: per-domain capitalization of matched terms.
//! - **`types`**: requests, result windows, parameter coercion.

pub mod engine;
pub mod format;
pub mod types;
