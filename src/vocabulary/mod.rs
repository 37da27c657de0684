//! Vocabulary Module
//!
//! Reads raw vocabulary sources into normalized term sets.
//!
//! ## Sources
//! - **Line files**: one raw entry per line (species lists, country lists, synonym lines).
//! - **Delimited tables**: taxonomy exports with a header row; a single column can be
//!   pulled out as a term set, or whole rows can be streamed for the taxon index.
//!
//! Normalization is trim + lower-case; empty entries are dropped and duplicates collapse.

pub mod loader;
pub mod types;
