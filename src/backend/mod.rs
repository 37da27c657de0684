//! Search Backend Module
//!
//! The only way the engine talks to the search backend. Components receive an
//! `Arc<dyn SearchBackend>` at construction; the binary owns the concrete client.
//!
//! ## Submodules
//! - **`client`**: the `SearchBackend` trait and the Elasticsearch REST client.
//! - **`protocol`**: endpoint paths, the result window limit and response DTOs.

pub mod client;
pub mod protocol;

#[cfg(test)]
pub mod memory;
#[cfg(test)]
pub mod mock;
