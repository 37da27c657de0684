//! Tag Domains
//!
//! - **`registry`**: the name -> capabilities mapping and the built-in domain list.

pub mod registry;
