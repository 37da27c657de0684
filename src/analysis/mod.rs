//! Analysis Module
//!
//! Everything the search backend needs to recognise vocabulary terms in free text.
//! No text is analysed here: this module only *describes* the backend's analysis chain.
//!
//! ## Pipeline
//! 1. **Expansion** (`expander`): every term gets an autophrase rule collapsing it into a
//!    single token (`capricornis thar => capricornis_thar`). Multi-word terms may also get
//!    an abbreviation (`c thar`) whose autophrased token is grouped with the term's.
//! 2. **Analyzer** (`analyzer`): the rules are wrapped into an ordered filter chain. The
//!    autophrase filter must run before the synonym filter, which only ever sees whole
//!    collapsed tokens.
//!
//! ## Submodules
//! - **`expander`**: autophrasing, abbreviations, synonym groups.
//! - **`analyzer`**: per-domain profiles and the rendered index settings.

pub mod analyzer;
pub mod expander;
