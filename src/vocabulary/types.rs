use indexmap::IndexMap;
use std::collections::BTreeSet;

/// A normalized vocabulary set. Sorted storage keeps every downstream build deterministic.
pub type TermSet = BTreeSet<String>;

/// One header-keyed row of a delimited table, in column order.
pub type TableRow = IndexMap<String, String>;

/// Options for line-oriented sources.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub lowercase: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { lowercase: true }
    }
}

/// Options for delimited tabular sources.
#[derive(Debug, Clone)]
pub struct TableOptions {
    pub delimiter: u8,
    pub lowercase: bool,
    /// Fail on the first malformed row instead of skipping it.
    pub strict: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            delimiter: b';',
            lowercase: true,
            strict: false,
        }
    }
}
