use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::PathBuf;

/// How a stored query matches content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Any analysed token of the term.
    Match,
    /// All tokens, adjacent and in order. Needed whenever word order carries meaning.
    MatchPhrase,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Match => "match",
            MatchType::MatchPhrase => "match_phrase",
        }
    }
}

/// Where a domain's queries live and how they are shaped. Copied into taggers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryIndexConfig {
    pub index: String,
    pub field_name: String,
    pub match_type: MatchType,
}

/// A stored percolator query for one vocabulary term.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDocument {
    pub term: String,
    pub match_type: MatchType,
    pub field_name: String,
}

impl QueryDocument {
    /// `{ "query": { <match_type>: { <field>: <term> } } }`
    pub fn to_json(&self) -> Value {
        let mut clause = serde_json::Map::new();
        clause.insert(self.field_name.clone(), json!(self.term));

        let mut query = serde_json::Map::new();
        query.insert(self.match_type.as_str().to_string(), Value::Object(clause));

        json!({ "query": query })
    }
}

/// Vocabulary inputs for one rebuild.
#[derive(Debug, Clone)]
pub struct IndexSources {
    pub vocabulary: PathBuf,
    /// Extra synonym lines (`a, b, c`) merged into the synonym filter.
    pub synonyms: Option<PathBuf>,
    /// Where to write the generated rule files, when set.
    pub dump_dir: Option<PathBuf>,
}

impl IndexSources {
    pub fn vocabulary(path: impl Into<PathBuf>) -> Self {
        Self {
            vocabulary: path.into(),
            synonyms: None,
            dump_dir: None,
        }
    }

    pub fn with_synonyms(mut self, path: impl Into<PathBuf>) -> Self {
        self.synonyms = Some(path.into());
        self
    }

    pub fn with_dump_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dump_dir = Some(dir.into());
        self
    }
}

/// One taxonomy row as stored in (and returned from) the taxon index.
pub type TaxonRecord = IndexMap<String, String>;

/// Field -> value criteria for exact taxon lookups.
pub type TaxonCriteria = IndexMap<String, String>;

/// Per-field treatments applied to taxonomy values before indexing and lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxonFieldConfig {
    /// Trimmed, whitespace-collapsed and lower-cased.
    pub normalize: Vec<String>,
    /// Normalized, then collapsed into one `_`-joined token.
    pub autophrase: Vec<String>,
}

impl TaxonFieldConfig {
    pub fn species() -> Self {
        Self {
            normalize: ["kingdom", "phylum", "class", "order", "family", "genus", "species"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            autophrase: vec!["scientific_name".to_string()],
        }
    }
}
