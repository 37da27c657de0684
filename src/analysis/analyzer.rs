use super::expander::SynonymSet;
use serde_json::{json, Map, Value};

/// Name of the percolator field holding stored queries.
pub const QUERY_FIELD: &str = "query";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizerKind {
    /// Unicode word boundaries; needs a separate lowercase filter.
    Standard,
    /// Splits on non-letters and lower-cases in one step.
    Lowercase,
}

impl TokenizerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenizerKind::Standard => "standard",
            TokenizerKind::Lowercase => "lowercase",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterSpec {
    /// Backend built-in `lowercase` token filter.
    Lowercase,
    Synonym {
        name: String,
        rules: Vec<String>,
        /// Parse rules with a keyword tokenizer, so only whole tokens can match.
        keyword_matcher: bool,
    },
}

impl FilterSpec {
    pub fn name(&self) -> &str {
        match self {
            FilterSpec::Lowercase => "lowercase",
            FilterSpec::Synonym { name, .. } => name,
        }
    }

    fn definition(&self) -> Option<Value> {
        match self {
            FilterSpec::Lowercase => None,
            FilterSpec::Synonym {
                rules,
                keyword_matcher,
                ..
            } => {
                let mut def = json!({ "type": "synonym", "synonyms": rules });
                if *keyword_matcher {
                    def["tokenizer"] = json!("keyword");
                }
                Some(def)
            }
        }
    }
}

/// How a domain wants its content analysed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerProfile {
    /// Prefix for analyzer and filter names (`species` -> `species_analyzer`).
    pub prefix: String,
    pub tokenizer: TokenizerKind,
    /// Insert a lowercase filter ahead of the synonym filters.
    pub lowercase_filter: bool,
    /// Generate first-word abbreviations for multi-word terms.
    pub abbreviations: bool,
}

impl AnalyzerProfile {
    pub fn species() -> Self {
        Self {
            prefix: "species".to_string(),
            tokenizer: TokenizerKind::Standard,
            lowercase_filter: true,
            abbreviations: true,
        }
    }

    pub fn country() -> Self {
        Self {
            prefix: "country".to_string(),
            tokenizer: TokenizerKind::Lowercase,
            lowercase_filter: false,
            abbreviations: false,
        }
    }

    pub fn analyzer_name(&self) -> String {
        format!("{}_analyzer", self.prefix)
    }
}

/// Tokenizer plus ordered filter chain, attached to one index at creation time.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerSpec {
    pub name: String,
    pub tokenizer: TokenizerKind,
    pub filters: Vec<FilterSpec>,
}

impl AnalyzerSpec {
    /// Renders index settings and mappings: the percolator field plus the analysed
    /// content field.
    pub fn index_body(&self, content_field: &str) -> Value {
        let mut filters = Map::new();
        for filter in &self.filters {
            if let Some(def) = filter.definition() {
                filters.insert(filter.name().to_string(), def);
            }
        }

        let chain: Vec<&str> = self.filters.iter().map(FilterSpec::name).collect();

        let mut properties = Map::new();
        properties.insert(QUERY_FIELD.to_string(), json!({ "type": "percolator" }));
        properties.insert(
            content_field.to_string(),
            json!({ "type": "text", "analyzer": self.name }),
        );

        let mut analyzers = Map::new();
        analyzers.insert(
            self.name.clone(),
            json!({
                "type": "custom",
                "tokenizer": self.tokenizer.as_str(),
                "filter": chain,
            }),
        );

        json!({
            "settings": {
                "analysis": {
                    "filter": filters,
                    "analyzer": analyzers,
                }
            },
            "mappings": { "properties": properties }
        })
    }
}

/// Assembles the analyzer for a domain: autophrase filter first, synonym filter second.
/// Synonym filters without rules are left out of the chain.
pub fn build(profile: &AnalyzerProfile, synonyms: &SynonymSet) -> AnalyzerSpec {
    let mut filters = Vec::new();

    if profile.lowercase_filter {
        filters.push(FilterSpec::Lowercase);
    }

    let autophrase = synonyms.autophrase_lines();
    if !autophrase.is_empty() {
        filters.push(FilterSpec::Synonym {
            name: format!("{}_autophrase_syn", profile.prefix),
            rules: autophrase,
            keyword_matcher: false,
        });
    }

    let groups = synonyms.synonym_lines();
    if !groups.is_empty() {
        filters.push(FilterSpec::Synonym {
            name: format!("{}_syn", profile.prefix),
            rules: groups,
            keyword_matcher: true,
        });
    }

    AnalyzerSpec {
        name: profile.analyzer_name(),
        tokenizer: profile.tokenizer,
        filters,
    }
}
