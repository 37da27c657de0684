//! In-memory percolator used by the tests.
//!
//! Interprets the index body produced by `AnalyzerSpec::index_body` closely enough to
//! exercise the real indexing and tagging code end to end: tokenizer, lowercase filter,
//! directed (`a b => a_b`) and grouped (`a, b`) synonym rules, `match` and
//! `match_phrase` percolation, `constant_score`, `min_score`, `from` and `size`.

use super::client::SearchBackend;
use super::protocol::{Hit, SearchResponse};
use crate::error::{PercolatorError, Result};

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

type Position = BTreeSet<String>;

#[derive(Debug, Clone)]
enum MemFilter {
    Lowercase,
    Directed(Vec<(Vec<String>, String)>),
    Groups(Vec<BTreeSet<String>>),
}

#[derive(Debug, Clone, Default)]
struct MemAnalyzer {
    lowercase_tokenizer: bool,
    filters: Vec<MemFilter>,
}

#[derive(Debug, Default)]
struct MemIndex {
    analyzer: MemAnalyzer,
    documents: Vec<Value>,
}

#[derive(Default)]
pub struct InMemoryBackend {
    indices: Mutex<HashMap<String, MemIndex>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self, index: &str) -> Vec<Value> {
        self.indices
            .lock()
            .unwrap()
            .get(index)
            .map(|i| i.documents.clone())
            .unwrap_or_default()
    }
}

impl MemAnalyzer {
    fn from_body(body: &Value) -> Self {
        let analysis = &body["settings"]["analysis"];
        let Some((_, analyzer)) = analysis["analyzer"].as_object().and_then(|a| a.iter().next())
        else {
            return Self::default();
        };

        let lowercase_tokenizer = analyzer["tokenizer"] == "lowercase";
        let filters = analyzer["filter"]
            .as_array()
            .map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|name| {
                        if name == "lowercase" {
                            MemFilter::Lowercase
                        } else {
                            parse_synonym_filter(&analysis["filter"][name])
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            lowercase_tokenizer,
            filters,
        }
    }

    fn analyze(&self, text: &str) -> Vec<Position> {
        let pattern = if self.lowercase_tokenizer {
            r"[A-Za-z]+"
        } else {
            r"[A-Za-z0-9]+"
        };
        let re = Regex::new(pattern).unwrap();
        let mut tokens: Vec<String> = re.find_iter(text).map(|m| m.as_str().to_string()).collect();
        if self.lowercase_tokenizer {
            tokens = tokens.into_iter().map(|t| t.to_lowercase()).collect();
        }

        let mut positions: Vec<Position> =
            tokens.into_iter().map(|t| BTreeSet::from([t])).collect();

        for filter in &self.filters {
            positions = match filter {
                MemFilter::Lowercase => positions
                    .into_iter()
                    .map(|p| p.into_iter().map(|t| t.to_lowercase()).collect())
                    .collect(),
                MemFilter::Directed(rules) => apply_directed(positions, rules),
                MemFilter::Groups(groups) => positions
                    .into_iter()
                    .map(|mut p| {
                        for group in groups {
                            if p.iter().any(|t| group.contains(t)) {
                                p.extend(group.iter().cloned());
                            }
                        }
                        p
                    })
                    .collect(),
            };
        }
        positions
    }
}

fn parse_synonym_filter(def: &Value) -> MemFilter {
    let rules: Vec<&str> = def["synonyms"]
        .as_array()
        .map(|r| r.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    if rules.iter().any(|r| r.contains("=>")) {
        MemFilter::Directed(
            rules
                .iter()
                .filter_map(|r| r.split_once("=>"))
                .map(|(lhs, rhs)| {
                    (
                        lhs.split_whitespace().map(str::to_string).collect(),
                        rhs.trim().to_string(),
                    )
                })
                .collect(),
        )
    } else {
        MemFilter::Groups(
            rules
                .iter()
                .map(|r| r.split(',').map(|f| f.trim().to_string()).collect())
                .collect(),
        )
    }
}

fn apply_directed(positions: Vec<Position>, rules: &[(Vec<String>, String)]) -> Vec<Position> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < positions.len() {
        let best = rules
            .iter()
            .filter(|(lhs, _)| {
                i + lhs.len() <= positions.len()
                    && lhs.iter().enumerate().all(|(j, w)| positions[i + j].contains(w))
            })
            .max_by_key(|(lhs, _)| lhs.len());

        match best {
            Some((lhs, rhs)) => {
                out.push(BTreeSet::from([rhs.clone()]));
                i += lhs.len();
            }
            None => {
                out.push(positions[i].clone());
                i += 1;
            }
        }
    }
    out
}

fn phrase_matches(query: &[Position], document: &[Position]) -> bool {
    if query.is_empty() || query.len() > document.len() {
        return false;
    }
    (0..=document.len() - query.len()).any(|start| {
        query
            .iter()
            .enumerate()
            .all(|(j, q)| !q.is_disjoint(&document[start + j]))
    })
}

fn any_matches(query: &[Position], document: &[Position]) -> bool {
    query
        .iter()
        .any(|q| document.iter().any(|d| !q.is_disjoint(d)))
}

/// Unwraps `constant_score` and returns the percolate clause plus whether scoring is constant.
fn percolate_clause(query: &Value) -> Option<(&Value, bool)> {
    if let Some(inner) = query.get("constant_score") {
        return inner["filter"].get("percolate").map(|p| (p, true));
    }
    query.get("percolate").map(|p| (p, false))
}

#[async_trait]
impl SearchBackend for InMemoryBackend {
    async fn delete_index(&self, index: &str) -> Result<()> {
        self.indices.lock().unwrap().remove(index);
        Ok(())
    }

    async fn create_index(&self, index: &str, body: &Value) -> Result<()> {
        let mut indices = self.indices.lock().unwrap();
        if indices.contains_key(index) {
            return Err(PercolatorError::Backend {
                status: 400,
                body: format!("resource_already_exists_exception: {}", index),
            });
        }
        indices.insert(
            index.to_string(),
            MemIndex {
                analyzer: MemAnalyzer::from_body(body),
                documents: Vec::new(),
            },
        );
        Ok(())
    }

    async fn put_document(&self, index: &str, document: &Value) -> Result<()> {
        let mut indices = self.indices.lock().unwrap();
        indices
            .entry(index.to_string())
            .or_default()
            .documents
            .push(document.clone());
        Ok(())
    }

    async fn bulk_insert(&self, index: &str, documents: &[Value]) -> Result<usize> {
        let mut indices = self.indices.lock().unwrap();
        let entry = indices.entry(index.to_string()).or_default();
        entry.documents.extend(documents.iter().cloned());
        Ok(documents.len())
    }

    async fn refresh(&self, _index: &str) -> Result<()> {
        Ok(())
    }

    async fn search(&self, index: &str, body: &Value) -> Result<SearchResponse> {
        let indices = self.indices.lock().unwrap();
        let mem = indices.get(index).ok_or_else(|| PercolatorError::Backend {
            status: 404,
            body: format!("index_not_found_exception: {}", index),
        })?;

        let (percolate, constant) =
            percolate_clause(&body["query"]).ok_or_else(|| PercolatorError::Backend {
                status: 400,
                body: "only percolate queries are supported".to_string(),
            })?;

        let text = percolate["document"]
            .as_object()
            .and_then(|d| d.values().next())
            .and_then(Value::as_str)
            .unwrap_or_default();
        let document = mem.analyzer.analyze(text);
        let min_score = body.get("min_score").and_then(Value::as_f64);

        let mut hits = Vec::new();
        for stored in &mem.documents {
            let Some((match_type, clause)) = stored["query"].as_object().and_then(|q| q.iter().next())
            else {
                continue;
            };
            let Some(term) = clause.as_object().and_then(|c| c.values().next()).and_then(Value::as_str)
            else {
                continue;
            };

            let query = mem.analyzer.analyze(term);
            let matched = if match_type == "match_phrase" {
                phrase_matches(&query, &document)
            } else {
                any_matches(&query, &document)
            };
            if !matched {
                continue;
            }

            let score = if constant { 1.0 } else { 0.5 + query.len() as f64 * 0.25 };
            if !constant && min_score.is_some_and(|m| score < m) {
                continue;
            }
            hits.push(Hit {
                id: None,
                score: Some(score),
                source: stored.clone(),
            });
        }

        let from = body.get("from").and_then(Value::as_u64).unwrap_or(0) as usize;
        let size = body.get("size").and_then(Value::as_u64).unwrap_or(10) as usize;
        let page = hits.into_iter().skip(from).take(size).collect();

        Ok(SearchResponse::from_hits(page))
    }

    async fn count(&self, index: &str) -> Result<u64> {
        Ok(self
            .indices
            .lock()
            .unwrap()
            .get(index)
            .map(|i| i.documents.len() as u64)
            .unwrap_or(0))
    }
}
