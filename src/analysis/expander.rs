use crate::vocabulary::loader::normalize;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;

pub const AUTOPHRASE_DUMP_FILE: &str = "autophrase_syns.txt";
pub const SYNONYMS_DUMP_FILE: &str = "syns.txt";

/// Directed rule collapsing a surface form into a single token.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct AutophraseRule {
    pub surface: String,
    pub token: String,
}

impl AutophraseRule {
    /// Solr-format rule line, e.g. `capricornis thar => capricornis_thar`.
    pub fn render(&self) -> String {
        format!("{} => {}", self.surface, self.token)
    }
}

/// Interchangeable single tokens.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SynonymGroup {
    pub forms: BTreeSet<String>,
}

impl SynonymGroup {
    pub fn render(&self) -> String {
        self.forms.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Output of an expansion run. Both collections are sorted, so two runs over the same
/// term set always produce identical rule lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SynonymSet {
    pub autophrase_rules: BTreeSet<AutophraseRule>,
    pub synonym_groups: BTreeSet<SynonymGroup>,
}

impl SynonymSet {
    pub fn autophrase_lines(&self) -> Vec<String> {
        self.autophrase_rules.iter().map(AutophraseRule::render).collect()
    }

    pub fn synonym_lines(&self) -> Vec<String> {
        self.synonym_groups.iter().map(SynonymGroup::render).collect()
    }

    /// Merges extra synonym lines (`a, b, c`) into the synonym groups.
    ///
    /// Each form is normalized and autophrased so it lines up with the tokens the
    /// autophrase filter produces. Multi-word forms also get their own autophrase rule,
    /// since they need not appear in the vocabulary. Lines with fewer than two distinct
    /// forms are ignored.
    pub fn merge_lines<'a, I>(&mut self, lines: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for line in lines {
            let surfaces: BTreeSet<String> = line
                .split(',')
                .map(|form| normalize(form, true))
                .filter(|form| !form.is_empty())
                .collect();
            let forms: BTreeSet<String> = surfaces.iter().map(|form| autophrase(form)).collect();

            if forms.len() < 2 {
                tracing::debug!("Ignoring synonym line with a single form: {:?}", line);
                continue;
            }

            for surface in surfaces.into_iter().filter(|s| s.contains(' ')) {
                let token = autophrase(&surface);
                self.autophrase_rules.insert(AutophraseRule { surface, token });
            }
            self.synonym_groups.insert(SynonymGroup { forms });
        }
    }

    /// Writes the rendered rule files into `dir` for inspection.
    pub fn dump(&self, dir: &Path) -> io::Result<()> {
        let mut autophrase = self.autophrase_lines().join("\n");
        autophrase.push('\n');
        fs::write(dir.join(AUTOPHRASE_DUMP_FILE), autophrase)?;

        let mut synonyms = self.synonym_lines().join("\n");
        synonyms.push('\n');
        fs::write(dir.join(SYNONYMS_DUMP_FILE), synonyms)
    }
}

/// Contracts a multi-word term for autophrasing:
/// `capricornis thar` -> `capricornis_thar`.
pub fn autophrase(term: &str) -> String {
    term.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Abbreviates the first word of a multi-word term to its initial:
/// `capricornis thar` -> `c thar`. Single words have no abbreviation.
pub fn abbreviate(term: &str) -> Option<String> {
    let mut words = term.split_whitespace();
    let first = words.next()?;
    let rest: Vec<&str> = words.collect();
    if rest.is_empty() {
        return None;
    }

    let initial = first.chars().next()?;
    Some(format!("{} {}", initial, rest.join(" ")))
}

/// Builds the autophrase rules and synonym groups for a term set.
pub fn expand<'a, I>(terms: I, with_abbreviations: bool) -> SynonymSet
where
    I: IntoIterator<Item = &'a String>,
{
    let mut set = SynonymSet::default();

    for term in terms {
        let token = autophrase(term);
        set.autophrase_rules.insert(AutophraseRule {
            surface: term.clone(),
            token: token.clone(),
        });

        if !with_abbreviations {
            continue;
        }

        if let Some(abbr) = abbreviate(term) {
            let abbr_token = autophrase(&abbr);
            set.autophrase_rules.insert(AutophraseRule {
                surface: abbr,
                token: abbr_token.clone(),
            });
            set.synonym_groups.insert(SynonymGroup {
                forms: BTreeSet::from([token, abbr_token]),
            });
        }
    }

    tracing::debug!(
        "Expanded into {} autophrase rules and {} synonym groups",
        set.autophrase_rules.len(),
        set.synonym_groups.len()
    );
    set
}
