/// Per-domain presentation of matched terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagFormat {
    /// `capricornis thar` -> `Capricornis thar`
    Species,
    /// `united states` -> `United States`
    Country,
}

impl TagFormat {
    pub fn apply(&self, term: &str) -> String {
        match self {
            TagFormat::Species => capitalize(term),
            TagFormat::Country => term
                .split_whitespace()
                .map(capitalize)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// Upper-cases the first character and lower-cases the rest.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            let mut out: String = first.to_uppercase().collect();
            out.push_str(&chars.as_str().to_lowercase());
            out
        }
        None => String::new(),
    }
}
