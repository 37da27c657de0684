use super::types::{LoadOptions, TableOptions, TableRow, TermSet};
use crate::error::{PercolatorError, Result};

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Trims an entry, collapses inner whitespace and optionally lower-cases it.
pub fn normalize(raw: &str, lowercase: bool) -> String {
    let joined = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if lowercase {
        joined.to_lowercase()
    } else {
        joined
    }
}

/// Reads a line-oriented source into a set of unique, normalized terms.
pub fn load_terms(path: &Path, options: &LoadOptions) -> Result<TermSet> {
    tracing::info!("Fetching terms from {}", path.display());

    let file = File::open(path).map_err(|e| PercolatorError::source_read(path, e))?;
    let mut terms = TermSet::new();

    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| PercolatorError::source_read(path, e))?;
        let term = normalize(&line, options.lowercase);
        if !term.is_empty() {
            terms.insert(term);
        }
    }

    tracing::info!("Read {} unique terms", terms.len());
    Ok(terms)
}

/// Reads every row of a delimited table with a header line.
///
/// Malformed rows (wrong field count, invalid UTF-8) are skipped with a warning unless
/// `options.strict` is set.
pub fn read_rows(path: &Path, options: &TableOptions) -> Result<Vec<TableRow>> {
    let mut reader = open_table(path, options)?;
    let headers = reader
        .headers()
        .map_err(|e| PercolatorError::source_read(path, e))?
        .clone();

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) if record.len() == headers.len() => record,
            Ok(record) => {
                let reason = format!(
                    "row {} has {} fields, expected {}",
                    idx + 1,
                    record.len(),
                    headers.len()
                );
                skip_or_fail(path, options, reason)?;
                continue;
            }
            Err(e) => {
                skip_or_fail(path, options, format!("row {}: {}", idx + 1, e))?;
                continue;
            }
        };

        let row: TableRow = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.trim().to_string(), v.trim().to_string()))
            .collect();
        rows.push(row);
    }

    tracing::info!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Pulls a single named column out of a delimited table as a normalized term set.
pub fn load_column(path: &Path, column: &str, options: &TableOptions) -> Result<TermSet> {
    tracing::info!("Fetching column '{}' from {}", column, path.display());

    let mut reader = open_table(path, options)?;
    let headers = reader
        .headers()
        .map_err(|e| PercolatorError::source_read(path, e))?
        .clone();
    let position = headers
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| PercolatorError::source_read(path, format!("no column '{}'", column)))?;

    let mut terms = TermSet::new();
    for (idx, record) in reader.records().enumerate() {
        match record {
            Ok(record) => match record.get(position) {
                Some(value) => {
                    let term = normalize(value, options.lowercase);
                    if !term.is_empty() {
                        terms.insert(term);
                    }
                }
                None => skip_or_fail(path, options, format!("row {} is too short", idx + 1))?,
            },
            Err(e) => skip_or_fail(path, options, format!("row {}: {}", idx + 1, e))?,
        }
    }

    tracing::info!("Read {} unique terms", terms.len());
    Ok(terms)
}

fn open_table(path: &Path, options: &TableOptions) -> Result<csv::Reader<File>> {
    let file = File::open(path).map_err(|e| PercolatorError::source_read(path, e))?;
    Ok(csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .flexible(true)
        .from_reader(file))
}

fn skip_or_fail(path: &Path, options: &TableOptions, reason: String) -> Result<()> {
    if options.strict {
        return Err(PercolatorError::source_read(path, reason));
    }
    tracing::warn!("Skipping malformed row in {}: {}", path.display(), reason);
    Ok(())
}

/// Writes terms one per line, in set order. Returns the number of lines written.
pub fn write_terms(path: &Path, terms: &TermSet) -> Result<usize> {
    let file = File::create(path).map_err(|e| PercolatorError::output_write(path, e))?;
    let mut writer = BufWriter::new(file);

    for term in terms {
        writeln!(writer, "{}", term).map_err(|e| PercolatorError::output_write(path, e))?;
    }
    writer.flush().map_err(|e| PercolatorError::output_write(path, e))?;

    tracing::info!("Wrote {} terms to {}", terms.len(), path.display());
    Ok(terms.len())
}
