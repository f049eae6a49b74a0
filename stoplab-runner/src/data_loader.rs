//! CSV loading for payoff pools and recorded stopping decisions.
//!
//! Both formats have a header row followed by one record per line. Blank
//! rows are skipped. A value that does not parse fails the whole load with
//! the offending line number; silently dropping rows would skew the
//! empirical distribution.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use stoplab_core::{PayoffPool, StoppingDecision};
use thiserror::Error;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: '{value}' is not a number")]
    InvalidPayoff { line: u64, value: String },

    #[error("line {line}: '{value}' is not a valid stop index")]
    InvalidIndex { line: u64, value: String },
}

/// Load a payoff pool from a CSV file (first column of every row).
pub fn load_payoffs(path: &Path) -> Result<PayoffPool, LoadError> {
    let file = open(path)?;
    let values = parse_payoffs(file)?;
    debug!("loaded {} payoffs from {}", values.len(), path.display());
    Ok(PayoffPool::new(values))
}

/// Parse payoffs from any CSV reader.
pub fn parse_payoffs<R: Read>(reader: R) -> Result<Vec<f64>, LoadError> {
    let mut payoffs = Vec::new();
    for row in rows(reader) {
        let (line, record) = row?;
        payoffs.push(parse_payoff(line, &record[0])?);
    }
    Ok(payoffs)
}

/// Load `payoff,index` decisions written by the `simulate` stage.
pub fn load_decisions(path: &Path) -> Result<Vec<StoppingDecision>, LoadError> {
    let file = open(path)?;
    let decisions = parse_decisions(file)?;
    debug!("loaded {} decisions from {}", decisions.len(), path.display());
    Ok(decisions)
}

/// Parse `payoff,index` decisions; an absent or empty index becomes `None`.
pub fn parse_decisions<R: Read>(reader: R) -> Result<Vec<StoppingDecision>, LoadError> {
    let mut decisions = Vec::new();
    for row in rows(reader) {
        let (line, record) = row?;
        let value = parse_payoff(line, &record[0])?;
        let index = match record.get(1).filter(|s| !s.is_empty()) {
            Some(raw) => Some(raw.parse::<usize>().map_err(|_| LoadError::InvalidIndex {
                line,
                value: raw.to_string(),
            })?),
            None => None,
        };
        decisions.push(StoppingDecision { value, index });
    }
    Ok(decisions)
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Non-blank data records paired with their 1-based line numbers.
fn rows<R: Read>(reader: R) -> impl Iterator<Item = Result<(u64, csv::StringRecord), LoadError>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    rdr.into_records().enumerate().filter_map(|(i, record)| {
        let record = match record {
            Ok(r) => r,
            Err(e) => return Some(Err(e.into())),
        };
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(i as u64 + 2);
        if record.iter().all(str::is_empty) {
            warn!("skipping blank row at line {line}");
            return None;
        }
        Some(Ok((line, record)))
    })
}

fn parse_payoff(line: u64, raw: &str) -> Result<f64, LoadError> {
    raw.parse::<f64>().map_err(|_| LoadError::InvalidPayoff {
        line,
        value: raw.to_string(),
    })
}
