use crate::data::loader::load_csv;
use crate::data::price::{PriceRecord, PriceRecordError};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

//failures while retrieving raw price history from a provider
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),
    #[error("Provider rejected the access credential (status {status})")]
    InvalidCredential { status: u16 },
    #[error("Provider returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Failed to parse provider response: {0}")]
    Parse(String),
    #[error(transparent)]
    Record(#[from] PriceRecordError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

//anything that can return the full daily price history of a security
//records may come back in ascending or descending date order
pub trait MarketDataSource: Send + Sync {
    fn fetch_history(&self, symbol: &str) -> Result<Vec<PriceRecord>, SourceError>;

    //returns the source name
    fn name(&self) -> &str;
}

//fixed in-memory data, keyed by upper-case ticker
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    histories: HashMap<String, Vec<PriceRecord>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(mut self, symbol: &str, records: Vec<PriceRecord>) -> Self {
        self.insert(symbol, records);
        self
    }

    pub fn insert(&mut self, symbol: &str, records: Vec<PriceRecord>) {
        self.histories.insert(symbol.to_uppercase(), records);
    }
}

impl MarketDataSource for InMemorySource {
    fn fetch_history(&self, symbol: &str) -> Result<Vec<PriceRecord>, SourceError> {
        self.histories
            .get(&symbol.to_uppercase())
            .cloned()
            .ok_or_else(|| SourceError::UnknownSymbol(symbol.to_string()))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

//reads <dir>/<TICKER>.csv for each requested symbol
#[derive(Debug, Clone)]
pub struct CsvDirectorySource {
    dir: PathBuf,
}

impl CsvDirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        CsvDirectorySource { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", symbol.to_uppercase()))
    }
}

impl MarketDataSource for CsvDirectorySource {
    fn fetch_history(&self, symbol: &str) -> Result<Vec<PriceRecord>, SourceError> {
        let path = self.path_for(symbol);
        if !path.is_file() {
            return Err(SourceError::UnknownSymbol(symbol.to_string()));
        }
        tracing::debug!(symbol, path = %path.display(), "reading price history from csv");
        load_csv(&path)
    }

    fn name(&self) -> &str {
        "csv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn in_memory_lookup_ignores_case() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let record = PriceRecord::new_unchecked(date, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0);
        let source = InMemorySource::new().with_history("aapl", vec![record]);

        assert_eq!(source.fetch_history("AAPL").unwrap().len(), 1);
        assert!(matches!(
            source.fetch_history("MSFT"),
            Err(SourceError::UnknownSymbol(s)) if s == "MSFT"
        ));
    }

    #[test]
    fn csv_directory_reports_missing_file_as_unknown_symbol() {
        let dir = tempfile::tempdir().unwrap();
        let source = CsvDirectorySource::new(dir.path());
        assert!(matches!(
            source.fetch_history("zzz"),
            Err(SourceError::UnknownSymbol(_))
        ));
        assert!(source.path_for("spy").ends_with("SPY.csv"));
    }
}
