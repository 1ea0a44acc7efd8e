//! Trade sources: where ledgers come from.
//!
//! A strategy's ledger is a collection named `{collection_prefix}{key}`, where
//! `key` is the lowercased first word of the strategy name. File-backed
//! sources resolve the collection to `{path}/{collection}.{ext}`.
//!
//! Rows are returned unvalidated so the core can report malformed records
//! with their position.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pnllab_core::domain::strategy_key;
use pnllab_core::RawTradeRecord;

/// Default collection prefix for strategy ledgers.
pub const DEFAULT_COLLECTION_PREFIX: &str = "systematic-strategy-";

/// Errors from reading a ledger.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no ledger for strategy '{strategy}' (looked for {})", .path.display())]
    NotFound { strategy: String, path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid CSV in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid JSON in {} (line {line}): {source}", .path.display())]
    Json {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// File format of the ledgers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Csv,
    Json,
}

/// Where to find ledgers. Handed explicitly to the source constructor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// Directory holding one file per collection.
    pub path: PathBuf,
    pub collection_prefix: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Csv,
            path: PathBuf::from("data/ledgers"),
            collection_prefix: DEFAULT_COLLECTION_PREFIX.to_string(),
        }
    }
}

impl SourceConfig {
    /// Collection name for a strategy: `"STS (SuperTrend)"` → `"systematic-strategy-sts"`.
    pub fn collection_name(&self, strategy: &str) -> String {
        format!("{}{}", self.collection_prefix, strategy_key(strategy))
    }

    /// Build the source this config describes.
    pub fn build(&self) -> Box<dyn TradeSource> {
        match self.kind {
            SourceKind::Csv => Box::new(CsvLedgerSource::new(self.clone())),
            SourceKind::Json => Box::new(JsonLedgerSource::new(self.clone())),
        }
    }
}

/// A read-only store of strategy ledgers.
///
/// Implementations must be shareable across threads; batch analysis reads
/// several strategies at once.
pub trait TradeSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Every row of the strategy's ledger, in stored order.
    fn fetch_all(&self, strategy: &str) -> Result<Vec<RawTradeRecord>, SourceError>;

    /// Rows whose `trade_date` equals `date`.
    fn fetch_date(
        &self,
        strategy: &str,
        date: NaiveDate,
    ) -> Result<Vec<RawTradeRecord>, SourceError> {
        Ok(self
            .fetch_all(strategy)?
            .into_iter()
            .filter(|r| r.parsed_date() == Some(date))
            .collect())
    }
}

// ─── CSV ────────────────────────────────────────────────────────────

/// Reads `{path}/{collection}.csv` with a header row.
///
/// Columns are matched by name; unknown columns are ignored and empty cells
/// are treated as absent.
#[derive(Debug, Clone)]
pub struct CsvLedgerSource {
    config: SourceConfig,
}

impl CsvLedgerSource {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    pub fn ledger_path(&self, strategy: &str) -> PathBuf {
        self.config
            .path
            .join(format!("{}.csv", self.config.collection_name(strategy)))
    }
}

impl TradeSource for CsvLedgerSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch_all(&self, strategy: &str) -> Result<Vec<RawTradeRecord>, SourceError> {
        let path = self.ledger_path(strategy);
        if !path.exists() {
            return Err(SourceError::NotFound {
                strategy: strategy.to_string(),
                path,
            });
        }
        let records = read_csv(&path)?;
        tracing::debug!(path = %path.display(), rows = records.len(), "loaded CSV ledger");
        Ok(records)
    }
}

fn read_csv(path: &Path) -> Result<Vec<RawTradeRecord>, SourceError> {
    let csv_err = |source| SourceError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;
    rdr.deserialize::<RawTradeRecord>().map(|row| row.map_err(csv_err)).collect()
}

// ─── JSON ───────────────────────────────────────────────────────────

/// Reads `{path}/{collection}.json` (a JSON array of objects) or, failing
/// that, `{path}/{collection}.jsonl` (one object per line).
#[derive(Debug, Clone)]
pub struct JsonLedgerSource {
    config: SourceConfig,
}

impl JsonLedgerSource {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    /// The first existing candidate path, or the `.json` path if none exists.
    pub fn ledger_path(&self, strategy: &str) -> PathBuf {
        let name = self.config.collection_name(strategy);
        let json = self.config.path.join(format!("{name}.json"));
        let jsonl = self.config.path.join(format!("{name}.jsonl"));
        if !json.exists() && jsonl.exists() {
            jsonl
        } else {
            json
        }
    }
}

impl TradeSource for JsonLedgerSource {
    fn name(&self) -> &str {
        "json"
    }

    fn fetch_all(&self, strategy: &str) -> Result<Vec<RawTradeRecord>, SourceError> {
        let path = self.ledger_path(strategy);
        if !path.exists() {
            return Err(SourceError::NotFound {
                strategy: strategy.to_string(),
                path,
            });
        }
        let records = if path.extension().is_some_and(|e| e == "jsonl") {
            read_json_lines(&path)?
        } else {
            read_json_array(&path)?
        };
        tracing::debug!(path = %path.display(), rows = records.len(), "loaded JSON ledger");
        Ok(records)
    }
}

fn read_json_array(path: &Path) -> Result<Vec<RawTradeRecord>, SourceError> {
    let content = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| SourceError::Json {
        path: path.to_path_buf(),
        line: source.line(),
        source,
    })
}

fn read_json_lines(path: &Path) -> Result<Vec<RawTradeRecord>, SourceError> {
    let io_err = |source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = std::fs::File::open(path).map_err(io_err)?;
    let mut records = Vec::new();
    for (i, line) in std::io::BufReader::new(file).lines().enumerate() {
        let line = line.map_err(io_err)?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| SourceError::Json {
            path: path.to_path_buf(),
            line: i + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

// ─── In-memory ──────────────────────────────────────────────────────

/// Ledgers held in memory, keyed by strategy key. Handy for tests and for
/// callers that already have the rows.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    ledgers: HashMap<String, Vec<RawTradeRecord>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ledger(mut self, strategy: &str, records: Vec<RawTradeRecord>) -> Self {
        self.ledgers.insert(strategy_key(strategy), records);
        self
    }
}

impl TradeSource for InMemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch_all(&self, strategy: &str) -> Result<Vec<RawTradeRecord>, SourceError> {
        let key = strategy_key(strategy);
        self.ledgers
            .get(&key)
            .cloned()
            .ok_or_else(|| SourceError::NotFound {
                strategy: strategy.to_string(),
                path: PathBuf::from(key),
            })
    }
}
