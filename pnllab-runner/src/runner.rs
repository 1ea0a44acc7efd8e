//! Analysis runner: wires a trade source, validation and the core pipeline.
//!
//! Two entry points:
//! - `run_analysis()`: fetches the ledger from a source, then analyses. Used by the CLI.
//! - `analyze_ledger()`: takes already fetched rows. No I/O.
//!
//! `run_day()` serves the single-day drill-down.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pnllab_core::domain::validate_records;
use pnllab_core::fingerprint::ledger_hash;
use pnllab_core::{day_detail, Analysis, AnalysisError, AnalysisMode, DayDetail, RawTradeRecord};

use crate::config::{AnalysisConfig, ConfigError};
use crate::source::{SourceError, TradeSource};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("source error: {0}")]
    Source(#[from] SourceError),
    #[error("analysis of '{strategy}' failed: {source}")]
    Analysis {
        strategy: String,
        #[source]
        source: AnalysisError,
    },
    #[error("failed to fingerprint ledger: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

impl RunError {
    /// The core error, if the failure was in the analysis itself.
    pub fn analysis_error(&self) -> Option<&AnalysisError> {
        match self {
            RunError::Analysis { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of analysing one strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub strategy: String,
    pub collection: String,
    pub mode: AnalysisMode,
    pub slippage_pct: f64,
    /// BLAKE3 over the validated records.
    pub ledger_hash: String,
    pub record_count: usize,
    /// RFC 3339 UTC timestamp.
    pub generated_at: String,
    pub analysis: Analysis,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl AnalysisReport {
    /// Filesystem-safe strategy key used for artifact directory names.
    pub fn strategy_key(&self) -> String {
        pnllab_core::domain::strategy_key(&self.strategy)
    }
}

/// Fetch the configured strategy's ledger and analyse it.
pub fn run_analysis(
    config: &AnalysisConfig,
    source: &dyn TradeSource,
) -> Result<AnalysisReport, RunError> {
    config.validate()?;
    let raw = source.fetch_all(config.strategy())?;
    tracing::debug!(
        strategy = config.strategy(),
        source = source.name(),
        rows = raw.len(),
        "fetched ledger"
    );
    analyze_ledger(config, &raw)
}

/// Analyse rows that are already in memory.
pub fn analyze_ledger(
    config: &AnalysisConfig,
    raw: &[RawTradeRecord],
) -> Result<AnalysisReport, RunError> {
    let strategy = config.strategy().to_string();
    let mode = config.mode();
    let analyzer = config.analyzer();
    let wrap = |source| RunError::Analysis {
        strategy: strategy.clone(),
        source,
    };

    if raw.is_empty() {
        return Err(wrap(AnalysisError::EmptyInput));
    }
    let records = validate_records(raw, mode, analyzer.policy()).map_err(wrap)?;
    let analysis = analyzer.analyze(&records, mode).map_err(wrap)?;
    let ledger_hash = ledger_hash(&records)?;

    tracing::info!(
        strategy = %strategy,
        mode = %mode,
        records = records.len(),
        periods = analysis.kpis.total_periods,
        net_profit = analysis.kpis.net_profit,
        "analysis complete"
    );

    Ok(AnalysisReport {
        schema_version: SCHEMA_VERSION,
        collection: config.source.collection_name(&strategy),
        strategy,
        mode,
        slippage_pct: config.analysis.slippage_pct,
        ledger_hash,
        record_count: records.len(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        analysis,
    })
}

/// Drill into one trading day of the configured strategy.
///
/// An empty [`DayDetail`] means no trades on that date.
pub fn run_day(
    config: &AnalysisConfig,
    source: &dyn TradeSource,
    date: NaiveDate,
) -> Result<DayDetail, RunError> {
    config.validate()?;
    let raw = source.fetch_all(config.strategy())?;
    let analyzer = config.analyzer();
    let detail = day_detail(
        &raw,
        date,
        config.mode(),
        analyzer.calculator(),
        analyzer.policy(),
    );
    tracing::debug!(
        strategy = config.strategy(),
        %date,
        rows = detail.rows.len(),
        failed = detail.failed_rows(),
        "day drill-down"
    );
    Ok(detail)
}
