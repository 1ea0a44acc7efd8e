//! PnL Lab Runner: ledger sources, configuration, reports.
//!
//! This crate builds on `pnllab-core` to provide:
//! - TOML configuration with mode inference per strategy
//! - Trade sources reading CSV and JSON ledgers
//! - Single-strategy runs with ledger fingerprinting
//! - Parallel batch analysis across strategies
//! - JSON / CSV / Markdown artifacts
//! - Logging setup

pub mod batch;
pub mod config;
pub mod export;
pub mod logging;
pub mod runner;
pub mod source;

pub use batch::{analyze_strategies, BatchOutcome};
pub use config::{AnalysisConfig, AnalysisSection, ConfigError, OutputSection};
pub use export::{
    export_buckets_csv, export_json, export_series_csv, format_day, format_kpi, generate_report,
    import_json, load_artifacts, save_artifacts,
};
pub use logging::{init_logging, LogConfig, LogFormat};
pub use runner::{analyze_ledger, run_analysis, run_day, AnalysisReport, RunError, SCHEMA_VERSION};
pub use source::{
    CsvLedgerSource, InMemorySource, JsonLedgerSource, SourceConfig, SourceError, SourceKind,
    TradeSource,
};
