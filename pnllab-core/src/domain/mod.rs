//! Domain types: trade records, record shapes, raw ledger rows.

pub mod mode;
pub mod raw;
pub mod trade;

pub use mode::{strategy_key, AnalysisMode, DEFAULT_PER_SIGNAL_STRATEGIES};
pub use raw::{validate_records, RawField, RawTradeRecord, TradeTypePolicy, TRADE_DATE_FORMAT};
pub use trade::{TradeRecord, TradeType, UnknownTradeType};
