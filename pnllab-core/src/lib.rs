//! PnL Lab Core: trade-statistics engine.
//!
//! Turns a ledger of executed option trades into:
//! - a slippage-adjusted net PnL series (per trading day, or per signal)
//! - cumulative PnL, running drawdown and win/loss streaks (one causal pass)
//! - monthly and weekday roll-ups
//! - a fixed set of KPIs
//!
//! Everything here is a pure, synchronous transformation. Loading ledgers,
//! rendering and persistence live in `pnllab-runner`.

pub mod analysis;
pub mod calendar;
pub mod domain;
pub mod drill_down;
pub mod error;
pub mod fingerprint;
pub mod kpi;
pub mod numeric;
pub mod pnl;
pub mod sequential;
pub mod series;
pub mod slippage;

pub use analysis::{analyze, Analysis, Analyzer, SeriesRow};
pub use calendar::{CalendarBreakdown, CalendarBucket, PnlTag};
pub use domain::{
    AnalysisMode, RawField, RawTradeRecord, TradeRecord, TradeType, TradeTypePolicy,
};
pub use drill_down::{day_detail, DayDetail, DayStatus, TradeDetailRow};
pub use error::{AnalysisError, AnalysisResult};
pub use kpi::KpiSummary;
pub use pnl::{NetPnlCalculator, TradePnl};
pub use sequential::{SequentialMetrics, SequentialRow, SequentialState};
pub use series::{PeriodKey, PnlPoint, PnlSeries};
pub use slippage::SlippageModel;
