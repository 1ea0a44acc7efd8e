//! Analysis mode: which record shape a ledger has.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategies whose ledgers hold one pre-aggregated record per signal.
pub const DEFAULT_PER_SIGNAL_STRATEGIES: &[&str] = &["macd"];

/// The record shape of a ledger. Fixed for a data set.
///
/// - `PerLeg`: many legs per date, PnL recomputed from entry/exit and summed per date.
/// - `PerSignal`: one sample per record, PnL patched from the recorded `pnl`,
///   series keyed by 1-based trade number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    #[default]
    PerLeg,
    PerSignal,
}

impl AnalysisMode {
    /// Pick the mode for a strategy identifier.
    ///
    /// The identifier is normalized with [`strategy_key`] before matching.
    pub fn for_strategy<S: AsRef<str>>(strategy: &str, per_signal: &[S]) -> Self {
        let key = strategy_key(strategy);
        if per_signal
            .iter()
            .any(|s| strategy_key(s.as_ref()) == key)
        {
            AnalysisMode::PerSignal
        } else {
            AnalysisMode::PerLeg
        }
    }

    /// Calendar roll-ups only make sense when each entry is a trading day.
    pub fn has_calendar(&self) -> bool {
        matches!(self, AnalysisMode::PerLeg)
    }

    /// Label of the series key column.
    pub fn key_label(&self) -> &'static str {
        match self {
            AnalysisMode::PerLeg => "trade_date",
            AnalysisMode::PerSignal => "trade_no",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::PerLeg => "per_leg",
            AnalysisMode::PerSignal => "per_signal",
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize a strategy display name to its key.
///
/// `"STS (SuperTrend Strategy)"` → `"sts"`.
pub fn strategy_key(name: &str) -> String {
    name.split_whitespace()
        .next()
        .unwrap_or("")
        .to_lowercase()
}
