//! TradeRecord: one validated, executed trade leg.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of a trade. Decides the slippage direction and PnL sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeType {
    Long,
    Short,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeType::Long => "LONG",
            TradeType::Short => "SHORT",
        }
    }
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a trade type string is neither LONG nor SHORT.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown trade type '{0}'")]
pub struct UnknownTradeType(pub String);

/// Case-insensitive, surrounding whitespace ignored.
impl FromStr for TradeType {
    type Err = UnknownTradeType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LONG" => Ok(TradeType::Long),
            "SHORT" => Ok(TradeType::Short),
            _ => Err(UnknownTradeType(s.to_string())),
        }
    }
}

/// A validated trade leg.
///
/// `strike`, `qty`, times, `exit_type` and `pnl_movement` are carried through
/// untouched for the drill-down view; only prices, direction and (in
/// per-signal mode) the precomputed `pnl` feed the math.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    // ── Identification ──
    pub trade_date: NaiveDate,
    pub strike: String,
    pub trade_type: TradeType,

    // ── Prices ──
    pub entry_price: f64,
    pub exit_price: f64,
    pub sl_price: Option<f64>,

    // ── Passthrough ──
    pub qty: Option<f64>,
    pub entry_time: Option<String>,
    pub exit_time: Option<String>,
    pub exit_type: Option<String>,
    pub pnl_movement: Option<String>,

    /// Raw realized PnL as recorded upstream (before slippage).
    pub pnl: Option<f64>,
}

impl TradeRecord {
    pub fn is_short(&self) -> bool {
        self.trade_type == TradeType::Short
    }
}
