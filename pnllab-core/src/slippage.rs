//! Slippage model: adverse fill on entry.

use serde::{Deserialize, Serialize};

use crate::domain::TradeType;
use crate::numeric::round2;

/// Default adverse entry slippage, as a fraction of price.
pub const DEFAULT_SLIPPAGE_RATE: f64 = 0.02;

/// Fixed-percentage slippage applied against the trader on entry.
///
/// A short is assumed to have sold lower, a long to have bought higher.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlippageModel {
    rate: f64,
}

impl SlippageModel {
    /// `rate` is a fraction: 0.02 = 2%.
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }

    /// Build from a percentage (2.0 = 2%).
    pub fn from_pct(pct: f64) -> Self {
        Self::new(pct / 100.0)
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Slippage-adjusted entry price, rounded to 2 decimals.
    pub fn adjusted_entry(&self, entry_price: f64, trade_type: TradeType) -> f64 {
        match trade_type {
            TradeType::Short => round2(entry_price * (1.0 - self.rate)),
            TradeType::Long => round2(entry_price * (1.0 + self.rate)),
        }
    }
}

impl Default for SlippageModel {
    fn default() -> Self {
        Self::new(DEFAULT_SLIPPAGE_RATE)
    }
}
