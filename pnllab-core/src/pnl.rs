//! Net PnL per trade after slippage.

use crate::domain::{AnalysisMode, TradeRecord, TradeType};
use crate::error::{AnalysisError, AnalysisResult};
use crate::numeric::round2;
use crate::slippage::SlippageModel;

/// Computes slippage-adjusted, profit-positive PnL for one trade.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetPnlCalculator {
    slippage: SlippageModel,
}

/// A trade's PnL breakdown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradePnl {
    pub adjusted_entry: f64,
    pub net_pnl: f64,
}

impl NetPnlCalculator {
    pub fn new(slippage: SlippageModel) -> Self {
        Self { slippage }
    }

    pub fn slippage(&self) -> SlippageModel {
        self.slippage
    }

    /// Net PnL of `trade` under `mode`.
    ///
    /// Per-leg recomputes from adjusted entry and exit. Per-signal patches the
    /// recorded `pnl` by the slippage delta; a missing `pnl` there is malformed.
    /// `index` only labels the error.
    pub fn compute(
        &self,
        trade: &TradeRecord,
        mode: AnalysisMode,
        index: usize,
    ) -> AnalysisResult<TradePnl> {
        let adjusted_entry = self
            .slippage
            .adjusted_entry(trade.entry_price, trade.trade_type);

        let net_pnl = match mode {
            AnalysisMode::PerSignal => {
                let pnl = trade.pnl.ok_or_else(|| {
                    AnalysisError::malformed(index, "pnl", "is required for per-signal ledgers")
                })?;
                round2(adjusted_entry - trade.entry_price + pnl)
            }
            AnalysisMode::PerLeg => match trade.trade_type {
                TradeType::Short => round2(adjusted_entry - trade.exit_price),
                TradeType::Long => round2(trade.exit_price - adjusted_entry),
            },
        };

        Ok(TradePnl {
            adjusted_entry,
            net_pnl,
        })
    }
}
