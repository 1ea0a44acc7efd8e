//! Single-day drill-down: every leg traded on one date, with its net PnL.
//!
//! Each row is its own `Result`. A row that fails validation does not hide the
//! others; the caller decides whether to skip it or show a placeholder.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{AnalysisMode, RawTradeRecord, TradeType, TradeTypePolicy};
use crate::error::AnalysisResult;
use crate::numeric::sum2;
use crate::pnl::NetPnlCalculator;

/// Detail of one trade leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeDetailRow {
    /// Position of the record in the full ledger.
    pub index: usize,
    pub strike: String,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_time: Option<String>,
    pub exit_time: Option<String>,
    pub sl_price: Option<f64>,
    pub exit_type: Option<String>,
    pub trade_type: TradeType,
    pub entry_price_with_slippage: f64,
    pub net_pnl: f64,
    /// Chart reference; omitted when the ledger has none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pnl_movement: Option<String>,
}

/// Whether the day closed in profit. Break-even counts as profit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    Profit,
    Loss,
}

/// All legs of one trading date.
#[derive(Debug, Clone, PartialEq)]
pub struct DayDetail {
    pub date: NaiveDate,
    pub rows: Vec<AnalysisResult<TradeDetailRow>>,
}

impl DayDetail {
    /// No ledger rows on this date.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn valid_rows(&self) -> impl Iterator<Item = &TradeDetailRow> {
        self.rows.iter().filter_map(|r| r.as_ref().ok())
    }

    pub fn failed_rows(&self) -> usize {
        self.rows.iter().filter(|r| r.is_err()).count()
    }

    /// Day total over valid rows; `None` when there are none.
    pub fn net_pnl(&self) -> Option<f64> {
        let values: Vec<f64> = self.valid_rows().map(|r| r.net_pnl).collect();
        if values.is_empty() {
            None
        } else {
            Some(sum2(values))
        }
    }

    pub fn status(&self) -> Option<DayStatus> {
        self.net_pnl().map(|v| {
            if v >= 0.0 {
                DayStatus::Profit
            } else {
                DayStatus::Loss
            }
        })
    }
}

/// Collect the legs traded on `date`.
///
/// Records whose date cannot be parsed can't belong to any day and are not
/// selected; the full analysis reports them instead.
pub fn day_detail(
    raw: &[RawTradeRecord],
    date: NaiveDate,
    mode: AnalysisMode,
    calculator: &NetPnlCalculator,
    policy: TradeTypePolicy,
) -> DayDetail {
    let rows = raw
        .iter()
        .enumerate()
        .filter(|(_, r)| r.parsed_date() == Some(date))
        .map(|(index, r)| {
            let row = detail_row(r, index, mode, calculator, policy);
            if let Err(e) = &row {
                tracing::warn!(%date, index, error = %e, "drill-down row failed validation");
            }
            row
        })
        .collect();

    DayDetail { date, rows }
}

fn detail_row(
    raw: &RawTradeRecord,
    index: usize,
    mode: AnalysisMode,
    calculator: &NetPnlCalculator,
    policy: TradeTypePolicy,
) -> AnalysisResult<TradeDetailRow> {
    let trade = raw.validate(index, mode, policy)?;
    let pnl = calculator.compute(&trade, mode, index)?;
    Ok(TradeDetailRow {
        index,
        strike: trade.strike,
        entry_price: trade.entry_price,
        exit_price: trade.exit_price,
        entry_time: trade.entry_time,
        exit_time: trade.exit_time,
        sl_price: trade.sl_price,
        exit_type: trade.exit_type,
        trade_type: trade.trade_type,
        entry_price_with_slippage: pnl.adjusted_entry,
        net_pnl: pnl.net_pnl,
        pnl_movement: trade.pnl_movement,
    })
}
