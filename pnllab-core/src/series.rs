//! Daily aggregation: per-trade PnL into an ordered series.
//!
//! Per-leg ledgers collapse to one point per trading date. Per-signal ledgers
//! keep one point per record, keyed by its 1-based position in the ledger.
//! Both are then stably sorted by date, so same-date points keep ledger order.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{AnalysisMode, TradeRecord};
use crate::error::{AnalysisError, AnalysisResult};
use crate::numeric::sum2;
use crate::pnl::NetPnlCalculator;

/// Identity of one series entry: a trading date or a trade number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PeriodKey {
    Date(NaiveDate),
    /// 1-based ledger position. Rows are date-sorted afterwards, so the
    /// numbers can appear out of order in the series.
    TradeNo(usize),
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodKey::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            PeriodKey::TradeNo(n) => write!(f, "{n}"),
        }
    }
}

/// One entry of the series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlPoint {
    pub key: PeriodKey,
    pub trade_date: NaiveDate,
    pub net_pnl: f64,
    /// Number of trade legs folded into this point.
    pub trades: usize,
}

/// Ordered net-PnL series. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlSeries {
    mode: AnalysisMode,
    points: Vec<PnlPoint>,
}

impl PnlSeries {
    /// Build the series for `trades`, computing each trade's net PnL.
    pub fn build(
        trades: &[TradeRecord],
        calculator: &NetPnlCalculator,
        mode: AnalysisMode,
    ) -> AnalysisResult<Self> {
        if trades.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let per_trade = trades
            .iter()
            .enumerate()
            .map(|(i, t)| Ok((t.trade_date, calculator.compute(t, mode, i)?.net_pnl)))
            .collect::<AnalysisResult<Vec<(NaiveDate, f64)>>>()?;

        Self::from_trade_pnls(&per_trade, mode)
    }

    /// Build from already computed `(trade_date, net_pnl)` pairs in ledger order.
    pub fn from_trade_pnls(
        pnls: &[(NaiveDate, f64)],
        mode: AnalysisMode,
    ) -> AnalysisResult<Self> {
        if pnls.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let mut points = match mode {
            AnalysisMode::PerLeg => group_by_date(pnls),
            AnalysisMode::PerSignal => pnls
                .iter()
                .enumerate()
                .map(|(i, &(date, net_pnl))| PnlPoint {
                    key: PeriodKey::TradeNo(i + 1),
                    trade_date: date,
                    net_pnl,
                    trades: 1,
                })
                .collect(),
        };

        // sort_by_key is stable: ties keep ledger order
        points.sort_by_key(|p| p.trade_date);

        tracing::debug!(
            mode = %mode,
            trades = pnls.len(),
            points = points.len(),
            "built pnl series"
        );
        Ok(Self { mode, points })
    }

    pub fn mode(&self) -> AnalysisMode {
        self.mode
    }

    pub fn points(&self) -> &[PnlPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn net_pnls(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.net_pnl).collect()
    }
}

/// Sum per date, buckets in first-seen order.
fn group_by_date(pnls: &[(NaiveDate, f64)]) -> Vec<PnlPoint> {
    let mut index: HashMap<NaiveDate, usize> = HashMap::new();
    let mut buckets: Vec<(NaiveDate, Vec<f64>)> = Vec::new();

    for &(date, net_pnl) in pnls {
        match index.get(&date) {
            Some(&i) => buckets[i].1.push(net_pnl),
            None => {
                index.insert(date, buckets.len());
                buckets.push((date, vec![net_pnl]));
            }
        }
    }

    buckets
        .into_iter()
        .map(|(date, values)| PnlPoint {
            key: PeriodKey::Date(date),
            trade_date: date,
            trades: values.len(),
            net_pnl: sum2(values),
        })
        .collect()
}
