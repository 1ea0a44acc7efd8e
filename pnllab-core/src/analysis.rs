//! The analysis boundary: records in, series + calendar + KPIs out.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::CalendarBreakdown;
use crate::domain::{
    validate_records, AnalysisMode, RawTradeRecord, TradeRecord, TradeTypePolicy,
};
use crate::error::{AnalysisError, AnalysisResult};
use crate::kpi::KpiSummary;
use crate::pnl::NetPnlCalculator;
use crate::sequential::SequentialMetrics;
use crate::series::{PeriodKey, PnlSeries};
use crate::slippage::SlippageModel;

/// One row of the analysed series with every derived column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRow {
    pub key: PeriodKey,
    pub trade_date: NaiveDate,
    pub trades: usize,
    pub net_pnl: f64,
    pub cum_pnl: f64,
    pub drawdown: f64,
    pub win_streak: usize,
    pub loss_streak: usize,
}

/// Full output of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub mode: AnalysisMode,
    pub rows: Vec<SeriesRow>,
    /// Absent for per-signal ledgers.
    pub calendar: Option<CalendarBreakdown>,
    pub kpis: KpiSummary,
}

impl Analysis {
    pub fn net_pnls(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.net_pnl).collect()
    }
}

/// Runs the pipeline with a fixed slippage model and trade-type policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Analyzer {
    calculator: NetPnlCalculator,
    policy: TradeTypePolicy,
}

impl Analyzer {
    pub fn new(slippage: SlippageModel, policy: TradeTypePolicy) -> Self {
        Self {
            calculator: NetPnlCalculator::new(slippage),
            policy,
        }
    }

    pub fn calculator(&self) -> &NetPnlCalculator {
        &self.calculator
    }

    pub fn policy(&self) -> TradeTypePolicy {
        self.policy
    }

    /// Analyse validated records.
    pub fn analyze(
        &self,
        records: &[TradeRecord],
        mode: AnalysisMode,
    ) -> AnalysisResult<Analysis> {
        if records.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let series = PnlSeries::build(records, &self.calculator, mode)?;
        let seq = SequentialMetrics::compute(&series.net_pnls());
        let kpis = KpiSummary::compute(&series, &seq)?;
        let calendar = CalendarBreakdown::compute(&series);

        let rows = series
            .points()
            .iter()
            .enumerate()
            .map(|(i, p)| SeriesRow {
                key: p.key,
                trade_date: p.trade_date,
                trades: p.trades,
                net_pnl: p.net_pnl,
                cum_pnl: seq.cum_pnl[i],
                drawdown: seq.drawdown[i],
                win_streak: seq.win_streak[i],
                loss_streak: seq.loss_streak[i],
            })
            .collect();

        tracing::debug!(
            mode = %mode,
            records = records.len(),
            periods = kpis.total_periods,
            net_profit = kpis.net_profit,
            "analysis complete"
        );

        Ok(Analysis {
            mode,
            rows,
            calendar,
            kpis,
        })
    }

    /// Validate raw ledger rows, then analyse.
    ///
    /// An empty ledger is `EmptyInput`, not a validation error.
    pub fn analyze_raw(
        &self,
        raw: &[RawTradeRecord],
        mode: AnalysisMode,
    ) -> AnalysisResult<Analysis> {
        if raw.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }
        let records = validate_records(raw, mode, self.policy)?;
        self.analyze(&records, mode)
    }
}

/// Analyse with the default 2% slippage.
pub fn analyze(records: &[TradeRecord], mode: AnalysisMode) -> AnalysisResult<Analysis> {
    Analyzer::default().analyze(records, mode)
}
