//! KPI summary: scalar statistics over the series.
//!
//! Each metric is a pure function over the net PnL column (or the sequential
//! columns). Values are rounded to 2 decimals as they are finalized, and the
//! expectancy is built from the already rounded averages.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};
use crate::numeric::round2;
use crate::sequential::SequentialMetrics;
use crate::series::PnlSeries;

/// Headline statistics for one strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub total_periods: usize,
    pub winning_periods: usize,
    pub losing_periods: usize,
    /// Percent, 0–100.
    pub win_ratio: f64,
    pub max_profit: f64,
    pub max_loss: f64,
    pub max_drawdown: f64,
    pub max_winning_streak: usize,
    pub max_losing_streak: usize,
    pub avg_profit_on_win_days: f64,
    pub avg_loss_on_loss_days: f64,
    pub avg_profit_per_day: f64,
    pub expectancy: f64,
    pub net_profit: f64,
}

impl KpiSummary {
    /// Reduce a series and its sequential metrics.
    ///
    /// Fails with `EmptyInput` on an empty series and with `DivisionByZero`
    /// when either average has no days to average over.
    pub fn compute(series: &PnlSeries, seq: &SequentialMetrics) -> AnalysisResult<Self> {
        let net = series.net_pnls();
        if net.is_empty() || seq.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let win_ratio = win_ratio(&net)?;
        let avg_win = avg_profit_on_win_days(&net)?;
        let avg_loss = avg_loss_on_loss_days(&net)?;

        Ok(Self {
            total_periods: net.len(),
            winning_periods: winning_periods(&net),
            losing_periods: losing_periods(&net),
            win_ratio,
            max_profit: round2(net.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
            max_loss: round2(net.iter().copied().fold(f64::INFINITY, f64::min)),
            max_drawdown: round2(seq.max_drawdown().ok_or(AnalysisError::EmptyInput)?),
            max_winning_streak: seq.max_win_streak().unwrap_or(0),
            max_losing_streak: seq.max_loss_streak().unwrap_or(0),
            avg_profit_on_win_days: avg_win,
            avg_loss_on_loss_days: avg_loss,
            avg_profit_per_day: avg_profit_per_day(&net)?,
            expectancy: expectancy(avg_win, avg_loss, win_ratio),
            net_profit: round2(seq.net_profit().ok_or(AnalysisError::EmptyInput)?),
        })
    }

    /// `(label, value)` pairs in dashboard order.
    pub fn labeled(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("Total days", self.total_periods as f64),
            ("Winning days", self.winning_periods as f64),
            ("Losing days", self.losing_periods as f64),
            ("Max Profit", self.max_profit),
            ("Max Loss", self.max_loss),
            ("Max Winning Streak", self.max_winning_streak as f64),
            ("Max Losing Streak", self.max_losing_streak as f64),
            ("Max Drawdown", self.max_drawdown),
            ("Average Profit on win days", self.avg_profit_on_win_days),
            ("Average Loss on loss days", self.avg_loss_on_loss_days),
            ("System Expectancy", self.expectancy),
        ]
    }
}

// ─── Individual metric functions ────────────────────────────────────

pub fn winning_periods(net: &[f64]) -> usize {
    net.iter().filter(|&&v| v > 0.0).count()
}

/// Zero-PnL periods are neither winning nor losing.
pub fn losing_periods(net: &[f64]) -> usize {
    net.iter().filter(|&&v| v < 0.0).count()
}

/// Winning periods over all periods, as a percentage.
pub fn win_ratio(net: &[f64]) -> AnalysisResult<f64> {
    if net.is_empty() {
        return Err(AnalysisError::DivisionByZero {
            metric: "win_ratio",
        });
    }
    Ok(round2(winning_periods(net) as f64 / net.len() as f64 * 100.0))
}

/// Sum of gains divided by the count of non-losing periods (net ≥ 0).
///
/// The denominator includes flat periods while the numerator does not.
pub fn avg_profit_on_win_days(net: &[f64]) -> AnalysisResult<f64> {
    let non_losing = net.iter().filter(|&&v| v >= 0.0).count();
    if non_losing == 0 {
        return Err(AnalysisError::DivisionByZero {
            metric: "avg_profit_on_win_days",
        });
    }
    let gains: f64 = net.iter().filter(|&&v| v > 0.0).sum();
    Ok(round2(gains / non_losing as f64))
}

pub fn avg_loss_on_loss_days(net: &[f64]) -> AnalysisResult<f64> {
    let losing = losing_periods(net);
    if losing == 0 {
        return Err(AnalysisError::DivisionByZero {
            metric: "avg_loss_on_loss_days",
        });
    }
    let losses: f64 = net.iter().filter(|&&v| v < 0.0).sum();
    Ok(round2(losses / losing as f64))
}

pub fn avg_profit_per_day(net: &[f64]) -> AnalysisResult<f64> {
    if net.is_empty() {
        return Err(AnalysisError::DivisionByZero {
            metric: "avg_profit_per_day",
        });
    }
    Ok(round2(net.iter().sum::<f64>() / net.len() as f64))
}

/// Expected PnL per period, weighting the averages by the win ratio (percent).
pub fn expectancy(avg_win: f64, avg_loss: f64, win_ratio: f64) -> f64 {
    round2((avg_win * win_ratio + avg_loss * (100.0 - win_ratio)) * 0.01)
}
