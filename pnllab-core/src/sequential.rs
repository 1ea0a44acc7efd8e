//! Sequential metrics: cumulative PnL, running drawdown, win/loss streaks.
//!
//! One causal left-to-right pass: each row depends only on its own net PnL and
//! the previous row. The first row behaves as if preceded by an all-zero row,
//! which gives exactly the seeding rules (win = 1 or loss = 1, drawdown =
//! min(net, 0), cum = net).
//!
//! Drawdown here is not peak-to-trough. It accumulates losses and snaps back
//! to zero as soon as a gain more than covers what has accumulated.

use serde::{Deserialize, Serialize};

use crate::numeric::round2;

/// Sequential values for one series entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SequentialRow {
    pub cum_pnl: f64,
    pub drawdown: f64,
    pub win_streak: usize,
    pub loss_streak: usize,
}

/// Running state of the pass. Feed net PnL values in series order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialState {
    prev: SequentialRow,
}

impl SequentialState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one period.
    pub fn step(&mut self, net_pnl: f64) -> SequentialRow {
        let prev = self.prev;

        let (win_streak, loss_streak) = if net_pnl > 0.0 {
            (prev.win_streak + 1, 0)
        } else {
            (0, prev.loss_streak + 1)
        };

        let carried = net_pnl + prev.drawdown;
        let drawdown = if carried > 0.0 { 0.0 } else { round2(carried) };

        let row = SequentialRow {
            cum_pnl: round2(prev.cum_pnl + net_pnl),
            drawdown,
            win_streak,
            loss_streak,
        };
        self.prev = row;
        row
    }
}

/// Column-oriented output of the pass, aligned with the series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SequentialMetrics {
    pub cum_pnl: Vec<f64>,
    pub drawdown: Vec<f64>,
    pub win_streak: Vec<usize>,
    pub loss_streak: Vec<usize>,
}

impl SequentialMetrics {
    pub fn compute(net_pnls: &[f64]) -> Self {
        let n = net_pnls.len();
        let mut out = Self {
            cum_pnl: Vec::with_capacity(n),
            drawdown: Vec::with_capacity(n),
            win_streak: Vec::with_capacity(n),
            loss_streak: Vec::with_capacity(n),
        };

        let mut state = SequentialState::new();
        for &net in net_pnls {
            let row = state.step(net);
            out.cum_pnl.push(row.cum_pnl);
            out.drawdown.push(row.drawdown);
            out.win_streak.push(row.win_streak);
            out.loss_streak.push(row.loss_streak);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.cum_pnl.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cum_pnl.is_empty()
    }

    pub fn row(&self, i: usize) -> Option<SequentialRow> {
        Some(SequentialRow {
            cum_pnl: *self.cum_pnl.get(i)?,
            drawdown: *self.drawdown.get(i)?,
            win_streak: *self.win_streak.get(i)?,
            loss_streak: *self.loss_streak.get(i)?,
        })
    }

    /// Most negative drawdown.
    pub fn max_drawdown(&self) -> Option<f64> {
        self.drawdown.iter().copied().reduce(f64::min)
    }

    pub fn max_win_streak(&self) -> Option<usize> {
        self.win_streak.iter().copied().max()
    }

    pub fn max_loss_streak(&self) -> Option<usize> {
        self.loss_streak.iter().copied().max()
    }

    /// Final cumulative PnL.
    pub fn net_profit(&self) -> Option<f64> {
        self.cum_pnl.last().copied()
    }
}
