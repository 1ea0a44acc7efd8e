//! Batch analysis: several strategies at once.
//!
//! Strategies share nothing, so each runs on its own rayon task. One
//! strategy failing does not abort the others.

use rayon::prelude::*;

use crate::config::AnalysisConfig;
use crate::runner::{run_analysis, AnalysisReport, RunError};
use crate::source::TradeSource;

/// Result for one strategy of a batch.
#[derive(Debug)]
pub struct BatchOutcome {
    pub strategy: String,
    pub result: Result<AnalysisReport, RunError>,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Analyse every strategy in `strategies` with otherwise identical settings.
///
/// Outcomes come back in input order.
pub fn analyze_strategies(
    config: &AnalysisConfig,
    source: &dyn TradeSource,
    strategies: &[String],
) -> Vec<BatchOutcome> {
    let outcomes: Vec<BatchOutcome> = strategies
        .par_iter()
        .map(|strategy| {
            let result = run_analysis(&config.for_strategy(strategy), source);
            if let Err(e) = &result {
                tracing::warn!(strategy = %strategy, error = %e, "strategy failed");
            }
            BatchOutcome {
                strategy: strategy.clone(),
                result,
            }
        })
        .collect();

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    tracing::info!(
        strategies = outcomes.len(),
        failed,
        "batch complete"
    );
    outcomes
}
