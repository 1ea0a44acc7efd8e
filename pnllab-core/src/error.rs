//! Error types for the analysis pipeline.
//!
//! Every failure is detected before the sequential pass and surfaced as its own
//! variant. Nothing is coerced to zero or skipped.

use thiserror::Error;

/// Errors raised by validation, aggregation, and KPI reduction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("no trade records to analyze")]
    EmptyInput,

    #[error("division by zero computing {metric}")]
    DivisionByZero { metric: &'static str },

    #[error("malformed record #{index}: field '{field}' {reason}")]
    MalformedRecord {
        index: usize,
        field: &'static str,
        reason: String,
    },
}

impl AnalysisError {
    pub(crate) fn malformed(index: usize, field: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            index,
            field,
            reason: reason.into(),
        }
    }

    pub fn is_empty_input(&self) -> bool {
        matches!(self, Self::EmptyInput)
    }

    pub fn is_division_by_zero(&self) -> bool {
        matches!(self, Self::DivisionByZero { .. })
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedRecord { .. })
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
