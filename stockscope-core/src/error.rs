//! Typed failures reported by the analysis core.
//!
//! Every failure is explicit. A zero-filled indicator is indistinguishable
//! from a genuine zero, so nothing in the core coerces an error into empty
//! or zero output.

use thiserror::Error;

/// Errors produced by price fetching, alignment, and the analysis engines.
///
/// `Clone` so that a single failure can be handed to every caller waiting
/// on the same cache slot.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("invalid range: {0}")]
    InvalidRange(String),

    #[error("data unavailable for '{symbol}': {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("insufficient data for {context}: need {required} rows, have {available}")]
    InsufficientData {
        context: String,
        required: usize,
        available: usize,
    },

    #[error("alignment failure: {0}")]
    AlignmentFailure(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid price series for '{symbol}': {reason}")]
    InvalidSeries { symbol: String, reason: String },

    #[error("returns for '{symbol}' have zero variance; correlation is undefined")]
    DegenerateSeries { symbol: String },
}

impl AnalysisError {
    pub(crate) fn insufficient(context: impl Into<String>, required: usize, available: usize) -> Self {
        Self::InsufficientData {
            context: context.into(),
            required,
            available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_message_names_counts() {
        let err = AnalysisError::insufficient("RSI(14)", 14, 3);
        assert_eq!(
            err.to_string(),
            "insufficient data for RSI(14): need 14 rows, have 3"
        );
    }

    #[test]
    fn errors_are_cloneable_and_comparable() {
        let err = AnalysisError::DataUnavailable {
            symbol: "AAPL".into(),
            reason: "symbol not found".into(),
        };
        assert_eq!(err.clone(), err);
    }
}
