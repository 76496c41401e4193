//! Technical indicators over close-price series.
//!
//! Every indicator maps a close series to an output series of the same
//! length. Warm-up positions and positions whose inputs are undefined hold
//! `f64::NAN`; the engine trims them when assembling an `IndicatorTable`.
//!
//! MACD has three outputs and is exposed as separate named instances per
//! line, keeping the single-series `Indicator` trait unchanged.

pub mod ema;
pub mod engine;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use ema::{ema_of_series, Ema};
pub use engine::{compute_indicators, IndicatorConfig, IndicatorTable, MacdConfig};
pub use macd::{macd_components, Macd, MacdLine, MacdSeries};
pub use rsi::Rsi;
pub use sma::Sma;

/// A single-output indicator.
///
/// # Look-ahead guard
/// No output at index t may depend on input after index t. Truncating the
/// input must leave the overlapping prefix of the output unchanged.
pub trait Indicator: Send + Sync {
    /// Column name (e.g. "MA_20", "RSI").
    fn name(&self) -> &str;

    /// Number of leading positions that are always undefined.
    fn lookback(&self) -> usize;

    /// Compute the indicator over the whole close series.
    fn compute(&self, closes: &[f64]) -> Vec<f64>;
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
