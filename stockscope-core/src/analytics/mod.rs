//! Statistics over aligned price tables: returns, correlation, distributions.
//!
//! Pure functions, table in and table out. Nothing here fetches data or
//! touches the filesystem.

pub mod correlation;
pub mod distribution;
pub mod returns;

pub use correlation::{compute_correlation, CorrelationMatrix};
pub use distribution::{describe_returns, Histogram, ReturnDistribution};
pub use returns::compute_returns;

/// Arithmetic mean. NaN for an empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1). NaN below two values.
pub(crate) fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
