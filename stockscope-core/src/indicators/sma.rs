//! Simple Moving Average (SMA).
//!
//! Rolling mean of closes over a trailing window.
//! Lookback: period - 1 (first valid value at index period-1).

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("MA_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, closes: &[f64]) -> Vec<f64> {
        let n = closes.len();
        let period = self.period;
        let mut result = vec![f64::NAN; n];

        if n < period {
            return result;
        }

        // Running sum plus a count of NaNs inside the window; a NaN poisons
        // the sum, so the sum is rebuilt once the window is clean again.
        let mut nan_count = closes[..period].iter().filter(|v| v.is_nan()).count();
        let mut sum: f64 = closes[..period].iter().sum();
        if nan_count == 0 {
            result[period - 1] = sum / period as f64;
        }

        for i in period..n {
            let leaving = closes[i - period];
            let entering = closes[i];
            if leaving.is_nan() {
                nan_count -= 1;
            }
            if entering.is_nan() {
                nan_count += 1;
            }

            if nan_count > 0 {
                continue;
            }

            sum = if leaving.is_nan() || sum.is_nan() {
                closes[(i + 1 - period)..=i].iter().sum()
            } else {
                sum - leaving + entering
            };
            result[i] = sum / period as f64;
        }

        result
    }
}
