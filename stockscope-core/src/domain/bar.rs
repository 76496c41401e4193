//! Daily quote for one symbol.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day of prices and volume.
///
/// A provider that reports the date but not every price leaves the missing
/// fields as `f64::NAN`. Such a day still exists in the series; consumers
/// decide with `has_close` whether it carries a usable price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub adj_close: f64,
}

impl Bar {
    /// The close is defined, so the day can take part in returns,
    /// alignment and indicators.
    pub fn has_close(&self) -> bool {
        !self.close.is_nan()
    }

    /// Some, but not all, of the price fields are missing.
    pub fn is_partial(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close, self.adj_close];
        let missing = prices.iter().filter(|v| v.is_nan()).count();
        missing > 0 && missing < prices.len()
    }

    /// Every price is present and positive, and open and close lie within
    /// the day's low..high range.
    pub fn is_sane(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close, self.adj_close];
        if prices.iter().any(|v| v.is_nan() || *v <= 0.0) {
            return false;
        }
        let range = self.low..=self.high;
        range.contains(&self.open) && range.contains(&self.close)
    }
}
