//! Multi-symbol price fetching with range validation.

use super::provider::{DataProvider, FetchProgress};
use crate::domain::PriceSeries;
use crate::error::AnalysisError;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Trim, upper-case, and de-duplicate a symbol list, preserving first-seen order.
pub fn normalize_symbols<S: AsRef<str>>(symbols: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let symbol = symbol.as_ref().trim().to_uppercase();
        if !symbol.is_empty() && !out.contains(&symbol) {
            out.push(symbol);
        }
    }
    out
}

/// Reject an empty symbol set or a reversed range.
pub fn validate_request<S: AsRef<str>>(
    symbols: &[S],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<String>, AnalysisError> {
    if start > end {
        return Err(AnalysisError::InvalidRange(format!(
            "start {start} is after end {end}"
        )));
    }
    let symbols = normalize_symbols(symbols);
    if symbols.is_empty() {
        return Err(AnalysisError::InvalidRange("symbol set is empty".into()));
    }
    Ok(symbols)
}

/// Fetch one validated series per symbol over `[start, end]`.
///
/// Fails with `DataUnavailable` on the first symbol the provider cannot
/// serve or that has no bars inside the range. Bars outside the range are
/// dropped; duplicate dates keep the last bar delivered.
pub fn fetch_prices<S: AsRef<str>>(
    provider: &dyn DataProvider,
    symbols: &[S],
    start: NaiveDate,
    end: NaiveDate,
    progress: Option<&dyn FetchProgress>,
) -> Result<BTreeMap<String, PriceSeries>, AnalysisError> {
    let symbols = validate_request(symbols, start, end)?;
    let total = symbols.len();
    let mut out = BTreeMap::new();

    for (i, symbol) in symbols.iter().enumerate() {
        if let Some(p) = progress {
            p.on_start(symbol, i, total);
        }

        let result = fetch_one(provider, symbol, start, end);

        if let Some(p) = progress {
            let summary = result
                .as_ref()
                .map(|s| s.len())
                .map_err(|e| e.to_string());
            p.on_complete(symbol, i, total, &summary);
        }

        out.insert(symbol.clone(), result?);
    }

    Ok(out)
}

fn fetch_one(
    provider: &dyn DataProvider,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceSeries, AnalysisError> {
    let unavailable = |reason: String| AnalysisError::DataUnavailable {
        symbol: symbol.to_string(),
        reason,
    };

    if !provider.is_available() {
        return Err(unavailable(format!("provider '{}' is unavailable", provider.name())));
    }

    let fetched = provider
        .fetch(symbol, start, end)
        .map_err(|e| unavailable(e.to_string()))?;

    let raw_count = fetched.bars.len();
    let series = PriceSeries::from_unsorted(symbol, fetched.bars).slice_range(start, end);
    if series.len() < raw_count {
        tracing::debug!(
            symbol,
            dropped = raw_count - series.len(),
            "discarded duplicate or out-of-range bars"
        );
    }

    if series.is_empty() {
        return Err(unavailable(format!("no bars between {start} and {end}")));
    }

    let suspect = series.bars().iter().filter(|b| !b.is_sane()).count();
    if suspect > 0 {
        let partial = series.bars().iter().filter(|b| b.is_partial()).count();
        tracing::warn!(
            symbol,
            suspect,
            partial,
            "bars with missing or inconsistent OHLC values"
        );
    }

    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::{DataError, DataSource, FetchResult};
    use crate::domain::Bar;

    struct StaticProvider {
        available: bool,
    }

    fn bar(day: u32, close: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1,
            adj_close: close,
        }
    }

    impl DataProvider for StaticProvider {
        fn name(&self) -> &str {
            "static"
        }

        fn fetch(
            &self,
            symbol: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<FetchResult, DataError> {
            if symbol == "GONE" {
                return Err(DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                });
            }
            Ok(FetchResult {
                symbol: symbol.to_string(),
                // out of order, one duplicate, one outside January 2..5
                bars: vec![bar(4, 12.0), bar(2, 10.0), bar(3, 11.0), bar(3, 11.5), bar(9, 20.0)],
                source: DataSource::Synthetic,
            })
        }

        fn is_available(&self) -> bool {
            self.available
        }
    }

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn normalizes_symbols() {
        assert_eq!(
            normalize_symbols(&[" aapl", "MSFT", "AAPL", ""]),
            vec!["AAPL".to_string(), "MSFT".to_string()]
        );
    }

    #[test]
    fn reversed_range_is_invalid() {
        let p = StaticProvider { available: true };
        let err = fetch_prices(&p, &["SPY"], jan(5), jan(2), None).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidRange(_)));
    }

    #[test]
    fn empty_symbol_set_is_invalid() {
        let p = StaticProvider { available: true };
        let symbols: [&str; 0] = [];
        let err = fetch_prices(&p, &symbols, jan(2), jan(5), None).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidRange(_)));
    }

    #[test]
    fn sorts_dedupes_and_trims_to_range() {
        let p = StaticProvider { available: true };
        let prices = fetch_prices(&p, &["spy"], jan(2), jan(5), None).unwrap();
        let series = &prices["SPY"];
        assert_eq!(series.closes(), vec![10.0, 11.5, 12.0]);
    }

    #[test]
    fn missing_symbol_is_data_unavailable() {
        let p = StaticProvider { available: true };
        let err = fetch_prices(&p, &["SPY", "GONE"], jan(2), jan(5), None).unwrap_err();
        assert!(matches!(err, AnalysisError::DataUnavailable { ref symbol, .. } if symbol == "GONE"));
    }

    #[test]
    fn no_bars_in_range_is_data_unavailable() {
        let p = StaticProvider { available: true };
        let err = fetch_prices(&p, &["SPY"], jan(20), jan(25), None).unwrap_err();
        assert!(matches!(err, AnalysisError::DataUnavailable { .. }));
    }

    #[test]
    fn unavailable_provider_fails_fast() {
        let p = StaticProvider { available: false };
        let err = fetch_prices(&p, &["SPY"], jan(2), jan(5), None).unwrap_err();
        assert!(err.to_string().contains("unavailable"));
    }
}
