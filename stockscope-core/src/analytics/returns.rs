//! Period-over-period simple returns.

use crate::domain::{PriceTable, ReturnsTable};
use crate::error::AnalysisError;

/// Simple return `p[t] / p[t-1] - 1` per column.
///
/// A cell is undefined when either price is undefined or the prior price is
/// not positive. The first row has no predecessor. Every row with an
/// undefined cell is dropped, so a table of N fully-defined rows yields N-1.
pub fn compute_returns(prices: &PriceTable) -> Result<ReturnsTable, AnalysisError> {
    let n = prices.len();
    if n < 2 {
        return Err(AnalysisError::insufficient("returns", 2, n));
    }

    let columns: Vec<Vec<f64>> = prices
        .iter_columns()
        .map(|(_, closes)| {
            closes
                .windows(2)
                .map(|w| {
                    let (prev, cur) = (w[0], w[1]);
                    if prev.is_nan() || cur.is_nan() || prev <= 0.0 {
                        f64::NAN
                    } else {
                        cur / prev - 1.0
                    }
                })
                .collect()
        })
        .collect();

    let raw = ReturnsTable::new(
        prices.dates()[1..].to_vec(),
        prices.symbols().to_vec(),
        columns,
    )?;
    let returns = raw.filter_rows(|i| raw.row_is_complete(i));

    if returns.is_empty() {
        return Err(AnalysisError::insufficient(
            "returns (no row defined for every symbol)",
            2,
            n,
        ));
    }
    if returns.len() < raw.len() {
        tracing::debug!(
            dropped = raw.len() - returns.len(),
            kept = returns.len(),
            "dropped rows with undefined returns"
        );
    }
    Ok(returns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn table(columns: Vec<(&str, Vec<f64>)>) -> PriceTable {
        let n = columns[0].1.len();
        PriceTable::new(
            (0..n).map(|i| d(2 + i as u32)).collect(),
            columns.iter().map(|(s, _)| s.to_string()).collect(),
            columns.into_iter().map(|(_, c)| c).collect(),
        )
        .unwrap()
    }

    #[test]
    fn single_symbol_returns() {
        let prices = table(vec![("X", vec![100.0, 110.0, 99.0])]);
        let returns = compute_returns(&prices).unwrap();
        assert_eq!(returns.dates(), &[d(3), d(4)]);
        let col = returns.column("X").unwrap();
        assert!((col[0] - 0.10).abs() < 1e-12);
        assert!((col[1] + 0.10).abs() < 1e-12);
    }

    #[test]
    fn rows_with_any_undefined_cell_are_dropped() {
        let prices = table(vec![
            ("A", vec![10.0, 11.0, 12.0, 13.0]),
            ("B", vec![20.0, f64::NAN, 22.0, 23.0]),
        ]);
        let returns = compute_returns(&prices).unwrap();
        // B's NaN on day 3 voids the returns for days 3 and 4
        assert_eq!(returns.dates(), &[d(5)]);
        assert!((returns.column("B").unwrap()[0] - (23.0 / 22.0 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn non_positive_prior_price_is_undefined() {
        let prices = table(vec![("Z", vec![0.0, 5.0, 6.0])]);
        let returns = compute_returns(&prices).unwrap();
        assert_eq!(returns.len(), 1);
        assert!((returns.column("Z").unwrap()[0] - 0.2).abs() < 1e-12);
    }

    #[test]
    fn fewer_than_two_rows_is_insufficient() {
        let prices = table(vec![("X", vec![100.0])]);
        assert!(matches!(
            compute_returns(&prices),
            Err(AnalysisError::InsufficientData { required: 2, available: 1, .. })
        ));
    }

    #[test]
    fn nothing_defined_is_insufficient() {
        let prices = table(vec![("X", vec![100.0, f64::NAN, f64::NAN])]);
        assert!(matches!(
            compute_returns(&prices),
            Err(AnalysisError::InsufficientData { .. })
        ));
    }
}
