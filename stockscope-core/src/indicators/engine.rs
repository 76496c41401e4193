//! Indicator Engine: one symbol's closes in, a trimmed indicator table out.
//!
//! Bars without a defined close are skipped first, so a missing quote
//! mid-series does not stall the EMA and RSI recurrences. Columns are then
//! computed independently over the remaining closes, attached to their
//! dates, and every row with any undefined column is dropped once. Leading
//! warm-up rows therefore disappear uniformly.

use super::macd::macd_components;
use super::{Indicator, Rsi, Sma};
use crate::domain::PriceSeries;
use crate::error::AnalysisError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdConfig {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdConfig {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

/// Which indicators to attach and their windows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub ma_windows: BTreeSet<usize>,
    pub rsi_window: usize,
    pub macd: MacdConfig,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            ma_windows: [20, 50, 100].into_iter().collect(),
            rsi_window: 14,
            macd: MacdConfig::default(),
        }
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.ma_windows.contains(&0) {
            return Err(AnalysisError::InvalidConfig(
                "moving-average windows must be positive".into(),
            ));
        }
        if self.rsi_window == 0 {
            return Err(AnalysisError::InvalidConfig("rsi_window must be positive".into()));
        }
        let MacdConfig { fast, slow, signal } = self.macd;
        if fast == 0 || signal == 0 {
            return Err(AnalysisError::InvalidConfig(
                "MACD fast and signal periods must be positive".into(),
            ));
        }
        if fast >= slow {
            return Err(AnalysisError::InvalidConfig(format!(
                "MACD fast period ({fast}) must be shorter than slow ({slow})"
            )));
        }
        Ok(())
    }

    /// Minimum input length: the largest of every MA window, the RSI window,
    /// and MACD slow + signal.
    pub fn warmup_rows(&self) -> usize {
        self.ma_windows
            .iter()
            .copied()
            .chain([self.rsi_window, self.macd.slow + self.macd.signal])
            .max()
            .unwrap_or(0)
    }
}

/// Per-date indicator columns for one symbol, warm-up rows removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorTable {
    pub symbol: String,
    pub dates: Vec<NaiveDate>,
    pub close: Vec<f64>,
    /// `(window, values)` in ascending window order.
    pub moving_averages: Vec<(usize, Vec<f64>)>,
    pub rsi: Vec<f64>,
    pub macd: Vec<f64>,
    pub macd_signal: Vec<f64>,
    pub macd_diff: Vec<f64>,
}

impl IndicatorTable {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Column names in export order: close, MA_w..., RSI, MACD, MACD_signal, MACD_diff.
    pub fn column_names(&self) -> Vec<String> {
        let mut names = vec!["close".to_string()];
        names.extend(self.moving_averages.iter().map(|(w, _)| format!("MA_{w}")));
        names.extend(["RSI", "MACD", "MACD_signal", "MACD_diff"].map(String::from));
        names
    }

    /// Columns in the same order as `column_names`.
    pub fn columns(&self) -> Vec<&[f64]> {
        let mut cols: Vec<&[f64]> = vec![&self.close];
        cols.extend(self.moving_averages.iter().map(|(_, v)| v.as_slice()));
        cols.extend([
            self.rsi.as_slice(),
            &self.macd,
            &self.macd_signal,
            &self.macd_diff,
        ]);
        cols
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.column_names()
            .iter()
            .position(|n| n == name)
            .map(|i| self.columns()[i])
    }

    pub fn moving_average(&self, window: usize) -> Option<&[f64]> {
        self.moving_averages
            .iter()
            .find(|(w, _)| *w == window)
            .map(|(_, v)| v.as_slice())
    }
}

/// Attach moving averages, RSI, and MACD to a price series.
///
/// Bars whose close is undefined are left out of the table entirely.
///
/// Fails with `InvalidConfig` for a bad configuration and `InsufficientData`
/// when fewer than `config.warmup_rows()` bars have a defined close or no row
/// survives warm-up trimming.
pub fn compute_indicators(
    series: &PriceSeries,
    config: &IndicatorConfig,
) -> Result<IndicatorTable, AnalysisError> {
    config.validate()?;

    let (dates, closes): (Vec<NaiveDate>, Vec<f64>) = series
        .bars()
        .iter()
        .filter(|b| b.has_close())
        .map(|b| (b.date, b.close))
        .unzip();
    let skipped = series.len() - closes.len();
    if skipped > 0 {
        tracing::warn!(
            symbol = series.symbol(),
            skipped,
            "skipping bars with undefined close"
        );
    }

    let n = closes.len();
    let required = config.warmup_rows();
    let context = || format!("indicators for {}", series.symbol());
    if n < required {
        return Err(AnalysisError::insufficient(context(), required, n));
    }

    let moving_averages: Vec<(usize, Vec<f64>)> = config
        .ma_windows
        .iter()
        .map(|&w| (w, Sma::new(w).compute(&closes)))
        .collect();
    let rsi = Rsi::new(config.rsi_window).compute(&closes);
    let macd = macd_components(&closes, config.macd.fast, config.macd.slow, config.macd.signal);

    let complete = |i: usize| {
        moving_averages.iter().all(|(_, v)| !v[i].is_nan())
            && !rsi[i].is_nan()
            && !macd.line[i].is_nan()
            && !macd.signal[i].is_nan()
            && !macd.histogram[i].is_nan()
    };
    let keep: Vec<usize> = (0..n).filter(|&i| complete(i)).collect();

    if keep.is_empty() {
        return Err(AnalysisError::insufficient(
            format!("{} (no complete row after warm-up)", context()),
            required,
            n,
        ));
    }

    let pick = |v: &[f64]| keep.iter().map(|&i| v[i]).collect::<Vec<f64>>();

    let table = IndicatorTable {
        symbol: series.symbol().to_string(),
        dates: keep.iter().map(|&i| dates[i]).collect(),
        close: pick(&closes),
        moving_averages: moving_averages
            .iter()
            .map(|(w, v)| (*w, pick(v)))
            .collect(),
        rsi: pick(&rsi),
        macd: pick(&macd.line),
        macd_signal: pick(&macd.signal),
        macd_diff: pick(&macd.histogram),
    };

    tracing::debug!(
        symbol = series.symbol(),
        input_rows = series.len(),
        output_rows = table.len(),
        "computed indicators"
    );

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Bar;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    fn series(closes: &[f64]) -> PriceSeries {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                date: base + chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1000,
                adj_close: close,
            })
            .collect();
        PriceSeries::new("TEST", bars).unwrap()
    }

    fn small_config() -> IndicatorConfig {
        IndicatorConfig {
            ma_windows: [3].into_iter().collect(),
            rsi_window: 3,
            macd: MacdConfig {
                fast: 2,
                slow: 4,
                signal: 2,
            },
        }
    }

    #[test]
    fn defaults_match_classic_settings() {
        let cfg = IndicatorConfig::default();
        assert_eq!(cfg.ma_windows.iter().copied().collect::<Vec<_>>(), vec![20, 50, 100]);
        assert_eq!(cfg.rsi_window, 14);
        assert_eq!(cfg.macd, MacdConfig { fast: 12, slow: 26, signal: 9 });
        assert_eq!(cfg.warmup_rows(), 100);
    }

    #[test]
    fn warmup_rows_without_moving_averages() {
        let cfg = IndicatorConfig {
            ma_windows: BTreeSet::new(),
            ..IndicatorConfig::default()
        };
        assert_eq!(cfg.warmup_rows(), 35);
    }

    #[test]
    fn trims_leading_rows_uniformly() {
        let closes = [10.0, 11.0, 12.0, 11.0, 10.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0];
        let table = compute_indicators(&series(&closes), &small_config()).unwrap();

        // RSI(3) first defined at index 3; MACD signal at 4 + 2 - 2 = 4
        assert_eq!(table.len(), closes.len() - 4);
        assert_eq!(table.close[0], closes[4]);
        assert_approx(table.moving_average(3).unwrap()[0], (12.0 + 11.0 + 10.0) / 3.0, DEFAULT_EPSILON);
        for name in table.column_names() {
            let column = table.column(&name).unwrap();
            assert_eq!(column.len(), table.len());
            assert!(column.iter().all(|v| !v.is_nan()), "{name} has undefined cells");
        }
    }

    #[test]
    fn column_names_follow_export_order() {
        let closes: Vec<f64> = (0..40).map(|i| 50.0 + i as f64).collect();
        let cfg = IndicatorConfig {
            ma_windows: [5, 3].into_iter().collect(),
            ..small_config()
        };
        let table = compute_indicators(&series(&closes), &cfg).unwrap();
        assert_eq!(
            table.column_names(),
            vec!["close", "MA_3", "MA_5", "RSI", "MACD", "MACD_signal", "MACD_diff"]
        );
    }

    #[test]
    fn short_series_is_insufficient() {
        let cfg = IndicatorConfig {
            rsi_window: 14,
            ..small_config()
        };
        let err = compute_indicators(&series(&[1.0, 2.0, 3.0]), &cfg).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InsufficientData { required: 14, available: 3, .. }
        ));
    }

    #[test]
    fn gap_mid_series_keeps_later_rows() {
        let mut closes: Vec<f64> = (0..300).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect();
        closes[150] = f64::NAN;
        let s = series(&closes);
        let table = compute_indicators(&s, &IndicatorConfig::default()).unwrap();

        assert_eq!(table.dates.last().copied(), s.last_date());
        assert_eq!(table.len(), 299 - 99);
        assert!(!table.dates.contains(&s.dates()[150]));
        for name in table.column_names() {
            assert!(table.column(&name).unwrap().iter().all(|v| !v.is_nan()), "{name}");
        }
    }

    #[test]
    fn undefined_closes_count_against_warmup() {
        let mut closes = vec![10.0; 8];
        closes[1] = f64::NAN;
        closes[3] = f64::NAN;
        closes[5] = f64::NAN;
        let err = compute_indicators(&series(&closes), &small_config()).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InsufficientData { required: 6, available: 5, .. }
        ));
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let s = series(&[1.0; 50]);
        let zero_ma = IndicatorConfig {
            ma_windows: [0].into_iter().collect(),
            ..small_config()
        };
        assert!(matches!(compute_indicators(&s, &zero_ma), Err(AnalysisError::InvalidConfig(_))));

        let inverted = IndicatorConfig {
            macd: MacdConfig { fast: 26, slow: 12, signal: 9 },
            ..small_config()
        };
        assert!(matches!(compute_indicators(&s, &inverted), Err(AnalysisError::InvalidConfig(_))));
    }

    #[test]
    fn config_deserializes_with_partial_fields() {
        let cfg: IndicatorConfig = toml::from_str("rsi_window = 7\n[macd]\nslow = 30\n").unwrap();
        assert_eq!(cfg.rsi_window, 7);
        assert_eq!(cfg.macd, MacdConfig { fast: 12, slow: 30, signal: 9 });
        assert_eq!(cfg.ma_windows.len(), 3);
    }
}
