//! TOML configuration for an analysis request.
//!
//! Every field has a default, so an empty file is a valid configuration:
//! AAPL and MSFT from 2020-01-01 through 2024-12-31, inner alignment,
//! 100 histogram bins and the classic indicator windows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use stockscope_core::data::{normalize_symbols, AlignmentPolicy, Watchlist};
use stockscope_core::fingerprint::RequestFingerprint;
use stockscope_core::indicators::IndicatorConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything that identifies one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub symbols: Vec<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub alignment: AlignmentPolicy,
    pub histogram_bins: usize,
    pub indicators: IndicatorConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            symbols: Watchlist::default_tech().active().to_vec(),
            start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default(),
            alignment: AlignmentPolicy::default(),
            histogram_bins: 100,
            indicators: IndicatorConfig::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate. Symbols are normalised (trimmed, upper-cased, deduplicated).
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.symbols = normalize_symbols(&config.symbols);
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::Invalid("no symbols configured".into()));
        }
        if self.start > self.end {
            return Err(ConfigError::Invalid(format!(
                "start {} is after end {}",
                self.start, self.end
            )));
        }
        if self.histogram_bins == 0 {
            return Err(ConfigError::Invalid("histogram_bins must be positive".into()));
        }
        self.indicators
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn fingerprint(&self) -> RequestFingerprint {
        RequestFingerprint::compute(
            &self.symbols,
            self.start,
            self.end,
            self.alignment,
            self.histogram_bins,
            &self.indicators,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = AnalysisConfig::from_toml("").unwrap();
        assert_eq!(cfg, AnalysisConfig::default());
        assert_eq!(cfg.symbols, vec!["AAPL", "MSFT"]);
        assert_eq!(cfg.start, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(cfg.histogram_bins, 100);
    }

    #[test]
    fn parses_full_file() {
        let toml = r#"
symbols = ["tsla", "AMZN", "TSLA"]
start = "2022-01-01"
end = "2023-06-30"
alignment = "union"
histogram_bins = 50

[indicators]
ma_windows = [10, 30]
rsi_window = 7

[indicators.macd]
fast = 5
slow = 35
signal = 5
"#;
        let cfg = AnalysisConfig::from_toml(toml).unwrap();
        assert_eq!(cfg.symbols, vec!["TSLA", "AMZN"]);
        assert_eq!(cfg.alignment, AlignmentPolicy::Union);
        assert_eq!(cfg.histogram_bins, 50);
        assert_eq!(cfg.indicators.rsi_window, 7);
        assert_eq!(cfg.indicators.macd.slow, 35);
        assert_eq!(cfg.indicators.ma_windows.len(), 2);
    }

    #[test]
    fn rejects_reversed_range() {
        let err = AnalysisConfig::from_toml("start = \"2024-01-01\"\nend = \"2023-01-01\"\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_bad_indicator_config() {
        let err = AnalysisConfig::from_toml("[indicators.macd]\nfast = 30\nslow = 20\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            AnalysisConfig::from_toml("symbols = [").unwrap_err(),
            ConfigError::Parse(_)
        ));
    }

    #[test]
    fn toml_round_trip() {
        let cfg = AnalysisConfig::default();
        let text = cfg.to_toml().unwrap();
        assert_eq!(AnalysisConfig::from_toml(&text).unwrap(), cfg);
    }

    #[test]
    fn fingerprint_tracks_symbol_set() {
        let a = AnalysisConfig::default();
        let mut b = a.clone();
        b.symbols.reverse();
        assert_eq!(a.fingerprint(), b.fingerprint());
        b.symbols.push("TSLA".into());
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn fingerprint_tracks_histogram_bins() {
        let a = AnalysisConfig::default();
        let b = AnalysisConfig {
            histogram_bins: 5,
            ..a.clone()
        };
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
