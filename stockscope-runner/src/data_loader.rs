//! Price loading for the runner.
//!
//! Resolves each symbol independently, in this order:
//! 1. Live provider (unless offline)
//! 2. CSV file in the data directory (`{dir}/{SYMBOL}.csv`)
//! 3. Synthetic random walk, only when `synthetic` is set
//! 4. Otherwise fail with `DataUnavailable`
//!
//! Synthetic series are tagged in `sources` so reports can flag them.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::PathBuf;
use stockscope_core::data::{
    fetch_prices, validate_request, CsvProvider, DataProvider, DataSource, FetchProgress,
    SyntheticProvider,
};
use stockscope_core::domain::PriceSeries;
use stockscope_core::AnalysisError;

/// Options controlling where prices come from.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Never touch the network.
    pub offline: bool,
    /// Fall back to synthetic prices when nothing else has the symbol.
    pub synthetic: bool,
    /// Directory of per-symbol CSV files, tried after the live provider.
    pub data_dir: Option<PathBuf>,
}

impl LoadOptions {
    /// Describe the source chain these options produce, for cache scoping.
    /// `live` says whether a live provider is available.
    pub fn source_scope(&self, live: bool) -> String {
        let mut parts = Vec::new();
        if live && !self.offline {
            parts.push("live".to_string());
        }
        if let Some(dir) = &self.data_dir {
            parts.push(format!("csv={}", dir.display()));
        }
        if self.synthetic {
            parts.push("synthetic".to_string());
        }
        parts.join(";")
    }
}

/// Loaded series plus where each one came from.
#[derive(Debug, Clone)]
pub struct LoadedPrices {
    pub series: BTreeMap<String, PriceSeries>,
    pub sources: BTreeMap<String, DataSource>,
    pub has_synthetic: bool,
}

/// Load every symbol, trying each configured source in turn.
pub fn load_prices<S: AsRef<str>>(
    symbols: &[S],
    start: NaiveDate,
    end: NaiveDate,
    provider: Option<&dyn DataProvider>,
    progress: Option<&dyn FetchProgress>,
    opts: &LoadOptions,
) -> Result<LoadedPrices, AnalysisError> {
    let symbols = validate_request(symbols, start, end)?;

    let csv = opts.data_dir.clone().map(CsvProvider::new);
    let synthetic = SyntheticProvider::default();

    let mut chain: Vec<(&dyn DataProvider, DataSource)> = Vec::new();
    if !opts.offline {
        if let Some(p) = provider {
            chain.push((p, DataSource::YahooFinance));
        }
    }
    if let Some(c) = csv.as_ref() {
        chain.push((c as &dyn DataProvider, DataSource::CsvImport));
    }
    if opts.synthetic {
        chain.push((&synthetic as &dyn DataProvider, DataSource::Synthetic));
    }

    let mut series = BTreeMap::new();
    let mut sources = BTreeMap::new();

    for symbol in &symbols {
        let mut last_error = None;
        for (source, tag) in &chain {
            match fetch_prices(*source, &[symbol], start, end, progress) {
                Ok(mut fetched) => {
                    if let Some(s) = fetched.remove(symbol) {
                        if *tag == DataSource::Synthetic {
                            tracing::warn!(%symbol, "using synthetic prices; results are not real market data");
                        }
                        series.insert(symbol.clone(), s);
                        sources.insert(symbol.clone(), *tag);
                        last_error = None;
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(%symbol, source = source.name(), error = %e, "source failed, trying next");
                    last_error = Some(e);
                }
            }
        }

        if !series.contains_key(symbol) {
            return Err(last_error.unwrap_or_else(|| AnalysisError::DataUnavailable {
                symbol: symbol.clone(),
                reason: "no data source configured (offline without a data directory; use --synthetic)"
                    .into(),
            }));
        }
    }

    let has_synthetic = sources.values().any(|s| *s == DataSource::Synthetic);
    tracing::info!(
        symbols = series.len(),
        synthetic = has_synthetic,
        "loaded prices"
    );

    Ok(LoadedPrices {
        series,
        sources,
        has_synthetic,
    })
}
