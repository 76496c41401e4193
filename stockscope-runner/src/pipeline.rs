//! End-to-end analysis: load prices, align, and run every engine.
//!
//! `run_analysis` is the entry point used by the CLI. `analyze_prices` does
//! the same work on already-loaded series and performs no I/O.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use stockscope_core::analytics::{
    compute_correlation, compute_returns, describe_returns, CorrelationMatrix, ReturnDistribution,
};
use stockscope_core::data::{align_closes, DataProvider, DataSource, FetchProgress};
use stockscope_core::domain::{PriceTable, ReturnsTable};
use stockscope_core::fingerprint::RequestFingerprint;
use stockscope_core::indicators::{compute_indicators, IndicatorTable};
use stockscope_core::AnalysisError;

use crate::config::AnalysisConfig;
use crate::data_loader::{load_prices, LoadOptions, LoadedPrices};
use crate::memo::AnalysisCache;

/// Current schema version for exported reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Everything computed for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub fingerprint: RequestFingerprint,
    pub symbols: Vec<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub prices: PriceTable,
    pub returns: ReturnsTable,
    /// Present only when more than one symbol was analysed.
    pub correlation: Option<CorrelationMatrix>,
    pub distributions: BTreeMap<String, ReturnDistribution>,
    pub indicators: BTreeMap<String, IndicatorTable>,
    pub sources: BTreeMap<String, DataSource>,
    pub has_synthetic: bool,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Load prices for `config` and analyse them.
pub fn run_analysis(
    config: &AnalysisConfig,
    provider: Option<&dyn DataProvider>,
    progress: Option<&dyn FetchProgress>,
    opts: &LoadOptions,
) -> Result<AnalysisReport, AnalysisError> {
    let loaded = load_prices(
        &config.symbols,
        config.start,
        config.end,
        provider,
        progress,
        opts,
    )?;
    analyze_prices(config, loaded)
}

/// `run_analysis` through `cache`.
///
/// The cache key is the request fingerprint scoped to the price source
/// chain, so a report built from synthetic or CSV prices is never served
/// for a live request.
pub fn run_analysis_cached(
    cache: &AnalysisCache,
    config: &AnalysisConfig,
    provider: Option<&dyn DataProvider>,
    progress: Option<&dyn FetchProgress>,
    opts: &LoadOptions,
) -> Result<Arc<AnalysisReport>, AnalysisError> {
    let key = config
        .fingerprint()
        .scoped(&opts.source_scope(provider.is_some()));
    cache.get_or_compute(&key, || run_analysis(config, provider, progress, opts))
}

/// Analyse pre-loaded series. No I/O.
///
/// Per-symbol indicator tables are computed in parallel; the first failure
/// aborts the run.
pub fn analyze_prices(
    config: &AnalysisConfig,
    loaded: LoadedPrices,
) -> Result<AnalysisReport, AnalysisError> {
    config.indicators.validate()?;
    let fingerprint = config.fingerprint();
    let _span = tracing::info_span!("analysis", fingerprint = fingerprint.short()).entered();

    let prices = align_closes(loaded.series.values(), config.alignment)?;
    let returns = compute_returns(&prices)?;

    let correlation = if returns.width() > 1 {
        Some(compute_correlation(&returns)?)
    } else {
        None
    };

    let distributions = describe_returns(&returns, config.histogram_bins)?;

    let indicators: BTreeMap<String, IndicatorTable> = loaded
        .series
        .par_iter()
        .map(|(symbol, series)| {
            compute_indicators(series, &config.indicators).map(|t| (symbol.clone(), t))
        })
        .collect::<Result<_, _>>()?;

    tracing::info!(
        symbols = prices.width(),
        price_rows = prices.len(),
        return_rows = returns.len(),
        "analysis complete"
    );

    Ok(AnalysisReport {
        schema_version: SCHEMA_VERSION,
        fingerprint,
        symbols: prices.symbols().to_vec(),
        start: config.start,
        end: config.end,
        prices,
        returns,
        correlation,
        distributions,
        indicators,
        sources: loaded.sources,
        has_synthetic: loaded.has_synthetic,
    })
}
