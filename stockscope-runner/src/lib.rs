//! StockScope Runner: configuration, price loading, the analysis pipeline,
//! result caching, and flat export.
//!
//! This crate builds on `stockscope-core` to provide:
//! - TOML configuration with defaults for every field
//! - Price loading with provider, CSV directory, and synthetic fallback
//! - `run_analysis`, which produces a complete `AnalysisReport`
//! - A single-flight result cache keyed by request fingerprint
//! - CSV, JSON, and Parquet export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod memo;
pub mod pipeline;

pub use config::{AnalysisConfig, ConfigError};
pub use data_loader::{load_prices, LoadOptions, LoadedPrices};
pub use export::{export_report, ExportFormat};
pub use memo::{AnalysisCache, CacheStats, SingleFlight};
pub use pipeline::{analyze_prices, run_analysis, run_analysis_cached, AnalysisReport};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn report_is_send_sync() {
        assert_send::<AnalysisReport>();
        assert_sync::<AnalysisReport>();
    }

    #[test]
    fn cache_is_send_sync() {
        assert_send::<AnalysisCache>();
        assert_sync::<AnalysisCache>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<AnalysisConfig>();
        assert_sync::<AnalysisConfig>();
        assert_send::<LoadOptions>();
        assert_sync::<LoadOptions>();
    }
}
