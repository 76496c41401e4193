//! StockScope Core: price fetching, alignment, returns, correlation,
//! distributions and technical indicators.
//!
//! - Domain types (bars, price series, symbol-keyed tables)
//! - Price providers (Yahoo chart API, CSV directory, synthetic) behind one trait
//! - Return, correlation and distribution engines over aligned tables
//! - Moving average, RSI and MACD indicators with uniform warm-up trimming
//! - Request fingerprints for caching and export identity

pub mod analytics;
pub mod data;
pub mod domain;
pub mod error;
pub mod fingerprint;
pub mod indicators;

pub use error::AnalysisError;
