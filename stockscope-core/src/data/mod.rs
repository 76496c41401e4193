//! Price Fetcher: providers, multi-symbol fetching, and date alignment.

pub mod align;
pub mod circuit_breaker;
pub mod csv_import;
pub mod fetch;
pub mod provider;
pub mod synthetic;
pub mod watchlist;
pub mod yahoo;

pub use align::{align_closes, AlignmentPolicy};
pub use circuit_breaker::CircuitBreaker;
pub use csv_import::CsvProvider;
pub use fetch::{fetch_prices, normalize_symbols, validate_request};
pub use provider::{DataError, DataProvider, DataSource, FetchProgress, FetchResult, TracingProgress};
pub use synthetic::SyntheticProvider;
pub use watchlist::Watchlist;
pub use yahoo::YahooProvider;
