//! Domain types: daily bars, per-symbol series, and symbol-keyed tables.

pub mod bar;
pub mod nan_serde;
pub mod series;
pub mod table;

pub use bar::Bar;
pub use series::PriceSeries;
pub use table::{PriceTable, ReturnsTable, SymbolTable};
