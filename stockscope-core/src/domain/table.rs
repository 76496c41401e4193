//! Date-indexed, symbol-keyed numeric tables.
//!
//! One column per symbol, all columns aligned on a shared ascending date
//! axis. Undefined cells are `f64::NAN`.

use crate::error::AnalysisError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Column table keyed by symbol on a shared date axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolTable {
    dates: Vec<NaiveDate>,
    symbols: Vec<String>,
    #[serde(with = "super::nan_serde::columns")]
    columns: Vec<Vec<f64>>,
}

/// Aligned closing prices, one column per symbol.
pub type PriceTable = SymbolTable;

/// Period-over-period simple returns, one column per symbol.
pub type ReturnsTable = SymbolTable;

impl SymbolTable {
    /// Build a table. Every column must match the date axis length, symbols
    /// must be unique, and dates strictly increasing.
    pub fn new(
        dates: Vec<NaiveDate>,
        symbols: Vec<String>,
        columns: Vec<Vec<f64>>,
    ) -> Result<Self, AnalysisError> {
        if symbols.len() != columns.len() {
            return Err(AnalysisError::AlignmentFailure(format!(
                "{} symbols but {} columns",
                symbols.len(),
                columns.len()
            )));
        }
        for (symbol, column) in symbols.iter().zip(&columns) {
            if column.len() != dates.len() {
                return Err(AnalysisError::AlignmentFailure(format!(
                    "column '{symbol}' has {} values for {} dates",
                    column.len(),
                    dates.len()
                )));
            }
        }
        for (i, symbol) in symbols.iter().enumerate() {
            if symbols[..i].contains(symbol) {
                return Err(AnalysisError::AlignmentFailure(format!(
                    "duplicate column '{symbol}'"
                )));
            }
        }
        if dates.windows(2).any(|w| w[1] <= w[0]) {
            return Err(AnalysisError::AlignmentFailure(
                "date axis must be strictly increasing".into(),
            ));
        }
        Ok(Self {
            dates,
            symbols,
            columns,
        })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Number of rows (dates).
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Number of symbol columns.
    pub fn width(&self) -> usize {
        self.symbols.len()
    }

    /// Column for a symbol, if present.
    pub fn column(&self, symbol: &str) -> Option<&[f64]> {
        self.symbols
            .iter()
            .position(|s| s == symbol)
            .map(|i| self.columns[i].as_slice())
    }

    /// Iterate `(symbol, column)` pairs in column order.
    pub fn iter_columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.symbols
            .iter()
            .map(|s| s.as_str())
            .zip(self.columns.iter().map(|c| c.as_slice()))
    }

    /// Values of one row across all columns.
    pub fn row(&self, index: usize) -> Vec<f64> {
        self.columns.iter().map(|c| c[index]).collect()
    }

    /// True when every cell of the row is defined.
    pub fn row_is_complete(&self, index: usize) -> bool {
        self.columns.iter().all(|c| !c[index].is_nan())
    }

    /// Keep only the rows for which `keep(row_index)` returns true.
    pub fn filter_rows(&self, keep: impl Fn(usize) -> bool) -> Self {
        let kept: Vec<usize> = (0..self.len()).filter(|&i| keep(i)).collect();
        Self {
            dates: kept.iter().map(|&i| self.dates[i]).collect(),
            symbols: self.symbols.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| kept.iter().map(|&i| c[i]).collect())
                .collect(),
        }
    }
}
