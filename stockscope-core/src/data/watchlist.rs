//! Watchlist: the ticker menu offered to front-ends, stored as TOML.
//!
//! The list is the menu; `selected` is the subset analysed by default.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Watchlist {
    pub symbols: Vec<String>,
    #[serde(default)]
    pub selected: Vec<String>,
}

impl Watchlist {
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("read watchlist file: {e}"))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, String> {
        let mut list: Self =
            toml::from_str(content).map_err(|e| format!("parse watchlist TOML: {e}"))?;
        list.selected.retain(|s| list.symbols.contains(s));
        Ok(list)
    }

    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("serialize watchlist: {e}"))
    }

    /// Five large-cap US tech names; AAPL and MSFT selected.
    pub fn default_tech() -> Self {
        Self {
            symbols: ["AAPL", "MSFT", "GOOGL", "AMZN", "TSLA"]
                .into_iter()
                .map(String::from)
                .collect(),
            selected: vec!["AAPL".into(), "MSFT".into()],
        }
    }

    /// Selected symbols, or the whole list when nothing is selected.
    pub fn active(&self) -> &[String] {
        if self.selected.is_empty() {
            &self.symbols
        } else {
            &self.selected
        }
    }

    /// Select a symbol from the list. Returns false if it is not on the list.
    pub fn select(&mut self, symbol: &str) -> bool {
        if !self.symbols.iter().any(|s| s == symbol) {
            return false;
        }
        if !self.selected.iter().any(|s| s == symbol) {
            self.selected.push(symbol.to_string());
        }
        true
    }

    pub fn deselect(&mut self, symbol: &str) {
        self.selected.retain(|s| s != symbol);
    }
}
