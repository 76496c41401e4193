//! Request fingerprinting: deterministic identity of an analysis request.
//!
//! Two requests with the same symbol set (any order, any case), date range,
//! alignment policy, histogram bin count and indicator configuration hash to
//! the same `RequestFingerprint`. Exports carry it so a file can be traced
//! back to its request. The runner's result cache keys on a fingerprint
//! further narrowed by `scoped` to the price sources in use.

use crate::data::{normalize_symbols, AlignmentPolicy};
use crate::indicators::IndicatorConfig;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// BLAKE3 hex digest of the canonical request JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestFingerprint(String);

impl RequestFingerprint {
    pub fn compute<S: AsRef<str>>(
        symbols: &[S],
        start: NaiveDate,
        end: NaiveDate,
        alignment: AlignmentPolicy,
        histogram_bins: usize,
        indicators: &IndicatorConfig,
    ) -> Self {
        let mut symbols = normalize_symbols(symbols);
        symbols.sort();

        // serde_json::Value keeps object keys sorted, so the text is canonical.
        let canonical = serde_json::json!({
            "symbols": symbols,
            "start": start.to_string(),
            "end": end.to_string(),
            "alignment": alignment,
            "histogram_bins": histogram_bins,
            "indicators": indicators,
        })
        .to_string();

        Self(blake3::hash(canonical.as_bytes()).to_hex().to_string())
    }

    /// Derive a fingerprint that also depends on `scope`, e.g. a description
    /// of where the prices come from.
    pub fn scoped(&self, scope: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.0.as_bytes());
        hasher.update(b"\0");
        hasher.update(scope.as_bytes());
        Self(hasher.finalize().to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 characters, for file names and log lines. Shorter values
    /// (e.g. from a hand-edited report) are returned whole.
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl fmt::Display for RequestFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
