//! Pairwise Pearson correlation of return columns.

use crate::domain::ReturnsTable;
use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};

/// Symmetric matrix of Pearson coefficients with a unit diagonal.
///
/// `values[i][j]` is the correlation between `symbols[i]` and `symbols[j]`.
/// Held at full precision; use [`CorrelationMatrix::rounded`] for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub symbols: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Coefficient for a pair of symbols, if both are present.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.symbols.iter().position(|s| s == a)?;
        let j = self.symbols.iter().position(|s| s == b)?;
        Some(self.values[i][j])
    }

    /// Copy with every coefficient rounded to `decimals` places.
    pub fn rounded(&self, decimals: u32) -> Self {
        let scale = 10f64.powi(decimals as i32);
        Self {
            symbols: self.symbols.clone(),
            values: self
                .values
                .iter()
                .map(|row| row.iter().map(|v| (v * scale).round() / scale).collect())
                .collect(),
        }
    }
}

/// Pearson correlation between every pair of return columns.
///
/// Requires at least two rows. A column with zero variance has no defined
/// correlation and fails with `DegenerateSeries`.
pub fn compute_correlation(returns: &ReturnsTable) -> Result<CorrelationMatrix, AnalysisError> {
    let n = returns.len();
    if n < 2 {
        return Err(AnalysisError::insufficient("correlation", 2, n));
    }
    if returns.width() == 0 {
        return Err(AnalysisError::InvalidConfig(
            "correlation needs at least one symbol".into(),
        ));
    }

    // Center each column once; the pairwise loop then only needs dot products.
    let mut centered = Vec::with_capacity(returns.width());
    let mut norms = Vec::with_capacity(returns.width());
    for (symbol, column) in returns.iter_columns() {
        let mean = super::mean(column);
        let c: Vec<f64> = column.iter().map(|v| v - mean).collect();
        let norm = c.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm == 0.0 || !norm.is_finite() {
            return Err(AnalysisError::DegenerateSeries {
                symbol: symbol.to_string(),
            });
        }
        centered.push(c);
        norms.push(norm);
    }

    let k = centered.len();
    let mut values = vec![vec![0.0; k]; k];
    for i in 0..k {
        values[i][i] = 1.0;
        for j in (i + 1)..k {
            let dot: f64 = centered[i]
                .iter()
                .zip(&centered[j])
                .map(|(a, b)| a * b)
                .sum();
            let r = (dot / (norms[i] * norms[j])).clamp(-1.0, 1.0);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        symbols: returns.symbols().to_vec(),
        values,
    })
}
