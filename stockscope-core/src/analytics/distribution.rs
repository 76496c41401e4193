//! Per-symbol summary statistics and probability histograms of returns.

use super::{mean, sample_std_dev};
use crate::domain::ReturnsTable;
use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Equal-width histogram normalised to probabilities.
///
/// `edges` has one more entry than `probabilities`. Bin `i` covers
/// `[edges[i], edges[i + 1])`; the last bin is closed on the right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub probabilities: Vec<f64>,
}

impl Histogram {
    pub fn from_values(values: &[f64], bins: usize) -> Result<Self, AnalysisError> {
        if bins == 0 {
            return Err(AnalysisError::InvalidConfig(
                "histogram needs at least one bin".into(),
            ));
        }
        if values.is_empty() {
            return Err(AnalysisError::insufficient("histogram", 1, 0));
        }

        let (lo, hi) = min_max(values);
        if lo == hi {
            return Ok(Self {
                edges: vec![lo, hi],
                probabilities: vec![1.0],
            });
        }

        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins)
            .map(|i| if i == bins { hi } else { lo + width * i as f64 })
            .collect();

        let mut counts = vec![0usize; bins];
        for &v in values {
            let idx = (((v - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }
        let total = values.len() as f64;
        Ok(Self {
            edges,
            probabilities: counts.iter().map(|&c| c as f64 / total).collect(),
        })
    }

    pub fn bins(&self) -> usize {
        self.probabilities.len()
    }
}

/// Location and spread of one symbol's returns plus its histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnDistribution {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; NaN with a single observation.
    #[serde(with = "crate::domain::nan_serde::scalar")]
    pub std_dev: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub histogram: Histogram,
}

impl ReturnDistribution {
    pub fn from_values(values: &[f64], bins: usize) -> Result<Self, AnalysisError> {
        let histogram = Histogram::from_values(values, bins)?;
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let (min, max) = (sorted[0], sorted[sorted.len() - 1]);
        Ok(Self {
            count: values.len(),
            mean: mean(values),
            std_dev: sample_std_dev(values),
            min,
            q1: quantile_sorted(&sorted, 0.25),
            median: quantile_sorted(&sorted, 0.5),
            q3: quantile_sorted(&sorted, 0.75),
            max,
            histogram,
        })
    }
}

/// Describe every column of a returns table.
pub fn describe_returns(
    returns: &ReturnsTable,
    bins: usize,
) -> Result<BTreeMap<String, ReturnDistribution>, AnalysisError> {
    returns
        .iter_columns()
        .map(|(symbol, column)| {
            ReturnDistribution::from_values(column, bins).map(|d| (symbol.to_string(), d))
        })
        .collect()
}

/// Linear interpolation between closest ranks over an ascending slice.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}
