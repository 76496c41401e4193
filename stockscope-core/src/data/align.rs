//! Multi-symbol date alignment into a single close-price table.
//!
//! Calendars differ across exchanges and listings, so alignment is an
//! explicit policy. Missing prices are never forward-filled.

use crate::domain::{PriceSeries, PriceTable};
use crate::error::AnalysisError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// How per-symbol trading calendars are reconciled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentPolicy {
    /// Keep only dates on which every symbol has a defined close.
    #[default]
    Inner,
    /// Keep every date any symbol traded; missing closes stay NaN.
    Union,
}

/// Align the closes of several series onto one date axis.
///
/// Columns appear in iteration order. Fails with `AlignmentFailure` when no
/// series is given or the policy leaves no dates.
pub fn align_closes<'a>(
    series: impl IntoIterator<Item = &'a PriceSeries>,
    policy: AlignmentPolicy,
) -> Result<PriceTable, AnalysisError> {
    let series: Vec<&PriceSeries> = series.into_iter().collect();
    if series.is_empty() {
        return Err(AnalysisError::AlignmentFailure("no series to align".into()));
    }

    // date -> close per symbol, void closes excluded
    let lookups: Vec<HashMap<NaiveDate, f64>> = series
        .iter()
        .map(|s| {
            s.bars()
                .iter()
                .filter(|b| b.has_close())
                .map(|b| (b.date, b.close))
                .collect()
        })
        .collect();

    let dates: Vec<NaiveDate> = match policy {
        AlignmentPolicy::Union => lookups
            .iter()
            .flat_map(|m| m.keys().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
        AlignmentPolicy::Inner => {
            let mut common: BTreeSet<NaiveDate> = lookups[0].keys().copied().collect();
            for lookup in &lookups[1..] {
                common.retain(|d| lookup.contains_key(d));
            }
            common.into_iter().collect()
        }
    };

    if dates.is_empty() {
        let names: Vec<&str> = series.iter().map(|s| s.symbol()).collect();
        return Err(AnalysisError::AlignmentFailure(format!(
            "no common dates across [{}] under {policy:?} alignment",
            names.join(", ")
        )));
    }

    let dropped = series.iter().map(|s| s.len()).max().unwrap_or(0).saturating_sub(dates.len());
    if policy == AlignmentPolicy::Inner && dropped > 0 {
        tracing::debug!(dropped, kept = dates.len(), "inner alignment dropped unshared dates");
    }

    let symbols = series.iter().map(|s| s.symbol().to_string()).collect();
    let columns = lookups
        .iter()
        .map(|lookup| {
            dates
                .iter()
                .map(|d| lookup.get(d).copied().unwrap_or(f64::NAN))
                .collect()
        })
        .collect();

    PriceTable::new(dates, symbols, columns)
}
