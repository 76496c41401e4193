//! Flat export of an analysis report: CSV, JSON, and Parquet.
//!
//! Files are named `{fingerprint12}_{artifact}.{ext}` inside the target
//! directory, so exports of different requests never collide. CSV and
//! Parquet carry the same artifacts: prices, returns, correlation (when
//! present), distribution summaries, one histogram per symbol and one
//! indicator table per symbol. Undefined cells are written as empty CSV
//! fields and Parquet nulls.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use polars::prelude::{Column, DataFrame, ParquetWriter, NamedFrom, Series};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use stockscope_core::analytics::{CorrelationMatrix, Histogram, ReturnDistribution};
use stockscope_core::domain::SymbolTable;
use stockscope_core::indicators::IndicatorTable;

use crate::pipeline::{AnalysisReport, SCHEMA_VERSION};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Csv,
    Json,
    Parquet,
}

impl std::str::FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "parquet" => Ok(Self::Parquet),
            other => bail!("unknown export format '{other}' (expected csv, json, or parquet)"),
        }
    }
}

// ─── Report-level export ────────────────────────────────────────────

/// Write every artifact of `report` in each requested format. Returns the
/// paths written, in creation order.
pub fn export_report(
    report: &AnalysisReport,
    dir: &Path,
    formats: &[ExportFormat],
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export directory {}", dir.display()))?;
    let prefix = report.fingerprint.short();
    let mut written = Vec::new();

    for format in formats {
        match format {
            ExportFormat::Json => {
                let path = dir.join(format!("{prefix}_report.json"));
                std::fs::write(&path, export_json(report)?)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                written.push(path);
            }
            ExportFormat::Csv => {
                let path = dir.join(format!("{prefix}_prices.csv"));
                write_table_csv(&path, &report.prices)?;
                written.push(path);

                let path = dir.join(format!("{prefix}_returns.csv"));
                write_table_csv(&path, &report.returns)?;
                written.push(path);

                if let Some(corr) = &report.correlation {
                    let path = dir.join(format!("{prefix}_correlation.csv"));
                    write_correlation_csv(&path, corr)?;
                    written.push(path);
                }

                let path = dir.join(format!("{prefix}_distributions.csv"));
                write_distributions_csv(&path, &report.distributions)?;
                written.push(path);

                for (symbol, dist) in &report.distributions {
                    let path = dir.join(format!("{prefix}_histogram_{symbol}.csv"));
                    write_histogram_csv(&path, &dist.histogram)?;
                    written.push(path);
                }

                for (symbol, table) in &report.indicators {
                    let path = dir.join(format!("{prefix}_indicators_{symbol}.csv"));
                    write_indicators_csv(&path, table)?;
                    written.push(path);
                }
            }
            ExportFormat::Parquet => {
                let path = dir.join(format!("{prefix}_prices.parquet"));
                write_table_parquet(&path, &report.prices)?;
                written.push(path);

                let path = dir.join(format!("{prefix}_returns.parquet"));
                write_table_parquet(&path, &report.returns)?;
                written.push(path);

                if let Some(corr) = &report.correlation {
                    let path = dir.join(format!("{prefix}_correlation.parquet"));
                    write_correlation_parquet(&path, corr)?;
                    written.push(path);
                }

                let path = dir.join(format!("{prefix}_distributions.parquet"));
                write_distributions_parquet(&path, &report.distributions)?;
                written.push(path);

                for (symbol, dist) in &report.distributions {
                    let path = dir.join(format!("{prefix}_histogram_{symbol}.parquet"));
                    write_histogram_parquet(&path, &dist.histogram)?;
                    written.push(path);
                }

                for (symbol, table) in &report.indicators {
                    let path = dir.join(format!("{prefix}_indicators_{symbol}.parquet"));
                    write_indicators_parquet(&path, table)?;
                    written.push(path);
                }
            }
        }
    }

    tracing::info!(dir = %dir.display(), files = written.len(), "exported report");
    Ok(written)
}

// ─── JSON ───────────────────────────────────────────────────────────

pub fn export_json(report: &AnalysisReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize report to JSON")
}

/// Read a JSON report back, rejecting newer schema versions.
pub fn import_json(json: &str) -> Result<AnalysisReport> {
    let report: AnalysisReport =
        serde_json::from_str(json).context("failed to deserialize report from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV ────────────────────────────────────────────────────────────

fn cell(v: f64) -> String {
    if v.is_nan() {
        String::new()
    } else {
        v.to_string()
    }
}

/// One row per label: the label, then one cell per column.
fn write_rows(
    path: &Path,
    header: Vec<String>,
    labels: &[String],
    columns: &[&[f64]],
) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    wtr.write_record(&header)?;
    for (i, label) in labels.iter().enumerate() {
        let mut record = Vec::with_capacity(columns.len() + 1);
        record.push(label.clone());
        record.extend(columns.iter().map(|c| cell(c[i])));
        wtr.write_record(&record)?;
    }
    wtr.flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}

fn date_labels(dates: &[NaiveDate]) -> Vec<String> {
    dates.iter().map(|d| d.to_string()).collect()
}

/// Columns: date, then one column per symbol.
pub fn write_table_csv(path: &Path, table: &SymbolTable) -> Result<()> {
    let mut header = vec!["date".to_string()];
    header.extend(table.symbols().iter().cloned());
    let columns: Vec<&[f64]> = table.iter_columns().map(|(_, c)| c).collect();
    write_rows(path, header, &date_labels(table.dates()), &columns)
}

/// Columns: date, close, MA_w..., RSI, MACD, MACD_signal, MACD_diff.
pub fn write_indicators_csv(path: &Path, table: &IndicatorTable) -> Result<()> {
    let mut header = vec!["date".to_string()];
    header.extend(table.column_names());
    write_rows(path, header, &date_labels(&table.dates), &table.columns())
}

/// Square matrix with a leading `symbol` column.
pub fn write_correlation_csv(path: &Path, matrix: &CorrelationMatrix) -> Result<()> {
    let mut header = vec!["symbol".to_string()];
    header.extend(matrix.symbols.iter().cloned());
    let columns: Vec<&[f64]> = matrix.values.iter().map(|row| row.as_slice()).collect();
    write_rows(path, header, &matrix.symbols, &columns)
}

const DISTRIBUTION_FIELDS: [&str; 8] =
    ["count", "mean", "std_dev", "min", "q1", "median", "q3", "max"];

/// Summary statistics as columns, one entry per symbol.
fn distribution_columns(distributions: &BTreeMap<String, ReturnDistribution>) -> Vec<Vec<f64>> {
    let pick = |f: fn(&ReturnDistribution) -> f64| -> Vec<f64> {
        distributions.values().map(f).collect()
    };
    vec![
        pick(|d| d.count as f64),
        pick(|d| d.mean),
        pick(|d| d.std_dev),
        pick(|d| d.min),
        pick(|d| d.q1),
        pick(|d| d.median),
        pick(|d| d.q3),
        pick(|d| d.max),
    ]
}

/// Columns: symbol, count, mean, std_dev, min, q1, median, q3, max.
pub fn write_distributions_csv(
    path: &Path,
    distributions: &BTreeMap<String, ReturnDistribution>,
) -> Result<()> {
    let mut header = vec!["symbol".to_string()];
    header.extend(DISTRIBUTION_FIELDS.iter().map(|f| f.to_string()));
    let symbols: Vec<String> = distributions.keys().cloned().collect();
    let columns = distribution_columns(distributions);
    let columns: Vec<&[f64]> = columns.iter().map(Vec::as_slice).collect();
    write_rows(path, header, &symbols, &columns)
}

/// Columns: bin, lower, upper, probability.
pub fn write_histogram_csv(path: &Path, histogram: &Histogram) -> Result<()> {
    let header = ["bin", "lower", "upper", "probability"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let bins: Vec<String> = (0..histogram.bins()).map(|i| i.to_string()).collect();
    let n = histogram.bins();
    let columns: [&[f64]; 3] = [
        &histogram.edges[..n],
        &histogram.edges[1..],
        &histogram.probabilities,
    ];
    write_rows(path, header, &bins, &columns)
}

// ─── Parquet ────────────────────────────────────────────────────────

/// A string label column followed by nullable float columns.
fn frame(
    label: &str,
    labels: Vec<String>,
    names: &[String],
    columns: &[&[f64]],
) -> Result<DataFrame> {
    let mut cols = vec![Column::from(Series::new(label.into(), labels))];
    for (name, values) in names.iter().zip(columns) {
        let values: Vec<Option<f64>> = values
            .iter()
            .map(|v| if v.is_nan() { None } else { Some(*v) })
            .collect();
        cols.push(Column::from(Series::new(name.as_str().into(), values)));
    }
    DataFrame::new(cols).context("failed to build dataframe")
}

fn write_parquet(path: &Path, mut df: DataFrame) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    ParquetWriter::new(&mut file)
        .finish(&mut df)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

pub fn write_table_parquet(path: &Path, table: &SymbolTable) -> Result<()> {
    let columns: Vec<&[f64]> = table.iter_columns().map(|(_, c)| c).collect();
    write_parquet(
        path,
        frame("date", date_labels(table.dates()), table.symbols(), &columns)?,
    )
}

pub fn write_indicators_parquet(path: &Path, table: &IndicatorTable) -> Result<()> {
    write_parquet(
        path,
        frame(
            "date",
            date_labels(&table.dates),
            &table.column_names(),
            &table.columns(),
        )?,
    )
}

pub fn write_correlation_parquet(path: &Path, matrix: &CorrelationMatrix) -> Result<()> {
    // symmetric, so row i doubles as column i
    let columns: Vec<&[f64]> = matrix.values.iter().map(|row| row.as_slice()).collect();
    write_parquet(
        path,
        frame("symbol", matrix.symbols.clone(), &matrix.symbols, &columns)?,
    )
}

pub fn write_distributions_parquet(
    path: &Path,
    distributions: &BTreeMap<String, ReturnDistribution>,
) -> Result<()> {
    let names: Vec<String> = DISTRIBUTION_FIELDS.iter().map(|f| f.to_string()).collect();
    let columns = distribution_columns(distributions);
    let columns: Vec<&[f64]> = columns.iter().map(Vec::as_slice).collect();
    write_parquet(
        path,
        frame("symbol", distributions.keys().cloned().collect(), &names, &columns)?,
    )
}

pub fn write_histogram_parquet(path: &Path, histogram: &Histogram) -> Result<()> {
    let n = histogram.bins();
    let names: Vec<String> = ["lower", "upper", "probability"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let columns: [&[f64]; 3] = [
        &histogram.edges[..n],
        &histogram.edges[1..],
        &histogram.probabilities,
    ];
    write_parquet(
        path,
        frame("bin", (0..n).map(|i| i.to_string()).collect(), &names, &columns)?,
    )
}
