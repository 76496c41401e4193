//! Flat CSV price files: one `{SYMBOL}.csv` per symbol in a directory.
//!
//! Columns: `date,open,high,low,close,volume,adj_close`. Empty cells read
//! back as NaN. This is the format `stockscope fetch` exports, so a previous
//! dump can be re-analysed offline.

use super::provider::{DataError, DataProvider, DataSource, FetchResult};
use crate::domain::{Bar, PriceSeries};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<u64>,
    adj_close: Option<f64>,
}

impl From<CsvRow> for Bar {
    fn from(row: CsvRow) -> Self {
        Bar {
            date: row.date,
            open: row.open.unwrap_or(f64::NAN),
            high: row.high.unwrap_or(f64::NAN),
            low: row.low.unwrap_or(f64::NAN),
            close: row.close.unwrap_or(f64::NAN),
            volume: row.volume.unwrap_or(0),
            adj_close: row.adj_close.unwrap_or(f64::NAN),
        }
    }
}

fn defined(v: f64) -> Option<f64> {
    (!v.is_nan()).then_some(v)
}

impl From<&Bar> for CsvRow {
    fn from(bar: &Bar) -> Self {
        CsvRow {
            date: bar.date,
            open: defined(bar.open),
            high: defined(bar.high),
            low: defined(bar.low),
            close: defined(bar.close),
            volume: Some(bar.volume),
            adj_close: defined(bar.adj_close),
        }
    }
}

/// Reads `{dir}/{SYMBOL}.csv` files.
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        let bars: Vec<Bar> = read_bars(&path)?
            .into_iter()
            .filter(|b| b.date >= start && b.date <= end)
            .collect();
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::CsvImport,
        })
    }

    fn is_available(&self) -> bool {
        self.dir.is_dir()
    }
}

/// Read every bar from a CSV price file, in file order.
pub fn read_bars(path: &Path) -> Result<Vec<Bar>, DataError> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| DataError::Csv(format!("open {}: {e}", path.display())))?;
    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(i, row)| {
            row.map(Bar::from)
                .map_err(|e| DataError::Csv(format!("{} row {}: {e}", path.display(), i + 1)))
        })
        .collect()
}

/// Write a price series in the flat CSV layout.
pub fn write_series<W: Write>(writer: W, series: &PriceSeries) -> Result<(), DataError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for bar in series.bars() {
        wtr.serialize(CsvRow::from(bar))
            .map_err(|e| DataError::Csv(format!("write {}: {e}", series.symbol())))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write a price series to `{dir}/{SYMBOL}.csv`, creating the directory.
pub fn write_series_file(dir: &Path, series: &PriceSeries) -> Result<PathBuf, DataError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.csv", series.symbol()));
    let file = std::fs::File::create(&path)?;
    write_series(file, series)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_series() -> PriceSeries {
        let bars = vec![
            Bar {
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                open: 100.0,
                high: 102.0,
                low: 99.0,
                close: 101.0,
                volume: 1000,
                adj_close: 101.0,
            },
            Bar {
                date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                open: 101.0,
                high: 103.0,
                low: 100.0,
                close: f64::NAN,
                volume: 1100,
                adj_close: f64::NAN,
            },
        ];
        PriceSeries::new("SPY", bars).unwrap()
    }

    #[test]
    fn written_file_reads_back_through_provider() {
        let dir = tempfile::tempdir().unwrap();
        write_series_file(dir.path(), &sample_series()).unwrap();

        let provider = CsvProvider::new(dir.path());
        assert!(provider.is_available());
        let fetched = provider
            .fetch(
                "SPY",
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            )
            .unwrap();

        assert_eq!(fetched.source, DataSource::CsvImport);
        assert_eq!(fetched.bars.len(), 2);
        assert_eq!(fetched.bars[0].close, 101.0);
        assert!(fetched.bars[1].close.is_nan());
    }

    #[test]
    fn fetch_trims_to_range() {
        let dir = tempfile::tempdir().unwrap();
        write_series_file(dir.path(), &sample_series()).unwrap();
        let provider = CsvProvider::new(dir.path());
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let fetched = provider.fetch("SPY", day, day).unwrap();
        assert_eq!(fetched.bars.len(), 1);
    }

    #[test]
    fn missing_file_is_symbol_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let provider = CsvProvider::new(dir.path());
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert!(matches!(
            provider.fetch("QQQ", day, day),
            Err(DataError::SymbolNotFound { .. })
        ));
    }

    #[test]
    fn malformed_row_reports_position() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("BAD.csv");
        std::fs::write(
            &path,
            "date,open,high,low,close,volume,adj_close\nnot-a-date,1,1,1,1,1,1\n",
        )
        .unwrap();
        let err = read_bars(&path).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }
}
