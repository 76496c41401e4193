//! Export round trips through real files.

use chrono::NaiveDate;
use polars::prelude::{ParquetReader, SerReader};
use std::fs::File;
use stockscope_runner::export::{export_json, import_json};
use stockscope_runner::{export_report, run_analysis, AnalysisConfig, ExportFormat, LoadOptions};

fn report() -> stockscope_runner::AnalysisReport {
    let cfg = AnalysisConfig {
        symbols: vec!["AAPL".into(), "MSFT".into()],
        start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        end: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
        ..AnalysisConfig::default()
    };
    let opts = LoadOptions {
        offline: true,
        synthetic: true,
        data_dir: None,
    };
    run_analysis(&cfg, None, None, &opts).unwrap()
}

#[test]
fn csv_export_writes_every_table() {
    let report = report();
    let dir = tempfile::tempdir().unwrap();
    let files = export_report(&report, dir.path(), &[ExportFormat::Csv]).unwrap();

    // prices, returns, correlation, distributions, then per symbol a
    // histogram and an indicator table
    assert_eq!(files.len(), 8);
    let prefix = report.fingerprint.short();

    let mut rdr = csv::Reader::from_path(dir.path().join(format!("{prefix}_prices.csv"))).unwrap();
    assert_eq!(rdr.headers().unwrap(), vec!["date", "AAPL", "MSFT"]);
    assert_eq!(rdr.records().count(), report.prices.len());

    let mut rdr =
        csv::Reader::from_path(dir.path().join(format!("{prefix}_indicators_AAPL.csv"))).unwrap();
    assert_eq!(
        rdr.headers().unwrap(),
        vec!["date", "close", "MA_20", "MA_50", "MA_100", "RSI", "MACD", "MACD_signal", "MACD_diff"]
    );
    assert_eq!(rdr.records().count(), report.indicators["AAPL"].len());

    let mut rdr =
        csv::Reader::from_path(dir.path().join(format!("{prefix}_correlation.csv"))).unwrap();
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][1], "1");

    let mut rdr =
        csv::Reader::from_path(dir.path().join(format!("{prefix}_distributions.csv"))).unwrap();
    assert_eq!(
        rdr.headers().unwrap(),
        vec!["symbol", "count", "mean", "std_dev", "min", "q1", "median", "q3", "max"]
    );
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(&rows[1][0], "MSFT");
    assert_eq!(rows[1][1].parse::<usize>().unwrap(), report.distributions["MSFT"].count);

    let rdr =
        csv::Reader::from_path(dir.path().join(format!("{prefix}_histogram_AAPL.csv"))).unwrap();
    assert_eq!(rdr.into_records().count(), 100);
}

#[test]
fn csv_and_parquet_carry_the_same_artifacts() {
    let report = report();
    let dir = tempfile::tempdir().unwrap();
    let csv_files = export_report(&report, dir.path(), &[ExportFormat::Csv]).unwrap();
    let parquet_files = export_report(&report, dir.path(), &[ExportFormat::Parquet]).unwrap();

    let stems = |files: &[std::path::PathBuf]| -> Vec<String> {
        files
            .iter()
            .map(|p| p.file_stem().unwrap().to_string_lossy().into_owned())
            .collect()
    };
    assert_eq!(stems(&csv_files), stems(&parquet_files));

    let prefix = report.fingerprint.short();
    let corr = ParquetReader::new(
        File::open(dir.path().join(format!("{prefix}_correlation.parquet"))).unwrap(),
    )
    .finish()
    .unwrap();
    assert_eq!(corr.shape(), (2, 3));

    let dists = ParquetReader::new(
        File::open(dir.path().join(format!("{prefix}_distributions.parquet"))).unwrap(),
    )
    .finish()
    .unwrap();
    assert_eq!(dists.shape(), (2, 9));
}

#[test]
fn json_round_trip() {
    let report = report();
    let back = import_json(&export_json(&report).unwrap()).unwrap();
    assert_eq!(back.fingerprint, report.fingerprint);
    assert_eq!(back.prices.dates(), report.prices.dates());
    assert_eq!(back.prices.symbols(), report.prices.symbols());
    for (symbol, column) in report.returns.iter_columns() {
        let restored = back.returns.column(symbol).unwrap();
        assert!(column.iter().zip(restored).all(|(a, b)| (a - b).abs() < 1e-12));
    }
    assert_eq!(back.indicators["MSFT"].dates, report.indicators["MSFT"].dates);
}

#[test]
fn newer_schema_is_rejected() {
    let report = report();
    let mut value: serde_json::Value = serde_json::from_str(&export_json(&report).unwrap()).unwrap();
    value["schema_version"] = serde_json::json!(99);
    assert!(import_json(&value.to_string()).is_err());
}

#[test]
fn parquet_export_is_readable() {
    let report = report();
    let dir = tempfile::tempdir().unwrap();
    export_report(&report, dir.path(), &[ExportFormat::Parquet]).unwrap();

    let path = dir.path().join(format!("{}_returns.parquet", report.fingerprint.short()));
    let df = ParquetReader::new(File::open(path).unwrap()).finish().unwrap();
    assert_eq!(df.height(), report.returns.len());
    assert_eq!(df.width(), 3);
}
