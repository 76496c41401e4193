//! Criterion benchmarks for the analysis hot paths.
//!
//! 1. Single indicators over a long close series (SMA, EMA, RSI, MACD)
//! 2. Full indicator table assembly with the default configuration
//! 3. Returns and correlation over a multi-symbol table

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use stockscope_core::analytics::{compute_correlation, compute_returns};
use stockscope_core::domain::{Bar, PriceSeries, PriceTable};
use stockscope_core::indicators::{
    compute_indicators, macd_components, Ema, Indicator, IndicatorConfig, Macd, Rsi, Sma,
};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_closes(n: usize, phase: f64) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + (i as f64 * 0.1 + phase).sin() * 10.0 + i as f64 * 0.01)
        .collect()
}

fn make_series(n: usize) -> PriceSeries {
    let base = chrono::NaiveDate::from_ymd_opt(2000, 1, 3).unwrap();
    let bars = make_closes(n, 0.0)
        .into_iter()
        .enumerate()
        .map(|(i, close)| Bar {
            date: base + chrono::Duration::days(i as i64),
            open: close - 0.3,
            high: close + 1.5,
            low: close - 1.5,
            close,
            volume: 1_000_000,
            adj_close: close,
        })
        .collect();
    PriceSeries::new("BENCH", bars).unwrap()
}

fn make_table(n: usize, symbols: usize) -> PriceTable {
    let base = chrono::NaiveDate::from_ymd_opt(2000, 1, 3).unwrap();
    PriceTable::new(
        (0..n).map(|i| base + chrono::Duration::days(i as i64)).collect(),
        (0..symbols).map(|s| format!("S{s}")).collect(),
        (0..symbols).map(|s| make_closes(n, s as f64)).collect(),
    )
    .unwrap()
}

// ── 1. Single indicators ─────────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicator");
    let closes = make_closes(5_000, 0.0);

    let singles: Vec<Box<dyn Indicator>> = vec![
        Box::new(Sma::new(50)),
        Box::new(Ema::new(26)),
        Box::new(Rsi::new(14)),
        Box::new(Macd::histogram(12, 26, 9)),
    ];
    for ind in &singles {
        group.bench_with_input(BenchmarkId::from_parameter(ind.name()), &closes, |b, closes| {
            b.iter(|| ind.compute(black_box(closes)))
        });
    }
    group.bench_function("MACD_all_lines", |b| {
        b.iter(|| macd_components(black_box(&closes), 12, 26, 9))
    });
    group.finish();
}

// ── 2. Table assembly ────────────────────────────────────────────────

fn bench_indicator_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_indicators");
    let config = IndicatorConfig::default();
    for n in [500, 1_250, 5_000] {
        let series = make_series(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &series, |b, series| {
            b.iter(|| compute_indicators(black_box(series), &config))
        });
    }
    group.finish();
}

// ── 3. Returns and correlation ───────────────────────────────────────

fn bench_correlation(c: &mut Criterion) {
    let mut group = c.benchmark_group("returns_correlation");
    for symbols in [2, 5, 20] {
        let table = make_table(1_250, symbols);
        group.bench_with_input(BenchmarkId::from_parameter(symbols), &table, |b, table| {
            b.iter(|| {
                let returns = compute_returns(black_box(table)).unwrap();
                compute_correlation(&returns)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_indicators, bench_indicator_table, bench_correlation);
criterion_main!(benches);
