//! StockScope CLI: fetch prices, run analyses, inspect indicators, manage the watchlist.
//!
//! Commands:
//! - `fetch`: download daily prices and store them as `{dir}/{SYMBOL}.csv`
//! - `analyze`: returns, correlation, distributions and indicators for a symbol set
//! - `indicators`: indicator table for a single symbol
//! - `watchlist`: show or initialise the watchlist file
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `info`).

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stockscope_core::data::csv_import::write_series_file;
use stockscope_core::data::{
    fetch_prices, AlignmentPolicy, CircuitBreaker, DataProvider, FetchProgress,
    SyntheticProvider, TracingProgress, Watchlist, YahooProvider,
};
use stockscope_core::indicators::{compute_indicators, IndicatorTable};
use stockscope_runner::{
    export_report, load_prices, run_analysis, AnalysisConfig, AnalysisReport, ExportFormat,
    LoadOptions,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "stockscope",
    about = "StockScope: stock price statistics and technical indicators"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Request and data-source flags shared by the analysis commands.
#[derive(Args)]
struct RequestArgs {
    /// Path to a TOML config file. Flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start date (YYYY-MM-DD).
    #[arg(long)]
    start: Option<String>,

    /// End date (YYYY-MM-DD).
    #[arg(long)]
    end: Option<String>,

    /// Offline mode: no network access.
    #[arg(long, default_value_t = false)]
    offline: bool,

    /// Use synthetic prices when no other source has a symbol.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Directory of per-symbol CSV files, tried after the live provider.
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Download daily prices and save them as CSV.
    Fetch {
        /// Symbols to fetch (e.g., AAPL MSFT).
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Start date (YYYY-MM-DD). Defaults to 2020-01-01.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to 2024-12-31.
        #[arg(long)]
        end: Option<String>,

        /// Generate synthetic prices instead of downloading.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Output directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
    /// Analyse a set of symbols.
    Analyze {
        /// Symbols to analyse. Defaults to the config file or the watchlist selection.
        symbols: Vec<String>,

        #[command(flatten)]
        request: RequestArgs,

        /// Date alignment across symbols: inner or union.
        #[arg(long)]
        alignment: Option<String>,

        /// Write the report here.
        #[arg(long)]
        export_dir: Option<PathBuf>,

        /// Export formats (csv, json, parquet). Repeatable.
        #[arg(long = "format", default_value = "csv")]
        formats: Vec<String>,
    },
    /// Show the indicator table for one symbol.
    Indicators {
        symbol: String,

        #[command(flatten)]
        request: RequestArgs,

        /// Number of most recent rows to print.
        #[arg(long, default_value_t = 10)]
        tail: usize,
    },
    /// Show the watchlist, or write the default one.
    Watchlist {
        /// Watchlist TOML file.
        #[arg(long, default_value = "watchlist.toml")]
        file: PathBuf,

        /// Write the default watchlist to `--file` (refuses to overwrite).
        #[arg(long, default_value_t = false)]
        init: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            symbols,
            start,
            end,
            synthetic,
            data_dir,
        } => run_fetch(symbols, start, end, synthetic, data_dir),
        Commands::Analyze {
            symbols,
            request,
            alignment,
            export_dir,
            formats,
        } => run_analyze(symbols, request, alignment, export_dir, formats),
        Commands::Indicators {
            symbol,
            request,
            tail,
        } => run_indicators(symbol, request, tail),
        Commands::Watchlist { file, init } => run_watchlist(&file, init),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
}

fn yahoo_provider() -> Result<YahooProvider> {
    let circuit_breaker = Arc::new(CircuitBreaker::default_provider());
    Ok(YahooProvider::new(circuit_breaker)?)
}

/// Config file (or defaults) with command-line overrides applied.
fn build_config(symbols: Vec<String>, request: &RequestArgs) -> Result<AnalysisConfig> {
    let mut config = match &request.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };
    if !symbols.is_empty() {
        config.symbols = symbols;
    }
    if let Some(s) = &request.start {
        config.start = parse_date(s)?;
    }
    if let Some(s) = &request.end {
        config.end = parse_date(s)?;
    }
    config.validate()?;
    Ok(config)
}

fn load_options(request: &RequestArgs) -> LoadOptions {
    LoadOptions {
        offline: request.offline,
        synthetic: request.synthetic,
        data_dir: request.data_dir.clone(),
    }
}

fn run_fetch(
    symbols: Vec<String>,
    start: Option<String>,
    end: Option<String>,
    synthetic: bool,
    data_dir: PathBuf,
) -> Result<()> {
    let defaults = AnalysisConfig::default();
    let start = start.as_deref().map(parse_date).transpose()?.unwrap_or(defaults.start);
    let end = end.as_deref().map(parse_date).transpose()?.unwrap_or(defaults.end);

    let provider: Box<dyn DataProvider> = if synthetic {
        Box::new(SyntheticProvider::default())
    } else {
        Box::new(yahoo_provider()?)
    };

    let progress: &dyn FetchProgress = &TracingProgress;
    let prices = fetch_prices(provider.as_ref(), &symbols, start, end, Some(progress))?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;
    tracing::info!(
        symbols = prices.len(),
        dir = %data_dir.display(),
        "writing price files"
    );
    for series in prices.values() {
        let path = write_series_file(&data_dir, series)?;
        let span = match (series.first_date(), series.last_date()) {
            (Some(first), Some(last)) => format!("{first} to {last}"),
            _ => String::new(),
        };
        println!(
            "{:<8} {:>6} bars  {:<25} -> {}",
            series.symbol(),
            series.len(),
            span,
            path.display()
        );
    }
    Ok(())
}

fn run_analyze(
    symbols: Vec<String>,
    request: RequestArgs,
    alignment: Option<String>,
    export_dir: Option<PathBuf>,
    formats: Vec<String>,
) -> Result<()> {
    let mut config = build_config(symbols, &request)?;
    if let Some(a) = alignment {
        config.alignment = match a.to_ascii_lowercase().as_str() {
            "inner" => AlignmentPolicy::Inner,
            "union" => AlignmentPolicy::Union,
            other => bail!("unknown alignment '{other}' (expected inner or union)"),
        };
    }
    let formats: Vec<ExportFormat> = formats
        .iter()
        .map(|f| f.parse())
        .collect::<Result<_>>()?;

    let provider = if request.offline { None } else { Some(yahoo_provider()?) };
    let progress: &dyn FetchProgress = &TracingProgress;
    let report = run_analysis(
        &config,
        provider.as_ref().map(|p| p as &dyn DataProvider),
        Some(progress),
        &load_options(&request),
    )?;

    if report.has_synthetic {
        tracing::warn!(
            fingerprint = report.fingerprint.short(),
            "report includes synthetic series"
        );
    }
    print_report(&report);

    if let Some(dir) = export_dir {
        let files = export_report(&report, &dir, &formats)?;
        println!();
        println!("Exported {} files to {}", files.len(), dir.display());
    }
    Ok(())
}

fn run_indicators(symbol: String, request: RequestArgs, tail: usize) -> Result<()> {
    let config = build_config(vec![symbol], &request)?;
    let provider = if request.offline { None } else { Some(yahoo_provider()?) };
    let progress: &dyn FetchProgress = &TracingProgress;
    let loaded = load_prices(
        &config.symbols,
        config.start,
        config.end,
        provider.as_ref().map(|p| p as &dyn DataProvider),
        Some(progress),
        &load_options(&request),
    )?;

    for series in loaded.series.values() {
        let table = compute_indicators(series, &config.indicators)?;
        print_indicator_tail(&table, tail);
    }
    Ok(())
}

fn run_watchlist(file: &Path, init: bool) -> Result<()> {
    if init {
        if file.exists() {
            bail!("{} already exists", file.display());
        }
        let text = Watchlist::default_tech()
            .to_toml()
            .map_err(anyhow::Error::msg)?;
        std::fs::write(file, text).with_context(|| format!("failed to write {}", file.display()))?;
        println!("Wrote default watchlist to {}", file.display());
        return Ok(());
    }

    let list = if file.exists() {
        Watchlist::from_file(file).map_err(anyhow::Error::msg)?
    } else {
        println!("{} not found; showing the default watchlist", file.display());
        Watchlist::default_tech()
    };
    for symbol in &list.symbols {
        let mark = if list.selected.contains(symbol) { "*" } else { " " };
        println!("{mark} {symbol}");
    }
    Ok(())
}

// ─── Output ─────────────────────────────────────────────────────────

fn print_report(report: &AnalysisReport) {
    println!(
        "Request {}  {} to {}  ({} price rows, {} return rows)",
        report.fingerprint.short(),
        report.start,
        report.end,
        report.prices.len(),
        report.returns.len()
    );
    if report.has_synthetic {
        println!("WARNING: some series are synthetic, not market data");
    }

    println!();
    println!(
        "{:<8} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "Symbol", "Count", "Mean", "Std", "Min", "Median", "Max"
    );
    println!("{}", "-".repeat(70));
    for (symbol, d) in &report.distributions {
        println!(
            "{:<8} {:>6} {:>10.5} {:>10.5} {:>10.5} {:>10.5} {:>10.5}",
            symbol, d.count, d.mean, d.std_dev, d.min, d.median, d.max
        );
    }

    if let Some(corr) = &report.correlation {
        let corr = corr.rounded(2);
        println!();
        println!("Correlation of returns");
        print!("{:<8}", "");
        for s in &corr.symbols {
            print!(" {s:>7}");
        }
        println!();
        for (s, row) in corr.symbols.iter().zip(&corr.values) {
            print!("{s:<8}");
            for v in row {
                print!(" {v:>7.2}");
            }
            println!();
        }
    }

    for table in report.indicators.values() {
        println!();
        print_indicator_tail(table, 1);
    }
}

fn print_indicator_tail(table: &IndicatorTable, tail: usize) {
    let names = table.column_names();
    let columns = table.columns();
    println!("{} ({} rows after warm-up)", table.symbol, table.len());
    print!("{:<12}", "date");
    for n in &names {
        print!(" {n:>11}");
    }
    println!();
    for i in table.len().saturating_sub(tail)..table.len() {
        print!("{:<12}", table.dates[i]);
        for c in &columns {
            print!(" {:>11.4}", c[i]);
        }
        println!();
    }
}
