//! CLI definition and dispatch.
//!
//! Results are printed to stdout; progress and diagnostics go through
//! `tracing` to stderr.

use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{run_backtest, BacktestConfig, BacktestResult};
use crate::domain::config_validation::{validate_config, AppConfig};
use crate::domain::error::TickerlensError;
use crate::domain::indicator_helpers::{compute_indicators, IndicatorParams};
use crate::domain::ohlcv::PriceField;
use crate::domain::price_table::{PriceTable, INDICATOR_COLUMNS};
use crate::domain::strategy::Strategy;
use crate::domain::summary::{IndicatorSnapshot, MarketSummary};
use crate::ports::data_port::DataPort;

const DEFAULT_LOG_FILTER: &str = "tickerlens=info";

#[derive(Parser, Debug)]
#[command(
    name = "tickerlens",
    version,
    about = "Technical indicators and strategy backtests for daily prices"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Backtest a strategy against buy-and-hold
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        /// Strategy id (sma-20-50, sma-50-200, rsi, macd) or label
        #[arg(long)]
        strategy: Option<String>,
        #[arg(long)]
        capital: Option<f64>,
    },
    /// Print the most recent rows of computed indicators
    Indicators {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long, default_value_t = 10)]
        rows: usize,
    },
    /// Print price headline figures and current indicator readings
    Summary {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
    /// List the available strategies
    Strategies,
    /// List symbols available in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Install the stderr subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    // a second call (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            config,
            symbol,
            strategy,
            capital,
        } => run_backtest_command(&config, symbol, strategy.as_deref(), capital),
        Command::Indicators {
            config,
            symbol,
            rows,
        } => run_indicators_command(&config, symbol, rows),
        Command::Summary { config, symbol } => run_summary_command(&config, symbol),
        Command::Strategies => Ok(format_strategies()),
        Command::ListSymbols { config } => run_list_symbols(&config),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<AppConfig, TickerlensError> {
    info!(path = %path.display(), "loading config");
    let adapter = FileConfigAdapter::from_file(path)?;
    AppConfig::from_port(&adapter)
}

/// Apply command-line overrides on top of the config file.
pub fn build_backtest_config(
    app: &AppConfig,
    strategy_override: Option<&str>,
    capital_override: Option<f64>,
) -> Result<(Strategy, BacktestConfig), TickerlensError> {
    let strategy = match strategy_override {
        Some(s) => s.parse()?,
        None => app.strategy,
    };

    let mut config = app.backtest.clone();
    if let Some(capital) = capital_override {
        if !(capital.is_finite() && capital > 0.0) {
            return Err(TickerlensError::invalid_input(format!(
                "capital must be positive, got {capital}"
            )));
        }
        config.initial_capital = capital;
    }
    Ok((strategy, config))
}

pub fn resolve_symbol(
    symbol_override: Option<String>,
    app: &AppConfig,
) -> Result<String, TickerlensError> {
    match symbol_override {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => app.require_symbol().map(str::to_string),
    }
}

/// Fetch bars for `symbol` and build a validated table. An empty result is `NoData`.
pub fn load_table(
    port: &dyn DataPort,
    symbol: &str,
    app: &AppConfig,
) -> Result<PriceTable, TickerlensError> {
    let bars = port.fetch_ohlcv(symbol, app.start_date, app.end_date)?;
    if bars.is_empty() {
        return Err(TickerlensError::NoData {
            symbol: symbol.to_string(),
        });
    }
    info!(symbol, bars = bars.len(), "loaded price history");
    PriceTable::new(symbol, bars)
}

pub fn run_backtest_pipeline(
    port: &dyn DataPort,
    symbol: &str,
    app: &AppConfig,
    strategy: Strategy,
    config: &BacktestConfig,
) -> Result<BacktestResult, TickerlensError> {
    let table = load_table(port, symbol, app)?;
    run_backtest(&table, strategy, config)
}

fn run_backtest_command(
    config_path: &Path,
    symbol: Option<String>,
    strategy: Option<&str>,
    capital: Option<f64>,
) -> Result<String, TickerlensError> {
    let app = load_config(config_path)?;
    let symbol = resolve_symbol(symbol, &app)?;
    let (strategy, config) = build_backtest_config(&app, strategy, capital)?;
    let port = CsvAdapter::new(PathBuf::from(&app.data_dir));

    let result = run_backtest_pipeline(&port, &symbol, &app, strategy, &config)?;
    Ok(format_backtest_report(&symbol, &result))
}

fn run_indicators_command(
    config_path: &Path,
    symbol: Option<String>,
    rows: usize,
) -> Result<String, TickerlensError> {
    let app = load_config(config_path)?;
    let symbol = resolve_symbol(symbol, &app)?;
    let port = CsvAdapter::new(PathBuf::from(&app.data_dir));

    let table = load_table(&port, &symbol, &app)?;
    let params = IndicatorParams::with_zero_loss(app.backtest.rsi_zero_loss);
    let augmented = compute_indicators(&table, app.backtest.price_field, &params)?;
    format_indicator_rows(&augmented, app.backtest.price_field, rows)
}

fn run_summary_command(
    config_path: &Path,
    symbol: Option<String>,
) -> Result<String, TickerlensError> {
    let app = load_config(config_path)?;
    let symbol = resolve_symbol(symbol, &app)?;
    let port = CsvAdapter::new(PathBuf::from(&app.data_dir));

    let table = load_table(&port, &symbol, &app)?;
    let field = app.backtest.price_field;
    let params = IndicatorParams::with_zero_loss(app.backtest.rsi_zero_loss);
    let augmented = compute_indicators(&table, field, &params)?;

    let summary = MarketSummary::compute(&augmented, field)?;
    let snapshot = IndicatorSnapshot::latest(&augmented, field)?;
    Ok(format_summary(&summary, &snapshot))
}

fn run_list_symbols(config_path: &Path) -> Result<String, TickerlensError> {
    let app = load_config(config_path)?;
    let port = CsvAdapter::new(PathBuf::from(&app.data_dir));
    let symbols = port.list_symbols()?;
    info!(count = symbols.len(), dir = %app.data_dir, "listed symbols");

    let mut out = String::new();
    for symbol in symbols {
        let _ = writeln!(out, "{symbol}");
    }
    Ok(out)
}

fn run_validate(config_path: &Path) -> Result<String, TickerlensError> {
    let adapter = FileConfigAdapter::from_file(config_path)?;
    let app = validate_config(&adapter)?;

    let mut out = String::new();
    let _ = writeln!(out, "Configuration is valid");
    let _ = writeln!(out, "  data directory: {}", app.data_dir);
    let _ = writeln!(out, "  symbol:         {}", app.symbol.unwrap_or_default());
    let _ = writeln!(out, "  price field:    {}", app.backtest.price_field);
    let _ = writeln!(out, "  strategy:       {}", app.strategy);
    let _ = writeln!(out, "  capital:        {:.2}", app.backtest.initial_capital);
    let _ = writeln!(out, "  rsi zero loss:  {}", app.backtest.rsi_zero_loss);
    Ok(out)
}

pub fn format_strategies() -> String {
    let mut out = String::new();
    for strategy in Strategy::ALL {
        let _ = writeln!(
            out,
            "{:<12} {:<24} min bars {}",
            strategy.id(),
            strategy.to_string(),
            strategy.min_bars()
        );
    }
    out
}

pub fn format_backtest_report(symbol: &str, result: &BacktestResult) -> String {
    let s = &result.strategy_metrics;
    let m = &result.market_metrics;
    let mut out = String::new();

    let _ = writeln!(out, "{symbol}: {}", result.strategy);
    if let (Some(first), Some(last)) = (result.dates.first(), result.dates.last()) {
        let _ = writeln!(
            out,
            "Period: {first} to {last} ({} rows)",
            result.dates.len()
        );
    }
    let _ = writeln!(out, "{:<18}{:>14}{:>14}", "", "Strategy", "Buy & Hold");
    let _ = writeln!(
        out,
        "{:<18}{:>14.2}{:>14.2}",
        "Total return %", s.total_return_pct, m.total_return_pct
    );
    let _ = writeln!(
        out,
        "{:<18}{:>14.2}{:>14.2}",
        "Final capital", s.final_capital, m.final_capital
    );
    let _ = writeln!(
        out,
        "{:<18}{:>14.2}{:>14.2}",
        "Sharpe ratio", s.sharpe_ratio, m.sharpe_ratio
    );
    let _ = writeln!(
        out,
        "{:<18}{:>14.2}{:>14.2}",
        "Max drawdown %", s.max_drawdown_pct, m.max_drawdown_pct
    );
    let _ = writeln!(
        out,
        "Buy signals: {}  Sell signals: {}",
        result.buy_signals.len(),
        result.sell_signals.len()
    );
    let verdict = if result.outperformed() {
        "outperformed"
    } else {
        "did not outperform"
    };
    let _ = writeln!(out, "Strategy {verdict} buy-and-hold");
    out
}

fn cell(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

/// The last `rows` rows of the price and the canonical indicator columns.
pub fn format_indicator_rows(
    table: &PriceTable,
    field: PriceField,
    rows: usize,
) -> Result<String, TickerlensError> {
    let prices = table.prices(field)?;
    let columns: Vec<Vec<Option<f64>>> = INDICATOR_COLUMNS
        .iter()
        .map(|name| {
            table.column(name).ok_or_else(|| {
                TickerlensError::invalid_input(format!("indicator column {name} not computed"))
            })
        })
        .collect::<Result<_, _>>()?;

    let mut out = String::new();
    let _ = write!(out, "{:<12}{:>12}", "Date", field.to_string());
    for name in INDICATOR_COLUMNS {
        let _ = write!(out, "{name:>12}");
    }
    out.push('\n');

    let start = table.len().saturating_sub(rows);
    for (i, bar) in table.bars().iter().enumerate().skip(start) {
        let _ = write!(out, "{:<12}{:>12.2}", bar.date, prices[i]);
        for column in &columns {
            let _ = write!(out, "{:>12}", cell(column[i]));
        }
        out.push('\n');
    }
    Ok(out)
}

pub fn format_summary(summary: &MarketSummary, snapshot: &IndicatorSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({} bars, {} to {})",
        summary.symbol, summary.bars, summary.first_date, summary.last_date
    );
    let _ = writeln!(
        out,
        "Last {}: {:.2} ({:+.2}, {:+.2}%)",
        summary.field, summary.last_price, summary.change, summary.change_pct
    );
    let _ = writeln!(
        out,
        "52-week range: {:.2} - {:.2} ({:+.2}% from high, {:+.2}% from low)",
        summary.low_52w, summary.high_52w, summary.pct_from_high, summary.pct_from_low
    );
    let _ = writeln!(
        out,
        "Avg volume (20): {}",
        summary
            .avg_volume_20
            .map_or_else(|| "n/a".to_string(), |v| format!("{v:.0}"))
    );

    match snapshot.rsi {
        Some(rsi) => {
            let _ = writeln!(out, "RSI(14): {:.2} {}", rsi.value, rsi.zone);
        }
        None => {
            let _ = writeln!(out, "RSI(14): n/a");
        }
    }
    match snapshot.macd {
        Some(macd) => {
            let _ = writeln!(
                out,
                "MACD: {:.4} signal {:.4} hist {:.4} {}",
                macd.line, macd.signal, macd.histogram, macd.trend
            );
        }
        None => {
            let _ = writeln!(out, "MACD: n/a");
        }
    }
    match snapshot.bollinger {
        Some(bb) => {
            let _ = writeln!(
                out,
                "Bollinger: {:.2} / {:.2} / {:.2}, position {:.1}% {}",
                bb.lower, bb.middle, bb.upper, bb.position_pct, bb.zone
            );
        }
        None => {
            let _ = writeln!(out, "Bollinger: n/a");
        }
    }
    out
}
