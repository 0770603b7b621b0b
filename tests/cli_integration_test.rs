//! CLI integration tests for command orchestration.
//!
//! Tests cover:
//! - Config loading with overrides (build_backtest_config, resolve_symbol)
//! - Pipeline with MockDataPort
//! - Report formatting
//! - Whole commands against real INI and CSV files on disk

mod common;

use clap::Parser;
use common::*;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use tickerlens::adapters::file_config_adapter::FileConfigAdapter;
use tickerlens::cli::{self, Cli};
use tickerlens::domain::config_validation::AppConfig;
use tickerlens::domain::error::TickerlensError;
use tickerlens::domain::indicator_helpers::{compute_indicators, IndicatorParams};
use tickerlens::domain::ohlcv::PriceField;
use tickerlens::domain::strategy::Strategy;
use tickerlens::domain::summary::{IndicatorSnapshot, MarketSummary};

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn app_config(ini: &str) -> AppConfig {
    let adapter = FileConfigAdapter::from_string(ini).unwrap();
    AppConfig::from_port(&adapter).unwrap()
}

fn assert_exit(code: ExitCode, expected: u8) {
    assert_eq!(
        format!("{code:?}"),
        format!("{:?}", ExitCode::from(expected)),
        "exit code"
    );
}

const VALID_INI: &str = r#"
[data]
directory = ./data

[analysis]
symbol = AAPL
price_field = close

[backtest]
initial_capital = 10000
strategy = rsi
"#;

mod config_loading {
    use super::*;

    #[test]
    fn build_backtest_config_uses_file_values() {
        let app = app_config(VALID_INI);
        let (strategy, config) = cli::build_backtest_config(&app, None, None).unwrap();

        assert_eq!(strategy, Strategy::RsiMeanReversion);
        assert!((config.initial_capital - 10_000.0).abs() < f64::EPSILON);
        assert_eq!(config.price_field, PriceField::Close);
    }

    #[test]
    fn build_backtest_config_applies_overrides() {
        let app = app_config(VALID_INI);
        let (strategy, config) =
            cli::build_backtest_config(&app, Some("macd"), Some(2_500.0)).unwrap();

        assert_eq!(strategy, Strategy::MacdCrossover);
        assert!((config.initial_capital - 2_500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn build_backtest_config_rejects_bad_overrides() {
        let app = app_config(VALID_INI);

        let err = cli::build_backtest_config(&app, Some("momentum"), None).unwrap_err();
        assert!(matches!(err, TickerlensError::InvalidInput { .. }));

        let err = cli::build_backtest_config(&app, None, Some(-5.0)).unwrap_err();
        assert!(matches!(err, TickerlensError::InvalidInput { .. }));
    }

    #[test]
    fn resolve_symbol_prefers_override() {
        let app = app_config(VALID_INI);
        assert_eq!(cli::resolve_symbol(Some("MSFT".into()), &app).unwrap(), "MSFT");
        assert_eq!(cli::resolve_symbol(Some("  ".into()), &app).unwrap(), "AAPL");
        assert_eq!(cli::resolve_symbol(None, &app).unwrap(), "AAPL");
    }

    #[test]
    fn resolve_symbol_missing_everywhere() {
        let app = app_config("[data]\ndirectory = ./data\n");
        let err = cli::resolve_symbol(None, &app).unwrap_err();
        assert!(matches!(err, TickerlensError::ConfigMissing { key, .. } if key == "symbol"));
    }
}

mod pipeline_mock {
    use super::*;

    #[test]
    fn pipeline_runs_backtest_over_port_data() {
        let port = MockDataPort::new().with_bars("AAPL", generate_bars(&wave(120)));
        let app = app_config(VALID_INI);
        let (strategy, config) = cli::build_backtest_config(&app, None, None).unwrap();

        let result = cli::run_backtest_pipeline(&port, "AAPL", &app, strategy, &config).unwrap();
        assert_eq!(result.strategy, Strategy::RsiMeanReversion);
        assert_eq!(result.dates[0], day(14));
    }

    #[test]
    fn pipeline_respects_date_range() {
        let port = MockDataPort::new().with_bars("AAPL", generate_bars(&wave(120)));
        let app = app_config(
            "[data]\ndirectory = ./data\n[analysis]\nsymbol = AAPL\nstart_date = 2023-02-01\n",
        );

        let table = cli::load_table(&port, "AAPL", &app).unwrap();
        assert_eq!(table.bars()[0].date, date(2023, 2, 1));
    }

    #[test]
    fn pipeline_unknown_symbol_is_no_data() {
        let port = MockDataPort::new();
        let app = app_config(VALID_INI);
        let err = cli::load_table(&port, "NOPE", &app).unwrap_err();
        assert!(matches!(err, TickerlensError::NoData { symbol } if symbol == "NOPE"));
    }

    #[test]
    fn pipeline_port_error_propagates() {
        let port = MockDataPort::new().with_error("AAPL", "provider unavailable");
        let app = app_config(VALID_INI);
        let err = cli::load_table(&port, "AAPL", &app).unwrap_err();
        assert!(matches!(err, TickerlensError::Data { .. }));
    }

    #[test]
    fn pipeline_short_history_is_insufficient() {
        let port = MockDataPort::new().with_bars("AAPL", generate_bars(&wave(100)));
        let app = app_config(VALID_INI);
        let (_, config) = cli::build_backtest_config(&app, None, None).unwrap();

        let err = cli::run_backtest_pipeline(&port, "AAPL", &app, Strategy::SmaCrossoverLong, &config)
            .unwrap_err();
        assert!(matches!(err, TickerlensError::InsufficientHistory { .. }));
    }
}

mod formatting {
    use super::*;

    #[test]
    fn strategies_listing_has_every_id() {
        let out = cli::format_strategies();
        for strategy in Strategy::ALL {
            assert!(out.contains(strategy.id()));
            assert!(out.contains(&strategy.to_string()));
        }
        assert_eq!(out.lines().count(), 4);
    }

    #[test]
    fn backtest_report_lists_both_legs() {
        let table = make_table(&wave(120));
        let result = tickerlens::domain::backtest::run_backtest(
            &table,
            Strategy::MacdCrossover,
            &Default::default(),
        )
        .unwrap();
        let out = cli::format_backtest_report("TEST", &result);

        assert!(out.starts_with("TEST: MACD Crossover"));
        assert!(out.contains("Buy & Hold"));
        assert!(out.contains("Sharpe ratio"));
        assert!(out.contains(&format!("Buy signals: {}", result.buy_signals.len())));
    }

    #[test]
    fn indicator_rows_show_placeholders_for_warmup() {
        let table = make_table(&wave(30));
        let augmented =
            compute_indicators(&table, PriceField::Close, &IndicatorParams::default()).unwrap();

        let out = cli::format_indicator_rows(&augmented, PriceField::Close, 30).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 31);
        assert!(lines[0].contains("BB_Upper"));
        // RSI and the three bands are still warming up on the first row
        let placeholders = lines[1].split_whitespace().filter(|c| *c == "-").count();
        assert_eq!(placeholders, 4);

        let out = cli::format_indicator_rows(&augmented, PriceField::Close, 5).unwrap();
        assert_eq!(out.lines().count(), 6);
    }

    #[test]
    fn indicator_rows_require_computed_columns() {
        let err = cli::format_indicator_rows(&make_table(&wave(30)), PriceField::Close, 5)
            .unwrap_err();
        assert!(matches!(err, TickerlensError::InvalidInput { .. }));
    }

    #[test]
    fn summary_mentions_zones() {
        let augmented = compute_indicators(
            &make_table(&rising(60, 100.0, 1.0)),
            PriceField::Close,
            &IndicatorParams::default(),
        )
        .unwrap();
        let summary = MarketSummary::compute(&augmented, PriceField::Close).unwrap();
        let snapshot = IndicatorSnapshot::latest(&augmented, PriceField::Close).unwrap();

        let out = cli::format_summary(&summary, &snapshot);
        assert!(out.contains("Overbought"));
        assert!(out.contains("Bullish"));
        assert!(out.contains("Avg volume (20): n/a"));
    }
}

mod commands_on_disk {
    use super::*;

    fn write_csv(dir: &Path, symbol: &str, n: usize) {
        let mut content = String::from("Date,Open,High,Low,Close,Volume\n");
        for (i, price) in wave(n).iter().enumerate() {
            content.push_str(&format!(
                "{},{:.4},{:.4},{:.4},{:.4},{}\n",
                day(i),
                price,
                price + 1.0,
                price - 1.0,
                price,
                1000 + i
            ));
        }
        fs::write(dir.join(format!("{symbol}.csv")), content).unwrap();
    }

    fn ini_for(dir: &Path, extra: &str) -> tempfile::NamedTempFile {
        write_temp_ini(&format!(
            "[data]\ndirectory = {}\n\n[analysis]\nsymbol = AAPL\n{extra}",
            dir.display()
        ))
    }

    fn run_args(args: &[&str]) -> ExitCode {
        cli::run(Cli::try_parse_from(args).unwrap())
    }

    #[test]
    fn backtest_command_succeeds() {
        let dir = tempfile::TempDir::new().unwrap();
        write_csv(dir.path(), "AAPL", 120);
        let ini = ini_for(dir.path(), "");
        let path = ini.path().to_str().unwrap();

        assert_exit(run_args(&["tickerlens", "backtest", "-c", path]), 0);
        assert_exit(
            run_args(&["tickerlens", "backtest", "-c", path, "--strategy", "macd", "--capital", "500"]),
            0,
        );
    }

    #[test]
    fn backtest_command_insufficient_history_exit_code() {
        let dir = tempfile::TempDir::new().unwrap();
        write_csv(dir.path(), "AAPL", 100);
        let ini = ini_for(dir.path(), "");
        let path = ini.path().to_str().unwrap();

        assert_exit(
            run_args(&["tickerlens", "backtest", "-c", path, "--strategy", "sma-50-200"]),
            5,
        );
    }

    #[test]
    fn unknown_symbol_exit_code() {
        let dir = tempfile::TempDir::new().unwrap();
        let ini = ini_for(dir.path(), "");
        let path = ini.path().to_str().unwrap();

        assert_exit(run_args(&["tickerlens", "summary", "-c", path, "--symbol", "ZZZ"]), 5);
    }

    #[test]
    fn indicators_and_summary_commands_succeed() {
        let dir = tempfile::TempDir::new().unwrap();
        write_csv(dir.path(), "AAPL", 60);
        let ini = ini_for(dir.path(), "");
        let path = ini.path().to_str().unwrap();

        assert_exit(run_args(&["tickerlens", "indicators", "-c", path, "--rows", "3"]), 0);
        assert_exit(run_args(&["tickerlens", "summary", "-c", path]), 0);
    }

    #[test]
    fn list_symbols_command() {
        let dir = tempfile::TempDir::new().unwrap();
        write_csv(dir.path(), "AAPL", 5);
        write_csv(dir.path(), "MSFT", 5);
        let ini = ini_for(dir.path(), "");

        assert_exit(
            run_args(&["tickerlens", "list-symbols", "-c", ini.path().to_str().unwrap()]),
            0,
        );
    }

    #[test]
    fn list_symbols_unreadable_directory_exits_with_io_code() {
        let dir = tempfile::TempDir::new().unwrap();
        let ini = ini_for(&dir.path().join("missing"), "");

        assert_exit(
            run_args(&["tickerlens", "list-symbols", "-c", ini.path().to_str().unwrap()]),
            1,
        );
    }

    #[test]
    fn validate_command_exit_codes() {
        let dir = tempfile::TempDir::new().unwrap();
        let good = ini_for(dir.path(), "");
        assert_exit(
            run_args(&["tickerlens", "validate", "-c", good.path().to_str().unwrap()]),
            0,
        );

        let bad = ini_for(dir.path(), "price_field = adjusted\n");
        assert_exit(
            run_args(&["tickerlens", "validate", "-c", bad.path().to_str().unwrap()]),
            2,
        );

        assert_exit(
            run_args(&["tickerlens", "validate", "-c", "/nonexistent/tickerlens.ini"]),
            2,
        );
    }

    #[test]
    fn strategies_command() {
        assert_exit(run_args(&["tickerlens", "strategies"]), 0);
    }

    #[test]
    fn malformed_csv_exit_code() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join("AAPL.csv"), "Date,Close\n2023-01-02,abc\n").unwrap();
        let ini = ini_for(dir.path(), "");

        assert_exit(
            run_args(&["tickerlens", "backtest", "-c", ini.path().to_str().unwrap()]),
            3,
        );
    }
}
