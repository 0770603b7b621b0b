//! Configuration loading and validation.
//!
//! Every key is read through [`ConfigPort`] and checked before any data is
//! loaded, so a bad config fails fast with the offending section and key.

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::TickerlensError;
use crate::domain::indicator::ZeroLossPolicy;
use crate::domain::metrics::TRADING_DAYS_PER_YEAR;
use crate::domain::ohlcv::PriceField;
use crate::domain::strategy::Strategy;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::fmt::Display;
use std::str::FromStr;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 10_000.0;

/// Fully parsed application settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_dir: String,
    /// May be supplied on the command line instead.
    pub symbol: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub strategy: Strategy,
    pub backtest: BacktestConfig,
}

impl AppConfig {
    pub fn from_port(config: &dyn ConfigPort) -> Result<Self, TickerlensError> {
        let data_dir = required_string(config, "data", "directory")?;
        let symbol = optional_string(config, "analysis", "symbol");

        let price_field: PriceField =
            parse_optional(config, "analysis", "price_field")?.unwrap_or_default();
        let rsi_zero_loss: ZeroLossPolicy =
            parse_optional(config, "analysis", "rsi_zero_loss")?.unwrap_or_default();

        let start_date = parse_date(config, "start_date")?;
        let end_date = parse_date(config, "end_date")?;
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if start >= end {
                return Err(invalid(
                    "analysis",
                    "start_date",
                    "start_date must be before end_date",
                ));
            }
        }

        let initial_capital: f64 = parse_optional(config, "backtest", "initial_capital")?
            .unwrap_or(DEFAULT_INITIAL_CAPITAL);
        if !(initial_capital.is_finite() && initial_capital > 0.0) {
            return Err(invalid(
                "backtest",
                "initial_capital",
                "initial_capital must be positive",
            ));
        }

        let periods_per_year: f64 = parse_optional(config, "backtest", "periods_per_year")?
            .unwrap_or(TRADING_DAYS_PER_YEAR);
        if !(periods_per_year.is_finite() && periods_per_year > 0.0) {
            return Err(invalid(
                "backtest",
                "periods_per_year",
                "periods_per_year must be positive",
            ));
        }

        let strategy = parse_optional(config, "backtest", "strategy")?
            .unwrap_or(Strategy::SmaCrossoverShort);

        Ok(Self {
            data_dir,
            symbol,
            start_date,
            end_date,
            strategy,
            backtest: BacktestConfig {
                initial_capital,
                price_field,
                rsi_zero_loss,
                periods_per_year,
            },
        })
    }

    /// The configured symbol, or `ConfigMissing` when neither config nor caller gave one.
    pub fn require_symbol(&self) -> Result<&str, TickerlensError> {
        self.symbol
            .as_deref()
            .ok_or_else(|| missing("analysis", "symbol"))
    }
}

/// Check every section a run needs, including the symbol.
pub fn validate_config(config: &dyn ConfigPort) -> Result<AppConfig, TickerlensError> {
    let app = AppConfig::from_port(config)?;
    app.require_symbol()?;
    Ok(app)
}

fn optional_string(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn required_string(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<String, TickerlensError> {
    optional_string(config, section, key).ok_or_else(|| missing(section, key))
}

fn parse_optional<T>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, TickerlensError>
where
    T: FromStr,
    T::Err: Display,
{
    optional_string(config, section, key)
        .map(|raw| raw.parse::<T>().map_err(|e| invalid(section, key, e.to_string())))
        .transpose()
}

fn parse_date(config: &dyn ConfigPort, key: &str) -> Result<Option<NaiveDate>, TickerlensError> {
    optional_string(config, "analysis", key)
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
                invalid(
                    "analysis",
                    key,
                    format!("invalid {key} format, expected YYYY-MM-DD"),
                )
            })
        })
        .transpose()
}

fn missing(section: &str, key: &str) -> TickerlensError {
    TickerlensError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> TickerlensError {
    TickerlensError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    const BASE: &str = "[data]\ndirectory = ./data\n[analysis]\nsymbol = AAPL\n";

    #[test]
    fn full_config_passes() {
        let config = make_config(
            r#"
[data]
directory = ./data

[analysis]
symbol = AAPL
price_field = open
start_date = 2020-01-01
end_date = 2024-12-31
rsi_zero_loss = undefined

[backtest]
initial_capital = 25000
strategy = macd
periods_per_year = 52
"#,
        );
        let app = validate_config(&config).unwrap();
        assert_eq!(app.data_dir, "./data");
        assert_eq!(app.symbol.as_deref(), Some("AAPL"));
        assert_eq!(app.start_date, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(app.strategy, Strategy::MacdCrossover);
        assert_eq!(app.backtest.price_field, PriceField::Open);
        assert_eq!(app.backtest.rsi_zero_loss, ZeroLossPolicy::Undefined);
        assert_eq!(app.backtest.initial_capital, 25_000.0);
        assert_eq!(app.backtest.periods_per_year, 52.0);
    }

    #[test]
    fn defaults_fill_optional_keys() {
        let app = validate_config(&make_config(BASE)).unwrap();
        assert_eq!(app.start_date, None);
        assert_eq!(app.end_date, None);
        assert_eq!(app.strategy, Strategy::SmaCrossoverShort);
        assert_eq!(app.backtest, BacktestConfig::default());
    }

    #[test]
    fn missing_directory_fails() {
        let err = validate_config(&make_config("[analysis]\nsymbol = AAPL\n")).unwrap_err();
        assert!(matches!(err, TickerlensError::ConfigMissing { key, .. } if key == "directory"));
    }

    #[test]
    fn missing_symbol_fails_validation_but_loads() {
        let config = make_config("[data]\ndirectory = ./data\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, TickerlensError::ConfigMissing { key, .. } if key == "symbol"));
        assert!(AppConfig::from_port(&config).is_ok());
    }

    #[test]
    fn bad_price_field_fails() {
        let config = make_config(&format!("{BASE}price_field = adj_close\n"));
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, TickerlensError::ConfigInvalid { key, .. } if key == "price_field"));
    }

    #[test]
    fn bad_zero_loss_policy_fails() {
        let config = make_config(&format!("{BASE}rsi_zero_loss = maybe\n"));
        let err = validate_config(&config).unwrap_err();
        assert!(
            matches!(err, TickerlensError::ConfigInvalid { key, .. } if key == "rsi_zero_loss")
        );
    }

    #[test]
    fn invalid_date_format_fails() {
        let config = make_config(&format!("{BASE}start_date = 2020/01/01\n"));
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, TickerlensError::ConfigInvalid { key, .. } if key == "start_date"));
    }

    #[test]
    fn start_after_end_fails() {
        let config = make_config(&format!(
            "{BASE}start_date = 2024-12-31\nend_date = 2020-01-01\n"
        ));
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, TickerlensError::ConfigInvalid { key, .. } if key == "start_date"));
    }

    #[test]
    fn non_positive_capital_fails() {
        for value in ["0", "-100", "abc"] {
            let config = make_config(&format!("{BASE}[backtest]\ninitial_capital = {value}\n"));
            let err = validate_config(&config).unwrap_err();
            assert!(
                matches!(err, TickerlensError::ConfigInvalid { ref key, .. } if key == "initial_capital"),
                "{value}: {err}"
            );
        }
    }

    #[test]
    fn unknown_strategy_fails() {
        let config = make_config(&format!("{BASE}[backtest]\nstrategy = buy-the-dip\n"));
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, TickerlensError::ConfigInvalid { key, .. } if key == "strategy"));
    }

    #[test]
    fn non_positive_periods_fails() {
        let config = make_config(&format!("{BASE}[backtest]\nperiods_per_year = 0\n"));
        let err = validate_config(&config).unwrap_err();
        assert!(
            matches!(err, TickerlensError::ConfigInvalid { key, .. } if key == "periods_per_year")
        );
    }

    #[test]
    fn blank_values_count_as_missing() {
        let config = make_config("[data]\ndirectory =   \n[analysis]\nsymbol = AAPL\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, TickerlensError::ConfigMissing { key, .. } if key == "directory"));
    }
}
