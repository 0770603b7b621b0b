//! Backtest simulator.
//!
//! Signal at bar t-1 earns the market return realised over bar t. Rows whose
//! returns or strategy inputs are undefined are dropped before compounding and
//! aggregation; the remaining rows form the result.

use crate::domain::error::TickerlensError;
use crate::domain::indicator::ZeroLossPolicy;
use crate::domain::metrics::{cumulative_growth, Metrics, TRADING_DAYS_PER_YEAR};
use crate::domain::ohlcv::PriceField;
use crate::domain::price_table::PriceTable;
use crate::domain::strategy::{Signal, Strategy};
use chrono::NaiveDate;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub price_field: PriceField,
    pub rsi_zero_loss: ZeroLossPolicy,
    pub periods_per_year: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: 10_000.0,
            price_field: PriceField::Close,
            rsi_zero_loss: ZeroLossPolicy::default(),
            periods_per_year: TRADING_DAYS_PER_YEAR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub growth: f64,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub strategy: Strategy,
    pub initial_capital: f64,
    /// Retained rows, in order. All per-row vectors below share this index.
    pub dates: Vec<NaiveDate>,
    pub signals: Vec<Signal>,
    pub strategy_returns: Vec<f64>,
    pub market_returns: Vec<f64>,
    pub strategy_growth: Vec<f64>,
    pub market_growth: Vec<f64>,
    pub strategy_metrics: Metrics,
    pub market_metrics: Metrics,
    pub buy_signals: Vec<NaiveDate>,
    pub sell_signals: Vec<NaiveDate>,
}

impl BacktestResult {
    pub fn strategy_equity(&self) -> Vec<EquityPoint> {
        self.equity(&self.strategy_growth)
    }

    pub fn market_equity(&self) -> Vec<EquityPoint> {
        self.equity(&self.market_growth)
    }

    /// Whether the strategy finished ahead of buy-and-hold.
    pub fn outperformed(&self) -> bool {
        self.strategy_metrics.total_return_pct > self.market_metrics.total_return_pct
    }

    fn equity(&self, growth: &[f64]) -> Vec<EquityPoint> {
        self.dates
            .iter()
            .zip(growth)
            .map(|(&date, &growth)| EquityPoint {
                date,
                growth,
                equity: growth * self.initial_capital,
            })
            .collect()
    }
}

/// Per-bar percent change; undefined on the first bar and after a zero price.
pub fn market_returns(prices: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(prices.len());
    if prices.is_empty() {
        return out;
    }
    out.push(None);
    for w in prices.windows(2) {
        out.push(if w[0] == 0.0 {
            None
        } else {
            Some(w[1] / w[0] - 1.0)
        });
    }
    out
}

/// strategy_return[t] = signal[t-1] * market_return[t]
pub fn lagged_strategy_returns(signals: &[Signal], market: &[Option<f64>]) -> Vec<Option<f64>> {
    debug_assert_eq!(signals.len(), market.len());
    (0..market.len())
        .map(|t| {
            let prev = t.checked_sub(1).map(|p| signals[p])?;
            market[t].map(|r| prev.as_f64() * r)
        })
        .collect()
}

/// Dates where the signal rises (buy) or falls (sell) by exactly one step
/// relative to the previous row.
pub fn trade_markers(dates: &[NaiveDate], signals: &[Signal]) -> (Vec<NaiveDate>, Vec<NaiveDate>) {
    let mut buys = Vec::new();
    let mut sells = Vec::new();
    for (i, w) in signals.windows(2).enumerate() {
        match w[1].value() - w[0].value() {
            1 => buys.push(dates[i + 1]),
            -1 => sells.push(dates[i + 1]),
            _ => {}
        }
    }
    (buys, sells)
}

pub fn run_backtest(
    table: &PriceTable,
    strategy: Strategy,
    config: &BacktestConfig,
) -> Result<BacktestResult, TickerlensError> {
    let prices = table.prices(config.price_field)?;
    let series = strategy.generate_signals(table, config.price_field, config.rsi_zero_loss)?;

    let market = market_returns(&prices);
    let lagged = lagged_strategy_returns(&series.signals, &market);

    let mut dates = Vec::new();
    let mut signals = Vec::new();
    let mut strategy_returns = Vec::new();
    let mut market_returns = Vec::new();

    for t in 0..prices.len() {
        if let (Some(m), Some(s), true) = (market[t], lagged[t], series.inputs_defined[t]) {
            dates.push(series.dates[t]);
            signals.push(series.signals[t]);
            strategy_returns.push(s);
            market_returns.push(m);
        }
    }

    if dates.is_empty() {
        let required = strategy.min_bars();
        let reason = if table.len() < required {
            format!("need at least {required} bars")
        } else {
            let inputs: Vec<String> = strategy
                .required_indicators()
                .iter()
                .map(ToString::to_string)
                .collect();
            format!("{} undefined on every row", inputs.join(" / "))
        };
        return Err(TickerlensError::InsufficientHistory {
            strategy: strategy.to_string(),
            bars: table.len(),
            required,
            reason,
        });
    }

    debug!(
        symbol = %table.symbol,
        retained = dates.len(),
        dropped = prices.len() - dates.len(),
        "cleaned backtest rows"
    );

    let strategy_growth = cumulative_growth(&strategy_returns);
    let market_growth = cumulative_growth(&market_returns);

    let strategy_metrics = Metrics::compute(
        &strategy_returns,
        &strategy_growth,
        config.initial_capital,
        config.periods_per_year,
    );
    let market_metrics = Metrics::compute(
        &market_returns,
        &market_growth,
        config.initial_capital,
        config.periods_per_year,
    );

    let (buy_signals, sell_signals) = trade_markers(&dates, &signals);

    info!(
        symbol = %table.symbol,
        strategy = %strategy,
        strategy_return_pct = strategy_metrics.total_return_pct,
        market_return_pct = market_metrics.total_return_pct,
        "backtest complete"
    );

    Ok(BacktestResult {
        strategy,
        initial_capital: config.initial_capital,
        dates,
        signals,
        strategy_returns,
        market_returns,
        strategy_growth,
        market_growth,
        strategy_metrics,
        market_metrics,
        buy_signals,
        sell_signals,
    })
}
