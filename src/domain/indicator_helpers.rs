//! Indicator engine entry points: compute one series, or augment a table
//! with the standard RSI / MACD / Bollinger set.

use crate::domain::error::TickerlensError;
use crate::domain::indicator::bollinger::{DEFAULT_MULT_X100, DEFAULT_PERIOD as BB_PERIOD};
use crate::domain::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use crate::domain::indicator::rsi::DEFAULT_PERIOD as RSI_PERIOD;
use crate::domain::indicator::{
    calculate_bollinger, calculate_ema, calculate_macd, calculate_rsi, calculate_sma,
    calculate_stddev, calculate_vwap, IndicatorSeries, IndicatorType, SeriesSource,
    ZeroLossPolicy,
};
use crate::domain::ohlcv::PriceField;
use crate::domain::price_table::PriceTable;
use tracing::{debug, warn};

/// Bars after which the slow MACD average has seen a full span.
pub const MACD_STABLE_BARS: usize = DEFAULT_SLOW;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorParams {
    pub rsi_period: usize,
    pub rsi_zero_loss: ZeroLossPolicy,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_mult_x100: u32,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_period: RSI_PERIOD,
            rsi_zero_loss: ZeroLossPolicy::default(),
            macd_fast: DEFAULT_FAST,
            macd_slow: DEFAULT_SLOW,
            macd_signal: DEFAULT_SIGNAL,
            bollinger_period: BB_PERIOD,
            bollinger_mult_x100: DEFAULT_MULT_X100,
        }
    }
}

impl IndicatorParams {
    pub fn with_zero_loss(policy: ZeroLossPolicy) -> Self {
        Self {
            rsi_zero_loss: policy,
            ..Self::default()
        }
    }

    pub fn indicator_types(&self) -> [IndicatorType; 3] {
        [
            IndicatorType::Rsi(self.rsi_period),
            IndicatorType::Macd {
                fast: self.macd_fast,
                slow: self.macd_slow,
                signal: self.macd_signal,
            },
            IndicatorType::Bollinger {
                period: self.bollinger_period,
                stddev_mult_x100: self.bollinger_mult_x100,
            },
        ]
    }
}

/// Compute a single indicator over `field` of the table.
pub fn compute_indicator(
    table: &PriceTable,
    field: PriceField,
    indicator_type: &IndicatorType,
    rsi_zero_loss: ZeroLossPolicy,
) -> Result<IndicatorSeries, TickerlensError> {
    let prices = table.prices(field)?;
    let dates = table.dates();

    let mut series = match *indicator_type {
        IndicatorType::Sma(period) => calculate_sma(&dates, &prices, period),
        IndicatorType::Ema(span) => calculate_ema(&dates, &prices, span),
        IndicatorType::Rsi(period) => calculate_rsi(&dates, &prices, period, rsi_zero_loss),
        IndicatorType::Stddev(period) => calculate_stddev(&dates, &prices, period),
        IndicatorType::Vwap => calculate_vwap(&dates, &prices, &table.volumes()?),
        IndicatorType::Macd { fast, slow, signal } => {
            calculate_macd(&dates, &prices, fast, slow, signal)
        }
        IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
        } => calculate_bollinger(&dates, &prices, period, stddev_mult_x100),
    };

    series.source = Some(SeriesSource::new(indicator_type, field, rsi_zero_loss));

    debug!(
        symbol = %table.symbol,
        indicator = %indicator_type,
        valid = series.values.iter().filter(|p| p.valid).count(),
        "computed indicator"
    );
    Ok(series)
}

/// Use the series already attached to the table when it was computed from the
/// same price field and zero-loss policy; otherwise compute it afresh.
pub fn resolve_indicator(
    table: &PriceTable,
    field: PriceField,
    indicator_type: &IndicatorType,
    rsi_zero_loss: ZeroLossPolicy,
) -> Result<IndicatorSeries, TickerlensError> {
    let wanted = SeriesSource::new(indicator_type, field, rsi_zero_loss);
    match table.indicator(indicator_type) {
        Some(series) if series.source == Some(wanted) => Ok(series.clone()),
        Some(series) => {
            debug!(
                symbol = %table.symbol,
                indicator = %indicator_type,
                attached = ?series.source,
                "attached series built from other inputs, recomputing"
            );
            compute_indicator(table, field, indicator_type, rsi_zero_loss)
        }
        None => compute_indicator(table, field, indicator_type, rsi_zero_loss),
    }
}

/// Return a copy of `table` augmented with RSI, MACD and Bollinger series.
/// No rows are dropped; leading undefined points stay in place.
pub fn compute_indicators(
    table: &PriceTable,
    field: PriceField,
    params: &IndicatorParams,
) -> Result<PriceTable, TickerlensError> {
    if table.len() < MACD_STABLE_BARS {
        warn!(
            symbol = %table.symbol,
            bars = table.len(),
            "fewer than {MACD_STABLE_BARS} bars, MACD values are seed-dominated"
        );
    }

    let mut augmented = table.clone();
    for indicator_type in params.indicator_types() {
        let series = compute_indicator(table, field, &indicator_type, params.rsi_zero_loss)?;
        augmented.insert_indicator(series)?;
    }
    Ok(augmented)
}
