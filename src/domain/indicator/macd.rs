//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! All EMAs are seeded with their first observation, so every bar is valid.
//! Values before ~`slow` bars are dominated by the seed.

use crate::domain::indicator::ema::ema_values;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use chrono::NaiveDate;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(
    dates: &[NaiveDate],
    prices: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> IndicatorSeries {
    debug_assert_eq!(dates.len(), prices.len());

    let indicator_type = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_period,
    };

    if fast == 0 || slow == 0 || signal_period == 0 {
        let values = dates
            .iter()
            .map(|&date| {
                IndicatorPoint::invalid(
                    date,
                    IndicatorValue::Macd {
                        line: 0.0,
                        signal: 0.0,
                        histogram: 0.0,
                    },
                )
            })
            .collect();
        return IndicatorSeries {
            indicator_type,
            values,
            source: None,
        };
    }

    let ema_fast = ema_values(prices, fast);
    let ema_slow = ema_values(prices, slow);
    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema_values(&macd_line, signal_period);

    let values = dates
        .iter()
        .zip(macd_line.iter().zip(&signal_line))
        .map(|(&date, (&line, &signal))| IndicatorPoint {
            date,
            valid: true,
            value: IndicatorValue::Macd {
                line,
                signal,
                histogram: line - signal,
            },
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
        source: None,
    }
}

pub fn calculate_macd_default(dates: &[NaiveDate], prices: &[f64]) -> IndicatorSeries {
    calculate_macd(dates, prices, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
