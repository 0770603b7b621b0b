//! RSI (Relative Strength Index) indicator.
//!
//! Gains and losses are the positive and negated-negative bar-to-bar price
//! changes, each smoothed with a simple moving average over n changes:
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//!
//! Warmup: first n bars are invalid (need n price changes for the first average).
//! A window with zero average loss is resolved by [`ZeroLossPolicy`].

use crate::domain::error::TickerlensError;
use crate::domain::indicator::{
    rolling_mean, IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue,
};
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PERIOD: usize = 14;

/// What RSI reports for a window whose average loss is exactly zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZeroLossPolicy {
    /// Gains without losses saturate at 100. A window with neither is undefined.
    #[default]
    Saturate,
    /// Any zero-loss window is undefined.
    Undefined,
}

impl fmt::Display for ZeroLossPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZeroLossPolicy::Saturate => f.write_str("saturate"),
            ZeroLossPolicy::Undefined => f.write_str("undefined"),
        }
    }
}

impl FromStr for ZeroLossPolicy {
    type Err = TickerlensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "saturate" => Ok(ZeroLossPolicy::Saturate),
            "undefined" => Ok(ZeroLossPolicy::Undefined),
            other => Err(TickerlensError::invalid_input(format!(
                "unknown RSI zero-loss policy '{other}' (expected saturate or undefined)"
            ))),
        }
    }
}

pub fn calculate_rsi(
    dates: &[NaiveDate],
    prices: &[f64],
    period: usize,
    policy: ZeroLossPolicy,
) -> IndicatorSeries {
    debug_assert_eq!(dates.len(), prices.len());

    let mut gains = Vec::with_capacity(prices.len().saturating_sub(1));
    let mut losses = Vec::with_capacity(prices.len().saturating_sub(1));
    for w in prices.windows(2) {
        let change = w[1] - w[0];
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    let avg_gains = rolling_mean(&gains, period);
    let avg_losses = rolling_mean(&losses, period);

    let mut values = Vec::with_capacity(prices.len());
    for (i, &date) in dates.iter().enumerate() {
        // bar i owns the change at index i-1
        let averages = i
            .checked_sub(1)
            .and_then(|j| avg_gains[j].zip(avg_losses[j]));

        let rsi = averages.and_then(|(avg_gain, avg_loss)| rsi_value(avg_gain, avg_loss, policy));
        values.push(match rsi {
            Some(v) => IndicatorPoint {
                date,
                valid: true,
                value: IndicatorValue::Simple(v),
            },
            None => IndicatorPoint::invalid(date, IndicatorValue::Simple(0.0)),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
        source: None,
    }
}

fn rsi_value(avg_gain: f64, avg_loss: f64, policy: ZeroLossPolicy) -> Option<f64> {
    if avg_loss == 0.0 {
        return match policy {
            ZeroLossPolicy::Saturate if avg_gain > 0.0 => Some(100.0),
            _ => None,
        };
    }
    Some(100.0 - (100.0 / (1.0 + avg_gain / avg_loss)))
}
