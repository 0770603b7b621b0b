//! Indicator calculators and the series types they produce.
//!
//! A series carries one [`IndicatorPoint`] per input bar, in bar order. The
//! `valid` flag marks whether the value at that bar is defined; warmup bars
//! and degenerate windows are kept in place with `valid == false`.
//! [`IndicatorType`] is the hashable identity (kind plus parameters) used to
//! attach series to a price table; [`SeriesSource`] records the inputs a
//! series was computed from so it is only reused for the same inputs.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stddev;
pub mod vwap;

pub use bollinger::calculate_bollinger;
pub use ema::calculate_ema;
pub use macd::calculate_macd;
pub use rsi::{calculate_rsi, ZeroLossPolicy};
pub use sma::calculate_sma;
pub use stddev::calculate_stddev;
pub use vwap::calculate_vwap;

use crate::domain::ohlcv::PriceField;
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: IndicatorValue,
}

impl IndicatorPoint {
    pub fn invalid(date: NaiveDate, value: IndicatorValue) -> Self {
        Self {
            date,
            valid: false,
            value,
        }
    }

    /// The scalar value of a `Simple` point, or `None` when undefined.
    pub fn simple(&self) -> Option<f64> {
        match self.value {
            IndicatorValue::Simple(v) if self.valid => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Stddev(usize),
    Vwap,
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
}

/// Price field and RSI zero-loss policy a series was computed with.
/// `rsi_zero_loss` is `None` for indicators the policy does not affect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesSource {
    pub field: PriceField,
    pub rsi_zero_loss: Option<ZeroLossPolicy>,
}

impl SeriesSource {
    pub fn new(indicator_type: &IndicatorType, field: PriceField, policy: ZeroLossPolicy) -> Self {
        Self {
            field,
            rsi_zero_loss: matches!(indicator_type, IndicatorType::Rsi(_)).then_some(policy),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
    /// Unknown for series built directly from a calculator.
    pub source: Option<SeriesSource>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Scalar values with undefined points mapped to `None`.
    pub fn simple_values(&self) -> Vec<Option<f64>> {
        self.values.iter().map(IndicatorPoint::simple).collect()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Stddev(period) => write!(f, "STDDEV({})", period),
            IndicatorType::Vwap => write!(f, "VWAP"),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
        }
    }
}

/// Trailing arithmetic mean over `window` values; `None` until the window fills.
pub(crate) fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let slice = &values[i + 1 - window..=i];
            Some(slice.iter().sum::<f64>() / window as f64)
        })
        .collect()
}
