//! Rule-based strategies and the signal series they produce.
//!
//! Each bar's signal is computed independently from that bar's indicator
//! values. A bar whose inputs are undefined gets [`Signal::Flat`] and is
//! flagged in [`SignalSeries::inputs_defined`].

use crate::domain::error::TickerlensError;
use crate::domain::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use crate::domain::indicator::rsi::DEFAULT_PERIOD as RSI_PERIOD;
use crate::domain::indicator::{IndicatorType, IndicatorValue, ZeroLossPolicy};
use crate::domain::indicator_helpers::resolve_indicator;
use crate::domain::ohlcv::PriceField;
use crate::domain::price_table::PriceTable;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Short = -1,
    Flat = 0,
    Long = 1,
}

impl Signal {
    pub fn value(self) -> i8 {
        self as i8
    }

    pub fn as_f64(self) -> f64 {
        self.value() as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Long while SMA(20) > SMA(50).
    SmaCrossoverShort,
    /// Long while SMA(50) > SMA(200).
    SmaCrossoverLong,
    /// Long below RSI 30, short above RSI 70, flat otherwise.
    RsiMeanReversion,
    /// Long while the MACD line is above its signal line.
    MacdCrossover,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalSeries {
    pub dates: Vec<NaiveDate>,
    pub signals: Vec<Signal>,
    pub inputs_defined: Vec<bool>,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::SmaCrossoverShort,
        Strategy::SmaCrossoverLong,
        Strategy::RsiMeanReversion,
        Strategy::MacdCrossover,
    ];

    /// Short identifier accepted on the command line and in config files.
    pub fn id(&self) -> &'static str {
        match self {
            Strategy::SmaCrossoverShort => "sma-20-50",
            Strategy::SmaCrossoverLong => "sma-50-200",
            Strategy::RsiMeanReversion => "rsi",
            Strategy::MacdCrossover => "macd",
        }
    }

    pub fn required_indicators(&self) -> Vec<IndicatorType> {
        match self {
            Strategy::SmaCrossoverShort => vec![IndicatorType::Sma(20), IndicatorType::Sma(50)],
            Strategy::SmaCrossoverLong => vec![IndicatorType::Sma(50), IndicatorType::Sma(200)],
            Strategy::RsiMeanReversion => vec![IndicatorType::Rsi(RSI_PERIOD)],
            Strategy::MacdCrossover => vec![IndicatorType::Macd {
                fast: DEFAULT_FAST,
                slow: DEFAULT_SLOW,
                signal: DEFAULT_SIGNAL,
            }],
        }
    }

    /// Fewest bars for which at least one row can carry defined inputs and returns.
    pub fn min_bars(&self) -> usize {
        match self {
            Strategy::SmaCrossoverShort => 50,
            Strategy::SmaCrossoverLong => 200,
            Strategy::RsiMeanReversion => RSI_PERIOD + 1,
            Strategy::MacdCrossover => 2,
        }
    }

    pub fn generate_signals(
        &self,
        table: &PriceTable,
        field: PriceField,
        rsi_zero_loss: ZeroLossPolicy,
    ) -> Result<SignalSeries, TickerlensError> {
        let dates = table.dates();
        let (signals, inputs_defined): (Vec<Signal>, Vec<bool>) = match self {
            Strategy::SmaCrossoverShort | Strategy::SmaCrossoverLong => {
                let required = self.required_indicators();
                let fast = resolve_indicator(table, field, &required[0], rsi_zero_loss)?
                    .simple_values();
                let slow = resolve_indicator(table, field, &required[1], rsi_zero_loss)?
                    .simple_values();
                fast.iter()
                    .zip(&slow)
                    .map(|pair| match pair {
                        (Some(f), Some(s)) => {
                            (if f > s { Signal::Long } else { Signal::Flat }, true)
                        }
                        _ => (Signal::Flat, false),
                    })
                    .unzip()
            }
            Strategy::RsiMeanReversion => {
                let rsi = resolve_indicator(
                    table,
                    field,
                    &IndicatorType::Rsi(RSI_PERIOD),
                    rsi_zero_loss,
                )?
                .simple_values();
                rsi.iter()
                    .map(|value| match value {
                        Some(v) if *v < RSI_OVERSOLD => (Signal::Long, true),
                        Some(v) if *v > RSI_OVERBOUGHT => (Signal::Short, true),
                        Some(_) => (Signal::Flat, true),
                        None => (Signal::Flat, false),
                    })
                    .unzip()
            }
            Strategy::MacdCrossover => {
                let required = self.required_indicators();
                let macd = resolve_indicator(table, field, &required[0], rsi_zero_loss)?;
                macd.values
                    .iter()
                    .map(|point| match point.value {
                        IndicatorValue::Macd { line, signal, .. } if point.valid => {
                            (if line > signal { Signal::Long } else { Signal::Flat }, true)
                        }
                        _ => (Signal::Flat, false),
                    })
                    .unzip()
            }
        };

        Ok(SignalSeries {
            dates,
            signals,
            inputs_defined,
        })
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Strategy::SmaCrossoverShort => "SMA Crossover (20/50)",
            Strategy::SmaCrossoverLong => "SMA Crossover (50/200)",
            Strategy::RsiMeanReversion => "RSI Mean Reversion",
            Strategy::MacdCrossover => "MACD Crossover",
        };
        f.write_str(label)
    }
}

impl FromStr for Strategy {
    type Err = TickerlensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Strategy::ALL
            .into_iter()
            .find(|st| st.id().eq_ignore_ascii_case(wanted) || st.to_string() == wanted)
            .ok_or_else(|| {
                let ids: Vec<&str> = Strategy::ALL.iter().map(Strategy::id).collect();
                TickerlensError::invalid_input(format!(
                    "unknown strategy '{wanted}' (expected one of {})",
                    ids.join(", ")
                ))
            })
    }
}
