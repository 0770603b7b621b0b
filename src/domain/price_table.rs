//! Date-indexed price table with attached indicator series.

use crate::domain::error::TickerlensError;
use crate::domain::indicator::bollinger::{DEFAULT_MULT_X100, DEFAULT_PERIOD as BB_PERIOD};
use crate::domain::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use crate::domain::indicator::rsi::DEFAULT_PERIOD as RSI_PERIOD;
use crate::domain::indicator::{IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::{OhlcvBar, PriceField};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Canonical column names exposed by [`PriceTable::column`].
pub const INDICATOR_COLUMNS: [&str; 7] = [
    "RSI",
    "MACD",
    "MACD_Signal",
    "MACD_Hist",
    "BB_Middle",
    "BB_Upper",
    "BB_Lower",
];

#[derive(Debug, Clone)]
pub struct PriceTable {
    pub symbol: String,
    bars: Vec<OhlcvBar>,
    indicators: HashMap<IndicatorType, IndicatorSeries>,
    date_index: HashMap<NaiveDate, usize>,
}

impl PriceTable {
    /// Build a table, rejecting unordered or duplicate dates and malformed bars.
    pub fn new(symbol: impl Into<String>, bars: Vec<OhlcvBar>) -> Result<Self, TickerlensError> {
        for bar in &bars {
            bar.validate()?;
        }
        for w in bars.windows(2) {
            if w[1].date <= w[0].date {
                return Err(TickerlensError::invalid_input(format!(
                    "dates must be strictly increasing: {} follows {}",
                    w[1].date, w[0].date
                )));
            }
        }

        let date_index = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| (bar.date, i))
            .collect();

        Ok(Self {
            symbol: symbol.into(),
            bars,
            indicators: HashMap::new(),
            date_index,
        })
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn get_bar_index(&self, date: NaiveDate) -> Option<usize> {
        self.date_index.get(&date).copied()
    }

    /// Dense price vector for `field`; fails when the table is empty or any bar lacks it.
    pub fn prices(&self, field: PriceField) -> Result<Vec<f64>, TickerlensError> {
        if self.bars.is_empty() {
            return Err(TickerlensError::invalid_input(format!(
                "{}: price table has no rows",
                self.symbol
            )));
        }
        self.bars
            .iter()
            .map(|bar| {
                bar.price(field).ok_or_else(|| {
                    TickerlensError::invalid_input(format!(
                        "{}: {field} price missing on {}",
                        self.symbol, bar.date
                    ))
                })
            })
            .collect()
    }

    /// Dense volume vector; fails when any bar lacks volume.
    pub fn volumes(&self) -> Result<Vec<i64>, TickerlensError> {
        self.bars
            .iter()
            .map(|bar| {
                bar.volume.ok_or_else(|| {
                    TickerlensError::invalid_input(format!(
                        "{}: volume missing on {}",
                        self.symbol, bar.date
                    ))
                })
            })
            .collect()
    }

    pub fn indicator(&self, indicator_type: &IndicatorType) -> Option<&IndicatorSeries> {
        self.indicators.get(indicator_type)
    }

    pub fn indicator_types(&self) -> impl Iterator<Item = &IndicatorType> {
        self.indicators.keys()
    }

    /// Attach a series. It must carry exactly the table's date index.
    pub fn insert_indicator(&mut self, series: IndicatorSeries) -> Result<(), TickerlensError> {
        if series.len() != self.bars.len() {
            return Err(TickerlensError::invalid_input(format!(
                "{} has {} points but table has {} rows",
                series.indicator_type,
                series.len(),
                self.bars.len()
            )));
        }
        if let Some((point, bar)) = series
            .values
            .iter()
            .zip(&self.bars)
            .find(|(point, bar)| point.date != bar.date)
        {
            return Err(TickerlensError::invalid_input(format!(
                "{} point dated {} does not line up with table row {}",
                series.indicator_type, point.date, bar.date
            )));
        }
        self.indicators.insert(series.indicator_type, series);
        Ok(())
    }

    /// Resolve a canonical indicator column (`RSI`, `MACD_Signal`, `BB_Upper`, ...)
    /// from the standard-parameter series attached to this table.
    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let macd = IndicatorType::Macd {
            fast: DEFAULT_FAST,
            slow: DEFAULT_SLOW,
            signal: DEFAULT_SIGNAL,
        };
        let bollinger = IndicatorType::Bollinger {
            period: BB_PERIOD,
            stddev_mult_x100: DEFAULT_MULT_X100,
        };

        let (indicator_type, part) = match name {
            "RSI" => (IndicatorType::Rsi(RSI_PERIOD), 0),
            "MACD" => (macd, 0),
            "MACD_Signal" => (macd, 1),
            "MACD_Hist" => (macd, 2),
            "BB_Upper" => (bollinger, 0),
            "BB_Middle" => (bollinger, 1),
            "BB_Lower" => (bollinger, 2),
            _ => return None,
        };
        let series = self.indicator(&indicator_type)?;

        Some(
            series
                .values
                .iter()
                .map(|p| if p.valid { component(&p.value, part) } else { None })
                .collect(),
        )
    }
}

/// The `part`-th scalar of a point, in declaration order of its fields.
fn component(value: &IndicatorValue, part: usize) -> Option<f64> {
    match (value, part) {
        (IndicatorValue::Simple(v), 0) => Some(*v),
        (IndicatorValue::Macd { line, .. }, 0) => Some(*line),
        (IndicatorValue::Macd { signal, .. }, 1) => Some(*signal),
        (IndicatorValue::Macd { histogram, .. }, 2) => Some(*histogram),
        (IndicatorValue::Bollinger { upper, .. }, 0) => Some(*upper),
        (IndicatorValue::Bollinger { middle, .. }, 1) => Some(*middle),
        (IndicatorValue::Bollinger { lower, .. }, 2) => Some(*lower),
        _ => None,
    }
}
