//! Headline market figures and the latest indicator readings.

use crate::domain::error::TickerlensError;
use crate::domain::ohlcv::PriceField;
use crate::domain::price_table::PriceTable;
use crate::domain::strategy::{RSI_OVERBOUGHT, RSI_OVERSOLD};
use chrono::NaiveDate;
use std::fmt;

/// Trailing window used for the 52-week range.
pub const YEAR_BARS: usize = 252;
/// Trailing window for the average volume figure.
pub const VOLUME_BARS: usize = 20;

const BB_NEAR_UPPER: f64 = 80.0;
const BB_NEAR_LOWER: f64 = 20.0;

#[derive(Debug, Clone, PartialEq)]
pub struct MarketSummary {
    pub symbol: String,
    pub field: PriceField,
    pub last_price: f64,
    pub previous_price: Option<f64>,
    pub change: f64,
    pub change_pct: f64,
    pub high_52w: f64,
    pub low_52w: f64,
    pub pct_from_high: f64,
    pub pct_from_low: f64,
    pub avg_volume_20: Option<f64>,
    pub bars: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

impl MarketSummary {
    pub fn compute(table: &PriceTable, field: PriceField) -> Result<Self, TickerlensError> {
        let prices = table.prices(field)?;
        let bars = table.bars();
        let n = prices.len();

        let last_price = prices[n - 1];
        let previous_price = n.checked_sub(2).map(|i| prices[i]);
        let change = previous_price.map_or(0.0, |p| last_price - p);
        let change_pct = match previous_price {
            Some(p) if p != 0.0 => change / p * 100.0,
            _ => 0.0,
        };

        let start = n.saturating_sub(YEAR_BARS);
        let window = &bars[start..];
        let high_52w = window
            .iter()
            .zip(&prices[start..])
            .map(|(bar, &p)| bar.high.unwrap_or(p))
            .fold(f64::NEG_INFINITY, f64::max);
        let low_52w = window
            .iter()
            .zip(&prices[start..])
            .map(|(bar, &p)| bar.low.unwrap_or(p))
            .fold(f64::INFINITY, f64::min);

        let pct_from_high = pct_diff(last_price, high_52w);
        let pct_from_low = pct_diff(last_price, low_52w);

        let recent: Vec<f64> = bars[n.saturating_sub(VOLUME_BARS)..]
            .iter()
            .filter_map(|b| b.volume)
            .map(|v| v as f64)
            .collect();
        let avg_volume_20 = if recent.is_empty() {
            None
        } else {
            Some(recent.iter().sum::<f64>() / recent.len() as f64)
        };

        Ok(Self {
            symbol: table.symbol.clone(),
            field,
            last_price,
            previous_price,
            change,
            change_pct,
            high_52w,
            low_52w,
            pct_from_high,
            pct_from_low,
            avg_volume_20,
            bars: n,
            first_date: bars[0].date,
            last_date: bars[n - 1].date,
        })
    }
}

fn pct_diff(value: f64, reference: f64) -> f64 {
    if reference == 0.0 {
        0.0
    } else {
        (value - reference) / reference * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsiZone {
    Oversold,
    Neutral,
    Overbought,
}

impl RsiZone {
    pub fn classify(rsi: f64) -> Self {
        if rsi < RSI_OVERSOLD {
            RsiZone::Oversold
        } else if rsi > RSI_OVERBOUGHT {
            RsiZone::Overbought
        } else {
            RsiZone::Neutral
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdTrend {
    Bullish,
    Bearish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandZone {
    NearUpper,
    MidRange,
    NearLower,
}

impl BandZone {
    pub fn classify(position_pct: f64) -> Self {
        if position_pct > BB_NEAR_UPPER {
            BandZone::NearUpper
        } else if position_pct < BB_NEAR_LOWER {
            BandZone::NearLower
        } else {
            BandZone::MidRange
        }
    }
}

impl fmt::Display for RsiZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RsiZone::Oversold => write!(f, "Oversold"),
            RsiZone::Neutral => write!(f, "Neutral"),
            RsiZone::Overbought => write!(f, "Overbought"),
        }
    }
}

impl fmt::Display for MacdTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacdTrend::Bullish => write!(f, "Bullish"),
            MacdTrend::Bearish => write!(f, "Bearish"),
        }
    }
}

impl fmt::Display for BandZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BandZone::NearUpper => write!(f, "Near Upper"),
            BandZone::MidRange => write!(f, "Mid-Range"),
            BandZone::NearLower => write!(f, "Near Lower"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RsiReading {
    pub value: f64,
    pub zone: RsiZone,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdReading {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
    pub trend: MacdTrend,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandReading {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub position_pct: f64,
    pub zone: BandZone,
}

/// Readings on the last bar of a table augmented by `compute_indicators`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSnapshot {
    pub date: NaiveDate,
    pub price: f64,
    pub rsi: Option<RsiReading>,
    pub macd: Option<MacdReading>,
    pub bollinger: Option<BandReading>,
}

impl IndicatorSnapshot {
    pub fn latest(table: &PriceTable, field: PriceField) -> Result<Self, TickerlensError> {
        let prices = table.prices(field)?;
        let last = prices.len() - 1;
        let price = prices[last];
        let at = |name: &str| table.column(name).and_then(|col| col[last]);

        let rsi = at("RSI").map(|value| RsiReading {
            value,
            zone: RsiZone::classify(value),
        });

        let macd = match (at("MACD"), at("MACD_Signal"), at("MACD_Hist")) {
            (Some(line), Some(signal), Some(histogram)) => Some(MacdReading {
                line,
                signal,
                histogram,
                trend: if line > signal {
                    MacdTrend::Bullish
                } else {
                    MacdTrend::Bearish
                },
            }),
            _ => None,
        };

        let bollinger = match (at("BB_Upper"), at("BB_Middle"), at("BB_Lower")) {
            (Some(upper), Some(middle), Some(lower)) if upper != lower => {
                let position_pct = (price - lower) / (upper - lower) * 100.0;
                Some(BandReading {
                    upper,
                    middle,
                    lower,
                    position_pct,
                    zone: BandZone::classify(position_pct),
                })
            }
            _ => None,
        };

        Ok(Self {
            date: table.bars()[last].date,
            price,
            rsi,
            macd,
            bollinger,
        })
    }
}
