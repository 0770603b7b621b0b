//! OHLCV bar representation.
//!
//! Every numeric field is optional: a supplier may deliver a close-only
//! series, and OHLC-based consumers check for the fields they need.

use crate::domain::error::TickerlensError;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// Which price of a bar an indicator or backtest reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PriceField {
    Open,
    High,
    Low,
    #[default]
    Close,
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PriceField::Open => "open",
            PriceField::High => "high",
            PriceField::Low => "low",
            PriceField::Close => "close",
        };
        f.write_str(name)
    }
}

impl FromStr for PriceField {
    type Err = TickerlensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(PriceField::Open),
            "high" => Ok(PriceField::High),
            "low" => Ok(PriceField::Low),
            "close" => Ok(PriceField::Close),
            other => Err(TickerlensError::invalid_input(format!(
                "unknown price field '{other}' (expected open, high, low or close)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<i64>,
}

impl OhlcvBar {
    /// A bar carrying only a closing price.
    pub fn close_only(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: None,
            high: None,
            low: None,
            close: Some(close),
            volume: None,
        }
    }

    pub fn price(&self, field: PriceField) -> Option<f64> {
        match field {
            PriceField::Open => self.open,
            PriceField::High => self.high,
            PriceField::Low => self.low,
            PriceField::Close => self.close,
        }
    }

    /// Check non-negativity and `low <= open, close <= high` for the fields present.
    pub fn validate(&self) -> Result<(), TickerlensError> {
        for (name, value) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(TickerlensError::invalid_input(format!(
                        "{}: {name} must be a non-negative number, got {v}",
                        self.date
                    )));
                }
            }
        }

        if let Some(volume) = self.volume {
            if volume < 0 {
                return Err(TickerlensError::invalid_input(format!(
                    "{}: volume must be non-negative, got {volume}",
                    self.date
                )));
            }
        }

        for (name, value) in [("open", self.open), ("close", self.close)] {
            let Some(v) = value else { continue };
            if let Some(low) = self.low {
                if v < low {
                    return Err(TickerlensError::invalid_input(format!(
                        "{}: {name} {v} below low {low}",
                        self.date
                    )));
                }
            }
            if let Some(high) = self.high {
                if v > high {
                    return Err(TickerlensError::invalid_input(format!(
                        "{}: {name} {v} above high {high}",
                        self.date
                    )));
                }
            }
        }

        Ok(())
    }
}
