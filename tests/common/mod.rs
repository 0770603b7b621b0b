#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
use tickerlens::domain::error::TickerlensError;
pub use tickerlens::domain::ohlcv::OhlcvBar;
use tickerlens::domain::price_table::PriceTable;
use tickerlens::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<OhlcvBar>, TickerlensError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(TickerlensError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| start_date.is_none_or(|s| b.date >= s))
                    .filter(|b| end_date.is_none_or(|e| b.date <= e))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, TickerlensError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn day(offset: usize) -> NaiveDate {
    date(2023, 1, 2) + chrono::Duration::days(offset as i64)
}

/// A full bar around `close` with a one-point range and fixed volume.
pub fn make_bar(date: &str, close: f64) -> OhlcvBar {
    OhlcvBar {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: Some(close),
        high: Some(close + 1.0),
        low: Some((close - 1.0).max(0.0)),
        close: Some(close),
        volume: Some(1000),
    }
}

/// One close-only bar per consecutive day.
pub fn generate_bars(prices: &[f64]) -> Vec<OhlcvBar> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar::close_only(day(i), close))
        .collect()
}

pub fn make_table(prices: &[f64]) -> PriceTable {
    PriceTable::new("TEST", generate_bars(prices)).unwrap()
}

pub fn rising(n: usize, start: f64, step: f64) -> Vec<f64> {
    (0..n).map(|i| start + step * i as f64).collect()
}

pub fn wave(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + (i as f64 * 0.3).sin() * 10.0 + i as f64 * 0.05)
        .collect()
}
