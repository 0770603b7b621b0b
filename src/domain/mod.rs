//! Core domain types and logic: price data, indicators, strategies, backtests.

pub mod ohlcv;
pub mod price_table;
pub mod indicator;
pub mod indicator_helpers;
pub mod strategy;
pub mod backtest;
pub mod metrics;
pub mod summary;
pub mod config_validation;
pub mod error;
