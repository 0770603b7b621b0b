//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = mean(P[i-n+1..=i]). Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{
    rolling_mean, IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue,
};
use chrono::NaiveDate;

pub fn calculate_sma(dates: &[NaiveDate], prices: &[f64], period: usize) -> IndicatorSeries {
    debug_assert_eq!(dates.len(), prices.len());

    let values = dates
        .iter()
        .zip(rolling_mean(prices, period))
        .map(|(&date, mean)| match mean {
            Some(v) => IndicatorPoint {
                date,
                valid: true,
                value: IndicatorValue::Simple(v),
            },
            None => IndicatorPoint::invalid(date, IndicatorValue::Simple(0.0)),
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
        source: None,
    }
}
