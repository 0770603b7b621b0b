//! Volume Weighted Average Price overlay.
//!
//! VWAP[i] = sum(P[0..=i] * V[0..=i]) / sum(V[0..=i]), anchored at the first bar.
//! Undefined while cumulative volume is zero.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use chrono::NaiveDate;

pub fn calculate_vwap(dates: &[NaiveDate], prices: &[f64], volumes: &[i64]) -> IndicatorSeries {
    debug_assert_eq!(dates.len(), prices.len());
    debug_assert_eq!(dates.len(), volumes.len());

    let mut cum_pv = 0.0;
    let mut cum_volume = 0.0;

    let values = dates
        .iter()
        .zip(prices.iter().zip(volumes))
        .map(|(&date, (&price, &volume))| {
            let volume = volume as f64;
            cum_pv += price * volume;
            cum_volume += volume;

            if cum_volume > 0.0 {
                IndicatorPoint {
                    date,
                    valid: true,
                    value: IndicatorValue::Simple(cum_pv / cum_volume),
                }
            } else {
                IndicatorPoint::invalid(date, IndicatorValue::Simple(0.0))
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Vwap,
        values,
        source: None,
    }
}
