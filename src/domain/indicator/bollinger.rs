//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is the sample standard deviation (divides by N-1).
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) bars are invalid.

use crate::domain::indicator::stddev::rolling_sample_std;
use crate::domain::indicator::{
    rolling_mean, IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue,
};
use chrono::NaiveDate;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULT_X100: u32 = 200;

pub fn calculate_bollinger(
    dates: &[NaiveDate],
    prices: &[f64],
    period: usize,
    stddev_mult_x100: u32,
) -> IndicatorSeries {
    debug_assert_eq!(dates.len(), prices.len());

    let mult = stddev_mult_x100 as f64 / 100.0;
    let middles = rolling_mean(prices, period);
    let deviations = rolling_sample_std(prices, period);

    let values = dates
        .iter()
        .zip(middles.into_iter().zip(deviations))
        .map(|(&date, pair)| match pair {
            (Some(middle), Some(stddev)) => {
                let width = mult * stddev;
                IndicatorPoint {
                    date,
                    valid: true,
                    value: IndicatorValue::Bollinger {
                        upper: middle + width,
                        middle,
                        lower: middle - width,
                    },
                }
            }
            _ => IndicatorPoint::invalid(
                date,
                IndicatorValue::Bollinger {
                    upper: 0.0,
                    middle: 0.0,
                    lower: 0.0,
                },
            ),
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
        },
        values,
        source: None,
    }
}

pub fn calculate_bollinger_default(dates: &[NaiveDate], prices: &[f64]) -> IndicatorSeries {
    calculate_bollinger(dates, prices, DEFAULT_PERIOD, DEFAULT_MULT_X100)
}
