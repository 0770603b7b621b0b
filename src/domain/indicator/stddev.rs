//! Standard Deviation indicator.
//!
//! Sample standard deviation (n-1 denominator) over n prices.
//! STDDEV(n)[i] = sqrt(sum((P[i-j] - SMA(n)[i])^2 for j in 0..n) / (n-1))
//! Warmup: first (n-1) bars are invalid. A period below 2 is never defined.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use chrono::NaiveDate;

pub fn calculate_stddev(dates: &[NaiveDate], prices: &[f64], period: usize) -> IndicatorSeries {
    debug_assert_eq!(dates.len(), prices.len());

    let values = dates
        .iter()
        .zip(rolling_sample_std(prices, period))
        .map(|(&date, sd)| match sd {
            Some(v) => IndicatorPoint {
                date,
                valid: true,
                value: IndicatorValue::Simple(v),
            },
            None => IndicatorPoint::invalid(date, IndicatorValue::Simple(0.0)),
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Stddev(period),
        values,
        source: None,
    }
}

pub(crate) fn rolling_sample_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window < 2 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let slice = &values[i + 1 - window..=i];
            let mean = slice.iter().sum::<f64>() / window as f64;
            let variance = slice
                .iter()
                .map(|v| {
                    let diff = v - mean;
                    diff * diff
                })
                .sum::<f64>()
                / (window - 1) as f64;
            Some(variance.sqrt())
        })
        .collect()
}
