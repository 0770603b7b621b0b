//! Exponential Moving Average indicator.
//!
//! k = 2/(span+1), EMA[0] = P[0], EMA[i] = P[i]*k + EMA[i-1]*(1-k).
//! No bias adjustment: the first observation seeds the recursion, so every
//! bar is valid. Early values are dominated by the seed.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use chrono::NaiveDate;

pub fn calculate_ema(dates: &[NaiveDate], prices: &[f64], span: usize) -> IndicatorSeries {
    debug_assert_eq!(dates.len(), prices.len());

    let values = if span == 0 {
        dates
            .iter()
            .map(|&date| IndicatorPoint::invalid(date, IndicatorValue::Simple(0.0)))
            .collect()
    } else {
        dates
            .iter()
            .zip(ema_values(prices, span))
            .map(|(&date, v)| IndicatorPoint {
                date,
                valid: true,
                value: IndicatorValue::Simple(v),
            })
            .collect()
    };

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(span),
        values,
        source: None,
    }
}

/// Raw streaming EMA over `values`. `span` must be non-zero.
pub(crate) fn ema_values(values: &[f64], span: usize) -> Vec<f64> {
    let k = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut ema = 0.0;

    for (i, &v) in values.iter().enumerate() {
        ema = if i == 0 { v } else { v * k + ema * (1.0 - k) };
        out.push(ema);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n).map(|i| start + chrono::Duration::days(i as i64)).collect()
    }

    #[test]
    fn ema_valid_from_first_bar() {
        let series = calculate_ema(&make_dates(3), &[10.0, 20.0, 30.0], 12);
        assert!(series.values.iter().all(|p| p.valid));
    }

    #[test]
    fn ema_seeded_with_first_observation() {
        let series = calculate_ema(&make_dates(3), &[10.0, 20.0, 30.0], 3);
        assert_eq!(series.values[0].simple(), Some(10.0));
    }

    #[test]
    fn ema_recursive_calculation() {
        let prices = [10.0, 20.0, 30.0, 40.0];
        let series = calculate_ema(&make_dates(4), &prices, 3);

        let k = 2.0 / 4.0;
        let e1 = 20.0 * k + 10.0 * (1.0 - k);
        let e2 = 30.0 * k + e1 * (1.0 - k);
        let e3 = 40.0 * k + e2 * (1.0 - k);

        let values = series.simple_values();
        assert!((values[1].unwrap() - e1).abs() < 1e-12);
        assert!((values[2].unwrap() - e2).abs() < 1e-12);
        assert!((values[3].unwrap() - e3).abs() < 1e-12);
    }

    #[test]
    fn ema_equal_prices() {
        let series = calculate_ema(&make_dates(5), &[100.0; 5], 9);
        for v in series.simple_values() {
            assert!((v.unwrap() - 100.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn ema_span_1_tracks_price() {
        let series = calculate_ema(&make_dates(3), &[10.0, 20.0, 30.0], 1);
        assert_eq!(
            series.simple_values(),
            vec![Some(10.0), Some(20.0), Some(30.0)]
        );
    }

    #[test]
    fn ema_span_0_is_undefined() {
        let series = calculate_ema(&make_dates(2), &[10.0, 20.0], 0);
        assert_eq!(series.len(), 2);
        assert!(series.values.iter().all(|p| !p.valid));
    }

    #[test]
    fn ema_empty_input() {
        let series = calculate_ema(&[], &[], 12);
        assert!(series.is_empty());
        assert_eq!(series.indicator_type, IndicatorType::Ema(12));
    }
}
