//! Performance metrics over a cleaned per-period return series.

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    /// (final growth - 1) * 100
    pub total_return_pct: f64,
    pub final_capital: f64,
    /// Annualised mean/stddev of period returns; 0 when the stddev is 0.
    pub sharpe_ratio: f64,
    /// Worst peak-to-trough decline in percent; always <= 0.
    pub max_drawdown_pct: f64,
}

impl Metrics {
    /// `returns` and `growth` must be the same retained rows; `growth` is the
    /// running product of (1 + r).
    pub fn compute(
        returns: &[f64],
        growth: &[f64],
        initial_capital: f64,
        periods_per_year: f64,
    ) -> Self {
        debug_assert_eq!(returns.len(), growth.len());

        let final_growth = growth.last().copied().unwrap_or(1.0);

        Metrics {
            total_return_pct: (final_growth - 1.0) * 100.0,
            final_capital: initial_capital * final_growth,
            sharpe_ratio: sharpe_ratio(returns, periods_per_year),
            max_drawdown_pct: max_drawdown_pct(growth),
        }
    }
}

/// Running product of (1 + r), starting from 1.0 before the first period.
pub fn cumulative_growth(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(1.0, |acc, r| {
            *acc *= 1.0 + r;
            Some(*acc)
        })
        .collect()
}

/// Sample standard deviation (n-1). `None` for fewer than two observations.
/// Exactly 0 when every observation is equal.
pub fn sample_stddev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    // identical values: avoid rounding noise from the mean
    if values.iter().all(|v| *v == values[0]) {
        return Some(0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}

pub fn sharpe_ratio(returns: &[f64], periods_per_year: f64) -> f64 {
    let Some(stddev) = sample_stddev(returns) else {
        return 0.0;
    };
    if stddev == 0.0 {
        return 0.0;
    }
    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    (mean / stddev) * periods_per_year.sqrt()
}

pub fn max_drawdown_pct(growth: &[f64]) -> f64 {
    let Some(&first) = growth.first() else {
        return 0.0;
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;

    for &value in growth {
        if value > peak {
            peak = value;
        } else if peak > 0.0 {
            let dd = (value - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd * 100.0
}
