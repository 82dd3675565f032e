//! Fund performance metrics.
//!
//! Turns a value curve (fund equity or a benchmark's closes) into daily
//! returns, their mean and volatility, an annualized Sharpe ratio and
//! drawdown statistics.

use marketsim_core::config::AnalysisConfig;
use marketsim_core::{Error, PriceTable, Result, ValuationPoint};
use serde::Serialize;
use statrs::statistics::Statistics;

/// Performance summary of one value curve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FundProperties {
    /// Last value divided by first value.
    pub total_return: f64,
    /// Mean daily return.
    pub mean_daily_return: f64,
    /// Population standard deviation of daily returns.
    pub stddev_daily_return: f64,
    /// Annualized Sharpe ratio.
    pub sharpe_ratio: f64,
    /// Maximum drawdown (absolute).
    pub max_drawdown: f64,
    /// Maximum drawdown percentage.
    pub max_drawdown_pct: f64,
}

/// Fund and benchmark properties over the same sessions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BenchmarkComparison {
    pub fund: FundProperties,
    pub benchmark: FundProperties,
}

/// Daily returns of a value curve: `r[0] = 0`, `r[t] = v[t] / v[t-1] - 1`.
pub fn daily_returns(values: &[f64]) -> Vec<f64> {
    let mut returns = Vec::with_capacity(values.len());
    if values.is_empty() {
        return returns;
    }
    returns.push(0.0);
    returns.extend(values.windows(2).map(|w| w[1] / w[0] - 1.0));
    returns
}

/// Metrics calculator.
#[derive(Debug, Clone, Copy)]
pub struct MetricsCalculator {
    trading_days_per_year: u32,
}

impl Default for MetricsCalculator {
    fn default() -> Self {
        Self::new(252)
    }
}

impl MetricsCalculator {
    /// Create a new metrics calculator.
    pub fn new(trading_days_per_year: u32) -> Self {
        Self {
            trading_days_per_year,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.trading_days_per_year)
    }

    /// Calculate properties of a value curve.
    pub fn fund_properties(&self, values: &[f64]) -> Result<FundProperties> {
        let (first, last) = match (values.first(), values.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => return Err(Error::insufficient_data("empty value series")),
        };
        if first == 0.0 || values.iter().any(|v| !v.is_finite()) {
            return Err(Error::data("value series must be finite with a non-zero start"));
        }

        // Every value but the last is the base of a return.
        if let Some((t, base)) = values[..values.len() - 1]
            .iter()
            .enumerate()
            .find(|(_, v)| **v <= 0.0)
        {
            return Err(Error::data(format!(
                "daily return {} is undefined: value {t} is {base}",
                t + 1
            )));
        }

        let returns = daily_returns(values);
        let mean = returns.iter().mean();
        let stddev = returns.iter().population_std_dev();
        let (max_drawdown, max_drawdown_pct) = max_drawdown(values);

        Ok(FundProperties {
            total_return: last / first,
            mean_daily_return: mean,
            stddev_daily_return: stddev,
            sharpe_ratio: self.sharpe(&returns, mean, stddev),
            max_drawdown,
            max_drawdown_pct,
        })
    }

    /// Properties of a simulated valuation series.
    pub fn series_properties(&self, series: &[ValuationPoint]) -> Result<FundProperties> {
        let values: Vec<f64> = series.iter().map(|p| p.equity).collect();
        self.fund_properties(&values)
    }

    /// Compare a valuation series with a benchmark's closes on the same
    /// sessions.
    pub fn compare_to_benchmark<P: PriceTable + ?Sized>(
        &self,
        series: &[ValuationPoint],
        prices: &P,
        benchmark: &str,
    ) -> Result<BenchmarkComparison> {
        let closes = series
            .iter()
            .map(|p| prices.require_close(benchmark, p.date))
            .collect::<Result<Vec<f64>>>()?;

        Ok(BenchmarkComparison {
            fund: self.series_properties(series)?,
            benchmark: self.fund_properties(&closes)?,
        })
    }

    /// Annualized Sharpe ratio; zero when undefined.
    fn sharpe(&self, returns: &[f64], mean: f64, stddev: f64) -> f64 {
        if returns.len() < 2 || !(stddev > 0.0) {
            return 0.0;
        }
        f64::from(self.trading_days_per_year).sqrt() * mean / stddev
    }
}

/// Largest peak-to-trough decline, absolute and as a percentage of the peak.
fn max_drawdown(values: &[f64]) -> (f64, f64) {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = (0.0, 0.0);

    for &value in values {
        peak = peak.max(value);
        let drawdown = peak - value;
        if drawdown > worst.0 {
            let pct = if peak > 0.0 { drawdown / peak * 100.0 } else { 0.0 };
            worst = (drawdown, pct);
        }
    }

    worst
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use marketsim_core::InMemoryPriceTable;

    fn series(values: &[f64]) -> Vec<ValuationPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &equity)| ValuationPoint {
                date: NaiveDate::from_ymd_opt(2011, 3, 1).unwrap() + chrono::Duration::days(i as i64),
                equity,
            })
            .collect()
    }

    #[test]
    fn test_daily_returns() {
        let returns = daily_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(returns.len(), 3);
        assert_eq!(returns[0], 0.0);
        assert_relative_eq!(returns[1], 0.1, epsilon = 1e-12);
        assert_relative_eq!(returns[2], -0.1, epsilon = 1e-12);
        assert!(daily_returns(&[]).is_empty());
    }

    #[test]
    fn test_fund_properties() {
        let calculator = MetricsCalculator::new(252);
        let props = calculator.fund_properties(&[100.0, 110.0, 99.0, 108.9]).unwrap();

        // Returns: 0, 0.1, -0.1, 0.1
        let mean = 0.1 / 4.0;
        let variance = ((0.0 - mean) * (0.0 - mean)
            + 2.0 * (0.1 - mean) * (0.1 - mean)
            + (-0.1 - mean) * (-0.1 - mean))
            / 4.0;
        assert_relative_eq!(props.total_return, 1.089, epsilon = 1e-12);
        assert_relative_eq!(props.mean_daily_return, mean, epsilon = 1e-12);
        assert_relative_eq!(props.stddev_daily_return, variance.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(
            props.sharpe_ratio,
            252f64.sqrt() * mean / variance.sqrt(),
            epsilon = 1e-9
        );
        assert_relative_eq!(props.max_drawdown, 11.0, epsilon = 1e-9);
        assert_relative_eq!(props.max_drawdown_pct, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_flat_curve_has_zero_sharpe() {
        let props = MetricsCalculator::default()
            .fund_properties(&[50.0, 50.0, 50.0])
            .unwrap();
        assert_eq!(props.sharpe_ratio, 0.0);
        assert_eq!(props.stddev_daily_return, 0.0);
        assert_eq!(props.total_return, 1.0);
    }

    #[test]
    fn test_single_value() {
        let props = MetricsCalculator::default().fund_properties(&[10.0]).unwrap();
        assert_eq!(props.sharpe_ratio, 0.0);
        assert_eq!(props.total_return, 1.0);
    }

    #[test]
    fn test_wiped_out_fund_is_rejected() {
        let calculator = MetricsCalculator::default();
        // Equity hits zero, so the next return divides by it.
        let err = calculator.fund_properties(&[100.0, 0.0, 50.0]).unwrap_err();
        assert!(matches!(err, Error::Data(_)));
        // A negative base flips the sign of every later return.
        assert!(calculator.fund_properties(&[100.0, -20.0, 10.0]).is_err());
        // A final value at or below zero still has a defined return.
        let props = calculator.fund_properties(&[100.0, 50.0, 0.0]).unwrap();
        assert_eq!(props.total_return, 0.0);
        assert!(props.sharpe_ratio.is_finite());
    }

    #[test]
    fn test_invalid_series() {
        let calculator = MetricsCalculator::default();
        assert!(matches!(calculator.fund_properties(&[]), Err(Error::InsufficientData(_))));
        assert!(calculator.fund_properties(&[0.0, 1.0]).is_err());
        assert!(calculator.fund_properties(&[1.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_compare_to_benchmark() {
        let fund = series(&[1_000.0, 1_010.0, 1_030.0]);
        let mut prices = InMemoryPriceTable::new();
        for (point, close) in fund.iter().zip([1_200.0, 1_188.0, 1_212.0]) {
            prices.insert("$SPX", point.date, close).unwrap();
        }

        let comparison = MetricsCalculator::default()
            .compare_to_benchmark(&fund, &prices, "$SPX")
            .unwrap();
        assert_relative_eq!(comparison.fund.total_return, 1.03, epsilon = 1e-12);
        assert_relative_eq!(comparison.benchmark.total_return, 1.01, epsilon = 1e-12);

        let err = MetricsCalculator::default()
            .compare_to_benchmark(&fund, &prices, "QQQ")
            .unwrap_err();
        assert!(matches!(err, Error::MissingPrice { .. }));
    }
}
