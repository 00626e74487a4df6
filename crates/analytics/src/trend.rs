//! Trend analysis over a dated price series.
//!
//! Classifies direction from an OLS fit of price against day offset,
//! measures volatility as the coefficient of variation, detects a monthly
//! seasonal pattern when a full year is present and extrapolates a short
//! forecast.

use crate::stats::{self, LinearFit};
use chrono::Datelike;
use fairprice_core::config::TrendConfig;
use fairprice_core::{
    Error, Forecast, PriceTrend, Result, SeasonalPattern, TrendDirection, TrendPeriod, TrendPoint,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Trend analyzer.
#[derive(Debug, Clone, Default)]
pub struct TrendAnalyzer {
    config: TrendConfig,
}

impl TrendAnalyzer {
    /// Create a new trend analyzer.
    pub fn new(config: TrendConfig) -> Self {
        Self { config }
    }

    /// Analyze a series ordered strictly by date.
    pub fn analyze(&self, points: &[TrendPoint], period: TrendPeriod) -> Result<PriceTrend> {
        if points.len() < 2 {
            return Err(Error::insufficient_data(format!(
                "trend analysis needs at least 2 points, got {}",
                points.len()
            )));
        }
        validate_points(points)?;

        let origin = points[0].date;
        let xs: Vec<f64> = points
            .iter()
            .map(|p| (p.date - origin).num_days() as f64)
            .collect();
        let prices: Vec<f64> = points.iter().map(|p| p.price).collect();

        let mean = stats::mean(&prices);
        let volatility = (stats::sample_std_dev(&prices) / mean).max(0.0);

        // Dates strictly increase, so the x spread is non-zero.
        let fit = LinearFit::fit(&xs, &prices)
            .ok_or_else(|| Error::data("trend points share a single date"))?;
        let span_days = xs[xs.len() - 1];
        let slope_pct = fit.slope * span_days / mean;

        let trend = self.classify(volatility, slope_pct);
        let seasonal_pattern = self.seasonal_pattern(points);
        let forecast = self.forecast(&fit, span_days, volatility);

        debug!(
            period = %period,
            points = points.len(),
            volatility,
            slope_pct,
            ?trend,
            seasonal = seasonal_pattern.is_some(),
            "analyzed price trend"
        );

        Ok(PriceTrend {
            period,
            data_points: points.to_vec(),
            trend,
            volatility,
            slope_pct,
            seasonal_pattern,
            forecast,
        })
    }

    /// Classify direction from volatility and the fitted relative change.
    ///
    /// `volatility >= volatile_threshold` wins over any slope. Otherwise a
    /// slope strictly beyond `±slope_threshold` is rising/falling.
    pub fn classify(&self, volatility: f64, slope_pct: f64) -> TrendDirection {
        if volatility >= self.config.volatile_threshold {
            TrendDirection::Volatile
        } else if slope_pct > self.config.slope_threshold {
            TrendDirection::Rising
        } else if slope_pct < -self.config.slope_threshold {
            TrendDirection::Falling
        } else {
            TrendDirection::Stable
        }
    }

    /// Peak and low months from monthly average prices.
    ///
    /// Omitted when fewer than `seasonal_min_months` distinct months are
    /// present, or when every month averages the same.
    pub fn seasonal_pattern(&self, points: &[TrendPoint]) -> Option<SeasonalPattern> {
        let mut buckets: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
        for point in points {
            let entry = buckets.entry(point.date.month()).or_insert((0.0, 0));
            entry.0 += point.price;
            entry.1 += 1;
        }

        if buckets.len() < self.config.seasonal_min_months {
            return None;
        }

        let monthly: Vec<(u32, f64)> = buckets
            .into_iter()
            .map(|(month, (sum, count))| (month, sum / count as f64))
            .collect();
        let averages = stats::sorted(monthly.iter().map(|(_, avg)| *avg));

        let lowest = averages[0];
        let highest = averages[averages.len() - 1];
        if highest - lowest <= f64::EPSILON * highest.abs() {
            return None;
        }

        let q = self.config.seasonal_peak_quantile;
        let peak_cut = stats::quantile_sorted(&averages, q);
        let low_cut = stats::quantile_sorted(&averages, 1.0 - q);

        // Tied averages can put both cuts on one value; keep the sets disjoint.
        let peak_months: BTreeSet<u32> = monthly
            .iter()
            .filter(|(_, avg)| *avg >= peak_cut && *avg > low_cut)
            .map(|(m, _)| *m)
            .collect();
        let low_months: BTreeSet<u32> = monthly
            .iter()
            .filter(|(_, avg)| *avg <= low_cut && *avg < peak_cut)
            .map(|(m, _)| *m)
            .collect();

        Some(SeasonalPattern {
            peak_months,
            low_months,
        })
    }

    fn forecast(&self, fit: &LinearFit, last_x: f64, volatility: f64) -> Option<Forecast> {
        let next_week = fit.predict(last_x + self.config.forecast_week_days);
        let next_month = fit.predict(last_x + self.config.forecast_month_days);

        // A non-positive price is not a forecast.
        let usable = |price: f64| price.is_finite() && price > 0.0;
        if !(usable(next_week) && usable(next_month)) {
            return None;
        }

        Some(Forecast {
            next_week,
            next_month,
            confidence: (1.0 - volatility).max(0.0),
        })
    }
}

fn validate_points(points: &[TrendPoint]) -> Result<()> {
    if let Some(bad) = points.iter().find(|p| !p.price.is_finite() || p.price <= 0.0) {
        return Err(Error::data(format!(
            "trend point on {} has invalid price {}",
            bad.date, bad.price
        )));
    }
    if let Some(pair) = points.windows(2).find(|w| w[1].date <= w[0].date) {
        return Err(Error::data(format!(
            "trend points must be strictly increasing by date ({} follows {})",
            pair[1].date, pair[0].date
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::{Duration, NaiveDate};
    use fairprice_core::config::{TREND_SLOPE_THRESHOLD, VOLATILE_THRESHOLD};

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn daily(prices: &[f64]) -> Vec<TrendPoint> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &price)| TrendPoint {
                date: start() + Duration::days(i as i64),
                price,
                volume: None,
            })
            .collect()
    }

    /// One point per month for `months` months; price from `f(month)`.
    fn monthly(months: u32, f: impl Fn(u32) -> f64) -> Vec<TrendPoint> {
        (0..months)
            .map(|i| {
                let month = i % 12 + 1;
                let year = 2023 + (i / 12) as i32;
                TrendPoint {
                    date: NaiveDate::from_ymd_opt(year, month, 15).unwrap(),
                    price: f(month),
                    volume: Some(100.0),
                }
            })
            .collect()
    }

    #[test]
    fn test_rising_low_dispersion() {
        let analyzer = TrendAnalyzer::default();
        let prices: Vec<f64> = (0..30).map(|i| 2000.0 + 10.0 * i as f64).collect();

        let trend = analyzer.analyze(&daily(&prices), TrendPeriod::Month).unwrap();

        assert_eq!(trend.trend, TrendDirection::Rising);
        assert!(trend.volatility < VOLATILE_THRESHOLD);
        assert!(trend.slope_pct > TREND_SLOPE_THRESHOLD);
        assert_eq!(trend.data_points.len(), 30);
    }

    #[test]
    fn test_falling() {
        let analyzer = TrendAnalyzer::default();
        let prices: Vec<f64> = (0..30).map(|i| 3000.0 - 8.0 * i as f64).collect();

        let trend = analyzer.analyze(&daily(&prices), TrendPeriod::Month).unwrap();
        assert_eq!(trend.trend, TrendDirection::Falling);
    }

    #[test]
    fn test_stable_flat_series() {
        let analyzer = TrendAnalyzer::default();
        let prices = [2000.0, 2002.0, 1998.0, 2001.0, 1999.0, 2000.0, 2001.0];

        let trend = analyzer.analyze(&daily(&prices), TrendPeriod::Week).unwrap();
        assert_eq!(trend.trend, TrendDirection::Stable);
        assert!(trend.slope_pct.abs() <= TREND_SLOPE_THRESHOLD);
    }

    #[test]
    fn test_volatile_overrides_direction() {
        let analyzer = TrendAnalyzer::default();
        // Rising overall but swinging wildly.
        let prices = [1000.0, 1600.0, 900.0, 1800.0, 1100.0, 2000.0];

        let trend = analyzer.analyze(&daily(&prices), TrendPeriod::Week).unwrap();
        assert!(trend.volatility >= VOLATILE_THRESHOLD);
        assert_eq!(trend.trend, TrendDirection::Volatile);
    }

    #[test]
    fn test_classify_boundaries() {
        let analyzer = TrendAnalyzer::default();

        assert_eq!(analyzer.classify(VOLATILE_THRESHOLD, 0.5), TrendDirection::Volatile);
        assert_eq!(
            analyzer.classify(VOLATILE_THRESHOLD - 1e-9, 0.5),
            TrendDirection::Rising
        );
        assert_eq!(analyzer.classify(0.01, TREND_SLOPE_THRESHOLD), TrendDirection::Stable);
        assert_eq!(
            analyzer.classify(0.01, TREND_SLOPE_THRESHOLD + 1e-9),
            TrendDirection::Rising
        );
        assert_eq!(analyzer.classify(0.01, -TREND_SLOPE_THRESHOLD), TrendDirection::Stable);
        assert_eq!(
            analyzer.classify(0.01, -TREND_SLOPE_THRESHOLD - 1e-9),
            TrendDirection::Falling
        );
    }

    #[test]
    fn test_volatility_is_coefficient_of_variation() {
        let analyzer = TrendAnalyzer::default();
        let prices = [90.0, 110.0];

        let trend = analyzer.analyze(&daily(&prices), TrendPeriod::Week).unwrap();
        // std = sqrt(200) = 14.142, mean = 100
        assert_abs_diff_eq!(trend.volatility, 0.141421, epsilon = 1e-5);
    }

    #[test]
    fn test_forecast_extrapolates_fit() {
        let analyzer = TrendAnalyzer::default();
        let prices: Vec<f64> = (0..10).map(|i| 1000.0 + 5.0 * i as f64).collect();

        let trend = analyzer.analyze(&daily(&prices), TrendPeriod::Week).unwrap();
        let forecast = trend.forecast.unwrap();

        // Last point at day 9 (1045); exact line, slope 5/day.
        assert_abs_diff_eq!(forecast.next_week, 1045.0 + 35.0, epsilon = 1e-6);
        assert_abs_diff_eq!(forecast.next_month, 1045.0 + 150.0, epsilon = 1e-6);
        assert_abs_diff_eq!(forecast.confidence, 1.0 - trend.volatility, epsilon = 1e-12);
    }

    #[test]
    fn test_forecast_confidence_floored() {
        let analyzer = TrendAnalyzer::default();
        // CV above 1 drives 1 - volatility negative.
        let prices = [10.0, 10.0, 10.0, 500.0];

        let trend = analyzer.analyze(&daily(&prices), TrendPeriod::Week).unwrap();
        assert!(trend.volatility > 1.0);
        if let Some(forecast) = trend.forecast {
            assert_eq!(forecast.confidence, 0.0);
        }
    }

    #[test]
    fn test_forecast_omitted_when_extrapolation_goes_negative() {
        let analyzer = TrendAnalyzer::default();
        let prices = [500.0, 300.0, 100.0];

        let trend = analyzer.analyze(&daily(&prices), TrendPeriod::Week).unwrap();
        assert!(trend.forecast.is_none());
    }

    #[test]
    fn test_seasonal_pattern_full_year() {
        let analyzer = TrendAnalyzer::default();
        // Peaks in Jun-Aug, lows in Dec-Feb.
        let points = monthly(12, |m| match m {
            6..=8 => 3000.0 + m as f64,
            12 | 1 | 2 => 1500.0 + m as f64,
            _ => 2200.0 + m as f64,
        });

        let pattern = analyzer.seasonal_pattern(&points).unwrap();
        assert_eq!(pattern.peak_months, BTreeSet::from([6, 7, 8]));
        assert_eq!(pattern.low_months, BTreeSet::from([1, 2, 12]));
    }

    #[test]
    fn test_seasonal_pattern_needs_twelve_months() {
        let analyzer = TrendAnalyzer::default();
        let points = monthly(11, |m| 2000.0 + 10.0 * m as f64);
        assert!(analyzer.seasonal_pattern(&points).is_none());

        let trend = analyzer.analyze(&points, TrendPeriod::Year).unwrap();
        assert!(trend.seasonal_pattern.is_none());
    }

    #[test]
    fn test_seasonal_pattern_flat_year_omitted() {
        let analyzer = TrendAnalyzer::default();
        let points = monthly(12, |_| 2000.0);
        assert!(analyzer.seasonal_pattern(&points).is_none());
    }

    #[test]
    fn test_seasonal_tied_months_not_both_peak_and_low() {
        let analyzer = TrendAnalyzer::default();
        let points = monthly(12, |m| if m >= 11 { 2600.0 } else { 2000.0 });

        let pattern = analyzer.seasonal_pattern(&points).unwrap();
        assert_eq!(pattern.peak_months, BTreeSet::from([11, 12]));
        assert_eq!(pattern.low_months, (1..=10).collect::<BTreeSet<u32>>());
        assert!(pattern.peak_months.is_disjoint(&pattern.low_months));
    }

    #[test]
    fn test_seasonal_averages_across_years() {
        let analyzer = TrendAnalyzer::default();
        let points = monthly(24, |m| if m == 10 { 4000.0 } else { 2000.0 + m as f64 });

        let trend = analyzer.analyze(&points, TrendPeriod::Year).unwrap();
        let pattern = trend.seasonal_pattern.unwrap();
        assert!(pattern.peak_months.contains(&10));
        assert!(pattern.low_months.contains(&1));
    }

    #[test]
    fn test_deterministic() {
        let analyzer = TrendAnalyzer::default();
        let points = daily(&[2100.0, 2080.0, 2150.0, 2170.0, 2120.0]);
        assert_eq!(
            analyzer.analyze(&points, TrendPeriod::Week).unwrap(),
            analyzer.analyze(&points, TrendPeriod::Week).unwrap()
        );
    }

    #[test]
    fn test_insufficient_points() {
        let analyzer = TrendAnalyzer::default();
        let err = analyzer
            .analyze(&daily(&[2000.0]), TrendPeriod::Week)
            .unwrap_err();
        assert!(err.is_insufficient_data());
        assert!(analyzer.analyze(&[], TrendPeriod::Week).unwrap_err().is_insufficient_data());
    }

    #[test]
    fn test_rejects_unordered_dates() {
        let analyzer = TrendAnalyzer::default();
        let mut points = daily(&[2000.0, 2010.0, 2020.0]);
        points.swap(1, 2);
        assert!(matches!(
            analyzer.analyze(&points, TrendPeriod::Week),
            Err(Error::Data(_))
        ));

        let mut dup = daily(&[2000.0, 2010.0]);
        dup[1].date = dup[0].date;
        assert!(matches!(analyzer.analyze(&dup, TrendPeriod::Week), Err(Error::Data(_))));
    }

    #[test]
    fn test_rejects_non_positive_price() {
        let analyzer = TrendAnalyzer::default();
        assert!(matches!(
            analyzer.analyze(&daily(&[2000.0, -1.0]), TrendPeriod::Week),
            Err(Error::Data(_))
        ));
    }
}
